//! # tmplset registry
//!
//! A registry of templates gathered from several sources, where every
//! template can include every other one by a stable name:
//! - Raw text arrives in [`TemplateBundle`]s, one namespace each, from a
//!   directory tree, a tar archive, or a map built in code
//! - Each item is classified by its name prefix (`partials/`, `views/`, ...)
//!   and parsed into a [`tmplset::Template`]
//! - An association pass links all members so that
//!   `{% include "namespace/partials/footer" %}` works regardless of which
//!   source or import brought the footer in
//! - The raw text of all namespaces persists to a single binary artifact and
//!   is rebuilt into a fully linked set from it
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tmplset_registry::{TemplateBundle, TemplateSet};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut set = TemplateSet::new();
//!
//! let bundle = TemplateBundle::new("app")
//!     .with_item("views/home", "Hello {{ name }} {% include \"app/partials/footer\" %}")
//!     .with_item("partials/footer", "(c) {{ year }}");
//! set.import_bundle("app", bundle)?;
//!
//! let page = set.render("app/views/home", &json!({"name": "Ada", "year": 2024}))?;
//! println!("{}", String::from_utf8_lossy(&page));
//!
//! set.persist_to_disk("templates.bin")?;
//! # Ok(())
//! # }
//! ```

pub mod address;
mod association;
pub mod bundle;
pub mod codec;
pub mod error;
pub mod set;
pub mod source;

pub use address::bundle_digest;
pub use bundle::TemplateBundle;
pub use codec::RawTextMap;
pub use error::{CodecError, RegistryError, Result, SourceError};
pub use set::TemplateSet;
