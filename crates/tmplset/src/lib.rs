//! tmplset provides the building blocks of a namespaced template set:
//! kind classification by name prefix, parsed templates that can include
//! each other by fully-qualified name, and pluggable delivery of the
//! rendered output.

pub mod config;
pub mod error;
pub mod functions;
pub mod kind;
pub mod render;
pub mod template;

// Re-export core types
pub use config::TemplateSetConfig;
pub use error::{ConfigError, DeliveryError, Result, TemplateError, TmplsetError};
pub use functions::SharedFunctions;
pub use kind::{PrefixTable, TemplateKind, fully_qualified_name};
pub use render::{
    Delivery, ElementDelivery, InMemoryHost, MarkupHost, Placement, RenderOptions, RenderOutcome,
    StreamDelivery,
};
pub use template::{AssociationBatch, CompiledTemplate, Template};

// Re-export tera types needed to register shared functions
pub use ::tera::{Filter, Function, Value};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
