//! Parsed templates and their associations
//!
//! A [`Template`] owns two tera instances. `compiled` holds the template alone
//! and never changes after parsing; it is what other templates receive when
//! they are associated with this one. `scope` starts as a copy of `compiled`
//! and collects every associated template, so `{% include "ns/partials/x" %}`
//! resolves at render time.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera, Value};
use tracing::{debug, trace};

use crate::error::TemplateError;
use crate::functions::SharedFunctions;
use crate::kind::{TemplateKind, fully_qualified_name};

/// Shareable handle on a template's parsed form
#[derive(Clone)]
pub struct CompiledTemplate {
    name: String,
    tera: Arc<Tera>,
}

impl CompiledTemplate {
    /// Fully-qualified name the parsed form is registered under
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Compiled templates gathered into one engine instance
///
/// Attaching a batch costs a single engine merge per receiving template, where
/// attaching its members one by one costs one merge each.
#[derive(Default)]
pub struct AssociationBatch {
    tera: Tera,
    names: BTreeSet<String>,
}

impl AssociationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled template; the first one added under a name is kept
    pub fn add(&mut self, template: &CompiledTemplate) -> Result<bool, TemplateError> {
        if self.names.contains(&template.name) {
            return Ok(false);
        }

        self.tera
            .extend(&template.tera)
            .map_err(|source| TemplateError::Association {
                name: template.name.clone(),
                target: template.name.clone(),
                source,
            })?;
        self.names.insert(template.name.clone());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for AssociationBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationBatch")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// A parsed template belonging to a namespace
pub struct Template {
    namespace: String,
    kind: TemplateKind,
    qualified_name: String,
    name: String,
    source: String,
    compiled: CompiledTemplate,
    scope: Tera,
    associations: BTreeSet<String>,
}

impl Template {
    /// Parse raw template text
    ///
    /// `qualified_name` must already carry the prefix of `kind`; the template
    /// is registered as `namespace/qualified_name`.
    pub fn parse(
        namespace: impl Into<String>,
        kind: TemplateKind,
        qualified_name: impl Into<String>,
        source: impl Into<String>,
        functions: &SharedFunctions,
        autoescape: bool,
    ) -> Result<Self, TemplateError> {
        let namespace = namespace.into();
        let qualified_name = qualified_name.into();
        let source = source.into();
        let name = fully_qualified_name(&namespace, &qualified_name);

        let mut tera = Tera::default();
        if autoescape {
            // Names carry no extension, so escape everything
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(vec![]);
        }
        functions.install(&mut tera);
        tera.add_raw_template(&name, &source)
            .map_err(|source| TemplateError::Parse {
                name: name.clone(),
                source,
            })?;
        debug!("Parsed template {} ({})", name, kind);

        let compiled = CompiledTemplate {
            name: name.clone(),
            tera: Arc::new(tera),
        };

        Ok(Self {
            scope: compiled.tera.as_ref().clone(),
            associations: BTreeSet::from([name.clone()]),
            namespace,
            kind,
            qualified_name,
            name,
            source,
            compiled,
        })
    }

    /// Fully-qualified name (`namespace/qualified_name`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Name with the kind prefix applied, without the namespace
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Raw text the template was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Handle on the parsed form, for associating with other templates
    pub fn compiled(&self) -> CompiledTemplate {
        self.compiled.clone()
    }

    /// Whether `name` can be included from this template
    pub fn resolves(&self, name: &str) -> bool {
        self.associations.contains(name)
    }

    /// Every name resolvable from this template, itself included
    pub fn associations(&self) -> impl Iterator<Item = &str> {
        self.associations.iter().map(String::as_str)
    }

    /// Make `other` resolvable from this template under its name
    ///
    /// Returns `false` when that name is already resolvable. An existing
    /// association is never replaced, even if `other` was re-parsed from new
    /// text since.
    pub fn associate(&mut self, other: &CompiledTemplate) -> Result<bool, TemplateError> {
        if self.resolves(&other.name) {
            return Ok(false);
        }

        self.scope
            .extend(&other.tera)
            .map_err(|source| TemplateError::Association {
                name: self.name.clone(),
                target: other.name.clone(),
                source,
            })?;
        self.associations.insert(other.name.clone());
        trace!("Associated {} with {}", other.name, self.name);
        Ok(true)
    }

    /// Make every template in `batch` resolvable from this one
    ///
    /// Same rules as [`associate`](Self::associate), applied in one merge.
    /// Returns the number of names that became resolvable.
    pub fn associate_batch(&mut self, batch: &AssociationBatch) -> Result<usize, TemplateError> {
        let missing: Vec<String> = batch
            .names
            .iter()
            .filter(|name| !self.associations.contains(*name))
            .cloned()
            .collect();
        let Some(first) = missing.first() else {
            return Ok(0);
        };

        self.scope
            .extend(&batch.tera)
            .map_err(|source| TemplateError::Association {
                name: self.name.clone(),
                target: first.clone(),
                source,
            })?;
        trace!("Associated {} templates with {}", missing.len(), self.name);

        let added = missing.len();
        self.associations.extend(missing);
        Ok(added)
    }

    /// Execute the template with `data`
    ///
    /// Object data exposes its fields as top-level variables. Any other value
    /// is available as `data`.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, TemplateError> {
        let context = self.context(data)?;
        self.scope
            .render(&self.name, &context)
            .map_err(|source| TemplateError::Render {
                name: self.name.clone(),
                source,
            })
    }

    fn context<T: Serialize + ?Sized>(&self, data: &T) -> Result<Context, TemplateError> {
        let invalid = |reason: String| TemplateError::InvalidData {
            name: self.name.clone(),
            reason,
        };

        let value = serde_json::to_value(data).map_err(|e| invalid(e.to_string()))?;
        match value {
            Value::Object(_) => Context::from_value(value).map_err(|e| invalid(e.to_string())),
            other => {
                let mut context = Context::new();
                context.insert("data", &other);
                Ok(context)
            }
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("associations", &self.associations.len())
            .finish_non_exhaustive()
    }
}
