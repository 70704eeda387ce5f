//! Error types for the tmplset library
//!
//! Errors are organized by domain: template parsing/linking/execution,
//! configuration, and delivery of rendered output.

use thiserror::Error;

/// Main error type for the tmplset library
#[derive(Error, Debug)]
pub enum TmplsetError {
    /// Template-related errors (parsing, association, lookup, execution)
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Delivery of rendered content to its destination
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Template-related errors
///
/// `Parse` and `Association` come straight from the template engine and keep
/// its error as the source so callers can walk the chain.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to parse template {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to associate {name} with {target}: {source}")]
    Association {
        name: String,
        target: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Template not found: {name}")]
    NotFound { name: String },

    #[error("Namespace not found: {namespace}")]
    MissingNamespace { namespace: String },

    #[error("Invalid render data for {name}: {reason}")]
    InvalidData { name: String, reason: String },
}

/// Configuration and initialization errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {setting} - {reason}")]
    InvalidConfig { setting: String, reason: String },

    #[error("Environment variable error: {var} - {reason}")]
    Environment { var: String, reason: String },
}

/// Errors raised while handing rendered content to a destination
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to write rendered output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Delivery target rejected content: {reason}")]
    Rejected { reason: String },
}

/// Shorthand result type for tmplset operations
pub type Result<T> = std::result::Result<T, TmplsetError>;

impl TemplateError {
    /// Create a not-found error for a fully-qualified name
    pub fn not_found(name: impl Into<String>) -> Self {
        TemplateError::NotFound { name: name.into() }
    }

    /// Create a missing-namespace error
    pub fn missing_namespace(namespace: impl Into<String>) -> Self {
        TemplateError::MissingNamespace {
            namespace: namespace.into(),
        }
    }

    /// Name of the template the error refers to, if any
    pub fn template_name(&self) -> Option<&str> {
        match self {
            TemplateError::Parse { name, .. }
            | TemplateError::Association { name, .. }
            | TemplateError::Render { name, .. }
            | TemplateError::NotFound { name }
            | TemplateError::InvalidData { name, .. } => Some(name),
            TemplateError::MissingNamespace { .. } => None,
        }
    }
}

impl ConfigError {
    pub fn invalid(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfig {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}

impl TmplsetError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            TmplsetError::Template(e) => match e {
                TemplateError::Parse { name, .. } => {
                    format!("Template {} could not be parsed", name)
                }
                TemplateError::NotFound { name } => format!("Template not found: {}", name),
                TemplateError::MissingNamespace { namespace } => {
                    format!("No templates were imported for namespace {}", namespace)
                }
                _ => format!("Template error: {}", e),
            },
            TmplsetError::Config(e) => format!("Configuration error: {}", e),
            TmplsetError::Delivery(e) => format!("Could not deliver rendered output: {}", e),
        }
    }

    /// Check if retrying the operation (e.g. after re-importing) can succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            TmplsetError::Template(TemplateError::Parse { .. }) => false,
            TmplsetError::Config(_) => false,
            _ => true,
        }
    }
}
