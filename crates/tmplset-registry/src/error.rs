//! Error types for the template set registry

use std::path::PathBuf;

use thiserror::Error;
use tmplset::{ConfigError, DeliveryError, TemplateError, TmplsetError};

/// Registry-specific errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while gathering raw template text from a source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Template directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid UTF-8 content in template: {path}")]
    InvalidUtf8 { path: String },

    #[error("Failed to read archive: {reason}")]
    Archive { reason: String },
}

/// Errors raised while persisting or restoring the raw-text registry
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode template bundle: {0}")]
    Encode(#[source] postcard::Error),

    #[error("Malformed template bundle: {reason}")]
    Malformed { reason: String },

    #[error("The directory for the template bundle, {path}, does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("The bundle path, {path}, does not exist")]
    MissingBundle { path: PathBuf },
}

impl From<TmplsetError> for RegistryError {
    fn from(error: TmplsetError) -> Self {
        match error {
            TmplsetError::Template(e) => RegistryError::Template(e),
            TmplsetError::Config(e) => RegistryError::Config(e),
            TmplsetError::Delivery(e) => RegistryError::Delivery(e),
        }
    }
}

impl RegistryError {
    /// Check if the failed operation can be retried as is
    ///
    /// Imports overwrite by key, so re-importing after a source problem is
    /// always safe; malformed artifacts and bad text are not fixed by retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RegistryError::Template(TemplateError::Parse { .. }) => false,
            RegistryError::Codec(CodecError::Malformed { .. }) => false,
            RegistryError::Codec(CodecError::Encode(_)) => false,
            RegistryError::Config(_) => false,
            _ => true,
        }
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
