//! Template set configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::kind::{PrefixTable, TemplateKind};

/// Configuration shared by classification, ingestion and parsing
///
/// Held by the template set for its whole lifetime. Changing the prefixes of
/// a set that already holds templates does not re-classify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSetConfig {
    /// Kind prefixes used to classify and qualify logical names
    pub prefixes: PrefixTable,

    /// Extension of template source files, stripped from logical names
    pub file_extension: String,

    /// Whether rendered variables are HTML-escaped
    pub autoescape: bool,
}

impl Default for TemplateSetConfig {
    fn default() -> Self {
        Self {
            prefixes: PrefixTable::default(),
            file_extension: ".tmpl".to_string(),
            autoescape: true,
        }
    }
}

impl TemplateSetConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let prefix = |var: &str, default: &str| {
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        };

        let config = Self {
            prefixes: PrefixTable {
                partial: prefix("TMPLSET_PREFIX_PARTIAL", &defaults.prefixes.partial),
                view: prefix("TMPLSET_PREFIX_VIEW", &defaults.prefixes.view),
                component: prefix("TMPLSET_PREFIX_COMPONENT", &defaults.prefixes.component),
                dialog: prefix("TMPLSET_PREFIX_DIALOG", &defaults.prefixes.dialog),
                form: prefix("TMPLSET_PREFIX_FORM", &defaults.prefixes.form),
                layout: prefix("TMPLSET_PREFIX_LAYOUT", &defaults.prefixes.layout),
            },
            file_extension: std::env::var("TMPLSET_FILE_EXTENSION")
                .unwrap_or(defaults.file_extension),
            autoescape: match std::env::var("TMPLSET_AUTOESCAPE") {
                Ok(value) => parse_bool("TMPLSET_AUTOESCAPE", &value)?,
                Err(_) => defaults.autoescape,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Set the kind prefixes
    pub fn with_prefixes(mut self, prefixes: PrefixTable) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Set the template file extension
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Enable or disable HTML escaping
    pub fn with_autoescape(mut self, autoescape: bool) -> Self {
        self.autoescape = autoescape;
        self
    }

    /// Check that every prefix and the extension are usable
    ///
    /// An empty prefix would match every name and shadow all kinds after it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in TemplateKind::CLASSIFICATION_ORDER {
            if self.prefixes.prefix_for(kind).is_empty() {
                return Err(ConfigError::invalid(
                    format!("prefixes.{}", kind),
                    "prefix cannot be empty",
                ));
            }
        }

        if self.file_extension.is_empty() {
            return Err(ConfigError::invalid(
                "file_extension",
                "extension cannot be empty",
            ));
        }

        Ok(())
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Environment {
            var: var.to_string(),
            reason: format!("expected a boolean, got {:?}", value),
        }),
    }
}
