//! Template kinds and prefix-based classification
//!
//! A template's kind is never stored next to its raw text. It is derived from
//! the logical name by matching the configured kind prefixes, and the matching
//! prefix is what turns a logical name into a qualified name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of a template, derived from its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i8)]
pub enum TemplateKind {
    Regular = 0,
    Partial = 1,
    View = 2,
    Component = 3,
    Dialog = 4,
    Form = 5,
    Layout = 6,
}

impl TemplateKind {
    /// Prefixed kinds in the order they are tried by [`PrefixTable::classify`]
    pub const CLASSIFICATION_ORDER: [TemplateKind; 6] = [
        TemplateKind::Partial,
        TemplateKind::View,
        TemplateKind::Component,
        TemplateKind::Dialog,
        TemplateKind::Form,
        TemplateKind::Layout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Regular => "regular",
            TemplateKind::Partial => "partial",
            TemplateKind::View => "view",
            TemplateKind::Component => "component",
            TemplateKind::Dialog => "dialog",
            TemplateKind::Form => "form",
            TemplateKind::Layout => "layout",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regular" => Ok(TemplateKind::Regular),
            "partial" => Ok(TemplateKind::Partial),
            "view" => Ok(TemplateKind::View),
            "component" => Ok(TemplateKind::Component),
            "dialog" => Ok(TemplateKind::Dialog),
            "form" => Ok(TemplateKind::Form),
            "layout" => Ok(TemplateKind::Layout),
            other => Err(format!("unknown template kind: {}", other)),
        }
    }
}

/// Prefix strings for every prefixed template kind
///
/// `Regular` has no prefix. Names are matched with a plain `starts_with`, so a
/// prefix normally ends in `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixTable {
    pub partial: String,
    pub view: String,
    pub component: String,
    pub dialog: String,
    pub form: String,
    pub layout: String,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            partial: "partials/".to_string(),
            view: "views/".to_string(),
            component: "components/".to_string(),
            dialog: "dialogs/".to_string(),
            form: "forms/".to_string(),
            layout: "layouts/".to_string(),
        }
    }
}

impl PrefixTable {
    /// The prefix registered for `kind` (empty for `Regular`)
    pub fn prefix_for(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::Regular => "",
            TemplateKind::Partial => &self.partial,
            TemplateKind::View => &self.view,
            TemplateKind::Component => &self.component,
            TemplateKind::Dialog => &self.dialog,
            TemplateKind::Form => &self.form,
            TemplateKind::Layout => &self.layout,
        }
    }

    /// Classify a logical name; the first matching prefix wins
    pub fn classify(&self, logical_name: &str) -> TemplateKind {
        TemplateKind::CLASSIFICATION_ORDER
            .into_iter()
            .find(|kind| logical_name.starts_with(self.prefix_for(*kind)))
            .unwrap_or(TemplateKind::Regular)
    }

    /// Prefix `logical_name` with the prefix of `kind` unless it already
    /// carries it
    pub fn apply_prefix(&self, kind: TemplateKind, logical_name: &str) -> String {
        let prefix = self.prefix_for(kind);
        if logical_name.starts_with(prefix) {
            logical_name.to_string()
        } else {
            format!("{}{}", prefix, logical_name)
        }
    }
}

/// Join a namespace and a qualified name into the registry-wide key
pub fn fully_qualified_name(namespace: &str, qualified_name: &str) -> String {
    format!("{}/{}", namespace, qualified_name)
}
