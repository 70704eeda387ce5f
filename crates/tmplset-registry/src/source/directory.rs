use std::fs;
use std::path::{Component, Path};

use tracing::{debug, info};
use walkdir::WalkDir;

use super::logical_name;
use crate::bundle::TemplateBundle;
use crate::error::SourceError;

impl TemplateBundle {
    /// Gather every `extension` file below `root` into a bundle
    ///
    /// Logical names are the paths relative to `root`, joined with `/`, with
    /// the extension removed. Other files are ignored.
    pub fn from_directory(
        namespace: impl Into<String>,
        root: impl AsRef<Path>,
        extension: &str,
    ) -> Result<Self, SourceError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SourceError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        info!("Importing templates from: {}", root.display());
        let mut bundle = TemplateBundle::new(namespace);

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| SourceError::Walk {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(relative) = relative_path(entry.path(), root) else {
                continue;
            };
            let Some(name) = logical_name(&relative, "", extension) else {
                continue;
            };

            debug!("Checking template path: {}", entry.path().display());
            let bytes = fs::read(entry.path()).map_err(|source| SourceError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let text = String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8 {
                path: entry.path().display().to_string(),
            })?;

            bundle.insert(name, text);
        }

        Ok(bundle)
    }
}

/// Relative path joined with `/`, whatever the host separator
fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
