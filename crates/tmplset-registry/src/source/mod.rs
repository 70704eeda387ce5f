//! Collaborators that gather raw template text into bundles
//!
//! Every source ends in the same place: a [`TemplateBundle`] whose keys are
//! logical names. Names are derived from source paths the same way on every
//! platform, so a bundle built on Windows matches one built on Linux.

pub mod archive;
pub mod directory;

/// Derive a logical name from a source path
///
/// Both `/` and `\` count as separators. The `root` prefix, any leading `./`
/// or `/`, and the `extension` suffix are removed. Paths that do not end in
/// `extension`, or that lie outside `root`, yield `None`.
pub fn logical_name(path: &str, root: &str, extension: &str) -> Option<String> {
    let path = normalize_separators(path);
    let root = normalize_separators(root);
    let root = root.trim_end_matches('/');

    let relative = if root.is_empty() {
        path.as_str()
    } else {
        let rest = path.strip_prefix(root)?;
        // "templates-old/x" must not match the root "templates"
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        rest
    };

    let relative = relative.trim_start_matches('/');
    let name = relative.strip_suffix(extension)?;
    if name.is_empty() || name.ends_with('/') {
        return None;
    }
    Some(name.to_string())
}

fn normalize_separators(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}
