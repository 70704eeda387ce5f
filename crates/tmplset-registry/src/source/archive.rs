use std::io::Read;

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::{debug, info};

use super::logical_name;
use crate::bundle::TemplateBundle;
use crate::error::SourceError;

impl TemplateBundle {
    /// Gather templates from a tar archive
    ///
    /// Only entries below `prefix` that end in `extension` are read; pass an
    /// empty prefix to take the whole archive. Use this for template trees
    /// embedded in the binary with `include_bytes!`.
    ///
    /// An entry path that is not valid UTF-8 fails the whole archive.
    pub fn from_archive<R: Read>(
        namespace: impl Into<String>,
        reader: R,
        prefix: &str,
        extension: &str,
    ) -> Result<Self, SourceError> {
        let archive_error = |e: std::io::Error| SourceError::Archive {
            reason: e.to_string(),
        };

        info!("Importing templates from archive prefix: {:?}", prefix);
        let mut bundle = TemplateBundle::new(namespace);
        let mut archive = Archive::new(reader);

        for entry in archive.entries().map_err(archive_error)? {
            let mut entry = entry.map_err(archive_error)?;
            if entry.header().entry_type() != EntryType::Regular {
                continue;
            }

            let path = match String::from_utf8(entry.path_bytes().into_owned()) {
                Ok(path) => path,
                Err(e) => {
                    return Err(SourceError::InvalidUtf8 {
                        path: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    });
                }
            };
            let Some(name) = logical_name(&path, prefix, extension) else {
                continue;
            };

            debug!("Reading archived template: {}", path);
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(archive_error)?;
            let text =
                String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8 { path })?;

            bundle.insert(name, text);
        }

        Ok(bundle)
    }

    /// Gather templates from a gzip-compressed tar archive
    pub fn from_gzip_archive<R: Read>(
        namespace: impl Into<String>,
        reader: R,
        prefix: &str,
        extension: &str,
    ) -> Result<Self, SourceError> {
        Self::from_archive(namespace, GzDecoder::new(reader), prefix, extension)
    }
}
