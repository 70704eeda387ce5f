//! The template set: every namespace's raw text and every parsed member
//!
//! A set is built during initialization through any number of imports and is
//! read-only afterwards. All mutating operations take `&mut self`; callers
//! that import from several threads must serialize access themselves.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tmplset::render::deliver;
use tmplset::{
    Delivery, RenderOptions, RenderOutcome, SharedFunctions, Template, TemplateError,
    TemplateKind, TemplateSetConfig,
};
use tracing::{debug, info, warn};

use crate::address::bundle_digest;
use crate::association::associate_all;
use crate::bundle::TemplateBundle;
use crate::codec::{self, RawTextMap};
use crate::error::{CodecError, Result, SourceError};

/// Registry of namespaced, mutually associated templates
#[derive(Debug, Default)]
pub struct TemplateSet {
    config: TemplateSetConfig,
    functions: SharedFunctions,
    namespaces: BTreeMap<String, TemplateBundle>,
    members: BTreeMap<String, Template>,
    binary_bundle: Option<Vec<u8>>,
}

impl TemplateSet {
    /// Create an empty set with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with `config`
    pub fn with_config(config: TemplateSetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &TemplateSetConfig {
        &self.config
    }

    /// Functions and filters installed into templates parsed from now on
    pub fn functions(&self) -> &SharedFunctions {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut SharedFunctions {
        &mut self.functions
    }

    /// All parsed templates, keyed by fully-qualified name
    pub fn members(&self) -> &BTreeMap<String, Template> {
        &self.members
    }

    /// Look up a template by fully-qualified name
    pub fn lookup(&self, name: &str) -> Option<&Template> {
        self.members.get(name)
    }

    /// Like [`lookup`](Self::lookup), failing with `NotFound`
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.lookup(name)
            .ok_or_else(|| TemplateError::not_found(name).into())
    }

    /// Raw-text bundle of an imported namespace
    pub fn bundle(&self, namespace: &str) -> Result<&TemplateBundle> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| TemplateError::missing_namespace(namespace).into())
    }

    /// Names of all imported namespaces
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Raw text of every namespace, as persisted by [`encode`](Self::encode)
    pub fn raw_text(&self) -> RawTextMap {
        self.namespaces
            .iter()
            .map(|(namespace, bundle)| (namespace.clone(), bundle.items().clone()))
            .collect()
    }

    /// Import a bundle into `namespace` and re-associate the whole set
    ///
    /// Each item is classified by its name, parsed and stored under its
    /// fully-qualified name, replacing any previous member there. The first
    /// parse failure stops the import: items before it stay imported (and are
    /// merged into the namespace's raw text), items after it are not.
    pub fn import_bundle(&mut self, namespace: &str, bundle: TemplateBundle) -> Result<()> {
        info!(
            "Importing {} templates into namespace {}",
            bundle.len(),
            namespace
        );

        let mut imported = Vec::with_capacity(bundle.len());
        for (logical_name, text) in bundle.into_items() {
            let kind = self.config.prefixes.classify(&logical_name);
            let qualified_name = self.config.prefixes.apply_prefix(kind, &logical_name);

            let template = match Template::parse(
                namespace,
                kind,
                qualified_name,
                text.as_str(),
                &self.functions,
                self.config.autoescape,
            ) {
                Ok(template) => template,
                Err(e) => {
                    warn!("Stopping import into {}: {}", namespace, e);
                    self.merge_items(namespace, imported);
                    return Err(e.into());
                }
            };

            self.members.insert(template.name().to_string(), template);
            imported.push((logical_name, text));
        }

        self.merge_items(namespace, imported);
        self.make_all_associations()
    }

    /// Register one template without re-associating the set
    ///
    /// The new template is neither visible to the others nor able to include
    /// them until [`make_all_associations`](Self::make_all_associations) runs
    /// or the next import does.
    ///
    /// The raw text is stored under the qualified name only, so a restore
    /// classifies it again from that name. A name that carries another kind's
    /// prefix, such as a `Regular` template called `views/x`, comes back as
    /// that other kind.
    pub fn add_single_file(
        &mut self,
        namespace: &str,
        kind: TemplateKind,
        logical_name: &str,
        text: impl Into<String>,
    ) -> Result<()> {
        let text = text.into();
        let qualified_name = self.config.prefixes.apply_prefix(kind, logical_name);
        let template = Template::parse(
            namespace,
            kind,
            qualified_name.as_str(),
            text.as_str(),
            &self.functions,
            self.config.autoescape,
        )?;

        debug!("Added single template {}", template.name());
        self.members.insert(template.name().to_string(), template);
        self.merge_items(namespace, [(qualified_name, text)]);
        Ok(())
    }

    /// Read a template file and register it like [`add_single_file`](Self::add_single_file)
    pub fn add_template_file(
        &mut self,
        namespace: &str,
        kind: TemplateKind,
        logical_name: &str,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_single_file(namespace, kind, logical_name, text)
    }

    /// Make every member able to include every other member
    pub fn make_all_associations(&mut self) -> Result<()> {
        associate_all(&mut self.members)?;
        Ok(())
    }

    /// Gather a template directory into `namespace`
    pub fn gather_from_path(&mut self, namespace: &str, path: impl AsRef<Path>) -> Result<()> {
        let bundle = TemplateBundle::from_directory(namespace, path, &self.config.file_extension)?;
        self.import_bundle(namespace, bundle)
    }

    /// Gather templates below `prefix` of a tar archive into `namespace`
    ///
    /// Gzip-compressed archives are detected by their magic bytes.
    pub fn gather_from_archive<R: Read>(
        &mut self,
        namespace: &str,
        mut reader: R,
        prefix: &str,
    ) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let extension = &self.config.file_extension;
        let bundle = if bytes.starts_with(&[0x1f, 0x8b]) {
            TemplateBundle::from_gzip_archive(namespace, bytes.as_slice(), prefix, extension)?
        } else {
            TemplateBundle::from_archive(namespace, bytes.as_slice(), prefix, extension)?
        };
        self.import_bundle(namespace, bundle)
    }

    /// Render a member with `data`
    pub fn render<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<Vec<u8>> {
        let rendered = self.get(name)?.render(data)?;
        Ok(rendered.into_bytes())
    }

    /// Render a member and hand the output to `delivery`
    pub fn render_with<T: Serialize + ?Sized>(
        &self,
        name: &str,
        data: &T,
        delivery: &mut dyn Delivery,
        options: RenderOptions,
    ) -> Result<RenderOutcome> {
        let rendered = self.get(name)?.render(data)?;
        Ok(deliver(rendered, delivery, options)?)
    }

    /// Encode the raw text of every namespace
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(codec::encode(&self.raw_text())?)
    }

    /// Encode the set and write it to `bundle_path`
    ///
    /// The parent directory must exist. The encoded bytes are kept and
    /// returned by [`binary_bundle`](Self::binary_bundle); later imports do not
    /// update them.
    pub fn persist_to_disk(&mut self, bundle_path: impl AsRef<Path>) -> Result<()> {
        let bundle_path = bundle_path.as_ref();
        let directory = match bundle_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !directory.is_dir() {
            return Err(CodecError::MissingDirectory {
                path: directory.to_path_buf(),
            }
            .into());
        }

        let bytes = self.encode()?;
        fs::write(bundle_path, &bytes)?;
        info!(
            "Persisted {} namespaces to {} ({} bytes, {})",
            self.namespaces.len(),
            bundle_path.display(),
            bytes.len(),
            bundle_digest(&bytes)
        );
        self.binary_bundle = Some(bytes);
        Ok(())
    }

    /// Read a persisted bundle and import it
    pub fn restore_from_disk(&mut self, bundle_path: impl AsRef<Path>) -> Result<()> {
        let bundle_path = bundle_path.as_ref();
        if !bundle_path.is_file() {
            return Err(CodecError::MissingBundle {
                path: bundle_path.to_path_buf(),
            }
            .into());
        }

        let bytes = fs::read(bundle_path)?;
        self.restore_from_binary(bytes)
    }

    /// Decode a persisted bundle and import every namespace in it
    ///
    /// Each namespace goes through [`import_bundle`](Self::import_bundle), so
    /// everything is re-classified, re-parsed and re-associated.
    pub fn restore_from_binary(&mut self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        let bytes = bytes.into();
        let raw = codec::decode(&bytes)?;
        debug!("Restoring {} namespaces from binary bundle", raw.len());
        self.binary_bundle = Some(bytes);

        for (namespace, items) in raw {
            let bundle = TemplateBundle::from_items(namespace.as_str(), items);
            self.import_bundle(&namespace, bundle)?;
        }
        Ok(())
    }

    /// Bytes of the last persisted or restored bundle
    pub fn binary_bundle(&self) -> Option<&[u8]> {
        self.binary_bundle.as_deref()
    }

    /// Digest of [`binary_bundle`](Self::binary_bundle)
    pub fn binary_bundle_digest(&self) -> Option<String> {
        self.binary_bundle().map(bundle_digest)
    }

    fn merge_items<I>(&mut self, namespace: &str, items: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| TemplateBundle::new(namespace))
            .add_items(items);
    }
}
