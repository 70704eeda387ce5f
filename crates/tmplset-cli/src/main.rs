//! tmplset command line
//!
//! Builds persisted template bundles from directories or archives, lists
//! their contents and renders single templates from them.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tmplset::{RenderOptions, StreamDelivery, TemplateKind, TemplateSetConfig};
use tmplset_registry::TemplateSet;
use tmplset_registry::address::verify_digest;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tmplset", version, about = "Namespaced template bundles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Gather templates into a namespace and persist them
    Bundle {
        #[arg(long)]
        namespace: String,
        /// Template directory
        #[arg(long, conflicts_with = "archive", required_unless_present = "archive")]
        dir: Option<PathBuf>,
        /// Tar archive, optionally gzip-compressed
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Directory inside the archive that holds the templates
        #[arg(long, default_value = "")]
        prefix: String,
        /// Extend an existing bundle instead of starting empty
        #[arg(long)]
        base: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Add one template file to a persisted bundle
    Add {
        #[arg(long)]
        bundle: PathBuf,
        #[arg(long)]
        namespace: String,
        /// partial, view, component, dialog, form, layout or regular
        #[arg(long, default_value = "regular")]
        kind: TemplateKind,
        /// Logical name; the kind prefix is added when missing
        #[arg(long)]
        name: String,
        file: PathBuf,
        /// Where to write the result, defaults to --bundle
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the templates in a persisted bundle
    List {
        #[arg(long)]
        bundle: PathBuf,
        /// Refuse the bundle unless it matches this sha256 digest
        #[arg(long)]
        digest: Option<String>,
    },
    /// Render one template from a persisted bundle to stdout
    Render {
        #[arg(long)]
        bundle: PathBuf,
        /// Fully-qualified template name, e.g. app/views/home
        name: String,
        /// JSON file with the render data
        #[arg(long)]
        data: Option<PathBuf>,
        /// Refuse the bundle unless it matches this sha256 digest
        #[arg(long)]
        digest: Option<String>,
    },
}

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "tmplset=info,tmplset_registry=info".to_string()),
        )
        .with_writer(io::stderr)
        .init();

    let config = TemplateSetConfig::from_env().context("invalid TMPLSET_* configuration")?;

    match Cli::parse().command {
        Command::Bundle {
            namespace,
            dir,
            archive,
            prefix,
            base,
            out,
        } => bundle(config, &namespace, dir, archive, &prefix, base, &out),
        Command::Add {
            bundle,
            namespace,
            kind,
            name,
            file,
            out,
        } => add(config, &bundle, &namespace, kind, &name, &file, out.as_deref()),
        Command::List { bundle, digest } => list(config, &bundle, digest.as_deref()),
        Command::Render {
            bundle,
            name,
            data,
            digest,
        } => render(config, &bundle, &name, data, digest.as_deref()),
    }
}

fn restore(config: TemplateSetConfig, bundle: &Path, digest: Option<&str>) -> Result<TemplateSet> {
    let mut set = TemplateSet::with_config(config)?;
    let restored = match digest {
        Some(expected) => {
            let bytes = fs::read(bundle)
                .with_context(|| format!("failed to read {}", bundle.display()))?;
            if !verify_digest(&bytes, expected) {
                bail!("{} does not match digest {}", bundle.display(), expected);
            }
            set.restore_from_binary(bytes)
        }
        None => set.restore_from_disk(bundle),
    };
    restored.with_context(|| format!("failed to restore {}", bundle.display()))?;
    Ok(set)
}

fn bundle(
    config: TemplateSetConfig,
    namespace: &str,
    dir: Option<PathBuf>,
    archive: Option<PathBuf>,
    prefix: &str,
    base: Option<PathBuf>,
    out: &Path,
) -> Result<()> {
    let mut set = match base {
        Some(base) => restore(config, &base, None)?,
        None => TemplateSet::with_config(config)?,
    };

    match (dir, archive) {
        (Some(dir), None) => set
            .gather_from_path(namespace, &dir)
            .with_context(|| format!("failed to gather {}", dir.display()))?,
        (None, Some(archive)) => {
            let file = File::open(&archive)
                .with_context(|| format!("failed to open {}", archive.display()))?;
            set.gather_from_archive(namespace, file, prefix)
                .with_context(|| format!("failed to gather {}", archive.display()))?
        }
        _ => bail!("exactly one of --dir or --archive is required"),
    }

    set.persist_to_disk(out)
        .with_context(|| format!("failed to write {}", out.display()))?;

    info!("Bundled {} templates into {}", set.len(), out.display());
    if let Some(digest) = set.binary_bundle_digest() {
        println!("{digest}");
    }
    Ok(())
}

fn add(
    config: TemplateSetConfig,
    bundle: &Path,
    namespace: &str,
    kind: TemplateKind,
    name: &str,
    file: &Path,
    out: Option<&Path>,
) -> Result<()> {
    let mut set = restore(config, bundle, None)?;
    set.add_template_file(namespace, kind, name, file)
        .with_context(|| format!("failed to add {}", file.display()))?;

    let out = out.unwrap_or(bundle);
    set.persist_to_disk(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    if let Some(digest) = set.binary_bundle_digest() {
        println!("{digest}");
    }
    Ok(())
}

fn list(config: TemplateSetConfig, bundle: &Path, digest: Option<&str>) -> Result<()> {
    let set = restore(config, bundle, digest)?;

    let mut stdout = io::stdout().lock();
    for (name, template) in set.members() {
        writeln!(stdout, "{:<10} {}", template.kind().as_str(), name)?;
    }
    Ok(())
}

fn render(
    config: TemplateSetConfig,
    bundle: &Path,
    name: &str,
    data: Option<PathBuf>,
    digest: Option<&str>,
) -> Result<()> {
    let set = restore(config, bundle, digest)?;

    let data: Value = match data {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))?
        }
        None => Value::Object(Default::default()),
    };

    let mut delivery = StreamDelivery::new(io::stdout().lock());
    set.render_with(name, &data, &mut delivery, RenderOptions::default())?;
    Ok(())
}
