//! Populating a missing config file.
//!
//! When a store loads and its file does not exist, it tries, in order, a
//! legacy migration, an alternate migration and a bundled template. The first
//! source that applies wins.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotconf_core::{decode_document, Charset, Codec, Error, Format};
use dotconf_serde::MultiCodec;

/// Imports an older file into the place of a missing one.
pub trait Migration: Send + Sync {
    /// A short name for log lines.
    fn name(&self) -> &str;

    /// Whether there is anything to import for `target`.
    fn exists(&self, target: &Path) -> bool;

    /// Produce `target`. Called only when `exists` returned true.
    fn migrate(&self, target: &Path) -> Result<(), Error>;
}

/// Moves a file from an old location to the new one.
#[derive(Debug, Clone)]
pub struct MoveFile {
    source: PathBuf,
}

impl MoveFile {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Migration for MoveFile {
    fn name(&self) -> &str {
        "move"
    }

    fn exists(&self, _target: &Path) -> bool {
        self.source.is_file()
    }

    fn migrate(&self, target: &Path) -> Result<(), Error> {
        if fs::rename(&self.source, target).is_ok() {
            return Ok(());
        }

        // Rename fails across filesystems.
        fs::copy(&self.source, target).map_err(|e| Error::io(target, e))?;
        fs::remove_file(&self.source).map_err(|e| Error::io(&self.source, e))
    }
}

/// Re-encodes a file from another format into the target's format.
///
/// The source format is inferred from the source extension and the target
/// format from the target extension. The source file is left in place.
pub struct ConvertFile {
    source: PathBuf,
    codec: Arc<dyn Codec>,
    charset: Charset,
}

impl ConvertFile {
    /// Convert with the default YAML/JSON codecs.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self::with_codec(source, Arc::new(MultiCodec::with_defaults()))
    }

    pub fn with_codec(source: impl Into<PathBuf>, codec: Arc<dyn Codec>) -> Self {
        Self {
            source: source.into(),
            codec,
            charset: Charset::default(),
        }
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }
}

impl fmt::Debug for ConvertFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertFile")
            .field("source", &self.source)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

impl Migration for ConvertFile {
    fn name(&self) -> &str {
        "convert"
    }

    fn exists(&self, _target: &Path) -> bool {
        self.source.is_file()
    }

    fn migrate(&self, target: &Path) -> Result<(), Error> {
        let bytes = fs::read(&self.source).map_err(|e| Error::io(&self.source, e))?;
        let source_format = Format::from_path(&self.source);
        let root = decode_document(&bytes, self.charset, self.codec.as_ref(), &source_format)?;

        let text = self.codec.encode(&root, &Format::from_path(target))?;
        fs::write(target, text).map_err(|e| Error::io(target, e))
    }
}

/// Default contents for a file that has never existed.
#[derive(Debug, Clone)]
pub enum Template {
    /// Bytes compiled into the binary, usually with `include_bytes!`.
    Embedded {
        name: String,
        bytes: &'static [u8],
    },
    /// A file on disk.
    File(PathBuf),
}

impl Template {
    pub fn embedded(name: impl Into<String>, bytes: &'static [u8]) -> Self {
        Template::Embedded {
            name: name.into(),
            bytes,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Template::File(path.into())
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Template::Embedded { name, .. } => Cow::Borrowed(name.as_str()),
            Template::File(path) => path.to_string_lossy(),
        }
    }

    pub fn read(&self) -> Result<Cow<'static, [u8]>, Error> {
        match self {
            Template::Embedded { bytes, .. } => Ok(Cow::Borrowed(*bytes)),
            Template::File(path) => fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| Error::io(path, e)),
        }
    }

    /// Write the template verbatim to `target`.
    pub(crate) fn instantiate(&self, target: &Path) -> Result<(), Error> {
        let bytes = self.read()?;
        fs::write(target, bytes).map_err(|e| Error::io(target, e))
    }
}

/// The sources a store consults for a missing file.
#[derive(Default)]
pub(crate) struct Bootstrap {
    pub(crate) legacy: Option<Box<dyn Migration>>,
    pub(crate) alternate: Option<Box<dyn Migration>>,
    pub(crate) template: Option<Template>,
}

impl Bootstrap {
    /// Populate `target`. Returns false when no source applied.
    ///
    /// Failures are logged and loading carries on with whatever is on disk.
    pub(crate) fn populate(&self, target: &Path) -> bool {
        let migration = [&self.legacy, &self.alternate]
            .into_iter()
            .flatten()
            .find(|m| m.exists(target));

        if let Some(migration) = migration {
            match migration.migrate(target) {
                Ok(()) => log::info!("imported {} ({})", target.display(), migration.name()),
                Err(e) => log::error!(
                    "failed to import {} ({}): {}",
                    target.display(),
                    migration.name(),
                    e
                ),
            }
            return true;
        }

        if let Some(template) = &self.template {
            log::info!(
                "creating {} from template {}",
                target.display(),
                template.name()
            );
            if let Err(e) = template.instantiate(target) {
                log::error!("failed to create {} from template: {}", target.display(), e);
            }
            return true;
        }

        false
    }
}
