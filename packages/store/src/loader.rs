//! Loading a store from disk.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use dotconf_core::{decode_document, is_corrupt, Error, Value};

use crate::store::ConfigStore;
use crate::sync::lock;

/// What [`ConfigStore::load`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document was replaced with the file's contents.
    Loaded,
    /// A write was queued or running, so the file was not read.
    Skipped,
    /// The file does not exist and nothing could create it.
    Missing,
    /// The file could not be read. The previous document is kept.
    ReadFailed,
    /// The file was unreadable as a document and has been renamed to `broken`.
    /// The document is now empty.
    Quarantined { broken: PathBuf },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

impl ConfigStore {
    /// Read the backing file into memory.
    ///
    /// Never fails: problems are logged and reported through the outcome.
    /// A missing file is first populated from the configured migrations or
    /// template. A file that cannot be decoded is moved aside to
    /// `<file>.broken.<unix-ms>` and the store starts out empty.
    pub fn load(&self) -> LoadOutcome {
        let inner = &self.inner;
        let _loading = lock(&inner.load_lock);

        if self.is_persist_pending() {
            log::info!(
                "{} not read, it has not been written to disk yet",
                inner.file.display()
            );
            return LoadOutcome::Skipped;
        }

        let _file_guard = lock(&inner.file_lock);
        let file = inner.file.as_path();

        if let Some(parent) = file.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    log::error!("failed to create {}: {}", parent.display(), e);
                }
            }
        }

        discard_if_corrupt(file);

        if !file.exists() && (!inner.bootstrap.populate(file) || !file.exists()) {
            return LoadOutcome::Missing;
        }

        log::debug!("reading {}", file.display());
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("failed to read {}: {}", file.display(), e);
                return LoadOutcome::ReadFailed;
            }
        };

        match decode_document(&bytes, inner.charset, inner.codec.as_ref(), &inner.format) {
            Ok(root) => {
                self.write_locked(|doc| *doc = root);
                LoadOutcome::Loaded
            }
            Err(e) if e.is_structural() => self.quarantine(&e),
            Err(e) => {
                log::error!("failed to load {}: {}", file.display(), e);
                LoadOutcome::ReadFailed
            }
        }
    }

    /// Caller holds the file lock.
    fn quarantine(&self, cause: &Error) -> LoadOutcome {
        let file = self.file();
        let broken = broken_path(file, chrono::Utc::now().timestamp_millis());

        match fs::rename(file, &broken) {
            Ok(()) => log::error!(
                "{} is broken ({}), it has been renamed to {}",
                file.display(),
                cause,
                broken.display()
            ),
            Err(e) => log::error!(
                "{} is broken ({}) and could not be renamed to {}: {}",
                file.display(),
                cause,
                broken.display(),
                e
            ),
        }

        self.write_locked(|doc| *doc = Value::mapping());
        LoadOutcome::Quarantined { broken }
    }
}

fn broken_path(file: &Path, millis: i64) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(format!(".broken.{}", millis));
    PathBuf::from(name)
}

/// Delete `file` when its first byte is NUL.
fn discard_if_corrupt(file: &Path) {
    let mut first = [0u8; 1];
    let read = fs::File::open(file).and_then(|mut f| f.read(&mut first));

    if let Ok(1) = read {
        if is_corrupt(&first) {
            log::warn!("{} starts with a NUL byte, deleting it", file.display());
            if let Err(e) = fs::remove_file(file) {
                log::error!("failed to delete {}: {}", file.display(), e);
            }
        }
    }
}
