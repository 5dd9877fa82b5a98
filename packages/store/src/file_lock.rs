//! Process-wide locks keyed by file path.
//!
//! Two stores bound to the same file share one lock, so their writes and
//! loads never interleave on disk. Entries are weak: once every store for a
//! path is dropped the lock goes away with it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use crate::sync::lock;

pub(crate) type FileLock = Arc<Mutex<()>>;

static FILE_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> = OnceLock::new();

/// Get the lock for `file`, creating it if no live store holds one.
pub(crate) fn file_lock(file: &Path) -> FileLock {
    let registry = FILE_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locks = lock(registry);

    if let Some(existing) = locks.get(file).and_then(Weak::upgrade) {
        return existing;
    }

    locks.retain(|_, weak| weak.strong_count() > 0);

    let fresh = Arc::new(Mutex::new(()));
    locks.insert(file.to_path_buf(), Arc::downgrade(&fresh));
    fresh
}
