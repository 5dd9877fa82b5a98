//! dotconf store: a config document bound to a file
//!
//! [`ConfigStore`] holds one document behind a read/write lock and persists it
//! through a background [`PersistenceWorker`]. Rapid saves coalesce into at
//! most one queued write per store. Loading bootstraps missing files from a
//! [`Migration`] or [`Template`] and quarantines files that cannot be decoded.
//!
//! # Example
//!
//! ```rust,no_run
//! use dotconf_store::{ConfigStore, LoadOutcome, Template};
//!
//! let store = ConfigStore::builder("plugins/Essentials/config.yml")
//!     .template(Template::embedded("config.yml", b"chat:\n  radius: 0\n"))
//!     .build()?;
//!
//! if let LoadOutcome::Quarantined { broken } = store.load() {
//!     eprintln!("config was broken, moved to {}", broken.display());
//! }
//!
//! let radius = store.get_int("chat.radius", 0);
//! store.set("chat.radius", radius + 16)?;
//! store.force_save()?;
//! # Ok::<(), dotconf_core::Error>(())
//! ```

mod bootstrap;
mod file_lock;
mod loader;
mod persist;
mod store;
mod sync;
mod worker;

pub use bootstrap::{ConvertFile, Migration, MoveFile, Template};
pub use loader::LoadOutcome;
pub use persist::PersistStats;
pub use store::{ConfigStore, StoreBuilder};
pub use worker::{PersistHandle, PersistenceWorker};

pub use dotconf_core::{BigDecimal, Charset, Error, Format, Mapping, Path, Value};
