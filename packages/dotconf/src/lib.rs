//! dotconf: hierarchical config documents bound to files.
//!
//! Values live at dotted paths (`chat.radius`) inside a YAML or JSON document.
//! A [`ConfigStore`] can be shared between threads; saves are written by a
//! background worker and coalesce while a write is pending. Files that cannot
//! be decoded are moved aside instead of failing the host.
//!
//! The crate re-exports three layers:
//! - [`document`]: `Path`, `Value`, `Codec`, charset fallback and errors
//! - [`codecs`]: YAML/JSON codecs and typed access through serde
//! - [`store`]: `ConfigStore`, the persistence worker and bootstrap sources
//!
//! ```rust,no_run
//! use dotconf::{ConfigStore, TypedReader};
//!
//! let store = ConfigStore::open("userdata/alice.yml")?;
//! store.load();
//! let balance = store.get_decimal("money", dotconf::BigDecimal::from(0));
//! let homes: Option<Vec<String>> = store.read_as(&dotconf::path!("homes"))?;
//! # let _ = (balance, homes);
//! # Ok::<(), dotconf::Error>(())
//! ```

pub use dotconf_core as document;
pub use dotconf_serde as codecs;
pub use dotconf_store as store;

pub use dotconf_core::{
    path, BigDecimal, Charset, Codec, Error, Format, Mapping, Path, Reader, StructuralError,
    Value, Writer,
};
pub use dotconf_serde::{JsonCodec, MultiCodec, TypedReader, TypedWriter, YamlCodec};
pub use dotconf_store::{
    ConfigStore, ConvertFile, LoadOutcome, Migration, MoveFile, PersistHandle, PersistStats,
    PersistenceWorker, StoreBuilder, Template,
};
