//! The concurrent config store.

use std::fmt;
use std::path::{Path as FsPath, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use dotconf_core::{
    to_decimal, BigDecimal, Charset, Codec, Error, Format, IndexMap, Mapping, Path, Reader,
    Value, Writer,
};
use dotconf_serde::MultiCodec;

use crate::bootstrap::{Bootstrap, Migration, Template};
use crate::file_lock::{file_lock, FileLock};
use crate::persist::{PersistSlot, PersistStats, StatsCounters};
use crate::sync::{read, write};
use crate::worker::{PersistHandle, PersistenceWorker};

/// A config document bound to one file.
///
/// `ConfigStore` is a cheap handle: clones share the same document, lock and
/// persistence state. Every accessor may be called from any thread.
///
/// Mutations only touch memory. Call [`save`](Self::save) to schedule a
/// background write, or [`force_save`](Self::force_save) to write and wait.
///
/// ```rust,no_run
/// use dotconf_store::ConfigStore;
///
/// let store = ConfigStore::open("plugins/Essentials/config.yml")?;
/// store.load();
/// store.set("chat.radius", 64)?;
/// store.save();
/// # Ok::<(), dotconf_core::Error>(())
/// ```
#[derive(Clone)]
pub struct ConfigStore {
    pub(crate) inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
    pub(crate) file: PathBuf,
    pub(crate) format: Format,
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) charset: Charset,
    pub(crate) bootstrap: Bootstrap,
    pub(crate) worker: Arc<PersistenceWorker>,
    pub(crate) file_lock: FileLock,

    pub(crate) document: RwLock<Value>,
    pub(crate) transaction: AtomicBool,
    pub(crate) slot: Mutex<PersistSlot>,
    pub(crate) load_lock: Mutex<()>,
    pub(crate) stats: StatsCounters,
}

impl StoreInner {
    pub(crate) fn save_to_string(&self) -> Result<String, Error> {
        let document = read(&self.document);
        self.codec.encode(&document, &self.format)
    }
}

/// Builder for [`ConfigStore`].
pub struct StoreBuilder {
    file: PathBuf,
    format: Option<Format>,
    codec: Option<Arc<dyn Codec>>,
    charset: Charset,
    bootstrap: Bootstrap,
    worker: Option<Arc<PersistenceWorker>>,
}

impl StoreBuilder {
    fn new(file: PathBuf) -> Self {
        Self {
            file,
            format: None,
            codec: None,
            charset: Charset::default(),
            bootstrap: Bootstrap::default(),
            worker: None,
        }
    }

    /// The codec used for loading and saving. Defaults to YAML + JSON.
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Override the format inferred from the file extension.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// The charset tried when the file is not valid UTF-8.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn template(mut self, template: Template) -> Self {
        self.bootstrap.template = Some(template);
        self
    }

    pub fn legacy_migration(mut self, migration: impl Migration + 'static) -> Self {
        self.bootstrap.legacy = Some(Box::new(migration));
        self
    }

    pub fn alt_migration(mut self, migration: impl Migration + 'static) -> Self {
        self.bootstrap.alternate = Some(Box::new(migration));
        self
    }

    /// Persist on a dedicated worker instead of the global one.
    pub fn worker(mut self, worker: Arc<PersistenceWorker>) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Bind the store. No I/O happens until [`ConfigStore::load`].
    pub fn build(self) -> Result<ConfigStore, Error> {
        if self.file.as_os_str().is_empty() || self.file.file_name().is_none() {
            return Err(Error::InvalidArgument {
                message: format!("config path {:?} does not name a file", self.file),
            });
        }

        let file = std::path::absolute(&self.file).map_err(|e| Error::io(&self.file, e))?;
        let format = self.format.unwrap_or_else(|| Format::from_path(&file));
        let codec = self
            .codec
            .unwrap_or_else(|| Arc::new(MultiCodec::with_defaults()));

        if !codec.supports(&format) {
            return Err(Error::UnsupportedFormat(format));
        }

        Ok(ConfigStore {
            inner: Arc::new(StoreInner {
                file_lock: file_lock(&file),
                file,
                format,
                codec,
                charset: self.charset,
                bootstrap: self.bootstrap,
                worker: self.worker.unwrap_or_else(PersistenceWorker::global),
                document: RwLock::new(Value::mapping()),
                transaction: AtomicBool::new(false),
                slot: Mutex::new(PersistSlot::default()),
                load_lock: Mutex::new(()),
                stats: StatsCounters::default(),
            }),
        })
    }
}

impl ConfigStore {
    pub fn builder(file: impl Into<PathBuf>) -> StoreBuilder {
        StoreBuilder::new(file.into())
    }

    /// Bind a store with default settings.
    pub fn open(file: impl Into<PathBuf>) -> Result<Self, Error> {
        Self::builder(file).build()
    }

    /// The absolute path of the backing file.
    pub fn file(&self) -> &FsPath {
        &self.inner.file
    }

    pub fn format(&self) -> &Format {
        &self.inner.format
    }

    /// Run `f` with shared access to the document.
    pub fn read_locked<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&read(&self.inner.document))
    }

    /// Run `f` with exclusive access to the document.
    pub fn write_locked<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut write(&self.inner.document))
    }

    pub fn get(&self, path: impl Into<Path>) -> Option<Value> {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).cloned())
    }

    pub fn get_value(&self, path: impl Into<Path>, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// Any scalar rendered as text. Null, sequences and mappings give `default`.
    pub fn get_string(&self, path: impl Into<Path>, default: &str) -> String {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).and_then(Value::to_text))
            .unwrap_or_else(|| default.to_string())
    }

    /// Integers, and floats truncated toward zero.
    pub fn get_int(&self, path: impl Into<Path>, default: i64) -> i64 {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).and_then(Value::as_i64))
            .unwrap_or(default)
    }

    pub fn get_float(&self, path: impl Into<Path>, default: f64) -> f64 {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).and_then(Value::as_f64))
            .unwrap_or(default)
    }

    pub fn get_bool(&self, path: impl Into<Path>, default: bool) -> bool {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).and_then(Value::as_bool))
            .unwrap_or(default)
    }

    /// The value's text parsed as an exact decimal, rounded to 34 significant
    /// digits. Anything unparseable gives `default`.
    pub fn get_decimal(&self, path: impl Into<Path>, default: BigDecimal) -> BigDecimal {
        let path = path.into();
        let text = self.read_locked(|doc| doc.get(&path).and_then(Value::to_text));
        to_decimal(text.as_deref(), default)
    }

    pub fn get_list(&self, path: impl Into<Path>) -> Option<Vec<Value>> {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).and_then(Value::as_sequence).map(<[Value]>::to_vec))
    }

    /// Scalar items of a sequence as text. Nested items are skipped.
    pub fn get_string_list(&self, path: impl Into<Path>) -> Vec<String> {
        let path = path.into();
        self.read_locked(|doc| {
            doc.get(&path)
                .and_then(Value::as_sequence)
                .map(|items| items.iter().filter_map(Value::to_text).collect())
                .unwrap_or_default()
        })
    }

    pub fn get_mapping(&self, path: impl Into<Path>) -> Option<Mapping> {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).and_then(Value::as_mapping).cloned())
    }

    /// Keys of the root mapping. With `deep`, nested keys are added as dotted
    /// paths after their parent.
    pub fn get_keys(&self, deep: bool) -> Vec<String> {
        self.read_locked(|doc| doc.keys(deep))
    }

    pub fn get_values(&self, deep: bool) -> IndexMap<String, Value> {
        self.read_locked(|doc| doc.values(deep))
    }

    /// [`get_keys`](Self::get_keys) scoped to the mapping at `path`.
    pub fn keys_at(&self, path: impl Into<Path>, deep: bool) -> Vec<String> {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).map(|v| v.keys(deep)).unwrap_or_default())
    }

    /// True when anything, explicit null included, is stored at `path`.
    pub fn has_property(&self, path: impl Into<Path>) -> bool {
        let path = path.into();
        self.read_locked(|doc| doc.get(&path).is_some())
    }

    /// Store `value` at `path`. [`Value::Null`] removes the path.
    pub fn set(&self, path: impl Into<Path>, value: impl Into<Value>) -> Result<(), Error> {
        let path = path.into();
        let value = value.into();
        self.write_locked(|doc| doc.set(&path, value))
    }

    pub fn set_decimal(&self, path: impl Into<Path>, value: &BigDecimal) -> Result<(), Error> {
        self.set(path, value.to_string())
    }

    pub fn remove(&self, path: impl Into<Path>) -> Option<Value> {
        let path = path.into();
        self.write_locked(|doc| doc.remove(&path))
    }

    /// Encode the document as it would be written to disk.
    pub fn save_to_string(&self) -> Result<String, Error> {
        self.inner.save_to_string()
    }

    /// Schedule a background write. Does nothing inside a transaction.
    pub fn save(&self) {
        if !self.is_in_transaction() {
            self.schedule_persist();
        }
    }

    /// Write the document and wait for the result.
    ///
    /// Joins a write that is already queued rather than adding another.
    pub fn force_save(&self) -> Result<(), Error> {
        self.schedule_persist().wait()
    }

    /// Flush before shutdown. Same as [`force_save`](Self::force_save).
    pub fn cleanup(&self) -> Result<(), Error> {
        self.force_save()
    }

    /// Suppress [`save`](Self::save) until the transaction is stopped.
    pub fn start_transaction(&self) {
        self.inner.transaction.store(true, Ordering::SeqCst);
    }

    /// End the transaction and schedule one write covering it.
    pub fn stop_transaction(&self) -> PersistHandle {
        self.inner.transaction.store(false, Ordering::SeqCst);
        self.schedule_persist()
    }

    pub fn is_in_transaction(&self) -> bool {
        self.inner.transaction.load(Ordering::SeqCst)
    }

    pub fn persist_stats(&self) -> PersistStats {
        self.inner.stats.snapshot()
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("file", &self.inner.file)
            .field("format", &self.inner.format)
            .field("charset", &self.inner.charset)
            .field("in_transaction", &self.is_in_transaction())
            .finish_non_exhaustive()
    }
}

impl Reader for ConfigStore {
    fn read(&self, from: &Path) -> Option<Value> {
        self.get(from)
    }
}

impl Writer for ConfigStore {
    fn write(&self, to: &Path, value: Value) -> Result<(), Error> {
        self.set(to, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn store() -> ConfigStore {
        ConfigStore::open("/tmp/dotconf-unit/store.yml").unwrap()
    }

    #[test]
    fn builder_rejects_empty_path() {
        let err = ConfigStore::open("").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        let err = ConfigStore::open("config/..").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn builder_infers_format_and_absolutizes() {
        let store = ConfigStore::open("relative/settings.json").unwrap();
        assert!(store.file().is_absolute());
        assert!(store.format().is_json());

        let store = ConfigStore::open("relative/settings.yml").unwrap();
        assert!(store.format().is_yaml());
    }

    #[test]
    fn builder_rejects_unsupported_format() {
        let err = ConfigStore::builder("/tmp/x.toml")
            .format(Format::new("application/toml"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn scalar_roundtrip() {
        let store = store();
        store.set("text", "hello").unwrap();
        store.set("int", 42).unwrap();
        store.set("float", 1.5).unwrap();
        store.set("flag", true).unwrap();

        assert_eq!(store.get_string("text", ""), "hello");
        assert_eq!(store.get_int("int", 0), 42);
        assert_eq!(store.get_float("float", 0.0), 1.5);
        assert!(store.get_bool("flag", false));
    }

    #[test]
    fn coercions_and_defaults() {
        let store = store();
        store.set("n", 7).unwrap();
        store.set("f", 2.9).unwrap();
        store.set("s", "x").unwrap();
        store.set("m.k", 1).unwrap();

        assert_eq!(store.get_string("n", "d"), "7");
        assert_eq!(store.get_string("m", "d"), "d");
        assert_eq!(store.get_int("f", 0), 2);
        assert_eq!(store.get_int("s", -1), -1);
        assert_eq!(store.get_float("n", 0.0), 7.0);
        assert!(!store.get_bool("n", false));
        assert_eq!(store.get_int("missing", 5), 5);
        assert_eq!(store.get_value("missing", Value::from("d")), Value::from("d"));
    }

    #[test]
    fn null_removes_but_keeps_parent() {
        let store = store();
        store.set("a.b", 1).unwrap();
        store.set("a.b", Value::Null).unwrap();
        assert!(!store.has_property("a.b"));
        assert!(store.has_property("a"));
        assert_eq!(store.get_mapping("a"), Some(Mapping::new()));
    }

    #[test]
    fn set_root_is_invalid_path() {
        let err = store().set("", 1).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn lists() {
        let store = store();
        store
            .set(
                "homes",
                vec![Value::from("spawn"), Value::from(3), Value::mapping()],
            )
            .unwrap();
        assert_eq!(store.get_list("homes").map(|l| l.len()), Some(3));
        assert_eq!(store.get_string_list("homes"), vec!["spawn", "3"]);
        assert!(store.get_string_list("nope").is_empty());
    }

    #[test]
    fn deep_keys_include_sections() {
        let store = store();
        store.set("a.b", 1).unwrap();
        store.set("a.c.d", 2).unwrap();
        store.set("e", 3).unwrap();

        assert_eq!(store.get_keys(false), vec!["a", "e"]);
        assert_eq!(store.get_keys(true), vec!["a", "a.b", "a.c", "a.c.d", "e"]);
        assert_eq!(store.keys_at("a", false), vec!["b", "c"]);
        assert_eq!(store.keys_at("a", true), vec!["b", "c", "c.d"]);
        assert!(store.keys_at("e", true).is_empty());

        let values = store.get_values(true);
        assert_eq!(values.get("a.c.d"), Some(&Value::Integer(2)));
    }

    #[test]
    fn decimals() {
        let store = store();
        store
            .set("price", "19.999999999999999999999999999999")
            .unwrap();
        store.set("bad", "abc").unwrap();

        let default = BigDecimal::from(0);
        assert_eq!(
            store.get_decimal("price", default.clone()),
            BigDecimal::from_str("19.999999999999999999999999999999").unwrap()
        );
        assert_eq!(store.get_decimal("bad", default.clone()), default);

        let exact = BigDecimal::from_str("0.1").unwrap();
        store.set_decimal("rate", &exact).unwrap();
        assert_eq!(store.get_string("rate", ""), "0.1");
        assert_eq!(store.get_decimal("rate", default), exact);
    }

    #[test]
    fn transaction_flag() {
        let store = store();
        assert!(!store.is_in_transaction());
        store.start_transaction();
        assert!(store.is_in_transaction());
    }

    #[test]
    fn clones_share_document() {
        let a = store();
        let b = a.clone();
        a.set("shared", 1).unwrap();
        assert_eq!(b.get_int("shared", 0), 1);
    }

    #[test]
    fn reader_writer_traits() {
        let store = store();
        let path = Path::parse("kits.tools.delay");
        store.write(&path, Value::from(10)).unwrap();
        assert_eq!(store.read(&path), Some(Value::Integer(10)));
    }
}
