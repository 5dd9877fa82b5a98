//! The Value type - the in-memory document tree.
//!
//! A parsed config file is a tree of mappings, sequences and scalars. Mapping
//! keys keep their insertion order so a document written back to disk looks
//! like the one that was read.

use indexmap::IndexMap;

use crate::{Error, Path};

/// A mapping node. Iteration follows insertion order.
pub type Mapping = IndexMap<String, Value>;

/// A node in a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// An explicit null. Distinct from "path doesn't exist".
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Ordered sequence of values.
    Sequence(Vec<Value>),
    /// Key-value mapping with string keys.
    Mapping(Mapping),
}

impl Value {
    /// Create an empty mapping.
    pub fn mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    /// Create an empty sequence.
    pub fn sequence() -> Self {
        Value::Sequence(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    /// True for null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// A short name for the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integers as-is; floats truncate toward zero when in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 => {
                Some(f.trunc() as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Render a non-null scalar as text. Mappings, sequences and null give
    /// `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(format!("{:?}", f)),
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }

    /// Get a reference to a nested value by path.
    ///
    /// Every intermediate component must name a mapping; anything else
    /// (a missing key, a scalar, a sequence) makes the path absent.
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Mapping(map) => map.get(component)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get a mutable reference to a nested value by path.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Mapping(map) => map.get_mut(component)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a value at a path, creating intermediate mappings as needed.
    ///
    /// Setting [`Value::Null`] removes the path instead. An intermediate node
    /// that is not a mapping is replaced by a fresh mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for the root path.
    pub fn set(&mut self, path: &Path, value: Value) -> Result<(), Error> {
        let Some(last) = path.last() else {
            return Err(Error::InvalidPath {
                message: "cannot set a value at the root path".to_string(),
            });
        };

        if value.is_null() {
            self.remove(path);
            return Ok(());
        }

        let mut current = self;
        for component in &path.components[..path.len() - 1] {
            let map = current.ensure_mapping();
            current = map
                .entry(component.clone())
                .or_insert_with(Value::mapping);
        }
        current.ensure_mapping().insert(last.to_string(), value);
        Ok(())
    }

    /// Remove a value at a path, returning it if it existed.
    ///
    /// Parents are kept even when they become empty. The root cannot be
    /// removed.
    pub fn remove(&mut self, path: &Path) -> Option<Value> {
        let parent = path.parent()?;
        let last = path.last()?;
        match self.get_mut(&parent)? {
            Value::Mapping(map) => map.shift_remove(last),
            _ => None,
        }
    }

    fn ensure_mapping(&mut self) -> &mut Mapping {
        if !self.is_mapping() {
            *self = Value::mapping();
        }
        match self {
            Value::Mapping(map) => map,
            _ => unreachable!("value was just replaced by a mapping"),
        }
    }

    /// Keys of this mapping.
    ///
    /// With `deep`, entries of nested mappings are included as dotted paths
    /// right after their parent key. Sequences are not descended. A
    /// non-mapping value has no keys.
    pub fn keys(&self, deep: bool) -> Vec<String> {
        let mut keys = Vec::new();
        self.walk(&Path::root(), deep, &mut |path, _| keys.push(path.to_string()));
        keys
    }

    /// Like [`Value::keys`], paired with a clone of each value.
    pub fn values(&self, deep: bool) -> IndexMap<String, Value> {
        let mut values = IndexMap::new();
        self.walk(&Path::root(), deep, &mut |path, value| {
            values.insert(path.to_string(), value.clone());
        });
        values
    }

    fn walk(&self, prefix: &Path, deep: bool, visit: &mut dyn FnMut(&Path, &Value)) {
        let Value::Mapping(map) = self else {
            return;
        };
        for (key, value) in map {
            let path = prefix.join(&Path {
                components: vec![key.clone()],
            });
            visit(&path, value);
            if deep {
                value.walk(&path, deep, visit);
            }
        }
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Value::Mapping(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use proptest::prelude::*;

    fn sample() -> Value {
        let mut value = Value::mapping();
        value.set(&path!("server.name"), Value::from("lobby")).unwrap();
        value.set(&path!("server.port"), Value::from(25565i64)).unwrap();
        value.set(&path!("server.motd.lines"), Value::from(vec!["hi", "there"])).unwrap();
        value.set(&path!("debug"), Value::from(false)).unwrap();
        value
    }

    #[test]
    fn get_nested_value() {
        let value = sample();
        assert_eq!(value.get(&path!("server.name")), Some(&Value::from("lobby")));
        assert!(value.get(&path!("server")).unwrap().is_mapping());
        assert_eq!(value.get(&path!("server.missing")), None);
        assert_eq!(value.get(&path!("")), Some(&value));
    }

    #[test]
    fn get_through_scalar_is_absent() {
        let value = sample();
        assert_eq!(value.get(&path!("debug.inner")), None);
        assert_eq!(value.get(&path!("server.motd.lines.0")), None);
    }

    #[test]
    fn set_creates_intermediate_mappings() {
        let mut value = Value::mapping();
        value.set(&path!("a.b.c.d"), Value::from(42i64)).unwrap();

        assert_eq!(value.get(&path!("a.b.c.d")), Some(&Value::from(42i64)));
        assert!(value.get(&path!("a")).unwrap().is_mapping());
        assert!(value.get(&path!("a.b.c")).unwrap().is_mapping());
    }

    #[test]
    fn set_replaces_scalar_intermediate() {
        let mut value = sample();
        value.set(&path!("debug.level"), Value::from("fine")).unwrap();
        assert_eq!(value.get(&path!("debug.level")), Some(&Value::from("fine")));
    }

    #[test]
    fn set_root_is_rejected() {
        let mut value = Value::mapping();
        let err = value.set(&path!(""), Value::from(1i64)).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn set_null_removes_but_keeps_parent() {
        let mut value = Value::mapping();
        value.set(&path!("a.b"), Value::from(1i64)).unwrap();
        value.set(&path!("a.b"), Value::Null).unwrap();

        assert_eq!(value.get(&path!("a.b")), None);
        assert_eq!(value.get(&path!("a")), Some(&Value::mapping()));
    }

    #[test]
    fn remove_works() {
        let mut value = sample();
        assert_eq!(value.remove(&path!("server.name")), Some(Value::from("lobby")));
        assert_eq!(value.remove(&path!("server.name")), None);
        assert_eq!(value.remove(&path!("nope.nothing")), None);
        assert_eq!(value.remove(&path!("")), None);
    }

    #[test]
    fn remove_preserves_order_of_siblings() {
        let mut value = Value::mapping();
        for key in ["a", "b", "c", "d"] {
            value.set(&Path::parse(key), Value::from(key)).unwrap();
        }
        value.remove(&path!("b"));
        assert_eq!(value.keys(false), vec!["a", "c", "d"]);
    }

    #[test]
    fn keys_shallow_and_deep() {
        let value = sample();
        assert_eq!(value.keys(false), vec!["server", "debug"]);
        assert_eq!(
            value.keys(true),
            vec![
                "server",
                "server.name",
                "server.port",
                "server.motd",
                "server.motd.lines",
                "debug"
            ]
        );
    }

    #[test]
    fn values_deep_include_sections() {
        let value = sample();
        let values = value.values(true);
        assert!(values["server"].is_mapping());
        assert_eq!(values["server.port"], Value::Integer(25565));
        assert!(values["server.motd.lines"].is_sequence());
        assert!(!values.contains_key("server.motd.lines.0"));
    }

    #[test]
    fn scalar_has_no_keys() {
        assert!(Value::from("x").keys(true).is_empty());
    }

    #[test]
    fn coercions() {
        assert_eq!(Value::from(3.9).as_i64(), Some(3));
        assert_eq!(Value::from(-3.9).as_i64(), Some(-3));
        assert_eq!(Value::from(f64::NAN).as_i64(), None);
        assert_eq!(Value::from("3").as_i64(), None);
        assert_eq!(Value::from(7i64).as_f64(), Some(7.0));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("true").as_bool(), None);
    }

    #[test]
    fn to_text_renders_scalars() {
        assert_eq!(Value::from(12i64).to_text().as_deref(), Some("12"));
        assert_eq!(Value::from(1.5).to_text().as_deref(), Some("1.5"));
        assert_eq!(Value::from(2.0).to_text().as_deref(), Some("2.0"));
        assert_eq!(Value::from(false).to_text().as_deref(), Some("false"));
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::mapping().to_text(), None);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e9f64..1.0e9).prop_map(Value::Float),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ]
    }

    proptest! {
        #[test]
        fn set_then_get_roundtrip(
            components in prop::collection::vec("[a-z]{1,6}", 1..5),
            value in scalar(),
        ) {
            let path = Path::try_from_components(components).unwrap();
            let mut doc = Value::mapping();
            doc.set(&path, value.clone()).unwrap();
            prop_assert_eq!(doc.get(&path), Some(&value));
        }
    }
}
