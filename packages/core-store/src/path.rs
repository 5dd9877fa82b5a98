//! Dotted path addressing into a document.

use std::fmt;

/// The separator between path components.
pub const SEPARATOR: char = '.';

/// Errors related to path construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path component cannot be addressed with dotted syntax.
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidComponent {
                component,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid path component '{}' at position {}: {}",
                    component, position, message
                )
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A dotted path into a document, e.g. `economy.currency.symbol`.
///
/// Each component names a key in a nested mapping. The empty path addresses
/// the document root.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// Parse a dotted path string.
    ///
    /// Empty components are ignored, so `a..b`, `.a.b` and `a.b.` all
    /// normalize to `a.b`.
    ///
    /// ```rust
    /// use dotconf_core::Path;
    ///
    /// let path = Path::parse("users.alice.home");
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(Path::parse("a.b."), Path::parse("a.b"));
    /// ```
    pub fn parse(s: &str) -> Self {
        Path {
            components: s
                .split(SEPARATOR)
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// The root path.
    pub fn root() -> Self {
        Path::default()
    }

    /// Try to create a path from components, validating each.
    ///
    /// A component must be non-empty and must not contain the separator,
    /// otherwise it could never be addressed again by a parsed path.
    pub fn try_from_components(components: Vec<String>) -> Result<Self, PathError> {
        for (i, component) in components.iter().enumerate() {
            Self::validate_component(component, i)?;
        }
        Ok(Path { components })
    }

    fn validate_component(component: &str, position: usize) -> Result<(), PathError> {
        if component.is_empty() {
            return Err(PathError::InvalidComponent {
                component: component.to_string(),
                position,
                message: "empty component".to_string(),
            });
        }
        if component.contains(SEPARATOR) {
            return Err(PathError::InvalidComponent {
                component: component.to_string(),
                position,
                message: format!("component contains separator '{}'", SEPARATOR),
            });
        }
        Ok(())
    }

    /// Check if this path is empty (root path).
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// The path without its last component, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.is_empty() {
            None
        } else {
            Some(self.slice(0, self.len() - 1))
        }
    }

    /// The last component, or `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Path { components }
    }

    /// Get a slice of components as a new path.
    pub fn slice(&self, start: usize, end: usize) -> Path {
        Path {
            components: self.components[start..end].to_vec(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("."))
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::parse(&s)
    }
}

/// Macro for creating paths from literals.
///
/// ```rust
/// use dotconf_core::path;
///
/// let p = path!("users.alice.name");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s)
    };
}
