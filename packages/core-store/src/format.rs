//! Format hints for the on-disk document grammar.

use std::borrow::Cow;
use std::fmt;

/// The grammar a document file is written in.
///
/// MIME-type-like strings are used for familiarity, but any string the
/// configured codec understands will do.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format(pub Cow<'static, str>);

impl Format {
    /// YAML (`application/yaml`)
    pub const YAML: Format = Format(Cow::Borrowed("application/yaml"));

    /// JSON (`application/json`)
    pub const JSON: Format = Format(Cow::Borrowed("application/json"));

    /// Create a format from a static string.
    pub const fn from_static(s: &'static str) -> Self {
        Format(Cow::Borrowed(s))
    }

    /// Create a format from an owned string.
    pub fn new(s: impl Into<String>) -> Self {
        Format(Cow::Owned(s.into()))
    }

    /// Guess the format from a file name.
    ///
    /// `.json` files are JSON; everything else (`.yml`, `.yaml`, no
    /// extension) is treated as YAML.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Format::JSON,
            _ => Format::YAML,
        }
    }

    /// Get the format string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_json(&self) -> bool {
        self == &Self::JSON
    }

    pub fn is_yaml(&self) -> bool {
        self == &Self::YAML
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for Format {
    fn from(s: &'static str) -> Self {
        Format(Cow::Borrowed(s))
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format(Cow::Owned(s))
    }
}

impl AsRef<str> for Format {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn constants_work() {
        assert_eq!(Format::YAML.as_str(), "application/yaml");
        assert!(Format::JSON.is_json());
        assert!(!Format::JSON.is_yaml());
    }

    #[test]
    fn equality() {
        assert_eq!(Format::JSON, Format::from("application/json"));
        assert_eq!(Format::YAML, Format::new("application/yaml".to_string()));
    }

    #[test]
    fn from_path_by_extension() {
        assert_eq!(Format::from_path(Path::new("config.yml")), Format::YAML);
        assert_eq!(Format::from_path(Path::new("config.yaml")), Format::YAML);
        assert_eq!(Format::from_path(Path::new("users/bob.JSON")), Format::JSON);
        assert_eq!(Format::from_path(Path::new("noext")), Format::YAML);
    }

    #[test]
    fn display_impl() {
        assert_eq!(format!("{}", Format::JSON), "application/json");
        assert_eq!(format!("{}", Format::new("text/x-ini")), "text/x-ini");
    }
}
