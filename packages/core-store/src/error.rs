//! Error types for dotconf.

use std::path::PathBuf;
use std::sync::Arc;

use crate::charset::Charset;
use crate::format::Format;
use crate::path::PathError;

/// A document could not be turned into a tree.
///
/// Structural errors are what cause a file to be quarantined.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// Neither strict UTF-8 nor the fallback charset could decode the bytes.
    #[error("invalid characters (not UTF-8, not {charset})")]
    InvalidCharacters { charset: Charset },

    /// The text decoded but is not a well-formed document.
    #[error("malformed document ({format}): {message}")]
    MalformedDocument { format: Format, message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("invalid path: {message}")]
    InvalidPath { message: String },

    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("encode error ({format}): {message}")]
    Encode { format: Format, message: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(Format),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A programmer error, surfaced synchronously.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A background write failed; delivered to callers waiting on it.
    #[error("failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: Arc<Error>,
    },

    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(format: &Format, message: impl Into<String>) -> Self {
        Error::Structural(StructuralError::MalformedDocument {
            format: format.clone(),
            message: message.into(),
        })
    }

    pub fn encode(format: &Format, message: impl Into<String>) -> Self {
        Error::Encode {
            format: format.clone(),
            message: message.into(),
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn structural_display() {
        let e = Error::from(StructuralError::InvalidCharacters {
            charset: Charset::Windows1252,
        });
        let display = e.to_string();
        assert!(display.contains("invalid characters"));
        assert!(display.contains("windows-1252"));
        assert!(e.is_structural());

        let e = Error::malformed(&Format::YAML, "mapping values are not allowed here");
        let display = e.to_string();
        assert!(display.contains("malformed document"));
        assert!(display.contains("application/yaml"));
        assert!(e.is_structural());
    }

    #[test]
    fn io_error_has_source() {
        let e = Error::io(
            "/tmp/cfg.yml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(e.to_string().contains("/tmp/cfg.yml"));
        assert!(e.source().is_some());
        assert!(!e.is_structural());
    }

    #[test]
    fn persist_wraps_cause() {
        let cause = Arc::new(Error::Other {
            message: "disk full".to_string(),
        });
        let e = Error::Persist {
            path: PathBuf::from("cfg.yml"),
            source: cause,
        };
        assert!(e.to_string().contains("disk full"));
        assert!(e.source().is_some());
    }

    #[test]
    fn path_error_converts() {
        let e: Error = PathError::InvalidComponent {
            component: "a.b".to_string(),
            position: 0,
            message: "contains separator".to_string(),
        }
        .into();
        assert!(e.to_string().starts_with("path error"));
    }
}
