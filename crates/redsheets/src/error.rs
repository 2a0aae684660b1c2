//! Error types for redsheets.
//!
//! Every fallible operation in the crate returns [`Error`]. The HTTP layer
//! turns these into status codes or `{success: false, error}` envelopes and
//! passes the display text through unchanged.

use std::path::PathBuf;
use thiserror::Error;

use crate::record::Kind;

/// The main error type for redsheets operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Lookup Errors ===
    /// No record with the given id exists in the kind's collection.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Collection that was searched.
        kind: Kind,
        /// The id as it was supplied.
        id: String,
    },

    /// The path or argument named a kind that does not exist.
    #[error("unknown record type: {0}")]
    UnknownKind(String),

    // === Storage Errors ===
    /// Failed to read a collection file.
    #[error("failed to read collection {path}: {source}")]
    StoreRead {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a collection file.
    #[error("failed to write collection {path}: {source}")]
    StoreWrite {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A collection file parsed but does not hold what it should.
    #[error("corrupt collection {path}: {message}")]
    StoreCorrupt {
        /// Path to the collection file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Rendering Errors ===
    /// No PDF converter was found at startup, or rendering is disabled.
    #[error("PDF renderer is not available")]
    RendererUnavailable,

    /// The converter ran but did not produce a document.
    #[error("PDF conversion failed: {message}")]
    Render {
        /// Description of what went wrong.
        message: String,
    },

    /// A template could not be loaded.
    #[error("template '{name}' could not be loaded: {message}")]
    Template {
        /// Template file name.
        name: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An operation timed out.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for redsheets operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for a kind and a displayable id.
    #[must_use]
    pub fn not_found(kind: Kind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a new render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the record or kind does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownKind(_))
    }

    /// Check if this error means rendering was never attempted.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::RendererUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found(Kind::Character, 7);
        assert_eq!(err.to_string(), "character 7 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unknown_kind_is_not_found() {
        let err = Error::UnknownKind("widget".to_string());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("widget"));
    }

    #[test]
    fn test_renderer_unavailable() {
        assert!(Error::RendererUnavailable.is_unavailable());
        assert!(!Error::render("boom").is_unavailable());
    }

    #[test]
    fn test_render_error_display() {
        let err = Error::render("exit status 1");
        assert_eq!(err.to_string(), "PDF conversion failed: exit status 1");
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_store_read_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::StoreRead {
            path: PathBuf::from("data/characters.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("data/characters.json"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_store_corrupt_display() {
        let err = Error::StoreCorrupt {
            path: PathBuf::from("data/crews.json"),
            message: "expected a JSON array".to_string(),
        };
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_timeout_error_display() {
        let err = Error::Timeout {
            operation: "wkhtmltopdf".to_string(),
        };
        assert!(err.to_string().contains("wkhtmltopdf"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "timeout_secs must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("timeout_secs"));
    }
}
