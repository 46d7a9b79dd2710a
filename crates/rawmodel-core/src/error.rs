//! Unified error handling for rawmodel
//!
//! Every fallible operation in the workspace returns this error type, so the
//! command-line tool can report scene loading, export and inspection failures
//! the same way.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all rawmodel operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Format Errors ====================

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed scene or manifest content
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    /// Manifest written by an incompatible exporter
    #[error("Unsupported version: {version} (supported: {supported})")]
    UnsupportedVersion {
        version: i64,
        supported: i64,
    },

    // ==================== Export Errors ====================

    /// No root objects were handed to the exporter
    #[error("Nothing was selected, no meshes exported")]
    EmptySelection,

    /// Another export is still running in this process
    #[error("An export is already in progress")]
    ExportBusy,

    // ==================== General Errors ====================

    /// Error with additional context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Strip context layers and return the underlying error
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        match self.root() {
            Error::FileNotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error came from reading or writing files
    pub fn is_io(&self) -> bool {
        matches!(self.root(), Error::Io(_) | Error::FileNotFound(_))
    }

    /// Check if this is a malformed-input error
    pub fn is_format_error(&self) -> bool {
        matches!(
            self.root(),
            Error::Json(_) | Error::InvalidData { .. } | Error::UnsupportedVersion { .. }
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::FileNotFound(PathBuf::from("/test"));
        let contextualized = err.with_context("while loading scene");

        assert!(contextualized.to_string().contains("while loading scene"));
        assert!(contextualized.is_not_found());
    }

    #[test]
    fn test_io_not_found() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_not_found());
        assert!(err.is_io());
        assert!(!Error::EmptySelection.is_io());
    }

    #[test]
    fn test_is_format_error() {
        assert!(Error::invalid_data("bad").is_format_error());
        assert!(Error::UnsupportedVersion { version: 1, supported: 2 }.is_format_error());
        assert!(!Error::ExportBusy.is_format_error());
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        let with_context = result.context("writing out.rawbuffer");

        let err = with_context.unwrap_err();
        assert!(err.to_string().contains("writing out.rawbuffer"));
        assert!(err.is_io());
    }
}
