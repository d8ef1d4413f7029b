//! Typed error handling for modlint.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.
//!
//! Only `Settings` errors are fatal to a pass; file- and module-level
//! failures are isolated and the pass keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for modlint operations.
#[derive(Error, Debug)]
pub enum ModlintError {
    /// I/O error when reading project or source files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A source file could not be parsed
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Malformed settings - the only fatal error class. Fails the whole
    /// pass before classification begins.
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// A memoized computation failed; the failure is replayed to all
    /// waiters on that cache key.
    #[error("Cache computation failed for {key}: {message}")]
    Cache { key: String, message: String },

    /// Host project model errors (unknown module, bad JSON, ...)
    #[error("Project model error: {message}")]
    Model { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ModlintError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error for a source file.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a fatal settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Create a cache computation error for a key.
    pub fn cache(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a host model error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Whether analysis can continue after this error. Everything except
    /// malformed settings is recoverable: the affected file or module is
    /// skipped and findings for the rest of the graph still complete.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Settings { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for modlint results.
pub type ModlintResult<T> = Result<T, ModlintError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> ModlintResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ModlintResult<T> {
        self.map_err(|e| ModlintError::io(path, e))
    }
}
