//! Command-level error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::format::FormatError;
use crate::model::ModelError;

/// Broad class of a [`NotesError`], used for exit statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or conflicting request; nothing was read or written.
    Usage,
    /// A segment or list index does not exist; nothing was written.
    NotFound,
    /// A file could not be read, written or decoded.
    Persistence,
}

impl ErrorKind {
    /// Process exit status for this kind.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::NotFound | ErrorKind::Persistence => 1,
        }
    }
}

/// Errors returned by note commands.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Malformed selector, conflicting flags or bad value
    #[error("{0}")]
    Usage(String),

    /// The command was given nothing to do
    #[error("nothing to {action}: no fields or flags were supplied")]
    MissingPayload {
        /// Command that was invoked
        action: &'static str,
    },

    /// Segment or index lookup failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Document could not be read or written
    #[error("{path:?}: {source}")]
    Document {
        /// File being read or written
        path: PathBuf,
        /// Underlying failure
        source: FormatError,
    },

    /// File system operation failed
    #[error("{path:?}: {source}")]
    Io {
        /// File being operated on
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// Configuration could not be loaded or saved
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl NotesError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Wrap a format error with the path it concerns.
    pub fn document(path: impl Into<PathBuf>, source: FormatError) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }

    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotesError::Usage(_) | NotesError::MissingPayload { .. } => ErrorKind::Usage,
            NotesError::Model(ModelError::SegmentNotFound { .. })
            | NotesError::Model(ModelError::IndexOutOfRange { .. }) => ErrorKind::NotFound,
            NotesError::Model(ModelError::ZeroInstances { .. }) => ErrorKind::Usage,
            NotesError::Config(e) if e.is_usage() => ErrorKind::Usage,
            NotesError::Model(ModelError::DuplicateSegmentId { .. })
            | NotesError::Document { .. }
            | NotesError::Io { .. }
            | NotesError::Config(_) => ErrorKind::Persistence,
        }
    }
}

/// Convenience alias for results of note commands.
pub type Result<T, E = NotesError> = std::result::Result<T, E>;
