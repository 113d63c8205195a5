//! Error types for mesh I/O operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::MeshFormat;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// The half of a codec that was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Decoding bytes into geometry.
    Read,
    /// Encoding geometry into bytes.
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("reader"),
            Self::Write => f.write_str("writer"),
        }
    }
}

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Unknown file format (unrecognized extension).
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// Malformed or truncated input for the given format.
    #[error("{format} parsing failed: {message}")]
    Parse {
        /// Format being decoded.
        format: MeshFormat,
        /// Description of what was invalid.
        message: String,
    },

    /// Geometry cannot be represented in the target format.
    #[error("{format} encoding failed: {message}")]
    Encode {
        /// Format being encoded.
        format: MeshFormat,
        /// Description of the limitation that was hit.
        message: String,
    },

    /// The format has no reader or writer.
    #[error("{format} {operation} is not implemented")]
    NotImplemented {
        /// Format that was requested.
        format: MeshFormat,
        /// Which half of the codec is missing.
        operation: Operation,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create a `Parse` error for `format` with the given message.
    #[must_use]
    pub fn parse(format: MeshFormat, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }

    /// Create an `Encode` error for `format` with the given message.
    #[must_use]
    pub fn encode(format: MeshFormat, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }

    /// Create a `NotImplemented` error.
    #[must_use]
    pub const fn not_implemented(format: MeshFormat, operation: Operation) -> Self {
        Self::NotImplemented { format, operation }
    }
}
