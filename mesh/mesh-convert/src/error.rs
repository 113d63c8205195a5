//! Error types for conversion requests.

use std::path::PathBuf;

use mesh_io::IoError;
use mesh_transform::TransformError;
use thiserror::Error;

use crate::FileFormat;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that end a conversion request.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input or output format is outside the declared sets.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// Extension or tag that was rejected.
        format: String,
    },

    /// The format pair is not in the conversion matrix.
    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion {
        /// Source format.
        from: FileFormat,
        /// Requested target format.
        to: FileFormat,
    },

    /// Malformed or truncated source bytes.
    #[error("{0}")]
    Parse(#[source] IoError),

    /// The target format has no reader or writer.
    #[error("{0}")]
    NotImplemented(#[source] IoError),

    /// Transform options were rejected.
    #[error("invalid transform: {0}")]
    Transform(#[from] TransformError),

    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Output bytes could not be produced or persisted.
    #[error("failed to write {path}: {message}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The external CAD or vector exporter is missing or failed.
    #[error("external exporter `{program}` failed: {message}")]
    ExternalTool {
        /// Program that was invoked.
        program: String,
        /// Spawn error or exit status with captured output.
        message: String,
    },
}

impl ConvertError {
    /// Classify a codec error raised while reading a source.
    #[must_use]
    pub fn from_read(err: IoError, path: PathBuf) -> Self {
        match err {
            IoError::NotImplemented { .. } => Self::NotImplemented(err),
            IoError::Io(source) => Self::Read { path, source },
            IoError::FileNotFound { path } => Self::Read {
                path,
                source: std::io::ErrorKind::NotFound.into(),
            },
            _ => Self::Parse(err),
        }
    }

    /// Classify a codec error raised while encoding a target.
    #[must_use]
    pub fn from_write(err: IoError, path: PathBuf) -> Self {
        match err {
            IoError::NotImplemented { .. } => Self::NotImplemented(err),
            other => Self::Write {
                path,
                message: other.to_string(),
            },
        }
    }

    /// Whether the error came from parsing source bytes.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Whether the error came from the external exporter.
    #[must_use]
    pub const fn is_external_tool(&self) -> bool {
        matches!(self, Self::ExternalTool { .. })
    }
}
