//! Error types for mesh transformation operations.

use thiserror::Error;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while building a transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// A scale factor or rotation angle is NaN or infinite.
    #[error("{component} must be finite, got {value}")]
    NonFinite {
        /// Which option component was rejected, e.g. `scale.x`.
        component: &'static str,
        /// The offending value.
        value: f32,
    },

    /// An axis triplet could not be parsed from text.
    #[error("expected three comma-separated numbers, got `{input}`")]
    InvalidAxes {
        /// The rejected text.
        input: String,
    },
}
