//! Error types for geometry construction.

use thiserror::Error;

/// Result type for geometry construction.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors raised when attribute buffers violate the flat-triangle layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Position buffer does not hold whole triangles.
    #[error("position buffer holds {scalars} scalars, expected a multiple of 9")]
    PartialTriangle {
        /// Number of scalars in the position buffer.
        scalars: usize,
    },

    /// An optional attribute buffer does not line up with the positions.
    #[error("{attribute} buffer holds {actual} scalars, expected {expected}")]
    AttributeLength {
        /// Attribute name (`normals` or `uvs`).
        attribute: &'static str,
        /// Expected scalar count derived from the positions.
        expected: usize,
        /// Actual scalar count.
        actual: usize,
    },

    /// A face references a vertex outside the pool.
    #[error("face index {index} out of range for {len} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Size of the referenced pool.
        len: usize,
    },
}
