//! Scale and rotation of flat triangle geometry.
//!
//! A [`GeometryTransform`] is built once from [`TransformOptions`] and then
//! rewrites a [`GeometryModel`](mesh_types::GeometryModel) in place:
//!
//! - positions are scaled per axis, then rotated
//! - normals are rotated only, so non-uniform scale leaves them unchanged
//! - texture coordinates are never touched
//!
//! # Example
//!
//! ```
//! use mesh_transform::{Axes, GeometryTransform, TransformOptions};
//! use mesh_types::{GeometryModel, MeshBounds};
//!
//! let mut model = GeometryModel::from_positions(vec![
//!     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
//! ])
//! .unwrap();
//!
//! let options = TransformOptions {
//!     scale: Some(Axes::new(2.0, 1.0, 1.0)),
//!     rotate: None,
//! };
//! GeometryTransform::from_options(&options).unwrap().apply(&mut model);
//!
//! assert_eq!(model.bounds().max.x, 2.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod options;
mod transform;

pub use error::{TransformError, TransformResult};
pub use options::{Axes, TransformOptions};
pub use transform::{GeometryTransform, transform_geometry};
