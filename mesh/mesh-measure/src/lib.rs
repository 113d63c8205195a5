//! Geometry metadata for converted meshes.
//!
//! [`compute_metadata`] reports the counts and axis-aligned bounding box of a
//! [`GeometryModel`](mesh_types::GeometryModel) in a single scan over its
//! positions. The report serializes to JSON with camel-case field names.
//!
//! # Example
//!
//! ```
//! use mesh_measure::compute_metadata;
//! use mesh_types::unit_cube;
//!
//! let meta = compute_metadata(&unit_cube());
//! assert_eq!(meta.face_count, 12);
//!
//! let bbox = meta.bounding_box.unwrap();
//! assert_eq!(bbox.center, [0.5, 0.5, 0.5]);
//! ```
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod metadata;

pub use metadata::{BoundingBox, GeometryMetadata, compute_metadata};
