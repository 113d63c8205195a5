//! Core geometry types for the mesh conversion crates.
//!
//! This crate provides the single in-memory shape every format reader
//! produces and every writer consumes:
//!
//! - [`GeometryModel`] - Flat, non-indexed triangle buffers (positions,
//!   optional normals, optional UVs)
//! - [`GeometryBuilder`] - Corner-by-corner construction used by readers
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! No file or process I/O happens here. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//!
//! # Flat Layout
//!
//! Triangles never share vertices. Every triangle occupies exactly 9
//! consecutive position scalars, so `face_count == positions.len() / 9`.
//! Indexed sources (OBJ, 3DS) are expanded on load; sharing is not recovered
//! on save.
//!
//! # Example
//!
//! ```
//! use mesh_types::{GeometryModel, MeshBounds, MeshTopology, Point3};
//!
//! let model = GeometryModel::from_positions(vec![
//!     0.0, 0.0, 0.0,
//!     2.0, 0.0, 0.0,
//!     0.0, 4.0, 0.0,
//! ]).unwrap();
//!
//! assert_eq!(model.face_count(), 1);
//! assert_eq!(model.bounds().max, Point3::new(2.0, 4.0, 0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod builder;
mod error;
mod geometry;
mod traits;

pub use bounds::Aabb;
pub use builder::GeometryBuilder;
pub use error::{GeometryError, GeometryResult};
pub use geometry::{GeometryModel, unit_cube};
pub use traits::{MeshBounds, MeshTopology};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
