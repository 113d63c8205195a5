//! Vertex/face counts and bounding box extraction.

use mesh_types::{Aabb, GeometryModel, MeshBounds, MeshTopology};
use serde::Serialize;
use tracing::trace;

/// Axis-aligned bounding box summarised by its corners and midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
    /// Midpoint of `min` and `max`.
    pub center: [f32; 3],
}

impl From<Aabb> for BoundingBox {
    fn from(aabb: Aabb) -> Self {
        Self {
            min: aabb.min.coords.into(),
            max: aabb.max.coords.into(),
            center: aabb.center().coords.into(),
        }
    }
}

/// Summary of a model's size.
///
/// # Example
///
/// ```
/// use mesh_measure::compute_metadata;
/// use mesh_types::GeometryModel;
///
/// let meta = compute_metadata(&GeometryModel::new());
/// assert_eq!(meta.vertex_count, 0);
/// assert!(meta.bounding_box.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryMetadata {
    /// Number of position triplets.
    pub vertex_count: usize,
    /// Number of triangles.
    pub face_count: usize,
    /// Bounds of every position; `None` for an empty model.
    pub bounding_box: Option<BoundingBox>,
}

/// Compute counts and the bounding box of every position.
#[must_use]
pub fn compute_metadata(model: &GeometryModel) -> GeometryMetadata {
    let metadata = GeometryMetadata {
        vertex_count: model.vertex_count(),
        face_count: model.face_count(),
        bounding_box: model.bounds_opt().map(BoundingBox::from),
    };
    trace!(
        vertices = metadata.vertex_count,
        faces = metadata.face_count,
        "Computed geometry metadata"
    );
    metadata
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;

    #[test]
    fn single_triangle() {
        let model = GeometryModel::from_positions(vec![
            -1.0, 2.0, 0.5, //
            3.0, -4.0, 0.5, //
            0.0, 0.0, 7.25,
        ])
        .unwrap();

        let meta = compute_metadata(&model);
        assert_eq!(meta.vertex_count, 3);
        assert_eq!(meta.face_count, 1);

        let bbox = meta.bounding_box.unwrap();
        assert_eq!(bbox.min, [-1.0, -4.0, 0.5]);
        assert_eq!(bbox.max, [3.0, 2.0, 7.25]);
        assert_eq!(bbox.center, [1.0, -1.0, 3.875]);
    }

    #[test]
    fn empty_model_has_no_bounds() {
        let meta = compute_metadata(&GeometryModel::new());
        assert_eq!(meta.vertex_count, 0);
        assert_eq!(meta.face_count, 0);
        assert!(meta.bounding_box.is_none());
    }

    #[test]
    fn matches_model_bounds() {
        let mut model = unit_cube();
        model.positions_mut()[0] = -2.0;

        let bbox = compute_metadata(&model).bounding_box.unwrap();
        let bounds = model.bounds();
        assert_eq!(bbox.min, [bounds.min.x, bounds.min.y, bounds.min.z]);
        assert_eq!(bbox.max, [bounds.max.x, bounds.max.y, bounds.max.z]);
        assert_relative_eq!(bbox.center[0], -0.5);
        assert_relative_eq!(bbox.center[1], 0.5);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(compute_metadata(&unit_cube())).unwrap();
        assert_eq!(json["vertexCount"], 36);
        assert_eq!(json["faceCount"], 12);
        assert_eq!(json["boundingBox"]["max"][2], 1.0);

        let empty = serde_json::to_value(compute_metadata(&GeometryModel::new())).unwrap();
        assert!(empty["boundingBox"].is_null());
    }
}
