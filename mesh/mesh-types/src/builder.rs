//! Incremental construction of a [`GeometryModel`] corner by corner.

use tracing::warn;

use crate::GeometryModel;
use crate::error::{GeometryError, GeometryResult};

/// Accumulates per-corner attributes and produces a [`GeometryModel`].
///
/// Readers push one corner at a time. Optional attributes are kept only
/// when every corner supplied them, so a model never ends up with a normal
/// or UV buffer that is out of step with its positions.
///
/// # Example
///
/// ```
/// use mesh_types::{GeometryBuilder, MeshTopology};
///
/// let mut builder = GeometryBuilder::with_capacity(1);
/// builder.push_corner([0.0, 0.0, 0.0], Some([0.0, 0.0, 1.0]), None);
/// builder.push_corner([1.0, 0.0, 0.0], Some([0.0, 0.0, 1.0]), None);
/// builder.push_corner([0.0, 1.0, 0.0], Some([0.0, 0.0, 1.0]), None);
///
/// let model = builder.finish().unwrap();
/// assert_eq!(model.face_count(), 1);
/// assert!(model.normals().is_some());
/// assert!(model.uvs().is_none());
/// ```
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    corners: usize,
    corners_with_normal: usize,
    corners_with_uv: usize,
}

impl GeometryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder sized for `triangles` triangles.
    #[must_use]
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 9),
            ..Self::default()
        }
    }

    /// Number of corners pushed so far.
    #[inline]
    #[must_use]
    pub const fn corner_count(&self) -> usize {
        self.corners
    }

    /// Append one triangle corner.
    pub fn push_corner(
        &mut self,
        position: [f32; 3],
        normal: Option<[f32; 3]>,
        uv: Option<[f32; 2]>,
    ) {
        self.positions.extend_from_slice(&position);
        if let Some(normal) = normal {
            self.normals.extend_from_slice(&normal);
            self.corners_with_normal += 1;
        }
        if let Some(uv) = uv {
            self.uvs.extend_from_slice(&uv);
            self.corners_with_uv += 1;
        }
        self.corners += 1;
    }

    /// Finish construction.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::PartialTriangle`] if the number of corners
    /// pushed is not a multiple of three.
    pub fn finish(self) -> GeometryResult<GeometryModel> {
        if self.corners % 3 != 0 {
            return Err(GeometryError::PartialTriangle {
                scalars: self.positions.len(),
            });
        }

        let normals = complete_attribute(
            "normals",
            self.normals,
            self.corners_with_normal,
            self.corners,
        );
        let uvs = complete_attribute("uvs", self.uvs, self.corners_with_uv, self.corners);

        GeometryModel::from_buffers(self.positions, normals, uvs)
    }
}

fn complete_attribute(
    name: &'static str,
    buffer: Vec<f32>,
    supplied: usize,
    corners: usize,
) -> Option<Vec<f32>> {
    if supplied == 0 {
        return None;
    }
    if supplied != corners {
        warn!(
            attribute = name,
            supplied, corners, "Dropping attribute missing on some corners"
        );
        return None;
    }
    Some(buffer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::MeshTopology;

    #[test]
    fn builds_positions_only() {
        let mut builder = GeometryBuilder::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            builder.push_corner(p, None, None);
        }
        assert_eq!(builder.corner_count(), 3);

        let model = builder.finish().unwrap();
        assert_eq!(model.vertex_count(), 3);
        assert!(model.normals().is_none());
        assert!(model.uvs().is_none());
    }

    #[test]
    fn keeps_complete_uvs() {
        let mut builder = GeometryBuilder::new();
        builder.push_corner([0.0, 0.0, 0.0], None, Some([0.0, 0.0]));
        builder.push_corner([1.0, 0.0, 0.0], None, Some([1.0, 0.0]));
        builder.push_corner([0.0, 1.0, 0.0], None, Some([0.0, 1.0]));

        let model = builder.finish().unwrap();
        assert_eq!(model.uvs().map(<[f32]>::len), Some(6));
    }

    #[test]
    fn drops_partial_normals() {
        let mut builder = GeometryBuilder::new();
        builder.push_corner([0.0, 0.0, 0.0], Some([0.0, 0.0, 1.0]), None);
        builder.push_corner([1.0, 0.0, 0.0], None, None);
        builder.push_corner([0.0, 1.0, 0.0], Some([0.0, 0.0, 1.0]), None);

        let model = builder.finish().unwrap();
        assert!(model.normals().is_none());
    }

    #[test]
    fn rejects_dangling_corner() {
        let mut builder = GeometryBuilder::new();
        builder.push_corner([0.0, 0.0, 0.0], None, None);
        builder.push_corner([1.0, 0.0, 0.0], None, None);

        assert!(matches!(
            builder.finish(),
            Err(GeometryError::PartialTriangle { scalars: 6 })
        ));
    }
}
