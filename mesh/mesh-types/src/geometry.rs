//! Flat, non-indexed triangle geometry.

use nalgebra::{Point3, Vector3};

use crate::error::{GeometryError, GeometryResult};
use crate::{Aabb, MeshBounds, MeshTopology};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalars per position or normal triplet.
const TRIPLET: usize = 3;

/// Scalars per UV pair.
const PAIR: usize = 2;

/// Scalars per triangle in the position buffer.
const TRIANGLE_SCALARS: usize = 9;

/// A triangle mesh stored as flat per-corner attribute buffers.
///
/// Every triangle owns three consecutive position triplets; vertices are
/// never shared between triangles. This is the single in-memory shape that
/// every reader produces and every writer consumes.
///
/// # Memory Layout
///
/// - `positions`: `[x0, y0, z0, x1, y1, z1, ...]`, 9 scalars per triangle
/// - `normals`: same length as `positions` when present
/// - `uvs`: 2 scalars per corner when present
///
/// The buffers are private so their relative lengths cannot drift apart.
///
/// # Example
///
/// ```
/// use mesh_types::{GeometryModel, MeshTopology};
///
/// let model = GeometryModel::from_positions(vec![
///     0.0, 0.0, 0.0,
///     1.0, 0.0, 0.0,
///     0.0, 1.0, 0.0,
/// ]).unwrap();
///
/// assert_eq!(model.vertex_count(), 3);
/// assert_eq!(model.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryModel {
    positions: Vec<f32>,
    normals: Option<Vec<f32>>,
    uvs: Option<Vec<f32>>,
}

impl GeometryModel {
    /// Create a new empty model.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            uvs: None,
        }
    }

    /// Create a model from a position buffer only.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::PartialTriangle`] if the buffer does not hold
    /// a whole number of triangles.
    pub fn from_positions(positions: Vec<f32>) -> GeometryResult<Self> {
        Self::from_buffers(positions, None, None)
    }

    /// Create a model from raw attribute buffers, checking their lengths.
    ///
    /// # Errors
    ///
    /// Returns an error if the positions do not form whole triangles, or if
    /// `normals`/`uvs` do not have one entry per position triplet.
    pub fn from_buffers(
        positions: Vec<f32>,
        normals: Option<Vec<f32>>,
        uvs: Option<Vec<f32>>,
    ) -> GeometryResult<Self> {
        if positions.len() % TRIANGLE_SCALARS != 0 {
            return Err(GeometryError::PartialTriangle {
                scalars: positions.len(),
            });
        }

        if let Some(normals) = &normals
            && normals.len() != positions.len()
        {
            return Err(GeometryError::AttributeLength {
                attribute: "normals",
                expected: positions.len(),
                actual: normals.len(),
            });
        }

        let expected_uvs = positions.len() / TRIPLET * PAIR;
        if let Some(uvs) = &uvs
            && uvs.len() != expected_uvs
        {
            return Err(GeometryError::AttributeLength {
                attribute: "uvs",
                expected: expected_uvs,
                actual: uvs.len(),
            });
        }

        Ok(Self {
            positions,
            normals,
            uvs,
        })
    }

    /// Flatten an indexed triangle list against a vertex pool.
    ///
    /// Each face corner re-emits its referenced position, discarding vertex
    /// sharing. The face list itself is not retained.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if a face references a
    /// vertex outside `pool`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{GeometryModel, MeshTopology, Point3};
    ///
    /// let pool = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    /// ];
    /// let model = GeometryModel::from_indexed(&pool, &[[0, 1, 2], [1, 3, 2]]).unwrap();
    ///
    /// assert_eq!(model.face_count(), 2);
    /// assert_eq!(model.vertex_count(), 6);
    /// ```
    pub fn from_indexed(pool: &[Point3<f32>], faces: &[[u32; 3]]) -> GeometryResult<Self> {
        let mut positions = Vec::with_capacity(faces.len() * TRIANGLE_SCALARS);
        for face in faces {
            for &index in face {
                let point = pool
                    .get(index as usize)
                    .ok_or(GeometryError::IndexOutOfRange {
                        index,
                        len: pool.len(),
                    })?;
                positions.extend_from_slice(&[point.x, point.y, point.z]);
            }
        }
        Ok(Self {
            positions,
            normals: None,
            uvs: None,
        })
    }

    /// Flat position buffer.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat normal buffer, if the source carried normals.
    #[inline]
    #[must_use]
    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    /// Flat UV buffer, if the source carried texture coordinates.
    #[inline]
    #[must_use]
    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    /// Mutable position scalars. The buffer length cannot change.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [f32] {
        &mut self.positions
    }

    /// Mutable normal scalars. The buffer length cannot change.
    #[inline]
    pub fn normals_mut(&mut self) -> Option<&mut [f32]> {
        self.normals.as_deref_mut()
    }

    /// Position of a corner.
    #[must_use]
    pub fn position(&self, corner: usize) -> Option<Point3<f32>> {
        triplet(&self.positions, corner).map(Point3::from)
    }

    /// Normal of a corner.
    #[must_use]
    pub fn normal(&self, corner: usize) -> Option<Vector3<f32>> {
        self.normals
            .as_deref()
            .and_then(|normals| triplet(normals, corner))
            .map(Vector3::from)
    }

    /// UV of a corner.
    #[must_use]
    pub fn uv(&self, corner: usize) -> Option<[f32; 2]> {
        let uvs = self.uvs.as_deref()?;
        let start = corner.checked_mul(PAIR)?;
        let pair = uvs.get(start..start + PAIR)?;
        Some([pair[0], pair[1]])
    }

    /// Iterate over all corner positions.
    pub fn points(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.positions
            .chunks_exact(TRIPLET)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    /// Iterate over all triangles as corner position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.positions.chunks_exact(TRIANGLE_SCALARS).map(|c| {
            [
                Point3::new(c[0], c[1], c[2]),
                Point3::new(c[3], c[4], c[5]),
                Point3::new(c[6], c[7], c[8]),
            ]
        })
    }

    /// Consume the model, returning its raw buffers.
    #[must_use]
    pub fn into_buffers(self) -> (Vec<f32>, Option<Vec<f32>>, Option<Vec<f32>>) {
        (self.positions, self.normals, self.uvs)
    }
}

fn triplet(buffer: &[f32], corner: usize) -> Option<[f32; 3]> {
    let start = corner.checked_mul(TRIPLET)?;
    let t = buffer.get(start..start + TRIPLET)?;
    Some([t[0], t[1], t[2]])
}

impl MeshTopology for GeometryModel {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.positions.len() / TRIPLET
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.positions.len() / TRIANGLE_SCALARS
    }
}

impl MeshBounds for GeometryModel {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points())
    }
}

/// Create a unit cube from (0,0,0) to (1,1,1) as 12 flat triangles.
///
/// Useful as a fixture in tests and examples.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.face_count(), 12);
/// assert_eq!(cube.vertex_count(), 36);
/// ```
#[must_use]
pub fn unit_cube() -> GeometryModel {
    const CORNERS: [[f32; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];

    // CCW when viewed from outside
    const FACES: [[usize; 3]; 12] = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];

    let positions = FACES
        .iter()
        .flat_map(|face| face.iter().flat_map(|&i| CORNERS[i]))
        .collect();

    GeometryModel {
        positions,
        normals: None,
        uvs: None,
    }
}
