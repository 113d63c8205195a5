//! Scale-then-rotate transform over flat geometry buffers.

use mesh_types::{GeometryModel, Point3, Vector3};
use nalgebra::UnitQuaternion;
use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::options::{Axes, TransformOptions};

/// Per-axis scale followed by a rotation.
///
/// Positions are scaled then rotated. Normals are rotated only and are not
/// renormalised afterwards.
///
/// # Example
///
/// ```
/// use mesh_transform::GeometryTransform;
/// use mesh_types::Point3;
/// use std::f32::consts::FRAC_PI_2;
///
/// let t = GeometryTransform::from_euler(0.0, 0.0, FRAC_PI_2).unwrap();
/// let p = t.apply_to_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p.y - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryTransform {
    scale: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
}

impl Default for GeometryTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl GeometryTransform {
    /// The transform that changes nothing.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Per-axis scale with no rotation.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonFinite`] if a factor is NaN or infinite.
    pub fn from_scale(x: f32, y: f32, z: f32) -> TransformResult<Self> {
        Ok(Self {
            scale: checked(Axes::new(x, y, z), ["scale.x", "scale.y", "scale.z"])?,
            ..Self::identity()
        })
    }

    /// Rotation from Euler angles in radians.
    ///
    /// The angles compose in X, Y, Z order as `qx * qy * qz`, so a vector
    /// is turned about Z first when the quaternion is applied.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonFinite`] if an angle is NaN or infinite.
    pub fn from_euler(x: f32, y: f32, z: f32) -> TransformResult<Self> {
        let angles = checked(Axes::new(x, y, z), ["rotate.x", "rotate.y", "rotate.z"])?;
        Ok(Self {
            rotation: euler_xyz(angles),
            ..Self::identity()
        })
    }

    /// Build from request options, treating omitted fields as identity.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonFinite`] if any supplied component is
    /// NaN or infinite.
    pub fn from_options(options: &TransformOptions) -> TransformResult<Self> {
        let mut transform = Self::identity();
        if let Some(scale) = options.scale {
            transform.scale = checked(scale, ["scale.x", "scale.y", "scale.z"])?;
        }
        if let Some(rotate) = options.rotate {
            let angles = checked(rotate, ["rotate.x", "rotate.y", "rotate.z"])?;
            transform.rotation = euler_xyz(angles);
        }
        Ok(transform)
    }

    /// Per-axis scale factors.
    #[must_use]
    pub const fn scale(&self) -> &Vector3<f32> {
        &self.scale
    }

    /// Rotation applied after scaling.
    #[must_use]
    pub const fn rotation(&self) -> &UnitQuaternion<f32> {
        &self.rotation
    }

    /// Whether applying this transform would leave every buffer unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scale == Vector3::new(1.0, 1.0, 1.0) && self.rotation == UnitQuaternion::identity()
    }

    /// Scale then rotate a single point.
    #[must_use]
    pub fn apply_to_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.rotation * Point3::from(point.coords.component_mul(&self.scale))
    }

    /// Rotate a normal without scaling it.
    #[must_use]
    pub fn apply_to_normal(&self, normal: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * normal
    }

    /// Rewrite the model's positions and normals in place.
    ///
    /// Texture coordinates are left untouched.
    pub fn apply(&self, model: &mut GeometryModel) {
        if self.is_identity() {
            return;
        }

        let positions = model.positions_mut();
        let corners = positions.len() / 3;
        for p in positions.chunks_exact_mut(3) {
            let out = self.apply_to_point(&Point3::new(p[0], p[1], p[2]));
            p.copy_from_slice(&[out.x, out.y, out.z]);
        }

        let mut rotated_normals = 0;
        if let Some(normals) = model.normals_mut() {
            for n in normals.chunks_exact_mut(3) {
                let out = self.apply_to_normal(&Vector3::new(n[0], n[1], n[2]));
                n.copy_from_slice(&[out.x, out.y, out.z]);
            }
            rotated_normals = normals.len() / 3;
        }

        debug!(corners, normals = rotated_normals, "Transformed geometry");
    }
}

/// Build a transform from `options` and apply it to `model`.
///
/// # Errors
///
/// Returns [`TransformError::NonFinite`] if any supplied component is NaN
/// or infinite; the model is not modified in that case.
pub fn transform_geometry(
    model: &mut GeometryModel,
    options: &TransformOptions,
) -> TransformResult<()> {
    GeometryTransform::from_options(options)?.apply(model);
    Ok(())
}

fn checked(axes: Axes, names: [&'static str; 3]) -> TransformResult<Vector3<f32>> {
    for (value, component) in [axes.x, axes.y, axes.z].into_iter().zip(names) {
        if !value.is_finite() {
            return Err(TransformError::NonFinite { component, value });
        }
    }
    Ok(axes.to_vector())
}

fn euler_xyz(angles: Vector3<f32>) -> UnitQuaternion<f32> {
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.z);
    qx * qy * qz
}
