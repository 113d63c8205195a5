//! Request-level transform options.

use std::fmt;
use std::str::FromStr;

use mesh_types::Vector3;

use crate::error::TransformError;

/// A value per coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axes {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Axes {
    /// Create an axis triplet.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The same value on every axis.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Convert to a vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<[f32; 3]> for Axes {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Parses `x,y,z`, the form used on the command line.
impl FromStr for Axes {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransformError::InvalidAxes {
            input: s.to_string(),
        };

        let mut values = [0.0_f32; 3];
        let mut parts = s.split(',');
        for slot in &mut values {
            let part = parts.next().ok_or_else(invalid)?;
            *slot = part.trim().parse().map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(values.into())
    }
}

/// Optional scale and rotation for one conversion.
///
/// Omitted fields mean identity: scale `(1, 1, 1)` and rotation `(0, 0, 0)`.
/// Rotation angles are Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformOptions {
    /// Per-axis scale factors.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub scale: Option<Axes>,
    /// Euler rotation in radians.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rotate: Option<Axes>,
}

impl TransformOptions {
    /// Options that leave geometry untouched.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            scale: None,
            rotate: None,
        }
    }

    /// Set the per-axis scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: Axes) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the Euler rotation in radians.
    #[must_use]
    pub const fn with_rotation(mut self, rotate: Axes) -> Self {
        self.rotate = Some(rotate);
        self
    }

    /// Whether neither field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.scale.is_none() && self.rotate.is_none()
    }
}
