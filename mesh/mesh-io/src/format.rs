//! Mesh format tags.

use std::fmt;
use std::path::Path;

/// Mesh interchange formats known to this crate.
///
/// Only some of them have a reader or writer; see
/// [`CodecRegistry`](crate::CodecRegistry) for capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshFormat {
    /// STL (Stereolithography), ASCII or binary.
    Stl,
    /// OBJ (Wavefront), ASCII.
    Obj,
    /// STEP (ISO 10303), `.step` extension.
    Step,
    /// STEP (ISO 10303), `.stp` extension.
    Stp,
    /// 3D Studio chunked binary.
    ThreeDs,
    /// COLLADA.
    Dae,
    /// Autodesk FBX.
    Fbx,
    /// Polygon File Format.
    Ply,
    /// VRML.
    Wrl,
    /// X3D.
    X3d,
}

impl MeshFormat {
    /// Every mesh format, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Stl,
        Self::Obj,
        Self::Step,
        Self::Stp,
        Self::ThreeDs,
        Self::Dae,
        Self::Fbx,
        Self::Ply,
        Self::Wrl,
        Self::X3d,
    ];

    /// Look up a format by extension (case-insensitive, no leading dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Detect format from file extension.
    ///
    /// # Returns
    ///
    /// The detected format, or `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Step => "step",
            Self::Stp => "stp",
            Self::ThreeDs => "3ds",
            Self::Dae => "dae",
            Self::Fbx => "fbx",
            Self::Ply => "ply",
            Self::Wrl => "wrl",
            Self::X3d => "x3d",
        }
    }

    /// Upper-case name used in messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Stl => "STL",
            Self::Obj => "OBJ",
            Self::Step => "STEP",
            Self::Stp => "STP",
            Self::ThreeDs => "3DS",
            Self::Dae => "DAE",
            Self::Fbx => "FBX",
            Self::Ply => "PLY",
            Self::Wrl => "WRL",
            Self::X3d => "X3D",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFormat::from_path("model.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.STL"), Some(MeshFormat::Stl));
        assert_eq!(
            MeshFormat::from_path("/path/to/scene.3ds"),
            Some(MeshFormat::ThreeDs)
        );
        assert_eq!(MeshFormat::from_path("part.stp"), Some(MeshFormat::Stp));
        assert_eq!(MeshFormat::from_path("model.X3D"), Some(MeshFormat::X3d));
    }

    #[test]
    fn format_from_path_unknown() {
        assert_eq!(MeshFormat::from_path("model.xyz"), None);
        assert_eq!(MeshFormat::from_path("drawing.dwg"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
        assert_eq!(MeshFormat::from_path(""), None);
    }

    #[test]
    fn extension_round_trips() {
        for format in MeshFormat::ALL {
            assert_eq!(MeshFormat::from_extension(format.extension()), Some(format));
        }
    }

    #[test]
    fn label_is_display() {
        assert_eq!(MeshFormat::ThreeDs.to_string(), "3DS");
        assert_eq!(MeshFormat::Obj.to_string(), "OBJ");
    }
}
