//! File format tags accepted by the converter.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use mesh_io::MeshFormat;

use crate::error::ConvertError;

/// Every format the converter can name: ten mesh formats plus the CAD and
/// vector formats handled by the external exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FileFormat {
    /// STL mesh.
    Stl,
    /// Wavefront OBJ mesh.
    Obj,
    /// STEP, `.step` extension.
    Step,
    /// STEP, `.stp` extension.
    Stp,
    /// 3D Studio mesh.
    #[cfg_attr(feature = "serde", serde(rename = "3ds"))]
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
    /// AutoCAD drawing.
    Dwg,
    /// Drawing exchange format.
    Dxf,
    /// PDF document.
    Pdf,
    /// Scalable vector graphics.
    Svg,
}

/// Extension to MIME type, one entry per [`FileFormat`].
pub const MIME_TYPES: [(&str, &str); 14] = [
    ("stl", "model/stl"),
    ("obj", "model/obj"),
    ("step", "model/step"),
    ("stp", "model/step"),
    ("3ds", "application/x-3ds"),
    ("dae", "model/vnd.collada+xml"),
    ("fbx", "application/octet-stream"),
    ("ply", "application/x-ply"),
    ("wrl", "model/vrml"),
    ("x3d", "model/x3d+xml"),
    ("dwg", "image/vnd.dwg"),
    ("dxf", "image/vnd.dxf"),
    ("pdf", "application/pdf"),
    ("svg", "image/svg+xml"),
];

impl FileFormat {
    /// Every format, in declaration order.
    pub const ALL: [Self; 14] = [
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
        Self::Dwg,
        Self::Dxf,
        Self::Pdf,
        Self::Svg,
    ];

    /// Look up a format by extension (case-insensitive, leading dot optional).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Detect format from a path's extension.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Canonical file extension.
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
            Self::Dwg => "dwg",
            Self::Dxf => "dxf",
            Self::Pdf => "pdf",
            Self::Svg => "svg",
        }
    }

    /// MIME type from [`MIME_TYPES`].
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        let ext = self.extension();
        MIME_TYPES
            .iter()
            .find(|(e, _)| *e == ext)
            .map_or("application/octet-stream", |(_, mime)| mime)
    }

    /// The mesh codec tag, if this is a mesh format.
    #[must_use]
    pub const fn as_mesh(&self) -> Option<MeshFormat> {
        match self {
            Self::Stl => Some(MeshFormat::Stl),
            Self::Obj => Some(MeshFormat::Obj),
            Self::Step => Some(MeshFormat::Step),
            Self::Stp => Some(MeshFormat::Stp),
            Self::ThreeDs => Some(MeshFormat::ThreeDs),
            Self::Dae => Some(MeshFormat::Dae),
            Self::Fbx => Some(MeshFormat::Fbx),
            Self::Ply => Some(MeshFormat::Ply),
            Self::Wrl => Some(MeshFormat::Wrl),
            Self::X3d => Some(MeshFormat::X3d),
            Self::Dwg | Self::Dxf | Self::Pdf | Self::Svg => None,
        }
    }

    /// Whether this is one of the ten mesh formats.
    #[must_use]
    pub const fn is_mesh(&self) -> bool {
        self.as_mesh().is_some()
    }
}

impl From<MeshFormat> for FileFormat {
    fn from(format: MeshFormat) -> Self {
        match format {
            MeshFormat::Stl => Self::Stl,
            MeshFormat::Obj => Self::Obj,
            MeshFormat::Step => Self::Step,
            MeshFormat::Stp => Self::Stp,
            MeshFormat::ThreeDs => Self::ThreeDs,
            MeshFormat::Dae => Self::Dae,
            MeshFormat::Fbx => Self::Fbx,
            MeshFormat::Ply => Self::Ply,
            MeshFormat::Wrl => Self::Wrl,
            MeshFormat::X3d => Self::X3d,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ConvertError::UnsupportedFormat {
            format: s.to_string(),
        })
    }
}
