//! Conversion matrix: which format pairs are legal and how each is routed.

use mesh_io::MeshFormat;

use crate::FileFormat;
use crate::error::{ConvertError, ConvertResult};

/// Formats accepted as conversion sources.
pub const SUPPORTED_INPUT_FORMATS: [FileFormat; 12] = [
    FileFormat::Stl,
    FileFormat::Obj,
    FileFormat::Step,
    FileFormat::Stp,
    FileFormat::ThreeDs,
    FileFormat::Dae,
    FileFormat::Fbx,
    FileFormat::Ply,
    FileFormat::Wrl,
    FileFormat::X3d,
    FileFormat::Dwg,
    FileFormat::Dxf,
];

/// Formats accepted as conversion targets.
pub const SUPPORTED_OUTPUT_FORMATS: [FileFormat; 14] = FileFormat::ALL;

const DWG_TARGETS: [FileFormat; 3] = [FileFormat::Dxf, FileFormat::Pdf, FileFormat::Svg];
const DXF_TARGETS: [FileFormat; 3] = [FileFormat::Dwg, FileFormat::Pdf, FileFormat::Svg];

/// How a validated request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Source and target formats match; the file is copied byte for byte.
    Copy,
    /// Decode, optionally transform, and encode.
    Mesh {
        /// Source codec.
        from: MeshFormat,
        /// Target codec.
        to: MeshFormat,
    },
    /// Delegated to the external CAD or vector exporter.
    Cad {
        /// Source format.
        from: FileFormat,
        /// Target format.
        to: FileFormat,
    },
}

/// Legal targets for `input`, excluding `input` itself.
///
/// A mesh format lists the other nine mesh formats in declaration order.
/// Formats that are not supported inputs have no targets.
///
/// # Example
///
/// ```
/// use mesh_convert::{FileFormat, available_output_formats};
///
/// assert_eq!(
///     available_output_formats(FileFormat::Dwg),
///     [FileFormat::Dxf, FileFormat::Pdf, FileFormat::Svg]
/// );
/// assert_eq!(available_output_formats(FileFormat::Stl).len(), 9);
/// ```
#[must_use]
pub fn available_output_formats(input: FileFormat) -> Vec<FileFormat> {
    match input {
        FileFormat::Dwg => DWG_TARGETS.to_vec(),
        FileFormat::Dxf => DXF_TARGETS.to_vec(),
        FileFormat::Pdf | FileFormat::Svg => Vec::new(),
        mesh => MeshFormat::ALL
            .into_iter()
            .map(FileFormat::from)
            .filter(|&f| f != mesh)
            .collect(),
    }
}

/// Whether `input` may be converted to `output`.
///
/// The identity pair is legal for every supported input.
#[must_use]
pub fn is_supported(input: FileFormat, output: FileFormat) -> bool {
    SUPPORTED_INPUT_FORMATS.contains(&input)
        && SUPPORTED_OUTPUT_FORMATS.contains(&output)
        && (input == output || available_output_formats(input).contains(&output))
}

/// Validate a format pair and choose its route.
///
/// # Errors
///
/// Returns [`ConvertError::UnsupportedFormat`] if either format is outside
/// the declared sets, or [`ConvertError::UnsupportedConversion`] if the pair
/// is not in the matrix.
pub fn plan(input: FileFormat, output: FileFormat) -> ConvertResult<ConversionKind> {
    if !SUPPORTED_INPUT_FORMATS.contains(&input) {
        return Err(ConvertError::UnsupportedFormat {
            format: input.to_string(),
        });
    }
    if !SUPPORTED_OUTPUT_FORMATS.contains(&output) {
        return Err(ConvertError::UnsupportedFormat {
            format: output.to_string(),
        });
    }

    if input == output {
        return Ok(ConversionKind::Copy);
    }
    if !available_output_formats(input).contains(&output) {
        return Err(ConvertError::UnsupportedConversion {
            from: input,
            to: output,
        });
    }

    Ok(match (input.as_mesh(), output.as_mesh()) {
        (Some(from), Some(to)) => ConversionKind::Mesh { from, to },
        _ => ConversionKind::Cad {
            from: input,
            to: output,
        },
    })
}
