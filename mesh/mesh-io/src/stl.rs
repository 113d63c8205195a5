//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL formats.
//!
//! # Format Detection
//!
//! A buffer is read as ASCII when its 80-byte header starts with "solid"
//! (after optional whitespace) and the leading bytes are printable text.
//! Anything else, including a blank header, is read as binary.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored, often contains file info)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! A buffer shorter than `84 + 50 * n` bytes is rejected.
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! The facet normal is replicated onto each of the three corners.

use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{GeometryBuilder, GeometryModel, MeshTopology, Point3, Vector3};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::{MeshFormat, read_file};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Header plus the little-endian triangle count.
const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Bytes inspected when deciding between ASCII and binary.
const SNIFF_SIZE: usize = 512;

/// Solid name written by the ASCII writer.
const SOLID_NAME: &str = "mesh";

/// Decode an STL buffer, detecting ASCII vs binary.
///
/// # Errors
///
/// Returns [`IoError::Parse`] if the buffer is truncated or a numeric
/// field cannot be parsed.
///
/// # Example
///
/// ```
/// use mesh_io::read_stl;
/// use mesh_types::MeshTopology;
///
/// let text = b"solid t\nfacet normal 0 0 1\nouter loop\n\
///     vertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid t\n";
/// let model = read_stl(text).unwrap();
/// assert_eq!(model.face_count(), 1);
/// ```
pub fn read_stl(bytes: &[u8]) -> IoResult<GeometryModel> {
    if is_ascii_stl(bytes) {
        read_stl_ascii(bytes)
    } else {
        read_stl_binary(bytes)
    }
}

/// Check whether a buffer looks like ASCII STL.
fn is_ascii_stl(bytes: &[u8]) -> bool {
    let header = &bytes[..bytes.len().min(HEADER_SIZE)];
    let header = String::from_utf8_lossy(header);
    if !header.trim_start().starts_with("solid") {
        return false;
    }

    // Binary headers may also start with "solid"; their records don't survive this check
    bytes[..bytes.len().min(SNIFF_SIZE)]
        .iter()
        .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r'))
}

/// Decode a binary STL buffer.
///
/// # Errors
///
/// Returns [`IoError::Parse`] if the buffer is shorter than the size
/// implied by its triangle count.
#[allow(clippy::cast_possible_truncation)]
// Truncation: the length check bounds the count by the buffer size
pub fn read_stl_binary(bytes: &[u8]) -> IoResult<GeometryModel> {
    if bytes.len() < PREAMBLE_SIZE {
        return Err(IoError::parse(
            MeshFormat::Stl,
            format!(
                "buffer holds {} bytes, binary header needs {PREAMBLE_SIZE}",
                bytes.len()
            ),
        ));
    }

    let face_count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let expected = PREAMBLE_SIZE as u64 + TRIANGLE_SIZE as u64 * u64::from(face_count);
    let actual = bytes.len() as u64;
    if actual < expected {
        return Err(IoError::parse(
            MeshFormat::Stl,
            format!("expected {expected} bytes for {face_count} triangles, got {actual}"),
        ));
    }
    if actual > expected {
        debug!(
            trailing = actual - expected,
            "Ignoring bytes after last binary STL record"
        );
    }

    let records = &bytes[PREAMBLE_SIZE..expected as usize];
    let mut builder = GeometryBuilder::with_capacity(face_count as usize);

    for record in records.chunks_exact(TRIANGLE_SIZE) {
        let normal = read_f32x3(&record[0..12]);
        builder.push_corner(read_f32x3(&record[12..24]), Some(normal), None);
        builder.push_corner(read_f32x3(&record[24..36]), Some(normal), None);
        builder.push_corner(read_f32x3(&record[36..48]), Some(normal), None);
    }

    finish(builder)
}

/// Read 3 little-endian f32s from 12 bytes.
fn read_f32x3(buf: &[u8]) -> [f32; 3] {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    [x, y, z]
}

/// Decode an ASCII STL buffer.
///
/// # Errors
///
/// Returns [`IoError::Parse`] if a facet does not hold exactly three
/// vertices or a coordinate is not a number.
///
/// Solid names need not be UTF-8. Every solid in the buffer is read into
/// the one model.
pub fn read_stl_ascii(bytes: &[u8]) -> IoResult<GeometryModel> {
    // Latin-1 names survive as replacement characters; numbers are ASCII
    let text = String::from_utf8_lossy(bytes);

    let mut builder = GeometryBuilder::new();
    let mut facet_normal: Option<[f32; 3]> = None;
    let mut corners: Vec<[f32; 3]> = Vec::with_capacity(3);

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "facet" => {
                if facet_normal.is_some() {
                    return Err(stl_error(line_no, "facet opened before previous endfacet"));
                }
                let normal = match parts.next() {
                    Some(word) if word.eq_ignore_ascii_case("normal") => {
                        parse_triplet(&mut parts, line_no, "facet normal")?
                    }
                    _ => [0.0; 3],
                };
                facet_normal = Some(normal);
                corners.clear();
            }
            "vertex" => {
                if facet_normal.is_none() {
                    return Err(stl_error(line_no, "vertex outside of a facet"));
                }
                if corners.len() == 3 {
                    return Err(stl_error(line_no, "facet has more than 3 vertices"));
                }
                corners.push(parse_triplet(&mut parts, line_no, "vertex")?);
            }
            "endfacet" => {
                let Some(normal) = facet_normal.take() else {
                    return Err(stl_error(line_no, "endfacet without facet"));
                };
                if corners.len() != 3 {
                    return Err(stl_error(
                        line_no,
                        format!("facet has {} vertices, expected 3", corners.len()),
                    ));
                }
                for corner in corners.drain(..) {
                    builder.push_corner(corner, Some(normal), None);
                }
            }
            "endsolid" => {
                if facet_normal.is_some() {
                    return Err(stl_error(line_no, "endsolid inside a facet"));
                }
            }
            _ => {
                // solid, outer loop, endloop
            }
        }
    }

    if facet_normal.is_some() {
        return Err(IoError::parse(MeshFormat::Stl, "unterminated facet"));
    }

    finish(builder)
}

fn parse_triplet<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &str,
) -> IoResult<[f32; 3]> {
    let mut out = [0.0; 3];
    for slot in &mut out {
        let token = parts
            .next()
            .ok_or_else(|| stl_error(line_no, format!("`{what}` needs 3 numbers")))?;
        *slot = token.parse().map_err(|_| {
            stl_error(line_no, format!("expected a number, found `{token}`"))
        })?;
    }
    Ok(out)
}

fn stl_error(line_no: usize, message: impl AsRef<str>) -> IoError {
    IoError::parse(
        MeshFormat::Stl,
        format!("line {line_no}: {}", message.as_ref()),
    )
}

fn finish(builder: GeometryBuilder) -> IoResult<GeometryModel> {
    builder
        .finish()
        .map_err(|e| IoError::parse(MeshFormat::Stl, e.to_string()))
}

/// Unit normal of a triangle by the right-hand rule.
///
/// A degenerate (zero-area) triangle yields the zero vector.
#[must_use]
pub fn facet_normal(triangle: &[Point3<f32>; 3]) -> Vector3<f32> {
    let e1 = triangle[1] - triangle[0];
    let e2 = triangle[2] - triangle[0];
    e1.cross(&e2)
        .try_normalize(f32::MIN_POSITIVE)
        .unwrap_or_else(Vector3::zeros)
}

/// Normal written for a facet: the first corner's stored normal if the
/// model has normals, otherwise the computed face normal.
fn output_normal(model: &GeometryModel, face: usize, triangle: &[Point3<f32>; 3]) -> Vector3<f32> {
    model
        .normal(face * 3)
        .unwrap_or_else(|| facet_normal(triangle))
}

/// Encode a model as ASCII STL.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_stl<W: Write>(model: &GeometryModel, mut writer: W) -> IoResult<()> {
    writeln!(writer, "solid {SOLID_NAME}")?;

    for (face, triangle) in model.triangles().enumerate() {
        let n = output_normal(model, face, &triangle);
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in &triangle {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid {SOLID_NAME}")?;
    Ok(())
}

/// Encode a model as binary STL.
///
/// # Errors
///
/// Returns [`IoError::Encode`] if the model has more triangles than a
/// 32-bit count can describe, or an I/O error if the writer fails.
pub fn write_stl_binary<W: Write>(model: &GeometryModel, mut writer: W) -> IoResult<()> {
    // Padded with spaces; must not start with "solid"
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let face_count = u32::try_from(model.face_count()).map_err(|_| {
        IoError::encode(
            MeshFormat::Stl,
            format!("{} triangles exceed the binary count field", model.face_count()),
        )
    })?;
    writer.write_all(&face_count.to_le_bytes())?;

    for (face, triangle) in model.triangles().enumerate() {
        let n = output_normal(model, face, &triangle);
        write_f32x3(&mut writer, n.x, n.y, n.z)?;
        for v in &triangle {
            write_f32x3(&mut writer, v.x, v.y, v.z)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

fn write_f32x3<W: Write>(writer: &mut W, x: f32, y: f32, z: f32) -> IoResult<()> {
    writer.write_all(&x.to_le_bytes())?;
    writer.write_all(&y.to_le_bytes())?;
    writer.write_all(&z.to_le_bytes())?;
    Ok(())
}

/// Load a mesh from an STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid STL.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_stl;
/// use mesh_types::MeshTopology;
///
/// let model = load_stl("model.stl").unwrap();
/// println!("Loaded {} faces", model.face_count());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<GeometryModel> {
    read_stl(&read_file(path.as_ref())?)
}

/// Save a mesh to an STL file.
///
/// # Arguments
///
/// * `model` - The geometry to save
/// * `path` - Output file path
/// * `binary` - If true, save as binary STL; if false, save as ASCII
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_stl<P: AsRef<Path>>(model: &GeometryModel, path: P, binary: bool) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    if binary {
        write_stl_binary(model, &mut writer)?;
    } else {
        write_stl(model, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::unnecessary_raw_string_hashes
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TWO_FACETS: &[u8] = br#"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test"#;

    fn binary_stl(triangles: &[[f32; 12]]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&u32::try_from(triangles.len()).unwrap().to_le_bytes());
        for tri in triangles {
            for value in tri {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            bytes.extend_from_slice(&[0, 0]);
        }
        bytes
    }

    #[test]
    fn ascii_stl_parsing() {
        let model = read_stl(TWO_FACETS).unwrap();
        assert_eq!(model.face_count(), 2);
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.position(4), Some(Point3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn ascii_normals_replicated_per_corner() {
        let model = read_stl(TWO_FACETS).unwrap();
        let normals = model.normals().unwrap();
        assert_eq!(normals.len(), model.positions().len());
        for corner in 0..6 {
            assert_eq!(model.normal(corner), Some(Vector3::z()));
        }
    }

    #[test]
    fn ascii_rejects_non_numeric_vertex() {
        let text = b"solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 zero\n";
        let err = read_stl(text).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("STL parsing failed"), "{message}");
        assert!(message.contains("zero"), "{message}");
    }

    #[test]
    fn ascii_rejects_short_facet() {
        let text = b"solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\nendfacet\nendsolid t\n";
        let err = read_stl(text).unwrap_err();
        assert!(err.to_string().contains("facet has 2 vertices"));
    }

    #[test]
    fn ascii_rejects_unterminated_facet() {
        let text = b"solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\n";
        assert!(matches!(read_stl(text), Err(IoError::Parse { .. })));
    }

    #[test]
    fn ascii_roundtrip_preserves_positions() {
        let original = read_stl(TWO_FACETS).unwrap();

        let mut out = Vec::new();
        write_stl(&original, &mut out).unwrap();
        let reloaded = read_stl(&out).unwrap();

        assert_eq!(reloaded.face_count(), original.face_count());
        for (a, b) in original.positions().iter().zip(reloaded.positions()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn ascii_roundtrip_is_exact() {
        let corners = [
            Point3::new(0.1_f32, 1.0 / 3.0, -2.718_281_7),
            Point3::new(1.0e-7, 123_456.79, 0.333_333_34),
            Point3::new(f32::MIN_POSITIVE, -0.0, 16_777_215.0),
        ];
        let original = GeometryModel::from_indexed(&corners, &[[0, 1, 2]]).unwrap();

        let mut out = Vec::new();
        write_stl(&original, &mut out).unwrap();
        let reloaded = read_stl(&out).unwrap();

        assert_eq!(reloaded.positions(), original.positions());
    }

    #[test]
    fn ascii_accepts_latin1_solid_name() {
        let text = b"solid Pi\xE8ce\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid Pi\xE8ce\n";
        let model = read_stl(text).unwrap();
        assert_eq!(model.face_count(), 1);
    }

    #[test]
    fn ascii_reads_every_solid() {
        let mut text = TWO_FACETS.to_vec();
        text.extend_from_slice(b"\nsolid second\nfacet normal 0 0 1\nouter loop\nvertex 0 0 1\nvertex 1 0 1\nvertex 0 1 1\nendloop\nendfacet\nendsolid second\n");

        let model = read_stl(&text).unwrap();
        assert_eq!(model.face_count(), 3);
        assert_eq!(model.position(6), Some(Point3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn ascii_rejects_endsolid_inside_facet() {
        let text = b"solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nendsolid t\n";
        let err = read_stl(text).unwrap_err();
        assert!(err.to_string().contains("endsolid inside a facet"));
    }

    #[test]
    fn binary_stl_parsing() {
        let bytes = binary_stl(&[[
            0.0, 0.0, 1.0, // normal
            0.0, 0.0, 0.0, // v1
            2.0, 0.0, 0.0, // v2
            0.0, 3.0, 0.0, // v3
        ]]);
        assert_eq!(bytes.len(), 84 + 50);

        let model = read_stl(&bytes).unwrap();
        assert_eq!(model.face_count(), 1);
        assert_eq!(model.position(1), Some(Point3::new(2.0, 0.0, 0.0)));
        assert_eq!(model.normal(2), Some(Vector3::z()));
    }

    #[test]
    fn binary_rejects_truncated_record() {
        let mut bytes = binary_stl(&[[0.0; 12], [1.0; 12]]);
        assert_eq!(bytes.len(), 84 + 100);
        bytes.pop();

        let err = read_stl(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IoError::Parse {
                format: MeshFormat::Stl,
                ..
            }
        ));
        assert!(err.to_string().contains("expected 184 bytes for 2 triangles, got 183"));
    }

    #[test]
    fn binary_rejects_short_header() {
        let err = read_stl(&[0u8; 40]).unwrap_err();
        assert!(err.to_string().starts_with("STL parsing failed"));
    }

    #[test]
    fn binary_header_starting_with_solid() {
        let mut bytes = binary_stl(&[[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]]);
        bytes[..5].copy_from_slice(b"solid");
        let model = read_stl(&bytes).unwrap();
        assert_eq!(model.face_count(), 1);
    }

    #[test]
    fn blank_header_reads_as_binary() {
        let mut bytes = vec![b' '; HEADER_SIZE];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let model = read_stl(&bytes).unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn binary_roundtrip() {
        let original = mesh_types::unit_cube();
        let mut out = Vec::new();
        write_stl_binary(&original, &mut out).unwrap();
        assert_eq!(out.len(), 84 + 50 * 12);

        let reloaded = read_stl(&out).unwrap();
        assert_eq!(reloaded.positions(), original.positions());
    }

    #[test]
    fn writer_computes_missing_normals() {
        let model =
            GeometryModel::from_positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let mut out = Vec::new();
        write_stl(&model, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("solid mesh\n"));
        assert!(text.trim_end().ends_with("endsolid mesh"));
        assert!(text.contains("facet normal 0e0 0e0 1e0"));
    }

    #[test]
    fn writer_reuses_first_corner_normal() {
        let model = GeometryModel::from_buffers(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Some(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
            None,
        )
        .unwrap();
        let reloaded = {
            let mut out = Vec::new();
            write_stl(&model, &mut out).unwrap();
            read_stl(&out).unwrap()
        };
        assert_eq!(reloaded.normal(2), Some(Vector3::x()));
    }

    #[test]
    fn degenerate_triangle_has_zero_normal() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(facet_normal(&[p, p, p]), Vector3::zeros());

        let collinear = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(facet_normal(&collinear), Vector3::zeros());
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cube.stl");
        save_stl(&mesh_types::unit_cube(), &path, false).unwrap();

        let loaded = load_stl(&path).unwrap();
        assert_eq!(loaded.face_count(), 12);
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_stl("nonexistent_file_12345.stl");
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
