//! OBJ (Wavefront) file format support.
//!
//! # Reading
//!
//! `v`, `vt` and `vn` directives fill position, UV and normal pools.
//! Each `f` directive references those pools with 1-based indices, one
//! `v[/vt][/vn]` group per corner; negative indices count back from the end
//! of the pool. Every corner is re-emitted into the flat output buffers, so
//! shared vertices are duplicated. Polygons are fan-triangulated.
//!
//! # Writing
//!
//! One `v` (and `vt`/`vn` when present) line per triangle corner, followed
//! by `f` lines with sequential indices. The output is valid OBJ but not
//! deduplicated.

use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{GeometryBuilder, GeometryModel, MeshTopology};

use crate::error::{IoError, IoResult};
use crate::{MeshFormat, read_file};

/// Attributes resolved for one face corner.
#[derive(Debug, Clone, Copy)]
struct Corner {
    position: [f32; 3],
    uv: Option<[f32; 2]>,
    normal: Option<[f32; 3]>,
}

/// Attribute pools accumulated from `v`/`vt`/`vn` directives.
#[derive(Debug, Default)]
struct Pools {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

/// Decode an OBJ buffer.
///
/// # Errors
///
/// Returns [`IoError::Parse`] if the text is not UTF-8, a number cannot be
/// parsed, a face index is out of range, or the file has no `f` directive.
///
/// # Example
///
/// ```
/// use mesh_io::read_obj;
/// use mesh_types::MeshTopology;
///
/// let text = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n";
/// let model = read_obj(text).unwrap();
/// assert_eq!(model.face_count(), 2);
/// assert_eq!(model.vertex_count(), 6);
/// ```
pub fn read_obj(bytes: &[u8]) -> IoResult<GeometryModel> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IoError::parse(MeshFormat::Obj, format!("invalid UTF-8: {e}")))?;

    let mut pools = Pools::default();
    let mut builder = GeometryBuilder::new();
    let mut saw_face = false;
    let mut polygon: Vec<Corner> = Vec::with_capacity(4);

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.split('#').next().unwrap_or_default();
        let mut parts = line.split_whitespace();
        let Some(directive) = parts.next() else {
            continue;
        };

        match directive {
            "v" => pools.positions.push(parse_floats(&mut parts, line_no, "v", 3)?),
            "vn" => pools.normals.push(parse_floats(&mut parts, line_no, "vn", 3)?),
            "vt" => pools.uvs.push(parse_floats(&mut parts, line_no, "vt", 1)?),
            "f" => {
                polygon.clear();
                for group in parts {
                    polygon.push(resolve_corner(&pools, group, line_no)?);
                }
                if polygon.len() < 3 {
                    return Err(obj_error(
                        line_no,
                        format!("face has {} corners, need at least 3", polygon.len()),
                    ));
                }
                for i in 1..polygon.len() - 1 {
                    for corner in [polygon[0], polygon[i], polygon[i + 1]] {
                        builder.push_corner(corner.position, corner.normal, corner.uv);
                    }
                }
                saw_face = true;
            }
            _ => {
                // o, g, s, usemtl, mtllib, l, p
            }
        }
    }

    if !saw_face {
        return Err(IoError::parse(MeshFormat::Obj, "missing `f` directive"));
    }

    builder
        .finish()
        .map_err(|e| IoError::parse(MeshFormat::Obj, e.to_string()))
}

/// Parse up to `N` floats, requiring at least `required`. Missing optional
/// components default to zero; extra components are ignored.
fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    directive: &str,
    required: usize,
) -> IoResult<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        match parts.next() {
            Some(token) => {
                *slot = token.parse().map_err(|_| {
                    obj_error(line_no, format!("expected a number, found `{token}`"))
                })?;
            }
            None if i < required => {
                return Err(obj_error(
                    line_no,
                    format!("`{directive}` needs {required} components"),
                ));
            }
            None => break,
        }
    }
    Ok(out)
}

/// Resolve one `v[/vt][/vn]` group against the pools.
fn resolve_corner(pools: &Pools, group: &str, line_no: usize) -> IoResult<Corner> {
    let mut fields = group.split('/');
    let position = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| obj_error(line_no, format!("corner `{group}` has no vertex index")))?;
    let position = pools.positions[resolve_index(position, pools.positions.len(), line_no)?];

    let uv = match fields.next().filter(|s| !s.is_empty()) {
        Some(token) => Some(pools.uvs[resolve_index(token, pools.uvs.len(), line_no)?]),
        None => None,
    };
    let normal = match fields.next().filter(|s| !s.is_empty()) {
        Some(token) => Some(pools.normals[resolve_index(token, pools.normals.len(), line_no)?]),
        None => None,
    };

    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Convert a 1-based (or negative, relative) OBJ index to a pool offset.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
// Pool sizes are far below i64::MAX; the sign is checked before casting back
fn resolve_index(token: &str, len: usize, line_no: usize) -> IoResult<usize> {
    let raw: i64 = token
        .parse()
        .map_err(|_| obj_error(line_no, format!("expected an index, found `{token}`")))?;

    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(len as i64 + r),
    };

    match resolved {
        Some(i) if i >= 0 && (i as usize) < len => Ok(i as usize),
        _ => Err(obj_error(
            line_no,
            format!("index {raw} out of range for {len} entries"),
        )),
    }
}

fn obj_error(line_no: usize, message: impl AsRef<str>) -> IoError {
    IoError::parse(
        MeshFormat::Obj,
        format!("line {line_no}: {}", message.as_ref()),
    )
}

/// Encode a model as OBJ.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_obj<W: Write>(model: &GeometryModel, mut writer: W) -> IoResult<()> {
    writeln!(writer, "# mesh-io OBJ export")?;
    writeln!(
        writer,
        "# {} vertices, {} faces",
        model.vertex_count(),
        model.face_count()
    )?;

    for p in model.positions().chunks_exact(3) {
        writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
    }
    if let Some(uvs) = model.uvs() {
        for t in uvs.chunks_exact(2) {
            writeln!(writer, "vt {} {}", t[0], t[1])?;
        }
    }
    if let Some(normals) = model.normals() {
        for n in normals.chunks_exact(3) {
            writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
        }
    }

    let has_uvs = model.uvs().is_some();
    let has_normals = model.normals().is_some();
    for face in 0..model.face_count() {
        let base = face * 3 + 1;
        write!(writer, "f")?;
        for i in base..base + 3 {
            match (has_uvs, has_normals) {
                (true, true) => write!(writer, " {i}/{i}/{i}")?,
                (true, false) => write!(writer, " {i}/{i}")?,
                (false, true) => write!(writer, " {i}//{i}")?,
                (false, false) => write!(writer, " {i}")?,
            }
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Load a mesh from an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid OBJ.
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<GeometryModel> {
    read_obj(&read_file(path.as_ref())?)
}

/// Save a mesh to an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(model: &GeometryModel, path: P) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(model, &mut writer)?;
    writer.flush()?;
    Ok(())
}
