//! 3DS (3D Studio) chunked binary format support.
//!
//! # Chunk Layout
//!
//! ```text
//! UINT16   – Chunk ID
//! UINT32   – Chunk length, including this 6-byte header
//! UINT8[]  – Payload (data and/or child chunks)
//! ```
//!
//! The reader descends into the container chunks on the path to mesh data
//! and decodes vertex and face lists. Every other chunk is skipped by its
//! declared length, so unknown or newer chunk types never stop traversal.
//!
//! ```text
//! MAIN3DS (0x4D4D)
//! └── EDIT3DS (0x3D3D)
//!     └── EDIT_OBJECT (0x4000)  – null-terminated name, then children
//!         └── OBJ_TRIMESH (0x4100)
//!             ├── VERTICES_LIST (0x4110)  – UINT16 count, count × REAL32[3]
//!             └── FACES_LIST (0x4120)     – UINT16 count, count × (UINT16[3] + UINT16 flags)
//! ```
//!
//! # Writing
//!
//! Only `MAIN3DS { VERSION, VERTICES_LIST }` is emitted. Face, object and
//! material chunks are not generated, so a written file carries positions
//! but no triangles.

use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{GeometryModel, MeshTopology, Point3};
use tracing::trace;

use crate::error::{IoError, IoResult};
use crate::{MeshFormat, read_file};

/// Size of the chunk ID plus length prefix.
const CHUNK_HEADER: usize = 6;

/// Root chunk.
const MAIN3DS: u16 = 0x4D4D;
/// File version, child of the root.
const VERSION: u16 = 0x0002;
/// 3D editor data.
const EDIT3DS: u16 = 0x3D3D;
/// Named object; payload starts with a null-terminated name.
const EDIT_OBJECT: u16 = 0x4000;
/// Triangle mesh.
const OBJ_TRIMESH: u16 = 0x4100;
/// Vertex positions.
const VERTICES_LIST: u16 = 0x4110;
/// Triangle indices.
const FACES_LIST: u16 = 0x4120;

/// Version number written into the VERSION chunk.
const FILE_VERSION: u32 = 3;

/// Deepest container nesting accepted by the reader.
const MAX_DEPTH: usize = 16;

/// A chunk whose header has been validated against its parent's bounds.
#[derive(Debug, Clone, Copy)]
struct Chunk {
    id: u16,
    /// Offset of the chunk header.
    start: usize,
    /// Offset of the first payload byte.
    data: usize,
    /// Offset one past the last payload byte.
    end: usize,
}

impl Chunk {
    fn payload<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.data..self.end]
    }
}

/// Vertex pool and flattened output shared across the traversal.
#[derive(Debug, Default)]
struct Scene {
    vertices: Vec<Point3<f32>>,
    positions: Vec<f32>,
}

/// Decode a 3DS buffer.
///
/// Faces are flattened against the most recent vertex list, so files with
/// several objects produce one combined model.
///
/// # Errors
///
/// Returns [`IoError::Parse`] if a chunk header is truncated, a chunk's
/// declared length overruns its parent, a list is shorter than its count,
/// or a face references a missing vertex.
pub fn read_3ds(bytes: &[u8]) -> IoResult<GeometryModel> {
    if bytes.is_empty() {
        return Err(IoError::parse(MeshFormat::ThreeDs, "empty buffer"));
    }

    let mut scene = Scene::default();
    walk(bytes, 0, bytes.len(), 0, &mut scene)?;

    GeometryModel::from_positions(scene.positions)
        .map_err(|e| IoError::parse(MeshFormat::ThreeDs, e.to_string()))
}

fn walk(bytes: &[u8], mut cursor: usize, end: usize, depth: usize, scene: &mut Scene) -> IoResult<()> {
    if depth > MAX_DEPTH {
        return Err(IoError::parse(
            MeshFormat::ThreeDs,
            format!("chunks nested deeper than {MAX_DEPTH} levels"),
        ));
    }

    while cursor < end {
        let chunk = read_chunk(bytes, cursor, end)?;
        match chunk.id {
            MAIN3DS | EDIT3DS | OBJ_TRIMESH => walk(bytes, chunk.data, chunk.end, depth + 1, scene)?,
            EDIT_OBJECT => {
                let children = skip_name(bytes, &chunk)?;
                walk(bytes, children, chunk.end, depth + 1, scene)?;
            }
            VERTICES_LIST => scene.vertices = read_vertices(bytes, &chunk)?,
            FACES_LIST => read_faces(bytes, &chunk, scene)?,
            id => trace!(id, len = chunk.end - chunk.start, "Skipping 3DS chunk"),
        }
        cursor = chunk.end;
    }

    Ok(())
}

/// Read and bounds-check the chunk header at `offset`.
fn read_chunk(bytes: &[u8], offset: usize, limit: usize) -> IoResult<Chunk> {
    if limit - offset < CHUNK_HEADER {
        return Err(IoError::parse(
            MeshFormat::ThreeDs,
            format!("truncated chunk header at byte {offset}"),
        ));
    }

    let id = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
    let len = u32::from_le_bytes([
        bytes[offset + 2],
        bytes[offset + 3],
        bytes[offset + 4],
        bytes[offset + 5],
    ]) as usize;

    let available = limit - offset;
    if len < CHUNK_HEADER || len > available {
        return Err(IoError::parse(
            MeshFormat::ThreeDs,
            format!(
                "chunk 0x{id:04X} at byte {offset} declares {len} bytes, {available} available"
            ),
        ));
    }

    Ok(Chunk {
        id,
        start: offset,
        data: offset + CHUNK_HEADER,
        end: offset + len,
    })
}

/// Offset just past the null-terminated object name.
fn skip_name(bytes: &[u8], chunk: &Chunk) -> IoResult<usize> {
    chunk
        .payload(bytes)
        .iter()
        .position(|&b| b == 0)
        .map(|nul| chunk.data + nul + 1)
        .ok_or_else(|| {
            IoError::parse(
                MeshFormat::ThreeDs,
                format!("object name at byte {} is not terminated", chunk.data),
            )
        })
}

/// Leading UINT16 count of a list chunk.
fn read_count(payload: &[u8], chunk: &Chunk) -> IoResult<usize> {
    match payload {
        [lo, hi, ..] => Ok(usize::from(u16::from_le_bytes([*lo, *hi]))),
        _ => Err(IoError::parse(
            MeshFormat::ThreeDs,
            format!("chunk 0x{:04X} at byte {} has no count", chunk.id, chunk.start),
        )),
    }
}

fn read_vertices(bytes: &[u8], chunk: &Chunk) -> IoResult<Vec<Point3<f32>>> {
    let payload = chunk.payload(bytes);
    let count = read_count(payload, chunk)?;
    let needed = 2 + count * 12;
    if payload.len() < needed {
        return Err(IoError::parse(
            MeshFormat::ThreeDs,
            format!(
                "vertex list declares {count} vertices but holds {} bytes, expected {needed}",
                payload.len()
            ),
        ));
    }

    Ok(payload[2..needed]
        .chunks_exact(12)
        .map(|v| {
            Point3::new(
                f32::from_le_bytes([v[0], v[1], v[2], v[3]]),
                f32::from_le_bytes([v[4], v[5], v[6], v[7]]),
                f32::from_le_bytes([v[8], v[9], v[10], v[11]]),
            )
        })
        .collect())
}

fn read_faces(bytes: &[u8], chunk: &Chunk, scene: &mut Scene) -> IoResult<()> {
    let payload = chunk.payload(bytes);
    let count = read_count(payload, chunk)?;

    // Records carry a flags word after the indices; accept lists without it
    let stride = if payload.len() >= 2 + count * 8 {
        8
    } else if payload.len() >= 2 + count * 6 {
        6
    } else {
        return Err(IoError::parse(
            MeshFormat::ThreeDs,
            format!(
                "face list declares {count} faces but holds {} bytes",
                payload.len()
            ),
        ));
    };

    let faces: Vec<[u32; 3]> = payload[2..2 + count * stride]
        .chunks_exact(stride)
        .map(|f| {
            [
                u32::from(u16::from_le_bytes([f[0], f[1]])),
                u32::from(u16::from_le_bytes([f[2], f[3]])),
                u32::from(u16::from_le_bytes([f[4], f[5]])),
            ]
        })
        .collect();

    let flattened = GeometryModel::from_indexed(&scene.vertices, &faces)
        .map_err(|e| IoError::parse(MeshFormat::ThreeDs, e.to_string()))?;
    scene.positions.extend_from_slice(flattened.positions());
    Ok(())
}

/// Encode a model's positions as a minimal 3DS file.
///
/// # Errors
///
/// Returns [`IoError::Encode`] if the model has more corners than a 3DS
/// vertex list can count, or an I/O error if the writer fails.
pub fn write_3ds<W: Write>(model: &GeometryModel, mut writer: W) -> IoResult<()> {
    let count = u16::try_from(model.vertex_count()).map_err(|_| {
        IoError::encode(
            MeshFormat::ThreeDs,
            format!(
                "{} vertices exceed the 3DS vertex list limit of {}",
                model.vertex_count(),
                u16::MAX
            ),
        )
    })?;

    let vertices_len = (CHUNK_HEADER + 2 + usize::from(count) * 12) as u32;
    let version_len = (CHUNK_HEADER + 4) as u32;
    let main_len = CHUNK_HEADER as u32 + version_len + vertices_len;

    write_header(&mut writer, MAIN3DS, main_len)?;

    write_header(&mut writer, VERSION, version_len)?;
    writer.write_all(&FILE_VERSION.to_le_bytes())?;

    write_header(&mut writer, VERTICES_LIST, vertices_len)?;
    writer.write_all(&count.to_le_bytes())?;
    for value in model.positions() {
        writer.write_all(&value.to_le_bytes())?;
    }

    Ok(())
}

fn write_header<W: Write>(writer: &mut W, id: u16, len: u32) -> IoResult<()> {
    writer.write_all(&id.to_le_bytes())?;
    writer.write_all(&len.to_le_bytes())?;
    Ok(())
}

/// Load a mesh from a 3DS file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid 3DS.
pub fn load_3ds<P: AsRef<Path>>(path: P) -> IoResult<GeometryModel> {
    read_3ds(&read_file(path.as_ref())?)
}

/// Save a mesh's positions to a 3DS file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or the model is too
/// large for a single vertex list.
pub fn save_3ds<P: AsRef<Path>>(model: &GeometryModel, path: P) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_3ds(model, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    fn chunk(id: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_le_bytes().to_vec();
        out.extend_from_slice(&((payload.len() + CHUNK_HEADER) as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn vertices(points: &[[f32; 3]]) -> Vec<u8> {
        let mut payload = (points.len() as u16).to_le_bytes().to_vec();
        for p in points {
            for v in p {
                payload.extend_from_slice(&v.to_le_bytes());
            }
        }
        chunk(VERTICES_LIST, &payload)
    }

    fn faces(indices: &[[u16; 3]]) -> Vec<u8> {
        let mut payload = (indices.len() as u16).to_le_bytes().to_vec();
        for f in indices {
            for i in f {
                payload.extend_from_slice(&i.to_le_bytes());
            }
            payload.extend_from_slice(&0x0007u16.to_le_bytes());
        }
        chunk(FACES_LIST, &payload)
    }

    fn scene(trimesh_children: &[Vec<u8>]) -> Vec<u8> {
        let trimesh = chunk(OBJ_TRIMESH, &trimesh_children.concat());
        let mut object = b"quad\0".to_vec();
        object.extend_from_slice(&trimesh);
        let object = chunk(EDIT_OBJECT, &object);
        let edit = chunk(EDIT3DS, &object);
        chunk(MAIN3DS, &[chunk(VERSION, &3u32.to_le_bytes()), edit].concat())
    }

    fn quad() -> Vec<u8> {
        scene(&[
            vertices(&[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ]),
            faces(&[[0, 1, 2], [1, 3, 2]]),
        ])
    }

    #[test]
    fn reads_nested_trimesh() {
        let model = read_3ds(&quad()).unwrap();
        assert_eq!(model.face_count(), 2);
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.position(4), Some(Point3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn skips_unknown_chunks() {
        let unknown = chunk(0xAFFF, &[1, 2, 3, 4, 5]);
        let bytes = scene(&[
            unknown.clone(),
            vertices(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            unknown,
            faces(&[[0, 1, 2]]),
        ]);
        assert_eq!(read_3ds(&bytes).unwrap().face_count(), 1);
    }

    #[test]
    fn accepts_faces_without_flags() {
        let mut payload = 1u16.to_le_bytes().to_vec();
        for i in [0u16, 1, 2] {
            payload.extend_from_slice(&i.to_le_bytes());
        }
        let bytes = scene(&[
            vertices(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            chunk(FACES_LIST, &payload),
        ]);
        assert_eq!(read_3ds(&bytes).unwrap().face_count(), 1);
    }

    #[test]
    fn rejects_overlong_chunk() {
        let mut bytes = quad();
        // Inflate the root chunk length past the buffer
        bytes[2..6].copy_from_slice(&10_000u32.to_le_bytes());
        let err = read_3ds(&bytes).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("3DS parsing failed"), "{message}");
        assert!(message.contains("0x4D4D"), "{message}");
    }

    #[test]
    fn rejects_undersized_chunk_length() {
        let mut bytes = quad();
        bytes[2..6].copy_from_slice(&3u32.to_le_bytes());
        assert!(matches!(read_3ds(&bytes), Err(IoError::Parse { .. })));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let bytes = quad();
        assert!(read_3ds(&bytes[..bytes.len() - 4]).is_err());
        assert!(read_3ds(&bytes[..3]).is_err());
        assert!(read_3ds(&[]).is_err());
    }

    #[test]
    fn rejects_short_vertex_list() {
        let mut payload = 5u16.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0u8; 12]);
        let bytes = scene(&[chunk(VERTICES_LIST, &payload)]);
        let err = read_3ds(&bytes).unwrap_err();
        assert!(err.to_string().contains("declares 5 vertices"));
    }

    #[test]
    fn rejects_face_past_vertex_list() {
        let bytes = scene(&[
            vertices(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            faces(&[[0, 1, 3]]),
        ]);
        let err = read_3ds(&bytes).unwrap_err();
        assert!(err.to_string().contains("face index 3 out of range"));
    }

    #[test]
    fn writer_emits_minimal_chunk_sequence() {
        let model = mesh_types::unit_cube();
        let mut out = Vec::new();
        write_3ds(&model, &mut out).unwrap();

        let vertex_bytes = 6 + 2 + 36 * 12;
        assert_eq!(out.len(), 6 + 10 + vertex_bytes);
        assert_eq!(&out[0..2], &MAIN3DS.to_le_bytes());
        assert_eq!(&out[2..6], &(out.len() as u32).to_le_bytes());
        assert_eq!(&out[6..8], &VERSION.to_le_bytes());
        assert_eq!(&out[16..18], &VERTICES_LIST.to_le_bytes());
        assert_eq!(&out[22..24], &36u16.to_le_bytes());
    }

    #[test]
    fn written_file_reads_back_without_faces() {
        let mut out = Vec::new();
        write_3ds(&mesh_types::unit_cube(), &mut out).unwrap();

        let model = read_3ds(&out).unwrap();
        assert!(model.is_empty());
    }
}
