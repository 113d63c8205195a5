//! Conformance tests across the supported mesh formats.
//!
//! Synthetic inputs cover the layouts real exporters produce: ASCII STL with
//! mixed-case keywords, binary STL whose header begins with `solid`, OBJ
//! with polygons and negative indices, and 3DS with several objects.
//!
//! Additional real-world STL/OBJ files placed in `tests/fixtures/` at the
//! workspace root are loaded as well.
//!
//! To run: cargo test -p mesh-io --test format_conformance

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation)]

use approx::assert_relative_eq;
use mesh_io::{
    CodecRegistry, IoError, MeshFormat, load_mesh, read_3ds, read_obj, read_stl, save_mesh,
    write_stl_binary,
};
use mesh_types::{MeshBounds, MeshTopology, unit_cube};
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the optional fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent dir")
        .parent()
        .expect("grandparent dir")
        .join("tests")
        .join("fixtures")
}

fn fixture_files() -> Vec<PathBuf> {
    std::fs::read_dir(fixtures_dir())
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            matches!(
                MeshFormat::from_path(&path),
                Some(MeshFormat::Stl | MeshFormat::Obj)
            )
            .then_some(path)
        })
        .collect()
}

// =============================================================================
// STL
// =============================================================================

#[test]
fn ascii_stl_tolerates_exporter_variations() {
    let input = b"solid Exported\r\n\
        \tFacet Normal 0 0 1\r\n\
        \t\tOuter Loop\r\n\
        \t\t\tVertex 0 0 0\r\n\
        \t\t\tVertex 1.5e+00 0 0\r\n\
        \t\t\tVertex 0 1 0\r\n\
        \t\tEndLoop\r\n\
        \tEndFacet\r\n\
        EndSolid Exported\r\n";

    let model = read_stl(input).unwrap();
    assert_eq!(model.face_count(), 1);
    assert_relative_eq!(model.bounds().max.x, 1.5);
}

#[test]
fn binary_stl_with_solid_header_is_binary() {
    let mut bytes = Vec::new();
    write_stl_binary(&unit_cube(), &mut bytes).unwrap();
    bytes[..5].copy_from_slice(b"solid");

    let model = read_stl(&bytes).unwrap();
    assert_eq!(model.face_count(), 12);
}

#[test]
fn truncated_binary_stl_names_the_format() {
    let mut bytes = Vec::new();
    write_stl_binary(&unit_cube(), &mut bytes).unwrap();
    bytes.truncate(bytes.len() - 1);

    let err = read_stl(&bytes).unwrap_err();
    assert!(matches!(err, IoError::Parse { format: MeshFormat::Stl, .. }));
    assert!(err.to_string().contains("STL parsing failed"));
}

// =============================================================================
// OBJ
// =============================================================================

#[test]
fn obj_polygons_fan_triangulate() {
    let input = b"# hexagon\n\
        o hex\n\
        v 1 0 0\nv 0.5 0.87 0\nv -0.5 0.87 0\n\
        v -1 0 0\nv -0.5 -0.87 0\nv 0.5 -0.87 0\n\
        usemtl none\n\
        f -6 -5 -4 -3 -2 -1\n";

    let model = read_obj(input).unwrap();
    assert_eq!(model.face_count(), 4);
    assert!(model.normals().is_none());
}

#[test]
fn obj_without_faces_is_rejected() {
    let err = read_obj(b"v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap_err();
    assert!(err.to_string().contains("OBJ parsing failed"));
}

// =============================================================================
// 3DS
// =============================================================================

fn chunk(id: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_le_bytes().to_vec();
    out.extend_from_slice(&((payload.len() + 6) as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn triangle_object(name: &str, offset: f32) -> Vec<u8> {
    let mut vertices = 3u16.to_le_bytes().to_vec();
    for p in [[0.0, 0.0, offset], [1.0, 0.0, offset], [0.0, 1.0, offset]] {
        for v in p {
            vertices.extend_from_slice(&f32::to_le_bytes(v));
        }
    }
    let mut faces = 1u16.to_le_bytes().to_vec();
    for i in [0u16, 1, 2, 0] {
        faces.extend_from_slice(&i.to_le_bytes());
    }

    let trimesh = chunk(
        0x4100,
        &[chunk(0x4110, &vertices), chunk(0x4120, &faces)].concat(),
    );
    let mut object = name.as_bytes().to_vec();
    object.push(0);
    object.extend_from_slice(&trimesh);
    chunk(0x4000, &object)
}

#[test]
fn three_ds_objects_merge() {
    let edit = chunk(
        0x3D3D,
        &[triangle_object("a", 0.0), triangle_object("b", 2.0)].concat(),
    );
    let bytes = chunk(0x4D4D, &edit);

    let model = read_3ds(&bytes).unwrap();
    assert_eq!(model.face_count(), 2);
    assert_relative_eq!(model.bounds().max.z, 2.0);
}

// =============================================================================
// Cross-format
// =============================================================================

#[test]
fn face_count_survives_every_writable_format_pair() {
    let registry = CodecRegistry::default();
    let source = unit_cube();

    for from in [MeshFormat::Stl, MeshFormat::Obj] {
        let encoded = registry.write(from, &source).unwrap();
        let decoded = registry.read(from, &encoded).unwrap();
        for to in [MeshFormat::Stl, MeshFormat::Obj] {
            let again = registry
                .read(to, &registry.write(to, &decoded).unwrap())
                .unwrap();
            assert_eq!(again.face_count(), 12, "{from} -> {to}");
        }
    }
}

#[test]
fn load_fixture_files() {
    let files = fixture_files();
    if files.is_empty() {
        eprintln!("Note: no fixtures in {:?}", fixtures_dir());
        return;
    }

    let temp_dir = tempdir().expect("failed to create temp dir");
    for file in &files {
        let mesh = load_mesh(file)
            .unwrap_or_else(|e| panic!("failed to load {}: {e}", file.display()));
        assert!(mesh.face_count() > 0, "{} has no faces", file.display());

        let out_path = temp_dir.path().join("converted.obj");
        save_mesh(&mesh, &out_path).expect("failed to save as OBJ");
        let converted = load_mesh(&out_path).expect("failed to reload OBJ");
        assert_eq!(converted.face_count(), mesh.face_count(), "{}", file.display());
    }
}
