//! End-to-end conversions through the public API.
//!
//! To run: cargo test -p mesh-convert --test end_to_end

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_convert::{
    ConversionKind, ConversionRequest, ConversionStage, ConvertConfig, ConvertError, Converter,
    FileFormat, available_output_formats,
};
use mesh_io::{MeshFormat, write_stl_binary};
use mesh_transform::{Axes, TransformOptions};
use mesh_types::unit_cube;
use std::path::Path;
use tempfile::tempdir;

const TWO_FACETS: &str = "solid two
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
endsolid two
";

fn converter(dir: &Path) -> Converter {
    Converter::new(
        ConvertConfig::default()
            .with_output_dir(dir.join("out"))
            .with_office_program("mesh-convert-test-missing-office")
            .with_vector_program("mesh-convert-test-missing-vector"),
    )
}

#[tokio::test]
async fn ascii_stl_to_obj() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("two.stl");
    let output = dir.path().join("two.obj");
    std::fs::write(&input, TWO_FACETS).unwrap();

    let outcome = converter(dir.path())
        .convert(&ConversionRequest::new(&input, &output))
        .await
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 2);

    assert_eq!(
        outcome.kind,
        ConversionKind::Mesh {
            from: MeshFormat::Stl,
            to: MeshFormat::Obj
        }
    );
    assert_eq!(outcome.bytes_written, text.len() as u64);
    let meta = outcome.metadata.unwrap();
    assert_eq!(meta.vertex_count, 6);
    assert_eq!(meta.face_count, 2);
}

#[tokio::test]
async fn truncated_binary_stl_fails_to_parse() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cube.stl");
    let output = dir.path().join("cube.obj");

    let mut bytes = Vec::new();
    write_stl_binary(&unit_cube(), &mut bytes).unwrap();
    bytes.truncate(84 + 50 * 5 + 20);
    std::fs::write(&input, &bytes).unwrap();

    let err = converter(dir.path())
        .convert(&ConversionRequest::new(&input, &output))
        .await
        .unwrap_err();

    assert!(err.is_parse(), "{err:?}");
    assert!(err.to_string().contains("STL parsing failed"), "{err}");
    assert!(!output.exists());
}

#[tokio::test]
async fn same_format_is_byte_identical_copy() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.stl");
    let output = dir.path().join("out.stl");
    // Not valid STL; the copy path never parses
    std::fs::write(&input, b"\x00\x01not really stl").unwrap();

    let outcome = converter(dir.path())
        .convert(
            &ConversionRequest::new(&input, &output)
                .with_options(TransformOptions::none().with_scale(Axes::splat(3.0))),
        )
        .await
        .unwrap();

    assert_eq!(outcome.kind, ConversionKind::Copy);
    assert_eq!(outcome.stages, [ConversionStage::Validated, ConversionStage::Done]);
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[tokio::test]
async fn dxf_to_dwg_without_exporter() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("plan.dxf");
    std::fs::write(&input, "0\nSECTION\n2\nENTITIES\n0\nENDSEC\n0\nEOF\n").unwrap();

    let err = converter(dir.path())
        .convert(&ConversionRequest::new(&input, dir.path().join("plan.dwg")))
        .await
        .unwrap_err();

    assert!(err.is_external_tool(), "{err:?}");
    assert!(matches!(
        err,
        ConvertError::ExternalTool { ref program, .. } if program == "mesh-convert-test-missing-office"
    ));
}

#[tokio::test]
async fn scaled_conversion_into_dir() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cube.obj");
    mesh_io::save_obj(&unit_cube(), &input).unwrap();

    let converter = converter(dir.path());
    let outcome = converter
        .convert_into_dir(
            &input,
            FileFormat::Stl,
            TransformOptions::none().with_scale(Axes::new(2.0, 1.0, 1.0)),
        )
        .await
        .unwrap();

    assert_eq!(outcome.output.parent(), Some(dir.path().join("out").as_path()));
    assert!(outcome.stages.contains(&ConversionStage::Transformed));

    let bbox = outcome.metadata.unwrap().bounding_box.unwrap();
    assert_eq!(bbox.max, [2.0, 1.0, 1.0]);

    let reread = converter.inspect(&outcome.output).await.unwrap();
    assert_eq!(reread.face_count, 12);
    assert_eq!(reread.bounding_box.unwrap().max, [2.0, 1.0, 1.0]);
}

#[tokio::test]
async fn stub_writer_fails_without_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cube.obj");
    let output = dir.path().join("cube.fbx");
    mesh_io::save_obj(&unit_cube(), &input).unwrap();

    let err = converter(dir.path())
        .convert(&ConversionRequest::new(&input, &output))
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::NotImplemented(_)));
    assert_eq!(err.to_string(), "FBX writer is not implemented");
    assert!(!output.exists());
}

#[tokio::test]
async fn rejected_pairs() {
    let dir = tempdir().unwrap();
    let converter = converter(dir.path());

    let err = converter
        .convert(&ConversionRequest::new("a.stl", "a.dwg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));

    let err = converter
        .convert(&ConversionRequest::new("a.svg", "a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFormat { .. }));

    let err = converter
        .convert(&ConversionRequest::new("a.docx", "a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFormat { format } if format == "docx"));
}

#[tokio::test]
async fn non_finite_options_are_rejected_before_reading() {
    let dir = tempdir().unwrap();
    let err = converter(dir.path())
        .convert(
            &ConversionRequest::new(dir.path().join("absent.stl"), dir.path().join("a.obj"))
                .with_options(TransformOptions::none().with_rotation(Axes::new(f32::NAN, 0.0, 0.0))),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::Transform(_)));
}

#[test]
fn output_lists() {
    assert_eq!(
        available_output_formats(FileFormat::Dwg),
        [FileFormat::Dxf, FileFormat::Pdf, FileFormat::Svg]
    );
    let stl = available_output_formats(FileFormat::Stl);
    assert_eq!(stl.len(), 9);
    assert!(!stl.contains(&FileFormat::Stl));
}
