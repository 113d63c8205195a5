//! Mesh file I/O over flat triangle geometry.
//!
//! This crate decodes and encodes [`GeometryModel`] values:
//!
//! - **STL** (Stereolithography) - Binary and ASCII read, ASCII write
//!   (binary write through [`write_stl_binary`])
//! - **OBJ** (Wavefront) - ASCII, with normals and texture coordinates
//! - **3DS** (3D Studio) - Chunked binary; the writer emits positions only
//!
//! STEP, DAE, FBX, PLY, WRL and X3D are recognised as [`MeshFormat`] tags
//! but have no codec; requesting them yields [`IoError::NotImplemented`].
//!
//! Readers take a byte slice and writers take any [`std::io::Write`], so
//! the same code serves files, sockets and in-memory buffers.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_stl, save_stl};
//!
//! // Load a mesh
//! let mesh = load_stl("model.stl").unwrap();
//!
//! // Save it back as ASCII
//! save_stl(&mesh, "output.stl", false).unwrap();
//! ```
//!
//! # Format Detection
//!
//! The crate can automatically detect file format from extension:
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! // Format detected from .stl extension
//! let mesh = load_mesh("model.stl").unwrap();
//!
//! // Save to a different format
//! save_mesh(&mesh, "model.obj").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod format;
mod obj;
mod registry;
mod stl;
mod three_ds;

pub use error::{IoError, IoResult, Operation};
pub use format::MeshFormat;
pub use obj::{load_obj, read_obj, save_obj, write_obj};
pub use registry::{CodecRegistry, FormatCodec, ReadFn, WriteFn};
pub use stl::{
    facet_normal, load_stl, read_stl, read_stl_ascii, read_stl_binary, save_stl, write_stl,
    write_stl_binary,
};
pub use three_ds::{load_3ds, read_3ds, save_3ds, write_3ds};

use std::io::{self, BufWriter, Write};
use std::path::Path;

use mesh_types::GeometryModel;
use tracing::debug;

/// Read a whole file, reporting a missing path as [`IoError::FileNotFound`].
pub(crate) fn read_file(path: &Path) -> IoResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IoError::Io(e),
    })
}

fn format_of(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file, detecting format from extension.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The format has no reader
/// - The file cannot be read
/// - The file content is invalid for the detected format
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_mesh;
///
/// let mesh = load_mesh("model.stl").unwrap();
/// ```
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<GeometryModel> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let registry = CodecRegistry::default();
    if !registry.can_read(format) {
        return Err(IoError::not_implemented(format, Operation::Read));
    }

    let bytes = read_file(path)?;
    debug!(path = %path.display(), %format, bytes = bytes.len(), "Decoding mesh");
    registry.read(format, &bytes)
}

/// Save a mesh to a file, detecting format from extension.
///
/// STL is written as ASCII; use [`save_stl`] for binary output.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The format has no writer
/// - The file cannot be written
///
/// No file is created when the format has no writer.
///
/// # Example
///
/// ```no_run
/// use mesh_io::{save_mesh, load_mesh};
///
/// let mesh = load_mesh("input.stl").unwrap();
/// save_mesh(&mesh, "output.obj").unwrap();
/// ```
pub fn save_mesh<P: AsRef<Path>>(model: &GeometryModel, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let registry = CodecRegistry::default();
    if !registry.can_write(format) {
        return Err(IoError::not_implemented(format, Operation::Write));
    }

    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    registry.write_to(format, model, &mut writer)?;
    writer.flush()?;
    debug!(path = %path.display(), %format, "Encoded mesh");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, unit_cube};
    use tempfile::tempdir;

    #[test]
    fn save_and_load_by_extension() {
        let dir = tempdir().unwrap();
        for ext in ["stl", "obj"] {
            let path = dir.path().join(format!("cube.{ext}"));
            save_mesh(&unit_cube(), &path).unwrap();
            let model = load_mesh(&path).unwrap();
            assert_eq!(model.face_count(), 12, "{ext}");
        }
    }

    #[test]
    fn save_mesh_writes_ascii_stl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        save_mesh(&unit_cube(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"solid mesh"));
    }

    #[test]
    fn unknown_extension() {
        let err = load_mesh("model.xyz").unwrap_err();
        assert!(matches!(err, IoError::UnknownFormat { extension } if extension == "xyz"));

        let err = save_mesh(&unit_cube(), "model").unwrap_err();
        assert!(matches!(err, IoError::UnknownFormat { extension } if extension == "(none)"));
    }

    #[test]
    fn missing_file() {
        let dir = tempdir().unwrap();
        let err = load_mesh(dir.path().join("absent.obj")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn stub_format_creates_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cube.fbx");
        let err = save_mesh(&unit_cube(), &path).unwrap_err();
        assert!(matches!(err, IoError::NotImplemented { .. }));
        assert!(!path.exists());
    }
}
