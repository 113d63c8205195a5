//! Format registry mapping each [`MeshFormat`] to its reader and writer.

use std::collections::HashMap;
use std::io::Write;

use mesh_types::GeometryModel;

use crate::error::{IoError, IoResult, Operation};
use crate::{MeshFormat, obj, stl, three_ds};

/// Decoder from an in-memory buffer.
pub type ReadFn = fn(&[u8]) -> IoResult<GeometryModel>;

/// Encoder into any writer.
pub type WriteFn = fn(&GeometryModel, &mut dyn Write) -> IoResult<()>;

/// Read/write capability pair for one format.
///
/// A missing half means the format is recognised but not supported in
/// that direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatCodec {
    /// Decoder, if the format can be read.
    pub read: Option<ReadFn>,
    /// Encoder, if the format can be written.
    pub write: Option<WriteFn>,
}

impl FormatCodec {
    /// A codec that can read and write.
    #[must_use]
    pub const fn new(read: ReadFn, write: WriteFn) -> Self {
        Self {
            read: Some(read),
            write: Some(write),
        }
    }

    /// A codec with neither capability.
    #[must_use]
    pub const fn unsupported() -> Self {
        Self {
            read: None,
            write: None,
        }
    }
}

fn write_stl_ascii(model: &GeometryModel, out: &mut dyn Write) -> IoResult<()> {
    stl::write_stl(model, out)
}

fn write_obj(model: &GeometryModel, out: &mut dyn Write) -> IoResult<()> {
    obj::write_obj(model, out)
}

fn write_3ds(model: &GeometryModel, out: &mut dyn Write) -> IoResult<()> {
    three_ds::write_3ds(model, out)
}

/// Registry of format codecs.
///
/// The default registry knows every [`MeshFormat`] and carries codecs for
/// STL, OBJ and 3DS. STEP, DAE, FBX, PLY, WRL and X3D are registered with
/// no capabilities and report [`IoError::NotImplemented`].
///
/// # Example
///
/// ```
/// use mesh_io::{CodecRegistry, MeshFormat};
///
/// let registry = CodecRegistry::default();
/// let model = registry
///     .read(MeshFormat::Obj, b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
///     .unwrap();
/// let bytes = registry.write(MeshFormat::Stl, &model).unwrap();
///
/// assert!(bytes.starts_with(b"solid"));
/// assert!(registry.write(MeshFormat::Ply, &model).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<MeshFormat, FormatCodec>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for format in MeshFormat::ALL {
            registry.register(format, FormatCodec::unsupported());
        }
        registry.register(
            MeshFormat::Stl,
            FormatCodec::new(stl::read_stl, write_stl_ascii),
        );
        registry.register(MeshFormat::Obj, FormatCodec::new(obj::read_obj, write_obj));
        registry.register(
            MeshFormat::ThreeDs,
            FormatCodec::new(three_ds::read_3ds, write_3ds),
        );
        registry
    }
}

impl CodecRegistry {
    /// Create a registry with no formats.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Register or replace the codec for `format`.
    ///
    /// Returns the previously registered codec, if any.
    pub fn register(&mut self, format: MeshFormat, codec: FormatCodec) -> Option<FormatCodec> {
        self.codecs.insert(format, codec)
    }

    /// Codec for `format`; unregistered formats have no capabilities.
    #[must_use]
    pub fn codec(&self, format: MeshFormat) -> FormatCodec {
        self.codecs.get(&format).copied().unwrap_or_default()
    }

    /// Whether `format` has a reader.
    #[must_use]
    pub fn can_read(&self, format: MeshFormat) -> bool {
        self.codec(format).read.is_some()
    }

    /// Whether `format` has a writer.
    #[must_use]
    pub fn can_write(&self, format: MeshFormat) -> bool {
        self.codec(format).write.is_some()
    }

    /// Decode `bytes` as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotImplemented`] if the format has no reader, or
    /// the reader's own error.
    pub fn read(&self, format: MeshFormat, bytes: &[u8]) -> IoResult<GeometryModel> {
        let read = self
            .codec(format)
            .read
            .ok_or(IoError::not_implemented(format, Operation::Read))?;
        read(bytes)
    }

    /// Encode `model` as `format` into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotImplemented`] if the format has no writer, or
    /// the writer's own error.
    pub fn write(&self, format: MeshFormat, model: &GeometryModel) -> IoResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(format, model, &mut out)?;
        Ok(out)
    }

    /// Encode `model` as `format` into `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotImplemented`] if the format has no writer, or
    /// the writer's own error.
    pub fn write_to(
        &self,
        format: MeshFormat,
        model: &GeometryModel,
        writer: &mut dyn Write,
    ) -> IoResult<()> {
        let write = self
            .codec(format)
            .write
            .ok_or(IoError::not_implemented(format, Operation::Write))?;
        write(model, writer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, unit_cube};

    #[test]
    fn default_capabilities() {
        let registry = CodecRegistry::default();
        for format in [MeshFormat::Stl, MeshFormat::Obj, MeshFormat::ThreeDs] {
            assert!(registry.can_read(format), "{format}");
            assert!(registry.can_write(format), "{format}");
        }
        for format in [
            MeshFormat::Step,
            MeshFormat::Stp,
            MeshFormat::Dae,
            MeshFormat::Fbx,
            MeshFormat::Ply,
            MeshFormat::Wrl,
            MeshFormat::X3d,
        ] {
            assert!(!registry.can_read(format), "{format}");
            assert!(!registry.can_write(format), "{format}");
        }
    }

    #[test]
    fn stub_writers_report_not_implemented() {
        let registry = CodecRegistry::default();
        let err = registry.write(MeshFormat::Dae, &unit_cube()).unwrap_err();
        assert!(matches!(
            err,
            IoError::NotImplemented {
                format: MeshFormat::Dae,
                operation: Operation::Write
            }
        ));
    }

    #[test]
    fn stub_readers_report_not_implemented() {
        let registry = CodecRegistry::default();
        let err = registry.read(MeshFormat::Fbx, b"Kaydara FBX Binary").unwrap_err();
        assert_eq!(err.to_string(), "FBX reader is not implemented");
    }

    #[test]
    fn register_replaces_codec() {
        fn empty_reader(_: &[u8]) -> IoResult<GeometryModel> {
            Ok(GeometryModel::new())
        }

        let mut registry = CodecRegistry::default();
        let previous = registry.register(
            MeshFormat::Ply,
            FormatCodec {
                read: Some(empty_reader),
                write: None,
            },
        );

        assert!(previous.is_some_and(|c| c.read.is_none()));
        assert!(registry.can_read(MeshFormat::Ply));
        assert!(!registry.can_write(MeshFormat::Ply));
        assert!(registry.read(MeshFormat::Ply, b"").unwrap().is_empty());
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let registry = CodecRegistry::empty();
        assert!(!registry.can_read(MeshFormat::Stl));
    }

    #[test]
    fn cross_format_dispatch() {
        let registry = CodecRegistry::default();
        let obj = registry.write(MeshFormat::Obj, &unit_cube()).unwrap();
        let model = registry.read(MeshFormat::Obj, &obj).unwrap();
        let stl = registry.write(MeshFormat::Stl, &model).unwrap();

        assert_eq!(registry.read(MeshFormat::Stl, &stl).unwrap().face_count(), 12);
    }
}
