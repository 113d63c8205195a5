//! Mesh and CAD file conversion.
//!
//! A [`Converter`] takes a [`ConversionRequest`] (source path, destination
//! path, optional scale and rotation), checks the format pair against the
//! conversion matrix, and routes it:
//!
//! - **Same format**: the source is copied byte for byte
//! - **Mesh to mesh**: decoded with [`mesh_io`], transformed with
//!   [`mesh_transform`], measured with [`mesh_measure`], and encoded
//! - **CAD to CAD or vector**: delegated to a [`CadExporter`], by default
//!   an external office-suite or vector-drawing program
//!
//! Formats are always taken from file extensions.
//!
//! # Example
//!
//! ```no_run
//! use mesh_convert::{ConversionRequest, Converter};
//! use mesh_transform::{Axes, TransformOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> mesh_convert::ConvertResult<()> {
//! let converter = Converter::default();
//! let request = ConversionRequest::new("bracket.stl", "bracket.obj")
//!     .with_options(TransformOptions::none().with_scale(Axes::splat(25.4)));
//!
//! let outcome = converter.convert(&request).await?;
//! if let Some(meta) = outcome.metadata {
//!     println!("{} faces", meta.face_count);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod config;
mod converter;
mod error;
mod exporter;
mod format;
mod matrix;

pub use config::ConvertConfig;
pub use converter::{ConversionOutcome, ConversionRequest, ConversionStage, Converter};
pub use error::{ConvertError, ConvertResult};
pub use exporter::{CadExporter, ProcessExporter};
pub use format::{FileFormat, MIME_TYPES};
pub use matrix::{
    ConversionKind, SUPPORTED_INPUT_FORMATS, SUPPORTED_OUTPUT_FORMATS, available_output_formats,
    is_supported, plan,
};
