//! Request orchestration: validate, route, and persist one conversion.

use std::fmt;
use std::path::{Path, PathBuf};

use mesh_io::CodecRegistry;
use mesh_measure::{GeometryMetadata, compute_metadata};
use mesh_transform::{GeometryTransform, TransformOptions};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, warn};

use crate::FileFormat;
use crate::config::ConvertConfig;
use crate::error::{ConvertError, ConvertResult};
use crate::exporter::{CadExporter, ProcessExporter};
use crate::matrix::{ConversionKind, plan};

/// Length of the random part of generated names.
const SUFFIX_LEN: usize = 8;

/// Progress of a single request.
///
/// A mesh request moves `Validated → Parsed → [Transformed] → Serialized →
/// Done`; copies and CAD exports go straight from `Validated` to `Done`.
/// Any error moves the request to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    /// Formats and options were accepted.
    Validated,
    /// Source bytes were decoded.
    Parsed,
    /// Scale or rotation was applied.
    Transformed,
    /// Target bytes were encoded.
    Serialized,
    /// Output was written.
    Done,
    /// The request ended with an error.
    Failed,
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validated => "validated",
            Self::Parsed => "parsed",
            Self::Transformed => "transformed",
            Self::Serialized => "serialized",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// One conversion from `input` to `output`.
///
/// Both formats are taken from the path extensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionRequest {
    /// Source file.
    pub input: PathBuf,
    /// Destination file; overwritten if present.
    pub output: PathBuf,
    /// Scale and rotation applied to mesh conversions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: TransformOptions,
}

impl ConversionRequest {
    /// Request with identity options.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            options: TransformOptions::default(),
        }
    }

    /// Set the transform options.
    #[must_use]
    pub const fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    /// Path that was written.
    pub output: PathBuf,
    /// Route the request took.
    pub kind: ConversionKind,
    /// Metadata of the converted geometry; only mesh conversions have it.
    pub metadata: Option<GeometryMetadata>,
    /// Size of the written file.
    pub bytes_written: u64,
    /// Stages passed through, in order.
    pub stages: Vec<ConversionStage>,
}

/// Stage history for one request, logged as it advances.
struct StageLog {
    request: String,
    stages: Vec<ConversionStage>,
}

impl StageLog {
    fn new(request: String) -> Self {
        Self {
            request,
            stages: Vec::with_capacity(5),
        }
    }

    fn enter(&mut self, stage: ConversionStage) {
        debug!(request = %self.request, %stage, "Conversion stage");
        self.stages.push(stage);
    }

    fn fail(&mut self, err: &ConvertError) {
        let stage = self.stages.last().copied();
        warn!(
            request = %self.request,
            stage = ?stage,
            error = %err,
            "Conversion failed"
        );
        self.stages.push(ConversionStage::Failed);
    }
}

/// Runs conversion requests.
///
/// Each request owns its geometry and its output file; a converter holds
/// only immutable configuration and can serve concurrent requests.
///
/// # Example
///
/// ```no_run
/// use mesh_convert::{ConversionRequest, Converter};
///
/// # async fn run() -> mesh_convert::ConvertResult<()> {
/// let converter = Converter::default();
/// let outcome = converter
///     .convert(&ConversionRequest::new("part.stl", "part.obj"))
///     .await?;
/// println!("wrote {} bytes", outcome.bytes_written);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter<E = ProcessExporter> {
    config: ConvertConfig,
    registry: CodecRegistry,
    exporter: E,
}

impl Converter<ProcessExporter> {
    /// Converter that spawns the programs named in `config`.
    #[must_use]
    pub fn new(config: ConvertConfig) -> Self {
        let exporter = ProcessExporter::new(&config);
        Self::with_exporter(config, exporter)
    }
}

impl Default for Converter<ProcessExporter> {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl<E: CadExporter> Converter<E> {
    /// Converter with a custom CAD exporter.
    #[must_use]
    pub fn with_exporter(config: ConvertConfig, exporter: E) -> Self {
        Self {
            config,
            registry: CodecRegistry::default(),
            exporter,
        }
    }

    /// Replace the mesh codec registry.
    #[must_use]
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Run one conversion.
    ///
    /// Same-format requests copy the source unchanged. Mesh pairs are
    /// decoded, transformed and encoded in memory, so a failed request never
    /// leaves a partial output behind. CAD pairs are handed to the exporter.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedFormat`] or
    /// [`ConvertError::UnsupportedConversion`] for pairs outside the matrix,
    /// [`ConvertError::Parse`] for malformed sources,
    /// [`ConvertError::NotImplemented`] for formats without a codec,
    /// [`ConvertError::Write`] if the output cannot be written, and
    /// [`ConvertError::ExternalTool`] if the CAD exporter fails.
    pub async fn convert(&self, request: &ConversionRequest) -> ConvertResult<ConversionOutcome> {
        let mut log = StageLog::new(unique_tag());
        match self.run(request, &mut log).await {
            Ok((kind, metadata, bytes_written)) => {
                info!(
                    request = %log.request,
                    input = %request.input.display(),
                    output = %request.output.display(),
                    bytes = bytes_written,
                    "Conversion complete"
                );
                Ok(ConversionOutcome {
                    output: request.output.clone(),
                    kind,
                    metadata,
                    bytes_written,
                    stages: log.stages,
                })
            }
            Err(err) => {
                log.fail(&err);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        request: &ConversionRequest,
        log: &mut StageLog,
    ) -> ConvertResult<(ConversionKind, Option<GeometryMetadata>, u64)> {
        let input = &request.input;
        let output = &request.output;
        let kind = plan(detect(input)?, detect(output)?)?;
        let transform = GeometryTransform::from_options(&request.options)?;
        log.enter(ConversionStage::Validated);

        match kind {
            ConversionKind::Copy => {
                ensure_readable(input).await?;
                let bytes = if same_file(input, output).await {
                    debug!(path = %input.display(), "Source and target are the same file");
                    tokio::fs::metadata(input)
                        .await
                        .map_err(|source| ConvertError::Read {
                            path: input.clone(),
                            source,
                        })?
                        .len()
                } else {
                    tokio::fs::copy(input, output)
                        .await
                        .map_err(|e| write_error(output, &e))?
                };
                log.enter(ConversionStage::Done);
                Ok((kind, None, bytes))
            }
            ConversionKind::Mesh { from, to } => {
                let bytes = tokio::fs::read(input)
                    .await
                    .map_err(|source| ConvertError::Read {
                        path: input.clone(),
                        source,
                    })?;
                let mut model = self
                    .registry
                    .read(from, &bytes)
                    .map_err(|e| ConvertError::from_read(e, input.clone()))?;
                log.enter(ConversionStage::Parsed);

                if !transform.is_identity() {
                    transform.apply(&mut model);
                    log.enter(ConversionStage::Transformed);
                }

                let metadata = compute_metadata(&model);
                let encoded = self
                    .registry
                    .write(to, &model)
                    .map_err(|e| ConvertError::from_write(e, output.clone()))?;
                log.enter(ConversionStage::Serialized);

                tokio::fs::write(output, &encoded)
                    .await
                    .map_err(|e| write_error(output, &e))?;
                log.enter(ConversionStage::Done);
                Ok((kind, Some(metadata), encoded.len() as u64))
            }
            ConversionKind::Cad { to, .. } => {
                ensure_readable(input).await?;
                if !transform.is_identity() {
                    warn!(input = %input.display(), "Transform options ignored for CAD export");
                }
                self.exporter.export(input, output, to).await?;
                let bytes = tokio::fs::metadata(output)
                    .await
                    .map_err(|e| ConvertError::ExternalTool {
                        program: self.exporter.program(to).to_string(),
                        message: format!("no output produced at {}: {e}", output.display()),
                    })?
                    .len();
                log.enter(ConversionStage::Done);
                Ok((kind, None, bytes))
            }
        }
    }

    /// Convert `input` to `target`, writing into the configured output
    /// directory under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Write`] if the output directory cannot be
    /// created, otherwise the errors of [`convert`](Self::convert).
    pub async fn convert_into_dir(
        &self,
        input: impl AsRef<Path>,
        target: FileFormat,
        options: TransformOptions,
    ) -> ConvertResult<ConversionOutcome> {
        let dir = &self.config.output_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| write_error(dir, &e))?;

        let input = input.as_ref();
        let request = ConversionRequest::new(input, self.unique_output_path(input, target))
            .with_options(options);
        self.convert(&request).await
    }

    /// Fresh output path `<stem>-<timestamp>-<random>.<ext>` in the output
    /// directory.
    #[must_use]
    pub fn unique_output_path(&self, input: &Path, target: FileFormat) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        self.config
            .output_dir
            .join(format!("{stem}-{}.{}", unique_tag(), target.extension()))
    }

    /// Decode a mesh file and report its metadata without converting it.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedFormat`] for non-mesh formats,
    /// [`ConvertError::Read`] if the file cannot be read, and
    /// [`ConvertError::Parse`] or [`ConvertError::NotImplemented`] from the
    /// reader.
    pub async fn inspect(&self, input: impl AsRef<Path>) -> ConvertResult<GeometryMetadata> {
        let input = input.as_ref();
        let format = detect(input)?;
        let mesh = format
            .as_mesh()
            .ok_or_else(|| ConvertError::UnsupportedFormat {
                format: format.to_string(),
            })?;

        let bytes = tokio::fs::read(input)
            .await
            .map_err(|source| ConvertError::Read {
                path: input.to_path_buf(),
                source,
            })?;
        let model = self
            .registry
            .read(mesh, &bytes)
            .map_err(|e| ConvertError::from_read(e, input.to_path_buf()))?;
        Ok(compute_metadata(&model))
    }
}

/// Format named by a path's extension.
fn detect(path: &Path) -> ConvertResult<FileFormat> {
    FileFormat::from_path(path).ok_or_else(|| ConvertError::UnsupportedFormat {
        format: path
            .extension()
            .map_or_else(|| "(none)".to_string(), |e| e.to_string_lossy().into_owned()),
    })
}

async fn ensure_readable(path: &Path) -> ConvertResult<()> {
    tokio::fs::metadata(path)
        .await
        .map(drop)
        .map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Whether both paths resolve to one existing file.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_error(path: &Path, err: &std::io::Error) -> ConvertError {
    ConvertError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// `<timestamp>-<random>`, unique across concurrent requests.
fn unique_tag() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{timestamp}-{suffix}")
}
