//! External CAD and vector exporter seam.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::FileFormat;
use crate::config::ConvertConfig;
use crate::error::{ConvertError, ConvertResult};

/// Converts between CAD and vector formats by delegating to another program.
pub trait CadExporter: Send + Sync {
    /// Convert `input` into `target`, writing the result to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ExternalTool`] if the exporter is missing or
    /// reports failure.
    fn export(
        &self,
        input: &Path,
        output: &Path,
        target: FileFormat,
    ) -> impl Future<Output = ConvertResult<()>> + Send;

    /// Name reported in errors about `target` exports.
    fn program(&self, target: FileFormat) -> &str {
        let _ = target;
        "exporter"
    }
}

/// Exporter that spawns the configured office-suite or vector program.
#[derive(Debug, Clone)]
pub struct ProcessExporter {
    office_program: String,
    vector_program: String,
}

impl ProcessExporter {
    /// Use the programs named in `config`.
    #[must_use]
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            office_program: config.office_program.clone(),
            vector_program: config.vector_program.clone(),
        }
    }

    /// Program that would handle `target`.
    #[must_use]
    pub fn program_for(&self, target: FileFormat) -> &str {
        match target {
            FileFormat::Svg => &self.vector_program,
            _ => &self.office_program,
        }
    }

    fn command_for(&self, input: &Path, output: &Path, target: FileFormat) -> Command {
        let mut command = Command::new(self.program_for(target));
        if target == FileFormat::Svg {
            command
                .arg(input)
                .arg(format!("--export-filename={}", output.display()));
        } else {
            command
                .arg("--headless")
                .arg("--convert-to")
                .arg(target.extension())
                .arg("--outdir")
                .arg(office_outdir(output))
                .arg(input);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for ProcessExporter {
    fn default() -> Self {
        Self::new(&ConvertConfig::default())
    }
}

/// Directory the office converter writes into.
fn office_outdir(output: &Path) -> &Path {
    output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

impl CadExporter for ProcessExporter {
    fn program(&self, target: FileFormat) -> &str {
        self.program_for(target)
    }

    async fn export(&self, input: &Path, output: &Path, target: FileFormat) -> ConvertResult<()> {
        let program = self.program_for(target).to_string();
        let external = |message: String| ConvertError::ExternalTool {
            program: program.clone(),
            message,
        };

        debug!(%program, input = %input.display(), %target, "Spawning exporter");
        let result = self
            .command_for(input, output, target)
            .output()
            .await
            .map_err(|e| external(format!("failed to start: {e}")))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            warn!(%program, status = %result.status, "Exporter failed");
            return Err(external(format!(
                "exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        if target == FileFormat::Svg {
            return Ok(());
        }

        // The office converter names its output after the input stem
        let stem = input
            .file_stem()
            .ok_or_else(|| external(format!("input {} has no file name", input.display())))?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(target.extension());
        let produced = office_outdir(output).join(name);
        if produced != output {
            tokio::fs::rename(&produced, output).await.map_err(|e| {
                external(format!(
                    "expected output {} was not produced: {e}",
                    produced.display()
                ))
            })?;
        }

        Ok(())
    }
}
