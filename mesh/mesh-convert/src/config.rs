//! Converter configuration.

use std::path::{Path, PathBuf};

/// Settings shared by every request a converter handles.
///
/// # Example
///
/// ```
/// use mesh_convert::ConvertConfig;
///
/// let config = ConvertConfig::default()
///     .with_output_dir("/tmp/converted")
///     .with_office_program("libreoffice");
///
/// assert_eq!(config.office_program, "libreoffice");
/// assert_eq!(config.vector_program, "inkscape");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConvertConfig {
    /// Directory for outputs named by [`Converter::convert_into_dir`](crate::Converter::convert_into_dir).
    pub output_dir: PathBuf,

    /// Office-suite converter used for DWG, DXF and PDF targets.
    ///
    /// Invoked as `<program> --headless --convert-to <ext> --outdir <dir> <input>`.
    pub office_program: String,

    /// Vector drawing CLI used for SVG targets.
    ///
    /// Invoked as `<program> <input> --export-filename=<output>`.
    pub vector_program: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("mesh-convert"),
            office_program: "soffice".to_string(),
            vector_program: "inkscape".to_string(),
        }
    }
}

impl ConvertConfig {
    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the office-suite converter program.
    #[must_use]
    pub fn with_office_program(mut self, program: impl Into<String>) -> Self {
        self.office_program = program.into();
        self
    }

    /// Set the vector drawing program.
    #[must_use]
    pub fn with_vector_program(mut self, program: impl Into<String>) -> Self {
        self.vector_program = program.into();
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = ConvertConfig::default()
            .with_output_dir("out")
            .with_vector_program("/opt/inkscape/bin/inkscape");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.office_program, "soffice");
        assert_eq!(config.vector_program, "/opt/inkscape/bin/inkscape");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let config: ConvertConfig =
            serde_json::from_str(r#"{"office_program":"libreoffice"}"#).unwrap();
        assert_eq!(config.office_program, "libreoffice");
        assert_eq!(config.vector_program, "inkscape");
    }
}
