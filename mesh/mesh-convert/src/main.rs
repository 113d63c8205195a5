//! Command-line front end for mesh and CAD conversion.
//!
//! # Commands
//!
//! - `mesh-convert convert <INPUT> <OUTPUT>` - Convert by extension
//! - `mesh-convert convert <INPUT> --to <FORMAT>` - Convert into the output directory
//! - `mesh-convert formats [FORMAT]` - List inputs, or the targets of one format
//! - `mesh-convert info <INPUT>` - Print mesh metadata as JSON
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mesh_convert::{
    ConversionRequest, ConvertConfig, Converter, FileFormat, SUPPORTED_INPUT_FORMATS,
    available_output_formats,
};
use mesh_transform::{Axes, TransformOptions};
use tracing_subscriber::EnvFilter;

/// Mesh and CAD file conversion
#[derive(Parser)]
#[command(name = "mesh-convert")]
#[command(about = "Convert between mesh and CAD formats", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file; formats come from the extensions
    Convert {
        /// Source file
        #[arg(name = "INPUT")]
        input: PathBuf,

        /// Destination file
        #[arg(name = "OUTPUT", required_unless_present = "to")]
        output: Option<PathBuf>,

        /// Target format when OUTPUT is omitted (e.g. "obj")
        #[arg(long, conflicts_with = "OUTPUT")]
        to: Option<FileFormat>,

        /// Directory for generated output names
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Per-axis scale as x,y,z
        #[arg(long, allow_hyphen_values = true)]
        scale: Option<Axes>,

        /// Euler rotation in radians as x,y,z
        #[arg(long, allow_hyphen_values = true)]
        rotate: Option<Axes>,

        /// Office-suite converter for DWG, DXF and PDF targets
        #[arg(long)]
        office_program: Option<String>,

        /// Vector drawing program for SVG targets
        #[arg(long)]
        vector_program: Option<String>,
    },

    /// List supported inputs, or the targets available for one format
    Formats {
        /// Format to list targets for (e.g. "stl")
        #[arg(name = "FORMAT")]
        format: Option<FileFormat>,
    },

    /// Print vertex count, face count and bounding box as JSON
    Info {
        /// Mesh file to inspect
        #[arg(name = "INPUT")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            to,
            output_dir,
            scale,
            rotate,
            office_program,
            vector_program,
        } => {
            let mut config = ConvertConfig::default();
            if let Some(dir) = output_dir {
                config = config.with_output_dir(dir);
            }
            if let Some(program) = office_program {
                config = config.with_office_program(program);
            }
            if let Some(program) = vector_program {
                config = config.with_vector_program(program);
            }
            let options = TransformOptions { scale, rotate };
            let converter = Converter::new(config);

            let outcome = match (output, to) {
                (Some(output), _) => {
                    let request = ConversionRequest::new(&input, output).with_options(options);
                    converter.convert(&request).await
                }
                (None, Some(target)) => converter.convert_into_dir(&input, target, options).await,
                (None, None) => bail!("either OUTPUT or --to is required"),
            }
            .with_context(|| format!("converting {}", input.display()))?;

            println!("{}", outcome.output.display());
        }
        Commands::Formats { format: None } => {
            for format in SUPPORTED_INPUT_FORMATS {
                println!("{format}\t{}", format.mime_type());
            }
        }
        Commands::Formats {
            format: Some(format),
        } => {
            for target in available_output_formats(format) {
                println!("{target}\t{}", target.mime_type());
            }
        }
        Commands::Info { input } => {
            let metadata = Converter::default()
                .inspect(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    }

    Ok(())
}
