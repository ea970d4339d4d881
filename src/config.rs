use std::path::PathBuf;

use clap::Parser;

/// Summary output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Fully resolved inspection configuration (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct InspectConfig {
    pub input: PathBuf,
    pub format: OutputFormat,
    /// Attributes to flag as temporary on every face group.
    pub temporary_attributes: Vec<String>,
    /// Restrict the mesh to its common schema before reporting.
    pub uniform: bool,
    pub verbose: bool,
    pub log_json: bool,
    pub threads: Option<usize>,
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "mesh-inspect",
    about = "Load a mesh and report its vertex schema, homogeneity and bounds",
    version
)]
pub struct CliArgs {
    /// Input file (OBJ, PLY)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Flag an attribute as temporary (repeatable)
    #[arg(short = 't', long = "temporary", value_name = "NAME")]
    pub temporary: Vec<String>,

    /// Restrict every face group to the common schema
    #[arg(long)]
    pub uniform: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for InspectConfig {
    fn from(args: CliArgs) -> Self {
        InspectConfig {
            input: args.input,
            format: args.format,
            temporary_attributes: args.temporary,
            uniform: args.uniform,
            verbose: args.verbose,
            log_json: args.log_json,
            threads: args.threads,
        }
    }
}
