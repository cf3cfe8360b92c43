//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    bom::BomCommands, calc::CalcCommands, completions::CompletionsArgs, config::ConfigCommands,
    init::InitArgs, project::ProjectCommands, standards::StandardsCommands,
};

#[derive(Parser)]
#[command(name = "cabkit")]
#[command(author, version, about = "Cabinet geometry and bill-of-materials toolkit")]
#[command(long_about = "Sizes cabinet boxes, face frames, drawer boxes and stretchers from exterior dimensions, \
and keeps a priced bill of materials per project.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .cabkit/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new cabkit workspace
    Init(InitArgs),

    /// Cabinet, drawer and depth calculations
    #[command(subcommand)]
    Calc(CalcCommands),

    /// Project bill of materials
    #[command(subcommand)]
    Bom(BomCommands),

    /// Project tree files
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Construction standards templates
    #[command(subcommand)]
    Standards(StandardsCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for results, tsv for lists)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
