use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slicepick")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Select a balanced subset of labeled medical-image NPZ archives")]
#[command(
    long_about = "SlicePick scans a directory of NPZ archives, classifies each one by the \
                  anatomical organs present in its label array, draws a balanced random \
                  selection across organs, and copies the chosen archives to an output \
                  directory together with a CSV manifest."
)]
#[command(after_help = "EXAMPLES:\n  \
    slicepick ./train_npz\n  \
    slicepick ./train_npz --output selected --samples 300\n  \
    slicepick ./train_npz --manifest selected.csv --seed 42\n  \
    slicepick ./train_npz --config my-config.toml --verbose")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Directory containing the NPZ archives to sample from
    pub input_dir: Option<PathBuf>,

    /// Output directory for the copied samples
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path of the CSV manifest to write
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Target number of samples to select
    #[arg(short = 'n', long)]
    pub samples: Option<usize>,

    /// Seed for the sampling RNG (default: entropy-seeded)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show the selection plan without touching the filesystem")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_data_dir(self.input_dir.clone())
            .with_output_dir(self.output.clone())
            .with_manifest_path(self.manifest.clone())
            .with_num_samples(self.samples)
            .with_seed(self.seed)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
