//! boostedhbb CLI

mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hbb_analysis::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "boostedhbb")]
#[command(about = "Boosted H->bb per-event analysis")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a JSON-lines event file and write the histogram bank
    Run {
        /// Input events, one JSON record per line
        #[arg(short, long)]
        events: PathBuf,

        /// Analysis configuration (YAML or JSON). Defaults to the built-in setup.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cross-section the histograms are normalised to
        #[arg(long, allow_negative_numbers = true)]
        cross_section: f64,

        /// Threads (0 = auto). 1 streams events without buffering them.
        #[arg(long, default_value = "1")]
        threads: usize,

        /// Events per worker chunk when running on more than one thread
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Keep raw weighted sums so the output can be merged later
        #[arg(long)]
        no_normalize: bool,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge unnormalised partial outputs and normalise once
    Merge {
        /// Partial outputs written by `run --no-normalize`
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Keep the merged output unnormalised
        #[arg(long)]
        no_normalize: bool,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default analysis configuration as YAML
    ConfigTemplate {
        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            events,
            config,
            cross_section,
            threads,
            chunk_size,
            no_normalize,
            output,
        } => run::cmd_run(
            &events,
            config.as_ref(),
            cross_section,
            threads,
            chunk_size,
            no_normalize,
            output.as_ref(),
        ),
        Commands::Merge { inputs, no_normalize, output } => {
            run::cmd_merge(&inputs, no_normalize, output.as_ref())
        }
        Commands::ConfigTemplate { output } => run::cmd_config_template(output.as_ref()),
    }
}
