mod commands;
mod util;

use clap::{Parser, Subcommand, ValueEnum};
use solink_error::SolinkError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "solink",
    about = "Smart-object dependency tracing for composite image documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress explanatory output
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Flat list of smart objects
    Flat,
    /// Hierarchical tree structure
    Tree,
    /// JSON output
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the smart objects of a document
    Analyze {
        /// Document manifest describing the host's library
        manifest: PathBuf,

        /// Entry document path; defaults to the manifest's first document
        #[arg(short, long)]
        entry: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,

        #[arg(
            long,
            help = "Use ASCII characters instead of Unicode box characters for tree output"
        )]
        ascii: bool,

        /// Maximum smart-object nesting depth to descend into
        #[arg(long)]
        max_depth: Option<usize>,

        /// Shared directory of a running delegate; when set, the delegate is
        /// preferred and local traversal is the fallback
        #[arg(long)]
        bridge_dir: Option<PathBuf>,

        /// Delegate poll attempts before giving up
        #[arg(long, default_value_t = 50)]
        attempts: u32,

        /// Delay between delegate polls, in milliseconds
        #[arg(long, default_value_t = 200)]
        delay_ms: u64,

        /// Name filter rules (+include / -exclude, regex), evaluated in order
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Run the delegate worker loop over a manifest
    Serve {
        /// Document manifest backing the worker's analyses
        manifest: PathBuf,

        /// Shared directory to watch for request artifacts
        #[arg(long)]
        bridge_dir: PathBuf,

        /// Poll interval, in milliseconds
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,

        /// Answer a single request and exit
        #[arg(long)]
        once: bool,

        /// Maximum smart-object nesting depth to descend into
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Summarize the documents described by a manifest
    Info { manifest: PathBuf },
}

fn main() -> Result<(), SolinkError> {
    env_logger::init();
    let cli = Cli::parse();
    let output = util::OutputHandler::new(cli.quiet);

    match cli.command {
        Commands::Analyze {
            manifest,
            entry,
            format,
            ascii,
            max_depth,
            bridge_dir,
            attempts,
            delay_ms,
            filters,
        } => commands::cmd_analyze(
            manifest,
            entry,
            format,
            ascii,
            max_depth,
            bridge_dir,
            attempts,
            delay_ms,
            filters,
            cli.quiet,
            &output,
        ),
        Commands::Serve {
            manifest,
            bridge_dir,
            interval_ms,
            once,
            max_depth,
        } => commands::cmd_serve(manifest, bridge_dir, interval_ms, once, max_depth, &output),
        Commands::Info { manifest } => commands::cmd_info(manifest, &output),
    }?;
    Ok(())
}
