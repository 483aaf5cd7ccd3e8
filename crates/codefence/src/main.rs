//! codefence CLI - back-tick code block renderer.
//!
//! Provides commands for:
//! - `render`: Render fenced code blocks in documents
//! - `highlight`: Render a single code body

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{HighlightArgs, RenderArgs};
use output::Output;

/// codefence - Back-tick code block renderer.
#[derive(Parser)]
#[command(name = "codefence", version, about)]
struct Cli {
    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every fenced code block in one or more documents.
    Render(RenderArgs),
    /// Render one code body read from a file or stdin.
    Highlight(HighlightArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Highlight(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
