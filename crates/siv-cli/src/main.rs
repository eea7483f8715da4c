//! Siv command-line interface.
//!
//! Two operations: `check` validates declarations and resolves every call
//! site, `resolve` additionally explains each call site's overload set
//! (candidate verdicts, constraint outcomes, and the chosen signature).

use clap::{Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "siv")]
#[command(about = "Siv constrained-overload checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true, value_name = "WHEN")]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check declarations and resolve every call site
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        files: Vec<String>,
    },

    /// Explain overload resolution per call site
    Resolve {
        /// Input file
        file: String,
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let choice = output::resolve_color_choice(cli.color.as_deref());

    match cli.command {
        Commands::Check { files } => commands::check::execute(files, choice),
        Commands::Resolve { file, json } => commands::resolve::execute(file, json, choice),
    }
}
