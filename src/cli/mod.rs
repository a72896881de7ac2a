//! CLI adapter for segref
//!
//! Inspects a tantivy index through the segment handle registry.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!                       v
//!              +------------------+
//!              |      cli/        |
//!              | (clap adapter)   |
//!              +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// segref - shared segment handle inspector
///
/// Opens a tantivy index, registers one ref-counted handle per segment
/// and queries the segments through those handles.
#[derive(Parser, Debug)]
#[command(name = "segref")]
#[command(author = "RHOBIMD HEALTH")]
#[command(version)]
#[command(about = "Ref-counted search index segment handles", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the segments of an index with their handle state
    #[command(name = "list-segments")]
    ListSegments(commands::ListSegmentsArgs),

    /// Count documents containing a term, across all segments
    #[command(name = "doc-freq")]
    DocFreq(commands::DocFreqArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  segref completions bash > ~/.local/share/bash-completion/completions/segref
    ///   zsh:   segref completions zsh > ~/.zfunc/_segref
    ///   fish:  segref completions fish > ~/.config/fish/completions/segref.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::logging::init_logging;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    let config = Config::load_with_xdg(&xdg)?;
    init_logging(&config.logging);
    xdg.log_paths();
    config.log_config();

    let services = Arc::new(Services::new(config));

    let result = match cli.command {
        Commands::ListSegments(args) => {
            commands::segments::execute(args, &services, cli.format).await
        }
        Commands::DocFreq(args) => commands::doc_freq::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    };

    let report = services.shutdown();
    if !report.still_borrowed.is_empty() {
        output::print_warning(&format!(
            "{} segment handle(s) still borrowed at exit",
            report.still_borrowed.len()
        ));
    }

    result
}
