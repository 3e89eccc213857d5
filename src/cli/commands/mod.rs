//! CLI parser and dispatch to command modules.

mod annotate;
mod config_cmd;
mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "midas")]
#[command(about = "Annotation services for sentence splitting, tagging and parsing")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the annotation server
    Serve {
        /// Address to bind: port, host, or host:port (default from config)
        bind: Option<String>,
    },

    /// Predict sentence boundaries for one sentence of a CoNLL-U document
    Split {
        /// CoNLL-U file holding the whole document
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Score XPOS tags for the first sentence of a CoNLL-U file
    Tag {
        file: PathBuf,
    },

    /// Dependency-parse the first sentence of a CoNLL-U file
    Parse {
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Zero-based sentence position
    #[arg(short, long)]
    index: Option<usize>,

    /// Sentence `sent_id`
    #[arg(short, long)]
    sent_id: Option<String>,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Split { file, target } => {
            annotate::cmd_split(&settings, &file, target.index, target.sent_id).await
        }
        Commands::Tag { file } => annotate::cmd_tag(&settings, &file).await,
        Commands::Parse { file } => annotate::cmd_parse(&settings, &file).await,
        Commands::Config => config_cmd::cmd_config_show(&settings),
    }
}
