mod boot;
mod describe;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "toolscope", about = "Tool capability resolution CLI")]
struct Cli {
    /// Config file (defaults to ~/.toolscope/config.json5)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace containing .toolscope/modes.json5 (defaults to the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tools presented to the model for a mode
    Resolve {
        /// Mode slug (defaults to the configured default mode)
        #[arg(short, long)]
        mode: Option<String>,

        /// JSON file with excludedTools / includedTools
        #[arg(long)]
        model: Option<PathBuf>,

        /// JSON file with candidate tool definitions
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether a single tool is allowed
    Check {
        /// Tool name or alias
        tool: String,

        /// Mode slug (defaults to the configured default mode)
        #[arg(short, long)]
        mode: Option<String>,

        /// JSON file with excludedTools / includedTools
        #[arg(long)]
        model: Option<PathBuf>,

        /// File path the tool would act on
        #[arg(long)]
        path: Option<String>,
    },
    /// List built-in and custom modes
    Modes,
    /// Show the tools each group contributes to a mode
    Describe {
        /// Mode slug (defaults to the configured default mode)
        #[arg(short, long)]
        mode: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = boot::Session::load(cli.config.as_deref(), cli.workspace.as_deref())?;

    match cli.command {
        Commands::Resolve {
            mode,
            model,
            candidates,
            json,
        } => {
            resolve::run_resolve(&session, mode, model, candidates, json)?;
        }
        Commands::Check {
            tool,
            mode,
            model,
            path,
        } => {
            if !resolve::run_check(&session, tool, mode, model, path)? {
                std::process::exit(1);
            }
        }
        Commands::Modes => describe::run_modes(&session)?,
        Commands::Describe { mode } => describe::run_describe(&session, mode)?,
    }

    Ok(())
}
