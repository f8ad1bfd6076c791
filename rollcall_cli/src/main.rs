mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rollcall_lib::{load_config, EngineConfig};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Reconcile meeting attendance against a member roster")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Engine config file (TOML); falls back to ROLLCALL_CONFIG
    #[arg(long, global = true, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidated attendance per participant
    Durations(commands::durations::DurationsArgs),
    /// Suggest roster members for unassigned records
    Suggest(commands::suggest::SuggestArgs),
    /// Show how each matching phase treats one identifier
    Explain(commands::explain::ExplainArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rollcall=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_name(&cli.output);

    let config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    match &cli.command {
        Commands::Durations(args) => commands::durations::run(args, &config, &format)?,
        Commands::Suggest(args) => commands::suggest::run(args, &config, &format)?,
        Commands::Explain(args) => commands::explain::run(args, &config, &format)?,
    }

    Ok(())
}
