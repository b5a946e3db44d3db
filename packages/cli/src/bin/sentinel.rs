use clap::{Parser, Subcommand};
use colored::*;
use sentinel_config::constants::RUST_LOG;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::reviews::ReviewsCommands;
use cli::runs::RunsCommands;
use cli::tools::{SupervisorsCommands, ToolsCommands};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Sentinel CLI - inspect the AI action oversight database")]
#[command(version)]
struct Cli {
    /// Database file (overrides SENTINEL_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and apply pending migrations
    Migrate,
    /// Inspect review requests
    #[command(subcommand)]
    Reviews(ReviewsCommands),
    /// Inspect registered tools
    #[command(subcommand)]
    Tools(ToolsCommands),
    /// Inspect registered supervisors
    #[command(subcommand)]
    Supervisors(SupervisorsCommands),
    /// Inspect the runs of a project
    #[command(subcommand)]
    Runs(RunsCommands),
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    match handle_command(cli.database, cli.command).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(RUST_LOG).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn handle_command(
    database: Option<PathBuf>,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = cli::utils::open_database(database).await?;

    match command {
        Commands::Migrate => {
            println!("{}", "Database is up to date".green());
            Ok(())
        }
        Commands::Reviews(cmd) => cli::reviews::handle_reviews_command(&db, cmd).await,
        Commands::Tools(cmd) => cli::tools::handle_tools_command(&db, cmd).await,
        Commands::Supervisors(cmd) => cli::tools::handle_supervisors_command(&db, cmd).await,
        Commands::Runs(cmd) => cli::runs::handle_runs_command(&db, cmd).await,
    }
}
