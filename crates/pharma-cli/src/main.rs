//! # pharma CLI entry point
//!
//! Parses command-line arguments, assembles the page from configuration,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pharma_cli::action::{run_action, ActionCommand};
use pharma_cli::context::{build_page, load_config, OutputOptions};
use pharma_cli::dashboard::{
    route_table, run_catalogue, run_dashboard, run_users, CatalogueArgs, DashboardArgs, UsersArgs,
};
use pharma_cli::EXIT_OK;

/// Pharma supply-chain front end.
///
/// Registers accounts, creates and moves medicine records through the
/// supply chain, and shows the role dashboards.
#[derive(Parser, Debug)]
#[command(name = "pharma", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file. Defaults to `PHARMA_*` variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Write the QR code of a created or bought medicine to this SVG file.
    #[arg(long, global = true)]
    qr_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Action(ActionCommand),

    /// Show a role dashboard.
    Dashboard(DashboardArgs),

    /// List medicine records, optionally filtered.
    Catalogue(CatalogueArgs),

    /// List registered users holding a role.
    Users(UsersArgs),

    /// List the front end's routes and the forms on each.
    Routes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    if let Commands::Routes = cli.command {
        print!("{}", route_table());
        return Ok(EXIT_OK);
    }

    let config = load_config(cli.config.as_deref())?;
    let page = build_page(&config)?;
    let opts = OutputOptions {
        json: cli.json,
        qr_out: cli.qr_out,
    };

    match &cli.command {
        Commands::Action(command) => run_action(command, page, &opts).await,
        Commands::Dashboard(args) => run_dashboard(args, &page, &opts).await,
        Commands::Catalogue(args) => run_catalogue(args, &page, &opts).await,
        Commands::Users(args) => run_users(args, &page, &opts).await,
        Commands::Routes => Ok(EXIT_OK),
    }
}
