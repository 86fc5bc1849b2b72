mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, item::ItemSubcommand, worker::WorkerSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rota",
    about = "Fair round-robin assignment of incoming items to a pool of workers",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .rota/)
    #[arg(long, global = true, env = "ROTA_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize rota in the current directory
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage the worker pool
    Worker {
        #[command(subcommand)]
        subcommand: WorkerSubcommand,
    },

    /// Create, list and assign items
    Item {
        #[command(subcommand)]
        subcommand: ItemSubcommand,
    },

    /// Assign every item that is still unassigned
    Reconcile,

    /// Show pool and ledger counts
    Status,

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the HTTP server
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Worker { subcommand } => cmd::worker::run(&root, subcommand, cli.json),
        Commands::Item { subcommand } => cmd::item::run(&root, subcommand, cli.json),
        Commands::Reconcile => cmd::reconcile::run(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
