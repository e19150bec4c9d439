use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chirpy",
    about = "Chirpy: a small microblogging server backed by a JSON document",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty database if none exists
    Init(InitArgs),
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Show how many chirps and users the database holds
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Database file
    #[arg(long, default_value = "database.json")]
    pub db: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Database file
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// Directory served under /app/
    #[arg(long)]
    pub static_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Database file
    #[arg(long, default_value = "database.json")]
    pub db: PathBuf,
}
