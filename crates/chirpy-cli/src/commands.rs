use std::path::Path;

use anyhow::Context;
use chirpy_crypto::SessionSecret;
use chirpy_server::{ChirpyServer, ServerConfig};
use chirpy_store::{DocumentStore, JsonFileStore, Repository};
use colored::Colorize;
use serde::Serialize;

use crate::cli::*;

/// Environment variable holding the token signing secret.
pub const SECRET_ENV: &str = "JWT_SECRET";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::Serve(args) => cmd_serve(args),
        Command::Stats(args) => cmd_stats(args, cli.format),
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let existed = init_database(&args.db)?;
    if existed {
        println!("{} Database already present at {}", "✓".green().bold(), args.db.display().to_string().bold());
    } else {
        println!("{} Created empty database at {}", "✓".green().bold(), args.db.display().to_string().bold());
    }
    Ok(())
}

/// Make sure a database exists at `path`; returns whether it already did.
fn init_database(path: &Path) -> anyhow::Result<bool> {
    let existed = path.exists();
    JsonFileStore::new(path)
        .ensure_exists()
        .with_context(|| format!("initialising {}", path.display()))?;
    Ok(existed)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let secret = session_secret(std::env::var(SECRET_ENV).ok());
    let server = ChirpyServer::new(config, secret).context("starting server")?;
    println!(
        "Chirpy on {} (db: {}, static: {})",
        server.config().bind_addr.to_string().bold(),
        server.config().database_path.display(),
        server.config().static_root.display(),
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Load the config file if given, then apply flag overrides.
fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(db) = &args.db {
        config.database_path = db.clone();
    }
    if let Some(root) = &args.static_root {
        config.static_root = root.clone();
    }
    config.validate().context("invalid server configuration")?;
    Ok(config)
}

/// Use the configured secret, or a random one that dies with the process.
fn session_secret(configured: Option<String>) -> SessionSecret {
    match configured.filter(|s| !s.is_empty()) {
        Some(secret) => SessionSecret::from_bytes(secret.into_bytes()),
        None => {
            tracing::warn!("{SECRET_ENV} not set; using a random secret, tokens will not survive a restart");
            SessionSecret::generate()
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Stats {
    chirps: usize,
    users: usize,
}

fn read_stats(path: &Path) -> anyhow::Result<Stats> {
    let repo = Repository::new(JsonFileStore::new(path));
    let chirps = repo
        .post_count()
        .with_context(|| format!("reading {} (run `chirpy init` first?)", path.display()))?;
    let users = repo.account_count()?;
    Ok(Stats { chirps, users })
}

fn cmd_stats(args: StatsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let stats = read_stats(&args.db)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&stats)?),
        OutputFormat::Text => {
            println!("Database: {}", args.db.display().to_string().bold());
            println!("  Chirps: {}", stats.chirps.to_string().cyan());
            println!("  Users:  {}", stats.users.to_string().cyan());
        }
    }
    Ok(())
}
