use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use clap::{Parser, Subcommand};

mod clock;
mod commands;
mod config;
mod controllers;
mod db;
mod error;
mod extract;
mod ids;
mod models;
mod render;
mod types;

#[cfg(test)]
mod testing;

use clock::{Clock, SystemClock};
use config::Config;
use db::Database;
use ids::{IdGenerator, RandomIds};

pub(crate) use error::ApiResult;

/// A small paste-sharing service.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// sqlite database URL (`sqlite://path/to/file.db`), overriding the config file.
    #[arg(long, env = "DB_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Create the database schema and exit.
    Migrate,
}

/// Everything a request handler needs, created once at startup.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub database: Database,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).await?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let database = Database::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to database")?;

    let app = App {
        config,
        database,
        ids: Arc::new(RandomIds),
        clock: Arc::new(SystemClock),
    };

    match args.command {
        Command::Serve => {
            commands::migrate::run(app.clone()).await?;
            commands::serve::run(app).await
        }
        Command::Migrate => commands::migrate::run(app).await,
    }
}
