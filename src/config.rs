use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories_next::ProjectDirs;
use serde::Deserialize;
use tokio::fs;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    pub database: Database,
    pub limits: Limits,
    pub cors: Cors,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest accepted request body, in bytes.
    pub max_upload_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            database: Database::default(),
            limits: Limits::default(),
            cors: Cors::default(),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Database {
            url: "sqlite://pastes.db?mode=rwc".into(),
            max_connections: 5,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_upload_size: 1024 * 1024,
        }
    }
}

impl Default for Cors {
    fn default() -> Self {
        Cors {
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:3001".into(),
            ],
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, the platform config directory is tried, and
    /// the defaults are used if nothing is there.
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path).await,
            None => match default_path() {
                Some(path) if path.exists() => Self::read(&path).await,
                _ => Ok(Config::default()),
            },
        }
    }

    async fn read(path: &Path) -> anyhow::Result<Self> {
        let source = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("failed to deserialize config")
    }
}

fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pastebin-lite").map(|dirs| dirs.config_dir().join("config.toml"))
}
