use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::digest::{default_reference_digest, PASSWORD_HASH_ENV};
use crate::auth::session::{session_length, MAX_SESSION_HOURS, SESSION_HOURS};
use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "folio", about = "A personal portfolio blog")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Digest produced by `folio hash-password`. Unset means the insecure
    /// built-in default.
    pub password_hash: Option<String>,
    pub session_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_hash: None,
            session_hours: SESSION_HOURS,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        if session_length(config.auth.session_hours).is_none() {
            anyhow::bail!(
                "auth.session_hours must be between 1 and {}, got {}",
                MAX_SESSION_HOURS,
                config.auth.session_hours
            );
        }

        config.apply_env_override(std::env::var(PASSWORD_HASH_ENV).ok());

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("folio.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".folio")
        })
    }

    /// A non-blank environment value beats the config file.
    pub fn apply_env_override(&mut self, password_hash: Option<String>) {
        if let Some(hash) = password_hash.filter(|h| !h.trim().is_empty()) {
            self.auth.password_hash = Some(hash.trim().to_string());
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("folio.db"))
    }

    /// The digest logins are compared against. Falls back to the digest of
    /// the well-known default password, with a warning.
    pub fn reference_digest(&self) -> String {
        match self.auth.password_hash.as_deref() {
            Some(hash) if !hash.is_empty() => hash.to_string(),
            _ => {
                tracing::warn!(
                    "No admin password digest configured; using the insecure default. Set {} or auth.password_hash.",
                    PASSWORD_HASH_ENV
                );
                default_reference_digest()
            }
        }
    }
}
