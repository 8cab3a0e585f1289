use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "reflex.toml";

#[derive(Debug, Parser)]
#[command(name = "reflex", version, about = "Three-colour reaction-time game")]
pub struct Cli {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Where the personal best is kept
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Keep the personal best in memory only
    #[arg(long, conflicts_with = "store")]
    pub memory_store: bool,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// Log filter, e.g. `info` or `reflex_session=debug`
    #[arg(long)]
    pub log: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `None` keeps the personal best in memory
    pub store_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub log: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: Some(PathBuf::from("reflex-best.json")),
            width: 640,
            height: 480,
            log: "info".into(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file, then `REFLEX_*` variables, then flags.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("REFLEX_STORE") {
            self.store_path = if v.is_empty() {
                None
            } else {
                Some(PathBuf::from(v))
            };
        }
        if let Some(v) = var("REFLEX_LOG") {
            self.log = v;
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if cli.memory_store {
            self.store_path = None;
        }
        if let Some(path) = &cli.store {
            self.store_path = Some(path.clone());
        }
        if let Some(w) = cli.width {
            self.width = w;
        }
        if let Some(h) = cli.height {
            self.height = h;
        }
        if let Some(log) = &cli.log {
            self.log = log.clone();
        }
    }
}
