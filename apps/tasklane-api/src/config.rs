use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_LISTEN_PORT: u16 = 3030;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    #[serde(default = "default_listen_host")]
    pub listen_host: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Directory for the daily-rotated log file; stdout only when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}

fn default_max_connections() -> u32 {
    10
}

/// Where the configuration came from, reported once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(String),
    Environment,
}

impl ApiConfig {
    pub fn load() -> Result<(Self, ConfigSource)> {
        let mut config_paths = Vec::new();
        if let Ok(path) = std::env::var("TASKLANE_CONFIG") {
            config_paths.push(path);
        }
        config_paths.push("/etc/tasklane/api.toml".to_string());
        config_paths.push("./tasklane.toml".to_string());

        for path in config_paths {
            if let Ok(contents) = fs::read_to_string(&path) {
                let config: Self = toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path))?;
                return Ok((config, ConfigSource::File(path)));
            }
        }

        Ok((Self::from_env()?, ConfigSource::Environment))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database_url: database_url(&get)?,
            listen_host: get("LISTEN_HOST").unwrap_or_else(default_listen_host),
            listen_port: get("LISTEN_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_LISTEN_PORT),
            max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or_else(default_max_connections),
            log_dir: get("LOG_DIR").filter(|d| !d.is_empty()),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen_host, self.listen_port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.listen_host, self.listen_port
                )
            })
    }
}

/// `DATABASE_URL` when set, otherwise assembled from the `DB_*` parts.
fn database_url(get: &impl Fn(&str) -> Option<String>) -> Result<String> {
    if let Some(url) = get("DATABASE_URL").filter(|u| !u.is_empty()) {
        return Ok(url);
    }

    let name = get("DB_NAME").context("DATABASE_URL or DB_NAME must be set")?;
    let user = get("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = get("DB_PASSWORD").unwrap_or_default();
    let host = get("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = get("DB_PORT").unwrap_or_else(|| "5432".to_string());

    let credentials = if password.is_empty() {
        user
    } else {
        format!("{}:{}", user, password)
    };
    Ok(format!(
        "postgres://{}@{}:{}/{}",
        credentials, host, port, name
    ))
}
