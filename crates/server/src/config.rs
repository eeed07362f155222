// Server configuration.
//
// Environment variables cover the process-level settings with defaults for
// local development; the single operator-adjustable setting (the workspace
// root) is additionally persisted to a small JSON file so it survives
// restarts.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEV_PASSWORD: &str = "admin123";
const DEV_JWT_SECRET: &str = "vellum_local_development_jwt_secret_must_be_32_chars";

/// Core server configuration.
///
/// Constructed via [`ServerConfig::from_env`] which reads environment
/// variables and falls back to development defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (host:port).
    pub listen_addr: SocketAddr,
    /// Shared login password.
    pub app_password: String,
    /// JWT signing secret for session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in hours.
    pub token_ttl_hours: i64,
    /// Workspace root used when the persisted config names no usable directory.
    pub workspace_dir: PathBuf,
    /// Location of the persisted `{workspace_dir}` JSON record.
    pub config_path: PathBuf,
    /// Prebuilt browser bundle directory.
    pub assets_dir: PathBuf,
    /// Log filter directive (e.g. `info`, `vellum_server=debug`).
    pub log_filter: String,
}

impl ServerConfig {
    /// Parse configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `VELLUM_HOST` | `0.0.0.0` |
    /// | `VELLUM_PORT` | `8000` |
    /// | `VELLUM_APP_PASSWORD` | dev-only placeholder |
    /// | `VELLUM_JWT_SECRET` | dev-only placeholder |
    /// | `VELLUM_TOKEN_TTL_HOURS` | `24` |
    /// | `VELLUM_WORKSPACE_DIR` | `./workspace` |
    /// | `VELLUM_CONFIG_PATH` | `config/app_config.json` |
    /// | `VELLUM_ASSETS_DIR` | `frontend/dist` |
    /// | `VELLUM_LOG_FILTER` | `info` |
    pub fn from_env() -> Self {
        Self::from_env_fn(|key| std::env::var(key))
    }

    /// Testable constructor that accepts an environment lookup function.
    fn from_env_fn<F>(env: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let host = env("VELLUM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env("VELLUM_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8000);
        let listen_addr = format!("{host}:{port}")
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));

        let app_password = env("VELLUM_APP_PASSWORD").unwrap_or_else(|_| DEV_PASSWORD.into());
        let jwt_secret = env("VELLUM_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.into());

        let token_ttl_hours = env("VELLUM_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|hours| *hours > 0)
            .unwrap_or(24);

        let workspace_dir =
            PathBuf::from(env("VELLUM_WORKSPACE_DIR").unwrap_or_else(|_| "./workspace".into()));
        let config_path = PathBuf::from(
            env("VELLUM_CONFIG_PATH").unwrap_or_else(|_| "config/app_config.json".into()),
        );
        let assets_dir =
            PathBuf::from(env("VELLUM_ASSETS_DIR").unwrap_or_else(|_| "frontend/dist".into()));

        let log_filter = env("VELLUM_LOG_FILTER").unwrap_or_else(|_| "info".into());

        Self {
            listen_addr,
            app_password,
            jwt_secret,
            token_ttl_hours,
            workspace_dir,
            config_path,
            assets_dir,
            log_filter,
        }
    }

    /// Returns true when using the development-only login password.
    pub fn is_dev_password(&self) -> bool {
        self.app_password == DEV_PASSWORD
    }

    /// Returns true when using the development-only JWT secret.
    pub fn is_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

// ── Persisted workspace record ─────────────────────────────────────

/// The single persisted configuration record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub workspace_dir: String,
}

/// Reads and writes the `{workspace_dir}` JSON file. The record is
/// overwritten wholesale on update; there is no partial merge.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted record. When the file is absent or unparseable the
    /// default is written back out, so the next read finds a valid record.
    pub fn load_or_init(&self, default_workspace: &str) -> Result<AppConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                Ok(config) => return Ok(config),
                Err(error) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %error,
                        "config file is unparseable; rewriting defaults"
                    );
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(ConfigError::Io(error)),
        }

        let config = AppConfig { workspace_dir: default_workspace.to_string() };
        self.save(&config)?;
        Ok(config)
    }

    /// Persist the full record (creates parent directories).
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
            }
        }
        let contents = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        std::fs::write(&self.path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(std::io::Error),
    #[error("config serialize error: {0}")]
    Serialize(serde_json::Error),
}
