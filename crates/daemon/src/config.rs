//! Daemon configuration
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional
//! TOML file (`SMARTQ_CONFIG`, default `~/.smartq/smartq.toml`), then
//! `SMARTQ__SECTION__KEY` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use smartq_api_rpc::{RateLimitConfig, RpcServerConfig};
use smartq_api_ws::WsGatewayConfig;
use smartq_core::application::constants::DEFAULT_MAINTENANCE_INTERVAL_HOURS;
use smartq_core::application::EstimatorConfig;
use smartq_core::port::MaintenanceConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_PATH_ENV: &str = "SMARTQ_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "~/.smartq/smartq.toml";
const ENV_PREFIX: &str = "SMARTQ";
const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub database: DatabaseSection,
    pub rpc: RpcServerConfig,
    pub ws: WsGatewayConfig,
    pub rate_limit: RateLimitConfig,
    pub log: LogSection,
    pub maintenance: MaintenanceSection,
    pub estimator: EstimatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file path (`~` expanded) or `:memory:`
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "~/.smartq/smartq.db".to_string(),
        }
    }
}

impl DatabaseSection {
    /// sqlx connection url for the configured path
    pub fn url(&self) -> String {
        if self.path == MEMORY_DB {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}", self.expanded_path().display())
        }
    }

    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }

    /// Create the parent directory of a file database
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if self.path == MEMORY_DB {
            return Ok(());
        }
        if let Some(parent) = self.expanded_path().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub format: LogFormat,
    /// Directory for a daily rolling log file; console only when unset
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceSection {
    pub retention_days: i64,
    pub interval_hours: u64,
    pub max_db_size_mb: f64,
}

impl Default for MaintenanceSection {
    fn default() -> Self {
        let defaults = MaintenanceConfig::default();
        Self {
            retention_days: defaults.finished_ticket_retention_days,
            interval_hours: DEFAULT_MAINTENANCE_INTERVAL_HOURS,
            max_db_size_mb: defaults.max_db_size_mb,
        }
    }
}

impl MaintenanceSection {
    pub fn to_config(&self) -> MaintenanceConfig {
        MaintenanceConfig {
            finished_ticket_retention_days: self.retention_days,
            max_db_size_mb: self.max_db_size_mb,
        }
    }
}

impl DaemonConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = PathBuf::from(shellexpand::tilde(&path).into_owned());
        Self::load_from(Some(&path), None)
    }

    /// Load from an optional file and an explicit environment map
    /// (`None` reads the real process environment)
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(env);

        let config = builder
            .add_source(environment)
            .build()
            .context("reading configuration")?
            .try_deserialize::<DaemonConfig>()
            .context("invalid configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_toml(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "smartq-config-{}-{}.toml",
            std::process::id(),
            contents.len()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = DaemonConfig::load_from(None, Some(HashMap::new())).unwrap();

        assert_eq!(config.rpc.port, 9527);
        assert_eq!(config.ws.outbound_buffer, 64);
        assert_eq!(config.rate_limit.burst, 200);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.maintenance.retention_days, 30);
        assert_eq!(config.maintenance.interval_hours, 24);
        assert_eq!(config.estimator.hour_windows.len(), 4);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("smartq-does-not-exist.toml");
        let config = DaemonConfig::load_from(Some(&path), Some(HashMap::new())).unwrap();
        assert_eq!(config.database.path, "~/.smartq/smartq.db");
    }

    #[test]
    fn test_file_then_env_precedence() {
        let path = temp_toml(
            r#"
            [rpc]
            port = 7000

            [log]
            format = "json"

            [ws]
            port = 7001
            outbound_buffer = 16

            [[estimator.hour_windows]]
            start_hour = 9
            end_hour = 11
            percent = 150
            "#,
        );

        let env = HashMap::from([
            ("SMARTQ__RPC__PORT".to_string(), "7100".to_string()),
            ("SMARTQ__DATABASE__PATH".to_string(), ":memory:".to_string()),
        ]);
        let config = DaemonConfig::load_from(Some(&path), Some(env)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.rpc.port, 7100);
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert_eq!(config.ws.port, 7001);
        assert_eq!(config.ws.outbound_buffer, 16);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.database.url(), "sqlite::memory:");
        assert_eq!(config.estimator.hour_windows.len(), 1);
        assert_eq!(config.estimator.hour_windows[0].percent, 150);
    }

    #[test]
    fn test_database_url_expands_home() {
        let section = DatabaseSection {
            path: "/var/lib/smartq/queue.db".to_string(),
        };
        assert_eq!(section.url(), "sqlite:///var/lib/smartq/queue.db");

        let home = DatabaseSection::default().url();
        assert!(home.starts_with("sqlite://"));
        assert!(home.ends_with(".smartq/smartq.db"));
    }
}
