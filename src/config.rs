//! Application-level configuration loading.

use std::{
    env, fs,
    io::ErrorKind,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

use crate::services::persistence::{DEFAULT_QUEUE_CAPACITY, SnapshotPaths};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PHOTO_BINGO_CONFIG_PATH";
/// Environment variable that overrides the listening port.
const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Interface the HTTP server binds to.
    pub bind_address: IpAddr,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Prefix every route is nested under, e.g. `/photo-bingo`. Empty for none.
    pub base_path: String,
    /// Latest game state snapshot.
    pub state_path: PathBuf,
    /// Backup of the previous snapshot.
    pub backup_path: PathBuf,
    /// Directory holding uploaded photos, relative to the working directory.
    pub image_dir: String,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
    /// Capacity of the save trigger queue.
    pub save_queue_capacity: usize,
    /// Time in-flight requests get to finish once shutdown starts.
    pub shutdown_grace: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_port_override(env::var(PORT_ENV).ok())
    }

    fn with_port_override(mut self, port: Option<String>) -> Self {
        if let Some(port) = port {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(err) => warn!(%port, error = %err, "ignoring invalid {PORT_ENV}"),
            }
        }
        self
    }

    /// Address the HTTP server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Snapshot locations used by the persistence loop.
    pub fn snapshot_paths(&self) -> SnapshotPaths {
        SnapshotPaths {
            latest: self.state_path.clone(),
            backup: self.backup_path.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8081,
            base_path: "/photo-bingo".into(),
            state_path: "state.json".into(),
            backup_path: "state.prev.json".into(),
            image_dir: "images".into(),
            max_upload_bytes: 10 << 20,
            save_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// JSON representation of the configuration file; missing keys keep their default.
struct RawConfig {
    bind_address: Option<IpAddr>,
    port: Option<u16>,
    base_path: Option<String>,
    state_path: Option<PathBuf>,
    backup_path: Option<PathBuf>,
    image_dir: Option<String>,
    max_upload_bytes: Option<usize>,
    save_queue_capacity: Option<usize>,
    shutdown_grace_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            bind_address: value.bind_address.unwrap_or(defaults.bind_address),
            port: value.port.unwrap_or(defaults.port),
            base_path: value
                .base_path
                .map(|path| normalize_base_path(&path))
                .unwrap_or(defaults.base_path),
            state_path: value.state_path.unwrap_or(defaults.state_path),
            backup_path: value.backup_path.unwrap_or(defaults.backup_path),
            image_dir: value.image_dir.unwrap_or(defaults.image_dir),
            max_upload_bytes: value.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            save_queue_capacity: value
                .save_queue_capacity
                .unwrap_or(defaults.save_queue_capacity),
            shutdown_grace: value
                .shutdown_grace_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.shutdown_grace),
        }
    }
}

/// `/`, `photo-bingo/` and `/photo-bingo` all become `""` or `/photo-bingo`.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
