//! Configuration for the mockfish service.
//!
//! Resolution order (lowest to highest priority):
//! 1. Built-in defaults
//! 2. Optional JSON config file
//! 3. Environment variables and CLI flags (applied by the binary)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. A bare `:port` binds every interface.
    pub address: String,
    /// Upper bound for receiving a request body (seconds).
    pub read_timeout_secs: u64,
    /// Upper bound for producing a response (seconds).
    pub write_timeout_secs: u64,
    /// Grace period for in-flight requests on shutdown (seconds).
    pub shutdown_timeout_secs: u64,
    /// Name reported by the health endpoint.
    pub service_name: String,
    pub tls: TlsSettings,
    pub sessions: SessionSettings,
    pub tasks: TaskSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ":8443".to_string(),
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            service_name: "mockfish".to_string(),
            tls: TlsSettings::default(),
            sessions: SessionSettings::default(),
            tasks: TaskSettings::default(),
        }
    }
}

/// Transport security settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    pub enabled: bool,
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    /// Generate a self-signed certificate instead of reading `cert_file`/`key_file`.
    pub dev_self_signed: bool,
    /// Where generated development certificates are written.
    pub dev_cert_dir: PathBuf,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cert_file: PathBuf::from("certs/server.crt"),
            key_file: PathBuf::from("certs/server.key"),
            dev_self_signed: false,
            dev_cert_dir: PathBuf::from("certs/dev"),
        }
    }
}

/// Session lifetime policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    /// When false, tokens stay valid until explicitly deleted.
    pub enforce_expiry: bool,
    /// How often expired sessions are swept (seconds).
    pub purge_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            enforce_expiry: true,
            purge_interval_secs: 300,
        }
    }
}

/// Asynchronous task execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Simulated work time between task progress steps (milliseconds).
    pub step_delay_ms: u64,
    /// Maximum number of tasks executing at once.
    pub workers: usize,
    /// Pending jobs accepted before submissions are refused.
    pub queue_capacity: usize,
    /// Finished tasks older than this are deleted. Zero disables auto-delete.
    pub auto_delete_minutes: u64,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            step_delay_ms: 1500,
            workers: 4,
            queue_capacity: 64,
            auto_delete_minutes: 60,
        }
    }
}

impl ServerConfig {
    /// Resolve the listen address, accepting the `:port` shorthand.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = self.address.trim();
        let full = if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        };
        full.parse().map_err(|source| Error::InvalidAddress {
            addr: self.address.clone(),
            source,
        })
    }

    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::Config("server address is required".into()));
        }
        self.socket_addr()?;
        if self.read_timeout_secs == 0 || self.write_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be greater than zero".into()));
        }
        if self.tls.enabled && !self.tls.dev_self_signed {
            if self.tls.cert_file.as_os_str().is_empty() {
                return Err(Error::Config(
                    "TLS certificate file is required when TLS is enabled".into(),
                ));
            }
            if self.tls.key_file.as_os_str().is_empty() {
                return Err(Error::Config(
                    "TLS key file is required when TLS is enabled".into(),
                ));
            }
        }
        if self.tasks.workers == 0 {
            return Err(Error::Config("task worker count must be at least 1".into()));
        }
        if self.tasks.queue_capacity == 0 {
            return Err(Error::Config("task queue capacity must be at least 1".into()));
        }
        Ok(())
    }
}

impl SessionSettings {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl TaskSettings {
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

/// Load configuration from an optional JSON file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    match path {
        Some(path) => load_config_file(path),
        None => {
            debug!("No config file given, using defaults");
            Ok(ServerConfig::default())
        }
    }
}

fn load_config_file(path: &Path) -> Result<ServerConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    let config = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}
