//! Server configuration loaded from `hpg-server.toml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "hpg-server.toml";

/// Server configuration (TOML). Missing fields take the defaults below; the
/// command line overrides whatever the file says.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,

    pub port: u16,

    /// Directory holding one `.hpg` file per dataset.
    pub data_dir: PathBuf,

    /// Applet UI files. API-only when unset or missing on disk.
    pub static_dir: Option<PathBuf>,

    /// Change events buffered per SSE subscriber before it starts lagging.
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
            data_dir: PathBuf::from("data"),
            static_dir: None,
            event_buffer: 64,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bind.trim().is_empty() {
            return Err(anyhow!("bind must be a non-empty address"));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("data_dir must be a non-empty path"));
        }
        if self.event_buffer == 0 {
            return Err(anyhow!("event_buffer must be > 0"));
        }
        self.addr()?;
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("parse listen address {}:{}", self.bind, self.port))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ServerConfig::default()`.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ServerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
