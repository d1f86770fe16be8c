use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("at least one cluster must be configured")]
    NoClusters,
    #[error("cluster {0:?} is configured more than once")]
    DuplicateCluster(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_event_limit")]
    pub event_limit: u32,
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,
    #[serde(default)]
    pub clusters: Vec<ClusterDef>,
}

/// One registered cluster: which kubeconfig file and which context in it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClusterDef {
    pub name: String,
    pub kubeconfig: PathBuf,
    pub context: String,
}

fn default_listen_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_event_limit() -> u32 {
    30
}

fn default_health_interval() -> u64 {
    30
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_yaml::from_str(data)?;

        if cfg.clusters.is_empty() {
            return Err(ConfigError::NoClusters);
        }

        let mut seen = HashSet::new();
        for c in &cfg.clusters {
            if !seen.insert(c.name.as_str()) {
                return Err(ConfigError::DuplicateCluster(c.name.clone()));
            }
        }

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            request: Duration::from_secs(self.request_timeout_secs),
            connect: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(default_request_timeout()),
            connect: Duration::from_secs(default_connect_timeout()),
        }
    }
}
