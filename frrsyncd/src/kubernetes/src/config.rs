use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "frrsync-system";
pub const DEFAULT_HTTP_PORT: u32 = 7573;
pub const DEFAULT_FRR_CONFIG_PATH: &str = "/etc/frrsync/frr-config.json";
pub const DEFAULT_REQUEUE_INTERVAL: u64 = 30;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Name of the node this agent runs on.
    #[serde(default)]
    pub node_name: String,
    /// Namespace the agent and its password secrets live in.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_http_port")]
    pub http_port: u32,
    /// Path the assembled FRR configuration is written to.
    #[serde(default = "default_frr_config_path")]
    pub frr_config_path: String,
    #[serde(default = "default_requeue_interval")]
    pub requeue_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            node_name: String::new(),
            namespace: default_namespace(),
            http_port: default_http_port(),
            frr_config_path: default_frr_config_path(),
            requeue_interval: default_requeue_interval(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FailedToLoad)?;
        serde_yaml::from_str(&contents).map_err(|_| ConfigError::InvalidData)
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_http_port() -> u32 {
    DEFAULT_HTTP_PORT
}

fn default_frr_config_path() -> String {
    DEFAULT_FRR_CONFIG_PATH.to_string()
}

fn default_requeue_interval() -> u64 {
    DEFAULT_REQUEUE_INTERVAL
}

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("failed to load")]
    FailedToLoad,
    #[error("invalid data")]
    InvalidData,
}
