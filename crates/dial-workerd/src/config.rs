use std::{fs, net::SocketAddr, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use dial_model::AttrMap;
use dial_observe::LoggerConfig;

/// Daemon configuration, loaded from a JSON file.
///
/// Every field has a default, so a partial (or missing) file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Address the control-plane HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Logger settings.
    pub logger: LoggerConfig,
    /// Prefetch count the QoS counter starts at.
    pub initial_prefetch: u32,
    /// Task types registered at startup.
    pub tasks: Vec<TaskSeed>,
}

/// One task type to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSeed {
    /// Unique task-type name.
    pub name: String,
    /// Attributes inherited from the base task type.
    #[serde(default)]
    pub defaults: AttrMap,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8710".parse().expect("default listen addr must be valid"),
            logger: LoggerConfig::default(),
            initial_prefetch: 0,
            tasks: Vec::new(),
        }
    }
}

impl WorkerConfig {
    /// Load the config from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
