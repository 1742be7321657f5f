//! Relay runtime configuration types.

use super::defaults::{default_recv_timeout_ms, default_worker_threads};
use serde::{Deserialize, Serialize};

/// Worker pool and receive loop settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Number of worker tasks handling datagrams
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Receive timeout in milliseconds; the loop re-checks the run flag this often
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            recv_timeout_ms: default_recv_timeout_ms(),
        }
    }
}
