//! Root configuration types.

use super::defaults::{default_bind_address, default_port};
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Root configuration struct for the relay.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Socket address the relay binds to.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .trim()
            .parse()
            .with_context(|| format!("invalid bind_address '{}'", self.bind_address))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Runtime settings for [`crate::server::RelayServer::bind`].
    pub fn relay_server_config(&self) -> anyhow::Result<crate::server::ServerConfig> {
        Ok(crate::server::ServerConfig {
            bind_addr: self.bind_addr()?,
            worker_threads: self.server.worker_threads,
            recv_timeout: Duration::from_millis(self.server.recv_timeout_ms),
        })
    }
}
