//! Default value functions for configuration fields.
//!
//! Used by serde's `#[serde(default = ...)]` attributes and by the
//! `Default` impls, so a partial config file and an absent one agree.

use super::logging::LogFormat;

// =============================================================================
// Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    12345
}

pub fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

// =============================================================================
// Server Defaults
// =============================================================================

pub const fn default_worker_threads() -> usize {
    4
}

/// Upper bound on one blocking receive (milliseconds). Bounds how long
/// shutdown takes to be noticed.
pub const fn default_recv_timeout_ms() -> u64 {
    1000
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "tetris-relay.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
