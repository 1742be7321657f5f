//! Configuration module for the relay.
//!
//! Supports JSON configuration files, inline JSON and per-field
//! environment variable overrides on top of compiled-in defaults.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`server`]: Worker pool and receive loop settings
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions
//!
//! Board dimensions and room capacity are compile-time constants and are
//! deliberately not configurable.

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod server;
pub mod types;
pub mod validation;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LogRotation, LoggingConfig};

pub use server::ServerConfig;

pub use types::Config;

pub use validation::validate_config;
