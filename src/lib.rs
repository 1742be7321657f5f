#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

//! # Tetris Relay Server
//!
//! A UDP relay for three-player Tetris. Clients connect, receive an id, and
//! once the room is full every move they send is checked against the
//! server's copy of their board before it is forwarded to the other two.
//!
//! Packets are fixed 1024-byte frames with no framing or versioning; see
//! [`protocol`] for the layout.

/// Relay client used by tests and tooling
pub mod client;

/// Server configuration and environment variables
pub mod config;

/// Board, pieces and placement validation
pub mod game;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// Fixed-layout datagram protocol
pub mod protocol;

/// Receive loop, packet dispatch and the room
pub mod server;

/// Datagram send seam
pub mod transport;

/// Worker pool for per-datagram tasks
pub mod worker_pool;
