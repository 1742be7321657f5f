use thiserror::Error;

use super::types::HEADER_SIZE;

/// Reasons a datagram could not be interpreted as a packet.
///
/// The relay has no error-response message, so these never reach the
/// sender; the dispatch engine logs them and drops the datagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("datagram of {len} bytes is shorter than the {HEADER_SIZE}-byte header")]
    Truncated { len: usize },
    #[error("unknown packet kind {0}")]
    UnknownKind(u32),
}
