use serde::{Deserialize, Serialize};

use super::error::ProtocolError;

/// Size of every datagram on the wire.
pub const PACKET_SIZE: usize = 1024;
/// `kind` (4 bytes) + `player_id` (4 bytes).
pub const HEADER_SIZE: usize = 8;
/// `piece_type`, `x`, `y`, `rotation` as four 4-byte signed integers.
pub const MOVE_DATA_SIZE: usize = 16;
/// Opaque BOARD_UPDATE payload: everything after the header.
pub const BOARD_DATA_SIZE: usize = PACKET_SIZE - HEADER_SIZE;

/// Sequential player identifier assigned by the server, starting at 1.
pub type PlayerId = u32;

/// Discriminant carried in the first four bytes of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum PacketKind {
    ConnectRequest = 1,
    ConnectResponse = 2,
    GameStart = 3,
    BoardUpdate = 4,
    Disconnect = 5,
    MovePiece = 6,
    RotatePiece = 7,
    DropPiece = 8,
}

impl PacketKind {
    /// Wire value of this kind.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// MOVE_PIECE, ROTATE_PIECE and DROP_PIECE carry [`MoveData`] and are
    /// validated before being relayed.
    #[must_use]
    pub const fn is_piece_action(self) -> bool {
        matches!(self, Self::MovePiece | Self::RotatePiece | Self::DropPiece)
    }

    /// Kinds only the server is supposed to emit.
    #[must_use]
    pub const fn is_server_originated(self) -> bool {
        matches!(self, Self::ConnectResponse | Self::GameStart)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectRequest => "CONNECT_REQUEST",
            Self::ConnectResponse => "CONNECT_RESPONSE",
            Self::GameStart => "GAME_START",
            Self::BoardUpdate => "BOARD_UPDATE",
            Self::Disconnect => "DISCONNECT",
            Self::MovePiece => "MOVE_PIECE",
            Self::RotatePiece => "ROTATE_PIECE",
            Self::DropPiece => "DROP_PIECE",
        }
    }
}

impl TryFrom<u32> for PacketKind {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ConnectRequest),
            2 => Ok(Self::ConnectResponse),
            3 => Ok(Self::GameStart),
            4 => Ok(Self::BoardUpdate),
            5 => Ok(Self::Disconnect),
            6 => Ok(Self::MovePiece),
            7 => Ok(Self::RotatePiece),
            8 => Ok(Self::DropPiece),
            other => Err(ProtocolError::UnknownKind(other)),
        }
    }
}

impl std::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of MOVE_PIECE / ROTATE_PIECE / DROP_PIECE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub piece_type: i32,
    pub x: i32,
    pub y: i32,
    pub rotation: i32,
}

impl MoveData {
    #[must_use]
    pub const fn new(piece_type: i32, x: i32, y: i32, rotation: i32) -> Self {
        Self {
            piece_type,
            x,
            y,
            rotation,
        }
    }
}
