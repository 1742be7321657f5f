//! Fixed-layout packet codec.
//!
//! Layout (every datagram is exactly [`PACKET_SIZE`] bytes):
//!
//! ```text
//! offset  size  field
//!      0     4  kind        (u32, host byte order)
//!      4     4  player_id   (u32, host byte order)
//!      8    16  move data   (4 x i32: piece_type, x, y, rotation)   MOVE/ROTATE/DROP
//!      8  1016  board data  (opaque, relayed verbatim)              BOARD_UPDATE
//! ```
//!
//! There is no length prefix, checksum or version field. Both ends must
//! agree on this layout and on byte order.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::error::ProtocolError;
use super::types::{
    MoveData, PacketKind, PlayerId, BOARD_DATA_SIZE, HEADER_SIZE, MOVE_DATA_SIZE, PACKET_SIZE,
};

/// Kind-specific packet body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// CONNECT_REQUEST, CONNECT_RESPONSE, GAME_START, DISCONNECT.
    Empty,
    /// MOVE_PIECE, ROTATE_PIECE, DROP_PIECE.
    Move(MoveData),
    /// BOARD_UPDATE. Always [`BOARD_DATA_SIZE`] bytes once decoded.
    Board(Bytes),
}

/// A decoded wire packet. Cheap to clone; the board payload is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub kind: PacketKind,
    pub player_id: PlayerId,
    pub payload: Payload,
}

impl Packet {
    #[must_use]
    pub fn connect_request() -> Self {
        Self::empty(PacketKind::ConnectRequest, 0)
    }

    #[must_use]
    pub fn connect_response(player_id: PlayerId) -> Self {
        Self::empty(PacketKind::ConnectResponse, player_id)
    }

    #[must_use]
    pub fn game_start() -> Self {
        Self::empty(PacketKind::GameStart, 0)
    }

    #[must_use]
    pub fn disconnect(player_id: PlayerId) -> Self {
        Self::empty(PacketKind::Disconnect, player_id)
    }

    #[must_use]
    pub fn move_piece(player_id: PlayerId, data: MoveData) -> Self {
        Self::piece_action(PacketKind::MovePiece, player_id, data)
    }

    #[must_use]
    pub fn rotate_piece(player_id: PlayerId, data: MoveData) -> Self {
        Self::piece_action(PacketKind::RotatePiece, player_id, data)
    }

    #[must_use]
    pub fn drop_piece(player_id: PlayerId, data: MoveData) -> Self {
        Self::piece_action(PacketKind::DropPiece, player_id, data)
    }

    /// Board snapshots longer than [`BOARD_DATA_SIZE`] are truncated on encode.
    #[must_use]
    pub fn board_update(player_id: PlayerId, board_data: Bytes) -> Self {
        Self {
            kind: PacketKind::BoardUpdate,
            player_id,
            payload: Payload::Board(board_data),
        }
    }

    fn empty(kind: PacketKind, player_id: PlayerId) -> Self {
        Self {
            kind,
            player_id,
            payload: Payload::Empty,
        }
    }

    fn piece_action(kind: PacketKind, player_id: PlayerId, data: MoveData) -> Self {
        Self {
            kind,
            player_id,
            payload: Payload::Move(data),
        }
    }

    /// Move fields, if this is a piece action.
    #[must_use]
    pub fn move_data(&self) -> Option<&MoveData> {
        match &self.payload {
            Payload::Move(data) => Some(data),
            _ => None,
        }
    }

    /// Opaque board bytes, if this is a board update.
    #[must_use]
    pub fn board_data(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::Board(data) => Some(data),
            _ => None,
        }
    }

    /// Encode into a zero-padded frame of exactly [`PACKET_SIZE`] bytes.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(PACKET_SIZE);
        buf.put_u32_ne(self.kind.as_u32());
        buf.put_u32_ne(self.player_id);

        match &self.payload {
            Payload::Empty => {}
            Payload::Move(data) => {
                buf.put_i32_ne(data.piece_type);
                buf.put_i32_ne(data.x);
                buf.put_i32_ne(data.y);
                buf.put_i32_ne(data.rotation);
            }
            Payload::Board(data) => {
                let len = data.len().min(BOARD_DATA_SIZE);
                buf.put_slice(&data[..len]);
            }
        }

        buf.resize(PACKET_SIZE, 0);
        buf.freeze()
    }

    /// Decode a received datagram.
    ///
    /// Datagrams shorter than [`PACKET_SIZE`] are read as if zero-padded;
    /// bytes past [`PACKET_SIZE`] are ignored.
    pub fn decode(datagram: &[u8]) -> Result<Self, ProtocolError> {
        if datagram.len() < HEADER_SIZE {
            return Err(ProtocolError::Truncated {
                len: datagram.len(),
            });
        }

        let frame = pad_frame(datagram);
        let mut cursor = &frame[..];
        let kind = PacketKind::try_from(cursor.get_u32_ne())?;
        let player_id = cursor.get_u32_ne();

        let payload = if kind.is_piece_action() {
            let mut fields = &cursor[..MOVE_DATA_SIZE];
            Payload::Move(MoveData {
                piece_type: fields.get_i32_ne(),
                x: fields.get_i32_ne(),
                y: fields.get_i32_ne(),
                rotation: fields.get_i32_ne(),
            })
        } else if kind == PacketKind::BoardUpdate {
            Payload::Board(frame.slice(HEADER_SIZE..))
        } else {
            Payload::Empty
        };

        Ok(Self {
            kind,
            player_id,
            payload,
        })
    }
}

/// Normalise a received datagram to a fixed [`PACKET_SIZE`] frame:
/// short datagrams are zero-padded, long ones truncated.
#[must_use]
pub fn pad_frame(datagram: &[u8]) -> Bytes {
    let len = datagram.len().min(PACKET_SIZE);
    let mut frame = BytesMut::zeroed(PACKET_SIZE);
    frame[..len].copy_from_slice(&datagram[..len]);
    frame.freeze()
}
