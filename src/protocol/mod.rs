// Protocol module: packet kinds, fixed wire layout, encode/decode

pub mod error;
pub mod packet;
pub mod types;

pub use error::ProtocolError;

pub use packet::{pad_frame, Packet, Payload};

pub use types::{
    MoveData, PacketKind, PlayerId, BOARD_DATA_SIZE, HEADER_SIZE, MOVE_DATA_SIZE, PACKET_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use proptest::prelude::*;

    #[test]
    fn test_header_layout_uses_native_byte_order() {
        let encoded = Packet::connect_response(7).encode();

        assert_eq!(encoded.len(), PACKET_SIZE);
        assert_eq!(&encoded[0..4], &2u32.to_ne_bytes());
        assert_eq!(&encoded[4..8], &7u32.to_ne_bytes());
        assert!(encoded[HEADER_SIZE..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_move_fields_are_positional() {
        let packet = Packet::rotate_piece(3, MoveData::new(6, -1, 18, 3));
        let encoded = packet.encode();

        assert_eq!(&encoded[8..12], &6i32.to_ne_bytes());
        assert_eq!(&encoded[12..16], &(-1i32).to_ne_bytes());
        assert_eq!(&encoded[16..20], &18i32.to_ne_bytes());
        assert_eq!(&encoded[20..24], &3i32.to_ne_bytes());

        let decoded = Packet::decode(&encoded).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(decoded.move_data(), Some(&MoveData::new(6, -1, 18, 3)));
    }

    #[test]
    fn test_decode_rejects_short_datagram() {
        let result = Packet::decode(&[1, 0, 0]);
        assert_eq!(result, Err(ProtocolError::Truncated { len: 3 }));
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let mut frame = vec![0u8; PACKET_SIZE];
        frame[0..4].copy_from_slice(&42u32.to_ne_bytes());
        assert_eq!(Packet::decode(&frame), Err(ProtocolError::UnknownKind(42)));

        frame[0..4].copy_from_slice(&0u32.to_ne_bytes());
        assert_eq!(Packet::decode(&frame), Err(ProtocolError::UnknownKind(0)));
    }

    #[test]
    fn test_decode_pads_header_only_datagram() {
        let mut datagram = Vec::new();
        datagram.extend_from_slice(&PacketKind::MovePiece.as_u32().to_ne_bytes());
        datagram.extend_from_slice(&2u32.to_ne_bytes());

        let decoded = Packet::decode(&datagram).unwrap();
        assert_eq!(decoded.kind, PacketKind::MovePiece);
        assert_eq!(decoded.player_id, 2);
        assert_eq!(decoded.move_data(), Some(&MoveData::default()));
    }

    #[test]
    fn test_decode_ignores_bytes_past_frame() {
        let mut datagram = Packet::disconnect(9).encode().to_vec();
        datagram.extend_from_slice(&[0xFF; 64]);

        let decoded = Packet::decode(&datagram).unwrap();
        assert_eq!(decoded, Packet::disconnect(9));
    }

    #[test]
    fn test_board_update_short_payload_is_zero_padded() {
        let packet = Packet::board_update(1, Bytes::from_static(&[1, 2, 3]));
        let decoded = Packet::decode(&packet.encode()).unwrap();

        let data = decoded.board_data().unwrap();
        assert_eq!(data.len(), BOARD_DATA_SIZE);
        assert_eq!(&data[..3], &[1, 2, 3]);
        assert!(data[3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pad_frame_normalises_length() {
        assert_eq!(pad_frame(&[5; 10]).len(), PACKET_SIZE);
        assert_eq!(pad_frame(&[5; PACKET_SIZE + 8]).len(), PACKET_SIZE);
        assert_eq!(pad_frame(&[5; 10])[10], 0);
    }

    #[test]
    fn test_kind_classification() {
        for kind in [
            PacketKind::MovePiece,
            PacketKind::RotatePiece,
            PacketKind::DropPiece,
        ] {
            assert!(kind.is_piece_action());
        }
        assert!(!PacketKind::BoardUpdate.is_piece_action());
        assert!(PacketKind::GameStart.is_server_originated());
        assert!(!PacketKind::ConnectRequest.is_server_originated());
        assert_eq!(PacketKind::DropPiece.to_string(), "DROP_PIECE");
    }

    proptest! {
        #[test]
        fn board_payload_round_trips_byte_for_byte(
            data in proptest::collection::vec(any::<u8>(), BOARD_DATA_SIZE..=BOARD_DATA_SIZE),
            player_id in any::<u32>(),
        ) {
            let packet = Packet::board_update(player_id, Bytes::from(data.clone()));
            let encoded = packet.encode();
            let decoded = Packet::decode(&encoded).unwrap();

            prop_assert_eq!(decoded.player_id, player_id);
            prop_assert_eq!(&decoded.board_data().unwrap()[..], &data[..]);
            prop_assert_eq!(decoded.encode(), encoded);
        }
    }
}
