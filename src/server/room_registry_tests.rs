use super::test_support::{addr, RecordingSender};
use super::*;
use crate::game::{Piece, PlacementError, Tetromino};
use crate::protocol::{MoveData, Packet, PacketKind};
use crate::transport::DatagramSender;

fn create_test_room() -> (RoomRegistry, Arc<RecordingSender>, Arc<ServerMetrics>) {
    let sender = Arc::new(RecordingSender::default());
    let metrics = Arc::new(ServerMetrics::new());
    let room = RoomRegistry::new(
        Arc::clone(&sender) as Arc<dyn DatagramSender>,
        Arc::clone(&metrics),
    );
    (room, sender, metrics)
}

async fn fill_room(room: &RoomRegistry) {
    for id in 1..=3 {
        assert!(room.add_player(Player::new(id, addr(40000 + id as u16))).await);
    }
}

fn move_of(
    kind: PacketKind,
    player_id: u32,
    piece: Tetromino,
    x: i32,
    y: i32,
    rotation: i32,
) -> Packet {
    let data = MoveData::new(piece.tag(), x, y, rotation);
    match kind {
        PacketKind::RotatePiece => Packet::rotate_piece(player_id, data),
        PacketKind::DropPiece => Packet::drop_piece(player_id, data),
        _ => Packet::move_piece(player_id, data),
    }
}

#[tokio::test]
async fn add_player_refuses_fourth_member_without_mutation() {
    let (room, _sender, _metrics) = create_test_room();
    assert!(room.is_empty().await);
    fill_room(&room).await;

    assert!(room.is_full().await);
    assert!(!room.add_player(Player::new(4, addr(40004))).await);
    assert_eq!(room.len().await, 3);
    assert_eq!(room.find_by_address(addr(40004)).await, None);
    assert_eq!(room.capacity(), ROOM_CAPACITY);
}

#[tokio::test]
async fn remove_player_reports_presence() {
    let (room, _sender, _metrics) = create_test_room();
    fill_room(&room).await;

    assert!(room.remove_player(2).await);
    assert!(!room.remove_player(2).await);
    assert!(!room.remove_player(99).await);
    assert_eq!(room.len().await, 2);
    assert!(!room.is_full().await);
}

#[tokio::test]
async fn remove_by_address_returns_member_id() {
    let (room, _sender, _metrics) = create_test_room();
    fill_room(&room).await;

    assert_eq!(room.remove_by_address(addr(40003)).await, Some(3));
    assert_eq!(room.remove_by_address(addr(40003)).await, None);
    assert_eq!(room.find_by_address(addr(40001)).await, Some(1));
}

#[tokio::test]
async fn list_players_is_a_sorted_snapshot() {
    let (room, _sender, _metrics) = create_test_room();
    assert!(room.add_player(Player::new(7, addr(40007))).await);
    assert!(room.add_player(Player::new(2, addr(40002))).await);

    let listed = room.list_players().await;
    assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 7]);

    // Later mutations do not show through an earlier snapshot.
    assert!(room.remove_player(7).await);
    assert_eq!(listed.len(), 2);
    assert_eq!(room.list_players().await.len(), 1);
}

#[tokio::test]
async fn broadcast_skips_excluded_address() {
    let (room, sender, _metrics) = create_test_room();
    fill_room(&room).await;

    let attempts = room
        .broadcast(&Packet::game_start(), Some(addr(40001)))
        .await;
    assert_eq!(attempts, 2);

    let mut targets: Vec<_> = sender.take_packets().into_iter().map(|(a, _)| a).collect();
    targets.sort();
    assert_eq!(targets, vec![addr(40002), addr(40003)]);
}

#[tokio::test]
async fn broadcast_without_exclusion_reaches_everyone() {
    let (room, sender, _metrics) = create_test_room();
    fill_room(&room).await;

    assert_eq!(room.broadcast(&Packet::game_start(), None).await, 3);
    let sent = sender.take_packets();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|(_, p)| p.kind == PacketKind::GameStart));
}

#[tokio::test]
async fn broadcast_continues_past_send_failures() {
    let (room, sender, metrics) = create_test_room();
    fill_room(&room).await;
    sender.fail_sends_to(addr(40002));

    assert_eq!(room.broadcast(&Packet::game_start(), None).await, 3);
    assert_eq!(sender.take().len(), 2);
    assert_eq!(metrics.snapshot().send_failures, 1);
}

#[tokio::test]
async fn broadcast_to_empty_room_sends_nothing() {
    let (room, sender, _metrics) = create_test_room();
    assert_eq!(room.broadcast(&Packet::game_start(), None).await, 0);
    assert!(sender.take().is_empty());
}

#[tokio::test]
async fn validate_move_checks_placement_on_sender_board() {
    let (room, _sender, _metrics) = create_test_room();
    fill_room(&room).await;

    assert!(
        room.validate_move(1, &move_of(PacketKind::MovePiece, 1, Tetromino::O, 4, 0, 0))
            .await
    );
    assert!(
        room.validate_move(1, &move_of(PacketKind::DropPiece, 1, Tetromino::O, 8, 18, 0))
            .await
    );
    assert!(
        !room
            .validate_move(1, &move_of(PacketKind::MovePiece, 1, Tetromino::O, -1, 0, 0))
            .await
    );
    assert!(
        !room
            .validate_move(1, &move_of(PacketKind::MovePiece, 1, Tetromino::O, 9, 0, 0))
            .await
    );
}

#[tokio::test]
async fn validate_move_rejects_unknown_player_and_piece() {
    let (room, _sender, _metrics) = create_test_room();
    fill_room(&room).await;

    assert!(
        !room
            .validate_move(42, &move_of(PacketKind::MovePiece, 42, Tetromino::O, 4, 0, 0))
            .await
    );

    let bogus = Packet::move_piece(1, MoveData::new(99, 4, 0, 0));
    assert!(!room.validate_move(1, &bogus).await);
    assert!(!room.validate_move(1, &Packet::game_start()).await);
}

#[tokio::test]
async fn validate_rotate_checks_rotated_shape_at_same_anchor() {
    let (room, _sender, _metrics) = create_test_room();
    fill_room(&room).await;

    // Horizontal I does not fit at x=8, vertical I does.
    assert!(
        !room
            .validate_move(1, &move_of(PacketKind::MovePiece, 1, Tetromino::I, 8, 0, 0))
            .await
    );
    assert!(
        room.validate_move(1, &move_of(PacketKind::RotatePiece, 1, Tetromino::I, 8, 0, 1))
            .await
    );

    // Vertical I from row 17 runs past the floor; two turns are horizontal again.
    assert!(
        !room
            .validate_move(1, &move_of(PacketKind::RotatePiece, 1, Tetromino::I, 0, 17, 1))
            .await
    );
    assert!(
        room.validate_move(1, &move_of(PacketKind::RotatePiece, 1, Tetromino::I, 0, 17, 2))
            .await
    );
}

#[tokio::test]
async fn validate_move_sees_locked_cells() {
    let (room, _sender, _metrics) = create_test_room();
    fill_room(&room).await;

    let locked = Piece::from_move(&MoveData::new(Tetromino::O.tag(), 4, 18, 0)).unwrap();
    assert_eq!(room.apply_to_board(1, &locked).await, Some(Ok(())));

    let overlapping = move_of(PacketKind::MovePiece, 1, Tetromino::O, 5, 17, 0);
    assert!(!room.validate_move(1, &overlapping).await);

    // Boards are per player.
    let same_for_other = move_of(PacketKind::MovePiece, 2, Tetromino::O, 5, 17, 0);
    assert!(room.validate_move(2, &same_for_other).await);

    assert_eq!(room.apply_to_board(99, &locked).await, None);
    assert!(matches!(
        room.apply_to_board(1, &locked).await,
        Some(Err(PlacementError::Blocked { x: 4, y: 18 }))
    ));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Arbitrary add/remove sequences never push the room past capacity,
        // and a refused add leaves membership untouched.
        #[test]
        fn room_never_exceeds_capacity(
            ops in prop::collection::vec((any::<bool>(), 1u32..8), 0..40)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(async {
                let (room, _sender, _metrics) = create_test_room();
                for (add, id) in ops {
                    let before = room.list_players().await;
                    if add {
                        let player = Player::new(id, addr(43000 + id as u16));
                        let admitted = room.add_player(player).await;
                        if !admitted {
                            assert_eq!(room.list_players().await, before);
                        }
                    } else {
                        let was_present = before.iter().any(|p| p.id == id);
                        assert_eq!(room.remove_player(id).await, was_present);
                    }
                    assert!(room.len().await <= ROOM_CAPACITY);
                }
            });
        }
    }
}
