//! Server-side legality checks that gate MOVE/ROTATE/DROP relays.
//!
//! Both checks are pure: they read the board and never mutate it.

use super::board::{Board, BOARD_HEIGHT, BOARD_WIDTH};
use super::piece::Piece;

/// Absolute board coordinates of every occupied cell of `piece` anchored at
/// `(x, y)`. A cell whose coordinate overflows `i32` yields `None`.
pub(crate) fn cell_positions(
    piece: &Piece,
    x: i32,
    y: i32,
) -> impl Iterator<Item = Option<(i32, i32)>> + '_ {
    piece.mask.occupied().map(move |(row, col)| {
        let col = i32::try_from(col).ok()?;
        let row = i32::try_from(row).ok()?;
        Some((x.checked_add(col)?, y.checked_add(row)?))
    })
}

fn in_bounds(x: i32, y: i32) -> bool {
    usize::try_from(x).is_ok_and(|x| x < BOARD_WIDTH)
        && usize::try_from(y).is_ok_and(|y| y < BOARD_HEIGHT)
}

/// `true` only if every occupied cell of `piece` placed at `(x, y)` lies in
/// `[0, 10) x [0, 20)` and covers an empty board cell.
#[must_use]
pub fn is_valid_placement(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    cell_positions(piece, x, y).all(|position| {
        position.is_some_and(|(cx, cy)| in_bounds(cx, cy) && !board.is_occupied(cx, cy))
    })
}

/// Rotate the mask clockwise `rotation_steps mod 4` times and check the
/// result at the piece's original anchor. The anchor is not re-centred, so
/// a non-square piece can become invalid purely from its new bounding box.
#[must_use]
pub fn is_valid_rotation(board: &Board, piece: &Piece, rotation_steps: i32) -> bool {
    let rotated = Piece {
        mask: piece.mask.rotated(rotation_steps),
        ..piece.clone()
    };
    is_valid_placement(board, &rotated, piece.x, piece.y)
}
