use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::piece::Piece;
use super::validation::{cell_positions, is_valid_placement};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// Bytes produced by [`Board::snapshot`]: one `i32` per cell.
pub const BOARD_SNAPSHOT_SIZE: usize = BOARD_WIDTH * BOARD_HEIGHT * 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("piece at ({x}, {y}) is out of bounds or overlaps occupied cells")]
    Blocked { x: i32, y: i32 },
    #[error("board snapshot has {len} bytes, expected {BOARD_SNAPSHOT_SIZE}")]
    SnapshotSize { len: usize },
}

/// A player's 10x20 playfield. `0` is empty; any other value is the type
/// tag of the piece that filled the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[i32; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[0; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Cell value at `(x, y)`; `None` when outside the board.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<i32> {
        let col = usize::try_from(x).ok()?;
        let row = usize::try_from(y).ok()?;
        self.cells.get(row)?.get(col).copied()
    }

    /// `true` for a filled in-bounds cell.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(|value| value != 0)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| **cell != 0).count()
    }

    /// Lock `piece` into the grid at its anchor. The board is untouched
    /// unless the placement is valid.
    pub fn apply(&mut self, piece: &Piece) -> Result<(), PlacementError> {
        if !is_valid_placement(self, piece, piece.x, piece.y) {
            return Err(PlacementError::Blocked {
                x: piece.x,
                y: piece.y,
            });
        }

        let value = if piece.kind == 0 { 1 } else { piece.kind };
        for (x, y) in cell_positions(piece, piece.x, piece.y).flatten() {
            if let Some(cell) = self.cell_mut(x, y) {
                *cell = value;
            }
        }
        Ok(())
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut i32> {
        let col = usize::try_from(x).ok()?;
        let row = usize::try_from(y).ok()?;
        self.cells.get_mut(row)?.get_mut(col)
    }

    /// Encode as the BOARD_UPDATE payload the game client sends:
    /// row-major native-endian `i32` cells.
    #[must_use]
    pub fn snapshot(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(BOARD_SNAPSHOT_SIZE);
        for cell in self.cells.iter().flatten() {
            buf.put_i32_ne(*cell);
        }
        buf.freeze()
    }

    /// Decode a snapshot. Trailing bytes (e.g. the rest of a BOARD_UPDATE
    /// payload) are ignored.
    pub fn from_snapshot(data: &[u8]) -> Result<Self, PlacementError> {
        if data.len() < BOARD_SNAPSHOT_SIZE {
            return Err(PlacementError::SnapshotSize { len: data.len() });
        }

        let mut cursor = &data[..BOARD_SNAPSHOT_SIZE];
        let mut board = Self::new();
        for cell in board.cells.iter_mut().flatten() {
            *cell = cursor.get_i32_ne();
        }
        Ok(board)
    }
}
