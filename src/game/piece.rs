use crate::protocol::MoveData;

use super::mask::CellMask;

/// The seven standard tetrominoes, tagged 1..=7 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tetromino {
    I = 1,
    J = 2,
    L = 3,
    O = 4,
    S = 5,
    T = 6,
    Z = 7,
}

impl Tetromino {
    pub const ALL: [Self; 7] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    #[must_use]
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|piece| piece.tag() == tag)
    }

    #[must_use]
    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Spawn orientation as drawn by the game client.
    #[must_use]
    pub fn mask(self) -> CellMask {
        let (cols, cells): (usize, &[u8]) = match self {
            Self::I => (4, &[1, 1, 1, 1]),
            Self::J => (3, &[1, 0, 0, 1, 1, 1]),
            Self::L => (3, &[0, 0, 1, 1, 1, 1]),
            Self::O => (2, &[1, 1, 1, 1]),
            Self::S => (3, &[0, 1, 1, 1, 1, 0]),
            Self::T => (3, &[0, 1, 0, 1, 1, 1]),
            Self::Z => (3, &[1, 1, 0, 0, 1, 1]),
        };
        CellMask::from_catalogue(cols, cells)
    }
}

/// A piece as submitted in one move attempt: shape, type tag and anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: i32,
    pub mask: CellMask,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    #[must_use]
    pub fn new(kind: i32, mask: CellMask, x: i32, y: i32) -> Self {
        Self { kind, mask, x, y }
    }

    /// Build the piece described by a move payload. `None` for an unknown
    /// piece type.
    #[must_use]
    pub fn from_move(data: &MoveData) -> Option<Self> {
        let tetromino = Tetromino::from_tag(data.piece_type)?;
        Some(Self::new(tetromino.tag(), tetromino.mask(), data.x, data.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for piece in Tetromino::ALL {
            assert_eq!(Tetromino::from_tag(piece.tag()), Some(piece));
        }
        assert_eq!(Tetromino::from_tag(0), None);
        assert_eq!(Tetromino::from_tag(8), None);
        assert_eq!(Tetromino::from_tag(-3), None);
    }

    #[test]
    fn test_every_tetromino_has_four_cells() {
        for piece in Tetromino::ALL {
            assert_eq!(piece.mask().occupied().count(), 4, "{piece:?}");
        }
    }

    #[test]
    fn test_from_move_uses_anchor() {
        let piece = Piece::from_move(&MoveData::new(4, 3, 7, 0)).unwrap();
        assert_eq!(piece.kind, 4);
        assert_eq!((piece.x, piece.y), (3, 7));
        assert_eq!(piece.mask, Tetromino::O.mask());

        assert!(Piece::from_move(&MoveData::new(99, 0, 0, 0)).is_none());
    }
}
