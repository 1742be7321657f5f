//! Per-player game model: boards, pieces, and the legality checks the
//! relay runs before forwarding a piece action.
//!
//! # Module Structure
//!
//! - [`board`]: the 10x20 playfield and its snapshot encoding
//! - [`mask`]: rectangular cell masks and clockwise rotation
//! - [`piece`]: the tetromino catalogue and per-move pieces
//! - [`validation`]: placement and rotation checks

pub mod board;
pub mod mask;
pub mod piece;
pub mod validation;

pub use board::{Board, PlacementError, BOARD_HEIGHT, BOARD_SNAPSHOT_SIZE, BOARD_WIDTH};
pub use mask::{CellMask, MaskError};
pub use piece::{Piece, Tetromino};
pub use validation::{is_valid_placement, is_valid_rotation};
