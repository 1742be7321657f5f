use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("cell mask must have at least one row and one column")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Rectangular occupancy mask of a piece, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl CellMask {
    /// Build a mask from rows of cells; any non-zero cell is occupied.
    pub fn from_rows<R, C>(rows: R) -> Result<Self, MaskError>
    where
        R: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let mut cells = Vec::new();
        let mut cols = None;
        let mut row_count = 0;

        for (row, values) in rows.into_iter().enumerate() {
            let values = values.as_ref();
            let expected = *cols.get_or_insert(values.len());
            if values.len() != expected {
                return Err(MaskError::Ragged {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend(values.iter().map(|cell| *cell != 0));
            row_count += 1;
        }

        match cols {
            Some(cols) if cols > 0 => Ok(Self {
                rows: row_count,
                cols,
                cells,
            }),
            _ => Err(MaskError::Empty),
        }
    }

    /// Row-major cells of a known-good rectangular shape.
    pub(crate) fn from_catalogue(cols: usize, cells: &[u8]) -> Self {
        debug_assert!(cols > 0 && !cells.is_empty() && cells.len() % cols == 0);
        Self {
            rows: cells.len() / cols,
            cols,
            cells: cells.iter().map(|cell| *cell != 0).collect(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// `(row, col)` of every occupied cell, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(index, _)| (index / self.cols, index % self.cols))
    }

    /// One clockwise quarter turn: `new[r][c] = old[rows - 1 - c][r]`.
    /// Width and height swap.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let rows = self.cols;
        let cols = self.rows;
        let mut cells = Vec::with_capacity(self.cells.len());
        for r in 0..rows {
            for c in 0..cols {
                cells.push(self.is_set(self.rows - 1 - c, r));
            }
        }
        Self { rows, cols, cells }
    }

    /// Rotate clockwise `steps.rem_euclid(4)` quarter turns.
    #[must_use]
    pub fn rotated(&self, steps: i32) -> Self {
        (0..steps.rem_euclid(4)).fold(self.clone(), |mask, _| mask.rotated_clockwise())
    }
}
