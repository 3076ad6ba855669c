//! The tri-state cell matrix and the automaton step rule.
//!
//! Cells are addressed `(column, row)` with `0 <= column < width` and
//! `0 <= row < height`, stored column-major to match the wire snapshot
//! layout. The step rule is exposed as a pure function from the old grid
//! to a new one; callers that want flip-buffer reuse can swap the returned
//! value into place, but no intermediate state is ever observable.

use petri_types::CellState;

use crate::error::GridError;

/// The rectangular tri-state cell matrix.
///
/// Invariant: every column holds exactly `height` cells. The grid is owned
/// by exactly one replica and mutated only through [`resize`](Self::resize),
/// [`clear`](Self::clear), cell writes, and the step function.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Grid {
    /// Cell columns, each of length `height`.
    columns: Vec<Vec<CellState>>,
    /// Cached column length; kept explicitly so a zero-width grid still
    /// remembers its height.
    height: usize,
}

impl Grid {
    /// Create a grid of the given dimensions with every cell empty.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            columns: vec![vec![CellState::Empty; height]; width],
            height,
        }
    }

    /// Rebuild a grid from explicit columns.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RaggedSnapshot`] if the columns do not all have
    /// the same length.
    pub fn from_columns(columns: Vec<Vec<CellState>>) -> Result<Self, GridError> {
        let height = columns.first().map_or(0, Vec::len);
        for (index, column) in columns.iter().enumerate() {
            if column.len() != height {
                return Err(GridError::RaggedSnapshot {
                    column: index,
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, height })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Read the cell at `(col, row)`, or `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<CellState> {
        self.columns.get(col).and_then(|column| column.get(row)).copied()
    }

    /// Write the cell at `(col, row)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinates fall outside
    /// the grid; the grid is unchanged in that case.
    pub fn set_cell(&mut self, col: usize, row: usize, state: CellState) -> Result<(), GridError> {
        let (width, height) = (self.width(), self.height);
        let cell = self
            .columns
            .get_mut(col)
            .and_then(|column| column.get_mut(row))
            .ok_or(GridError::OutOfBounds {
                col: i64::try_from(col).unwrap_or(i64::MAX),
                row: i64::try_from(row).unwrap_or(i64::MAX),
                width,
                height,
            })?;
        *cell = state;
        Ok(())
    }

    /// Iterate over all columns.
    pub fn columns(&self) -> impl Iterator<Item = &[CellState]> {
        self.columns.iter().map(Vec::as_slice)
    }

    /// Number of currently alive cells.
    pub fn alive_count(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.iter().filter(|cell| cell.is_alive()).count())
            .sum()
    }

    /// Reset every cell to [`CellState::Empty`].
    ///
    /// Clearing removes history -- it is not "kill all life". A killed cell
    /// would be `Dead`; a cleared one never existed.
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.fill(CellState::Empty);
        }
    }

    /// Resize the grid in place.
    ///
    /// Growth keeps existing cells and fills new space with
    /// [`CellState::Empty`]; shrinking truncates columns and rows, and the
    /// truncated cells are permanently discarded (accepted data loss, not
    /// an error). Whether a resize is *allowed* is a replication-level
    /// question answered by the replica, not here.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        tracing::debug!(
            old_width = self.width(),
            old_height = self.height,
            new_width,
            new_height,
            "Resizing grid"
        );
        self.columns.resize_with(new_width, Vec::new);
        for column in &mut self.columns {
            column.resize(new_height, CellState::Empty);
        }
        self.height = new_height;
    }

    /// Apply one step of the automaton rule, returning the next grid.
    ///
    /// For each cell, live neighbors are counted over the 8-connected
    /// neighborhood, clipped at the boundary (no wraparound). A cell is
    /// alive next step iff it is alive with 2 or 3 live neighbors, or not
    /// alive with exactly 3. Cells that do not come alive keep the
    /// empty/dead distinction: `Empty` stays `Empty`, anything else
    /// becomes `Dead`.
    ///
    /// This is a pure function of the full previous grid; the new grid is
    /// built from a consistent snapshot of the old one.
    pub fn step(&self) -> Self {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(row, &state)| next_state(state, self.live_neighbors(col, row)))
                    .collect()
            })
            .collect();
        Self {
            columns,
            height: self.height,
        }
    }

    /// Count the live cells in the 8-connected neighborhood of `(col, row)`,
    /// clipped at the grid boundary.
    fn live_neighbors(&self, col: usize, row: usize) -> u8 {
        let mut count: u8 = 0;
        for col_offset in [-1_isize, 0, 1] {
            for row_offset in [-1_isize, 0, 1] {
                if col_offset == 0 && row_offset == 0 {
                    continue;
                }
                let Some(neighbor_col) = col.checked_add_signed(col_offset) else {
                    continue;
                };
                let Some(neighbor_row) = row.checked_add_signed(row_offset) else {
                    continue;
                };
                if self
                    .cell(neighbor_col, neighbor_row)
                    .is_some_and(CellState::is_alive)
                {
                    count = count.saturating_add(1);
                }
            }
        }
        count
    }
}

/// The automaton transition for a single cell.
const fn next_state(state: CellState, live_neighbors: u8) -> CellState {
    let alive = state.is_alive();
    if (alive && (live_neighbors == 2 || live_neighbors == 3)) || (!alive && live_neighbors == 3) {
        CellState::Alive
    } else if matches!(state, CellState::Empty) {
        CellState::Empty
    } else {
        CellState::Dead
    }
}
