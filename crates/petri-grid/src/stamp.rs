//! Pattern stamping: anchored application of a stamp shape to the grid.
//!
//! The anchor addresses the pattern's geometric center, computed as
//! `floor(width / 2)`, `floor(height / 2)` relative to the pattern's
//! top-left indexing. Odd-sized patterns center exactly; even-sized
//! patterns bias toward the lower/left cell. This asymmetry is a fixed,
//! tested convention that matches the historical stamped-pattern visuals.
//!
//! Stamping is atomic: the full footprint is validated before any cell is
//! written, so a rejected stamp leaves the grid untouched.

use petri_types::{CellState, Pattern, StampMode};

use crate::error::GridError;
use crate::grid::Grid;

/// Compute the grid cells covered by the pattern's set entries.
///
/// The cell for pattern entry `(x, y)` is
/// `(anchor_col + x - floor(w / 2), anchor_row - y + floor(h / 2))`;
/// the row offset is inverted because pattern rows run top-to-bottom
/// while grid rows run bottom-to-top.
///
/// # Errors
///
/// Returns [`GridError::OutOfBounds`] naming the first covered cell that
/// falls outside the grid.
pub fn stamp_footprint(
    grid: &Grid,
    pattern: &Pattern,
    anchor_col: usize,
    anchor_row: usize,
) -> Result<Vec<(usize, usize)>, GridError> {
    let (width, height) = (grid.width(), grid.height());
    let col_shift = to_signed(pattern.width() / 2);
    let row_shift = to_signed(pattern.height() / 2);

    let mut footprint = Vec::with_capacity(pattern.set_count());
    for y in 0..pattern.height() {
        for x in 0..pattern.width() {
            if !pattern.is_set(x, y) {
                continue;
            }
            let col = to_signed(anchor_col)
                .checked_add(to_signed(x))
                .and_then(|value| value.checked_sub(col_shift));
            let row = to_signed(anchor_row)
                .checked_sub(to_signed(y))
                .and_then(|value| value.checked_add(row_shift));
            let (Some(col), Some(row)) = (col, row) else {
                return Err(GridError::OutOfBounds {
                    col: i64::MAX,
                    row: i64::MAX,
                    width,
                    height,
                });
            };

            let col_index = usize::try_from(col).ok().filter(|&c| c < width);
            let row_index = usize::try_from(row).ok().filter(|&r| r < height);
            let (Some(col_index), Some(row_index)) = (col_index, row_index) else {
                return Err(GridError::OutOfBounds {
                    col,
                    row,
                    width,
                    height,
                });
            };
            footprint.push((col_index, row_index));
        }
    }
    Ok(footprint)
}

/// Stamp a pattern onto the grid at the given anchor.
///
/// Only the pattern's set entries write cells; unset entries are no-ops,
/// never erasures. `Set` writes the given liveness explicitly; `Toggle`
/// flips alive cells to dead and anything else to alive.
///
/// # Errors
///
/// Returns [`GridError::OutOfBounds`] if any covered cell lies outside the
/// grid; no cell is modified in that case.
pub fn apply_stamp(
    grid: &mut Grid,
    pattern: &Pattern,
    anchor_col: usize,
    anchor_row: usize,
    mode: StampMode,
) -> Result<(), GridError> {
    let footprint = stamp_footprint(grid, pattern, anchor_col, anchor_row)?;
    for (col, row) in footprint {
        let current = grid.cell(col, row).unwrap_or(CellState::Empty);
        let next = match mode {
            StampMode::Set(true) => CellState::Alive,
            StampMode::Set(false) => CellState::Dead,
            StampMode::Toggle => {
                if current.is_alive() {
                    CellState::Dead
                } else {
                    CellState::Alive
                }
            }
        };
        grid.set_cell(col, row, next)?;
    }
    Ok(())
}

/// Convert a small index to signed arithmetic space.
fn to_signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn single() -> Pattern {
        Pattern::from_art(&["X"])
    }

    #[test]
    fn single_cell_lands_on_the_anchor() {
        let mut grid = Grid::new(5, 5);
        apply_stamp(&mut grid, &single(), 2, 3, StampMode::Set(true)).unwrap();
        assert_eq!(grid.cell(2, 3), Some(CellState::Alive));
        assert_eq!(grid.alive_count(), 1);
    }

    #[test]
    fn odd_pattern_centers_exactly() {
        // 3x3 solid block anchored at (2, 2) covers (1..=3, 1..=3).
        let mut grid = Grid::new(5, 5);
        let block = Pattern::from_art(&["XXX", "XXX", "XXX"]);
        apply_stamp(&mut grid, &block, 2, 2, StampMode::Set(true)).unwrap();

        for col in 1..=3 {
            for row in 1..=3 {
                assert_eq!(grid.cell(col, row), Some(CellState::Alive));
            }
        }
        assert_eq!(grid.alive_count(), 9);
    }

    #[test]
    fn even_pattern_biases_lower_left() {
        // 2x2 block anchored at (2, 2): columns 1..=2, rows 2..=3.
        // Column bias is toward the left (anchor_col - 1), row bias toward
        // the upper offset of the inverted row axis (anchor_row + 1).
        let mut grid = Grid::new(5, 5);
        let block = Pattern::from_art(&["XX", "XX"]);
        apply_stamp(&mut grid, &block, 2, 2, StampMode::Set(true)).unwrap();

        let mut covered = Vec::new();
        for col in 0..5 {
            for row in 0..5 {
                if grid.cell(col, row) == Some(CellState::Alive) {
                    covered.push((col, row));
                }
            }
        }
        assert_eq!(covered, vec![(1, 2), (1, 3), (2, 2), (2, 3)]);
    }

    #[test]
    fn out_of_bounds_stamp_leaves_grid_unmodified() {
        let mut grid = Grid::new(4, 4);
        grid.set_cell(0, 0, CellState::Alive).unwrap();
        let before = grid.clone();

        let block = Pattern::from_art(&["XXX", "XXX", "XXX"]);
        // Anchored at the edge, the block would cover column -1.
        let result = apply_stamp(&mut grid, &block, 0, 2, StampMode::Set(true));
        assert!(matches!(result, Err(GridError::OutOfBounds { col: -1, .. })));
        assert_eq!(grid, before);
    }

    #[test]
    fn stamp_past_the_top_edge_is_rejected() {
        let mut grid = Grid::new(4, 4);
        let bar = Pattern::from_art(&["X", "X", "X"]);
        // Anchored one row below the top, the bar's head lands on row 4.
        let result = apply_stamp(&mut grid, &bar, 2, 3, StampMode::Set(true));
        assert!(matches!(result, Err(GridError::OutOfBounds { row: 4, .. })));
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn unset_entries_do_not_erase() {
        let mut grid = Grid::new(5, 5);
        grid.set_cell(1, 2, CellState::Alive).unwrap();

        // Plus-shaped stamp whose corners are unset.
        let plus = Pattern::from_art(&[".X.", "XXX", ".X."]);
        apply_stamp(&mut grid, &plus, 2, 2, StampMode::Set(false)).unwrap();

        // (1, 2) is covered by a set entry and becomes Dead...
        assert_eq!(grid.cell(1, 2), Some(CellState::Dead));
        // ...but the unset corner over (1, 3) never touched that cell.
        assert_eq!(grid.cell(1, 3), Some(CellState::Empty));
    }

    #[test]
    fn toggle_flips_alive_and_revives_everything_else() {
        let mut grid = Grid::new(3, 3);
        grid.set_cell(1, 1, CellState::Alive).unwrap();
        grid.set_cell(0, 1, CellState::Dead).unwrap();

        let bar = Pattern::from_art(&["XXX"]);
        apply_stamp(&mut grid, &bar, 1, 1, StampMode::Toggle).unwrap();

        assert_eq!(grid.cell(1, 1), Some(CellState::Dead));
        assert_eq!(grid.cell(0, 1), Some(CellState::Alive));
        assert_eq!(grid.cell(2, 1), Some(CellState::Alive));
    }

    #[test]
    fn toggling_twice_restores_liveness() {
        let mut grid = Grid::new(3, 3);
        let bar = Pattern::from_art(&["XXX"]);
        apply_stamp(&mut grid, &bar, 1, 1, StampMode::Toggle).unwrap();
        apply_stamp(&mut grid, &bar, 1, 1, StampMode::Toggle).unwrap();
        // Cells that were Empty are now Dead: they lived once.
        assert_eq!(grid.cell(1, 1), Some(CellState::Dead));
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn footprint_covers_only_set_entries() {
        let grid = Grid::new(5, 5);
        let glider = Pattern::from_art(&[".X.", "..X", "XXX"]);
        let footprint = stamp_footprint(&grid, &glider, 2, 2).unwrap();
        assert_eq!(footprint.len(), glider.set_count());
    }
}
