//! Lossless symbol-matrix codec for grid snapshots.
//!
//! A snapshot is a column-major matrix of the symbols `"true"`, `"false"`,
//! and `"undefined"`, one per cell. The alphabet is part of the replication
//! contract: every replica must round-trip all three states without
//! collapsing empty into dead.

use petri_types::CellState;

use crate::error::GridError;
use crate::grid::Grid;

/// Encode a grid into its column-major symbol matrix.
#[must_use]
pub fn encode(grid: &Grid) -> Vec<Vec<String>> {
    grid.columns()
        .map(|column| column.iter().map(|cell| cell.symbol().to_owned()).collect())
        .collect()
}

/// Decode a symbol matrix back into a grid.
///
/// # Errors
///
/// Returns [`GridError::UnknownSymbol`] for any symbol outside the
/// `true`/`false`/`undefined` alphabet, or [`GridError::RaggedSnapshot`]
/// when columns disagree on length.
pub fn decode(snapshot: &[Vec<String>]) -> Result<Grid, GridError> {
    let mut columns = Vec::with_capacity(snapshot.len());
    for column in snapshot {
        let mut cells = Vec::with_capacity(column.len());
        for symbol in column {
            let cell = CellState::from_symbol(symbol).ok_or_else(|| GridError::UnknownSymbol {
                symbol: symbol.clone(),
            })?;
            cells.push(cell);
        }
        columns.push(cells);
    }
    Grid::from_columns(columns)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_preserves_all_three_states() {
        let mut grid = Grid::new(2, 2);
        grid.set_cell(0, 0, CellState::Alive).unwrap();
        grid.set_cell(1, 1, CellState::Dead).unwrap();

        let snapshot = encode(&grid);
        assert_eq!(
            snapshot,
            vec![
                vec!["true".to_owned(), "undefined".to_owned()],
                vec!["undefined".to_owned(), "false".to_owned()],
            ]
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let mut grid = Grid::new(4, 3);
        grid.set_cell(0, 0, CellState::Alive).unwrap();
        grid.set_cell(2, 1, CellState::Dead).unwrap();
        grid.set_cell(3, 2, CellState::Alive).unwrap();

        let decoded = decode(&encode(&grid)).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn decode_rejects_unknown_symbols() {
        let snapshot = vec![vec!["true".to_owned(), "maybe".to_owned()]];
        let result = decode(&snapshot);
        assert!(matches!(
            result,
            Err(GridError::UnknownSymbol { symbol }) if symbol == "maybe"
        ));
    }

    #[test]
    fn decode_rejects_ragged_columns() {
        let snapshot = vec![
            vec!["undefined".to_owned(), "undefined".to_owned()],
            vec!["undefined".to_owned()],
        ];
        let result = decode(&snapshot);
        assert!(matches!(
            result,
            Err(GridError::RaggedSnapshot {
                column: 1,
                expected: 2,
                actual: 1,
            })
        ));
    }

    #[test]
    fn empty_snapshot_decodes_to_zero_sized_grid() {
        let decoded = decode(&[]).unwrap();
        assert_eq!(decoded.width(), 0);
        assert_eq!(decoded.height(), 0);
    }
}
