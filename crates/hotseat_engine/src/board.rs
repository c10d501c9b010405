//! 3x3 board with signed line-sum scanning.

use crate::types::{Piece, Seat};
use serde::{Deserialize, Serialize};

/// Line sum that means seat A owns all three cells.
const A_WINS: i8 = -3;
/// Line sum that means seat B owns all three cells.
const B_WINS: i8 = 3;

/// Fixed 3x3 grid of pieces.
///
/// Cells are addressed as (`x`, `y`) where `y` selects the row and
/// `x` the column. Once occupied, a cell only empties again when the
/// whole board is replaced at a round boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Piece; 3]; 3],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Piece at (`x`, `y`), or `None` when out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<Piece> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Writes a piece at (`x`, `y`). Callers validate bounds first.
    pub(crate) fn place(&mut self, x: usize, y: usize, piece: Piece) {
        self.cells[y][x] = piece;
    }

    /// First empty cell, scanning rows top to bottom and cells left to
    /// right within each row. This fixed order is what the watchdog
    /// uses for automatic moves.
    pub fn first_empty(&self) -> Option<(usize, usize)> {
        for (y, row) in self.cells.iter().enumerate() {
            for (x, piece) in row.iter().enumerate() {
                if *piece == Piece::Empty {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Sums every row, column, and diagonal in one pass.
    ///
    /// A line summing to -3 belongs entirely to seat A, +3 to seat B.
    /// Rows are checked before columns and columns before diagonals,
    /// and the pass also counts occupied cells so a full board can be
    /// told apart from one still in play.
    pub fn scan(&self) -> LineScan {
        let mut filled = 0;
        let mut row_sums = [0i8; 3];
        let mut col_sums = [0i8; 3];

        for (y, row) in self.cells.iter().enumerate() {
            for (x, piece) in row.iter().enumerate() {
                if *piece != Piece::Empty {
                    filled += 1;
                }
                row_sums[y] += piece.weight();
                col_sums[x] += piece.weight();
            }
        }

        let diagonals = [
            self.cells[0][0].weight() + self.cells[1][1].weight() + self.cells[2][2].weight(),
            self.cells[2][0].weight() + self.cells[1][1].weight() + self.cells[0][2].weight(),
        ];

        let winner = row_sums
            .iter()
            .chain(col_sums.iter())
            .chain(diagonals.iter())
            .find_map(|sum| winning_sum(*sum));

        LineScan { winner, filled }
    }
}

/// Maps a completed line sum to the seat that owns it.
fn winning_sum(sum: i8) -> Option<Seat> {
    match sum {
        A_WINS => Some(Seat::A),
        B_WINS => Some(Seat::B),
        _ => None,
    }
}

/// Outcome of one full pass over the board's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineScan {
    /// Seat owning a completed line, if any.
    pub winner: Option<Seat>,
    /// Number of occupied cells.
    pub filled: u8,
}

impl LineScan {
    /// True when every cell is occupied.
    pub fn is_full(self) -> bool {
        self.filled == 9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from_rows(rows: [[i8; 3]; 3]) -> Board {
        let mut board = Board::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, weight) in row.iter().enumerate() {
                board.place(x, y, Piece::try_from(*weight).unwrap());
            }
        }
        board
    }

    #[test]
    fn test_empty_board_scan() {
        let scan = Board::new().scan();
        assert_eq!(scan.winner, None);
        assert_eq!(scan.filled, 0);
        assert!(!scan.is_full());
    }

    #[test]
    fn test_row_win_detected_for_each_row() {
        for y in 0..3 {
            let mut board = Board::new();
            for x in 0..3 {
                board.place(x, y, Piece::MarkA);
            }
            assert_eq!(board.scan().winner, Some(Seat::A), "row {}", y);
        }
    }

    #[test]
    fn test_column_win_detected_for_each_column() {
        for x in 0..3 {
            let mut board = Board::new();
            for y in 0..3 {
                board.place(x, y, Piece::MarkB);
            }
            assert_eq!(board.scan().winner, Some(Seat::B), "column {}", x);
        }
    }

    #[test]
    fn test_diagonal_wins() {
        let main = board_from_rows([[-1, 0, 0], [0, -1, 0], [0, 0, -1]]);
        assert_eq!(main.scan().winner, Some(Seat::A));

        let anti = board_from_rows([[0, 0, 1], [0, 1, 0], [1, 0, 0]]);
        assert_eq!(anti.scan().winner, Some(Seat::B));
    }

    #[test]
    fn test_win_in_second_row_not_masked_by_first() {
        // The first row cancels to +1; only the second row's own sum
        // may decide the winner.
        let board = board_from_rows([[1, 1, -1], [-1, -1, -1], [0, 1, 0]]);
        assert_eq!(board.scan().winner, Some(Seat::A));
    }

    #[test]
    fn test_full_board_without_line_is_not_a_win() {
        let board = board_from_rows([[-1, 1, -1], [-1, 1, 1], [1, -1, 1]]);
        let scan = board.scan();
        assert_eq!(scan.winner, None);
        assert_eq!(scan.filled, 9);
        assert!(scan.is_full());
    }

    #[test]
    fn test_partial_board_counts_filled_cells() {
        let board = board_from_rows([[-1, 1, 0], [0, -1, 0], [0, 0, 0]]);
        let scan = board.scan();
        assert_eq!(scan.winner, None);
        assert_eq!(scan.filled, 3);
    }

    #[test]
    fn test_first_empty_scans_left_to_right_top_to_bottom() {
        let mut board = Board::new();
        assert_eq!(board.first_empty(), Some((0, 0)));

        board.place(0, 0, Piece::MarkA);
        assert_eq!(board.first_empty(), Some((1, 0)));

        board.place(1, 0, Piece::MarkB);
        board.place(2, 0, Piece::MarkA);
        assert_eq!(board.first_empty(), Some((0, 1)));
    }

    #[test]
    fn test_first_empty_on_full_board() {
        let board = board_from_rows([[-1, 1, -1], [-1, 1, 1], [1, -1, 1]]);
        assert_eq!(board.first_empty(), None);
    }

    #[test]
    fn test_get_out_of_range() {
        let board = Board::new();
        assert_eq!(board.get(3, 0), None);
        assert_eq!(board.get(0, 3), None);
        assert_eq!(board.get(0, 0), Some(Piece::Empty));
    }

    #[test]
    fn test_board_serializes_as_weight_grid() {
        let mut board = Board::new();
        board.place(0, 0, Piece::MarkA);
        board.place(1, 2, Piece::MarkB);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[[-1,0,0],[0,0,0],[0,1,0]]");

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }
}
