use super::error::{IntegrityViolation, Rejection};
use super::terminal::{self, ConnectOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
/// Discs in a line needed to win
pub const CONNECT: usize = 4;

/// A player's disc. Player 1 is the first joiner and always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Disc {
    One,
    Two,
}

impl Disc {
    pub fn number(&self) -> u8 {
        match self {
            Disc::One => 1,
            Disc::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Disc::One),
            2 => Some(Disc::Two),
            _ => None,
        }
    }

    pub fn other(&self) -> Disc {
        match self {
            Disc::One => Disc::Two,
            Disc::Two => Disc::One,
        }
    }
}

impl From<Disc> for u8 {
    fn from(disc: Disc) -> Self {
        disc.number()
    }
}

impl TryFrom<u8> for Disc {
    type Error = IntegrityViolation;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Disc::from_number(n)
            .ok_or_else(|| IntegrityViolation::new(format!("Invalid player number {}", n)))
    }
}

impl fmt::Display for Disc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// 6x7 connect-four grid.
///
/// Row 0 is the top of the grid and row 5 the bottom, so discs settle at the
/// highest free row index of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<u8>>", try_from = "Vec<Vec<u8>>")]
pub struct Board {
    cells: [[Option<Disc>; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// Disc at (row, column); `None` for empty or out-of-range cells
    pub fn get(&self, row: usize, column: usize) -> Option<Disc> {
        if row >= ROWS || column >= COLS {
            return None;
        }
        self.cells[row][column]
    }

    /// Row a disc dropped into `column` would land in, or `None` if the column is full
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][column].is_none())
    }

    /// Drop a disc into `column`, returning the landing row
    pub fn drop_disc(&mut self, column: usize, disc: Disc) -> Result<usize, Rejection> {
        if column >= COLS {
            return Err(Rejection::ColumnOutOfRange {
                column,
                max: COLS - 1,
            });
        }

        let row = self
            .landing_row(column)
            .ok_or(Rejection::ColumnFull { column })?;
        self.cells[row][column] = Some(disc);
        Ok(row)
    }

    pub fn count(&self, disc: Disc) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell == Some(disc))
            .count()
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        (0..COLS).all(|column| self.cells[0][column].is_some())
    }

    /// Grid as rows of player numbers, 0 for empty
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.map_or(0, |d| d.number())).collect())
            .collect()
    }

    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, IntegrityViolation> {
        if rows.len() != ROWS {
            return Err(IntegrityViolation::new(format!(
                "Board has {} rows, expected {}",
                rows.len(),
                ROWS
            )));
        }

        let mut board = Board::new();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != COLS {
                return Err(IntegrityViolation::new(format!(
                    "Board row {} has {} columns, expected {}",
                    r,
                    row.len(),
                    COLS
                )));
            }
            for (c, value) in row.iter().enumerate() {
                board.cells[r][c] = match value {
                    0 => None,
                    n => Some(Disc::try_from(*n)?),
                };
            }
        }
        Ok(board)
    }

    /// First floating disc found (a disc with an empty cell beneath it)
    fn floating_disc(&self) -> Option<(usize, usize)> {
        for column in 0..COLS {
            for row in 0..ROWS - 1 {
                if self.cells[row][column].is_some() && self.cells[row + 1][column].is_none() {
                    return Some((row, column));
                }
            }
        }
        None
    }

    /// Render the board as plain text, one line per row
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        out.push_str(" 0 1 2 3 4 5 6\n");
        for row in &self.cells {
            out.push('|');
            for cell in row {
                out.push(match cell {
                    None => '.',
                    Some(Disc::One) => 'X',
                    Some(Disc::Two) => 'O',
                });
                out.push('|');
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board.to_rows()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Board {
    type Error = IntegrityViolation;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Board::from_rows(&rows)
    }
}

/// Where an accepted drop landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub disc: Disc,
}

/// Authoritative connect-four state for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectFourState {
    pub board: Board,
    pub current_turn: Disc,
    pub outcome: ConnectOutcome,
    /// User id of the winner, set together with `ConnectOutcome::Win`
    pub winner_id: Option<String>,
    pub move_count: u32,
}

impl ConnectFourState {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_turn: Disc::One,
            outcome: ConnectOutcome::Ongoing,
            winner_id: None,
            move_count: 0,
        }
    }

    /// Whether the game has reached a win or a draw
    pub fn is_decided(&self) -> bool {
        self.outcome != ConnectOutcome::Ongoing
    }

    /// Drop the current player's disc into `column` on behalf of `user_id`.
    ///
    /// The caller is expected to have run the validator; the board still
    /// refuses out-of-range and full columns on its own.
    pub fn play(&mut self, column: usize, user_id: &str) -> Result<Placement, Rejection> {
        if self.is_decided() {
            return Err(Rejection::GameAlreadyDecided);
        }

        let disc = self.current_turn;
        let row = self.board.drop_disc(column, disc)?;
        self.move_count += 1;
        self.outcome = terminal::connect_outcome(&self.board, row, column, disc);
        if let ConnectOutcome::Win(_) = self.outcome {
            self.winner_id = Some(user_id.to_string());
        }
        self.current_turn = disc.other();

        Ok(Placement { row, column, disc })
    }

    /// Reject states no sequence of accepted moves could produce
    pub fn check_integrity(&self) -> Result<(), IntegrityViolation> {
        let ones = self.board.count(Disc::One);
        let twos = self.board.count(Disc::Two);

        if ones < twos || ones - twos > 1 {
            return Err(IntegrityViolation::new(format!(
                "Disc counts out of balance: player 1 has {}, player 2 has {}",
                ones, twos
            )));
        }

        if ones + twos != self.move_count as usize {
            return Err(IntegrityViolation::new(format!(
                "Board holds {} discs but {} moves were recorded",
                ones + twos,
                self.move_count
            )));
        }

        let expected_turn = if ones == twos { Disc::One } else { Disc::Two };
        if self.current_turn != expected_turn {
            return Err(IntegrityViolation::new(format!(
                "{} is to move but the disc counts say {}",
                self.current_turn, expected_turn
            )));
        }

        if let Some((row, column)) = self.board.floating_disc() {
            return Err(IntegrityViolation::new(format!(
                "Disc at row {} column {} has nothing beneath it",
                row, column
            )));
        }

        let scanned = terminal::board_outcome(&self.board);
        if scanned != self.outcome {
            return Err(IntegrityViolation::new(format!(
                "Recorded outcome {:?} does not match the board ({:?})",
                self.outcome, scanned
            )));
        }

        match (&self.outcome, &self.winner_id) {
            (ConnectOutcome::Win(_), None) => {
                Err(IntegrityViolation::new("Game is won but no winner is recorded"))
            }
            (ConnectOutcome::Ongoing | ConnectOutcome::Draw, Some(winner)) => Err(
                IntegrityViolation::new(format!("Winner {} recorded without a win", winner)),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for ConnectFourState {
    fn default() -> Self {
        Self::new()
    }
}
