//! Playfield grid, line clearing and piece placement

use crate::piece::Piece;
use crate::tetromino::TetrominoType;
use std::fmt;

/// Standard playfield dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// A locked block of the given piece type
    Filled(TetrominoType),
    /// Landing projection of the current piece (display only)
    Ghost,
    /// Block already swept by the game-over animation
    Wreck,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Whether a falling piece collides with this cell. Ghost markers never block.
    pub fn blocks(&self) -> bool {
        matches!(self, Cell::Filled(_) | Cell::Wreck)
    }

    /// Single-character form used in logs
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Filled(kind) => kind.symbol(),
            Cell::Ghost => '.',
            Cell::Wreck => '#',
        }
    }
}

/// The game board
///
/// Row 0 is the top of the playfield and y grows downward. Pieces may hang
/// above row 0 while entering; those cells are simply not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: Vec<[Cell; BOARD_WIDTH]>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board of the standard size
    pub fn new() -> Self {
        Self::with_height(BOARD_HEIGHT)
    }

    /// Create an empty board with a custom number of rows
    pub fn with_height(height: usize) -> Self {
        Self {
            rows: vec![[Cell::Empty; BOARD_WIDTH]; height],
        }
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= BOARD_WIDTH || y >= self.height() {
            return None;
        }
        Some((x, y))
    }

    /// Get the cell at (x, y), or `None` outside the board
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|(x, y)| self.rows[y][x])
    }

    /// Set a cell at (x, y). Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.rows[y][x] = cell;
                true
            }
            None => false,
        }
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            *row = [Cell::Empty; BOARD_WIDTH];
        }
    }

    /// A row is full when none of its cells is empty
    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|cells| cells.iter().all(|cell| !cell.is_empty()))
    }

    /// Remove every full row, dropping the rows above into the gap.
    ///
    /// Surviving rows keep their relative order and settle at the bottom;
    /// the rows exposed at the top are empty. Returns the number removed.
    pub fn clear_full_lines(&mut self) -> usize {
        let height = self.height();
        let mut write_row = height;
        let mut lines_cleared = 0;

        for read_row in (0..height).rev() {
            if self.is_row_full(read_row) {
                lines_cleared += 1;
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.rows[write_row] = self.rows[read_row];
            }
        }

        for row in &mut self.rows[..write_row] {
            *row = [Cell::Empty; BOARD_WIDTH];
        }

        lines_cleared
    }

    /// Write the piece's cells into the grid as locked blocks
    pub fn commit(&mut self, piece: &Piece) {
        for (x, y) in piece.blocks() {
            self.set(x, y, Cell::Filled(piece.kind));
        }
    }

    /// Reset the piece's cells to empty
    #[allow(dead_code)]
    pub fn erase(&mut self, piece: &Piece) {
        for (x, y) in piece.blocks() {
            self.set(x, y, Cell::Empty);
        }
    }

    /// Like `commit`, but never overwrites a cell that is already occupied
    pub fn commit_if_empty(&mut self, piece: &Piece) {
        for (x, y) in piece.blocks() {
            if self.get(x, y).is_some_and(|cell| cell.is_empty()) {
                self.set(x, y, Cell::Filled(piece.kind));
            }
        }
    }

    /// Mark the empty cells under `ghost` with the ghost marker
    pub fn mark_ghost(&mut self, ghost: &Piece) {
        for (x, y) in ghost.blocks() {
            if self.get(x, y).is_some_and(|cell| cell.is_empty()) {
                self.set(x, y, Cell::Ghost);
            }
        }
    }

    /// Check if the board has no occupied cells
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().map(Cell::symbol).collect();
            writeln!(f, "|{}|", line)?;
        }
        Ok(())
    }
}

/// Frame-at-a-time game-over reveal.
///
/// Each `step` turns the next occupied cell into a wreck marker, sweeping
/// the bottom row first and moving upward, left to right within a row.
#[derive(Debug, Clone, Default)]
pub struct GameOverSweep {
    /// Rows already swept from the bottom
    rows_done: usize,
    col: usize,
}

impl GameOverSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the next occupied cell. Returns false once the board is swept.
    pub fn step(&mut self, board: &mut Board) -> bool {
        while self.rows_done < board.height() {
            let y = board.height() - 1 - self.rows_done;
            while self.col < BOARD_WIDTH {
                let x = self.col;
                self.col += 1;
                if !board.rows[y][x].is_empty() {
                    board.rows[y][x] = Cell::Wreck;
                    return true;
                }
            }
            self.rows_done += 1;
            self.col = 0;
        }
        false
    }
}
