//! Tetromino definitions and shapes
//!
//! Every piece is one canonical 4x4 occupancy template. Rotated shapes are
//! never stored: a query at rotation `r` walks the lookup coordinates back
//! through `r` quarter turns and reads the canonical template.

use ratatui::style::Color;

/// Side length of the square template every piece is drawn in
pub const TEMPLATE_SIZE: usize = 4;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

type Template = [[u8; TEMPLATE_SIZE]; TEMPLATE_SIZE];

// Canonical templates, indexed like `TetrominoType::all()`.
const TEMPLATES: [Template; 7] = [
    // I
    [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]],
    // O
    [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    // T
    [[0, 0, 0, 0], [0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
    // S
    [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
    // Z
    [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    // J
    [[0, 0, 0, 0], [1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
    // L
    [[0, 0, 0, 0], [0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
];

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Cyan,
            TetrominoType::O => Color::Yellow,
            TetrominoType::T => Color::Magenta,
            TetrominoType::S => Color::Green,
            TetrominoType::Z => Color::Red,
            TetrominoType::J => Color::Blue,
            TetrominoType::L => Color::Rgb(255, 165, 0), // Orange
        }
    }

    /// Display symbol written into the grid when this piece is locked
    pub fn symbol(&self) -> char {
        match self {
            TetrominoType::I => 'I',
            TetrominoType::O => 'O',
            TetrominoType::T => 'T',
            TetrominoType::S => 'S',
            TetrominoType::Z => 'Z',
            TetrominoType::J => 'J',
            TetrominoType::L => 'L',
        }
    }

    /// All tetromino types, in template order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    fn index(&self) -> usize {
        match self {
            TetrominoType::I => 0,
            TetrominoType::O => 1,
            TetrominoType::T => 2,
            TetrominoType::S => 3,
            TetrominoType::Z => 4,
            TetrominoType::J => 5,
            TetrominoType::L => 6,
        }
    }

    /// The symbol at template cell (row, col) after `rotation`, or `None`
    /// when that cell is empty.
    ///
    /// `rotation` counts clockwise quarter turns and is taken modulo 4.
    /// Each turn maps the lookup coordinate `(r, c)` to `(3 - c, r)`, which
    /// turns the displayed shape 90 degrees clockwise. Out-of-template
    /// coordinates are always empty.
    pub fn cell(&self, rotation: u8, row: usize, col: usize) -> Option<char> {
        if row >= TEMPLATE_SIZE || col >= TEMPLATE_SIZE {
            return None;
        }

        let (mut r, mut c) = (row, col);
        for _ in 0..rotation % 4 {
            (r, c) = quarter_turn(r, c);
        }

        (TEMPLATES[self.index()][r][c] != 0).then(|| self.symbol())
    }

    /// Whether template cell (row, col) is filled at the given rotation
    pub fn occupies(&self, rotation: u8, row: usize, col: usize) -> bool {
        self.cell(rotation, row, col).is_some()
    }

    /// Occupied (row, col) template cells at a rotation, row-major order
    pub fn cells(&self, rotation: u8) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..TEMPLATE_SIZE)
            .flat_map(|row| (0..TEMPLATE_SIZE).map(move |col| (row, col)))
            .filter(move |&(row, col)| self.occupies(rotation, row, col))
    }
}

/// One clockwise quarter turn of a template lookup coordinate
fn quarter_turn(r: usize, c: usize) -> (usize, usize) {
    (TEMPLATE_SIZE - 1 - c, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(piece: TetrominoType, rotation: u8) -> [[bool; 4]; 4] {
        let mut out = [[false; 4]; 4];
        for (row, line) in out.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                *cell = piece.occupies(rotation, row, col);
            }
        }
        out
    }

    #[test]
    fn test_every_piece_has_four_cells() {
        for piece in TetrominoType::all() {
            for rotation in 0..4 {
                assert_eq!(piece.cells(rotation).count(), 4, "{:?} r{}", piece, rotation);
            }
        }
    }

    #[test]
    fn test_four_quarter_turns_return_every_coordinate() {
        for row in 0..TEMPLATE_SIZE {
            for col in 0..TEMPLATE_SIZE {
                let mut at = (row, col);
                for turn in 1..=4 {
                    at = quarter_turn(at.0, at.1);
                    if turn < 4 {
                        assert_ne!(at, (row, col), "({row}, {col}) back after {turn} turns");
                    }
                }
                assert_eq!(at, (row, col));
            }
        }
    }

    #[test]
    fn test_rotation_wraps_modulo_four() {
        for piece in TetrominoType::all() {
            for rotation in 0..4u8 {
                assert_eq!(pattern(piece, rotation), pattern(piece, rotation + 4));
            }
        }
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let base = pattern(TetrominoType::O, 0);
        for rotation in 1..4 {
            assert_eq!(pattern(TetrominoType::O, rotation), base);
        }
    }

    #[test]
    fn test_i_piece_turns_horizontal() {
        // Rotation 0 is the vertical bar in column 1
        assert!((0..4).all(|row| TetrominoType::I.occupies(0, row, 1)));
        // One clockwise turn lays it along row 1
        assert!((0..4).all(|col| TetrominoType::I.occupies(1, 1, col)));
        assert_eq!(TetrominoType::I.cells(1).filter(|&(row, _)| row != 1).count(), 0);
    }

    #[test]
    fn test_t_piece_clockwise_turn() {
        // ....      .T..
        // .T..  ->  .TT.    (pointing right after one clockwise turn)
        // TTT.      .T..
        // ....      ....
        let cells: Vec<_> = TetrominoType::T.cells(1).collect();
        assert_eq!(cells, vec![(0, 1), (1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_cell_symbol_and_empty() {
        assert_eq!(TetrominoType::L.cell(0, 1, 2), Some('L'));
        assert_eq!(TetrominoType::L.cell(0, 0, 0), None);
        assert_eq!(TetrominoType::L.cell(0, 4, 0), None);
    }

    #[test]
    fn test_template_order_matches_all() {
        for (i, piece) in TetrominoType::all().into_iter().enumerate() {
            assert_eq!(piece.index(), i);
        }
    }
}
