//! Active falling piece logic
//!
//! A pose is legal when every occupied template cell lands inside the side
//! walls, above the floor, and on a cell that does not block. Cells above
//! row 0 are allowed so pieces can enter the field from the top.

use crate::board::{Board, BOARD_WIDTH};
use crate::kicks::WALL_KICKS;
use crate::tetromino::{TetrominoType, TEMPLATE_SIZE};

/// Anchor row a fresh piece spawns on (one row above the visible field)
pub const SPAWN_Y: i32 = -1;

/// A piece instance on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub kind: TetrominoType,
    /// Clockwise quarter turns, 0..4
    pub rotation: u8,
    /// Board column of the template's left edge
    pub x: i32,
    /// Board row of the template's top edge
    pub y: i32,
}

impl Piece {
    /// A piece at the spawn pose: rotation 0, horizontally centered
    pub fn spawn(kind: TetrominoType) -> Self {
        let x = (BOARD_WIDTH / 2) as i32 - (TEMPLATE_SIZE / 2) as i32;
        Self::at(kind, 0, x, SPAWN_Y)
    }

    /// A piece at an explicit pose
    pub fn at(kind: TetrominoType, rotation: u8, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation: rotation % 4,
            x,
            y,
        }
    }

    /// Absolute (x, y) board coordinates of the four blocks
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.kind
            .cells(self.rotation)
            .map(|(row, col)| (self.x + col as i32, self.y + row as i32))
    }

    /// Whether the piece has fully entered the field
    pub fn has_entered(&self) -> bool {
        self.y >= 0
    }

    /// Legality test for this exact pose
    pub fn fits(&self, board: &Board) -> bool {
        self.blocks().all(|(x, y)| {
            if x < 0 || x >= board.width() as i32 || y >= board.height() as i32 {
                return false;
            }
            // Above the top edge nothing can block
            y < 0 || board.get(x, y).is_some_and(|cell| !cell.blocks())
        })
    }

    /// Whether the piece may appear here at all
    pub fn can_spawn(&self, board: &Board) -> bool {
        self.fits(board)
    }

    /// Whether the piece could be shifted by (dx, dy) with a new rotation
    pub fn can_move(&self, board: &Board, dx: i32, dy: i32, rotation: u8) -> bool {
        Piece::at(self.kind, rotation, self.x + dx, self.y + dy).fits(board)
    }

    /// Try to shift the piece, returns true if successful
    pub fn shift(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        if self.can_move(board, dx, dy, self.rotation) {
            self.x += dx;
            self.y += dy;
            true
        } else {
            false
        }
    }

    /// Try to move left, returns true if successful
    pub fn move_left(&mut self, board: &Board) -> bool {
        self.shift(board, -1, 0)
    }

    /// Try to move right, returns true if successful
    pub fn move_right(&mut self, board: &Board) -> bool {
        self.shift(board, 1, 0)
    }

    /// Try to move down, returns true if successful
    pub fn move_down(&mut self, board: &Board) -> bool {
        self.shift(board, 0, 1)
    }

    /// Rotate one step clockwise, trying each wall kick in order.
    ///
    /// Returns false and leaves the piece untouched when no kick fits.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let new_rotation = (self.rotation + 1) % 4;

        for dx in WALL_KICKS {
            if self.can_move(board, dx, 0, new_rotation) {
                self.x += dx;
                self.rotation = new_rotation;
                return true;
            }
        }

        false
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let mut distance = 0;
        while self.move_down(board) {
            distance += 1;
        }
        distance
    }

    /// Where the piece would land if dropped straight down
    pub fn ghost(&self, board: &Board) -> Piece {
        let mut ghost = *self;
        while ghost.can_move(board, 0, 1, ghost.rotation) {
            ghost.y += 1;
        }
        ghost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, BOARD_HEIGHT};

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(TetrominoType::T);
        assert_eq!(piece.x, 3);
        assert_eq!(piece.y, -1);
        assert_eq!(piece.rotation, 0);
        assert!(!piece.has_entered());
    }

    #[test]
    fn test_every_piece_can_spawn_on_empty_board() {
        let board = Board::new();
        for kind in TetrominoType::all() {
            assert!(Piece::spawn(kind).can_spawn(&board), "{:?}", kind);
        }
    }

    #[test]
    fn test_spawn_blocked_by_stack() {
        let mut board = Board::new();
        board.set(4, 1, Cell::Filled(TetrominoType::Z));
        assert!(!Piece::spawn(TetrominoType::O).can_spawn(&board));
    }

    #[test]
    fn test_walls_and_floor() {
        let board = Board::new();
        // Vertical I sits in template column 1
        assert!(Piece::at(TetrominoType::I, 0, -1, 0).fits(&board));
        assert!(!Piece::at(TetrominoType::I, 0, -2, 0).fits(&board));
        assert!(Piece::at(TetrominoType::I, 0, 8, 0).fits(&board));
        assert!(!Piece::at(TetrominoType::I, 0, 9, 0).fits(&board));
        assert!(Piece::at(TetrominoType::I, 0, 0, BOARD_HEIGHT as i32 - 4).fits(&board));
        assert!(!Piece::at(TetrominoType::I, 0, 0, BOARD_HEIGHT as i32 - 3).fits(&board));
    }

    #[test]
    fn test_cells_above_top_are_legal() {
        let board = Board::new();
        assert!(Piece::at(TetrominoType::I, 0, 0, -3).fits(&board));
    }

    #[test]
    fn test_ghost_cells_do_not_block() {
        let mut board = Board::new();
        board.set(4, 5, Cell::Ghost);
        assert!(Piece::at(TetrominoType::O, 0, 3, 4).fits(&board));
        board.set(4, 5, Cell::Wreck);
        assert!(!Piece::at(TetrominoType::O, 0, 3, 4).fits(&board));
    }

    #[test]
    fn test_move_down_and_left() {
        let board = Board::new();
        let mut piece = Piece::spawn(TetrominoType::T);
        assert!(piece.move_down(&board));
        assert_eq!(piece.y, 0);
        assert!(piece.move_left(&board));
        assert_eq!(piece.x, 2);
    }

    #[test]
    fn test_move_blocked_leaves_piece() {
        let board = Board::new();
        let mut piece = Piece::at(TetrominoType::I, 0, -1, 0);
        assert!(!piece.move_left(&board));
        assert_eq!(piece, Piece::at(TetrominoType::I, 0, -1, 0));
    }

    #[test]
    fn test_rotate_without_kick() {
        let board = Board::new();
        let mut piece = Piece::at(TetrominoType::T, 0, 3, 5);
        assert!(piece.rotate(&board));
        assert_eq!((piece.x, piece.rotation), (3, 1));
    }

    #[test]
    fn test_four_rotations_restore_blocks() {
        let board = Board::new();
        for kind in TetrominoType::all() {
            let start = Piece::at(kind, 0, 3, 8);
            let start_blocks: Vec<_> = start.blocks().collect();

            let mut piece = start;
            for turn in 1..=4 {
                assert!(piece.rotate(&board), "{:?} turn {}", kind, turn);
                assert_eq!(piece.x, start.x, "{:?} kicked in open space", kind);
            }

            assert_eq!(piece, start);
            assert_eq!(piece.blocks().collect::<Vec<_>>(), start_blocks, "{:?}", kind);
        }
    }

    #[test]
    fn test_rotate_left_kick_beats_right_kick() {
        let mut board = Board::new();
        // Turned T at x = 3 covers (4,5) (4,6) (5,6) (4,7); block its top
        board.set(4, 5, Cell::Filled(TetrominoType::Z));
        let mut piece = Piece::at(TetrominoType::T, 0, 3, 5);

        // Both one-column kicks are legal
        assert!(piece.can_move(&board, -1, 0, 1));
        assert!(piece.can_move(&board, 1, 0, 1));

        assert!(piece.rotate(&board));
        assert_eq!((piece.x, piece.rotation), (2, 1));
    }

    #[test]
    fn test_rotate_prefers_left_kick() {
        let mut board = Board::new();
        // Horizontal I would cover columns 4..=7 on row 6
        board.set(7, 6, Cell::Filled(TetrominoType::O));
        let mut piece = Piece::at(TetrominoType::I, 0, 4, 5);

        assert!(piece.rotate(&board));
        // -2 and -3 would also fit; the smallest kick wins
        assert_eq!((piece.x, piece.rotation), (3, 1));
    }

    #[test]
    fn test_rotate_falls_back_to_right_kick() {
        let mut board = Board::new();
        board.set(4, 6, Cell::Filled(TetrominoType::O));
        let mut piece = Piece::at(TetrominoType::I, 0, 4, 5);

        assert!(piece.rotate(&board));
        assert_eq!((piece.x, piece.rotation), (5, 1));
    }

    #[test]
    fn test_rotate_kicks_off_left_wall() {
        let board = Board::new();
        let mut piece = Piece::at(TetrominoType::I, 0, -1, 5);
        assert!(piece.rotate(&board));
        assert_eq!((piece.x, piece.rotation), (0, 1));
    }

    #[test]
    fn test_rotate_rejected_when_no_kick_fits() {
        let mut board = Board::new();
        for x in 0..BOARD_WIDTH as i32 {
            if x != 5 {
                board.set(x, 6, Cell::Filled(TetrominoType::S));
            }
        }
        let mut piece = Piece::at(TetrominoType::I, 0, 4, 5);
        let before = piece;
        assert!(!piece.rotate(&board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_hard_drop() {
        let board = Board::new();
        let mut piece = Piece::spawn(TetrominoType::O);
        let distance = piece.hard_drop(&board);
        // O occupies template rows 1 and 2, so its anchor rests 3 above the floor
        assert_eq!(piece.y, BOARD_HEIGHT as i32 - 3);
        assert_eq!(distance, BOARD_HEIGHT as i32 - 3 - SPAWN_Y);
    }

    #[test]
    fn test_ghost_lands_on_floor() {
        let board = Board::new();
        let piece = Piece::spawn(TetrominoType::O);
        let ghost = piece.ghost(&board);
        assert_eq!(ghost.y, BOARD_HEIGHT as i32 - 3);
        assert_eq!((ghost.x, ghost.rotation), (piece.x, piece.rotation));
        assert!(ghost.fits(&board));
        assert!(!ghost.can_move(&board, 0, 1, ghost.rotation));
    }

    #[test]
    fn test_ghost_of_resting_piece_is_itself() {
        let mut board = Board::new();
        board.set(4, 10, Cell::Filled(TetrominoType::L));
        let piece = Piece::at(TetrominoType::O, 0, 3, 7);
        assert_eq!(piece.ghost(&board), piece);
    }

    #[test]
    fn test_ghost_ignores_ghost_markers() {
        let mut board = Board::new();
        board.set(4, 10, Cell::Ghost);
        let ghost = Piece::spawn(TetrominoType::O).ghost(&board);
        assert_eq!(ghost.y, BOARD_HEIGHT as i32 - 3);
    }
}
