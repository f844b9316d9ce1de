//! Core game state and logic
//!
//! The game advances in logic ticks. Every tick the driver feeds in at most
//! one action, calls `tick` for gravity, drains events for sound, and renders
//! `snapshot`. Gravity only moves the piece every `DROP_INTERVAL_TICKS`
//! ticks, so input stays responsive at any level.

use crate::board::Board;
use crate::piece::Piece;
use crate::score::{Score, DROP_INTERVAL_TICKS};
use crate::tetromino::{TetrominoType, TEMPLATE_SIZE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::time::Duration;

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Pause,
    ToggleGhost,
    Quit,
}

/// Things that happened during a tick, for sound and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    SoftDrop,
    HardDrop,
    /// A gravity lock that cleared nothing
    Lock,
    /// One to three lines cleared by one lock
    LineClear(u32),
    /// Four lines cleared by one lock
    Tetris,
    LevelUp(u32),
    /// The next piece could not enter the field
    ToppedOut,
    Quit,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::SoftDrop => write!(f, "soft drop"),
            GameEvent::HardDrop => write!(f, "hard drop"),
            GameEvent::Lock => write!(f, "lock"),
            GameEvent::LineClear(lines) => write!(f, "cleared {} line(s)", lines),
            GameEvent::Tetris => write!(f, "tetris"),
            GameEvent::LevelUp(level) => write!(f, "level up to {}", level),
            GameEvent::ToppedOut => write!(f, "topped out"),
            GameEvent::Quit => write!(f, "quit"),
        }
    }
}

/// Preview of a piece type: its rotation-0 template
pub type Preview = [[Option<TetrominoType>; TEMPLATE_SIZE]; TEMPLATE_SIZE];

/// The main game struct
pub struct Game {
    /// Locked blocks only; the falling piece and ghost are never written here
    pub board: Board,
    /// Current falling piece
    pub current: Piece,
    /// Type of the piece that spawns after the current one locks
    pub next: TetrominoType,
    /// Score tracking
    pub score: Score,
    pub running: bool,
    pub paused: bool,
    pub quit_by_user: bool,
    pub ghost_enabled: bool,
    /// Logic ticks since the last gravity drop
    drop_counter: u32,
    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a new game with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a new game with a fixed piece sequence
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = random_kind(&mut rng);

        let mut game = Self {
            board: Board::new(),
            current: Piece::spawn(next),
            next,
            score: Score::new(),
            running: true,
            paused: false,
            quit_by_user: false,
            ghost_enabled: true,
            drop_counter: 0,
            rng,
            events: Vec::new(),
        };
        game.spawn();
        game
    }

    /// Start over with an empty board. The ghost preference carries over.
    pub fn reset(&mut self) {
        self.board.clear();
        self.score = Score::new();
        self.running = true;
        self.paused = false;
        self.quit_by_user = false;
        self.drop_counter = 0;
        self.events.clear();
        self.next = random_kind(&mut self.rng);
        self.spawn();
    }

    /// Bring the announced next piece into play and announce a new one.
    ///
    /// If the spawn pose is blocked the game ends.
    pub fn spawn(&mut self) {
        self.current = Piece::spawn(self.next);

        if !self.current.can_spawn(&self.board) {
            self.top_out();
            return;
        }

        self.next = random_kind(&mut self.rng);
        tracing::trace!(current = ?self.current.kind, next = ?self.next, "spawned piece");
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        if !self.running {
            return;
        }

        if self.paused {
            match action {
                Action::Pause => self.paused = false,
                Action::Quit => self.quit(),
                _ => {}
            }
            return;
        }

        match action {
            Action::MoveLeft => {
                self.current.move_left(&self.board);
            }
            Action::MoveRight => {
                self.current.move_right(&self.board);
            }
            Action::Rotate => {
                self.current.rotate(&self.board);
            }
            Action::SoftDrop => {
                self.events.push(GameEvent::SoftDrop);
                self.soft_drop();
            }
            Action::HardDrop => {
                self.events.push(GameEvent::HardDrop);
                self.hard_drop();
            }
            Action::Pause => self.paused = true,
            Action::ToggleGhost => self.ghost_enabled = !self.ghost_enabled,
            Action::Quit => self.quit(),
        }
    }

    /// Advance gravity by one logic tick
    pub fn tick(&mut self) {
        if !self.running || self.paused {
            return;
        }

        self.drop_counter += 1;
        if self.drop_counter < DROP_INTERVAL_TICKS {
            return;
        }
        self.drop_counter = 0;

        if !self.current.move_down(&self.board) {
            self.settle(false);
        }
    }

    /// Delay the driver should sleep between ticks at the current level
    pub fn tick_interval(&self) -> Duration {
        self.score.tick_interval()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The board as it should be drawn: ghost first, then the falling piece
    pub fn snapshot(&self) -> Board {
        let mut frame = self.board.clone();

        if self.ghost_enabled {
            let ghost = self.current.ghost(&self.board);
            if ghost.y != self.current.y {
                frame.mark_ghost(&ghost);
            }
        }

        frame.commit(&self.current);
        frame
    }

    /// Draw the piece that ended the game into the board without covering
    /// the blocks it collided with.
    pub fn reveal_final_piece(&mut self) {
        self.board.commit_if_empty(&self.current);
    }

    /// Rotation-0 template of the next piece
    pub fn next_preview(&self) -> Preview {
        let mut preview = [[None; TEMPLATE_SIZE]; TEMPLATE_SIZE];
        for (row, col) in self.next.cells(0) {
            preview[row][col] = Some(self.next);
        }
        preview
    }

    fn soft_drop(&mut self) {
        if !self.current.move_down(&self.board) {
            self.settle(true);
        }
    }

    fn hard_drop(&mut self) {
        self.current.hard_drop(&self.board);
        self.settle(true);
    }

    /// The piece can't fall any further: lock it, or end the game if it
    /// never made it into the field.
    fn settle(&mut self, forced: bool) {
        self.drop_counter = 0;
        if !self.current.has_entered() {
            self.top_out();
            return;
        }
        self.lock(forced);
    }

    /// Commit the current piece, clear lines, score and spawn the next one.
    ///
    /// `muted` suppresses the plain lock event; drops already made their own.
    fn lock(&mut self, muted: bool) {
        self.board.commit(&self.current);

        let lines = self.board.clear_full_lines() as u32;
        if lines > 0 {
            self.events.push(if lines == 4 {
                GameEvent::Tetris
            } else {
                GameEvent::LineClear(lines)
            });

            let award = self.score.add_clear(lines);
            tracing::debug!(lines, points = award.points, total = self.score.points, "lines cleared");
            if self.board.is_empty() {
                tracing::debug!("board cleared");
            }

            if let Some(level) = award.new_level {
                tracing::info!(level, "level up");
                self.events.push(GameEvent::LevelUp(level));
            }
        } else if !muted {
            self.events.push(GameEvent::Lock);
        }

        self.spawn();
    }

    fn top_out(&mut self) {
        self.running = false;
        self.events.push(GameEvent::ToppedOut);
        tracing::info!(score = self.score.points, "topped out");
    }

    fn quit(&mut self) {
        self.running = false;
        self.quit_by_user = true;
        self.events.push(GameEvent::Quit);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn random_kind(rng: &mut impl Rng) -> TetrominoType {
    let all = TetrominoType::all();
    all[rng.gen_range(0..all.len())]
}
