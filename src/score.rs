//! Scoring, level progression and drop speed

use std::time::Duration;

/// Base points for clearing 1, 2, 3 or 4 lines with one lock, times level
pub const LINE_SCORES: [u64; 4] = [100, 300, 500, 800];

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Logic sub-steps per gravity drop. Input is polled once per sub-step.
pub const DROP_INTERVAL_TICKS: u32 = 5;

/// Result of scoring one lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub points: u64,
    /// Set when this lock pushed the level up
    pub new_level: Option<u32>,
}

/// Score counters for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Credit `lines` cleared by a single lock.
    ///
    /// Points use the level in effect before the clear; the level is then
    /// recomputed from the new line total. Zero lines awards nothing.
    pub fn add_clear(&mut self, lines: u32) -> Award {
        if lines == 0 {
            return Award {
                points: 0,
                new_level: None,
            };
        }

        let base = LINE_SCORES[(lines.min(4) - 1) as usize];
        let points = base * self.level as u64;
        self.points += points;
        self.lines += lines;

        let old_level = self.level;
        self.level = level_for_lines(self.lines);

        Award {
            points,
            new_level: (self.level > old_level).then_some(self.level),
        }
    }

    /// Gravity period for the current level
    pub fn drop_interval(&self) -> Duration {
        drop_interval(self.level)
    }

    /// Delay between logic sub-steps at the current level
    pub fn tick_interval(&self) -> Duration {
        self.drop_interval() / DROP_INTERVAL_TICKS
    }
}

/// Level reached after clearing `lines` in total
pub fn level_for_lines(lines: u32) -> u32 {
    1 + lines / LINES_PER_LEVEL
}

/// Time per gravity drop: four fixed speed tiers
pub fn drop_interval(level: u32) -> Duration {
    let ms = match level {
        0..=3 => 500,
        4..=6 => 300,
        7..=9 => 150,
        _ => 80,
    };
    Duration::from_millis(ms)
}
