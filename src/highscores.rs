//! High score ledger
//!
//! A plain text file with one score per line, best first. Stored in the
//! platform data directory unless the settings point somewhere else.

use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of scores kept in the ledger
pub const HIGH_SCORE_LIMIT: usize = 10;

const LEDGER_FILE: &str = "highscores.txt";

/// Ranked list of past scores
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    path: Option<PathBuf>,
    scores: Vec<u64>,
}

impl HighScores {
    /// Default ledger location in the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall").map(|dirs| dirs.data_dir().join(LEDGER_FILE))
    }

    /// Open the ledger at `path` and read it. A missing or unreadable file
    /// gives an empty ledger.
    pub fn open(path: Option<PathBuf>) -> Self {
        let mut ledger = Self {
            path,
            scores: Vec::new(),
        };
        ledger.reload();
        ledger
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Scores, best first
    pub fn scores(&self) -> &[u64] {
        &self.scores
    }

    /// Re-read the ledger from disk
    pub fn reload(&mut self) {
        let Some(path) = &self.path else {
            return;
        };

        self.scores = match fs::read_to_string(path) {
            Ok(contents) => parse(&contents),
            Err(e) => {
                tracing::debug!("No high scores at {}: {}", path.display(), e);
                Vec::new()
            }
        };
    }

    /// Merge a finished game's score into the ledger and return its 1-based
    /// rank. The ledger is re-read first so concurrent sessions are not lost.
    pub fn record(&mut self, score: u64) -> usize {
        self.reload();
        merge(&mut self.scores, score)
    }

    /// Write the ledger back to disk
    pub fn save(&self) -> Result<(), String> {
        let Some(path) = &self.path else {
            return Err("Could not determine high score path".to_string());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create data dir: {}", e))?;
        }

        let mut contents = String::new();
        for score in &self.scores {
            contents.push_str(&score.to_string());
            contents.push('\n');
        }

        fs::write(path, contents).map_err(|e| format!("Failed to write high scores: {}", e))
    }
}

/// Parse newline-separated scores, skipping anything that isn't a number.
/// The result is sorted best first.
pub fn parse(contents: &str) -> Vec<u64> {
    let mut scores: Vec<u64> = contents
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores
}

/// Insert `score`, keep the best `HIGH_SCORE_LIMIT`, and return the rank of
/// the first entry equal to `score`. A score that didn't make the cut ranks
/// one past the end.
pub fn merge(scores: &mut Vec<u64>, score: u64) -> usize {
    scores.push(score);
    scores.sort_by(|a, b| b.cmp(a));
    scores.truncate(HIGH_SCORE_LIMIT);

    scores
        .iter()
        .position(|&s| s == score)
        .map_or(scores.len() + 1, |i| i + 1)
}

/// "1st", "2nd", "3rd", "4th", ...
pub fn ordinal(rank: usize) -> String {
    let suffix = match rank {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{}", rank, suffix)
}
