//! BLOCKFALL - falling blocks in the terminal
//!
//! A ten-wide well, seven pieces, one key per tick.

mod audio;
mod board;
mod game;
mod highscores;
mod input;
mod kicks;
mod piece;
mod score;
mod settings;
mod tetromino;
mod ui;

use audio::{AudioManager, Sfx};
use board::{Board, GameOverSweep};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::Game;
use highscores::HighScores;
use input::InputHandler;
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    thread,
    time::Duration,
};

/// How often the start and game over screens check for a key
const SCREEN_POLL: Duration = Duration::from_millis(50);

/// Idle time per loop while paused
const PAUSE_SLEEP: Duration = Duration::from_millis(100);

/// Pause on the final frame before the sweep starts
const GAME_OVER_HOLD: Duration = Duration::from_millis(800);
/// Delay between sweep frames
const GAME_OVER_SWEEP_DELAY: Duration = Duration::from_millis(15);
/// Pause after the sweep before the results appear
const GAME_OVER_SETTLE: Duration = Duration::from_millis(500);

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Application state
enum AppState {
    Start,
    Playing,
    GameOver { rank: usize },
}

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    tracing::debug!("Settings from {:?}", Settings::settings_path());

    // Audio is optional, the game works without it
    let mut audio = AudioManager::new(&settings.audio);
    if audio.is_some() {
        tracing::info!("Audio initialized");
    } else {
        tracing::info!("Audio unavailable, playing silently");
    }

    let ledger_path = settings.scores.path.clone().or_else(HighScores::default_path);
    let mut high_scores = HighScores::open(ledger_path);
    tracing::debug!(
        "High scores at {:?}: {:?}",
        high_scores.path(),
        high_scores.scores()
    );

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &settings, &mut audio, &mut high_scores);

    if let Some(audio) = audio.as_mut() {
        audio.stop_music();
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match &result {
        Ok(Some(game)) => {
            tracing::info!(
                score = game.score.points,
                level = game.score.level,
                lines = game.score.lines,
                "session finished"
            );
            println!("\nThanks for playing BLOCKFALL!");
            println!("Final Score: {}", game.score.points);
            println!("Level: {} | Lines: {}", game.score.level, game.score.lines);
        }
        Ok(None) => {
            println!("\nThanks for playing BLOCKFALL!");
        }
        Err(e) => {
            tracing::error!("Terminal error: {}", e);
        }
    }

    result.map(|_| ())
}

/// Drive the screens until the player leaves. Returns the last game played.
fn run_app(
    terminal: &mut Term,
    settings: &Settings,
    audio: &mut Option<AudioManager>,
    high_scores: &mut HighScores,
) -> io::Result<Option<Game>> {
    let input = InputHandler::from_settings(settings);
    let mut game = Game::new();
    game.ghost_enabled = settings.visual.show_ghost;
    let mut state = AppState::Start;

    loop {
        state = match state {
            AppState::Start => {
                terminal.draw(|frame| ui::render_start(frame, settings))?;

                match input::wait_for_key(SCREEN_POLL)? {
                    Some(key)
                        if key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c') =>
                    {
                        return Ok(None);
                    }
                    Some(_) => {
                        start_music(audio);
                        AppState::Playing
                    }
                    None => AppState::Start,
                }
            }
            AppState::Playing => {
                play(terminal, &mut game, &input, settings, audio)?;

                if let Some(audio) = audio.as_mut() {
                    audio.stop_music();
                }

                tracing::debug!("Final stack:\n{}", game.board);
                if !game.quit_by_user {
                    game_over_sweep(terminal, &mut game, settings)?;
                }

                let rank = high_scores.record(game.score.points);
                if let Err(e) = high_scores.save() {
                    tracing::warn!("Could not save high scores: {}", e);
                }
                tracing::info!(score = game.score.points, rank, "game over");

                if let Some(audio) = audio.as_mut() {
                    audio.play_sfx(Sfx::GameOver);
                }

                input::flush_pending()?;
                AppState::GameOver { rank }
            }
            AppState::GameOver { rank } => {
                let summary = ui::GameSummary {
                    points: game.score.points,
                    level: game.score.level,
                    lines: game.score.lines,
                    rank,
                    high_scores: high_scores.scores(),
                };
                terminal.draw(|frame| ui::render_game_over(frame, &summary))?;

                match input::wait_for_key(SCREEN_POLL)? {
                    Some(key) if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) => {
                        tracing::info!("Restarting");
                        game.reset();
                        high_scores.reload();
                        start_music(audio);
                        AppState::Playing
                    }
                    Some(_) => return Ok(Some(game)),
                    None => AppState::GameOver { rank },
                }
            }
        };
    }
}

fn start_music(audio: &mut Option<AudioManager>) {
    if let Some(audio) = audio.as_mut() {
        audio.start_music();
    }
}

/// Run one game until it tops out or the player quits
fn play(
    terminal: &mut Term,
    game: &mut Game,
    input: &InputHandler,
    settings: &Settings,
    audio: &mut Option<AudioManager>,
) -> io::Result<()> {
    let mut was_paused = false;

    while game.running {
        if let Some(action) = input.poll()? {
            game.process_action(action);
        }

        if game.paused != was_paused {
            was_paused = game.paused;
            if let Some(audio) = audio.as_mut() {
                if game.paused {
                    audio.pause_music();
                } else {
                    audio.resume_music();
                }
            }
        }

        if game.paused {
            draw_game(terminal, &game.snapshot(), game, settings)?;
            thread::sleep(PAUSE_SLEEP);
            continue;
        }

        game.tick();

        let events = game.drain_events();
        for event in &events {
            tracing::debug!("event: {}", event);
        }
        if let Some(audio) = audio.as_mut() {
            audio.play_events(&events);
        }

        draw_game(terminal, &game.snapshot(), game, settings)?;
        thread::sleep(game.tick_interval());
    }

    Ok(())
}

/// Show the piece that ended the game, then wreck the stack one cell per frame
fn game_over_sweep(terminal: &mut Term, game: &mut Game, settings: &Settings) -> io::Result<()> {
    game.reveal_final_piece();
    draw_game(terminal, &game.board, game, settings)?;
    thread::sleep(GAME_OVER_HOLD);

    let mut sweep = GameOverSweep::new();
    while sweep.step(&mut game.board) {
        draw_game(terminal, &game.board, game, settings)?;
        thread::sleep(GAME_OVER_SWEEP_DELAY);
    }

    thread::sleep(GAME_OVER_SETTLE);
    Ok(())
}

fn draw_game(terminal: &mut Term, board: &Board, game: &Game, settings: &Settings) -> io::Result<()> {
    terminal.draw(|frame| ui::render_game(frame, board, game, settings))?;
    Ok(())
}
