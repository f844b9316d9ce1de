//! Terminal UI rendering with ratatui

use crate::board::{Board, Cell, BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::{Game, Preview};
use crate::highscores::{ordinal, HIGH_SCORE_LIMIT};
use crate::settings::Settings;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Board (10*2 + 2 for borders) plus side panel (18)
const GAME_WIDTH: u16 = 40;
/// Board (20) + 2 for borders
const GAME_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;

/// Final numbers shown on the game over screen
#[derive(Debug, Clone)]
pub struct GameSummary<'a> {
    pub points: u64,
    pub level: u32,
    pub lines: u32,
    pub rank: usize,
    pub high_scores: &'a [u64],
}

/// Render the title screen
pub fn render_start(frame: &mut Frame, settings: &Settings) {
    let area = frame.area();
    let screen = center_rect(area, 44, 20);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(screen);
    frame.render_widget(block, screen);

    let mut lines = vec![
        Line::raw(""),
        Line::styled("B L O C K F A L L", Style::default().fg(Color::Cyan).bold()),
        Line::raw(""),
    ];

    let keys = &settings.keys;
    let controls = [
        ("Move", format!("{} / {}", keys.move_left.join(","), keys.move_right.join(","))),
        ("Rotate", keys.rotate.join(",")),
        ("Soft drop", keys.soft_drop.join(",")),
        ("Hard drop", keys.hard_drop.join(",")),
        ("Pause", keys.pause.join(",")),
        ("Ghost", keys.ghost.join(",")),
        ("Quit", keys.quit.join(",")),
    ];
    for (label, keys) in controls {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>10}  ", label), Style::default().fg(Color::Gray)),
            Span::styled(format!("{:<18}", keys), Style::default().fg(Color::Magenta)),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Press any key to start...",
        Style::default().fg(Color::Yellow).bold(),
    ));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the playfield and side panel.
///
/// `board` is what to draw: the game's snapshot while playing, or the
/// committed board during the game over sweep.
pub fn render_game(frame: &mut Frame, board: &Board, game: &Game, settings: &Settings) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_WIDTH as u16 * 2 + 2),
            Constraint::Length(18),
        ])
        .split(game_area);

    render_board(frame, main_layout[0], board, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next piece: 4 rows + borders
            Constraint::Min(12),   // Stats
            Constraint::Length(3), // Controls hint
        ])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], &game.next_preview(), settings);
    render_stats(frame, right_layout[1], game);
    render_hint(frame, right_layout[2], settings);

    if game.paused {
        let resume = format!("Press {} to resume", first_key(&settings.keys.pause));
        render_overlay(frame, area, "PAUSED", &resume);
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Text and style for one board cell
fn cell_span(cell: Cell, settings: &Settings) -> Span<'static> {
    let (block_char, ghost_char) = settings.visual.block_chars();
    match cell {
        Cell::Empty => Span::raw(EMPTY),
        Cell::Filled(kind) => Span::styled(block_char, Style::default().fg(kind.color())),
        Cell::Ghost => Span::styled(ghost_char, Style::default().fg(Color::Gray).dim()),
        Cell::Wreck => Span::styled(block_char, Style::default().fg(Color::DarkGray)),
    }
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, board: &Board, settings: &Settings) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = board
        .rows()
        .map(|row| Line::from(row.iter().map(|&cell| cell_span(cell, settings)).collect::<Vec<_>>()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the next piece box
fn render_next(frame: &mut Frame, area: Rect, preview: &Preview, settings: &Settings) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = preview
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    Some(kind) => cell_span(Cell::Filled(*kind), settings),
                    None => Span::raw(EMPTY),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ghost = if game.ghost_enabled { "ON" } else { "OFF" };
    let lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", game.score.points),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LEVEL", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", game.score.level),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", game.score.lines),
            Style::default().fg(Color::Green),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("GHOST ", Style::default().fg(Color::Gray)),
            Span::styled(ghost, Style::default().fg(Color::Magenta)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_hint(frame: &mut Frame, area: Rect, settings: &Settings) {
    let keys = &settings.keys;
    let lines = vec![
        Line::styled(
            format!("{} pause  {} ghost", first_key(&keys.pause), first_key(&keys.ghost)),
            Style::default().fg(Color::DarkGray),
        ),
        Line::styled(format!("{} quit", first_key(&keys.quit)), Style::default().fg(Color::DarkGray)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn first_key(keys: &[String]) -> &str {
    keys.first().map(String::as_str).unwrap_or("")
}

/// Render an overlay (for pause)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = (subtitle.chars().count() as u16 + 4).max(24);
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the final score, rank and ledger
pub fn render_game_over(frame: &mut Frame, summary: &GameSummary) {
    let area = frame.area();
    let height = 14 + summary.high_scores.len() as u16;
    let screen = center_rect(area, 36, height);

    frame.render_widget(Clear, screen);

    let block = Block::default()
        .title(" GAME OVER ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(screen);
    frame.render_widget(block, screen);

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(Color::Gray)),
            Span::styled(format!("{:>12}", value), Style::default().fg(Color::White).bold()),
        ])
    };

    let mut lines = vec![
        Line::raw(""),
        stat("Score", summary.points.to_string()),
        stat("Level", summary.level.to_string()),
        stat("Lines", summary.lines.to_string()),
        Line::raw(""),
    ];

    let rank_line = if summary.rank <= HIGH_SCORE_LIMIT {
        format!("Your Rank: {}", ordinal(summary.rank))
    } else {
        format!("Not in the top {}", HIGH_SCORE_LIMIT)
    };
    lines.push(Line::styled(rank_line, Style::default().fg(Color::Yellow).bold()));
    lines.push(Line::raw(""));

    for (i, &score) in summary.high_scores.iter().enumerate() {
        let is_new = summary.points > 0 && score == summary.points;
        let mut spans = vec![
            Span::styled(format!("{:<6}", ordinal(i + 1)), Style::default().fg(Color::Gray)),
            Span::styled(format!("{:>12}", score), Style::default().fg(Color::Cyan)),
        ];
        if is_new {
            spans.push(Span::styled(" NEW!", Style::default().fg(Color::Green).bold()));
        } else {
            spans.push(Span::raw("     "));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "R to restart, any other key quits",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::TetrominoType;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_game_screen_shows_stats() {
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        let game = Game::with_seed(5);
        let settings = Settings::default();

        terminal
            .draw(|frame| render_game(frame, &game.snapshot(), &game, &settings))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("NEXT"));
        assert!(text.contains("SCORE"));
        assert!(text.contains("LEVEL"));
        assert!(!text.contains("PAUSED"));
    }

    #[test]
    fn test_pause_overlay() {
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        let mut game = Game::with_seed(5);
        game.paused = true;
        let settings = Settings::default();

        terminal
            .draw(|frame| render_game(frame, &game.board, &game, &settings))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Press p to resume"));
    }

    #[test]
    fn test_pause_overlay_names_bound_key() {
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        let mut game = Game::with_seed(5);
        game.paused = true;
        let mut settings = Settings::default();
        settings.keys.pause = vec!["Backspace".to_string(), "p".to_string()];

        terminal
            .draw(|frame| render_game(frame, &game.board, &game, &settings))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Press Backspace to resume"));
        assert!(!text.contains("Press P"));
    }

    #[test]
    fn test_game_over_marks_new_score() {
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        let scores = [900, 400, 100];
        let summary = GameSummary {
            points: 400,
            level: 1,
            lines: 3,
            rank: 2,
            high_scores: &scores,
        };

        terminal.draw(|frame| render_game_over(frame, &summary)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Your Rank: 2nd"));
        assert_eq!(text.matches("NEW!").count(), 1);
        assert!(text.contains("R to restart, any other key quits"));
    }

    #[test]
    fn test_zero_score_is_never_new() {
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        let scores = [0];
        let summary = GameSummary {
            points: 0,
            level: 1,
            lines: 0,
            rank: 1,
            high_scores: &scores,
        };

        terminal.draw(|frame| render_game_over(frame, &summary)).unwrap();

        assert!(!screen_text(&terminal).contains("NEW!"));
    }

    #[test]
    fn test_cell_spans() {
        let settings = Settings::default();
        assert_eq!(cell_span(Cell::Empty, &settings).content, EMPTY);
        assert_eq!(
            cell_span(Cell::Filled(TetrominoType::T), &settings).style.fg,
            Some(TetrominoType::T.color())
        );
        assert_eq!(cell_span(Cell::Ghost, &settings).content, "░░");
    }
}
