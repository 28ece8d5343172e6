//! UI rendering using ratatui
//!
//! Supports three screens:
//! - Menu: difficulty options and lifetime stats
//! - Playing: the letter board
//! - Results: end of session summary

use crate::app::{App, AppCoordinator, BoardGeometry, MenuOption, RoundSummary, Screen, Tone};
use crate::game::{Phase, TileState};
use crate::stats::LifetimeStats;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::Menu { selected } => {
            let stats = coordinator.has_storage().then_some(&coordinator.stats);
            render_menu(frame, *selected, stats);
        }
        Screen::Playing { app } => render_board(frame, app),
        Screen::Results { summary } => render_results(frame, summary, &coordinator.stats),
    }
}

/// Render the main menu
fn render_menu(frame: &mut Frame, selected: usize, stats: Option<&LifetimeStats>) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Logo
            Constraint::Length(6), // Menu options
            Constraint::Min(0),    // Stats
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let logo = r#"
 _      _   _               _
| | ___| |_| |_ ___ _ _  __| |_ _ ___ _ __
| |/ -_)  _|  _/ -_) '_|/ _` | '_/ _ \ '_ \
|_|\___|\__|\__\___|_|  \__,_|_| \___/ .__/
                                     |_|
"#;
    let logo_widget = Paragraph::new(logo)
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo_widget, layout[0]);

    let items: Vec<ListItem> = MenuOption::all()
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if i == selected { "> " } else { "  " };
            ListItem::new(format!("{}{}", prefix, opt.label())).style(style)
        })
        .collect();
    frame.render_widget(List::new(items).block(Block::default()), layout[1]);

    if let Some(stats) = stats {
        let lines: Vec<Line> = stats.summary_lines().into_iter().map(Line::from).collect();
        let widget = Paragraph::new(lines)
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title("Your progress"),
            );
        frame.render_widget(widget, layout[2]);
    }

    let footer = Paragraph::new("↑↓ Navigate  Enter Select  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[3]);
}

/// Render the letter board: header, slots in the answer band, pool, footer
fn render_board(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let Some(geometry) = app.geometry() else {
        return;
    };
    let session = app.session();

    let needed = BoardGeometry::slot_row_cols(session.slots().len(), session.config());
    if !geometry.fits_slots(session.slots().len(), session.config()) {
        render_too_narrow(frame, needed);
        return;
    }

    // Header
    let header = Line::from(vec![
        Span::styled("LETTERDROP", Style::default().fg(Color::Yellow).bold()),
        Span::raw(format!("  {}  ", session.difficulty().label())),
        Span::styled(
            format!("Score {}", session.score()),
            Style::default().fg(Color::Green).bold(),
        ),
        Span::styled(
            format!("  Words left {}", session.remaining_words()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), Rect::new(0, 0, area.width, 1).intersection(area));

    // Answer band
    let (band_top, band_bottom) = geometry.band_rows;
    let band = Rect::new(0, band_top, area.width, band_bottom.saturating_sub(band_top) + 1)
        .intersection(area);
    frame.render_widget(
        Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
        band,
    );

    // Prompt above the slots
    if let Some(word) = session.target_word() {
        let prompt = if app.show_word {
            format!("Spell: {}", word.to_uppercase())
        } else {
            format!("Spell the {}-letter word", word.chars().count())
        };
        let row = geometry.slot_row.saturating_sub(1).max(1);
        frame.render_widget(
            Paragraph::new(prompt)
                .style(Style::default().fg(Color::Cyan).bold())
                .alignment(Alignment::Center),
            Rect::new(0, row, area.width, 1).intersection(area),
        );
    }

    render_slots(frame, app, geometry, area);
    render_pool(frame, app, geometry, area);

    // Footer: feedback and keys
    let feedback_style = match app.tone {
        Tone::Good => Style::default().fg(Color::Green).bold(),
        Tone::Bad => Style::default().fg(Color::Red),
        Tone::Neutral => Style::default().fg(Color::White),
    };
    let feedback_row = area.height.saturating_sub(2);
    frame.render_widget(
        Paragraph::new(app.feedback.as_str())
            .style(feedback_style)
            .alignment(Alignment::Center),
        Rect::new(0, feedback_row, area.width, 1).intersection(area),
    );
    let help = Paragraph::new("Drag letters into the slots  r Reset  s Skip  h Hide word  Esc End")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(
        help,
        Rect::new(0, area.height.saturating_sub(1), area.width, 1).intersection(area),
    );
}

/// Shown instead of the board when the slot row would overlap itself
fn render_too_narrow(frame: &mut Frame, needed: u16) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Percentage(40),
        ])
        .split(area);

    let message = Paragraph::new(format!("Terminal too narrow: this word needs {} columns", needed))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center);
    frame.render_widget(message, layout[1]);

    let hint = Paragraph::new("Widen the window, or press s to skip")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[2]);
}

fn render_slots(frame: &mut Frame, app: &App, geometry: &BoardGeometry, area: Rect) {
    let session = app.session();
    let slots = session.slots();
    let border = match session.phase() {
        Phase::Solved => Color::Green,
        Phase::Evaluating => Color::Yellow,
        _ => Color::Gray,
    };
    for slot in slots {
        let rect = geometry
            .slot_rect(slot.index, slots.len(), session.config())
            .intersection(area);
        let letter = slot
            .occupant
            .and_then(|id| session.tiles().iter().find(|t| t.id == id))
            .map(|t| t.letter.to_string())
            .unwrap_or_default();
        let widget = Paragraph::new(letter)
            .style(Style::default().fg(Color::White).bold())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            );
        frame.render_widget(widget, rect);
    }
}

fn render_pool(frame: &mut Frame, app: &App, geometry: &BoardGeometry, area: Rect) {
    let session = app.session();
    let dragging = app.dragging();

    // Dragged tile last so it sits on top.
    let resting = session.tiles().iter().filter(|t| Some(t.id) != dragging);
    let lifted = session.tiles().iter().filter(|t| Some(t.id) == dragging);
    for tile in resting.chain(lifted).filter(|t| t.is_positioned()) {
        let style = match tile.state {
            TileState::Dragging => Style::default().fg(Color::Yellow).bold(),
            TileState::Consumed { .. } => Style::default().fg(Color::DarkGray),
            TileState::InPool | TileState::AtHome => Style::default().fg(Color::Cyan).bold(),
        };
        let rect = geometry.tile_rect(tile.position).intersection(area);
        let widget = Paragraph::new(tile.letter.to_string())
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(widget, rect);
    }
}

/// Render the end of session screen
fn render_results(frame: &mut Frame, summary: &RoundSummary, stats: &LifetimeStats) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(6),    // Words
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let title = if summary.completed {
        format!("All {} words done!", summary.difficulty.label())
    } else {
        "Session ended".to_string()
    };
    let header = Paragraph::new(vec![
        Line::from(title).style(Style::default().fg(Color::Yellow).bold()),
        Line::from(format!(
            "Score {}   Solved {}   Skipped {}   Misses {}",
            summary.total_score,
            summary.solved_count(),
            summary.skipped.len(),
            summary.miss_count()
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, layout[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    let mut words: Vec<ListItem> = summary
        .solved
        .iter()
        .map(|w| {
            ListItem::new(format!(
                "{:<12} +{:<4} {}",
                w.word.to_uppercase(),
                w.points,
                if w.attempts > 1 {
                    format!("({} tries)", w.attempts)
                } else {
                    String::new()
                }
            ))
            .style(Style::default().fg(Color::Green))
        })
        .collect();
    words.extend(summary.missed.iter().map(|m| {
        ListItem::new(format!("{:<12} not {}", m.word.to_uppercase(), m.attempt))
            .style(Style::default().fg(Color::Red))
    }));
    words.extend(summary.skipped.iter().map(|w| {
        ListItem::new(format!("{:<12} skipped", w.to_uppercase()))
            .style(Style::default().fg(Color::DarkGray))
    }));
    frame.render_widget(
        List::new(words).block(Block::default().borders(Borders::ALL).title("This session")),
        columns[0],
    );

    let lines: Vec<Line> = stats.summary_lines().into_iter().map(Line::from).collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("All time")),
        columns[1],
    );

    let footer = Paragraph::new("Enter Menu  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::game::Difficulty;
    use crate::storage::Storage;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_board_shows_prompt_and_slots() {
        let storage = Storage::open_in_memory().unwrap();
        let mut coordinator = AppCoordinator::new(EngineConfig::default(), Some(storage), Some(5));
        coordinator.resize(100, 40);
        coordinator.start_session(Difficulty::Easy);

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render(f, &coordinator)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("LETTERDROP"));
        assert!(text.contains("Spell: "));
        assert!(text.contains("Score 0"));
    }

    #[test]
    fn test_narrow_terminal_shows_warning() {
        // 21 columns per slot: no word of three or more letters fits in 60.
        let config = EngineConfig {
            slot_width: 200.0,
            ..EngineConfig::default()
        };
        let mut coordinator = AppCoordinator::new(config, None, Some(5));
        coordinator.resize(60, 30);
        coordinator.start_session(Difficulty::Easy);

        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal.draw(|f| render(f, &coordinator)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Terminal too narrow"));
        assert!(!text.contains("LETTERDROP"));
    }

    #[test]
    fn test_menu_and_results_render() {
        let mut coordinator = AppCoordinator::new(EngineConfig::default(), None, Some(5));
        coordinator.resize(80, 30);
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| render(f, &coordinator)).unwrap();
        assert!(buffer_text(&terminal).contains("Play Medium"));

        coordinator.start_session(Difficulty::Easy);
        coordinator.end_session();
        terminal.draw(|f| render(f, &coordinator)).unwrap();
        assert!(buffer_text(&terminal).contains("Session ended"));
    }
}
