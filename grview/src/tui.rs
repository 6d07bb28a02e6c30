//! # Terminal User Interface (TUI)
//!
//! Interactive terminal UI using `ratatui`. This layer only translates keys
//! into [`Command`]s and draws what [`App`] exposes; all state changes go
//! through [`App::dispatch`] on this one thread.
//!
//! ## View Modes
//!
//! - **Table** - goroutine list (default)
//! - **Filter** - text input for the trace substring filter
//! - **Trace** - full trace of the selected goroutine (paused only)
//! - **Help** - keyboard shortcuts
//!
//! The refresh timer runs only on the table view in live mode; opening an
//! overlay or pausing stops it, and it restarts when the table is back.
//!
//! ## Sub-Modules
//!
//! - `table` - goroutine rows, expansion and scrolling
//! - `layout` - column and bar visibility per terminal size
//! - `theme` - color scheme

// TUI rendering intentionally uses precision-losing casts and long functions for clarity
#![allow(
    clippy::cast_possible_truncation,
    clippy::too_many_lines,
    clippy::needless_pass_by_value
)]

use crossbeam_channel::{bounded, Receiver};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;

mod layout;
mod table;
mod theme;

use crate::app::{App, Command, Outcome};
use crate::domain::TuiError;
use crate::source::SnapshotSource;
use crate::timer::{RefreshTimer, TICK_BACKLOG, TIMER_CADENCE};
use grview_common::Goroutine;
use layout::compute_layout;
use theme::{state_color, ACCENT_CYAN, ACCENT_GREEN, CAUTION_AMBER, CRITICAL_RED, INFO_DIM};

// =============================================================================
// STYLE CONSTANTS
// =============================================================================

const STYLE_HEADING: Style = Style::new().fg(ACCENT_GREEN).add_modifier(Modifier::BOLD);
const STYLE_LABEL: Style = Style::new().fg(CAUTION_AMBER).add_modifier(Modifier::BOLD);
const STYLE_DIM: Style = Style::new().fg(INFO_DIM);
const STYLE_KEY: Style = Style::new().fg(CAUTION_AMBER);
const STYLE_TEXT: Style = Style::new().fg(ratatui::style::Color::White);

/// How long to wait for a key before checking the command channel again
const INPUT_POLL: Duration = Duration::from_millis(50);

// =============================================================================
// VIEW MODES
// =============================================================================

/// Current view mode determines what's displayed and how keys are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Table,
    Filter,
    Trace,
    Help,
}

/// Front-end state that never reaches [`App`]
struct Ui {
    view_mode: ViewMode,
    /// Text being typed in the filter overlay
    filter_input: String,
    /// Goroutine shown by the trace overlay, captured when it opened
    trace_detail: Option<Goroutine>,
}

impl Ui {
    fn new() -> Self {
        Self { view_mode: ViewMode::Table, filter_input: String::new(), trace_detail: None }
    }

    /// Map a key press to a command, updating overlay state on the way.
    fn handle_key<S: SnapshotSource>(&mut self, key: KeyEvent, app: &App<S>) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }

        match self.view_mode {
            ViewMode::Table => match key.code {
                KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Command::Quit),
                KeyCode::Char('r' | 'R') => Some(Command::RefreshNow),
                KeyCode::Char('p' | 'P' | ' ') => Some(Command::TogglePause),
                KeyCode::Char('s' | 'S') => Some(Command::ToggleSort),
                KeyCode::Up | KeyCode::Char('k') => Some(Command::CursorUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Command::CursorDown),
                KeyCode::Enter => Some(Command::ToggleExpand),
                KeyCode::Char('f' | 'F' | '/') => {
                    self.filter_input = app.view().filter().to_string();
                    self.view_mode = ViewMode::Filter;
                    None
                }
                KeyCode::Char('t' | 'T') => {
                    if app.is_paused() {
                        self.trace_detail = app.selected().cloned();
                        if self.trace_detail.is_some() {
                            self.view_mode = ViewMode::Trace;
                        }
                    }
                    None
                }
                KeyCode::Char('?') => {
                    self.view_mode = ViewMode::Help;
                    None
                }
                _ => None,
            },
            ViewMode::Filter => match key.code {
                KeyCode::Esc => {
                    self.filter_input.clear();
                    self.view_mode = ViewMode::Table;
                    None
                }
                KeyCode::Enter => {
                    self.view_mode = ViewMode::Table;
                    Some(Command::SetFilter(std::mem::take(&mut self.filter_input)))
                }
                KeyCode::Backspace => {
                    self.filter_input.pop();
                    None
                }
                KeyCode::Char(c) => {
                    self.filter_input.push(c);
                    None
                }
                _ => None,
            },
            ViewMode::Trace => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | 'Q' | 't' | 'T')
                ) {
                    self.view_mode = ViewMode::Table;
                    self.trace_detail = None;
                }
                None
            }
            // Any key closes help
            ViewMode::Help => {
                self.view_mode = ViewMode::Table;
                None
            }
        }
    }

    fn draw<S: SnapshotSource>(&self, f: &mut Frame, app: &App<S>) {
        let area = f.area();
        let layout = compute_layout(area.width, area.height);
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints(layout.row_constraints())
            .split(area);

        if layout.show_header {
            render_header(f, outer[0], app);
        }

        let view = app.view();
        let title = if view.is_filtered() {
            format!(
                "[ GOROUTINES by {} | \"{}\" {}/{} ]",
                view.sort(),
                view.filter(),
                view.visible_rows().len(),
                view.total()
            )
        } else {
            format!("[ GOROUTINES by {} | {} ]", view.sort(), view.total())
        };
        table::render(f, outer[1], app.rows(), &layout, title);

        if layout.show_status_bar {
            render_status_bar(f, outer[2], self.view_mode, app.is_paused());
        }

        match self.view_mode {
            ViewMode::Filter => render_filter_overlay(f, area, &self.filter_input),
            ViewMode::Trace => {
                if let Some(ref g) = self.trace_detail {
                    render_trace_overlay(f, area, g);
                }
            }
            ViewMode::Help => render_help_overlay(f, area),
            ViewMode::Table => {}
        }
    }
}

// =============================================================================
// PANEL RENDERERS
// =============================================================================

fn render_header<S: SnapshotSource>(f: &mut Frame, area: Rect, app: &App<S>) {
    let (mode, mode_color) =
        if app.is_paused() { ("[PAUSED]", CAUTION_AMBER) } else { ("[LIVE]", CRITICAL_RED) };

    let age = app.engine().last_refresh().map_or_else(
        || "never".to_string(),
        |t| format!("{}s ago", t.elapsed().as_secs()),
    );

    let mut spans = vec![
        Span::styled("GRVIEW", STYLE_HEADING),
        Span::styled(" | ", STYLE_DIM),
        Span::styled(mode, Style::new().fg(mode_color).add_modifier(Modifier::BOLD)),
        Span::styled(" | ", STYLE_DIM),
        Span::styled(app.engine().source().describe(), Style::new().fg(ACCENT_CYAN)),
        Span::styled(" | ", STYLE_DIM),
        Span::styled(format!("{} goroutines", app.view().total()), Style::new().fg(ACCENT_GREEN)),
        Span::styled(" | ", STYLE_DIM),
        Span::styled(format!("refreshed {age}"), STYLE_DIM),
    ];
    if !app.is_paused() && !app.interval().is_zero() {
        spans.push(Span::styled(format!(" (every {}s)", app.interval().as_secs()), STYLE_DIM));
    }
    if let Some(err) = app.last_error() {
        spans.push(Span::styled(" | ", STYLE_DIM));
        spans.push(Span::styled(format!("[!] {err}"), Style::new().fg(CRITICAL_RED)));
    }

    let border = if app.is_paused() { CAUTION_AMBER } else { CRITICAL_RED };
    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::new().fg(border)));
    f.render_widget(header, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, mode: ViewMode, paused: bool) {
    let status_line = match mode {
        ViewMode::Table => {
            let mut spans = vec![
                Span::styled("Q", STYLE_KEY),
                Span::styled(":Quit ", STYLE_DIM),
                Span::styled("R", STYLE_KEY),
                Span::styled(":Refresh ", STYLE_DIM),
                Span::styled("P", STYLE_KEY),
                Span::styled(if paused { ":Resume " } else { ":Pause " }, STYLE_DIM),
                Span::styled("S", STYLE_KEY),
                Span::styled(":Sort ", STYLE_DIM),
                Span::styled("F", STYLE_KEY),
                Span::styled(":Filter ", STYLE_DIM),
            ];
            if paused {
                spans.extend([
                    Span::styled("↑↓", STYLE_KEY),
                    Span::styled(":Select ", STYLE_DIM),
                    Span::styled("Enter", STYLE_KEY),
                    Span::styled(":Expand ", STYLE_DIM),
                    Span::styled("T", STYLE_KEY),
                    Span::styled(":Trace ", STYLE_DIM),
                ]);
            }
            spans.extend([Span::styled("?", STYLE_KEY), Span::styled(":Help", STYLE_DIM)]);
            Line::from(spans)
        }
        ViewMode::Filter => Line::from(vec![
            Span::styled("Enter", STYLE_KEY),
            Span::styled(":Apply ", STYLE_DIM),
            Span::styled("ESC", STYLE_KEY),
            Span::styled(":Cancel ", STYLE_DIM),
            Span::styled("[Filter]", Style::new().fg(CAUTION_AMBER)),
        ]),
        ViewMode::Trace => Line::from(vec![
            Span::styled("ESC", STYLE_KEY),
            Span::styled(":Back ", STYLE_DIM),
            Span::styled("[Trace]", Style::new().fg(CAUTION_AMBER)),
        ]),
        ViewMode::Help => Line::from(vec![
            Span::styled("Any key", STYLE_KEY),
            Span::styled(":Close ", STYLE_DIM),
            Span::styled("[Help]", Style::new().fg(ACCENT_GREEN)),
        ]),
    };

    let status = Paragraph::new(vec![status_line])
        .block(Block::default().borders(Borders::ALL).border_style(Style::new().fg(ACCENT_GREEN)));
    f.render_widget(status, area);
}

// =============================================================================
// OVERLAY RENDERERS
// =============================================================================

/// Create a centered popup area with given width percentage and height in lines
fn centered_popup(area: Rect, width_percent: u16, height_lines: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height_lines), Constraint::Fill(1)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_filter_overlay(f: &mut Frame, area: Rect, query: &str) {
    let popup_area = centered_popup(area, 60, 3);

    let search_widget = Paragraph::new(format!("Filter: {query}_"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Trace contains (Enter to apply, Esc to cancel)")
                .style(Style::default().bg(ratatui::style::Color::Black).fg(ACCENT_GREEN)),
        )
        .style(Style::default().fg(CAUTION_AMBER));

    f.render_widget(Clear, popup_area);
    f.render_widget(search_widget, popup_area);
}

/// Full trace of one goroutine, frozen at the moment the overlay opened
fn render_trace_overlay(f: &mut Frame, area: Rect, g: &Goroutine) {
    let height = area.height.saturating_sub(4).max(8);
    let popup_area = centered_popup(area, 90, height);
    let rule = "─".repeat(popup_area.width.saturating_sub(4) as usize);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Goroutine ", STYLE_LABEL),
            Span::styled(g.id.to_string(), Style::new().fg(ACCENT_CYAN)),
            Span::styled("  State ", STYLE_LABEL),
            Span::styled(g.state.as_str(), Style::new().fg(state_color(&g.state))),
        ]),
        Line::from(vec![
            Span::styled("Created by ", STYLE_LABEL),
            Span::styled(g.created_by.as_deref().unwrap_or("(root)"), STYLE_DIM),
        ]),
        Line::from(rule),
    ];
    for (depth, frame) in g.trace.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{depth:>3} "), STYLE_DIM),
            Span::styled(frame.as_str(), STYLE_TEXT),
        ]));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Trace ({} frames) ", g.trace.len()))
            .style(Style::new().bg(ratatui::style::Color::Black).fg(ACCENT_GREEN)),
    );

    f.render_widget(Clear, popup_area);
    f.render_widget(widget, popup_area);
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let popup_area = centered_popup(area, 70, 22);

    let key_line = |key: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<8}"), STYLE_KEY),
            Span::styled(text, STYLE_TEXT),
        ])
    };

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  What You're Looking At", STYLE_HEADING)),
        Line::from(Span::styled(
            "  Every goroutine of the target, from /debug/pprof/goroutine?debug=2.",
            STYLE_DIM,
        )),
        Line::from(Span::styled(
            "  Live mode refreshes on a timer; pause to select and expand rows.",
            STYLE_DIM,
        )),
        Line::from(""),
        Line::from(Span::styled("  Keys", STYLE_HEADING)),
        key_line("r", "Refresh now"),
        key_line("p", "Pause / resume"),
        key_line("s", "Sort by id / state"),
        key_line("f /", "Filter by trace text"),
        key_line("↑↓ jk", "Move selection (paused)"),
        key_line("Enter", "Expand / collapse row (paused)"),
        key_line("t", "Show full trace (paused)"),
        key_line("q Esc", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", STYLE_DIM)),
    ];

    let help_widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::new().bg(ratatui::style::Color::Black).fg(ACCENT_GREEN)),
    );

    f.render_widget(Clear, popup_area);
    f.render_widget(help_widget, popup_area);
}

// =============================================================================
// EVENT LOOP
// =============================================================================

/// Run the TUI until the user quits.
///
/// `runtime` hosts the refresh timer task; everything else runs on the
/// calling thread.
///
/// # Errors
/// Returns an error if terminal setup or rendering fails
pub fn run<S: SnapshotSource>(app: &mut App<S>, runtime: &Handle) -> Result<(), TuiError> {
    enable_raw_mode()
        .map_err(|e| TuiError::TerminalError(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app, runtime);

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<S: SnapshotSource>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    runtime: &Handle,
) -> Result<(), TuiError> {
    let (command_tx, command_rx) = bounded(TICK_BACKLOG);
    let mut ui = Ui::new();
    let mut timer: Option<RefreshTimer> = None;
    let mut dirty = true;

    loop {
        // Timer only while the table is showing a live view
        let want_timer = ui.view_mode == ViewMode::Table && app.wants_timer();
        if want_timer && timer.is_none() {
            timer = Some(RefreshTimer::start(runtime, command_tx.clone(), TIMER_CADENCE));
        } else if !want_timer {
            timer = None;
        }

        if drain_commands(&command_rx, app, &mut dirty) {
            return Ok(());
        }

        if dirty {
            terminal.draw(|f| ui.draw(f, app))?;
            dirty = false;
        }

        if event::poll(INPUT_POLL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    dirty = true;
                    if let Some(command) = ui.handle_key(key, app) {
                        if app.dispatch(command) == Outcome::Quit {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }
    }
}

/// Apply queued timer commands. Returns true when one asked to quit.
///
/// Any number of queued ticks count as one, so a pass polls at most once and
/// the loop gets back to reading keys even when every poll fails slowly.
fn drain_commands<S: SnapshotSource>(
    commands: &Receiver<Command>,
    app: &mut App<S>,
    dirty: &mut bool,
) -> bool {
    let mut ticked = false;
    while let Ok(command) = commands.try_recv() {
        if command == Command::Tick {
            ticked = true;
            continue;
        }
        match app.dispatch(command) {
            Outcome::Quit => return true,
            Outcome::Redraw | Outcome::Unchanged => *dirty = true,
        }
    }
    if ticked {
        // Ticks also advance the "refreshed Ns ago" header
        *dirty = true;
        return app.dispatch(Command::Tick) == Outcome::Quit;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceError;
    use crate::engine::tests::ScriptedSource;
    use crate::engine::LiveState;
    use crate::source::ReplaySource;
    use crate::view::ViewState;
    use crossbeam_channel::unbounded;
    use grview_common::Snapshot;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    const DUMP: &[u8] = b"goroutine 1 [running]:\nmain.worker()\n\t/a.go:10 +0x1\n\n\
        goroutine 2 [sleeping]:\nmain.idle()\n\t/b.go:20 +0x2\n";

    fn app(paused: bool) -> App<ReplaySource> {
        let engine = LiveState::new(ReplaySource::new("test", DUMP.to_vec()));
        App::new(engine, ViewState::default(), Duration::from_secs(5), paused)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_table_keys_map_to_commands() {
        let app = app(false);
        let mut ui = Ui::new();

        assert_eq!(ui.handle_key(press(KeyCode::Char('r')), &app), Some(Command::RefreshNow));
        assert_eq!(ui.handle_key(press(KeyCode::Char('p')), &app), Some(Command::TogglePause));
        assert_eq!(ui.handle_key(press(KeyCode::Char('s')), &app), Some(Command::ToggleSort));
        assert_eq!(ui.handle_key(press(KeyCode::Down), &app), Some(Command::CursorDown));
        assert_eq!(ui.handle_key(press(KeyCode::Enter), &app), Some(Command::ToggleExpand));
        assert_eq!(ui.handle_key(press(KeyCode::Char('q')), &app), Some(Command::Quit));
        assert_eq!(
            ui.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &app),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_filter_input_applies_on_enter() {
        let app = app(false);
        let mut ui = Ui::new();

        assert_eq!(ui.handle_key(press(KeyCode::Char('/')), &app), None);
        assert_eq!(ui.view_mode, ViewMode::Filter);
        for c in "idlex".chars() {
            ui.handle_key(press(KeyCode::Char(c)), &app);
        }
        ui.handle_key(press(KeyCode::Backspace), &app);

        assert_eq!(
            ui.handle_key(press(KeyCode::Enter), &app),
            Some(Command::SetFilter("idle".into()))
        );
        assert_eq!(ui.view_mode, ViewMode::Table);
    }

    #[test]
    fn test_filter_input_escape_cancels() {
        let app = app(false);
        let mut ui = Ui::new();

        ui.handle_key(press(KeyCode::Char('f')), &app);
        ui.handle_key(press(KeyCode::Char('x')), &app);
        assert_eq!(ui.handle_key(press(KeyCode::Esc), &app), None);
        assert_eq!(ui.view_mode, ViewMode::Table);
    }

    #[test]
    fn test_trace_overlay_only_when_paused() {
        let mut ui = Ui::new();

        ui.handle_key(press(KeyCode::Char('t')), &app(false));
        assert_eq!(ui.view_mode, ViewMode::Table);

        ui.handle_key(press(KeyCode::Char('t')), &app(true));
        assert_eq!(ui.view_mode, ViewMode::Trace);
        assert_eq!(ui.trace_detail.as_ref().map(|g| g.id), Some(1));

        ui.handle_key(press(KeyCode::Esc), &app(true));
        assert_eq!(ui.view_mode, ViewMode::Table);
        assert!(ui.trace_detail.is_none());
    }

    #[test]
    fn test_drain_commands_dispatches_ticks() {
        let mut app = app(true);
        let (tx, rx) = unbounded();
        let mut dirty = false;

        tx.send(Command::Tick).unwrap();
        assert!(!drain_commands(&rx, &mut app, &mut dirty));
        assert!(dirty);

        tx.send(Command::Quit).unwrap();
        assert!(drain_commands(&rx, &mut app, &mut dirty));
    }

    #[test]
    fn test_queued_ticks_poll_once_per_drain() {
        let failures = (0..10).map(|_| Err(503)).collect();
        let engine = LiveState::new(ScriptedSource::new(failures));
        let mut app = App::new(engine, ViewState::default(), Duration::from_secs(5), false);
        assert!(!app.is_paused());
        assert_eq!(app.engine().source().fetches, 1);

        let (tx, rx) = unbounded();
        let mut dirty = false;
        for _ in 0..5 {
            tx.send(Command::Tick).unwrap();
        }
        assert!(!drain_commands(&rx, &mut app, &mut dirty));
        assert!(dirty);
        assert_eq!(app.engine().source().fetches, 2);
        assert!(rx.is_empty());

        // Other commands still apply in order around the collapsed ticks
        tx.send(Command::Tick).unwrap();
        tx.send(Command::ToggleSort).unwrap();
        tx.send(Command::Tick).unwrap();
        assert!(!drain_commands(&rx, &mut app, &mut dirty));
        assert_eq!(app.engine().source().fetches, 3);
        assert_eq!(app.view().sort(), crate::view::SortKey::ByState);
        assert!(app.last_error().is_some());
    }

    /// Fails every fetch after a delay, like a target that times out
    struct SlowFailingSource {
        delay: Duration,
        fetches: Arc<AtomicUsize>,
    }

    impl SnapshotSource for SlowFailingSource {
        fn fetch(&mut self) -> Result<Snapshot, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            Err(SourceError::Transport { url: "slow".into(), reason: "timed out".into() })
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drain_returns_while_slow_target_keeps_failing() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source =
            SlowFailingSource { delay: Duration::from_millis(100), fetches: fetches.clone() };
        let engine = LiveState::new(source);
        let mut app = App::new(engine, ViewState::default(), Duration::from_millis(1), false);

        // Timer cadence far shorter than a fetch
        let (tx, rx) = bounded(TICK_BACKLOG);
        let timer = RefreshTimer::start(&Handle::current(), tx, Duration::from_millis(10));

        let elapsed = tokio::task::spawn_blocking(move || {
            let mut dirty = false;
            let start = Instant::now();
            for _ in 0..5 {
                std::thread::sleep(Duration::from_millis(30));
                assert!(!drain_commands(&rx, &mut app, &mut dirty));
            }
            start.elapsed()
        })
        .await
        .unwrap();
        drop(timer);

        // One initial fetch plus at most one per drain
        assert!(fetches.load(Ordering::SeqCst) <= 6);
        assert!(elapsed < Duration::from_secs(3), "drains took {elapsed:?}");
    }
}
