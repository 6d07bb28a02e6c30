//! # Command Dispatch
//!
//! [`App`] is the single writer for the engine and the view state. The
//! terminal front-end and the refresh timer only produce [`Command`]s; the
//! event loop feeds them to [`App::dispatch`] one at a time and redraws when
//! told to.
//!
//! ## Modes
//!
//! - **Live** - periodic polls; cursor and expand commands are inert because
//!   the next poll may reorder the rows under the cursor.
//! - **Paused** - the engine replays a frozen snapshot; cursor and expand work.

use std::time::Duration;

use crate::engine::LiveState;
use crate::source::SnapshotSource;
use crate::view::ViewState;
use grview_common::{Goroutine, Snapshot};

/// User and timer input, consumed in order by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RefreshNow,
    TogglePause,
    ToggleSort,
    SetFilter(String),
    CursorUp,
    CursorDown,
    ToggleExpand,
    /// Timer wake-up; refreshes only when the interval has elapsed
    Tick,
    Quit,
}

/// What the event loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Unchanged,
    Quit,
}

/// Display data for one visible goroutine, computed on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub id: u64,
    pub state: &'a str,
    pub created_by: Option<&'a str>,
    /// Innermost frame, shown when collapsed
    pub summary: &'a str,
    pub expanded: bool,
    /// Lines shown under the row when expanded: the state, then the outer frames
    pub detail: Vec<&'a str>,
    pub selected: bool,
}

impl<'a> Row<'a> {
    fn new(g: &'a Goroutine, expanded: bool, selected: bool) -> Self {
        let detail = if expanded {
            std::iter::once(g.state.as_str())
                .chain(g.trace.iter().skip(1).map(String::as_str))
                .collect()
        } else {
            Vec::new()
        };
        Self {
            id: g.id,
            state: &g.state,
            created_by: g.created_by.as_deref(),
            summary: g.summary(),
            expanded,
            detail,
            selected,
        }
    }
}

/// Engine plus view state, driven by [`Command`]s.
pub struct App<S> {
    engine: LiveState<S>,
    view: ViewState,
    /// Snapshot the rows were last projected from
    snapshot: Snapshot,
    interval: Duration,
}

impl<S: SnapshotSource> App<S> {
    /// Build the app and run the first poll.
    ///
    /// A zero `interval` or `start_paused` freezes on whatever that first poll
    /// produced.
    pub fn new(
        engine: LiveState<S>,
        view: ViewState,
        interval: Duration,
        start_paused: bool,
    ) -> Self {
        let mut app = Self { engine, view, snapshot: Snapshot::default(), interval };
        app.refresh();
        if start_paused || interval.is_zero() {
            app.engine.freeze(true);
        }
        app
    }

    /// Apply one command. Never fails; poll errors surface via [`App::last_error`].
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        match command {
            Command::Quit => Outcome::Quit,
            Command::RefreshNow => self.refresh(),
            Command::Tick => {
                if !self.is_paused() && self.engine.refresh_due(self.interval) {
                    self.refresh()
                } else {
                    Outcome::Unchanged
                }
            }
            Command::TogglePause => {
                self.engine.freeze(!self.is_paused());
                Outcome::Redraw
            }
            Command::ToggleSort => {
                self.view.set_sort(self.view.sort().toggled());
                self.view.rebuild(&self.snapshot);
                Outcome::Redraw
            }
            Command::SetFilter(filter) => {
                self.view.set_filter(filter);
                self.view.rebuild(&self.snapshot);
                Outcome::Redraw
            }
            Command::CursorUp => self.move_cursor(-1),
            Command::CursorDown => self.move_cursor(1),
            Command::ToggleExpand => {
                if !self.is_paused() {
                    return Outcome::Unchanged;
                }
                match self.view.selected().map(|g| g.id) {
                    Some(id) => {
                        self.view.toggle_expand(id);
                        Outcome::Redraw
                    }
                    None => Outcome::Unchanged,
                }
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) -> Outcome {
        if self.is_paused() && self.view.move_cursor(delta) {
            Outcome::Redraw
        } else {
            Outcome::Unchanged
        }
    }

    /// Poll and re-project. A failed poll leaves the rows as they were.
    fn refresh(&mut self) -> Outcome {
        match self.engine.poll() {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.view.rebuild(&self.snapshot);
                Outcome::Redraw
            }
            // Redraw anyway so the error shows in the header
            Err(_) => Outcome::Redraw,
        }
    }

    /// Visible rows in display order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        let cursor = self.view.cursor();
        let paused = self.is_paused();
        self.view
            .visible_rows()
            .iter()
            .enumerate()
            .map(move |(idx, g)| Row::new(g, self.view.is_expanded(g.id), paused && idx == cursor))
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Goroutine> {
        self.view.selected()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.engine.is_frozen()
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn engine(&self) -> &LiveState<S> {
        &self.engine
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.engine.last_error()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Live with a non-zero interval: the refresh timer should be running
    #[must_use]
    pub fn wants_timer(&self) -> bool {
        !self.is_paused() && !self.interval.is_zero()
    }
}
