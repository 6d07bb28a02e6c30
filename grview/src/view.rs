//! # View Projection
//!
//! Derives the visible rows from a snapshot:
//!
//! ```text
//! Snapshot → sort (id | state, id) → filter (trace substring) → visible rows
//! ```
//!
//! The projection owns its UI state (sort key, filter, cursor, expanded ids)
//! and keeps the last projected rows, so cursor movement is clamped against
//! exactly what is on screen. Expanded ids survive rebuilds because goroutine
//! ids are stable across snapshots of the same process.

use std::collections::HashSet;
use std::fmt;

use grview_common::{Goroutine, Snapshot};

/// Active ordering of the visible rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Ascending goroutine id
    #[default]
    ById,
    /// Ascending state, ties by ascending id
    ByState,
}

impl SortKey {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortKey::ById => SortKey::ByState,
            SortKey::ByState => SortKey::ById,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::ById => write!(f, "id"),
            SortKey::ByState => write!(f, "state"),
        }
    }
}

/// Sort a copy of the snapshot and keep the rows matching `filter`.
///
/// Empty `filter` keeps everything. Matching is a literal, case-sensitive
/// substring test against each trace entry.
#[must_use]
pub fn project(snapshot: &Snapshot, sort: SortKey, filter: &str) -> Vec<Goroutine> {
    let mut rows: Vec<Goroutine> = snapshot
        .goroutines()
        .iter()
        .filter(|g| filter.is_empty() || g.trace_contains(filter))
        .cloned()
        .collect();

    match sort {
        SortKey::ById => rows.sort_by_key(|g| g.id),
        SortKey::ByState => rows.sort_by(|a, b| a.state.cmp(&b.state).then(a.id.cmp(&b.id))),
    }
    rows
}

/// Sorted, filtered rows plus the cursor and expansion state over them.
#[derive(Debug, Default)]
pub struct ViewState {
    sort: SortKey,
    filter: String,
    cursor: usize,
    expanded: HashSet<u64>,
    /// Last projection (what the renderer draws)
    rows: Vec<Goroutine>,
    /// Size of the snapshot the rows were projected from
    total: usize,
}

impl ViewState {
    #[must_use]
    pub fn new(sort: SortKey, filter: impl Into<String>) -> Self {
        Self { sort, filter: filter.into(), ..Self::default() }
    }

    /// Re-project `snapshot` with the current sort and filter.
    ///
    /// The cursor index is kept and clamped to the new row count.
    pub fn rebuild(&mut self, snapshot: &Snapshot) {
        self.rows = project(snapshot, self.sort, &self.filter);
        self.total = snapshot.len();
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    #[must_use]
    pub fn visible_rows(&self) -> &[Goroutine] {
        &self.rows
    }

    /// Goroutines in the snapshot before filtering
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Move the cursor by `delta`, clamped to the visible rows.
    ///
    /// Returns whether the position changed; always false with no rows.
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        let last = self.rows.len() - 1;
        let target = self.cursor.saturating_add_signed(delta).min(last);
        let changed = target != self.cursor;
        self.cursor = target;
        changed
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Goroutine> {
        self.rows.get(self.cursor)
    }

    /// Flip whether `id` shows its full trace. Does not reorder anything.
    pub fn toggle_expand(&mut self, id: u64) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    #[must_use]
    pub fn is_expanded(&self, id: u64) -> bool {
        self.expanded.contains(&id)
    }

    #[must_use]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        !self.filter.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_goroutine(id: u64, state: &str, frames: &[&str]) -> Goroutine {
        Goroutine {
            id,
            state: state.to_string(),
            created_by: None,
            trace: frames.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    fn sample() -> Snapshot {
        Snapshot::new(vec![
            make_goroutine(7, "select", &["main.loop() /l.go:3 +0x1"]),
            make_goroutine(2, "sleeping", &["main.idle() /b.go:20 +0x2"]),
            make_goroutine(5, "chan receive", &["main.recv() /r.go:9 +0x3"]),
            make_goroutine(
                1,
                "select",
                &["main.main() /m.go:1 +0x4", "runtime.main() /proc.go:267"],
            ),
        ])
    }

    fn ids(rows: &[Goroutine]) -> Vec<u64> {
        rows.iter().map(|g| g.id).collect()
    }

    #[test]
    fn test_sort_by_id() {
        let rows = project(&sample(), SortKey::ById, "");
        assert_eq!(ids(&rows), vec![1, 2, 5, 7]);
    }

    #[test]
    fn test_sort_by_state_breaks_ties_by_id() {
        let rows = project(&sample(), SortKey::ByState, "");
        assert_eq!(ids(&rows), vec![5, 1, 7, 2]);
        assert!(rows.windows(2).all(|w| w[0].state < w[1].state
            || (w[0].state == w[1].state && w[0].id < w[1].id)));
    }

    #[test]
    fn test_filter_matches_any_frame_literally() {
        let rows = project(&sample(), SortKey::ById, "runtime.main");
        assert_eq!(ids(&rows), vec![1]);

        // Case-sensitive, and not a pattern language
        assert!(project(&sample(), SortKey::ById, "MAIN").is_empty());
        assert!(project(&sample(), SortKey::ById, "main.*").is_empty());
    }

    #[test]
    fn test_filter_partition_is_exact() {
        let snapshot = sample();
        let needle = ".go:2";
        let rows = project(&snapshot, SortKey::ById, needle);

        for g in snapshot.goroutines() {
            let kept = rows.iter().any(|r| r.id == g.id);
            assert_eq!(kept, g.trace.iter().any(|f| f.contains(needle)), "goroutine {}", g.id);
        }
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let mut view = ViewState::default();
        view.rebuild(&sample());

        assert!(!view.move_cursor(-1));
        assert_eq!(view.cursor(), 0);

        assert!(view.move_cursor(10));
        assert_eq!(view.cursor(), 3);
        assert!(!view.move_cursor(1));
        assert_eq!(view.cursor(), 3);

        assert!(view.move_cursor(-1));
        assert_eq!(view.selected().map(|g| g.id), Some(5));
    }

    #[test]
    fn test_cursor_on_empty_rows_is_noop() {
        let mut view = ViewState::new(SortKey::ById, "nothing matches this");
        view.rebuild(&sample());

        assert!(view.visible_rows().is_empty());
        assert!(!view.move_cursor(1));
        assert!(!view.move_cursor(-1));
        assert_eq!(view.cursor(), 0);
        assert!(view.selected().is_none());
    }

    #[test]
    fn test_rebuild_clamps_cursor_to_shorter_set() {
        let mut view = ViewState::default();
        view.rebuild(&sample());
        view.move_cursor(3);

        view.set_filter("main.idle");
        view.rebuild(&sample());
        assert_eq!(view.cursor(), 0);
        assert_eq!(view.total(), 4);
        assert_eq!(view.visible_rows().len(), 1);
    }

    #[test]
    fn test_toggle_expand_keeps_order() {
        let mut view = ViewState::default();
        view.rebuild(&sample());
        let before = ids(view.visible_rows());

        view.toggle_expand(5);
        assert!(view.is_expanded(5));
        view.rebuild(&sample());
        assert_eq!(ids(view.visible_rows()), before);

        view.toggle_expand(5);
        assert!(!view.is_expanded(5));
    }
}
