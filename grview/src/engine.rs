//! # Live State Engine
//!
//! Drives a [`SnapshotSource`] and keeps the last good snapshot.
//!
//! ```text
//!            freeze(true)
//!   Live ────────────────▶ Frozen
//!    ▲  poll(): fetch       │ poll(): deep clone of baseline
//!    └──────────────────────┘
//!            freeze(false)
//! ```
//!
//! A failed fetch never touches retained state, so the view keeps showing
//! stale-but-valid data. While frozen the source is never called and each
//! poll returns an independent copy of the baseline: callers may decorate
//! what they get back without corrupting later polls.

use std::time::{Duration, Instant};

use crate::domain::SourceError;
use crate::source::SnapshotSource;
use grview_common::Snapshot;

/// Owns the source plus the retained and frozen snapshots.
pub struct LiveState<S> {
    source: S,
    /// Last successfully fetched snapshot
    retained: Option<Snapshot>,
    /// Baseline replayed while paused
    frozen: Option<Snapshot>,
    last_refresh: Option<Instant>,
    last_error: Option<String>,
}

impl<S: SnapshotSource> LiveState<S> {
    pub fn new(source: S) -> Self {
        Self { source, retained: None, frozen: None, last_refresh: None, last_error: None }
    }

    /// Produce the snapshot to display next.
    ///
    /// # Errors
    /// Returns the source's error when live; retained state is left untouched.
    pub fn poll(&mut self) -> Result<Snapshot, SourceError> {
        if let Some(baseline) = &self.frozen {
            self.last_refresh = Some(Instant::now());
            return Ok(baseline.deep_clone());
        }

        match self.source.fetch() {
            Ok(snapshot) => {
                self.retained = Some(snapshot.clone());
                self.last_refresh = Some(Instant::now());
                self.last_error = None;
                Ok(snapshot)
            }
            Err(e) => {
                log::warn!("poll failed, keeping previous snapshot: {e}");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Pause (`true`) on the current retained snapshot, or resume (`false`).
    ///
    /// Freezing before any successful fetch freezes an empty snapshot.
    pub fn freeze(&mut self, on: bool) {
        if on {
            if self.frozen.is_none() {
                self.frozen = Some(self.retained.clone().unwrap_or_default());
                let count = self.frozen.as_ref().map_or(0, Snapshot::len);
                log::info!("paused on {count} goroutines");
            }
        } else if self.frozen.take().is_some() {
            log::info!("resumed live polling of {}", self.source.describe());
        }
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// True when `interval` has passed since the last successful poll
    #[must_use]
    pub fn refresh_due(&self, interval: Duration) -> bool {
        self.last_refresh.map_or(true, |t| t.elapsed() >= interval)
    }

    #[must_use]
    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn retained(&self) -> Option<&Snapshot> {
        self.retained.as_ref()
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use grview_common::parse;
    use std::collections::VecDeque;

    /// Scripted source that counts fetches
    pub(crate) struct ScriptedSource {
        pub responses: VecDeque<Result<Vec<u8>, u16>>,
        pub fetches: usize,
    }

    impl ScriptedSource {
        pub(crate) fn new(responses: Vec<Result<&str, u16>>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|r| r.map(|s| s.as_bytes().to_vec()))
                    .collect(),
                fetches: 0,
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        fn fetch(&mut self) -> Result<Snapshot, SourceError> {
            self.fetches += 1;
            match self.responses.pop_front() {
                Some(Ok(body)) => Ok(parse(&body)),
                Some(Err(status)) => Err(SourceError::Status { url: "scripted".into(), status }),
                None => Err(SourceError::Transport {
                    url: "scripted".into(),
                    reason: "exhausted".into(),
                }),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    const DUMP_A: &str = "goroutine 1 [running]:\nmain.worker()\n\t/a.go:10 +0x1\n\n\
        goroutine 2 [sleeping]:\nmain.idle()\n\t/b.go:20 +0x2\n";
    const DUMP_B: &str = "goroutine 1 [running]:\nmain.worker()\n\t/a.go:11 +0x1\n";

    #[test]
    fn test_live_poll_replaces_retained() {
        let mut state = LiveState::new(ScriptedSource::new(vec![Ok(DUMP_A), Ok(DUMP_B)]));

        assert_eq!(state.poll().unwrap().len(), 2);
        assert_eq!(state.poll().unwrap().len(), 1);
        assert_eq!(state.retained().map(Snapshot::len), Some(1));
        assert_eq!(state.source().fetches, 2);
    }

    #[test]
    fn test_failed_poll_keeps_last_good() {
        let mut state = LiveState::new(ScriptedSource::new(vec![Ok(DUMP_A), Err(503)]));

        state.poll().unwrap();
        let before = state.last_refresh();
        let err = state.poll().unwrap_err();

        assert!(matches!(err, SourceError::Status { status: 503, .. }));
        assert_eq!(state.retained().map(Snapshot::len), Some(2));
        assert_eq!(state.last_refresh(), before);
        assert!(state.last_error().is_some_and(|e| e.contains("503")));
    }

    #[test]
    fn test_frozen_poll_never_fetches() {
        let mut state = LiveState::new(ScriptedSource::new(vec![Ok(DUMP_A)]));
        state.poll().unwrap();
        state.freeze(true);

        for _ in 0..3 {
            assert_eq!(state.poll().unwrap().len(), 2);
        }
        assert_eq!(state.source().fetches, 1);
    }

    #[test]
    fn test_frozen_poll_is_idempotent_under_mutation() {
        let mut state = LiveState::new(ScriptedSource::new(vec![Ok(DUMP_A)]));
        state.poll().unwrap();
        state.freeze(true);

        let mut first = state.poll().unwrap();
        for g in first.goroutines_mut() {
            g.trace[0] = g.state.clone();
        }
        let second = state.poll().unwrap();

        assert_eq!(second, parse(DUMP_A.as_bytes()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_unfreeze_resumes_fetching() {
        let mut state = LiveState::new(ScriptedSource::new(vec![Ok(DUMP_A), Ok(DUMP_B)]));
        state.poll().unwrap();
        state.freeze(true);
        state.poll().unwrap();
        state.freeze(false);

        assert!(!state.is_frozen());
        assert_eq!(state.poll().unwrap().len(), 1);
        assert_eq!(state.source().fetches, 2);
    }

    #[test]
    fn test_freeze_without_data_is_empty() {
        let mut state = LiveState::new(ScriptedSource::new(vec![]));
        state.freeze(true);

        assert!(state.poll().unwrap().is_empty());
        assert_eq!(state.source().fetches, 0);
    }

    #[test]
    fn test_refresh_due() {
        let mut state = LiveState::new(ScriptedSource::new(vec![Ok(DUMP_A)]));
        assert!(state.refresh_due(Duration::from_secs(5)));

        state.poll().unwrap();
        assert!(!state.refresh_due(Duration::from_secs(5)));
        assert!(state.refresh_due(Duration::ZERO));
    }
}
