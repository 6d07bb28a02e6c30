//! Snapshot sources
//!
//! A source hands back one parsed [`Snapshot`] per call. Exactly one kind is
//! active per run, picked at startup:
//!
//! - [`HttpSource`] - GET `goroutine?debug=2` from a live `net/http/pprof` target
//! - [`ReplaySource`] - re-parse a dump loaded from files or archives ([`ingest`])

pub mod http;
pub mod ingest;
pub mod replay;

pub use http::{HttpSource, FETCH_TIMEOUT};
pub use replay::ReplaySource;

use crate::domain::SourceError;
use grview_common::Snapshot;

/// Something that can produce a fresh goroutine snapshot.
pub trait SnapshotSource {
    /// Obtain and parse one dump.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the dump could not be retrieved. Malformed
    /// blocks inside a retrieved dump are not errors; they are omitted.
    fn fetch(&mut self) -> Result<Snapshot, SourceError>;

    /// Short human-readable origin for headers and exports
    fn describe(&self) -> String;
}

/// The source selected for this run
pub enum Source {
    Http(HttpSource),
    Replay(ReplaySource),
}

impl Source {
    /// Replay input never changes, so the viewer starts paused on it
    #[must_use]
    pub fn is_replay(&self) -> bool {
        matches!(self, Source::Replay(_))
    }
}

impl SnapshotSource for Source {
    fn fetch(&mut self) -> Result<Snapshot, SourceError> {
        match self {
            Source::Http(s) => s.fetch(),
            Source::Replay(s) => s.fetch(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Http(s) => s.describe(),
            Source::Replay(s) => s.describe(),
        }
    }
}
