//! Replay source: serve a dump loaded once at startup.

use super::SnapshotSource;
use crate::domain::SourceError;
use grview_common::{parse, Snapshot};

/// Re-parses the same preloaded bytes on every fetch
pub struct ReplaySource {
    label: String,
    raw: Vec<u8>,
}

impl ReplaySource {
    pub fn new(label: impl Into<String>, raw: Vec<u8>) -> Self {
        Self { label: label.into(), raw }
    }
}

impl SnapshotSource for ReplaySource {
    fn fetch(&mut self) -> Result<Snapshot, SourceError> {
        Ok(parse(&self.raw))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_fetch_is_repeatable() {
        let dump = b"goroutine 1 [running]:\nmain.main()\n\t/m.go:3 +0x1\n".to_vec();
        let mut source = ReplaySource::new("capture.txt", dump);

        let first = source.fetch().unwrap();
        let second = source.fetch().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(source.describe(), "capture.txt");
    }
}
