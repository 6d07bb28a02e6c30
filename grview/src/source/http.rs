//! Live source: pull the verbose goroutine dump over HTTP.

use std::io::Read;
use std::time::Duration;

use super::SnapshotSource;
use crate::domain::{SourceError, Target};
use grview_common::{parse, Snapshot};

/// Upper bound on a single fetch so a hung target cannot stall the UI
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches `http://<host>/<endpoint>/goroutine?debug=2`
pub struct HttpSource {
    agent: ureq::Agent,
    target: Target,
    url: String,
}

impl HttpSource {
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self::with_timeout(target, FETCH_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(target: Target, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let url = target.goroutine_url();
        Self { agent, target, url }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn get_body(&self) -> Result<Vec<u8>, SourceError> {
        let response = self.agent.get(&self.url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => SourceError::Status { url: self.url.clone(), status },
            ureq::Error::Transport(t) => {
                SourceError::Transport { url: self.url.clone(), reason: t.to_string() }
            }
        })?;

        // ureq already errors on 4xx/5xx; this catches 1xx and unfollowed 3xx
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(SourceError::Status { url: self.url.clone(), status });
        }

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|source| SourceError::Body { url: self.url.clone(), source })?;
        Ok(body)
    }
}

impl SnapshotSource for HttpSource {
    fn fetch(&mut self) -> Result<Snapshot, SourceError> {
        let body = self.get_body()?;
        log::debug!("fetched {} bytes from {}", body.len(), self.url);
        Ok(parse(&body))
    }

    fn describe(&self) -> String {
        self.target.to_string()
    }
}
