//! Domain types providing self-documenting signatures

use std::fmt;

/// Suffix of the verbose goroutine profile under the pprof base path
const GOROUTINE_PROFILE: &str = "goroutine?debug=2";

/// HTTP target exposing `net/http/pprof`
///
/// `host` is `host:port`; `endpoint` is the pprof base path and may carry
/// leading or trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub endpoint: String,
}

impl Target {
    pub fn new(host: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { host: host.into(), endpoint: endpoint.into() }
    }

    /// Full URL of the verbose goroutine dump
    #[must_use]
    pub fn goroutine_url(&self) -> String {
        let base = self.endpoint.trim_matches('/');
        if base.is_empty() {
            format!("http://{}/{GOROUTINE_PROFILE}", self.host)
        } else {
            format!("http://{}/{base}/{GOROUTINE_PROFILE}", self.host)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)
    }
}
