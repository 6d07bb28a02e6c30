//! CLI argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::view::SortKey;

#[derive(Parser, Debug)]
#[command(
    name = "grview",
    about = "Live goroutine viewer for Go processes exposing net/http/pprof",
    after_help = "\
EXAMPLES:
    grview                                   Watch localhost:1234/debug/pprof
    grview --host 10.0.0.5:6060 -i 2         Refresh every 2 seconds
    grview goroutine.txt captures/           Browse saved dumps (starts paused)
    grview --headless --export out.json      Write one snapshot as JSON and exit"
)]
pub struct Args {
    /// Dump files, directories or .zip captures to browse instead of a live target
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Target host:port serving pprof
    #[arg(long, default_value = "localhost:1234")]
    pub host: String,

    /// Base path of the pprof handlers on the target
    #[arg(long, default_value = "/debug/pprof")]
    pub endpoint: String,

    /// Seconds between refreshes (0 = start paused)
    #[arg(short, long, default_value = "5")]
    pub interval: u64,

    /// Initial sort order
    #[arg(long, value_enum, default_value_t = SortArg::Id)]
    pub sort: SortArg,

    /// Initial filter: only show goroutines with a frame containing TEXT
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub filter: String,

    /// Export the visible goroutines as JSON on exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Run without TUI (requires --export)
    #[arg(long, requires = "export")]
    pub headless: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Id,
    State,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => SortKey::ById,
            SortArg::State => SortKey::ByState,
        }
    }
}
