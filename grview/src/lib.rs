//! # grview - Live Goroutine Viewer
//!
//! grview polls a Go process's `net/http/pprof` goroutine dump (or replays a
//! saved one) and shows every goroutine in a sortable, filterable terminal
//! table that can be paused and drilled into.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  HttpSource (ureq)   │  or  │ ReplaySource (files, │
//! │  goroutine?debug=2   │      │   dirs, .zip)        │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            └──────────────┬──────────────┘
//!                           ▼ bytes → grview_common::parse
//!                ┌──────────────────────┐
//!                │  LiveState (engine)  │  retained / frozen snapshot
//!                └──────────┬───────────┘
//!                           ▼ Snapshot
//!                ┌──────────────────────┐
//!                │ ViewState (projection)│ sort, filter, cursor, expand
//!                └──────────┬───────────┘
//!                           ▼ rows
//!     Commands ──▶   App::dispatch   ──▶  TUI / JSON export
//!   (keys, timer)
//! ```
//!
//! ## Module Structure
//!
//! - [`source`]: where dumps come from (HTTP or replay) and replay ingestion
//! - [`engine`]: polling, pause/resume, deep-cloned replays of a frozen snapshot
//! - [`view`]: sort/filter projection, cursor clamping, expanded rows
//! - [`app`]: command dispatch and display rows, the single writer of all state
//! - [`timer`]: cancellable background tick task
//! - [`export`]: JSON export of the visible rows
//! - [`tui`]: ratatui front-end
//! - [`cli`]: command-line arguments
//! - [`domain`]: target URL and error types
//!
//! ## Operational Modes
//!
//! 1. **Live** (default): refresh every `--interval` seconds from `--host`
//! 2. **Replay** (`grview dump.txt captures/`): start paused on saved dumps
//! 3. **Headless** (`--headless --export out.json`): one snapshot, no TUI

pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod export;
pub mod source;
pub mod timer;
pub mod tui;
pub mod view;

pub use grview_common::{parse, Goroutine, Snapshot};
