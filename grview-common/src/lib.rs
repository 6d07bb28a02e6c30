//! # Goroutine Dump Format
//!
//! Data structures and the parser for the verbose goroutine dump emitted by
//! Go's `/debug/pprof/goroutine?debug=2` endpoint. Shared by the live viewer,
//! the replay loader and the JSON exporter.
//!
//! ## Dump Shape
//!
//! ```text
//! goroutine 42 [chan receive, 5 minutes]:
//! main.worker(0xc000010000)
//! 	/src/app/worker.go:31 +0x45
//! created by main.main in goroutine 1
//! 	/src/app/main.go:12 +0x8f
//! ```
//!
//! ## Key Types
//!
//! - [`Goroutine`] - One goroutine at snapshot time (id, state, trace)
//! - [`Snapshot`] - Ordered goroutines captured from one dump
//! - [`parse`] - Bytes → [`Snapshot`], never fails

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Header prefix opening every goroutine block
const HEADER_PREFIX: &str = "goroutine ";

/// Trailer prefix naming the spawning call site
const CREATED_BY_PREFIX: &str = "created by ";

/// Go prints this in place of frames beyond its traceback limit
const ELIDED_MARKER: &str = "...additional frames elided...";

/// A single goroutine from a dump.
///
/// `id` is assigned by the Go runtime and is stable for the lifetime of the
/// goroutine, so it doubles as the identity key across snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Goroutine {
    pub id: u64,
    /// Canonical state with any wait duration stripped (`"chan receive"`)
    pub state: String,
    /// Spawning function and location, `None` for root goroutines
    pub created_by: Option<String>,
    /// Frames innermost first, each `"<call> <file:line +0xoff>"`
    pub trace: Vec<String>,
}

impl Goroutine {
    /// One-line description shown for a collapsed row (the innermost frame)
    #[must_use]
    pub fn summary(&self) -> &str {
        self.trace.first().map_or("", String::as_str)
    }

    /// True when any trace entry contains `needle` (literal, case-sensitive)
    #[must_use]
    pub fn trace_contains(&self, needle: &str) -> bool {
        self.trace.iter().any(|frame| frame.contains(needle))
    }
}

/// Goroutines captured from one dump, in dump order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    goroutines: Vec<Goroutine>,
}

impl Snapshot {
    #[must_use]
    pub fn new(goroutines: Vec<Goroutine>) -> Self {
        Self { goroutines }
    }

    #[must_use]
    pub fn goroutines(&self) -> &[Goroutine] {
        &self.goroutines
    }

    /// Mutable access for consumers that decorate a snapshot they own
    pub fn goroutines_mut(&mut self) -> &mut [Goroutine] {
        &mut self.goroutines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.goroutines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goroutines.is_empty()
    }

    /// Fresh copy of every record and trace, dropping records with an empty trace.
    ///
    /// The copy shares no storage with `self`, so mutating it can never leak
    /// back into a retained snapshot.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let goroutines = self
            .goroutines
            .iter()
            .filter(|g| !g.trace.is_empty())
            .map(|g| Goroutine {
                id: g.id,
                state: g.state.clone(),
                created_by: g.created_by.clone(),
                trace: g.trace.clone(),
            })
            .collect();
        Self { goroutines }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a raw dump into a [`Snapshot`].
///
/// Never fails. Blocks with an unreadable header or no frames are dropped,
/// as are repeated ids (first occurrence wins), so a truncated or concatenated
/// dump still yields every goroutine that could be read.
#[must_use]
pub fn parse(raw: &[u8]) -> Snapshot {
    let text = String::from_utf8_lossy(raw);
    let mut goroutines = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<BlockBuilder> = None;
    let mut skipped = 0usize;

    let mut lines = text.lines().peekable();
    while let Some(raw_line) = lines.next() {
        let line = raw_line.trim();

        if let Some(header) = parse_header(line) {
            if let Some(block) = current.take() {
                finish_block(block, &mut goroutines, &mut seen, &mut skipped);
            }
            current = Some(BlockBuilder::new(header));
            continue;
        }

        if line.starts_with(HEADER_PREFIX) {
            // Header with an unreadable id or state, or cut off mid-line
            log::debug!("skipping unreadable goroutine header: {line}");
            if let Some(block) = current.take() {
                finish_block(block, &mut goroutines, &mut seen, &mut skipped);
            }
            skipped += 1;
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        if line.is_empty() || line == ELIDED_MARKER {
            continue;
        }

        // Location lines are tab-indented and always follow a call line
        let location = lines.next_if(|next| is_location_line(next)).map(str::trim);
        let entry = match location {
            Some(loc) => format!("{line} {loc}"),
            None => line.to_string(),
        };

        match line.strip_prefix(CREATED_BY_PREFIX) {
            Some(desc) => {
                block.created_by = Some(match location {
                    Some(loc) => format!("{} {loc}", desc.trim()),
                    None => desc.trim().to_string(),
                });
            }
            None => block.trace.push(entry),
        }
    }

    if let Some(block) = current.take() {
        finish_block(block, &mut goroutines, &mut seen, &mut skipped);
    }

    log::trace!("parsed {} goroutines ({skipped} blocks skipped)", goroutines.len());
    Snapshot { goroutines }
}

/// In-progress goroutine block
struct BlockBuilder {
    id: u64,
    state: String,
    created_by: Option<String>,
    trace: Vec<String>,
}

impl BlockBuilder {
    fn new((id, state): (u64, String)) -> Self {
        Self { id, state, created_by: None, trace: Vec::new() }
    }
}

fn finish_block(
    block: BlockBuilder,
    out: &mut Vec<Goroutine>,
    seen: &mut HashSet<u64>,
    skipped: &mut usize,
) {
    if block.trace.is_empty() {
        log::debug!("dropping goroutine {}: no frames", block.id);
        *skipped += 1;
        return;
    }
    if !seen.insert(block.id) {
        log::debug!("dropping duplicate goroutine {}", block.id);
        *skipped += 1;
        return;
    }
    out.push(Goroutine {
        id: block.id,
        state: block.state,
        created_by: block.created_by,
        trace: block.trace,
    });
}

/// Parse `goroutine <id> [<state>]:` into `(id, canonical state)`.
///
/// Tokens between the id and the bracket (`gp=0x.. m=..` in newer runtimes)
/// are ignored.
fn parse_header(line: &str) -> Option<(u64, String)> {
    let rest = line.strip_prefix(HEADER_PREFIX)?.strip_suffix(':')?;
    let id = rest.split_whitespace().next()?.parse().ok()?;

    let open = rest.find('[')?;
    let close = rest.rfind(']')?;
    if close < open {
        return None;
    }
    let bracketed = &rest[open + 1..close];
    let state = bracketed.split(',').next().unwrap_or_default().trim();

    Some((id, state.to_string()))
}

fn is_location_line(line: &str) -> bool {
    let trimmed = line.trim();
    (line.starts_with('\t') || line.starts_with(' '))
        && !trimmed.is_empty()
        && !trimmed.starts_with(HEADER_PREFIX)
        && !trimmed.starts_with(CREATED_BY_PREFIX)
}
