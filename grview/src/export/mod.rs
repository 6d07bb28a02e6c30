//! Snapshot export
//!
//! Writes the visible goroutines as pretty-printed JSON, together with the
//! sort key and filter that produced them, for offline inspection or diffing
//! between captures.

use serde::Serialize;
use std::io::Write;

use crate::domain::ExportError;
use crate::view::ViewState;
use grview_common::Goroutine;

/// JSON document written by [`SnapshotExporter::export`]
#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    source: &'a str,
    sort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    total: usize,
    goroutines: &'a [Goroutine],
}

/// Exports the rows currently projected by a [`ViewState`]
pub struct SnapshotExporter {
    source: String,
}

impl SnapshotExporter {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// Serialize the visible rows of `view` to `writer`.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails
    pub fn export<W: Write>(&self, view: &ViewState, mut writer: W) -> Result<(), ExportError> {
        let document = ExportDocument {
            source: &self.source,
            sort: view.sort().to_string(),
            filter: Some(view.filter()).filter(|f| !f.is_empty()),
            total: view.total(),
            goroutines: view.visible_rows(),
        };
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
