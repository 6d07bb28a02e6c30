//! # grview - Main Entry Point
//!
//! Supports two operational modes:
//! - **TUI** (`grview --host <HOST>` or `grview <PATH>...`): live or replayed goroutine table
//! - **Headless** (`--headless --export out.json`): one snapshot to JSON, no terminal

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tokio::runtime::Handle;

use grview::app::App;
use grview::cli::Args;
use grview::domain::{IngestError, Target};
use grview::engine::LiveState;
use grview::export::SnapshotExporter;
use grview::source::{ingest, HttpSource, ReplaySource, SnapshotSource, Source};
use grview::tui;
use grview::view::ViewState;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOINPUT: i32 = 66;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<IngestError>().is_some() {
        EXIT_NOINPUT
    } else {
        EXIT_ERROR
    }
}

/// Pick the snapshot source once: replay when paths were given, HTTP otherwise.
fn build_source(args: &Args) -> Result<Source> {
    if args.paths.is_empty() {
        let target = Target::new(args.host.as_str(), args.endpoint.as_str());
        return Ok(Source::Http(HttpSource::new(target)));
    }

    let raw = ingest::load_paths(&args.paths)?;
    let label = match args.paths.as_slice() {
        [single] => single.display().to_string(),
        many => format!("{} inputs", many.len()),
    };
    Ok(Source::Replay(ReplaySource::new(label, raw)))
}

fn write_export<S: SnapshotSource>(app: &App<S>, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    SnapshotExporter::new(app.engine().source().describe())
        .export(app.view(), BufWriter::new(file))
        .context("Failed to export snapshot")?;
    Ok(())
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let source = build_source(&args)?;
    let start_paused = source.is_replay();

    if !quiet && !args.headless {
        println!("grview v{}", env!("CARGO_PKG_VERSION"));
        println!("source: {}", source.describe());
    }

    let engine = LiveState::new(source);
    let view = ViewState::new(args.sort.into(), args.filter.clone());
    let interval = args.refresh_interval();

    // First poll may block on the network, keep it off the async workers
    let app = if args.headless {
        tokio::task::spawn_blocking(move || App::new(engine, view, interval, true))
            .await
            .context("Snapshot thread panicked")?
    } else {
        let runtime = Handle::current();
        tokio::task::spawn_blocking(move || -> Result<_> {
            let mut app = App::new(engine, view, interval, start_paused);
            tui::run(&mut app, &runtime)?;
            Ok(app)
        })
        .await
        .context("TUI thread panicked")??
    };

    if args.headless {
        if let Some(err) = app.last_error() {
            anyhow::bail!("Failed to fetch goroutines: {err}");
        }
        info!("captured {} goroutines", app.view().total());
    }

    if let Some(ref export_path) = args.export {
        write_export(&app, export_path)?;
        if !quiet {
            println!("saved: {}", export_path.display());
        }
    }

    Ok(())
}
