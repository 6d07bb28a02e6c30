//! Load replay input from plain files, directories and `.zip` captures.
//!
//! Every contributing chunk is appended followed by a newline, so dumps from
//! several files concatenate into one parser input. Directories are walked
//! recursively in name order to keep the result deterministic.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::domain::IngestError;

/// Archive members holding a verbose goroutine dump end with this
pub const ARCHIVE_MEMBER_SUFFIX: &str = "debug=2.txt";

/// Read all `paths` into a single parser input.
///
/// # Errors
/// Returns [`IngestError`] for the first path (or archive member) that cannot
/// be opened or read.
pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<u8>, IngestError> {
    let mut buf = Vec::new();
    for path in paths {
        load_path(path.as_ref(), &mut buf)?;
    }
    log::info!("loaded {} bytes from {} input path(s)", buf.len(), paths.len());
    Ok(buf)
}

fn load_path(path: &Path, buf: &mut Vec<u8>) -> Result<(), IngestError> {
    let meta = fs::metadata(path).map_err(|source| open_err(path, source))?;
    if meta.is_dir() {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|source| open_err(path, source))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(|source| read_err(path, source))?;
        entries.sort();
        for entry in entries {
            load_path(&entry, buf)?;
        }
        return Ok(());
    }

    if is_archive(path) {
        load_archive(path, buf)
    } else {
        let mut file = File::open(path).map_err(|source| open_err(path, source))?;
        file.read_to_end(buf).map_err(|source| read_err(path, source))?;
        buf.push(b'\n');
        log::debug!("loaded {}", path.display());
        Ok(())
    }
}

fn load_archive(path: &Path, buf: &mut Vec<u8>) -> Result<(), IngestError> {
    let archive_err = |source| IngestError::Archive { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(|source| open_err(path, source))?;
    let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;

    let mut members = 0usize;
    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(archive_err)?;
        if !member.is_file() || !member.name().ends_with(ARCHIVE_MEMBER_SUFFIX) {
            continue;
        }
        let member_path = path.join(member.name());
        member.read_to_end(buf).map_err(|source| read_err(&member_path, source))?;
        buf.push(b'\n');
        members += 1;
    }

    if members == 0 {
        log::warn!("{} has no *{ARCHIVE_MEMBER_SUFFIX} members", path.display());
    } else {
        log::debug!("loaded {members} member(s) from {}", path.display());
    }
    Ok(())
}

fn is_archive(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn open_err(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Open { path: path.to_path_buf(), source }
}

fn read_err(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Read { path: path.to_path_buf(), source }
}
