//! Input discovery
//!
//! Expands the paths handed to the tool into the list of files to
//! process. Directories are walked recursively for supported
//! spreadsheets; plain file paths are kept as given, even when missing,
//! so that they are reported as per-file errors later.

use crate::reader::is_supported;
use crate::writer::{OutputLayout, DEFAULT_OUTPUT_DIR_NAME};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Prefix of the lock files office suites leave next to open documents
const LOCK_FILE_PREFIX: &str = "~$";

/// Expand `paths` into spreadsheet files.
///
/// Repeated paths are dropped, keeping the first occurrence. Results
/// directories are not entered: any `deduplicated` directory, and the
/// layout's `output_dir` wherever it sits.
pub fn discover_inputs<P: AsRef<Path>>(paths: &[P], layout: &OutputLayout) -> Vec<PathBuf> {
    // A results directory that does not exist yet holds nothing to skip
    let output_dir = layout
        .output_dir
        .as_deref()
        .and_then(|dir| dir.canonicalize().ok());
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            for file in walk_directory(path, output_dir.as_deref()) {
                if seen.insert(file.clone()) {
                    inputs.push(file);
                }
            }
        } else if seen.insert(path.to_path_buf()) {
            inputs.push(path.to_path_buf());
        }
    }

    debug!("Discovered {} input files", inputs.len());
    inputs
}

fn walk_directory(dir: &Path, output_dir: Option<&Path>) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_results_dir(entry, output_dir))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable path under {:?}: {}", dir, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !is_lock_file(entry))
        .map(DirEntry::into_path)
        .filter(|path| is_supported(path))
        .collect()
}

fn is_results_dir(entry: &DirEntry, output_dir: Option<&Path>) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    if entry.file_name() == DEFAULT_OUTPUT_DIR_NAME {
        return true;
    }
    match output_dir {
        Some(output_dir) => entry
            .path()
            .canonicalize()
            .map(|path| path == output_dir)
            .unwrap_or(false),
        None => false,
    }
}

fn is_lock_file(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with(LOCK_FILE_PREFIX))
        .unwrap_or(false)
}
