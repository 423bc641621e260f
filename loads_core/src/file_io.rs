//! # File I/O Module
//!
//! Reading LoadSets from JSON files and writing JSON documents (LoadSets,
//! comparisons, summaries) back to disk.
//!
//! Writes are atomic: the document goes to a `.tmp` sibling, is synced,
//! then renamed over the target, so an interrupted write never leaves a
//! truncated file behind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use loads_core::file_io::{read_loadset, write_json};
//! use std::path::Path;
//!
//! let old = read_loadset(Path::new("old_loads.json"))?;
//! let new = read_loadset(Path::new("new_loads.json"))?;
//! let comparison = old.compare_to(&new)?;
//! write_json(&comparison, Path::new("comparison.json"))?;
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{LoadError, LoadResult};
use crate::loads::LoadSet;

/// Serialize any engine value (LoadSet, comparison, summary) to pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> LoadResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| LoadError::serialization(e.to_string()))
}

/// Load and validate a LoadSet from a JSON file.
///
/// # Returns
///
/// * `Ok(LoadSet)` - Successfully loaded and validated
/// * `Err(LoadError::IoFailure)` - File missing or unreadable
/// * `Err(LoadError::Validation)` - Invalid JSON or schema violation
pub fn read_loadset(path: &Path) -> LoadResult<LoadSet> {
    let contents = fs::read_to_string(path).map_err(|e| {
        LoadError::io_failure("read", path.display().to_string(), e.to_string())
    })?;

    LoadSet::from_json(&contents).map_err(|err| match err {
        LoadError::Validation { field, value, reason } => LoadError::Validation {
            field,
            value,
            reason: format!("Invalid LoadSet in {}: {}", path.display(), reason),
        },
        other => other,
    })
}

/// Serialize `value` to pretty JSON and write it atomically to `path`
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> LoadResult<()> {
    let json = to_json(value)?;
    write_atomic(path, json.as_bytes())
}

/// Write `contents` to a temporary sibling, sync, and rename over `path`.
///
/// The temporary file is removed if any step fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> LoadResult<()> {
    let tmp_path = tmp_path_for(path);

    let result = write_and_sync(&tmp_path, contents).and_then(|_| {
        fs::rename(&tmp_path, path).map_err(|e| {
            LoadError::io_failure("rename to final", path.display().to_string(), e.to_string())
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_sync(tmp_path: &Path, contents: &[u8]) -> LoadResult<()> {
    let mut tmp_file = File::create(tmp_path).map_err(|e| {
        LoadError::io_failure("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents).map_err(|e| {
        LoadError::io_failure("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        LoadError::io_failure("sync temp file", tmp_path.display().to_string(), e.to_string())
    })
}

/// Temporary sibling used while writing `path`
fn tmp_path_for(path: &Path) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    path.with_extension(extension)
}
