//! Image discovery and file lists.
//!
//! Finds image files by extension, expands directory inputs, and reads and
//! writes the newline separated list files the upscaler consumes.

use glob::{glob, Pattern};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during image discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// IO error during file enumeration
    #[error("IO error during discovery: {0}")]
    Io(#[from] io::Error),
}

/// Check whether `path` has one of `extensions` (case-insensitive, no dot).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Hidden files, including in-flight temporary writes, are never images.
fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).map(|n| n.starts_with('.')).unwrap_or(false)
}

/// Keep only the files whose extension is in `extensions`.
pub fn filter_extensions(extensions: &[String], files: Vec<PathBuf>) -> Vec<PathBuf> {
    files.into_iter().filter(|f| has_extension(f, extensions)).collect()
}

/// Discover image files in `dir`.
///
/// Returns a sorted list of regular, non-hidden files with a matching
/// extension. Subdirectories are searched only when `recursive` is set.
pub fn discover_images(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    // Surface a missing or unreadable directory instead of an empty match
    fs::read_dir(dir)?;

    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern = if recursive { format!("{}/**/*", escaped) } else { format!("{}/*", escaped) };

    let paths = glob(&pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.clone(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() && !is_hidden(&path) && has_extension(&path, extensions) {
                    files.push(path);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error reading path during discovery");
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Expand a mix of files and directories into a deduplicated image list.
///
/// Files are taken as given (even without a matching extension, so a
/// missing file is reported later instead of silently dropped); directories
/// are expanded with [`discover_images`].
pub fn expand_inputs(
    inputs: &[PathBuf],
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut seen = BTreeSet::new();
    let mut result = Vec::new();

    for input in inputs {
        let found = if input.is_dir() {
            discover_images(input, extensions, recursive)?
        } else {
            vec![input.clone()]
        };
        for path in found {
            if seen.insert(path.clone()) {
                result.push(path);
            }
        }
    }

    Ok(result)
}

/// Write `files` to `path`, one per line, replacing any existing list.
pub fn write_list(path: &Path, files: &[PathBuf]) -> io::Result<()> {
    if path.exists() {
        tracing::info!(path = %path.display(), "Replacing existing file list");
    }
    let contents: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    fs::write(path, contents.join("\n"))
}

/// Read a list written by [`write_list`]; blank lines are ignored.
pub fn read_list(path: &Path) -> io::Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}
