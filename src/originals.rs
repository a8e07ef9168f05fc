//! Path conventions linking an upscaled texture to its pre-upscale original.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolve the original of an upscaled file.
///
/// The pipeline asks for the original after classification, so `upscaled`
/// is the file's current location (usually inside `solid_color/`).
pub trait OriginalLocator: Send + Sync {
    /// Path of the original, or `None` when no counterpart is known.
    fn locate(&self, upscaled: &Path) -> Option<PathBuf>;
}

/// Originals live in one directory under the same file name.
///
/// An optional extension replaces the upscaled file's extension, for
/// upscalers that change the output format.
#[derive(Debug, Clone)]
pub struct MirrorLocator {
    originals_dir: PathBuf,
    extension: Option<String>,
}

impl MirrorLocator {
    pub fn new(originals_dir: impl Into<PathBuf>) -> Self {
        Self { originals_dir: originals_dir.into(), extension: None }
    }

    /// Look originals up with `extension` instead of the upscaled one.
    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension.map(|e| e.trim_start_matches('.').to_string());
        self
    }

    pub fn originals_dir(&self) -> &Path {
        &self.originals_dir
    }
}

impl OriginalLocator for MirrorLocator {
    fn locate(&self, upscaled: &Path) -> Option<PathBuf> {
        let name = upscaled.file_name()?;
        let candidate = self.originals_dir.join(name);
        Some(match &self.extension {
            Some(ext) => candidate.with_extension(ext),
            None => candidate,
        })
    }
}

/// Explicit upscaled → original pairs, keyed by file name.
///
/// Keys are file names rather than full paths because classification moves
/// the upscaled file between directories.
#[derive(Debug, Clone, Default)]
pub struct MappedLocator {
    pairs: HashMap<OsString, PathBuf>,
}

impl MappedLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `original` as the counterpart of `upscaled`.
    pub fn insert(&mut self, upscaled: &Path, original: impl Into<PathBuf>) {
        if let Some(name) = upscaled.file_name() {
            self.pairs.insert(name.to_os_string(), original.into());
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<P: AsRef<Path>, Q: Into<PathBuf>> FromIterator<(P, Q)> for MappedLocator {
    fn from_iter<I: IntoIterator<Item = (P, Q)>>(iter: I) -> Self {
        let mut locator = Self::new();
        for (upscaled, original) in iter {
            locator.insert(upscaled.as_ref(), original);
        }
        locator
    }
}

impl OriginalLocator for MappedLocator {
    fn locate(&self, upscaled: &Path) -> Option<PathBuf> {
        self.pairs.get(upscaled.file_name()?).cloned()
    }
}
