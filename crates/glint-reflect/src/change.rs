//! Change detection for cached declaration data.
//!
//! A [`ChangeDetector`] fingerprints the external fact a resolved record was
//! derived from — for source files, modification time plus a content hash.
//! Cached entries are validated on read: a stale detector makes the entry
//! vanish, forcing re-resolution from the original resource.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fingerprint of one external fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDetector {
    /// A source file: modification time (fast path) plus content hash.
    File {
        path: PathBuf,
        /// Nanoseconds since the epoch at fingerprint time, if known.
        mtime: Option<u128>,
        /// Hex-encoded sha-256 of the file contents.
        hash: String,
    },
    /// Nothing external to watch; the record stays valid for the process
    /// lifetime and is revalidated only when it leaves the cache.
    AlwaysValid,
}

impl ChangeDetector {
    /// Fingerprints a file as it exists right now.
    pub fn for_file(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let contents = fs::read(&path)?;
        let mtime = fs::metadata(&path).ok().and_then(|meta| mtime_nanos(&meta));
        Ok(Self::File {
            path,
            mtime,
            hash: content_hash(&contents),
        })
    }

    /// Fingerprints source text that did not come from a file.
    pub fn for_contents(contents: &str) -> Self {
        Self::File {
            path: PathBuf::new(),
            mtime: None,
            hash: content_hash(contents.as_bytes()),
        }
    }

    /// True if the fingerprinted fact no longer matches reality.
    ///
    /// Unreadable or missing files count as changed.
    pub fn changed(&self) -> bool {
        match self {
            Self::AlwaysValid => false,
            Self::File { path, mtime, hash } => {
                if path.as_os_str().is_empty() {
                    // Content-only fingerprint: nothing on disk to compare.
                    return false;
                }
                if let Some(recorded) = mtime {
                    if let Ok(meta) = fs::metadata(path) {
                        if mtime_nanos(&meta) == Some(*recorded) {
                            return false;
                        }
                    }
                }
                match fs::read(path) {
                    Ok(contents) => content_hash(&contents) != *hash,
                    Err(_) => true,
                }
            }
        }
    }

    fn file_path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } if !path.as_os_str().is_empty() => Some(path),
            _ => None,
        }
    }
}

/// A set of detectors, stale as soon as any member is stale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetectorSet {
    detectors: Vec<ChangeDetector>,
}

impl ChangeDetectorSet {
    /// Builds a deduplicated set. An empty input yields a set containing a
    /// single always-valid detector so every record carries one.
    pub fn from_detectors(detectors: impl IntoIterator<Item = ChangeDetector>) -> Self {
        let mut set = Vec::new();
        for detector in detectors {
            if !set.contains(&detector) {
                set.push(detector);
            }
        }
        if set.is_empty() {
            set.push(ChangeDetector::AlwaysValid);
        }
        Self { detectors: set }
    }

    pub fn changed(&self) -> bool {
        self.detectors.iter().any(ChangeDetector::changed)
    }

    pub fn detectors(&self) -> &[ChangeDetector] {
        &self.detectors
    }

    /// Files watched by this set, deduplicated.
    pub fn files(&self) -> Vec<&Path> {
        let mut files = Vec::new();
        for detector in &self.detectors {
            if let Some(path) = detector.file_path() {
                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }
        files
    }
}

fn content_hash(contents: &[u8]) -> String {
    let digest = Sha256::digest(contents);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn mtime_nanos(meta: &fs::Metadata) -> Option<u128> {
    meta.modified()
        .ok()
        .and_then(|time: SystemTime| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_nanos())
}

#[cfg(test)]
#[path = "../tests/change_tests.rs"]
mod tests;
