//! Module archive format.
//!
//! An archive is a BCS-encoded list of `(path, bytes)` entries. Entries whose
//! path ends in [`UNIT_SUFFIX`](crate::name::UNIT_SUFFIX) are compiled modules;
//! anything else is a plain resource served through the loader's search path.
//!
//! Archives are read whole and the file handle is dropped before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LoaderError, LoaderResult};
use crate::name::is_unit_resource;

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Slash-separated path, e.g. `0x2/coin.mv` or `config/limits.json`
    pub path: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn is_unit(&self) -> bool {
        is_unit_resource(&self.path)
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleArchive {
    entries: Vec<ArchiveEntry>,
}

impl ModuleArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Lookups return the first entry with a matching path.
    pub fn push(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.push(ArchiveEntry {
            path: path.into().trim_start_matches('/').to_string(),
            bytes,
        });
    }

    pub fn with_entry(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.push(path, bytes);
        self
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn unit_entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| e.is_unit())
    }

    pub fn entry(&self, path: &str) -> Option<&ArchiveEntry> {
        let path = path.trim_start_matches('/');
        self.entries.iter().find(|e| e.path == path)
    }

    /// Remove and return the entry at `path`.
    pub fn take_entry(&mut self, path: &str) -> Option<ArchiveEntry> {
        let path = path.trim_start_matches('/');
        let idx = self.entries.iter().position(|e| e.path == path)?;
        Some(self.entries.swap_remove(idx))
    }

    pub fn from_bytes(bytes: &[u8], origin: &Path) -> LoaderResult<Self> {
        bcs::from_bytes(bytes).map_err(|e| LoaderError::corrupt_archive(origin, e))
    }

    pub fn to_bytes(&self) -> LoaderResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(|e| LoaderError::Encode {
            name: "archive".to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse an archive file.
    pub fn open(path: &Path) -> LoaderResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| LoaderError::io(path, e))?;
        Self::from_bytes(&bytes, path)
    }

    pub fn write_to(&self, path: &Path) -> LoaderResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| LoaderError::io(path, e))
    }
}
