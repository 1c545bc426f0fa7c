//! Resource handles and the lookup sources behind them.
//!
//! | Source | Handle |
//! |--------|--------|
//! | [`SearchRoot::Directory`] | [`ResourceHandle::File`] |
//! | [`SearchRoot::Archive`] | [`ResourceHandle::ArchiveEntry`] |
//! | [`BootstrapResources`] / injected bytes | [`ResourceHandle::InMemory`] |

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::ModuleArchive;
use crate::error::{LoaderError, LoaderResult};
use crate::name::ARCHIVE_SUFFIX;

/// Boxed byte stream returned by resource lookups.
pub type ResourceStream = Box<dyn Read + Send>;

/// An addressable resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceHandle {
    /// A file under a directory search root.
    File(PathBuf),
    /// An entry inside an archive on disk.
    ArchiveEntry { archive: PathBuf, entry: String },
    /// Bytes already held in memory. Opening never touches the filesystem.
    InMemory { name: String, bytes: Arc<[u8]> },
}

impl ResourceHandle {
    pub fn in_memory(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        ResourceHandle::InMemory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Open the resource as a stream.
    pub fn open(&self) -> LoaderResult<ResourceStream> {
        match self {
            ResourceHandle::File(path) => {
                let file = std::fs::File::open(path).map_err(|e| LoaderError::io(path, e))?;
                Ok(Box::new(file))
            }
            ResourceHandle::InMemory { bytes, .. } => Ok(Box::new(Cursor::new(bytes.clone()))),
            ResourceHandle::ArchiveEntry { .. } => Ok(Box::new(Cursor::new(self.read_bytes()?))),
        }
    }

    /// Read the full contents.
    pub fn read_bytes(&self) -> LoaderResult<Vec<u8>> {
        match self {
            ResourceHandle::File(path) => std::fs::read(path).map_err(|e| LoaderError::io(path, e)),
            ResourceHandle::InMemory { bytes, .. } => Ok(bytes.to_vec()),
            ResourceHandle::ArchiveEntry { archive, entry } => {
                let parsed = ModuleArchive::open(archive)?;
                parsed
                    .entry(entry)
                    .map(|e| e.bytes.clone())
                    .ok_or_else(|| LoaderError::not_found(format!("{}!{}", archive.display(), entry)))
            }
        }
    }

    /// Human-readable location.
    pub fn location(&self) -> String {
        match self {
            ResourceHandle::File(path) => path.display().to_string(),
            ResourceHandle::ArchiveEntry { archive, entry } => {
                format!("{}!/{}", archive.display(), entry)
            }
            ResourceHandle::InMemory { name, .. } => format!("memory:{}", name),
        }
    }
}

/// One entry of the loader's own search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl SearchRoot {
    /// Classify a path by its suffix: archives end in `.mvar`, anything else
    /// is treated as a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if is_archive_path(&path) {
            SearchRoot::Archive(path)
        } else {
            SearchRoot::Directory(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SearchRoot::Directory(path) | SearchRoot::Archive(path) => path,
        }
    }

    /// Find `name` under this root.
    ///
    /// `Ok(None)` means the root does not hold the resource; `Err` means the
    /// root itself could not be read.
    pub fn find(&self, name: &str) -> LoaderResult<Option<ResourceHandle>> {
        let name = name.trim_start_matches('/');
        match self {
            SearchRoot::Directory(dir) => {
                let candidate = dir.join(name);
                Ok(candidate.is_file().then_some(ResourceHandle::File(candidate)))
            }
            SearchRoot::Archive(path) => {
                let archive = ModuleArchive::open(path)?;
                Ok(archive.entry(name).map(|e| ResourceHandle::ArchiveEntry {
                    archive: path.clone(),
                    entry: e.path.clone(),
                }))
            }
        }
    }

    /// Contents of `name` under this root. An archive root is parsed once per
    /// call.
    pub fn read(&self, name: &str) -> LoaderResult<Option<Vec<u8>>> {
        let name = name.trim_start_matches('/');
        match self {
            SearchRoot::Directory(dir) => {
                let candidate = dir.join(name);
                if !candidate.is_file() {
                    return Ok(None);
                }
                std::fs::read(&candidate)
                    .map(Some)
                    .map_err(|e| LoaderError::io(&candidate, e))
            }
            SearchRoot::Archive(path) => {
                let mut archive = ModuleArchive::open(path)?;
                Ok(archive.take_entry(name).map(|e| e.bytes))
            }
        }
    }

    /// Stream over `name` under this root. Directory entries stream from the
    /// file; archive entries are served from the single parse.
    pub fn open(&self, name: &str) -> LoaderResult<Option<ResourceStream>> {
        match self {
            SearchRoot::Directory(dir) => {
                let candidate = dir.join(name.trim_start_matches('/'));
                if !candidate.is_file() {
                    return Ok(None);
                }
                let file =
                    std::fs::File::open(&candidate).map_err(|e| LoaderError::io(&candidate, e))?;
                Ok(Some(Box::new(file)))
            }
            SearchRoot::Archive(_) => Ok(self
                .read(name)?
                .map(|bytes| Box::new(Cursor::new(bytes)) as ResourceStream)),
        }
    }
}

pub fn is_archive_path(path: &Path) -> bool {
    path.to_str()
        .map(|s| s.ends_with(ARCHIVE_SUFFIX))
        .unwrap_or(false)
}

/// Resources shipped with the loader itself, usually via `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct BootstrapResources {
    resources: HashMap<String, &'static [u8]>,
}

impl BootstrapResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: &'static [u8]) {
        let name = name.into();
        self.resources
            .insert(name.trim_start_matches('/').to_string(), bytes);
    }

    /// Lookup relative to the bundle root; a leading `/` is ignored.
    pub fn get(&self, name: &str) -> Option<&'static [u8]> {
        self.resources.get(name.trim_start_matches('/')).copied()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Last-resort resource source consulted after every other step missed.
pub trait ResourceHook: Send + Sync {
    fn find(&self, name: &str) -> Option<Vec<u8>>;
}

/// Default hook: nothing is ever found.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResourceHook;

impl ResourceHook for NoResourceHook {
    fn find(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}
