//! Ingestion: populate the unit store from archives, packages, directories
//! and explicit lists.
//!
//! Every entry point decodes all of its inputs before registering any of
//! them, holds the store's write lock while doing so, and overwrites units
//! already registered under the same name. I/O and decode errors propagate.

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::archive::ModuleArchive;
use crate::error::{LoaderError, LoaderResult};
use crate::host::ModuleDefiner;
use crate::loader::InjectingLoader;
use crate::name::{normalize, package_path, UnitName, UNIT_SUFFIX};
use crate::resource::{is_archive_path, SearchRoot};
use crate::unit::CompiledUnit;

/// Raw module bytes paired with where they came from.
struct UnitSource {
    origin: String,
    bytes: Vec<u8>,
}

impl<D: ModuleDefiner> InjectingLoader<D> {
    /// Register every `.mv` entry of the archive at `path` and add the archive
    /// to the own search path so its other entries stay reachable.
    pub fn ingest_archive(&self, path: &Path) -> LoaderResult<Vec<UnitName>> {
        let archive = ModuleArchive::open(path)?;
        self.ingest_archive_with_locator(&archive, Some(path))
    }

    /// Register every `.mv` entry of an already opened archive. When
    /// `locator` is given it is appended to the own search path.
    pub fn ingest_archive_with_locator(
        &self,
        archive: &ModuleArchive,
        locator: Option<&Path>,
    ) -> LoaderResult<Vec<UnitName>> {
        let sources = archive
            .unit_entries()
            .map(|entry| UnitSource {
                origin: entry.path.clone(),
                bytes: entry.bytes.clone(),
            })
            .collect();
        let names = self.register(sources)?;

        if let Some(path) = locator {
            self.add_search_root(SearchRoot::Archive(path.to_path_buf()));
        }
        info!(
            count = names.len(),
            archive = ?locator.map(|p| p.display().to_string()),
            "ingested archive"
        );
        Ok(names)
    }

    /// Register every module of `package` found under the configured code
    /// root.
    pub fn ingest_package(&self, package: &str) -> LoaderResult<Vec<UnitName>> {
        let sources = self.package_sources(package)?;
        let names = self.register(sources)?;
        info!(package = %normalize(package), count = names.len(), "ingested package");
        Ok(names)
    }

    /// Names of the modules `ingest_package` would register.
    pub fn list_package(&self, package: &str) -> LoaderResult<Vec<UnitName>> {
        self.package_sources(package)?
            .iter()
            .map(|source| self.codec.peek_name(&source.bytes, &source.origin))
            .collect()
    }

    /// Register a fixed list of modules, reading their bytes from the own
    /// search path, the parent and bootstrap resources (never from the unit
    /// store itself).
    pub fn ingest_units(&self, names: &[&str]) -> LoaderResult<Vec<UnitName>> {
        let mut sources = Vec::with_capacity(names.len());
        for raw in names {
            let name = UnitName::parse(raw);
            let path = name.resource_path();
            let bytes = self
                .raw_resource_bytes(&path)
                .ok_or_else(|| LoaderError::not_found(name.as_str()))?;
            sources.push(UnitSource {
                origin: path,
                bytes,
            });
        }
        self.register(sources)
    }

    /// Register already-read module bytes. Empty entries are skipped.
    pub fn ingest_module_bytes(&self, modules: Vec<Vec<u8>>) -> LoaderResult<Vec<UnitName>> {
        let sources = modules
            .into_iter()
            .enumerate()
            .filter(|(_, bytes)| !bytes.is_empty())
            .map(|(idx, bytes)| UnitSource {
                origin: format!("module #{}", idx),
                bytes,
            })
            .collect();
        self.register(sources)
    }

    /// Register every `.mv` file below a build directory. A
    /// `bytecode_modules/` subdirectory is preferred when present.
    pub fn ingest_directory(&self, package_dir: &Path) -> LoaderResult<Vec<UnitName>> {
        let bytecode_dir = package_dir.join("bytecode_modules");
        let root = if bytecode_dir.is_dir() {
            bytecode_dir
        } else {
            package_dir.to_path_buf()
        };
        let mut sources = Vec::new();
        scan_dir(&root, &mut sources)?;
        let names = self.register(sources)?;
        info!(dir = %root.display(), count = names.len(), "ingested directory");
        Ok(names)
    }

    fn register(&self, sources: Vec<UnitSource>) -> LoaderResult<Vec<UnitName>> {
        let mut store = self.store.write();
        let units = sources
            .iter()
            .map(|source| self.codec.decode(&source.bytes, &source.origin))
            .collect::<LoaderResult<Vec<CompiledUnit>>>()?;
        Ok(units
            .into_iter()
            .map(|unit| {
                debug!(module = %unit.name(), "registered unit");
                store.insert(unit)
            })
            .collect())
    }

    /// Enumerate the modules of `package` according to how the code root is
    /// packaged: an unpacked directory tree or a single archive.
    fn package_sources(&self, package: &str) -> LoaderResult<Vec<UnitSource>> {
        let package = normalize(package);
        let root = self.config.code_root.as_deref().ok_or_else(|| {
            LoaderError::not_found_with(
                package.clone(),
                Some(anyhow::anyhow!("couldn't determine code root")),
            )
        })?;
        if !root.exists() {
            return Err(LoaderError::not_found_with(
                package,
                Some(anyhow::anyhow!("code root {} does not exist", root.display())),
            ));
        }

        let mut sources = Vec::new();
        if root.is_dir() {
            let dir = root.join(package_path(&package));
            if !dir.is_dir() {
                return Err(LoaderError::not_found_with(
                    package,
                    Some(anyhow::anyhow!(
                        "couldn't load package location {}",
                        dir.display()
                    )),
                ));
            }
            let entries = fs::read_dir(&dir).map_err(|e| LoaderError::io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| LoaderError::io(&dir, e))?;
                let path = entry.path();
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if !path.is_file() || file_name.starts_with('.') || !file_name.ends_with(UNIT_SUFFIX)
                {
                    continue;
                }
                let bytes = fs::read(&path).map_err(|e| LoaderError::io(&path, e))?;
                sources.push(UnitSource {
                    origin: path.display().to_string(),
                    bytes,
                });
            }
            sources.sort_by(|a, b| a.origin.cmp(&b.origin));
        } else if is_archive_path(root) {
            let archive = ModuleArchive::open(root)?;
            for entry in archive.unit_entries() {
                let name = self.codec.peek_name(&entry.bytes, &entry.path)?;
                if name.package() == Some(package.as_str()) {
                    sources.push(UnitSource {
                        origin: entry.path.clone(),
                        bytes: entry.bytes.clone(),
                    });
                }
            }
        } else {
            warn!(root = %root.display(), "unknown code root kind, nothing to enumerate");
        }
        Ok(sources)
    }
}

fn scan_dir(dir: &Path, sources: &mut Vec<UnitSource>) -> LoaderResult<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| LoaderError::io(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LoaderError::io(dir, e))?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(&path, sources)?;
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some("mv") {
            continue;
        }
        let bytes = fs::read(&path).map_err(|e| LoaderError::io(&path, e))?;
        sources.push(UnitSource {
            origin: path.display().to_string(),
            bytes,
        });
    }
    Ok(())
}
