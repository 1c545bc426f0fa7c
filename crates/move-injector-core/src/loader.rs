//! # Injecting Loader
//!
//! Resolves Move modules by name, running every registered module through the
//! injection pipeline before handing its bytes to the host definer.
//!
//! ## Resolution order
//!
//! ```text
//! resolve(name)
//!   ├─ resolution cache hit ───────────────► cached handle
//!   ├─ unit store hit ─► inject ─► encode ─► define ─► cache
//!   └─ delegate chain (first success wins, failures swallowed)
//!        1. own search path (raw bytes, no injection) ─► define
//!        2. parent loader
//!        3. primitive-type table
//!      exhausted ─► NotFound (last cause attached)
//! ```
//!
//! ## Resource order
//!
//! `.mv` names try injected unit bytes first; then the own search path, the
//! parent, bootstrap resources and finally the resource hook. Absence is not
//! an error: lookups return `None`.
//!
//! ## Locking
//!
//! - unit store: `RwLock`, write-held for each injection and each ingestion
//! - resolution cache: `RwLock`, append-only
//! - define transition: one reentrant lock per name ([`NameLocks`]); a
//!   definer re-entering its own name is refused with `NotFound`
//!
//! Injection passes and definers must not ingest into the loader that calls
//! them.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::codec::MoveCodec;
use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::fallback::FallbackChain;
use crate::host::{LoadedType, ModuleDefiner, ParentLoader};
use crate::injection::{InjectionPipeline, NoopPipeline};
use crate::locks::NameLocks;
use crate::metrics::LoaderMetrics;
use crate::name::{is_unit_resource, normalize, UnitName};
use crate::primitive::PrimitiveType;
use crate::resource::{
    BootstrapResources, NoResourceHook, ResourceHandle, ResourceHook, ResourceStream, SearchRoot,
};
use crate::unit::UnitStore;

pub struct InjectingLoader<D: ModuleDefiner> {
    pub(crate) config: LoaderConfig,
    pub(crate) codec: MoveCodec,
    definer: D,
    pipeline: Box<dyn InjectionPipeline>,
    parent: Option<Arc<dyn ParentLoader<D::Handle>>>,
    bootstrap: BootstrapResources,
    resource_hook: Box<dyn ResourceHook>,
    pub(crate) store: RwLock<UnitStore>,
    search_path: RwLock<Vec<SearchRoot>>,
    resolved: RwLock<HashMap<String, LoadedType<D::Handle>>>,
    locks: NameLocks,
    defining: Mutex<HashSet<String>>,
    metrics: LoaderMetrics,
}

impl<D: ModuleDefiner> InjectingLoader<D> {
    /// Create a loader with no parent, no injections and an empty store.
    /// The configured search path becomes the initial own search path.
    pub fn new(config: LoaderConfig, definer: D) -> Self {
        let search_path = config
            .search_path
            .iter()
            .cloned()
            .map(SearchRoot::from_path)
            .collect();
        let store = UnitStore::new(config.debug);
        Self {
            config,
            codec: MoveCodec::new(),
            definer,
            pipeline: Box::new(NoopPipeline),
            parent: None,
            bootstrap: BootstrapResources::new(),
            resource_hook: Box::new(NoResourceHook),
            store: RwLock::new(store),
            search_path: RwLock::new(search_path),
            resolved: RwLock::new(HashMap::new()),
            locks: NameLocks::new(),
            defining: Mutex::new(HashSet::new()),
            metrics: LoaderMetrics::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: impl InjectionPipeline + 'static) -> Self {
        self.pipeline = Box::new(pipeline);
        self
    }

    pub fn with_parent(mut self, parent: Arc<dyn ParentLoader<D::Handle>>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: BootstrapResources) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_resource_hook(mut self, hook: impl ResourceHook + 'static) -> Self {
        self.resource_hook = Box::new(hook);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LoaderMetrics {
        &self.metrics
    }

    pub fn definer(&self) -> &D {
        &self.definer
    }

    pub fn debug(&self) -> bool {
        self.store.read().debug()
    }

    // =========================================================================
    // Store and search path
    // =========================================================================

    pub fn unit_count(&self) -> usize {
        self.store.read().len()
    }

    pub fn has_unit(&self, name: &str) -> bool {
        self.store.read().contains(&UnitName::parse(name))
    }

    pub fn registered_units(&self) -> Vec<UnitName> {
        self.store.read().names().cloned().collect()
    }

    /// Append a root to the own search path.
    pub fn add_search_root(&self, root: SearchRoot) {
        let mut roots = self.search_path.write();
        if roots.contains(&root) {
            return;
        }
        debug!(root = %root.path().display(), "added search root");
        roots.push(root);
    }

    pub fn search_roots(&self) -> Vec<SearchRoot> {
        self.search_path.read().clone()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Whether `name` already has a cached handle.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.read().contains_key(&normalize(name))
    }

    /// Resolve a name to a live type, defining it at most once.
    ///
    /// Every failure is reported as [`LoaderError::NotFound`]. When a
    /// registered unit fails to encode or is rejected by the definer, that
    /// error is the cause. A definer that resolves the name it is currently
    /// defining gets `NotFound` back instead of recursing. Failures are not
    /// cached; a later call retries from scratch.
    pub fn resolve(&self, name: &str) -> LoaderResult<LoadedType<D::Handle>> {
        let key = normalize(name);
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let slot = self.locks.slot(&key);
        let _guard = slot.lock();
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        // Only the lock holder gets here, so a name already marked is this
        // thread re-entering from inside its own definer.
        if !self.defining.lock().insert(key.clone()) {
            return Err(LoaderError::not_found_with(
                &key,
                Some(anyhow::anyhow!("{} resolved while it is being defined", key)),
            ));
        }
        let outcome = self.define_uncached(&key);
        self.defining.lock().remove(&key);

        let loaded = outcome?;
        self.resolved.write().insert(key, loaded.clone());
        Ok(loaded)
    }

    fn cached(&self, key: &str) -> Option<LoadedType<D::Handle>> {
        let hit = self.resolved.read().get(key).cloned();
        if hit.is_some() {
            self.metrics.record_cache_hit();
        }
        hit
    }

    fn define_uncached(&self, key: &str) -> LoaderResult<LoadedType<D::Handle>> {
        let unit_name = UnitName::parse(key);
        let injected = self
            .define_registered(key, &unit_name)
            .map_err(|e| LoaderError::not_found_with(key, Some(e.into())))?;
        if let Some(handle) = injected {
            return Ok(LoadedType::Defined(handle));
        }

        let resource_path = unit_name.resource_path();
        let outcome = FallbackChain::new(key)
            .then("search-path", || {
                let Some(bytes) = self.search_path_lookup(&resource_path, SearchRoot::read)? else {
                    return Ok(None);
                };
                Ok(Some(LoadedType::Defined(self.define(key, &bytes)?)))
            })
            .then("parent", || match &self.parent {
                Some(parent) => parent.resolve(key).map(Some),
                None => Ok(None),
            })
            .then_required("primitive", || {
                Ok(LoadedType::Primitive(PrimitiveType::lookup(key)?))
            })
            .run();

        match outcome {
            Ok((step, loaded)) => {
                self.metrics.record_fallback_resolution();
                debug!(name = %key, step, "resolved through delegate chain");
                Ok(loaded)
            }
            Err(exhausted) => Err(LoaderError::not_found_with(key, exhausted.last_cause)),
        }
    }

    /// Inject, encode and define a registered unit; `None` if unregistered.
    fn define_registered(&self, key: &str, name: &UnitName) -> LoaderResult<Option<D::Handle>> {
        let Some(bytes) = self.unit_bytes_for(name)? else {
            return Ok(None);
        };
        let handle = self.define(key, &bytes)?;
        debug!(module = %key, size = bytes.len(), "defined injected module");
        Ok(Some(handle))
    }

    fn define(&self, name: &str, bytes: &[u8]) -> LoaderResult<D::Handle> {
        self.metrics.record_definition();
        self.definer
            .define(name, bytes)
            .map_err(|source| LoaderError::Definition {
                name: name.to_string(),
                source,
            })
    }

    // =========================================================================
    // Byte retrieval
    // =========================================================================

    /// Injected bytes of a registered unit, or `None` when nothing is
    /// registered under `name`.
    ///
    /// Every call runs the pipeline again on the stored unit.
    pub fn unit_bytes(&self, name: &str) -> LoaderResult<Option<Vec<u8>>> {
        self.unit_bytes_for(&UnitName::parse(name))
    }

    fn unit_bytes_for(&self, name: &UnitName) -> LoaderResult<Option<Vec<u8>>> {
        let mut store = self.store.write();
        let debug_enabled = store.debug();
        let Some(unit) = store.get_mut(name) else {
            return Ok(None);
        };

        self.pipeline.transform(unit);
        self.metrics.record_injection();
        let bytes = self.codec.encode(unit)?;

        if debug_enabled {
            debug!(
                module = %name,
                size = bytes.len(),
                sha256 = %digest_hex(&bytes),
                "injected module body"
            );
        }
        Ok(Some(bytes))
    }

    // =========================================================================
    // Resource serving
    // =========================================================================

    /// Stream for `name`, or `None` when no source has it.
    pub fn resource_stream(&self, name: &str) -> Option<ResourceStream> {
        if let Some(bytes) = self.injected_resource(name) {
            return Some(Box::new(Cursor::new(bytes)));
        }

        let outcome = FallbackChain::new(name)
            .then("search-path", || Ok(self.search_path_lookup(name, SearchRoot::open)?))
            .then("parent", || match &self.parent {
                Some(parent) => Ok(parent
                    .resource_bytes(name)?
                    .map(|bytes| Box::new(Cursor::new(bytes)) as ResourceStream)),
                None => Ok(None),
            })
            .then("bootstrap", || {
                Ok(self
                    .bootstrap
                    .get(name)
                    .map(|bytes| Box::new(bytes) as ResourceStream))
            })
            .then("hook", || {
                Ok(self
                    .resource_hook
                    .find(name)
                    .map(|bytes| Box::new(Cursor::new(bytes)) as ResourceStream))
            })
            .run();

        match outcome {
            Ok((_, stream)) => Some(stream),
            Err(_) => {
                self.metrics.record_resource_miss();
                trace!(resource = name, "resource not found");
                None
            }
        }
    }

    /// Full contents of `name`, following the same order as
    /// [`resource_stream`](Self::resource_stream).
    pub fn resource_bytes(&self, name: &str) -> Option<Vec<u8>> {
        let mut stream = self.resource_stream(name)?;
        let mut bytes = Vec::new();
        match stream.read_to_end(&mut bytes) {
            Ok(_) => Some(bytes),
            Err(e) => {
                trace!(resource = name, error = %e, "resource stream failed");
                None
            }
        }
    }

    /// Locator for `name`. Injected unit bytes come back as an in-memory
    /// handle that serves exactly those bytes.
    pub fn find_resource(&self, name: &str) -> Option<ResourceHandle> {
        if let Some(bytes) = self.injected_resource(name) {
            return Some(ResourceHandle::in_memory(name, bytes));
        }

        let outcome = FallbackChain::new(name)
            .then("search-path", || Ok(self.search_path_lookup(name, SearchRoot::find)?))
            .then("parent", || match &self.parent {
                Some(parent) => parent.resource(name),
                None => Ok(None),
            })
            .then("bootstrap", || {
                Ok(self
                    .bootstrap
                    .get(name)
                    .map(|bytes| ResourceHandle::in_memory(name, bytes)))
            })
            .then("hook", || {
                Ok(self
                    .resource_hook
                    .find(name)
                    .map(|bytes| ResourceHandle::in_memory(name, bytes)))
            })
            .run();

        match outcome {
            Ok((_, handle)) => Some(handle),
            Err(_) => {
                self.metrics.record_resource_miss();
                trace!(resource = name, "resource not found");
                None
            }
        }
    }

    /// Injected bytes for a `.mv` resource name; any failure counts as a miss.
    fn injected_resource(&self, name: &str) -> Option<Vec<u8>> {
        if !is_unit_resource(name) {
            return None;
        }
        let unit_name = UnitName::from_resource_path(name)?;
        match self.unit_bytes_for(&unit_name) {
            Ok(bytes) => bytes,
            Err(e) => {
                trace!(resource = name, error = %e, "injected lookup failed");
                None
            }
        }
    }

    /// Bytes from every source except the unit store: own search path,
    /// parent, bootstrap.
    pub(crate) fn raw_resource_bytes(&self, name: &str) -> Option<Vec<u8>> {
        FallbackChain::new(name)
            .then("search-path", || Ok(self.search_path_lookup(name, SearchRoot::read)?))
            .then("parent", || match &self.parent {
                Some(parent) => parent.resource_bytes(name),
                None => Ok(None),
            })
            .then("bootstrap", || Ok(self.bootstrap.get(name).map(<[u8]>::to_vec)))
            .run()
            .ok()
            .map(|(_, bytes)| bytes)
    }

    /// Apply `lookup` to each root in order and return the first hit.
    /// Unreadable roots are skipped; if nothing is found the last root error
    /// is returned.
    fn search_path_lookup<T>(
        &self,
        name: &str,
        lookup: impl Fn(&SearchRoot, &str) -> LoaderResult<Option<T>>,
    ) -> LoaderResult<Option<T>> {
        let roots = self.search_roots();
        let mut last_error = None;
        for root in &roots {
            match lookup(root, name) {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(e) => last_error = Some(e),
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

impl<D: ModuleDefiner> ParentLoader<D::Handle> for InjectingLoader<D> {
    fn resolve(&self, name: &str) -> anyhow::Result<LoadedType<D::Handle>> {
        Ok(InjectingLoader::resolve(self, name)?)
    }

    fn resource_bytes(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(InjectingLoader::resource_bytes(self, name))
    }

    fn resource(&self, name: &str) -> anyhow::Result<Option<ResourceHandle>> {
        Ok(self.find_resource(name))
    }
}

fn digest_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}
