//! Move Injector Core
//!
//! A module loader that holds compiled Move modules in an in-memory store,
//! rewrites them through a pluggable injection pipeline the moment they are
//! requested, and hands the rewritten bytes to a host-supplied definer.
//!
//! ## Module Overview
//!
//! - [`loader`]: [`InjectingLoader`], resolution and resource serving
//! - [`ingest`]: populating the store from archives, packages and directories
//! - [`injection`]: the [`InjectionPipeline`] seam and [`InjectionChain`]
//! - [`host`]: traits the embedding host implements ([`ModuleDefiner`], [`ParentLoader`])
//! - [`codec`]: Move bytecode decode/encode
//! - [`archive`]: the `.mvar` module archive format
//! - [`resource`]: search roots, resource handles, bootstrap resources
//! - [`name`]: unit name normalization
//! - [`primitive`]: the built-in primitive type table
//! - [`fallback`]: ordered fallible provider chains
//! - [`config`], [`metrics`], [`error`]: ambient plumbing
//!
//! ## Example
//!
//! ```ignore
//! use move_injector_core::{InjectingLoader, InjectionChain, LoaderConfig};
//!
//! let loader = InjectingLoader::new(LoaderConfig::from_env(), my_definer)
//!     .with_pipeline(InjectionChain::new().with(MyInjection));
//! loader.ingest_archive(Path::new("framework.mvar"))?;
//! let coin = loader.resolve("0x2::coin")?;
//! ```

pub mod archive;
pub mod codec;
pub mod config;
pub mod error;
pub mod fallback;
pub mod host;
pub mod ingest;
pub mod injection;
pub mod loader;
pub mod locks;
pub mod metrics;
pub mod name;
pub mod primitive;
pub mod resource;
pub mod unit;

#[cfg(test)]
mod test_support;

pub use archive::{ArchiveEntry, ModuleArchive};
pub use codec::MoveCodec;
pub use config::LoaderConfig;
pub use error::{LoaderError, LoaderResult};
pub use host::{LoadedType, ModuleDefiner, ParentLoader};
pub use injection::{Injection, InjectionChain, InjectionPipeline, NoopPipeline};
pub use loader::InjectingLoader;
pub use metrics::{LoaderMetrics, MetricsSnapshot};
pub use name::{UnitName, ARCHIVE_SUFFIX, UNIT_SUFFIX};
pub use primitive::PrimitiveType;
pub use resource::{
    BootstrapResources, NoResourceHook, ResourceHandle, ResourceHook, ResourceStream, SearchRoot,
};
pub use unit::{CompiledUnit, UnitStore};
