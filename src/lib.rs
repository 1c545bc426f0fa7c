//! Move Injector
//!
//! Loads compiled Move modules by name and passes every registered module
//! through an injection pipeline before the host VM defines it. Lookups that
//! miss the loader's own modules fall back to its search path, a parent
//! loader, bootstrap resources and finally the primitive-type table.
//!
//! The implementation lives in [`move_injector_core`]; this crate re-exports
//! its public surface.
//!
//! ```ignore
//! use move_injector::{InjectingLoader, InjectionChain, LoaderConfig};
//!
//! let loader = InjectingLoader::new(LoaderConfig::from_env(), definer)
//!     .with_pipeline(InjectionChain::new().with(trace_entry_points));
//! loader.ingest_package("0x2")?;
//! let balance = loader.resolve("0x2::balance")?;
//! ```

#![allow(clippy::result_large_err)]

pub use move_injector_core::*;

/// Items most embedders need.
pub mod prelude {
    pub use move_injector_core::{
        CompiledUnit, InjectingLoader, Injection, InjectionChain, InjectionPipeline, LoadedType,
        LoaderConfig, LoaderError, LoaderResult, ModuleArchive, ModuleDefiner, ParentLoader,
        UnitName,
    };
}
