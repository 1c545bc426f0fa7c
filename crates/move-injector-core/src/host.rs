//! Interfaces supplied by the embedding host.

use anyhow::Result;

use crate::primitive::PrimitiveType;
use crate::resource::ResourceHandle;

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedType<H> {
    /// Handle produced by a definer (this loader's or a parent's).
    Defined(H),
    Primitive(PrimitiveType),
}

impl<H> LoadedType<H> {
    pub fn as_defined(&self) -> Option<&H> {
        match self {
            LoadedType::Defined(handle) => Some(handle),
            LoadedType::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            LoadedType::Primitive(p) => Some(*p),
            LoadedType::Defined(_) => None,
        }
    }
}

/// The host's type-definition primitive: turns module bytes into a live
/// handle, or rejects them (malformed bytes, name mismatch, duplicate).
pub trait ModuleDefiner: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    fn define(&self, name: &str, bytes: &[u8]) -> Result<Self::Handle>;
}

/// Enclosing loader consulted after this loader's own search path.
///
/// Failures are never surfaced directly; the calling loader just moves on to
/// its next fallback.
pub trait ParentLoader<H>: Send + Sync {
    fn resolve(&self, name: &str) -> Result<LoadedType<H>>;

    fn resource_bytes(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Locator form of [`resource_bytes`](Self::resource_bytes).
    fn resource(&self, name: &str) -> Result<Option<ResourceHandle>> {
        Ok(self
            .resource_bytes(name)?
            .map(|bytes| ResourceHandle::in_memory(name, bytes)))
    }
}
