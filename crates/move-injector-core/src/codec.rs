//! Structural codec between raw Move bytecode and [`CompiledUnit`].
//!
//! Encoding goes through the Move serializer, which rebuilds the binary
//! header, table offsets and table counts from the module structure, so a
//! unit edited by an injection pass always encodes into a well-formed binary.

use move_binary_format::file_format::CompiledModule;

use crate::error::{LoaderError, LoaderResult};
use crate::name::UnitName;
use crate::unit::CompiledUnit;

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveCodec;

impl MoveCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode module bytes. `origin` only feeds error messages.
    pub fn decode(&self, bytes: &[u8], origin: &str) -> LoaderResult<CompiledUnit> {
        let module = CompiledModule::deserialize_with_defaults(bytes).map_err(|e| {
            LoaderError::Decode {
                origin: origin.to_string(),
                message: format!("{:?}", e),
            }
        })?;
        Ok(CompiledUnit::new(module))
    }

    /// Serialize a unit at its own binary version.
    pub fn encode(&self, unit: &CompiledUnit) -> LoaderResult<Vec<u8>> {
        let module = unit.module();
        let mut bytes = Vec::new();
        module
            .serialize_with_version(module.version, &mut bytes)
            .map_err(|e| LoaderError::Encode {
                name: unit.name().to_string(),
                message: e.to_string(),
            })?;
        Ok(bytes)
    }

    /// Name of the module contained in `bytes`.
    ///
    /// Move binaries keep the self handle behind the table directory, so this
    /// decodes the module and discards everything but its id.
    pub fn peek_name(&self, bytes: &[u8], origin: &str) -> LoaderResult<UnitName> {
        self.decode(bytes, origin).map(|unit| unit.name().clone())
    }
}
