//! Module fixtures for unit tests.

use move_binary_format::file_format::{empty_module, CompiledModule};
use move_core_types::account_address::AccountAddress;
use move_core_types::identifier::Identifier;

/// Minimal module whose self handle is `address::name`.
pub fn test_module(address: &str, name: &str) -> CompiledModule {
    let mut module = empty_module();
    module.address_identifiers[0] = AccountAddress::from_hex_literal(address).unwrap();
    module.identifiers[0] = Identifier::new(name).unwrap();
    module
}

pub fn module_bytes(address: &str, name: &str) -> Vec<u8> {
    encode_module(&test_module(address, name))
}

pub fn encode_module(module: &CompiledModule) -> Vec<u8> {
    let mut bytes = Vec::new();
    module
        .serialize_with_version(module.version, &mut bytes)
        .unwrap();
    bytes
}
