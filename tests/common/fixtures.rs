//! On-disk and in-memory fixtures.
//!
//! Modules are built from `empty_module()` with their self handle renamed, so
//! every fixture is a structurally valid Move binary.

use move_binary_format::file_format::{empty_module, CompiledModule};
use move_core_types::account_address::AccountAddress;
use move_core_types::identifier::Identifier;
use move_injector::ModuleArchive;
use std::path::{Path, PathBuf};

/// Minimal module whose self id is `address::name`.
pub fn test_module(address: &str, name: &str) -> CompiledModule {
    let mut module = empty_module();
    module.address_identifiers[0] =
        AccountAddress::from_hex_literal(address).expect("valid address literal");
    module.identifiers[0] = Identifier::new(name).expect("valid identifier");
    module
}

pub fn module_bytes(address: &str, name: &str) -> Vec<u8> {
    let module = test_module(address, name);
    let mut bytes = Vec::new();
    module
        .serialize_with_version(module.version, &mut bytes)
        .expect("fixture module should serialize");
    bytes
}

/// Write an archive holding `(address, name)` modules at `<address>/<name>.mv`
/// plus any extra plain resources.
#[allow(dead_code)]
pub fn write_archive(
    path: &Path,
    modules: &[(&str, &str)],
    resources: &[(&str, &[u8])],
) -> anyhow::Result<()> {
    let mut archive = ModuleArchive::new();
    for (address, name) in modules {
        archive.push(format!("{}/{}.mv", address, name), module_bytes(address, name));
    }
    for (entry, bytes) in resources {
        archive.push(*entry, bytes.to_vec());
    }
    archive.write_to(path)?;
    Ok(())
}

/// Lay out `<root>/<address>/<name>.mv` for every module and return the
/// package directory.
#[allow(dead_code)]
pub fn write_package_dir(root: &Path, address: &str, names: &[&str]) -> anyhow::Result<PathBuf> {
    let dir = root.join(address);
    std::fs::create_dir_all(&dir)?;
    for name in names {
        std::fs::write(dir.join(format!("{}.mv", name)), module_bytes(address, name))?;
    }
    Ok(dir)
}
