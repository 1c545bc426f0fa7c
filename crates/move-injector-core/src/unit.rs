//! Compiled units and the store that owns them until resolution.

use move_binary_format::file_format::CompiledModule;
use std::collections::BTreeMap;
use tracing::warn;

use crate::name::UnitName;

/// A structurally editable module awaiting definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    name: UnitName,
    module: CompiledModule,
}

impl CompiledUnit {
    /// Wrap a module under the name derived from its self handle.
    pub fn new(module: CompiledModule) -> Self {
        let name = UnitName::from_module_id(&module.self_id());
        Self { name, module }
    }

    pub fn name(&self) -> &UnitName {
        &self.name
    }

    pub fn module(&self) -> &CompiledModule {
        &self.module
    }

    /// Mutable access for injection passes.
    pub fn module_mut(&mut self) -> &mut CompiledModule {
        &mut self.module
    }

    pub fn into_module(self) -> CompiledModule {
        self.module
    }
}

/// Name → unit registry plus the loader-wide debug flag.
#[derive(Debug, Default)]
pub struct UnitStore {
    units: BTreeMap<UnitName, CompiledUnit>,
    debug: bool,
}

impl UnitStore {
    pub fn new(debug: bool) -> Self {
        Self {
            units: BTreeMap::new(),
            debug,
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Register a unit under its own name. Last write wins.
    pub fn insert(&mut self, unit: CompiledUnit) -> UnitName {
        let name = unit.name().clone();
        if self.units.contains_key(&name) {
            warn!(module = %name, "duplicate unit registered, overwriting previous");
        }
        self.units.insert(name.clone(), unit);
        name
    }

    pub fn get(&self, name: &UnitName) -> Option<&CompiledUnit> {
        self.units.get(name)
    }

    pub fn get_mut(&mut self, name: &UnitName) -> Option<&mut CompiledUnit> {
        self.units.get_mut(name)
    }

    pub fn contains(&self, name: &UnitName) -> bool {
        self.units.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &UnitName> {
        self.units.keys()
    }
}
