//! Host-side doubles: a definer that records what it defines and injections
//! that count their runs.

use move_core_types::identifier::Identifier;
use move_injector::{CompiledUnit, Injection, ModuleDefiner, MoveCodec};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What the host saw for one definition.
#[derive(Debug)]
pub struct DefinedModule {
    pub name: String,
    pub identifiers: Vec<String>,
}

impl DefinedModule {
    #[allow(dead_code)]
    pub fn has_identifier(&self, ident: &str) -> bool {
        self.identifiers.iter().any(|i| i == ident)
    }
}

/// Decodes the bytes it is handed, rejects name mismatches and keeps the
/// order of definitions.
#[derive(Default)]
pub struct RecordingDefiner {
    defined: Mutex<Vec<String>>,
}

impl RecordingDefiner {
    #[allow(dead_code)]
    pub fn defined(&self) -> Vec<String> {
        self.defined.lock().clone()
    }
}

impl ModuleDefiner for RecordingDefiner {
    type Handle = Arc<DefinedModule>;

    fn define(&self, name: &str, bytes: &[u8]) -> anyhow::Result<Self::Handle> {
        let unit = MoveCodec::new().decode(bytes, name)?;
        anyhow::ensure!(
            unit.name().as_str() == name,
            "bytes define {} but {} was requested",
            unit.name(),
            name
        );
        self.defined.lock().push(name.to_string());
        Ok(Arc::new(DefinedModule {
            name: name.to_string(),
            identifiers: unit
                .module()
                .identifiers
                .iter()
                .map(|i| i.to_string())
                .collect(),
        }))
    }
}

/// Adds a `<tag>N` identifier to matching modules and counts its runs.
#[derive(Clone)]
pub struct CountingInjection {
    tag: &'static str,
    only: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl CountingInjection {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            only: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Restrict to modules with this simple name.
    #[allow(dead_code)]
    pub fn only(mut self, simple_name: &'static str) -> Self {
        self.only = Some(simple_name);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Injection for CountingInjection {
    fn name(&self) -> &str {
        self.tag
    }

    fn applies_to(&self, unit: &CompiledUnit) -> bool {
        self.only
            .map(|only| unit.name().simple_name() == only)
            .unwrap_or(true)
    }

    fn inject(&self, unit: &mut CompiledUnit) {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let ident = Identifier::new(format!("{}{}", self.tag, n)).expect("valid identifier");
        unit.module_mut().identifiers.push(ident);
    }
}
