//! Injection pipeline seam.
//!
//! The loader calls [`InjectionPipeline::transform`] on a registered unit every
//! time its bytes are retrieved. The loader does not remember which units were
//! already transformed, so a pass that must not apply twice has to detect its
//! own earlier edits.

use tracing::debug;

use crate::unit::CompiledUnit;

/// Mutates a unit in place before it is encoded and defined.
///
/// Implementations receive the unit only for the duration of one call and
/// must not reach back into the loader that owns it.
pub trait InjectionPipeline: Send + Sync {
    fn transform(&self, unit: &mut CompiledUnit);
}

/// Pipeline that leaves every unit untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPipeline;

impl InjectionPipeline for NoopPipeline {
    fn transform(&self, _unit: &mut CompiledUnit) {}
}

/// A single targeted rewrite.
pub trait Injection: Send + Sync {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Whether this injection wants to touch `unit`.
    fn applies_to(&self, _unit: &CompiledUnit) -> bool {
        true
    }

    fn inject(&self, unit: &mut CompiledUnit);
}

/// Ordered list of injections, applied front to back.
#[derive(Default)]
pub struct InjectionChain {
    injections: Vec<Box<dyn Injection>>,
}

impl InjectionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, injection: impl Injection + 'static) -> Self {
        self.push(injection);
        self
    }

    pub fn push(&mut self, injection: impl Injection + 'static) {
        self.injections.push(Box::new(injection));
    }

    pub fn len(&self) -> usize {
        self.injections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.injections.is_empty()
    }
}

impl InjectionPipeline for InjectionChain {
    fn transform(&self, unit: &mut CompiledUnit) {
        for injection in &self.injections {
            if !injection.applies_to(unit) {
                continue;
            }
            debug!(
                module = %unit.name(),
                injection = injection.name(),
                "applying injection"
            );
            injection.inject(unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_module;
    use move_core_types::identifier::Identifier;

    struct AddIdentifier {
        target: &'static str,
        ident: &'static str,
    }

    impl Injection for AddIdentifier {
        fn name(&self) -> &str {
            "add-identifier"
        }

        fn applies_to(&self, unit: &CompiledUnit) -> bool {
            unit.name().simple_name() == self.target
        }

        fn inject(&self, unit: &mut CompiledUnit) {
            unit.module_mut()
                .identifiers
                .push(Identifier::new(self.ident).unwrap());
        }
    }

    #[test]
    fn test_chain_applies_in_order_and_filters() {
        let chain = InjectionChain::new()
            .with(AddIdentifier {
                target: "coin",
                ident: "first",
            })
            .with(AddIdentifier {
                target: "pool",
                ident: "skipped",
            })
            .with(AddIdentifier {
                target: "coin",
                ident: "second",
            });
        assert_eq!(chain.len(), 3);

        let mut unit = CompiledUnit::new(test_module("0x2", "coin"));
        chain.transform(&mut unit);

        let idents: Vec<String> = unit
            .module()
            .identifiers
            .iter()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(idents, vec!["coin", "first", "second"]);
    }

    #[test]
    fn test_noop_pipeline_leaves_unit_alone() {
        let mut unit = CompiledUnit::new(test_module("0x2", "coin"));
        let before = unit.clone();
        NoopPipeline.transform(&mut unit);
        assert_eq!(unit, before);
    }
}
