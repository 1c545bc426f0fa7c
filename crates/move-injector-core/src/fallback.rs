//! Ordered fallible providers: continue on failure, stop on the first hit,
//! report the last cause once every step has been tried.

use tracing::trace;

type Step<'a, T> = Box<dyn FnOnce() -> anyhow::Result<Option<T>> + 'a>;

/// Why a chain produced nothing.
#[derive(Debug)]
pub struct Exhausted {
    /// Last error raised by a step; `None` if every step simply missed.
    pub last_cause: Option<anyhow::Error>,
}

pub struct FallbackChain<'a, T> {
    target: &'a str,
    steps: Vec<(&'static str, Step<'a, T>)>,
}

impl<'a, T> FallbackChain<'a, T> {
    /// Start a chain; `target` only labels log lines.
    pub fn new(target: &'a str) -> Self {
        Self {
            target,
            steps: Vec::new(),
        }
    }

    /// Append a step that may miss (`Ok(None)`) or fail (`Err`).
    pub fn then(
        mut self,
        label: &'static str,
        step: impl FnOnce() -> anyhow::Result<Option<T>> + 'a,
    ) -> Self {
        self.steps.push((label, Box::new(step)));
        self
    }

    /// Append a step that either produces a value or fails.
    pub fn then_required(
        self,
        label: &'static str,
        step: impl FnOnce() -> anyhow::Result<T> + 'a,
    ) -> Self {
        self.then(label, move || step().map(Some))
    }

    /// Run steps in order until one yields a value.
    pub fn run(self) -> Result<(&'static str, T), Exhausted> {
        let mut last_cause = None;
        for (label, step) in self.steps {
            match step() {
                Ok(Some(value)) => {
                    trace!(target_name = self.target, step = label, "fallback step hit");
                    return Ok((label, value));
                }
                Ok(None) => {
                    trace!(target_name = self.target, step = label, "fallback step missed");
                }
                Err(e) => {
                    trace!(
                        target_name = self.target,
                        step = label,
                        error = %e,
                        "fallback step failed"
                    );
                    last_cause = Some(e);
                }
            }
        }
        Err(Exhausted { last_cause })
    }
}
