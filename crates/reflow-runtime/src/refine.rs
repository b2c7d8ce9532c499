//! The state refinement chain.
//!
//! Built once at assembly as a left-to-right fold over the registered
//! steps, and applied to every value entering the canonical state
//! timeline - the initial seed included.
//!
//! Per step:
//!
//! - `Ok(Some(next))` replaces the value handed to the next step
//! - `Ok(None)` passes the value through unchanged
//! - `Err(fault)` retains the pre-step value, records the fault, and
//!   the remaining steps still run
//!
//! Recorded faults are returned to the caller rather than dispatched
//! here: the emit section holds the timeline gate, and dispatching
//! re-enters handler pipelines. The runtime reports them as `error`
//! actions after the emission commits.

use crate::definition::RefineFn;

/// Ordered refinement steps, applied to every canonical emission.
pub(crate) struct RefinementChain<S> {
    steps: Vec<Box<RefineFn<S>>>,
}

impl<S> RefinementChain<S> {
    pub(crate) fn new(steps: Vec<Box<RefineFn<S>>>) -> Self {
        Self { steps }
    }

    /// Folds the steps over one raw emission.
    ///
    /// Returns the refined value and any faults recorded along the way,
    /// in step order.
    pub(crate) fn apply(&self, raw: S) -> (S, Vec<anyhow::Error>) {
        let mut value = raw;
        let mut faults = Vec::new();

        for step in &self.steps {
            match step(&value) {
                Ok(Some(next)) => value = next,
                Ok(None) => {}
                Err(fault) => faults.push(fault),
            }
        }

        (value, faults)
    }
}
