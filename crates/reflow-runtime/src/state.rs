//! Live state access for handlers.
//!
//! Handlers receive a [`StateView`] instead of a state value: the view
//! reads the canonical current state at the moment [`get`](StateView::get)
//! is called, not at the moment the handler was matched. This is the
//! "live accessor" half of the paired-snapshot/live duality - the
//! snapshot captured at match time is used only as the error-path
//! fallback inside the runtime.

use parking_lot::RwLock;
use std::sync::Arc;

/// Zero-argument accessor for the live canonical state.
///
/// Cheap to clone; all clones observe the same underlying state cell.
///
/// # Example
///
/// ```
/// # use reflow_runtime::{AppDefinition, Runtime};
/// let mut def = AppDefinition::new(0_i64);
/// def.add_handler("bump", |state, _action, _dispatch| Ok(Some(state.get() + 1)));
///
/// let runtime = Runtime::init(def).expect("assembly");
/// runtime.dispatch(reflow_runtime::Action::new("bump"));
/// assert_eq!(runtime.current_state(), 1);
/// ```
pub struct StateView<S> {
    cell: Arc<RwLock<S>>,
}

impl<S: Clone> StateView<S> {
    /// Returns a clone of the live canonical state.
    #[must_use]
    pub fn get(&self) -> S {
        self.cell.read().clone()
    }
}

impl<S> StateView<S> {
    pub(crate) fn new(cell: Arc<RwLock<S>>) -> Self {
        Self { cell }
    }
}

impl<S> Clone for StateView<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}
