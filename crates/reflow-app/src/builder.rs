//! Fluent registration facade over [`AppDefinition`].
//!
//! The runtime consumes an explicit, strongly-typed registration list;
//! this builder is the ergonomic way to produce one. It is pure data
//! accumulation - no wiring happens until
//! [`Runtime::init`](reflow_runtime::Runtime::init) consumes the built
//! definition, and the runtime keeps no reference back to the builder.

use futures::{Future, Stream};
use reflow_action::{Action, Selector, ERROR_KIND};
use reflow_runtime::{AppDefinition, Dispatcher, HandlerResult, StateView};

/// Fluent builder for an application definition.
///
/// Registration order is preserved: handlers matching the same action
/// run in the order they were added, refinements fold in the order
/// they were added.
pub struct AppBuilder<S> {
    definition: AppDefinition<S>,
}

impl<S> AppBuilder<S> {
    /// Creates a builder seeded with the initial state.
    #[must_use]
    pub fn new(initial_state: S) -> Self {
        Self {
            definition: AppDefinition::new(initial_state),
        }
    }

    /// Replaces the initial state.
    #[must_use]
    pub fn set_initial_state(mut self, initial_state: S) -> Self {
        self.definition.set_initial_state(initial_state);
        self
    }

    /// Registers a synchronous handler.
    #[must_use]
    pub fn add_handler<F>(mut self, selector: impl Into<Selector>, handler: F) -> Self
    where
        F: Fn(&StateView<S>, &Action, &Dispatcher<S>) -> HandlerResult<S> + Send + Sync + 'static,
    {
        self.definition.add_handler(selector, handler);
        self
    }

    /// Registers an asynchronous handler.
    #[must_use]
    pub fn add_async_handler<F, Fut>(mut self, selector: impl Into<Selector>, handler: F) -> Self
    where
        F: Fn(StateView<S>, Action, Dispatcher<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<S>> + Send + 'static,
    {
        self.definition.add_async_handler(selector, handler);
        self
    }

    /// Registers a listener for synthetic `error` actions.
    ///
    /// Sugar over `add_handler(ERROR_KIND, ..)`: the listener observes
    /// the error action (its fault carries the failure and the action
    /// that was being handled) and never changes state.
    #[must_use]
    pub fn add_error_listener<F>(self, listener: F) -> Self
    where
        F: Fn(&StateView<S>, &Action) + Send + Sync + 'static,
    {
        self.add_handler(ERROR_KIND, move |state, action, _dispatch| {
            listener(state, action);
            Ok(None)
        })
    }

    /// Registers a refinement step.
    #[must_use]
    pub fn add_refinement<F>(mut self, step: F) -> Self
    where
        F: Fn(&S) -> HandlerResult<S> + Send + Sync + 'static,
    {
        self.definition.add_refinement(step);
        self
    }

    /// Registers an action source, subscribed once at assembly.
    #[must_use]
    pub fn add_action_source<St>(mut self, source: St) -> Self
    where
        St: Stream<Item = Action> + Send + 'static,
    {
        self.definition.add_action_source(source);
        self
    }

    /// Returns the accumulated definition.
    #[must_use]
    pub fn build(self) -> AppDefinition<S> {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn accumulates_registrations() {
        let def = AppBuilder::new(0_i64)
            .add_handler("a", |_, _, _| Ok(None))
            .add_handler("b", |_, _, _| Ok(None))
            .add_async_handler("c", |_, _, _| async { Ok(None) })
            .add_refinement(|_: &i64| Ok(None))
            .add_action_source(stream::empty())
            .build();

        assert_eq!(def.handler_count(), 2);
        assert_eq!(def.async_handler_count(), 1);
        assert_eq!(def.refinement_count(), 1);
        assert_eq!(def.source_count(), 1);
    }

    #[test]
    fn error_listener_registers_a_handler() {
        let def = AppBuilder::new(0_i64)
            .add_error_listener(|_state, _report| {})
            .build();

        assert_eq!(def.handler_count(), 1);
    }

    #[test]
    fn set_initial_state_replaces_seed() {
        let def = AppBuilder::new(1_i64).set_initial_state(7).build();
        let runtime = reflow_runtime::Runtime::init(def).expect("assembly");

        assert_eq!(runtime.current_state(), 7);
    }
}
