//! The declarative application description consumed by assembly.
//!
//! An [`AppDefinition`] is plain accumulated data: an initial state,
//! ordered handler registrations, ordered refinement steps, and action
//! sources. It carries no behavior of its own - the runtime owns all
//! semantics - and it is consumed by value at assembly, so it is
//! immutable once the loop exists.
//!
//! Registration order is meaningful: handlers matching the same action
//! are invoked in the order they were added, and refinement steps fold
//! left-to-right in the order they were added.
//!
//! The fluent registration facade lives in `reflow-app`; this type is
//! the explicit, strongly-typed list it produces.

use crate::bus::Dispatcher;
use crate::state::StateView;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{Future, FutureExt, Stream, StreamExt};
use reflow_action::{Action, Selector};

/// Outcome of a handler invocation or refinement step.
///
/// - `Ok(Some(state))` - a new raw state for the timeline
/// - `Ok(None)` - no change; the previous state is retained
/// - `Err(fault)` - translated into an `error` action, never propagated
pub type HandlerResult<S> = anyhow::Result<Option<S>>;

/// A push-based producer of actions, subscribed once at assembly.
pub type ActionStream = BoxStream<'static, Action>;

pub(crate) type HandlerFn<S> =
    dyn Fn(&StateView<S>, &Action, &Dispatcher<S>) -> HandlerResult<S> + Send + Sync;

pub(crate) type AsyncHandlerFn<S> = dyn Fn(StateView<S>, Action, Dispatcher<S>) -> BoxFuture<'static, HandlerResult<S>>
    + Send
    + Sync;

pub(crate) type RefineFn<S> = dyn Fn(&S) -> HandlerResult<S> + Send + Sync;

pub(crate) struct SyncRegistration<S> {
    pub(crate) selector: Selector,
    pub(crate) handler: Box<HandlerFn<S>>,
}

pub(crate) struct AsyncRegistration<S> {
    pub(crate) selector: Selector,
    pub(crate) handler: Box<AsyncHandlerFn<S>>,
}

/// Everything the runtime needs to assemble one closed loop.
///
/// # Example
///
/// ```
/// use reflow_runtime::{Action, AppDefinition, Runtime};
///
/// #[derive(Clone)]
/// struct Counter {
///     count: i64,
/// }
///
/// let mut def = AppDefinition::new(Counter { count: 0 });
/// def.add_handler("bump", |state, _action, _dispatch| {
///     Ok(Some(Counter { count: state.get().count + 1 }))
/// });
/// def.add_refinement(|_state: &Counter| Ok(None));
///
/// let runtime = Runtime::init(def).expect("assembly");
/// runtime.dispatch(Action::new("bump"));
/// assert_eq!(runtime.current_state().count, 1);
/// ```
pub struct AppDefinition<S> {
    initial_state: S,
    sync_handlers: Vec<SyncRegistration<S>>,
    async_handlers: Vec<AsyncRegistration<S>>,
    refinements: Vec<Box<RefineFn<S>>>,
    sources: Vec<ActionStream>,
}

impl<S> AppDefinition<S> {
    /// Creates a definition seeded with the initial state.
    #[must_use]
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            sync_handlers: Vec::new(),
            async_handlers: Vec::new(),
            refinements: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Replaces the initial state.
    pub fn set_initial_state(&mut self, initial_state: S) {
        self.initial_state = initial_state;
    }

    /// Registers a synchronous handler.
    ///
    /// The handler receives the live state accessor, the matched
    /// action, and the dispatcher (for reentrant dispatch).
    pub fn add_handler<F>(&mut self, selector: impl Into<Selector>, handler: F)
    where
        F: Fn(&StateView<S>, &Action, &Dispatcher<S>) -> HandlerResult<S> + Send + Sync + 'static,
    {
        self.sync_handlers.push(SyncRegistration {
            selector: selector.into(),
            handler: Box::new(handler),
        });
    }

    /// Registers an asynchronous handler.
    ///
    /// The closure is invoked at match time and returns a future; the
    /// future's output is reconciled onto the state timeline when it
    /// completes.
    pub fn add_async_handler<F, Fut>(&mut self, selector: impl Into<Selector>, handler: F)
    where
        F: Fn(StateView<S>, Action, Dispatcher<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<S>> + Send + 'static,
    {
        self.async_handlers.push(AsyncRegistration {
            selector: selector.into(),
            handler: Box::new(move |state, action, dispatch| {
                handler(state, action, dispatch).boxed()
            }),
        });
    }

    /// Registers a refinement step.
    ///
    /// Steps fold left-to-right over every value on the state
    /// timeline, including the initial seed. `Ok(None)` passes the
    /// input through unchanged.
    pub fn add_refinement<F>(&mut self, step: F)
    where
        F: Fn(&S) -> HandlerResult<S> + Send + Sync + 'static,
    {
        self.refinements.push(Box::new(step));
    }

    /// Registers an action source, subscribed exactly once at assembly.
    pub fn add_action_source<St>(&mut self, source: St)
    where
        St: Stream<Item = Action> + Send + 'static,
    {
        self.sources.push(source.boxed());
    }

    /// Returns the number of registered synchronous handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.sync_handlers.len()
    }

    /// Returns the number of registered asynchronous handlers.
    #[must_use]
    pub fn async_handler_count(&self) -> usize {
        self.async_handlers.len()
    }

    /// Returns the number of registered refinement steps.
    #[must_use]
    pub fn refinement_count(&self) -> usize {
        self.refinements.len()
    }

    /// Returns the number of registered action sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn into_parts(
        self,
    ) -> (
        S,
        Vec<SyncRegistration<S>>,
        Vec<AsyncRegistration<S>>,
        Vec<Box<RefineFn<S>>>,
        Vec<ActionStream>,
    ) {
        (
            self.initial_state,
            self.sync_handlers,
            self.async_handlers,
            self.refinements,
            self.sources,
        )
    }
}
