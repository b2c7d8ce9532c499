//! Runtime assembly - the entry point that closes the loop.
//!
//! [`Runtime::init`] consumes an [`AppDefinition`] and wires the
//! action bus, handler pipelines, refinement chain, and timelines into
//! one closed loop. Assembly order matters:
//!
//! 1. Timelines and journal are created.
//! 2. The live state cell is seeded with the initial state, so the
//!    first handler invocation always has a defined paired snapshot.
//! 3. Handler registrations are wired.
//! 4. The refinement chain runs over the seed - the first canonical
//!    emission. Subscribers attach only after `init` returns, so the
//!    seed emission is not observable on the timeline; this is the
//!    documented late-subscriber limitation, and the runtime does not
//!    replay the latest value to new subscribers either. Use
//!    [`Runtime::current_state`] or the journal to catch up.
//! 5. Each action source is subscribed exactly once, via a spawned
//!    forwarding task.
//!
//! # Teardown
//!
//! [`Runtime::shutdown`] aborts the source-forwarding tasks; it also
//! runs on drop. In-flight async handler futures are not cancelled -
//! they hold only a weak reference, and completions after teardown are
//! discarded.

use crate::bus::{Dispatchable, Dispatcher, RuntimeCore};
use crate::config::RuntimeConfig;
use crate::definition::{ActionStream, AppDefinition};
use crate::error::RuntimeError;
use crate::journal::ActionJournal;
use crate::refine::RefinementChain;
use crate::state::StateView;
use futures::StreamExt;
use parking_lot::Mutex;
use reflow_action::Action;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// An assembled closed-loop runtime.
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
///
/// let runtime = Runtime::init(def).expect("assembly");
/// runtime.dispatch(Action::new("bump"));
/// runtime.dispatch(Action::new("bump"));
/// assert_eq!(runtime.current_state().count, 2);
/// ```
pub struct Runtime<S: Clone + Send + Sync + 'static> {
    core: Arc<RuntimeCore<S>>,
    source_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: Clone + Send + Sync + 'static> std::fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl<S: Clone + Send + Sync + 'static> Runtime<S> {
    /// Assembles a runtime with default capacities.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::TokioRequired`] when the definition
    /// registers async handlers or action sources outside a tokio
    /// runtime context. Purely synchronous definitions assemble
    /// anywhere.
    pub fn init(definition: AppDefinition<S>) -> Result<Self, RuntimeError> {
        Self::with_config(definition, RuntimeConfig::default())
    }

    /// Assembles a runtime with explicit capacities.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Runtime::init`].
    pub fn with_config(
        definition: AppDefinition<S>,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        let (initial_state, sync_handlers, async_handlers, refinements, sources) =
            definition.into_parts();

        let spawner = tokio::runtime::Handle::try_current().ok();
        if spawner.is_none() && (!async_handlers.is_empty() || !sources.is_empty()) {
            return Err(RuntimeError::TokioRequired);
        }

        let (action_tx, _) = broadcast::channel(config.action_capacity());
        let (state_tx, _) = broadcast::channel(config.state_capacity());

        let core = Arc::new(RuntimeCore::new(
            sync_handlers,
            async_handlers,
            RefinementChain::new(refinements),
            initial_state.clone(),
            action_tx,
            state_tx,
            ActionJournal::with_capacity(config.journal_capacity()),
            spawner,
        ));

        // First canonical emission: the refined seed. Any refinement
        // faults surface as error actions to already-wired listeners.
        core.emit(initial_state);

        let mut source_tasks = Vec::with_capacity(sources.len());
        if let Some(handle) = core.spawner.clone() {
            for source in sources {
                source_tasks.push(handle.spawn(forward(Arc::downgrade(&core), source)));
            }
        }

        tracing::debug!(
            handlers = core.sync_handlers.len(),
            async_handlers = core.async_handlers.len(),
            sources = source_tasks.len(),
            "runtime assembled"
        );

        Ok(Self {
            core,
            source_tasks: Mutex::new(source_tasks),
        })
    }

    /// Injects an action (or a stream of actions) into the bus.
    pub fn dispatch(&self, input: impl Into<Dispatchable>) {
        self.core.accept(input.into());
    }

    /// Returns a cloneable dispatch handle.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<S> {
        self.core.dispatcher()
    }

    /// Returns a clone of the live canonical state.
    #[must_use]
    pub fn current_state(&self) -> S {
        self.core.state.read().clone()
    }

    /// Returns a live state accessor, as handed to handlers.
    #[must_use]
    pub fn state_view(&self) -> StateView<S> {
        self.core.state_view()
    }

    /// Subscribes to the canonical state timeline.
    ///
    /// Each subscriber sees every emission after its subscription,
    /// exactly once. Earlier emissions - the initial seed included -
    /// are not replayed.
    #[must_use]
    pub fn subscribe_states(&self) -> broadcast::Receiver<S> {
        self.core.state_tx.subscribe()
    }

    /// Subscribes to the action timeline.
    ///
    /// Broadcasts every dispatched action, synthetic `error` actions
    /// included.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<Action> {
        self.core.action_tx.subscribe()
    }

    /// Returns the journal of recently dispatched actions.
    #[must_use]
    pub fn journal(&self) -> &ActionJournal {
        &self.core.journal
    }

    /// Stops the action-source forwarding tasks.
    ///
    /// Idempotent. Dispatchers held elsewhere become no-ops once the
    /// runtime itself is dropped.
    pub fn shutdown(&self) {
        for task in self.source_tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl<S: Clone + Send + Sync + 'static> Drop for Runtime<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Forwards a source's actions onto the bus until the source ends or
/// the runtime is discarded.
async fn forward<S: Clone + Send + Sync + 'static>(
    core: Weak<RuntimeCore<S>>,
    mut source: ActionStream,
) {
    while let Some(action) = source.next().await {
        let Some(core) = core.upgrade() else { break };
        core.dispatch_action(action);
    }
}
