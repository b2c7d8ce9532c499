//! The action bus - dispatch entry, timelines, and the emit section.
//!
//! The bus accepts either a single action or a stream of actions. A
//! bare action is processed synchronously, to completion, inside the
//! dispatch call: broadcast on the action timeline, appended to the
//! journal, then run through every handler pipeline in registration
//! order. A stream is bridged by a spawned task that forwards each
//! item through the same path in production order.
//!
//! # Reentrancy
//!
//! Handlers are invoked with no lock held, so a handler may call
//! [`Dispatcher::dispatch`] synchronously: the inner action's full
//! pipeline runs (and commits) before control returns to the outer
//! handler. The emit section (refine + commit + broadcast) is guarded
//! by a mutex for cross-thread emissions; on a single thread it never
//! self-nests because commits only happen after handler invocations
//! return.
//!
//! # Lifetime
//!
//! A [`Dispatcher`] holds a weak reference to the runtime core.
//! Dispatching after the [`Runtime`](crate::Runtime) is discarded is a
//! logged no-op (or [`RuntimeError::Terminated`] via
//! [`Dispatcher::try_dispatch`]).

use crate::definition::{ActionStream, AsyncRegistration, SyncRegistration};
use crate::error::RuntimeError;
use crate::journal::ActionJournal;
use crate::pipeline;
use crate::refine::RefinementChain;
use crate::state::StateView;
use futures::{Stream, StreamExt};
use parking_lot::{Mutex, RwLock};
use reflow_action::Action;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;

/// An input accepted by [`Dispatcher::dispatch`]: one action, or a
/// producer of actions.
pub enum Dispatchable {
    /// A single action, processed synchronously within the dispatch call.
    Action(Action),
    /// A stream of actions, bridged onto the bus in production order.
    Stream(ActionStream),
}

impl Dispatchable {
    /// Wraps a stream of actions for dispatch.
    #[must_use]
    pub fn stream<St>(source: St) -> Self
    where
        St: Stream<Item = Action> + Send + 'static,
    {
        Self::Stream(source.boxed())
    }
}

impl From<Action> for Dispatchable {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}

impl fmt::Debug for Dispatchable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Self::Stream(_) => f.write_str("Stream(<actions>)"),
        }
    }
}

/// Handle for injecting actions into the bus.
///
/// Cheap to clone; handed to every handler invocation and obtainable
/// from [`Runtime::dispatcher`](crate::Runtime::dispatcher).
pub struct Dispatcher<S> {
    core: Weak<RuntimeCore<S>>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatcher")
    }
}

impl<S: Clone + Send + Sync + 'static> Dispatcher<S> {
    /// Injects an action (or a stream of actions) into the bus.
    ///
    /// Never fails and never panics: faults inside handlers surface as
    /// `error` actions, and dispatch after runtime teardown is a
    /// logged no-op.
    pub fn dispatch(&self, input: impl Into<Dispatchable>) {
        if self.try_dispatch(input).is_err() {
            tracing::debug!("dispatch after runtime teardown; action dropped");
        }
    }

    /// Injects an action, reporting teardown instead of logging it.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Terminated`] when the owning runtime no
    /// longer exists.
    pub fn try_dispatch(&self, input: impl Into<Dispatchable>) -> Result<(), RuntimeError> {
        match self.core.upgrade() {
            Some(core) => {
                core.accept(input.into());
                Ok(())
            }
            None => Err(RuntimeError::Terminated),
        }
    }

    /// Convenience for dispatching a stream of actions.
    pub fn dispatch_stream<St>(&self, source: St)
    where
        St: Stream<Item = Action> + Send + 'static,
    {
        self.dispatch(Dispatchable::stream(source));
    }
}

/// Shared heart of one assembled runtime.
///
/// Owned by [`Runtime`](crate::Runtime); reached weakly from
/// dispatchers and spawned tasks so teardown is driven by the runtime
/// handle alone.
pub(crate) struct RuntimeCore<S> {
    pub(crate) sync_handlers: Vec<SyncRegistration<S>>,
    pub(crate) async_handlers: Vec<AsyncRegistration<S>>,
    pub(crate) chain: RefinementChain<S>,
    /// Live canonical state; shared with every [`StateView`].
    pub(crate) state: Arc<RwLock<S>>,
    /// Guards refine + commit so no two emissions interleave.
    emit_gate: Mutex<()>,
    pub(crate) action_tx: broadcast::Sender<Action>,
    pub(crate) state_tx: broadcast::Sender<S>,
    pub(crate) journal: ActionJournal,
    /// Captured at assembly; `None` for purely synchronous apps.
    pub(crate) spawner: Option<tokio::runtime::Handle>,
}

impl<S: Clone + Send + Sync + 'static> RuntimeCore<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        sync_handlers: Vec<SyncRegistration<S>>,
        async_handlers: Vec<AsyncRegistration<S>>,
        chain: RefinementChain<S>,
        initial_state: S,
        action_tx: broadcast::Sender<Action>,
        state_tx: broadcast::Sender<S>,
        journal: ActionJournal,
        spawner: Option<tokio::runtime::Handle>,
    ) -> Self {
        Self {
            sync_handlers,
            async_handlers,
            chain,
            state: Arc::new(RwLock::new(initial_state)),
            emit_gate: Mutex::new(()),
            action_tx,
            state_tx,
            journal,
            spawner,
        }
    }

    pub(crate) fn dispatcher(self: &Arc<Self>) -> Dispatcher<S> {
        Dispatcher {
            core: Arc::downgrade(self),
        }
    }

    pub(crate) fn state_view(&self) -> StateView<S> {
        StateView::new(Arc::clone(&self.state))
    }

    pub(crate) fn accept(self: &Arc<Self>, input: Dispatchable) {
        match input {
            Dispatchable::Action(action) => self.dispatch_action(action),
            Dispatchable::Stream(stream) => self.bridge_stream(stream),
        }
    }

    /// Runs one action through the bus: timelines first, then every
    /// handler pipeline in registration order (sync before async).
    pub(crate) fn dispatch_action(self: &Arc<Self>, action: Action) {
        tracing::debug!(kind = %action.kind(), "action dispatched");
        self.journal.record(&action);
        let _ = self.action_tx.send(action.clone());

        pipeline::run_sync(self, &action);
        pipeline::launch_async(self, &action);
    }

    /// Pushes one raw value onto the state timeline: refine, commit,
    /// broadcast, then report any refinement faults as `error` actions.
    ///
    /// Faults are dispatched outside the gate - dispatch re-enters the
    /// handler pipelines, and the chain must not run against itself.
    pub(crate) fn emit(self: &Arc<Self>, raw: S) {
        let faults = {
            let _gate = self.emit_gate.lock();
            let (refined, faults) = self.chain.apply(raw);
            *self.state.write() = refined.clone();
            let _ = self.state_tx.send(refined);
            faults
        };

        for fault in faults {
            tracing::error!(error = %fault, "refinement step failed");
            self.dispatch_action(Action::error(None, fault));
        }
    }

    /// Bridges a dispatched stream onto the bus via a spawned task.
    fn bridge_stream(self: &Arc<Self>, stream: ActionStream) {
        let Some(handle) = self.spawner.clone() else {
            self.dispatch_action(Action::error(None, RuntimeError::TokioRequired.into()));
            return;
        };

        let core = Arc::downgrade(self);
        handle.spawn(async move {
            let mut stream = stream;
            while let Some(action) = stream.next().await {
                let Some(core) = core.upgrade() else { break };
                core.dispatch_action(action);
            }
        });
    }
}
