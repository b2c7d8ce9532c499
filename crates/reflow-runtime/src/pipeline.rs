//! Handler dispatch pipelines and the failure boundary around them.
//!
//! For each dispatched action, every registration is tested against
//! its selector; matching handlers run with three inputs - the live
//! state accessor, the matched action, and a dispatcher for reentrant
//! dispatch.
//!
//! # Paired snapshot vs. live state
//!
//! At match time each pipeline captures the canonical state as its
//! *paired snapshot*. The handler itself always reads live state
//! through the accessor; the snapshot exists solely as the error-path
//! fallback. When a handler fails, the bus first dispatches the
//! `error` action (so error listeners run), then emits the snapshot so
//! the canonical timeline still advances with the last value known
//! good for that pipeline. Collapsing the two would change rollback
//! behavior under concurrent async completions - keep them distinct.
//!
//! # Sync vs. async
//!
//! Synchronous pipelines run inline, in registration order; a later
//! pipeline observes the committed effects of earlier ones. All async
//! handlers for an action are invoked at match time (after the sync
//! pipelines) and their futures spawned; completions reconcile onto
//! the state timeline in completion order. A future that never settles
//! starves only its own contribution.

use crate::bus::RuntimeCore;
use reflow_action::Action;
use std::sync::Arc;

/// Runs every matching synchronous handler for one action.
pub(crate) fn run_sync<S>(core: &Arc<RuntimeCore<S>>, action: &Action)
where
    S: Clone + Send + Sync + 'static,
{
    for registration in &core.sync_handlers {
        if !registration.selector.matches(action) {
            continue;
        }

        let paired = core.state.read().clone();
        let view = core.state_view();
        let dispatcher = core.dispatcher();

        match (registration.handler)(&view, action, &dispatcher) {
            Ok(Some(next)) => core.emit(next),
            Ok(None) => {}
            Err(fault) => {
                tracing::warn!(
                    kind = %action.kind(),
                    error = %fault,
                    "handler failed; converting to error action"
                );
                core.dispatch_action(Action::error(Some(action.clone()), fault));
                core.emit(paired);
            }
        }
    }
}

/// Invokes every matching asynchronous handler for one action and
/// spawns its completion.
pub(crate) fn launch_async<S>(core: &Arc<RuntimeCore<S>>, action: &Action)
where
    S: Clone + Send + Sync + 'static,
{
    for registration in &core.async_handlers {
        if !registration.selector.matches(action) {
            continue;
        }

        // Assembly refuses async registrations without a tokio context,
        // so a missing spawner cannot be observed here.
        let Some(handle) = core.spawner.clone() else {
            continue;
        };

        let paired = core.state.read().clone();
        let future = (registration.handler)(core.state_view(), action.clone(), core.dispatcher());

        let weak = Arc::downgrade(core);
        let matched = action.clone();
        handle.spawn(async move {
            let outcome = future.await;
            let Some(core) = weak.upgrade() else { return };

            match outcome {
                Ok(Some(next)) => core.emit(next),
                Ok(None) => {}
                Err(fault) => {
                    tracing::warn!(
                        kind = %matched.kind(),
                        error = %fault,
                        "async handler failed; converting to error action"
                    );
                    core.dispatch_action(Action::error(Some(matched), fault));
                    core.emit(paired);
                }
            }
        });
    }
}
