//! Integration tests for the closed-loop runtime semantics.
//!
//! Covers the observable contract end-to-end against [`AppDefinition`]
//! directly: ordering, refinement folding, the failure boundary, async
//! reconciliation, and teardown.

use futures::stream;
use reflow_runtime::{
    Action, AppDefinition, Dispatcher, ErrorCode, HandlerResult, Runtime, RuntimeError, Selector,
    StateView, ERROR_KIND,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Counter {
    count: i64,
}

fn counter(count: i64) -> Counter {
    Counter { count }
}

fn count_up(
    state: &StateView<Counter>,
    _action: &Action,
    _dispatch: &Dispatcher<Counter>,
) -> HandlerResult<Counter> {
    Ok(Some(counter(state.get().count + 1)))
}

/// Polls a condition until it holds, yielding to the runtime between
/// checks. Panics after a bounded budget so a broken loop fails fast.
async fn settle(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached before settle budget expired");
}

// =============================================================================
// Synchronous pipeline
// =============================================================================

#[test]
fn counter_increments_twice() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", count_up);

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));
    runtime.dispatch(Action::new("foo"));

    assert_eq!(runtime.current_state().count, 2);
}

#[test]
fn handlers_run_in_registration_order() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", |state: &StateView<Counter>, _, _| {
        Ok(Some(counter(state.get().count * 2)))
    });
    def.add_handler("foo", count_up);

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));

    // 1 doubled to 2, then incremented to 3; the second handler saw
    // the first one's committed effect.
    assert_eq!(runtime.current_state().count, 3);
}

#[test]
fn predicate_selector_filters() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler(
        Selector::matching(|a: &Action| a.kind().starts_with('f')),
        count_up,
    );

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("ar"));
    runtime.dispatch(Action::new("foo"));
    runtime.dispatch(Action::new("fa"));

    assert_eq!(runtime.current_state().count, 2);
}

#[test]
fn inert_selector_never_fires() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler(Selector::Inert, count_up);

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));
    runtime.dispatch(Action::new("error"));

    assert_eq!(runtime.current_state().count, 0);
}

#[test]
fn no_output_means_no_change() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", |_: &StateView<Counter>, _, _| Ok(None));

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));

    assert_eq!(runtime.current_state().count, 1);
}

#[test]
fn reentrant_dispatch_observes_committed_state() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", |state: &StateView<Counter>, _, _| {
        Ok(Some(counter(state.get().count * 2)))
    });
    def.add_handler(
        "bar",
        |state: &StateView<Counter>, _, dispatch: &Dispatcher<Counter>| {
            dispatch.dispatch(Action::new("foo"));
            // The inner action committed before this read.
            Ok(Some(counter(state.get().count + 1)))
        },
    );

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("bar"));

    assert_eq!(runtime.current_state().count, 3);
}

#[test]
fn opaque_json_state() {
    let mut def = AppDefinition::new(json!({ "count": 0 }));
    def.add_handler("foo", |state: &StateView<serde_json::Value>, _, _| {
        let mut next = state.get();
        next["count"] = json!(next["count"].as_i64().unwrap_or(0) + 1);
        Ok(Some(next))
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));

    assert_eq!(runtime.current_state()["count"], 1);
}

// =============================================================================
// Refinement chain
// =============================================================================

#[test]
fn refinement_applies_to_seed_and_outputs() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", count_up);
    def.add_refinement(|state: &Counter| Ok(Some(counter(state.count * 2))));

    let runtime = Runtime::init(def).expect("assembly");
    // Seed already refined: 1 -> 2.
    assert_eq!(runtime.current_state().count, 2);

    runtime.dispatch(Action::new("foo"));
    // Handler saw 2, emitted 3, refined to 6.
    assert_eq!(runtime.current_state().count, 6);
}

#[test]
fn refinements_compound_in_registration_order() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", count_up);
    def.add_refinement(|state: &Counter| Ok(Some(counter(state.count * 2))));
    def.add_refinement(|state: &Counter| Ok(Some(counter(state.count + 1))));

    let runtime = Runtime::init(def).expect("assembly");
    // Seed: 1 -> 2 -> 3.
    assert_eq!(runtime.current_state().count, 3);

    runtime.dispatch(Action::new("foo"));
    // Handler saw 3, emitted 4; 4 -> 8 -> 9.
    assert_eq!(runtime.current_state().count, 9);
}

#[test]
fn refinement_observes_handler_output() {
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Flagged {
        count: i64,
        seen: bool,
    }

    let mut def = AppDefinition::new(Flagged {
        count: 1,
        seen: false,
    });
    def.add_handler("foo", |state: &StateView<Flagged>, _, _| {
        Ok(Some(Flagged {
            count: state.get().count + 1,
            seen: false,
        }))
    });
    def.add_refinement(|state: &Flagged| {
        if state.count == 2 {
            Ok(Some(Flagged {
                count: state.count,
                seen: true,
            }))
        } else {
            Ok(None)
        }
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));

    assert!(runtime.current_state().seen);
}

#[test]
fn refinement_returning_none_keeps_state() {
    let mut def = AppDefinition::<Counter>::new(counter(1));
    def.add_refinement(|state: &Counter| {
        if state.count > 1 {
            Ok(Some(counter(5)))
        } else {
            Ok(None)
        }
    });

    let runtime = Runtime::init(def).expect("assembly");

    assert_eq!(runtime.current_state().count, 1);
}

// =============================================================================
// Failure boundary
// =============================================================================

#[test]
fn dying_handler_recovers() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", |state: &StateView<Counter>, action: &Action, _| {
        if action.payload()["die"].as_bool() == Some(true) {
            anyhow::bail!("die");
        }
        Ok(Some(counter(state.get().count + 1)))
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::with_payload("foo", json!({ "die": true })));
    assert_eq!(runtime.current_state().count, 0);

    runtime.dispatch(Action::with_payload("foo", json!({ "die": false })));
    assert_eq!(runtime.current_state().count, 1);
}

#[test]
fn handler_fault_becomes_error_action() {
    let seen: Arc<Mutex<Option<Action>>> = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);

    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", |_: &StateView<Counter>, _, _| {
        Err(anyhow::anyhow!("die"))
    });
    def.add_handler(ERROR_KIND, move |_, action: &Action, _| {
        *record.lock().expect("listener lock") = Some(action.clone());
        Ok(None)
    });

    let runtime = Runtime::init(def).expect("assembly");
    let before = runtime.current_state();
    runtime.dispatch(Action::new("foo"));

    let observed = seen.lock().expect("listener lock").clone();
    let observed = observed.expect("error action observed");
    let fault = observed.fault().expect("fault attached");
    assert_eq!(fault.message(), "die");
    assert_eq!(
        fault.while_handling().expect("triggering action").kind(),
        "foo"
    );

    // The fallback emission re-committed the paired snapshot.
    assert_eq!(runtime.current_state(), before);

    // Both the action and its error report reached the journal.
    let kinds: Vec<String> = runtime
        .journal()
        .recent(10)
        .into_iter()
        .map(|entry| entry.action.kind().to_string())
        .collect();
    assert_eq!(kinds, ["foo", ERROR_KIND]);
}

#[test]
fn dying_refinement_reports_without_stalling() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);

    let mut def = AppDefinition::new(counter(1));
    def.add_refinement(|_: &Counter| Err(anyhow::anyhow!("die")));
    def.add_handler(ERROR_KIND, move |_, action: &Action, _| {
        let message = action.fault().map(|fault| fault.message());
        *record.lock().expect("listener lock") = message;
        Ok(None)
    });

    // The seed emission already runs the chain; the fault surfaces to
    // the listener during assembly.
    let runtime = Runtime::init(def).expect("assembly");

    assert_eq!(seen.lock().expect("listener lock").as_deref(), Some("die"));
    assert_eq!(runtime.current_state().count, 1);

    let last = runtime.journal().recent(1);
    assert_eq!(last[0].action.kind(), ERROR_KIND);
    assert!(last[0].action.fault().expect("fault").while_handling().is_none());
}

// =============================================================================
// Asynchronous pipeline
// =============================================================================

#[tokio::test]
async fn async_handler_reconciles() {
    let mut def = AppDefinition::new(counter(0));
    def.add_async_handler("foo", |state: StateView<Counter>, _, _| async move {
        Ok(Some(counter(state.get().count + 1)))
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));

    settle(|| runtime.current_state().count == 1).await;
}

#[tokio::test]
async fn async_completions_apply_in_completion_order() {
    let mut def = AppDefinition::<Vec<String>>::new(Vec::new());
    def.add_async_handler("slow", |state: StateView<Vec<String>>, _, _| async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        let mut next = state.get();
        next.push("slow".to_string());
        Ok(Some(next))
    });
    def.add_async_handler("fast", |state: StateView<Vec<String>>, _, _| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let mut next = state.get();
        next.push("fast".to_string());
        Ok(Some(next))
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("slow"));
    runtime.dispatch(Action::new("fast"));

    settle(|| runtime.current_state().len() == 2).await;
    assert_eq!(runtime.current_state(), ["fast", "slow"]);
}

#[tokio::test]
async fn rejected_async_handler_falls_back() {
    let mut def = AppDefinition::new(counter(3));
    def.add_async_handler("foo", |_: StateView<Counter>, _, _| async move {
        Err(anyhow::anyhow!("argh"))
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));

    settle(|| {
        runtime
            .journal()
            .recent(10)
            .iter()
            .any(|entry| entry.action.is_error())
    })
    .await;

    let report = runtime
        .journal()
        .recent(10)
        .into_iter()
        .find(|entry| entry.action.is_error())
        .expect("error action recorded");
    let fault = report.action.fault().expect("fault attached");
    assert_eq!(fault.message(), "argh");
    assert_eq!(
        fault.while_handling().expect("triggering action").kind(),
        "foo"
    );

    // Paired snapshot re-committed; the timeline did not stall.
    assert_eq!(runtime.current_state().count, 3);
}

#[tokio::test]
async fn async_no_output_means_no_change() {
    let mut def = AppDefinition::new(counter(0));
    def.add_async_handler("foo", |_: StateView<Counter>, _, _| async { Ok(None) });
    def.add_handler("bar", count_up);

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("foo"));
    runtime.dispatch(Action::new("bar"));

    settle(|| runtime.journal().len() == 2).await;
    assert_eq!(runtime.current_state().count, 1);
}

// =============================================================================
// Sources, streams, timelines
// =============================================================================

#[tokio::test]
async fn action_sources_feed_the_bus() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", count_up);
    def.add_action_source(stream::iter(vec![Action::new("foo")]));

    let runtime = Runtime::init(def).expect("assembly");

    settle(|| runtime.current_state().count == 2).await;
}

#[test]
fn sources_require_tokio() {
    let mut def = AppDefinition::new(counter(0));
    def.add_action_source(stream::empty());

    let err = Runtime::init(def).expect_err("assembly must fail");
    assert_eq!(err, RuntimeError::TokioRequired);
    assert_eq!(err.code(), "RUNTIME_TOKIO_REQUIRED");
}

#[test]
fn async_handlers_require_tokio() {
    let mut def = AppDefinition::new(counter(0));
    def.add_async_handler("foo", |_: StateView<Counter>, _, _| async { Ok(None) });

    assert_eq!(
        Runtime::init(def).expect_err("assembly must fail"),
        RuntimeError::TokioRequired
    );
}

#[tokio::test]
async fn handler_can_dispatch_a_stream() {
    let mut def = AppDefinition::new(counter(1));
    def.add_handler("foo", count_up);
    def.add_handler("bar", |_: &StateView<Counter>, _, dispatch: &Dispatcher<Counter>| {
        dispatch.dispatch_stream(stream::iter(vec![Action::new("foo"), Action::new("foo")]));
        Ok(None)
    });

    let runtime = Runtime::init(def).expect("assembly");
    runtime.dispatch(Action::new("bar"));

    settle(|| runtime.current_state().count == 3).await;
}

#[tokio::test]
async fn state_timeline_broadcasts_every_emission() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", count_up);

    let runtime = Runtime::init(def).expect("assembly");
    let mut states = runtime.subscribe_states();

    runtime.dispatch(Action::new("foo"));
    runtime.dispatch(Action::new("foo"));

    let first = tokio::time::timeout(Duration::from_secs(1), states.recv())
        .await
        .expect("first state in time")
        .expect("channel open");
    let second = tokio::time::timeout(Duration::from_secs(1), states.recv())
        .await
        .expect("second state in time")
        .expect("channel open");

    assert_eq!(first.count, 1);
    assert_eq!(second.count, 2);
}

#[tokio::test]
async fn late_subscribers_miss_the_seed() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", count_up);
    def.add_refinement(|state: &Counter| Ok(Some(counter(state.count + 10))));

    let runtime = Runtime::init(def).expect("assembly");
    // Seed emission (0 -> 10) happened during assembly.
    let mut states = runtime.subscribe_states();

    runtime.dispatch(Action::new("foo"));

    let first = tokio::time::timeout(Duration::from_secs(1), states.recv())
        .await
        .expect("state in time")
        .expect("channel open");
    assert_eq!(first.count, 21);
}

#[tokio::test]
async fn action_timeline_broadcasts_error_actions() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", |_: &StateView<Counter>, _, _| {
        Err(anyhow::anyhow!("die"))
    });

    let runtime = Runtime::init(def).expect("assembly");
    let mut actions = runtime.subscribe_actions();

    runtime.dispatch(Action::new("foo"));

    let first = tokio::time::timeout(Duration::from_secs(1), actions.recv())
        .await
        .expect("action in time")
        .expect("channel open");
    let second = tokio::time::timeout(Duration::from_secs(1), actions.recv())
        .await
        .expect("action in time")
        .expect("channel open");

    assert_eq!(first.kind(), "foo");
    assert!(second.is_error());
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test]
async fn shutdown_stops_action_sources() {
    let ticks = stream::unfold((), |()| async {
        tokio::time::sleep(Duration::from_millis(3)).await;
        Some((Action::new("tick"), ()))
    });

    let mut def = AppDefinition::new(counter(0));
    def.add_handler("tick", count_up);
    def.add_action_source(ticks);

    let runtime = Runtime::init(def).expect("assembly");
    settle(|| runtime.current_state().count >= 1).await;

    runtime.shutdown();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_shutdown = runtime.current_state().count;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(runtime.current_state().count, after_shutdown);
}

#[test]
fn dispatch_after_drop_is_a_noop() {
    let mut def = AppDefinition::new(counter(0));
    def.add_handler("foo", count_up);

    let runtime = Runtime::init(def).expect("assembly");
    let dispatcher = runtime.dispatcher();
    drop(runtime);

    dispatcher.dispatch(Action::new("foo"));
    assert_eq!(
        dispatcher.try_dispatch(Action::new("foo")),
        Err(RuntimeError::Terminated)
    );
}
