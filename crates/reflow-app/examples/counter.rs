//! Counter demo.
//!
//! Demonstrates:
//! - Handler registration through the builder
//! - A refinement step observing every state
//! - An async handler reconciling onto the same timeline
//! - Error listening via the `error` selector
//!
//! Run with:
//!
//! ```text
//! RUST_LOG=debug cargo run -p reflow-app --example counter
//! ```

use reflow_app::{Action, AppBuilder, Runtime, StateView};
use std::time::Duration;

#[derive(Clone, Debug)]
struct Counter {
    count: i64,
    peak: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let def = AppBuilder::new(Counter { count: 0, peak: 0 })
        .add_handler("increment", |state: &StateView<Counter>, _, _| {
            let current = state.get();
            Ok(Some(Counter {
                count: current.count + 1,
                peak: current.peak,
            }))
        })
        .add_handler("explode", |_: &StateView<Counter>, _, _| {
            anyhow::bail!("counter exploded")
        })
        .add_async_handler("save", |state: StateView<Counter>, _, _| async move {
            // Stand-in for real async work.
            tokio::time::sleep(Duration::from_millis(20)).await;
            println!("saved count={}", state.get().count);
            Ok(None)
        })
        .add_refinement(|state: &Counter| {
            if state.count > state.peak {
                Ok(Some(Counter {
                    count: state.count,
                    peak: state.count,
                }))
            } else {
                Ok(None)
            }
        })
        .add_error_listener(|_state, report| {
            if let Some(fault) = report.fault() {
                println!("recovered from fault: {fault}");
            }
        })
        .build();

    let runtime = Runtime::init(def)?;

    runtime.dispatch(Action::new("increment"));
    runtime.dispatch(Action::new("increment"));
    runtime.dispatch(Action::new("explode"));
    runtime.dispatch(Action::new("increment"));
    runtime.dispatch(Action::new("save"));

    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = runtime.current_state();
    println!("final count={} peak={}", state.count, state.peak);

    for entry in runtime.journal().recent(10) {
        println!(
            "{} {}{}",
            entry.recorded_at.format("%H:%M:%S%.3f"),
            entry.action.kind(),
            entry
                .action
                .fault()
                .map(|fault| format!(" ({fault})"))
                .unwrap_or_default()
        );
    }

    runtime.shutdown();
    Ok(())
}
