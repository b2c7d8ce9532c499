//! Application layer for the Reflow state runtime.
//!
//! [`AppBuilder`] is the fluent registration facade over
//! [`AppDefinition`](reflow_runtime::AppDefinition): accumulate
//! handlers, refinements, and action sources, then hand the built
//! definition to [`Runtime::init`](reflow_runtime::Runtime::init).
//!
//! # Example
//!
//! ```
//! use reflow_app::AppBuilder;
//! use reflow_runtime::{Action, Runtime};
//!
//! #[derive(Clone)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! let def = AppBuilder::new(Counter { count: 0 })
//!     .add_handler("bump", |state, _action, _dispatch| {
//!         Ok(Some(Counter { count: state.get().count + 1 }))
//!     })
//!     .add_error_listener(|_state, report| {
//!         if let Some(fault) = report.fault() {
//!             tracing::warn!(error = %fault, "handler fault observed");
//!         }
//!     })
//!     .build();
//!
//! let runtime = Runtime::init(def).expect("assembly");
//! runtime.dispatch(Action::new("bump"));
//! assert_eq!(runtime.current_state().count, 1);
//! ```

mod builder;

pub use builder::AppBuilder;

// Re-export the lower layers for one-stop consumption.
pub use reflow_action::{Action, ErrorCode, Fault, Selector, ERROR_KIND};
pub use reflow_runtime::{
    ActionJournal, AppDefinition, Dispatchable, Dispatcher, HandlerResult, JournalEntry, Runtime,
    RuntimeConfig, RuntimeError, StateView,
};
