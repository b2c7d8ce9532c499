//! Reflow runtime - the closed-loop action/state engine.
//!
//! This crate wires actions, state, synchronous handlers, asynchronous
//! handlers, and a state-refinement chain into a single closed loop.
//! Applications describe themselves as data (an [`AppDefinition`]);
//! [`Runtime::init`] assembles the loop and exposes the observable
//! handles.
//!
//! # Data Flow
//!
//! ```text
//! dispatch(action)
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Action Bus                          │
//! │   broadcast timeline + journal + handler pipelines       │
//! └──────────────────────────────────────────────────────────┘
//!     │ selector match (registration order)
//!     ├───────────────┬──────────────────────┐
//!     ▼               ▼                      ▼
//! ┌─────────┐   ┌─────────┐          ┌────────────┐
//! │ sync    │   │ sync    │   ...    │ async      │ (spawned,
//! │ handler │   │ handler │          │ handler    │  completion
//! └─────────┘   └─────────┘          └────────────┘  order)
//!     │ Ok(Some(state)) / Ok(None) / Err(fault)
//!     ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │   raw state timeline → Refinement Chain → canonical      │
//! │   state timeline → live current state + subscribers      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Boundary
//!
//! No handler or refinement failure escapes `dispatch`. An `Err` from
//! a handler becomes a synthetic `error` action on the bus, and the
//! state captured when the action was matched is emitted as a safe
//! fallback so the canonical timeline never stalls. A failing
//! refinement step reports an `error` action and passes its input
//! through unchanged.
//!
//! # Ordering Model
//!
//! - Synchronous handlers run to completion inside `dispatch`, in
//!   registration order; a handler dispatching further actions
//!   re-enters the loop immediately and observes committed state.
//! - Asynchronous handler results merge onto the canonical timeline in
//!   completion order, which may differ from dispatch order.
//! - The canonical state timeline is a single totally-ordered
//!   sequence; refinement and commit are guarded so no two emissions
//!   are refined concurrently.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`Runtime`] | assembly entry point and observable handles |
//! | [`AppDefinition`] | the declarative application description |
//! | [`Dispatcher`] / [`Dispatchable`] | action injection |
//! | [`StateView`] | live current-state accessor for handlers |
//! | [`ActionJournal`] | bounded record of recently dispatched actions |
//! | [`RuntimeConfig`] | channel and journal capacities |
//! | [`RuntimeError`] | assembly/teardown errors (`RUNTIME_*` codes) |

mod bus;
mod config;
mod definition;
mod error;
mod journal;
mod pipeline;
mod refine;
mod runtime;
mod state;

pub use bus::{Dispatchable, Dispatcher};
pub use config::RuntimeConfig;
pub use definition::{ActionStream, AppDefinition, HandlerResult};
pub use error::RuntimeError;
pub use journal::{ActionJournal, JournalEntry};
pub use runtime::Runtime;
pub use state::StateView;

// Re-export the SDK layer for one-stop consumption.
pub use reflow_action::{Action, ErrorCode, Fault, Selector, ERROR_KIND};
