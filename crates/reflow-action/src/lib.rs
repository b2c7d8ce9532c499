//! Action types for the Reflow state runtime.
//!
//! This crate provides the event vocabulary shared by every layer of
//! Reflow: the [`Action`] record, the [`Selector`] that decides which
//! handlers respond to an action, and the [`Fault`] attached to
//! synthetic `error` actions.
//!
//! # Crate Architecture
//!
//! This crate is the **SDK layer** - the small, stable surface that
//! application handlers are written against:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SDK Layer                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  reflow-action  : Action, Selector, Fault, ErrorCode ◄ HERE │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Runtime Layer                            │
//! │  reflow-runtime : dispatch loop, refinement chain, timelines│
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  reflow-app     : AppBuilder registration facade            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Actions
//!
//! An [`Action`] is a discriminated, immutable event record: a `kind`
//! string plus a JSON payload. Handlers never mutate actions; state
//! transitions happen by returning a new state value from a handler.
//!
//! ```
//! use reflow_action::Action;
//! use serde_json::json;
//!
//! let plain = Action::new("increment");
//! let with_data = Action::with_payload("set", json!({ "value": 42 }));
//!
//! assert_eq!(plain.kind(), "increment");
//! assert_eq!(with_data.payload()["value"], 42);
//! ```
//!
//! # Selectors
//!
//! A [`Selector`] resolves to a boolean test against an action: an
//! exact kind match, an arbitrary predicate, or the inert selector
//! that never matches.
//!
//! ```
//! use reflow_action::{Action, Selector};
//!
//! let by_kind = Selector::from("increment");
//! let by_rule = Selector::matching(|a: &Action| a.kind().starts_with("incr"));
//!
//! let action = Action::new("increment");
//! assert!(by_kind.matches(&action));
//! assert!(by_rule.matches(&action));
//! assert!(!Selector::Inert.matches(&action));
//! ```
//!
//! # Error actions
//!
//! Handler failures never escape the runtime; they are converted into
//! `error` actions carrying a [`Fault`]:
//!
//! ```
//! use reflow_action::Action;
//!
//! let failed = Action::new("save");
//! let report = Action::error(Some(failed), anyhow::anyhow!("disk full"));
//!
//! assert!(report.is_error());
//! let fault = report.fault().expect("error action carries a fault");
//! assert_eq!(fault.message(), "disk full");
//! ```

mod action;
mod error;
mod selector;

pub use action::{Action, Fault, ERROR_KIND};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use selector::Selector;
