//! Selectors - the boolean tests deciding which actions a handler sees.
//!
//! A handler registration declares a [`Selector`]; the runtime filters
//! the action timeline through it before invoking the handler.
//!
//! # Forms
//!
//! | Form | Test |
//! |------|------|
//! | [`Selector::Kind`] | exact equality against [`Action::kind`] |
//! | [`Selector::Where`] | arbitrary predicate, used verbatim |
//! | [`Selector::Inert`] | never matches |
//!
//! `Inert` exists as a deliberate safe default: a registration that
//! cannot sensibly match is permanently silent rather than a
//! construction-time failure.

use crate::Action;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding which actions a handler responds to.
///
/// # Example
///
/// ```
/// use reflow_action::{Action, Selector};
///
/// let exact = Selector::from("deposit");
/// assert!(exact.matches(&Action::new("deposit")));
/// assert!(!exact.matches(&Action::new("withdraw")));
///
/// let rule = Selector::matching(|a: &Action| a.payload()["amount"].as_i64() > Some(100));
/// assert!(rule.matches(&Action::with_payload(
///     "deposit",
///     serde_json::json!({ "amount": 500 }),
/// )));
/// ```
#[derive(Clone)]
pub enum Selector {
    /// Matches actions whose kind equals the string exactly.
    Kind(String),
    /// Matches actions for which the predicate returns `true`.
    Where(Arc<dyn Fn(&Action) -> bool + Send + Sync>),
    /// Never matches; the registration is permanently silent.
    Inert,
}

impl Selector {
    /// Creates an exact-kind selector.
    #[must_use]
    pub fn kind(kind: impl Into<String>) -> Self {
        Self::Kind(kind.into())
    }

    /// Creates a predicate selector.
    #[must_use]
    pub fn matching(predicate: impl Fn(&Action) -> bool + Send + Sync + 'static) -> Self {
        Self::Where(Arc::new(predicate))
    }

    /// Tests an action against this selector.
    #[must_use]
    pub fn matches(&self, action: &Action) -> bool {
        match self {
            Self::Kind(kind) => action.kind() == kind,
            Self::Where(predicate) => predicate(action),
            Self::Inert => false,
        }
    }
}

impl From<&str> for Selector {
    fn from(kind: &str) -> Self {
        Self::Kind(kind.to_string())
    }
}

impl From<String> for Selector {
    fn from(kind: String) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            Self::Where(_) => f.write_str("Where(<predicate>)"),
            Self::Inert => f.write_str("Inert"),
        }
    }
}
