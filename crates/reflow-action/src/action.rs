//! The Action record and the Fault carried by synthetic error actions.
//!
//! Every event flowing through the runtime is an [`Action`]: a `kind`
//! discriminant plus a JSON payload. The one reserved shape is the
//! synthetic error action ([`ERROR_KIND`]), produced only by the
//! runtime's failure boundary when a handler or refinement step fails.
//!
//! # Immutability
//!
//! Actions are immutable once dispatched. All accessors borrow; there
//! are no setters. Cloning is cheap - the fault, when present, is
//! reference-counted.
//!
//! # Serialization
//!
//! `kind` and `payload` round-trip through serde. The fault does not:
//! it carries a live [`anyhow::Error`] and is meaningful only inside
//! the process that produced it, so it is skipped on serialization and
//! absent after deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Kind string reserved for synthetic error actions.
///
/// Only the runtime's failure boundary produces actions of this kind.
/// Application handlers subscribe to it like any other kind to observe
/// failures.
pub const ERROR_KIND: &str = "error";

/// A discriminated, immutable event record driving state transitions.
///
/// # Fields
///
/// | Field | Purpose |
/// |-------|---------|
/// | `kind` | Discriminant matched by [`Selector::Kind`](crate::Selector::Kind) |
/// | `payload` | Handler-defined data (`serde_json::Value`) |
/// | `fault` | Failure report, present only on error actions |
///
/// # Example
///
/// ```
/// use reflow_action::Action;
/// use serde_json::json;
///
/// let action = Action::with_payload("deposit", json!({ "amount": 10 }));
/// assert_eq!(action.kind(), "deposit");
/// assert_eq!(action.payload()["amount"], 10);
/// assert!(action.fault().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    kind: String,
    #[serde(default)]
    payload: Value,
    #[serde(skip)]
    fault: Option<Arc<Fault>>,
}

impl Action {
    /// Creates an action with an empty (`null`) payload.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
            fault: None,
        }
    }

    /// Creates an action carrying a payload.
    #[must_use]
    pub fn with_payload(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            fault: None,
        }
    }

    /// Creates a synthetic error action.
    ///
    /// `while_handling` is the action whose handler failed, or `None`
    /// when the failure has no triggering action (a refinement step
    /// failing on a state emission).
    ///
    /// # Example
    ///
    /// ```
    /// use reflow_action::{Action, ERROR_KIND};
    ///
    /// let report = Action::error(Some(Action::new("save")), anyhow::anyhow!("boom"));
    /// assert_eq!(report.kind(), ERROR_KIND);
    /// ```
    #[must_use]
    pub fn error(while_handling: Option<Action>, error: anyhow::Error) -> Self {
        Self {
            kind: ERROR_KIND.to_string(),
            payload: Value::Null,
            fault: Some(Arc::new(Fault {
                while_handling,
                error,
            })),
        }
    }

    /// Returns the discriminant of this action.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the payload of this action.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the fault report, if this is an error action.
    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_deref()
    }

    /// Returns `true` if this is a synthetic error action.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == ERROR_KIND
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Failure report attached to a synthetic error action.
///
/// Carries the action whose handler failed (when there was one) and
/// the failure itself. The error is application-defined
/// ([`anyhow::Error`]), so listeners can downcast to concrete types
/// when they need more than the message.
#[derive(Debug)]
pub struct Fault {
    while_handling: Option<Action>,
    error: anyhow::Error,
}

impl Fault {
    /// Returns the action whose handler produced this fault.
    ///
    /// `None` for faults with no triggering action, such as a failing
    /// refinement step.
    #[must_use]
    pub fn while_handling(&self) -> Option<&Action> {
        self.while_handling.as_ref()
    }

    /// Returns the underlying error.
    #[must_use]
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Returns the rendered error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.while_handling {
            Some(action) => write!(f, "{} (while handling {})", self.error, action),
            None => write!(f, "{}", self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_creation() {
        let action = Action::new("foo");

        assert_eq!(action.kind(), "foo");
        assert_eq!(action.payload(), &Value::Null);
        assert!(action.fault().is_none());
        assert!(!action.is_error());
    }

    #[test]
    fn action_with_payload() {
        let action = Action::with_payload("set", json!({ "value": 7 }));

        assert_eq!(action.kind(), "set");
        assert_eq!(action.payload()["value"], 7);
    }

    #[test]
    fn error_action_carries_fault() {
        let failed = Action::with_payload("save", json!({ "path": "/tmp/x" }));
        let report = Action::error(Some(failed), anyhow::anyhow!("disk full"));

        assert!(report.is_error());
        assert_eq!(report.kind(), ERROR_KIND);

        let fault = report.fault().expect("fault present");
        assert_eq!(fault.message(), "disk full");
        assert_eq!(
            fault.while_handling().expect("triggering action").kind(),
            "save"
        );
    }

    #[test]
    fn error_action_without_trigger() {
        let report = Action::error(None, anyhow::anyhow!("refinement died"));

        let fault = report.fault().expect("fault present");
        assert!(fault.while_handling().is_none());
        assert_eq!(fault.message(), "refinement died");
    }

    #[test]
    fn fault_error_downcasts() {
        #[derive(Debug, thiserror::Error)]
        #[error("typed failure")]
        struct TypedFailure;

        let report = Action::error(None, anyhow::Error::new(TypedFailure));
        let fault = report.fault().expect("fault present");

        assert!(fault.error().downcast_ref::<TypedFailure>().is_some());
    }

    #[test]
    fn clone_shares_fault() {
        let report = Action::error(Some(Action::new("foo")), anyhow::anyhow!("x"));
        let copy = report.clone();

        assert!(copy.is_error());
        assert_eq!(copy.fault().expect("fault").message(), "x");
    }

    #[test]
    fn serialize_skips_fault() {
        let report = Action::error(Some(Action::new("foo")), anyhow::anyhow!("x"));
        let json = serde_json::to_string(&report).expect("serialize");

        assert!(json.contains("error"));
        assert!(!json.contains("fault"));
    }

    #[test]
    fn deserialize_defaults_payload() {
        let action: Action = serde_json::from_str(r#"{ "kind": "foo" }"#).expect("deserialize");

        assert_eq!(action.kind(), "foo");
        assert_eq!(action.payload(), &Value::Null);
        assert!(action.fault().is_none());
    }

    #[test]
    fn display_shows_kind() {
        assert_eq!(Action::new("foo").to_string(), "foo");

        let fault = Action::error(Some(Action::new("foo")), anyhow::anyhow!("boom"));
        let rendered = fault.fault().expect("fault").to_string();
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("foo"));
    }
}
