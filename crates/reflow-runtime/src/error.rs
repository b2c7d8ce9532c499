//! Runtime layer errors.
//!
//! These are the library's own errors - returned from assembly or the
//! fallible dispatch variant. Handler and refinement failures are NOT
//! represented here; those are translated into `error` actions on the
//! timeline and never surface as `Result::Err`.
//!
//! # Error Code Convention
//!
//! All runtime errors use the `RUNTIME_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`RuntimeError::TokioRequired`] | `RUNTIME_TOKIO_REQUIRED` | No |
//! | [`RuntimeError::Terminated`] | `RUNTIME_TERMINATED` | No |

use reflow_action::ErrorCode;
use thiserror::Error;

/// Runtime layer error.
///
/// # Example
///
/// ```
/// use reflow_runtime::{ErrorCode, RuntimeError};
///
/// let err = RuntimeError::TokioRequired;
/// assert_eq!(err.code(), "RUNTIME_TOKIO_REQUIRED");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Assembly requires a tokio runtime context.
    ///
    /// Raised by [`Runtime::init`](crate::Runtime::init) when async
    /// handlers or action sources are registered outside a tokio
    /// runtime. A purely synchronous application (sync handlers and
    /// refinements only) assembles anywhere.
    ///
    /// **Not recoverable by retry** - enter a runtime context.
    #[error("async handlers and action sources require a tokio runtime context")]
    TokioRequired,

    /// The runtime has been discarded.
    ///
    /// Raised by [`Dispatcher::try_dispatch`](crate::Dispatcher::try_dispatch)
    /// when the owning [`Runtime`](crate::Runtime) no longer exists.
    /// The infallible `dispatch` drops the action silently instead.
    ///
    /// **Not recoverable** - the loop is gone.
    #[error("runtime has been discarded; action not delivered")]
    Terminated,
}

impl ErrorCode for RuntimeError {
    fn code(&self) -> &'static str {
        match self {
            Self::TokioRequired => "RUNTIME_TOKIO_REQUIRED",
            Self::Terminated => "RUNTIME_TERMINATED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::TokioRequired => false,
            Self::Terminated => false,
        }
    }
}
