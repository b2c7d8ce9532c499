//! Unified error interface for Reflow crates.
//!
//! Library-level error types across the workspace implement
//! [`ErrorCode`] so callers get machine-readable codes and
//! recoverability information without matching on concrete enums.
//!
//! Note the distinction from handler faults: a handler returning `Err`
//! is application data - it becomes an `error` action on the timeline.
//! [`ErrorCode`] is for the library's own errors (assembly failures,
//! teardown), which are returned to the caller in the ordinary way.
//!
//! # Code Format
//!
//! - UPPER_SNAKE_CASE
//! - prefixed with the owning layer (e.g. `RUNTIME_`)
//! - stable once published
//!
//! # Example
//!
//! ```
//! use reflow_action::ErrorCode;
//!
//! #[derive(Debug)]
//! enum StoreError {
//!     Busy,
//!     Corrupt,
//! }
//!
//! impl ErrorCode for StoreError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Busy => "STORE_BUSY",
//!             Self::Corrupt => "STORE_CORRUPT",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! assert_eq!(StoreError::Busy.code(), "STORE_BUSY");
//! assert!(StoreError::Busy.is_recoverable());
//! ```

/// Machine-readable code and recoverability for library errors.
pub trait ErrorCode {
    /// Returns a stable, UPPER_SNAKE_CASE, layer-prefixed code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the failed operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows workspace conventions.
///
/// # Panics
///
/// Panics when the code is empty, lacks the expected prefix, or is not
/// UPPER_SNAKE_CASE.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts conventions for every variant of an error enum at once.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && !s.contains("__")
}
