//! Runtime capacities.
//!
//! The runtime owns three bounded buffers: the action broadcast
//! channel, the canonical-state broadcast channel, and the action
//! journal. [`RuntimeConfig`] sizes them; [`Default`] suits most
//! applications.
//!
//! Broadcast subscribers that fall behind their channel's capacity
//! lose the oldest emissions (tokio broadcast semantics); size the
//! channels for the slowest expected subscriber.

/// Capacities for the runtime's bounded buffers.
///
/// # Example
///
/// ```
/// use reflow_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::new()
///     .with_action_capacity(128)
///     .with_journal_capacity(1024);
///
/// assert_eq!(config.action_capacity(), 128);
/// assert_eq!(config.state_capacity(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Action broadcast channel capacity.
    action_capacity: usize,
    /// Canonical-state broadcast channel capacity.
    state_capacity: usize,
    /// Maximum retained journal entries.
    journal_capacity: usize,
}

const DEFAULT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_JOURNAL_CAPACITY: usize = 256;

impl RuntimeConfig {
    /// Creates a configuration with default capacities.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            action_capacity: DEFAULT_CHANNEL_CAPACITY,
            state_capacity: DEFAULT_CHANNEL_CAPACITY,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }

    /// Sets the action broadcast capacity. Zero is treated as 1.
    #[must_use]
    pub const fn with_action_capacity(mut self, capacity: usize) -> Self {
        self.action_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Sets the canonical-state broadcast capacity. Zero is treated as 1.
    #[must_use]
    pub const fn with_state_capacity(mut self, capacity: usize) -> Self {
        self.state_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Sets the journal capacity. Zero is treated as 1.
    #[must_use]
    pub const fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Returns the action broadcast capacity.
    #[must_use]
    pub const fn action_capacity(&self) -> usize {
        self.action_capacity
    }

    /// Returns the canonical-state broadcast capacity.
    #[must_use]
    pub const fn state_capacity(&self) -> usize {
        self.state_capacity
    }

    /// Returns the journal capacity.
    #[must_use]
    pub const fn journal_capacity(&self) -> usize {
        self.journal_capacity
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
