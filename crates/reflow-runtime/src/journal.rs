//! Bounded record of recently dispatched actions.
//!
//! The action timeline is a live broadcast: subscribers only see
//! actions dispatched after they subscribed. The journal complements
//! it with a rolling buffer for retrospective queries - debugging,
//! tests asserting that an `error` action appeared, inspection tooling
//! - without requiring a subscription to have been in place.
//!
//! Every dispatched action is appended, synthetic `error` actions
//! included. When full, the oldest entry is evicted on each append.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reflow_action::Action;
use serde::Serialize;
use std::collections::VecDeque;

/// A recorded dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    /// When the action entered the bus.
    pub recorded_at: DateTime<Utc>,
    /// The dispatched action.
    pub action: Action,
}

/// Rolling buffer of recently dispatched actions.
///
/// # Example
///
/// ```
/// use reflow_runtime::ActionJournal;
/// use reflow_action::Action;
///
/// let journal = ActionJournal::with_capacity(2);
/// journal.record(&Action::new("a"));
/// journal.record(&Action::new("b"));
/// journal.record(&Action::new("c"));
///
/// let kinds: Vec<String> = journal
///     .recent(10)
///     .into_iter()
///     .map(|entry| entry.action.kind().to_string())
///     .collect();
/// assert_eq!(kinds, ["b", "c"]);
/// ```
pub struct ActionJournal {
    entries: RwLock<VecDeque<JournalEntry>>,
    capacity: usize,
}

impl ActionJournal {
    /// Creates a journal retaining at most `capacity` entries.
    ///
    /// A capacity of 0 is treated as 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends an action, evicting the oldest entry if at capacity.
    pub fn record(&self, action: &Action) {
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(JournalEntry {
            recorded_at: Utc::now(),
            action: action.clone(),
        });
    }

    /// Returns the most recent `n` entries, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<JournalEntry> {
        let entries = self.entries.read();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Returns the number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(journal: &ActionJournal, n: usize) -> Vec<String> {
        journal
            .recent(n)
            .into_iter()
            .map(|entry| entry.action.kind().to_string())
            .collect()
    }

    #[test]
    fn records_in_order() {
        let journal = ActionJournal::with_capacity(10);
        journal.record(&Action::new("a"));
        journal.record(&Action::new("b"));

        assert_eq!(journal.len(), 2);
        assert_eq!(kinds(&journal, 10), ["a", "b"]);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let journal = ActionJournal::with_capacity(2);
        journal.record(&Action::new("a"));
        journal.record(&Action::new("b"));
        journal.record(&Action::new("c"));

        assert_eq!(journal.len(), 2);
        assert_eq!(kinds(&journal, 10), ["b", "c"]);
    }

    #[test]
    fn recent_limits_and_keeps_newest() {
        let journal = ActionJournal::with_capacity(10);
        for kind in ["a", "b", "c", "d"] {
            journal.record(&Action::new(kind));
        }

        assert_eq!(kinds(&journal, 2), ["c", "d"]);
        assert_eq!(kinds(&journal, 0), Vec::<String>::new());
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let journal = ActionJournal::with_capacity(0);
        journal.record(&Action::new("a"));
        journal.record(&Action::new("b"));

        assert_eq!(journal.capacity(), 1);
        assert_eq!(kinds(&journal, 10), ["b"]);
    }

    #[test]
    fn empty_journal() {
        let journal = ActionJournal::with_capacity(4);

        assert!(journal.is_empty());
        assert!(journal.recent(10).is_empty());
    }
}
