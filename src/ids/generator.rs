//! Identifier generators.

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::IdStyle;

/// Source of fresh identifiers in one of the two supported styles.
///
/// A single generator is shared (behind an `Arc`) by everything issuing
/// identifiers during a run so that incrementing identifiers never repeat.
#[derive(Debug)]
pub enum IdGenerator {
    /// Random v4 UUIDs; stateless.
    Uuid,
    /// Decimal integers from a seedable counter.
    Incrementing(IncrementingIdGenerator),
}

impl IdGenerator {
    #[must_use]
    pub fn uuid() -> Self { Self::Uuid }

    #[must_use]
    pub fn incrementing() -> Self { Self::Incrementing(IncrementingIdGenerator::default()) }

    /// Build the generator matching `style`.
    #[must_use]
    pub fn for_style(style: IdStyle) -> Self {
        match style {
            IdStyle::Uuid => Self::uuid(),
            IdStyle::Incrementing => Self::incrementing(),
        }
    }

    /// Issue the next identifier.
    #[must_use]
    pub fn new_id(&self) -> String {
        match self {
            Self::Uuid => Uuid::new_v4().to_string(),
            Self::Incrementing(counter) => counter.new_id(),
        }
    }

    /// Style of the identifiers this generator issues.
    #[must_use]
    pub fn style(&self) -> IdStyle {
        match self {
            Self::Uuid => IdStyle::Uuid,
            Self::Incrementing(_) => IdStyle::Incrementing,
        }
    }
}

#[derive(Debug, Default)]
struct CounterState {
    next: u64,
    used: bool,
    seeded: bool,
}

/// Counter-backed generator issuing `0`, `1`, `2`, …
///
/// The counter and its "used" flag sit behind one mutex so that
/// [`IncrementingIdGenerator::seed_if_unused`] observes and updates both
/// atomically with respect to concurrent [`IncrementingIdGenerator::new_id`]
/// calls.
#[derive(Debug, Default)]
pub struct IncrementingIdGenerator {
    state: Mutex<CounterState>,
}

impl IncrementingIdGenerator {
    fn lock(&self) -> MutexGuard<'_, CounterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the current counter value and advance it.
    #[must_use]
    pub fn new_id(&self) -> String {
        let mut state = self.lock();
        let id = state.next;
        state.next += 1;
        state.used = true;
        id.to_string()
    }

    /// Whether any identifier has been issued.
    #[must_use]
    pub fn has_been_used(&self) -> bool { self.lock().used }

    /// Resume issuing after `last_used`. Never moves the counter backwards.
    ///
    /// Only meaningful before first use; callers must check
    /// [`Self::has_been_used`] themselves or use [`Self::seed_if_unused`].
    pub fn set_seed(&self, last_used: u64) {
        let mut state = self.lock();
        state.next = state.next.max(last_used.saturating_add(1));
    }

    /// Seed the counter to resume after `last_used` unless an identifier has
    /// already been issued or an earlier document already seeded it.
    /// Returns `true` when the seed was applied.
    ///
    /// A counter takes one seed: the identifiers of a second kept document
    /// could overlap those of the first.
    pub fn seed_if_unused(&self, last_used: u64) -> bool {
        let mut state = self.lock();
        if state.used || state.seeded {
            return false;
        }
        state.next = state.next.max(last_used.saturating_add(1));
        state.seeded = true;
        true
    }

    /// Value the next call to [`Self::new_id`] will return.
    #[must_use]
    pub fn peek_next(&self) -> u64 { self.lock().next }
}
