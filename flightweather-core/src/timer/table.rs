//! Timer table implementation
//!
//! Maps a handle to at most one pending timer and the typed action to run
//! when it fires. Every `schedule` cancels the previous timer for the same
//! handle first, so two timers can never race for one slot.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::traits::{TimerFacility, TimerId};

/// Scheduling would exceed the table capacity
///
/// Capacity is sized for the number of distinct handles in use; hitting it
/// is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TableFull;

/// A timer waiting to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingTimer<K, A> {
    /// Resource or slot this timer belongs to
    pub handle: K,
    /// Platform timer handle
    pub id: TimerId,
    /// Deadline
    pub fires_at: Instant,
    /// What to do when it fires
    pub action: A,
}

/// Handle-keyed table of single pending timers
#[derive(Debug, Clone)]
pub struct TimerTable<K, A, const N: usize> {
    entries: Vec<PendingTimer<K, A>, N>,
}

impl<K, A, const N: usize> Default for TimerTable<K, A, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, A, const N: usize> TimerTable<K, A, N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pending timers
    pub fn iter(&self) -> impl Iterator<Item = &PendingTimer<K, A>> {
        self.entries.iter()
    }
}

impl<K: Copy + Eq, A, const N: usize> TimerTable<K, A, N> {
    /// Schedule `action` for `handle` after `delay`
    ///
    /// Cancels any timer already pending for `handle` first.
    pub fn schedule(
        &mut self,
        timers: &mut impl TimerFacility,
        now: Instant,
        handle: K,
        delay: Duration,
        action: A,
    ) -> Result<TimerId, TableFull> {
        self.cancel(timers, handle);

        if self.entries.is_full() {
            return Err(TableFull);
        }

        let id = timers.register(delay);
        let entry = PendingTimer {
            handle,
            id,
            fires_at: now + delay,
            action,
        };
        if self.entries.push(entry).is_err() {
            // Unreachable after the capacity check; never leave a timer untracked
            timers.cancel(id);
            return Err(TableFull);
        }
        Ok(id)
    }

    /// Cancel the timer pending for `handle`
    ///
    /// Returns true if a timer was cancelled.
    pub fn cancel(&mut self, timers: &mut impl TimerFacility, handle: K) -> bool {
        match self.position(handle) {
            Some(index) => {
                let entry = self.entries.swap_remove(index);
                timers.cancel(entry.id);
                true
            }
            None => false,
        }
    }

    /// The timer for `handle` fired: clear the slot and hand back its action
    pub fn fire(&mut self, handle: K) -> Option<A> {
        let index = self.position(handle)?;
        Some(self.entries.swap_remove(index).action)
    }

    /// Platform timer `id` fired: clear its slot and hand back handle and action
    ///
    /// Returns None if `id` does not belong to this table (or was cancelled).
    pub fn fire_id(&mut self, id: TimerId) -> Option<(K, A)> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.swap_remove(index);
        Some((entry.handle, entry.action))
    }

    /// Check if a timer is pending for `handle`
    pub fn is_pending(&self, handle: K) -> bool {
        self.position(handle).is_some()
    }

    /// Pending timer for `handle`
    pub fn get(&self, handle: K) -> Option<&PendingTimer<K, A>> {
        self.entries.iter().find(|e| e.handle == handle)
    }

    fn position(&self, handle: K) -> Option<usize> {
        self.entries.iter().position(|e| e.handle == handle)
    }
}
