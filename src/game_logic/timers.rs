use bevy::prelude::*;

/// Handle to a pending one-shot timer. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct PendingTimer<K> {
    handle: TimerHandle,
    owner: K,
    due_ms: u64,
}

/// One-shot deferred callbacks for the single-threaded tick.
///
/// Nothing fires on its own: the owner of the scheduler calls `fire_due` once
/// per tick and routes each fired handle back to whoever scheduled it. A
/// cancelled timer is dropped from the queue immediately, so it can never
/// fire later against state that has moved on.
#[derive(Resource, Debug)]
pub struct TimerScheduler<K: Send + Sync + 'static> {
    pending: Vec<PendingTimer<K>>,
    next_handle: u64,
    scheduled_total: u64,
    cancelled_total: u64,
}

impl<K: Send + Sync + 'static> Default for TimerScheduler<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_handle: 0,
            scheduled_total: 0,
            cancelled_total: 0,
        }
    }
}

impl<K: Clone + PartialEq + Send + Sync + 'static> TimerScheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, owner: K, now_ms: u64, delay_ms: u64) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.scheduled_total += 1;

        self.pending.push(PendingTimer {
            handle,
            owner,
            due_ms: now_ms.saturating_add(delay_ms),
        });
        handle
    }

    /// Returns false if the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        let removed = self.pending.len() != before;
        if removed {
            self.cancelled_total += 1;
        }
        removed
    }

    /// Remove and return every timer due at or before `now_ms`, earliest first.
    pub fn fire_due(&mut self, now_ms: u64) -> Vec<(TimerHandle, K)> {
        let mut due: Vec<PendingTimer<K>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now_ms {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }

        due.sort_by_key(|timer| (timer.due_ms, timer.handle));
        due.into_iter().map(|timer| (timer.handle, timer.owner)).collect()
    }

    /// Drop every pending timer. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.cancelled_total += count as u64;
        self.pending.clear();
        count
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    #[cfg(test)]
    pub fn due_at(&self, handle: TimerHandle) -> Option<u64> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.due_ms)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: &K) -> usize {
        self.pending.iter().filter(|timer| &timer.owner == owner).count()
    }

    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total
    }

    pub fn cancelled_total(&self) -> u64 {
        self.cancelled_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_due_in_order() {
        let mut timers: TimerScheduler<u32> = TimerScheduler::new();
        let late = timers.schedule(1, 0, 300);
        let early = timers.schedule(2, 0, 100);
        timers.schedule(3, 0, 1000);

        let fired = timers.fire_due(500);
        assert_eq!(fired, vec![(early, 2), (late, 1)]);
        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn test_cancel_is_safe_twice() {
        let mut timers: TimerScheduler<u32> = TimerScheduler::new();
        let handle = timers.schedule(7, 0, 100);

        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert_eq!(timers.cancelled_total(), 1);
        assert!(timers.fire_due(10_000).is_empty());
    }

    #[test]
    fn test_cancel_all_clears_everything() {
        let mut timers: TimerScheduler<u32> = TimerScheduler::new();
        for owner in 0..4 {
            timers.schedule(owner, 0, 50);
        }

        assert_eq!(timers.cancel_all(), 4);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(timers.cancelled_total(), 4);
        assert!(timers.fire_due(u64::MAX).is_empty());
    }
}
