use crate::game_logic::{BOOST_DURATION_MS, BOOST_MULTIPLIER, TimerHandle, TimerScheduler};
use bevy::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoostState {
    #[default]
    Inactive,
    Active,
}

/// What a boost call actually did, for the UI side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoostTransition {
    Activated { multiplier: f32 },
    Extended,
    Expired,
    Cancelled,
    Ignored,
}

/// Per-car speed boost.
///
/// Picking up a second boost while one is running restarts the clock; it
/// never stacks the multiplier. The machine owns at most one timer handle,
/// and every path that drops the handle cancels it in the scheduler first.
#[derive(Component, Clone, Debug)]
pub struct SpeedBoost {
    state: BoostState,
    multiplier: f32,
    timer: Option<TimerHandle>,
    duration_ms: u64,
}

impl Default for SpeedBoost {
    fn default() -> Self {
        Self::new(BOOST_DURATION_MS)
    }
}

impl SpeedBoost {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            state: BoostState::Inactive,
            multiplier: 1.0,
            timer: None,
            duration_ms,
        }
    }

    pub fn state(&self) -> BoostState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BoostState::Active
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Takes effect the next time a timer is scheduled; a running one keeps
    /// its due time.
    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn activate<K>(&mut self, owner: K, now_ms: u64, timers: &mut TimerScheduler<K>) -> BoostTransition
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        self.activate_with(BOOST_MULTIPLIER, owner, now_ms, timers)
    }

    /// Activate with an explicit multiplier. While already active this only
    /// extends; the running multiplier is kept.
    pub fn activate_with<K>(
        &mut self,
        multiplier: f32,
        owner: K,
        now_ms: u64,
        timers: &mut TimerScheduler<K>,
    ) -> BoostTransition
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        if self.is_active() {
            return self.extend(owner, now_ms, timers);
        }

        self.state = BoostState::Active;
        self.multiplier = multiplier;
        self.cancel_timer(timers);
        self.timer = Some(timers.schedule(owner, now_ms, self.duration_ms));
        debug!("boost activated x{:.2} for {} ms", multiplier, self.duration_ms);

        BoostTransition::Activated { multiplier }
    }

    /// Restart the expiry clock. No-op while inactive.
    pub fn extend<K>(&mut self, owner: K, now_ms: u64, timers: &mut TimerScheduler<K>) -> BoostTransition
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        if !self.is_active() {
            return BoostTransition::Ignored;
        }

        self.cancel_timer(timers);
        self.timer = Some(timers.schedule(owner, now_ms, self.duration_ms));
        debug!("boost extended by {} ms", self.duration_ms);

        BoostTransition::Extended
    }

    /// Route a fired timer to this boost. Stale handles are ignored.
    pub fn on_timer_fired<K>(&mut self, handle: TimerHandle, timers: &mut TimerScheduler<K>) -> BoostTransition
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        if self.timer != Some(handle) {
            return BoostTransition::Ignored;
        }
        self.expire(timers)
    }

    fn expire<K>(&mut self, timers: &mut TimerScheduler<K>) -> BoostTransition
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        let was_active = self.is_active();
        self.state = BoostState::Inactive;
        self.multiplier = 1.0;
        self.cancel_timer(timers);

        if was_active {
            debug!("boost expired");
            BoostTransition::Expired
        } else {
            BoostTransition::Ignored
        }
    }

    /// Manual deactivation, also used on teardown.
    pub fn cancel<K>(&mut self, timers: &mut TimerScheduler<K>) -> BoostTransition
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        if !self.is_active() {
            self.cancel_timer(timers);
            return BoostTransition::Ignored;
        }

        self.state = BoostState::Inactive;
        self.multiplier = 1.0;
        self.cancel_timer(timers);
        debug!("boost cancelled");

        BoostTransition::Cancelled
    }

    fn cancel_timer<K>(&mut self, timers: &mut TimerScheduler<K>)
    where
        K: Clone + PartialEq + Send + Sync + 'static,
    {
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAR: u32 = 1;

    fn fire(boost: &mut SpeedBoost, timers: &mut TimerScheduler<u32>, now_ms: u64) -> Vec<BoostTransition> {
        timers
            .fire_due(now_ms)
            .into_iter()
            .map(|(handle, _)| boost.on_timer_fired(handle, &mut *timers))
            .collect()
    }

    #[test]
    fn test_activate_schedules_one_timer() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();

        let transition = boost.activate(CAR, 0, &mut timers);

        assert_eq!(transition, BoostTransition::Activated { multiplier: 2.0 });
        assert_eq!(boost.state(), BoostState::Active);
        assert_eq!(boost.multiplier(), 2.0);
        assert_eq!(timers.pending_for(&CAR), 1);
        assert_eq!(timers.scheduled_total(), 1);
        assert_eq!(timers.cancelled_total(), 0);
    }

    #[test]
    fn test_second_activate_extends_instead_of_stacking() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();

        boost.activate(CAR, 0, &mut timers);
        let first = boost.timer().unwrap();
        let transition = boost.activate(CAR, 1000, &mut timers);

        assert_eq!(transition, BoostTransition::Extended);
        assert_eq!(boost.multiplier(), 2.0);
        assert_eq!(timers.pending_for(&CAR), 1);
        assert_eq!(timers.scheduled_total(), 2);
        assert_eq!(timers.cancelled_total(), 1);
        assert!(!timers.is_pending(first));
        assert_eq!(timers.due_at(boost.timer().unwrap()), Some(4000));
    }

    #[test]
    fn test_pickup_multiplier_is_kept_on_extend() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();

        boost.activate_with(1.41, CAR, 0, &mut timers);
        boost.activate(CAR, 500, &mut timers);

        assert_eq!(boost.multiplier(), 1.41);
    }

    #[test]
    fn test_expires_after_duration() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();
        boost.activate(CAR, 0, &mut timers);

        assert!(fire(&mut boost, &mut timers, 2999).is_empty());
        assert!(boost.is_active());

        assert_eq!(fire(&mut boost, &mut timers, 3000), vec![BoostTransition::Expired]);
        assert_eq!(boost.state(), BoostState::Inactive);
        assert_eq!(boost.multiplier(), 1.0);
        assert!(boost.timer().is_none());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_extend_pushes_expiry_back() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();
        boost.activate(CAR, 0, &mut timers);
        boost.extend(CAR, 2000, &mut timers);

        assert!(fire(&mut boost, &mut timers, 3500).is_empty());
        assert!(boost.is_active());
        assert_eq!(fire(&mut boost, &mut timers, 5000), vec![BoostTransition::Expired]);
    }

    #[test]
    fn test_extend_and_cancel_when_inactive_are_noops() {
        let mut timers: TimerScheduler<u32> = TimerScheduler::new();
        let mut boost = SpeedBoost::default();

        assert_eq!(boost.extend(CAR, 0, &mut timers), BoostTransition::Ignored);
        assert_eq!(boost.cancel(&mut timers), BoostTransition::Ignored);
        assert_eq!(timers.scheduled_total(), 0);
        assert_eq!(boost.multiplier(), 1.0);
    }

    #[test]
    fn test_manual_cancel_drops_pending_timer() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();
        boost.activate(CAR, 0, &mut timers);

        assert_eq!(boost.cancel(&mut timers), BoostTransition::Cancelled);
        assert_eq!(timers.pending_count(), 0);
        assert!(fire(&mut boost, &mut timers, 10_000).is_empty());
        assert_eq!(boost.multiplier(), 1.0);
    }

    #[test]
    fn test_new_duration_applies_on_next_extend() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();
        boost.activate(CAR, 0, &mut timers);

        boost.set_duration_ms(500);
        assert_eq!(timers.due_at(boost.timer().unwrap()), Some(3000));

        boost.extend(CAR, 1000, &mut timers);
        assert_eq!(timers.due_at(boost.timer().unwrap()), Some(1500));
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut timers = TimerScheduler::new();
        let mut boost = SpeedBoost::default();
        boost.activate(CAR, 0, &mut timers);
        let stale = boost.timer().unwrap();
        boost.extend(CAR, 100, &mut timers);

        assert_eq!(boost.on_timer_fired(stale, &mut timers), BoostTransition::Ignored);
        assert!(boost.is_active());
    }
}
