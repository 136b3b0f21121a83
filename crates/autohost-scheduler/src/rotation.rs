//! Round-robin rotation over the current selection snapshot.
//!
//! The scheduler is a countdown state machine with two mutation entry
//! points: `on_selection_changed` and `tick`. It performs no I/O; callers
//! receive a `HostingChange` whenever a different peer becomes hosted and
//! decide what side effects to run.

use autohost_config::RotationConfig;
use autohost_core::Peer;
use serde::Serialize;
use tracing::debug;

/// Interval and countdown quantum, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationTiming {
    pub interval_ms: u64,
    pub tick_ms: u64,
}

impl Default for RotationTiming {
    fn default() -> Self {
        Self::from(&RotationConfig::default())
    }
}

impl From<&RotationConfig> for RotationTiming {
    fn from(config: &RotationConfig) -> Self {
        Self {
            interval_ms: config.interval_ms,
            tick_ms: config.tick_ms,
        }
    }
}

/// Position in the rotation and time left on the current peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationState {
    pub pointer: usize,
    pub remaining_ms: u64,
}

impl RotationState {
    pub fn initial(interval_ms: u64) -> Self {
        Self {
            pointer: 0,
            remaining_ms: interval_ms,
        }
    }

    /// Fraction of the current interval already elapsed, in `[0, 1]`.
    pub fn progress_fraction(&self, interval_ms: u64) -> f64 {
        if interval_ms == 0 {
            return 0.0;
        }
        let remaining = self.remaining_ms.min(interval_ms) as f64;
        1.0 - remaining / interval_ms as f64
    }
}

/// Why the hosted peer changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    /// The selection changed; rotation restarted at the first peer.
    SelectionChanged,
    /// The interval ran out; the pointer advanced.
    IntervalElapsed,
}

/// A different peer is now hosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostingChange {
    pub pointer: usize,
    pub peer: Peer,
    pub cause: ChangeCause,
}

#[derive(Debug, Clone)]
pub struct RotationScheduler {
    timing: RotationTiming,
    snapshot: Vec<Peer>,
    state: RotationState,
}

impl RotationScheduler {
    pub fn new(timing: RotationTiming) -> Self {
        Self {
            timing,
            snapshot: Vec::new(),
            state: RotationState::initial(timing.interval_ms),
        }
    }

    /// Replace the snapshot and restart the rotation from its first peer.
    ///
    /// Returns the newly hosted peer, or `None` when the snapshot is empty.
    pub fn on_selection_changed(&mut self, snapshot: Vec<Peer>) -> Option<HostingChange> {
        self.snapshot = snapshot;
        self.state = RotationState::initial(self.timing.interval_ms);
        debug!(
            peers = self.snapshot.len(),
            "Rotation reset after selection change"
        );
        self.current_change(ChangeCause::SelectionChanged)
    }

    /// Advance the countdown by one quantum.
    ///
    /// No-op while the snapshot is empty. When the countdown runs out the
    /// pointer wraps to the next peer and the countdown restarts.
    pub fn tick(&mut self) -> Option<HostingChange> {
        if self.snapshot.is_empty() {
            return None;
        }
        if self.state.remaining_ms <= self.timing.tick_ms {
            self.state.pointer = (self.state.pointer + 1) % self.snapshot.len();
            self.state.remaining_ms = self.timing.interval_ms;
            debug!(pointer = self.state.pointer, "Rotation advanced");
            return self.current_change(ChangeCause::IntervalElapsed);
        }
        self.state.remaining_ms -= self.timing.tick_ms;
        None
    }

    /// Return to the empty state.
    pub fn clear(&mut self) {
        self.on_selection_changed(Vec::new());
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn snapshot(&self) -> &[Peer] {
        &self.snapshot
    }

    pub fn is_active(&self) -> bool {
        !self.snapshot.is_empty()
    }

    /// The currently hosted peer.
    pub fn current(&self) -> Option<&Peer> {
        self.snapshot.get(self.state.pointer)
    }

    pub fn progress_fraction(&self) -> f64 {
        self.state.progress_fraction(self.timing.interval_ms)
    }

    fn current_change(&self, cause: ChangeCause) -> Option<HostingChange> {
        self.current().map(|peer| HostingChange {
            pointer: self.state.pointer,
            peer: peer.clone(),
            cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INTERVAL: u64 = 60_000;
    const TICK: u64 = 1000;

    fn timing() -> RotationTiming {
        RotationTiming {
            interval_ms: INTERVAL,
            tick_ms: TICK,
        }
    }

    fn peers(n: u32) -> Vec<Peer> {
        (1..=n)
            .map(|i| Peer::new(i, &format!("Peer{i}"), "avatar"))
            .collect()
    }

    fn ticks(scheduler: &mut RotationScheduler, n: usize) -> Vec<HostingChange> {
        (0..n).filter_map(|_| scheduler.tick()).collect()
    }

    #[test]
    fn test_new_scheduler_is_empty() {
        let scheduler = RotationScheduler::new(timing());
        assert!(!scheduler.is_active());
        assert!(scheduler.current().is_none());
        assert_eq!(scheduler.state(), RotationState::initial(INTERVAL));
    }

    #[test]
    fn test_empty_ticks_do_not_change_state() {
        let mut scheduler = RotationScheduler::new(timing());
        assert!(ticks(&mut scheduler, 500).is_empty());
        assert_eq!(
            scheduler.state(),
            RotationState {
                pointer: 0,
                remaining_ms: INTERVAL
            }
        );
    }

    #[test]
    fn test_selection_change_hosts_first_peer_immediately() {
        let mut scheduler = RotationScheduler::new(timing());
        let change = scheduler.on_selection_changed(peers(2)).unwrap();
        assert_eq!(change.pointer, 0);
        assert_eq!(change.peer.display_name, "Peer1");
        assert_eq!(change.cause, ChangeCause::SelectionChanged);
    }

    #[test]
    fn test_empty_selection_change_returns_none() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(2));
        assert!(scheduler.on_selection_changed(Vec::new()).is_none());
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.state(), RotationState::initial(INTERVAL));
    }

    #[test]
    fn test_tick_decrements_by_quantum() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(2));
        assert!(scheduler.tick().is_none());
        assert_eq!(scheduler.state().remaining_ms, INTERVAL - TICK);
    }

    #[test]
    fn test_advance_after_full_interval() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(2));
        let changes = ticks(&mut scheduler, 59);
        assert!(changes.is_empty());
        assert_eq!(scheduler.state().remaining_ms, TICK);

        let change = scheduler.tick().unwrap();
        assert_eq!(change.pointer, 1);
        assert_eq!(change.cause, ChangeCause::IntervalElapsed);
        assert_eq!(
            scheduler.state(),
            RotationState {
                pointer: 1,
                remaining_ms: INTERVAL
            }
        );
    }

    #[test]
    fn test_single_peer_rehosts_itself_each_interval() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(1));
        let changes = ticks(&mut scheduler, 120);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.pointer == 0));
    }

    #[test]
    fn test_selection_change_mid_cycle_resets() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(3));
        ticks(&mut scheduler, 60 + 17);
        assert_eq!(scheduler.state().pointer, 1);

        scheduler.on_selection_changed(peers(2));
        assert_eq!(scheduler.state(), RotationState::initial(INTERVAL));
    }

    #[test]
    fn test_interval_not_multiple_of_tick() {
        let mut scheduler = RotationScheduler::new(RotationTiming {
            interval_ms: 2500,
            tick_ms: 1000,
        });
        scheduler.on_selection_changed(peers(2));
        assert!(scheduler.tick().is_none()); // 1500
        assert!(scheduler.tick().is_none()); // 500
        assert!(scheduler.tick().is_some());
        assert_eq!(scheduler.state().remaining_ms, 2500);
    }

    #[test]
    fn test_progress_fraction() {
        let state = RotationState {
            pointer: 0,
            remaining_ms: 45_000,
        };
        assert!((state.progress_fraction(60_000) - 0.25).abs() < 1e-9);
        assert!(RotationState::initial(60_000).progress_fraction(60_000).abs() < 1e-9);
        assert_eq!(state.progress_fraction(0), 0.0);
    }

    #[test]
    fn test_progress_resets_on_advance() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(2));
        ticks(&mut scheduler, 30);
        assert!((scheduler.progress_fraction() - 0.5).abs() < 1e-9);
        ticks(&mut scheduler, 30);
        assert!(scheduler.progress_fraction().abs() < 1e-9);
    }

    #[test]
    fn test_clear_returns_to_empty() {
        let mut scheduler = RotationScheduler::new(timing());
        scheduler.on_selection_changed(peers(3));
        ticks(&mut scheduler, 61);
        scheduler.clear();
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.state(), RotationState::initial(INTERVAL));
    }

    proptest! {
        #[test]
        fn prop_wraparound_after_n_intervals(n in 1u32..6, offset in 0usize..5) {
            let mut scheduler = RotationScheduler::new(timing());
            scheduler.on_selection_changed(peers(n));
            // Start from an arbitrary pointer.
            ticks(&mut scheduler, 60 * (offset % n as usize));
            let start = scheduler.state();

            let per_interval = (INTERVAL / TICK) as usize;
            let changes = ticks(&mut scheduler, per_interval * n as usize);
            prop_assert_eq!(changes.len(), n as usize);
            prop_assert_eq!(scheduler.state(), start);
        }

        #[test]
        fn prop_pointer_stays_in_bounds(n in 1u32..6, steps in 0usize..1000) {
            let mut scheduler = RotationScheduler::new(timing());
            scheduler.on_selection_changed(peers(n));
            ticks(&mut scheduler, steps);
            prop_assert!(scheduler.state().pointer < n as usize);
            prop_assert!(scheduler.state().remaining_ms <= INTERVAL);
        }
    }
}
