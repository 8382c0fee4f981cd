//! The recurring countdown: persisted start + ordinal, days remaining, and the
//! reset that starts the next cycle.
//!
//! A tracker is in [`CyclePhase::Counting`] between ticks. When a tick finds
//! the completion rule satisfied it enters [`CyclePhase::Resetting`], writes
//! the next record, repaints, and returns to counting before the tick ends.

use crate::clock::Clock;
use crate::config::TOTAL_DAYS;
use crate::display::{render_cycle, RenderTarget, Slot};
use crate::effects::CelebrationPlan;
use crate::models::{CycleRecord, CycleResponse};
use crate::storage::{KeyValueStore, CYCLE_KEY, START_KEY};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use tracing::{debug, error, info, warn};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days between `start` and `now`, rounded towards negative infinity.
pub fn elapsed_days(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

pub fn compute_remaining(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    remaining_for(elapsed_days(start, now))
}

fn remaining_for(elapsed_days: i64) -> i64 {
    (TOTAL_DAYS - elapsed_days).max(0)
}

/// Both halves are checked even though the first implies the second today.
pub fn is_complete(days_remaining: i64, elapsed_days: i64) -> bool {
    days_remaining == 0 && elapsed_days >= TOTAL_DAYS
}

pub fn progress_percent(days_remaining: i64) -> f64 {
    (TOTAL_DAYS - days_remaining) as f64 / TOTAL_DAYS as f64 * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Counting,
    Resetting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStatus {
    pub record: CycleRecord,
    pub elapsed_days: i64,
    pub days_remaining: i64,
    pub progress_percent: f64,
}

impl CycleStatus {
    pub fn at(record: CycleRecord, now: DateTime<Utc>) -> Self {
        let elapsed_days = elapsed_days(record.started_at, now);
        let days_remaining = remaining_for(elapsed_days);
        Self {
            record,
            elapsed_days,
            days_remaining,
            progress_percent: progress_percent(days_remaining),
        }
    }

    pub fn is_complete(&self) -> bool {
        is_complete(self.days_remaining, self.elapsed_days)
    }
}

impl From<CycleStatus> for CycleResponse {
    fn from(status: CycleStatus) -> Self {
        Self {
            cycle_number: status.record.cycle_number,
            started_at: status.record.started_at,
            elapsed_days: status.elapsed_days,
            days_remaining: status.days_remaining,
            progress_percent: status.progress_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Counting(CycleStatus),
    Reset {
        completed: u32,
        status: CycleStatus,
        celebration: CelebrationPlan,
    },
}

impl TickOutcome {
    pub fn status(&self) -> &CycleStatus {
        match self {
            TickOutcome::Counting(status) => status,
            TickOutcome::Reset { status, .. } => status,
        }
    }
}

pub struct CycleTracker<S, C> {
    store: S,
    clock: C,
    phase: CyclePhase,
}

impl<S: KeyValueStore, C: Clock> CycleTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            phase: CyclePhase::Counting,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// First paint of a page session. Creates the record on first ever run.
    pub fn initialize<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> TickOutcome {
        let record = self.load();
        info!(
            cycle = record.cycle_number,
            started_at = %format_timestamp(record.started_at),
            "cycle tracker initialized"
        );
        self.evaluate(record, target)
    }

    /// Periodic re-read of the store followed by a repaint or a reset.
    pub fn tick<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> TickOutcome {
        let record = self.load();
        self.evaluate(record, target)
    }

    /// Current status without painting anything.
    pub fn status(&mut self) -> CycleStatus {
        let record = self.load();
        CycleStatus::at(record, self.clock.now())
    }

    /// Starts cycle `current_cycle + 1` at the current instant.
    pub fn reset<T: RenderTarget + ?Sized>(
        &mut self,
        current_cycle: u32,
        target: &mut T,
    ) -> TickOutcome {
        self.phase = CyclePhase::Resetting;

        let celebration = CelebrationPlan::default();
        target.set_text(Slot::Celebration, celebration.message);
        target.set_celebration_active(true);

        let record = self.start_cycle(current_cycle.saturating_add(1));
        info!(
            completed = current_cycle,
            cycle = record.cycle_number,
            "cycle complete, starting next"
        );

        let status = CycleStatus::at(record, self.clock.now());
        render_cycle(target, status.days_remaining, status.progress_percent, record.cycle_number);
        self.phase = CyclePhase::Counting;

        TickOutcome::Reset {
            completed: current_cycle,
            status,
            celebration,
        }
    }

    fn evaluate<T: RenderTarget + ?Sized>(
        &mut self,
        record: CycleRecord,
        target: &mut T,
    ) -> TickOutcome {
        let status = CycleStatus::at(record, self.clock.now());
        if status.is_complete() {
            return self.reset(record.cycle_number, target);
        }

        debug!(
            cycle = record.cycle_number,
            elapsed_days = status.elapsed_days,
            days_remaining = status.days_remaining,
            "cycle tick"
        );
        render_cycle(target, status.days_remaining, status.progress_percent, record.cycle_number);
        TickOutcome::Counting(status)
    }

    /// Reads the record, repairing it when absent or unusable.
    fn load(&mut self) -> CycleRecord {
        let Some(raw_start) = self.store.get(START_KEY) else {
            return self.start_cycle(1);
        };

        let cycle_number = self.read_cycle_number();
        let now = self.clock.now();
        match DateTime::parse_from_rfc3339(raw_start.trim()) {
            Ok(parsed) if parsed.with_timezone(&Utc) <= now => CycleRecord {
                started_at: parsed.with_timezone(&Utc),
                cycle_number,
            },
            Ok(_) => {
                warn!(value = %raw_start, "stored cycle start is in the future, restarting cycle");
                self.start_cycle(cycle_number)
            }
            Err(err) => {
                warn!(value = %raw_start, "stored cycle start is unreadable ({err}), restarting cycle");
                self.start_cycle(cycle_number)
            }
        }
    }

    fn read_cycle_number(&self) -> u32 {
        let Some(raw) = self.store.get(CYCLE_KEY) else {
            return 1;
        };
        match raw.trim().parse::<u32>() {
            Ok(number) if number >= 1 => number,
            _ => {
                warn!(value = %raw, "stored cycle number is unreadable, using 1");
                1
            }
        }
    }

    fn start_cycle(&mut self, cycle_number: u32) -> CycleRecord {
        let record = CycleRecord {
            started_at: self.clock.now().trunc_subsecs(3),
            cycle_number,
        };
        self.persist(&record);
        record
    }

    fn persist(&mut self, record: &CycleRecord) {
        let start = format_timestamp(record.started_at);
        let number = record.cycle_number.to_string();
        if let Err(err) = self
            .store
            .set_many(&[(START_KEY, start.as_str()), (CYCLE_KEY, number.as_str())])
        {
            error!("failed to persist cycle record: {err}");
        }
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::display::DisplaySlots;
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn tracker_with(
        start: Option<DateTime<Utc>>,
        cycle: Option<&str>,
    ) -> (CycleTracker<MemoryStore, ManualClock>, ManualClock) {
        let mut store = MemoryStore::new();
        if let Some(start) = start {
            store.set(START_KEY, &format_timestamp(start)).unwrap();
        }
        if let Some(cycle) = cycle {
            store.set(CYCLE_KEY, cycle).unwrap();
        }
        let clock = ManualClock::new(base_time());
        (CycleTracker::new(store, clock.clone()), clock)
    }

    #[test]
    fn remaining_counts_down_then_clamps() {
        let start = base_time();
        for elapsed in 0..TOTAL_DAYS {
            let now = start + Duration::days(elapsed) + Duration::hours(3);
            assert_eq!(compute_remaining(start, now), TOTAL_DAYS - elapsed);
            assert!(!is_complete(compute_remaining(start, now), elapsed));
        }
        for elapsed in TOTAL_DAYS..TOTAL_DAYS + 30 {
            let now = start + Duration::days(elapsed);
            assert_eq!(compute_remaining(start, now), 0);
            assert!(is_complete(0, elapsed_days(start, now)));
        }
    }

    #[test]
    fn elapsed_days_floors_partial_days() {
        let start = base_time();
        let almost = start + Duration::days(3) - Duration::milliseconds(1);
        assert_eq!(elapsed_days(start, almost), 2);
        assert_eq!(elapsed_days(start, start + Duration::days(3)), 3);
    }

    #[test]
    fn completion_guard_needs_both_conditions() {
        assert!(!is_complete(0, TOTAL_DAYS - 1));
        assert!(!is_complete(1, TOTAL_DAYS));
        assert!(is_complete(0, TOTAL_DAYS));
    }

    #[test]
    fn progress_spans_zero_to_hundred() {
        assert_eq!(progress_percent(TOTAL_DAYS), 0.0);
        assert_eq!(progress_percent(5), 50.0);
        assert_eq!(progress_percent(0), 100.0);
    }

    #[test]
    fn fresh_storage_starts_cycle_one() {
        let (mut tracker, _clock) = tracker_with(None, None);
        let mut slots = DisplaySlots::new();

        let outcome = tracker.initialize(&mut slots);
        let status = outcome.status();
        assert!(matches!(outcome, TickOutcome::Counting(_)));
        assert_eq!(status.record.cycle_number, 1);
        assert_eq!(status.days_remaining, 10);
        assert_eq!(status.progress_percent, 0.0);

        assert_eq!(tracker.store().get(CYCLE_KEY).as_deref(), Some("1"));
        assert_eq!(
            tracker.store().get(START_KEY),
            Some(format_timestamp(base_time()))
        );
        let snapshot = slots.snapshot();
        assert_eq!(snapshot.days_number, "10");
        assert_eq!(snapshot.days_label, "days");
        assert_eq!(snapshot.progress_width, "0%");
        assert_eq!(snapshot.cycle_indicator, "Cycle 1");
    }

    #[test]
    fn five_days_in_renders_half_progress() {
        let (mut tracker, _clock) = tracker_with(Some(base_time() - Duration::days(5)), Some("2"));
        let mut slots = DisplaySlots::new();

        tracker.initialize(&mut slots);
        let snapshot = slots.snapshot();
        assert_eq!(snapshot.days_number, "5");
        assert_eq!(snapshot.days_label, "days");
        assert_eq!(snapshot.progress_width, "50%");
        assert_eq!(snapshot.cycle_indicator, "Cycle 2");
    }

    #[test]
    fn overdue_cycle_resets_on_tick() {
        let (mut tracker, clock) = tracker_with(Some(base_time() - Duration::days(11)), Some("3"));
        let mut slots = DisplaySlots::new();

        let outcome = tracker.tick(&mut slots);
        match &outcome {
            TickOutcome::Reset { completed, status, celebration } => {
                assert_eq!(*completed, 3);
                assert_eq!(status.record.cycle_number, 4);
                assert_eq!(status.days_remaining, 10);
                assert_eq!(celebration.burst, 10);
            }
            other => panic!("expected reset, got {other:?}"),
        }
        assert_eq!(tracker.phase(), CyclePhase::Counting);
        assert_eq!(tracker.store().get(CYCLE_KEY).as_deref(), Some("4"));
        assert_eq!(tracker.store().get(START_KEY), Some(format_timestamp(clock.now())));
        assert!(slots.celebration_active());
        assert_eq!(slots.snapshot().celebration.text, "🌱💧🌿");
        assert_eq!(slots.snapshot().days_number, "10");
        assert_eq!(slots.snapshot().cycle_indicator, "Cycle 4");
    }

    #[test]
    fn last_day_shows_singular_label() {
        let (mut tracker, _clock) = tracker_with(Some(base_time() - Duration::days(9)), Some("1"));
        let mut slots = DisplaySlots::new();
        tracker.tick(&mut slots);
        assert_eq!(slots.snapshot().days_number, "1");
        assert_eq!(slots.snapshot().days_label, "day");
        assert_eq!(slots.snapshot().progress_width, "90%");
    }

    #[test]
    fn repeated_resets_are_monotonic() {
        let (mut tracker, clock) = tracker_with(None, None);
        let mut slots = DisplaySlots::new();
        tracker.initialize(&mut slots);

        let mut previous_start = tracker.status().record.started_at;
        for n in 1..=5u32 {
            clock.advance(Duration::days(TOTAL_DAYS) + Duration::minutes(1));
            let outcome = tracker.tick(&mut slots);
            assert!(matches!(outcome, TickOutcome::Reset { .. }));

            let status = tracker.status();
            assert_eq!(status.record.cycle_number, n + 1);
            assert!(status.record.started_at > previous_start);
            previous_start = status.record.started_at;
        }
    }

    #[test]
    fn tick_picks_up_external_changes() {
        let (mut tracker, _clock) = tracker_with(Some(base_time() - Duration::days(2)), Some("1"));
        let mut slots = DisplaySlots::new();
        tracker.initialize(&mut slots);
        assert_eq!(slots.snapshot().days_number, "8");

        tracker
            .store
            .set(START_KEY, &format_timestamp(base_time() - Duration::days(6)))
            .unwrap();
        tracker.store.set(CYCLE_KEY, "9").unwrap();
        tracker.tick(&mut slots);
        assert_eq!(slots.snapshot().days_number, "4");
        assert_eq!(slots.snapshot().cycle_indicator, "Cycle 9");
    }

    #[test]
    fn unreadable_start_restarts_cycle_and_keeps_number() {
        let (mut tracker, _clock) = tracker_with(None, Some("6"));
        tracker.store.set(START_KEY, "yesterday-ish").unwrap();
        let mut slots = DisplaySlots::new();

        let status = *tracker.initialize(&mut slots).status();
        assert_eq!(status.record.cycle_number, 6);
        assert_eq!(status.days_remaining, 10);
        assert_eq!(tracker.store().get(START_KEY), Some(format_timestamp(base_time())));
    }

    #[test]
    fn future_start_restarts_cycle() {
        let (mut tracker, _clock) = tracker_with(Some(base_time() + Duration::days(3)), Some("2"));
        let status = tracker.status();
        assert_eq!(status.record.started_at, base_time());
        assert_eq!(status.record.cycle_number, 2);
        assert_eq!(status.days_remaining, 10);
    }

    #[test]
    fn unreadable_cycle_number_falls_back_to_one() {
        let (mut tracker, _clock) = tracker_with(Some(base_time()), Some("lots"));
        assert_eq!(tracker.status().record.cycle_number, 1);

        let (mut tracker, _clock) = tracker_with(Some(base_time()), Some("0"));
        assert_eq!(tracker.status().record.cycle_number, 1);
    }

    #[test]
    fn reset_survives_an_interrupted_write_beside_the_store() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "cycle_countdown_tracker_{}_{nanos}.json",
            std::process::id()
        ));
        let clock = ManualClock::new(base_time());
        let start = format_timestamp(base_time() - Duration::days(10));
        let mut store = FileStore::new(&path);
        store
            .set_many(&[(START_KEY, start.as_str()), (CYCLE_KEY, "6")])
            .unwrap();
        let mut tracker = CycleTracker::new(store, clock.clone());
        let mut slots = DisplaySlots::new();

        assert!(matches!(tracker.tick(&mut slots), TickOutcome::Reset { completed: 6, .. }));

        let mut leftover = path.clone().into_os_string();
        leftover.push(".tmp");
        std::fs::write(&leftover, r#"{"cycleNumber": "#).unwrap();

        clock.advance(Duration::hours(1));
        let outcome = tracker.tick(&mut slots);
        assert!(matches!(outcome, TickOutcome::Counting(_)));
        assert_eq!(outcome.status().record.cycle_number, 7);
        assert_eq!(slots.snapshot().cycle_indicator, "Cycle 7");

        let _ = std::fs::remove_file(&leftover);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn timestamps_round_trip_through_the_store_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 5, 8, 30, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-10-05T08:30:00.000Z");
    }
}
