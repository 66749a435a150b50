//! Poll scheduling
//!
//! Two cadences drive the sensor:
//!
//! - a lazy throttle: fixed ticks, but a poll only runs once the minimum
//!   interval has elapsed since the previous one;
//! - grid-aligned triggers: polls at fixed offsets after every grid mark
//!   (by default +1 and +7 minutes after each quarter hour), to pick up data
//!   the sources publish late.
//!
//! Fire times are computed explicitly from the current time; nothing here
//! reschedules itself.

use crate::config::{ScheduleConfig, ScheduleMode};
use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use std::time::Duration;

/// Why a poll was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First poll after startup
    Startup,
    /// Throttle interval tick
    Interval,
    /// Offset after a grid mark
    GridOffset,
    /// Explicit refresh request
    Manual,
}

impl Trigger {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Interval => "interval",
            Self::GridOffset => "grid_offset",
            Self::Manual => "manual",
        }
    }

    /// Grid and startup polls are not subject to the throttle
    pub const fn is_throttled(self) -> bool {
        matches!(self, Self::Interval | Self::Manual)
    }
}

/// Minimum spacing between executions
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: ChronoDuration,
    last_run: Option<DateTime<Utc>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval: ChronoDuration::from_std(min_interval)
                .unwrap_or_else(|_| ChronoDuration::seconds(60)),
            last_run: None,
        }
    }

    pub const fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    /// Whether a throttled execution may run at `now`
    pub fn should_run(&self, now: DateTime<Utc>) -> bool {
        self.last_run
            .is_none_or(|last| now.signed_duration_since(last) >= self.min_interval)
    }

    /// Record an execution at `now`
    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
    }

    /// `should_run` and, when due, `mark` in one step
    pub fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        if self.should_run(now) {
            self.mark(now);
            true
        } else {
            false
        }
    }
}

/// Offsets after every grid mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOffsets {
    grid_minutes: u32,
    offsets_minutes: Vec<u32>,
}

impl GridOffsets {
    /// Offsets at or beyond the grid size are dropped
    pub fn new(grid_minutes: u32, offsets_minutes: &[u32]) -> Self {
        let grid_minutes = grid_minutes.clamp(1, 60);
        let mut offsets: Vec<u32> = offsets_minutes
            .iter()
            .copied()
            .filter(|m| *m < grid_minutes)
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        Self {
            grid_minutes,
            offsets_minutes: offsets,
        }
    }

    fn grid(&self) -> ChronoDuration {
        ChronoDuration::minutes(i64::from(self.grid_minutes))
    }

    /// First trigger strictly after `after`; `None` without offsets
    ///
    /// Grid marks are aligned on UTC, which coincides with the market clock
    /// for every whole-hour offset zone.
    pub fn next_trigger(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let grid = self.grid();
        let mark = after.duration_trunc(grid).ok()?;
        // The current mark and the next one always contain a candidate
        [mark, mark + grid].into_iter().find_map(|base| {
            self.offsets_minutes
                .iter()
                .map(|m| base + ChronoDuration::minutes(i64::from(*m)))
                .find(|t| *t > after)
        })
    }
}

/// Cadence configuration resolved from [`ScheduleConfig`]
#[derive(Debug, Clone)]
pub struct PollSchedule {
    mode: ScheduleMode,
    min_interval: Duration,
    grid: GridOffsets,
}

impl PollSchedule {
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self {
            mode: config.mode,
            min_interval: Duration::from_secs(config.min_interval_seconds.max(1)),
            grid: GridOffsets::new(config.grid_minutes, &config.offsets_minutes),
        }
    }

    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::new(self.min_interval)
    }

    /// Interval ticks are active in `throttle` and `both` modes
    pub fn uses_interval(&self) -> bool {
        matches!(self.mode, ScheduleMode::Throttle | ScheduleMode::Both)
    }

    /// Grid triggers are active in `grid_aligned` and `both` modes
    pub fn uses_grid(&self) -> bool {
        matches!(self.mode, ScheduleMode::GridAligned | ScheduleMode::Both)
    }

    /// Next grid trigger after `now`, if grid triggers are active
    pub fn next_grid_trigger(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.uses_grid() {
            self.grid.next_trigger(now)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn grid_offsets_fire_after_each_quarter() {
        let g = GridOffsets::new(15, &[7, 1]);
        assert_eq!(g.next_trigger(at(10, 0, 0)), Some(at(10, 1, 0)));
        assert_eq!(g.next_trigger(at(10, 1, 0)), Some(at(10, 7, 0)));
        assert_eq!(g.next_trigger(at(10, 3, 30)), Some(at(10, 7, 0)));
        assert_eq!(g.next_trigger(at(10, 7, 0)), Some(at(10, 16, 0)));
        assert_eq!(g.next_trigger(at(10, 14, 59)), Some(at(10, 16, 0)));
        assert_eq!(g.next_trigger(at(10, 52, 0)), Some(at(11, 1, 0)));
        assert_eq!(
            g.next_trigger(at(23, 59, 0)),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 0, 1, 0).unwrap())
        );
    }

    #[test]
    fn out_of_range_offsets_are_dropped() {
        let g = GridOffsets::new(15, &[20]);
        assert_eq!(g.next_trigger(at(10, 0, 0)), None);
    }

    #[test]
    fn throttle_refuses_runs_inside_interval() {
        let mut t = Throttle::new(Duration::from_secs(60));
        assert!(t.try_acquire(at(10, 0, 0)));
        assert!(!t.try_acquire(at(10, 0, 59)));
        assert!(t.try_acquire(at(10, 1, 0)));
        assert_eq!(t.last_run(), Some(at(10, 1, 0)));
    }

    #[test]
    fn marking_resets_the_interval() {
        let mut t = Throttle::new(Duration::from_secs(60));
        t.mark(at(10, 1, 0));
        assert!(!t.should_run(at(10, 1, 30)));
    }

    #[test]
    fn mode_selects_cadences() {
        let mut cfg = ScheduleConfig::default();
        let s = PollSchedule::from_config(&cfg);
        assert!(s.uses_interval() && s.uses_grid());

        cfg.mode = ScheduleMode::Throttle;
        let s = PollSchedule::from_config(&cfg);
        assert!(s.uses_interval());
        assert_eq!(s.next_grid_trigger(at(10, 0, 0)), None);

        cfg.mode = ScheduleMode::GridAligned;
        let s = PollSchedule::from_config(&cfg);
        assert!(!s.uses_interval());
        assert_eq!(s.next_grid_trigger(at(10, 0, 0)), Some(at(10, 1, 0)));
    }

    #[test]
    fn only_interval_and_manual_are_throttled() {
        assert!(Trigger::Interval.is_throttled());
        assert!(Trigger::Manual.is_throttled());
        assert!(!Trigger::GridOffset.is_throttled());
        assert!(!Trigger::Startup.is_throttled());
    }
}
