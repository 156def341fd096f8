//! Repeating timers for the fireplace's periodic tasks.
//!
//! Hosts call [`FireplaceDriver::run`] as often as they like (every frame,
//! every server tick); each task fires at its own cadence against the
//! injected [`Clock`]. A host that stalls gets one catch-up run per task,
//! not a burst: fuel decay is elapsed-time based, so nothing is lost.

use crate::clock::Clock;
use crate::constants::cadence;
use crate::environment::EnvironmentProbe;
use crate::replication::ReplicatedFireplace;

/// Fires every `interval` seconds after an initial delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatingTimer {
    next_due: f64,
    interval: f64,
}

impl RepeatingTimer {
    pub fn new(start_seconds: f64, delay: f64, interval: f64) -> Self {
        Self {
            next_due: start_seconds + delay,
            interval,
        }
    }

    pub fn next_due(&self) -> f64 {
        self.next_due
    }

    /// Whether the timer fired at `now`. Missed periods collapse into one.
    pub fn poll(&mut self, now_seconds: f64) -> bool {
        if now_seconds < self.next_due {
            return false;
        }
        if self.interval <= 0.0 {
            self.next_due = f64::INFINITY;
            return true;
        }
        let missed = ((now_seconds - self.next_due) / self.interval).floor();
        self.next_due += (missed + 1.0) * self.interval;
        true
    }
}

/// Periodic fireplace work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireplaceTask {
    /// Blocked / wet checks.
    CheckEnvironment,
    /// Fuel decay (owner) and visual refresh.
    Update,
}

/// Timers for one fireplace.
#[derive(Debug, Clone, Copy)]
pub struct FireplaceDriver {
    update: RepeatingTimer,
    environment: RepeatingTimer,
}

impl FireplaceDriver {
    /// Start both timers at the clock's current time.
    pub fn new(clock: &impl Clock) -> Self {
        let start = clock.now_seconds();
        Self {
            update: RepeatingTimer::new(
                start,
                cadence::FUEL_UPDATE_DELAY,
                cadence::FUEL_UPDATE_INTERVAL,
            ),
            environment: RepeatingTimer::new(
                start,
                cadence::ENVIRONMENT_CHECK_DELAY,
                cadence::ENVIRONMENT_CHECK_INTERVAL,
            ),
        }
    }

    /// Tasks due now. The environment check comes first so the update sees
    /// fresh flags.
    pub fn due(&mut self, clock: &impl Clock) -> Vec<FireplaceTask> {
        let now = clock.now_seconds();
        let mut tasks = Vec::new();
        if self.environment.poll(now) {
            tasks.push(FireplaceTask::CheckEnvironment);
        }
        if self.update.poll(now) {
            tasks.push(FireplaceTask::Update);
        }
        tasks
    }

    /// Run whatever is due against `fire`. Returns the tasks that ran.
    pub fn run(
        &mut self,
        fire: &mut ReplicatedFireplace,
        clock: &impl Clock,
        probe: &impl EnvironmentProbe,
    ) -> Vec<FireplaceTask> {
        let tasks = self.due(clock);
        for task in &tasks {
            match task {
                FireplaceTask::CheckEnvironment => {
                    fire.check_environment(probe);
                }
                FireplaceTask::Update => {
                    fire.update(clock.now_ticks(), probe);
                }
            }
        }
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::FireplaceConfig;
    use crate::environment::{StaticEnvironment, Vec3};

    #[test]
    fn test_timer_fires_on_schedule() {
        let mut t = RepeatingTimer::new(0.0, 4.0, 4.0);
        assert!(!t.poll(3.9));
        assert!(t.poll(4.0));
        assert!(!t.poll(7.9));
        assert!(t.poll(8.0));
        assert_eq!(t.next_due(), 12.0);
    }

    #[test]
    fn test_timer_collapses_missed_periods() {
        let mut t = RepeatingTimer::new(0.0, 0.0, 2.0);
        assert!(t.poll(0.0));
        assert!(t.poll(9.0));
        assert_eq!(t.next_due(), 10.0);
        assert!(!t.poll(9.5));
    }

    #[test]
    fn test_zero_interval_fires_once() {
        let mut t = RepeatingTimer::new(0.0, 1.0, 0.0);
        assert!(t.poll(1.0));
        assert!(!t.poll(100.0));
    }

    #[test]
    fn test_driver_cadence() {
        let clock = ManualClock::new(0);
        let mut driver = FireplaceDriver::new(&clock);
        assert_eq!(driver.due(&clock), vec![FireplaceTask::Update]);
        clock.advance_seconds(2.0);
        assert_eq!(driver.due(&clock), vec![FireplaceTask::Update]);
        clock.advance_seconds(2.0);
        assert_eq!(
            driver.due(&clock),
            vec![FireplaceTask::CheckEnvironment, FireplaceTask::Update]
        );
        clock.advance_seconds(1.0);
        assert!(driver.due(&clock).is_empty());
    }

    #[test]
    fn test_driver_burns_fuel_over_time() {
        let clock = ManualClock::new(0);
        let env = StaticEnvironment::default();
        let mut fire = ReplicatedFireplace::place(1, FireplaceConfig::default(), Vec3::default());
        let mut driver = FireplaceDriver::new(&clock);

        for _ in 0..3 {
            driver.run(&mut fire, &clock, &env);
            clock.advance_seconds(2.0);
        }
        // Updates at 0, 2, 4 s: 4 s of burning at 3 s/fuel.
        let expected = 3.0 - 4.0 / 3.0;
        assert!((fire.fire().fuel() - expected).abs() < 1e-4);
        assert!(fire.fire().visual().enabled);
    }
}
