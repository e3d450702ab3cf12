//! Bounded poll-with-backoff schedule for script settlement.
//!
//! After the load event a page may still be mutating itself from timers and
//! late XHR responses. The renderer polls for that activity to settle using
//! the delays produced here: starting short, doubling up to a cap, and never
//! sleeping longer in total than `max_checks * max_delay`. That product is
//! the worst-case latency contract; early exit happens at the first stable
//! poll.

use std::time::Duration;

/// Settle polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct SettlePolicy {
    /// First wait between polls. Doubles each iteration.
    pub initial_delay: Duration,

    /// Cap on a single wait between polls.
    pub max_delay: Duration,

    /// Bound on the number of full-length waits.
    pub max_checks: u32,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(1_000),
            max_checks: 2,
        }
    }
}

impl SettlePolicy {
    /// Total wait budget: the worst-case settle latency.
    pub fn budget(&self) -> Duration {
        self.max_delay * self.max_checks
    }

    /// The wait schedule: doubling delays, each clamped so the running total
    /// never exceeds `budget()`.
    pub fn delays(&self) -> Vec<Duration> {
        let budget = self.budget();
        let mut delays = Vec::new();
        let mut elapsed = Duration::ZERO;
        let mut delay = self.initial_delay.min(self.max_delay);

        while elapsed < budget {
            let step = delay.min(budget - elapsed);
            if step.is_zero() {
                break;
            }
            delays.push(step);
            elapsed += step;
            delay = (delay * 2).min(self.max_delay);
        }

        delays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_never_exceeds_budget() {
        let policy = SettlePolicy::default();
        let total: Duration = policy.delays().iter().sum();
        assert!(total <= policy.budget());
    }

    #[test]
    fn test_default_schedule_fills_budget() {
        // 200 + 400 + 800 + 600 = 2000ms, exactly max_checks * max_delay.
        let policy = SettlePolicy::default();
        let delays = policy.delays();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(600),
            ]
        );
    }

    #[test]
    fn test_delays_double_up_to_cap() {
        let policy = SettlePolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
            max_checks: 10,
        };
        let delays = policy.delays();
        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[1], Duration::from_millis(200));
        assert_eq!(delays[2], Duration::from_millis(400));
        // capped from here on
        assert!(delays[3..].iter().all(|d| *d <= Duration::from_millis(400)));
        let total: Duration = delays.iter().sum();
        assert!(total <= policy.budget());
    }

    #[test]
    fn test_single_check_budget() {
        let policy = SettlePolicy {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(1_000),
            max_checks: 1,
        };
        assert_eq!(policy.delays(), vec![Duration::from_millis(1_000)]);
    }

    #[test]
    fn test_zero_initial_delay_terminates() {
        let policy = SettlePolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::from_millis(1_000),
            max_checks: 2,
        };
        assert!(policy.delays().is_empty());
    }
}
