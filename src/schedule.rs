// ECG Sentinel — Timing Helpers
//
// Fixed-phase sample scheduling, coarse cadences and bounded retries. All
// comparisons are on monotonic time; nothing here sleeps on its own.

use std::time::Duration;

/// Fires once per `period_us`, advancing the deadline by exactly one period
/// so loop jitter never accumulates into drift.
#[derive(Debug, Clone)]
pub struct FixedRateSchedule {
    period_us: u64,
    next_due_us: u64,
}

impl FixedRateSchedule {
    pub fn new(period_us: u64, start_us: u64) -> Self {
        Self {
            period_us,
            next_due_us: start_us + period_us,
        }
    }

    pub fn poll(&mut self, now_us: u64) -> bool {
        if now_us >= self.next_due_us {
            self.next_due_us += self.period_us;
            true
        } else {
            false
        }
    }

    pub fn next_due_us(&self) -> u64 {
        self.next_due_us
    }
}

/// Millisecond cadence: due on the first call, then every `interval_ms`.
#[derive(Debug, Clone)]
pub struct Every {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl Every {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    pub fn due(&mut self, now_ms: u32) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}

/// Bounded attempt count with a fixed pause between failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// Run `op` until it succeeds or the attempts are used up. `sleep` is
    /// called between failures, never after the last one.
    pub fn run<T, E, F, S>(&self, mut op: F, mut sleep: S) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        S: FnMut(Duration),
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) if attempt >= attempts => return Err(e),
                Err(_) => {
                    sleep(self.backoff);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::CONNECT_ATTEMPTS,
            Duration::from_millis(crate::config::CONNECT_BACKOFF_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_poll_does_not_shift_phase() {
        let mut sched = FixedRateSchedule::new(4000, 0);
        assert!(!sched.poll(3999));
        assert!(sched.poll(4700)); // 700 µs late
        // Next deadline is still 8000, not 4700 + 4000.
        assert_eq!(sched.next_due_us(), 8000);
        assert!(!sched.poll(7999));
        assert!(sched.poll(8000));
    }

    #[test]
    fn catches_up_after_a_stall() {
        let mut sched = FixedRateSchedule::new(4000, 0);
        let fired = (0..4).filter(|_| sched.poll(12_500)).count();
        assert_eq!(fired, 3);
        assert_eq!(sched.next_due_us(), 16_000);
    }

    #[test]
    fn every_fires_first_then_on_interval() {
        let mut every = Every::new(1000);
        assert!(every.due(500));
        assert!(!every.due(1499));
        assert!(every.due(1500));
    }

    #[test]
    fn retry_stops_on_success() {
        let mut sleeps = 0;
        let out: Result<u32, &str> = RetryPolicy::default().run(
            |n| if n == 2 { Ok(n) } else { Err("nope") },
            |_| sleeps += 1,
        );
        assert_eq!(out, Ok(2));
        assert_eq!(sleeps, 1);
    }

    #[test]
    fn retry_is_bounded() {
        let mut calls = 0;
        let mut slept = Duration::ZERO;
        let out: Result<(), u32> = RetryPolicy::new(3, Duration::from_millis(2000)).run(
            |n| {
                calls += 1;
                Err(n)
            },
            |d| slept += d,
        );
        assert_eq!(out, Err(3));
        assert_eq!(calls, 3);
        assert_eq!(slept, Duration::from_millis(4000));
    }
}
