//! Retry schedule for connection failures.

use std::time::Duration;

/// Exponential backoff between connection attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Growth factor applied for each further failure.
    pub multiplier: u32,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `failed_attempt` (1-indexed).
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        if failed_attempt == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.saturating_pow(failed_attempt - 1);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Cumulative delay across the first `failures` failed attempts.
    pub fn total_delay(&self, failures: u32) -> Duration {
        (1..=failures).map(|n| self.delay_after(n)).sum()
    }
}

impl Default for RetryPolicy {
    /// Default: 5 attempts, 10s initial delay, doubling.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
            multiplier: 2,
        }
    }
}

/// Blocking pause between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
