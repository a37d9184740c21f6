use rand::Rng;
use std::time::Duration;

/// Bounded retries with exponential backoff plus random jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            base_delay: Duration::from_millis(500),
            max_jitter: Duration::from_millis(500),
        }
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay before retry number `attempt` (1-based): base · 2^(attempt-1) + jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + self.jitter()
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_within_jitter_bounds() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.max_attempts(), 4);

        for attempt in 1..=3 {
            let expected = Duration::from_millis(500 * (1 << (attempt - 1)));
            let delay = policy.delay_for(attempt);
            assert!(delay >= expected);
            assert!(delay <= expected + Duration::from_millis(500));
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let policy = RetryPolicy {
            retries: 1,
            base_delay: Duration::from_millis(10),
            max_jitter: Duration::ZERO,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
    }
}
