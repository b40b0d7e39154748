//! Time source and delay primitive
//!
//! Bucket waits go through [`Clock`] so tests can substitute a controllable
//! time source. `reset` instants are wall-clock because the server reports
//! them as absolute UNIX epoch seconds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Monotonic-enough time source and delay primitive
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend for the given duration
    async fn sleep(&self, duration: Duration);

    /// Suspend until the given wall-clock instant.
    ///
    /// Returns immediately if the instant is already in the past.
    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        let now = self.now();
        if deadline <= now {
            return;
        }
        let duration = (deadline - now).to_std().unwrap_or(Duration::ZERO);
        self.sleep(duration).await;
    }
}

/// [`Clock`] backed by the system clock and the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_sleep_until_past_instant_returns_immediately() {
        let clock = SystemClock;
        let started = Instant::now();
        clock.sleep_until(Utc::now() - chrono::Duration::seconds(10)).await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_sleep_until_waits_for_future_instant() {
        let clock = SystemClock;
        let started = Instant::now();
        clock.sleep_until(Utc::now() + chrono::Duration::milliseconds(100)).await;
        assert!(started.elapsed() >= Duration::from_millis(80));
    }
}
