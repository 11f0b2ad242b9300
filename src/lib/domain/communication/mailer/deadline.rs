//! Send deadlines

use std::time::Duration;

use tokio::time::{self, Instant};

/// The point in time after which a caller stops waiting for a send
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

impl Deadline {
    /// A deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// Completes once the deadline has passed.
    pub(crate) async fn expired(self) {
        time::sleep_until(self.0).await
    }
}

impl From<Duration> for Deadline {
    fn from(timeout: Duration) -> Self {
        Self::after(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remaining_is_zero_once_passed() {
        let deadline = Deadline::after(Duration::from_millis(5));

        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_deadline_in_the_future() {
        let deadline = Deadline::from(Duration::from_secs(60));

        assert!(deadline.remaining() > Duration::from_secs(59));
    }

    #[tokio::test]
    async fn test_expired_completes_at_the_deadline() {
        let start = Instant::now();
        let deadline = Deadline::after(Duration::from_millis(20));

        deadline.expired().await;

        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
