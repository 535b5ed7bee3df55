// * Request pacing and batch throttling
// * Two independent governors: a per-request pacer in front of the transport and a
// * pause-and-resume throttle counted in successful insertions.

use governor::{Quota, RateLimiter as GovernorLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

type DirectLimiter = GovernorLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

// * RequestPacer spaces outgoing requests to the source
pub struct RequestPacer {
    limiter: DirectLimiter,
}

impl RequestPacer {
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Self {
            limiter: GovernorLimiter::direct(Quota::per_second(rps)),
        }
    }

    // * Waits until the pacer allows the next request
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

// * PauseThrottle pauses the whole batch after a fixed count of successful insertions
#[derive(Debug, Clone)]
pub struct PauseThrottle {
    every: usize,
    pause: Duration,
    since_pause: usize,
    pauses_taken: usize,
}

impl PauseThrottle {
    pub fn new(every: usize, pause: Duration) -> Self {
        Self {
            every,
            pause,
            since_pause: 0,
            pauses_taken: 0,
        }
    }

    // * Records one successful insertion
    pub fn record_insert(&mut self) {
        self.since_pause += 1;
    }

    // * Returns true when the insert budget is spent and a pause is due
    pub fn is_due(&self) -> bool {
        self.every > 0 && self.since_pause >= self.every
    }

    // * Sleeps for the configured pause if one is due, then resets the counter
    pub async fn pause_if_due(&mut self) -> bool {
        if !self.is_due() {
            return false;
        }

        info!(
            inserts = self.since_pause,
            pause_secs = self.pause.as_secs(),
            "Insert budget reached, pausing batch"
        );
        tokio::time::sleep(self.pause).await;
        debug!("Batch resuming");

        self.since_pause = 0;
        self.pauses_taken += 1;
        true
    }

    pub fn pauses_taken(&self) -> usize {
        self.pauses_taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pacer_zero_rate_falls_back_to_one() {
        let pacer = RequestPacer::new(0);
        // * The first request is always allowed
        tokio::time::timeout(Duration::from_millis(100), pacer.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pacer_wait_returns() {
        let pacer = RequestPacer::new(100);
        pacer.wait().await;
    }

    #[tokio::test]
    async fn test_throttle_pauses_after_budget() {
        let mut throttle = PauseThrottle::new(2, Duration::ZERO);

        throttle.record_insert();
        assert!(!throttle.pause_if_due().await);

        throttle.record_insert();
        assert!(throttle.is_due());
        assert!(throttle.pause_if_due().await);
        assert!(!throttle.is_due());
        assert_eq!(throttle.pauses_taken(), 1);
    }

    #[test]
    fn test_throttle_disabled_when_zero() {
        let mut throttle = PauseThrottle::new(0, Duration::ZERO);
        for _ in 0..10 {
            throttle.record_insert();
        }
        assert!(!throttle.is_due());
    }
}
