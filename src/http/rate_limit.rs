use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Paces probe traffic on a channel. Every probe against one target shares
/// the limiter, so bursts from the context search stay within the
/// configured rate.
#[derive(Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_probe: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// rate = probes per second; 0 disables pacing entirely.
    pub fn new(rate: u32) -> Self {
        let interval = match rate {
            0 => Duration::ZERO,
            r => Duration::from_secs_f64(1.0 / r as f64),
        };

        Self {
            interval,
            last_probe: Arc::new(Mutex::new(Instant::now() - interval)),
        }
    }

    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut last = self.last_probe.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.interval {
            tokio::time::sleep(self.interval - elapsed).await;
        }

        *last = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_rate_never_sleeps() {
        let limiter = RateLimiter::new(0);
        assert!(limiter.interval.is_zero());
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn pacing_spaces_consecutive_probes() {
        let limiter = RateLimiter::new(100);
        limiter.wait().await;
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
