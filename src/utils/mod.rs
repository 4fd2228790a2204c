use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("Finished: {} (took {:.2?})", self.label, self.start.elapsed());
    }
}

/// Uniformly random politeness delay in `[min_ms, max_ms]`.
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    min_ms: u64,
    max_ms: u64,
}

impl Jitter {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn sample(&self) -> Duration {
        Duration::from_millis(rand::random_range(self.min_ms..=self.max_ms))
    }

    pub async fn sleep(&self) {
        let total = self.sample();
        if total.is_zero() {
            return;
        }
        debug!("Sleeping {:?} before request", total);
        tokio::time::sleep(total).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_range() {
        let jitter = Jitter::new(1000, 3000);
        for _ in 0..200 {
            let d = jitter.sample();
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn jitter_normalises_inverted_bounds() {
        let jitter = Jitter::new(50, 10);
        let d = jitter.sample();
        assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(50));
        assert_eq!(Jitter::new(0, 0).sample(), Duration::ZERO);
    }
}
