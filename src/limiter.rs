/// Frames to skip between emissions
pub const FRAME_RATE: u32 = 100;

/// Throttles payload emission to one per `threshold + 2` valid samples
///
/// The counter is compared before it is advanced: a sample emits when the
/// counter already exceeds the threshold, and the counter then restarts at 0.
/// With the default threshold of 100 this is one payload every 102 samples.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    threshold: u32,
    counter: u32,
}

impl RateLimiter {
    pub fn new(threshold: u32) -> Self {
        Self { threshold, counter: 0 }
    }

    /// Record one valid sample; returns true when it should be emitted
    pub fn tick(&mut self) -> bool {
        if self.counter > self.threshold {
            self.counter = 0;
            true
        } else {
            self.counter = self.counter.saturating_add(1);
            false
        }
    }

    /// Valid samples needed per emission
    pub fn period(&self) -> u64 {
        u64::from(self.threshold) + 2
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(FRAME_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_emissions(threshold: u32, samples: u64) -> u64 {
        let mut limiter = RateLimiter::new(threshold);
        (0..samples).filter(|_| limiter.tick()).count() as u64
    }

    #[test]
    fn test_starts_idle() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.counter(), 0);
        assert_eq!(limiter.period(), 102);
    }

    #[test]
    fn test_first_emission_on_threshold_plus_two() {
        let mut limiter = RateLimiter::new(3);
        let emitted: Vec<bool> = (0..10).map(|_| limiter.tick()).collect();
        assert_eq!(
            emitted,
            [false, false, false, false, true, false, false, false, false, true]
        );
        assert_eq!(limiter.counter(), 0);
    }

    #[test]
    fn test_emission_count() {
        for threshold in [0, 1, 5, 100] {
            for samples in [0, 1, 101, 102, 103, 500, 1021] {
                let period = u64::from(threshold) + 2;
                assert_eq!(
                    count_emissions(threshold, samples),
                    samples / period,
                    "threshold {} samples {}",
                    threshold,
                    samples
                );
            }
        }
    }

    #[test]
    fn test_zero_threshold_emits_every_other_sample() {
        let mut limiter = RateLimiter::new(0);
        assert!(!limiter.tick());
        assert!(limiter.tick());
        assert!(!limiter.tick());
        assert!(limiter.tick());
    }

    #[test]
    fn test_max_threshold_never_overflows() {
        let mut limiter = RateLimiter {
            threshold: u32::MAX,
            counter: u32::MAX - 1,
        };
        assert!(!limiter.tick());
        assert!(!limiter.tick());
        assert_eq!(limiter.counter(), u32::MAX);
    }
}
