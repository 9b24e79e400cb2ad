/// Counts consecutive beacon intervals in which the parent's beacon was not heard.
///
/// The threshold is crossed when the count *exceeds* macMaxLostBeacons.
/// Crossings are also accumulated so they survive a reset.
#[derive(Debug, Default)]
pub struct LostBeaconCounter {
    missed: u8,
    threshold: u8,
    cumulative_cnt: u32,
}

impl LostBeaconCounter {
    /// Creates a new counter with a specific threshold.
    pub fn new(threshold: u8) -> Self {
        Self {
            missed: 0,
            threshold,
            cumulative_cnt: 0,
        }
    }

    /// Records a missed beacon. Returns `true` exactly when the threshold is
    /// crossed; the count is then reset.
    pub fn record_miss(&mut self) -> bool {
        self.missed = self.missed.saturating_add(1);
        if self.missed > self.threshold {
            self.missed = 0;
            self.cumulative_cnt = self.cumulative_cnt.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// The parent's beacon was heard.
    pub fn reset(&mut self) {
        self.missed = 0;
    }

    pub fn missed(&self) -> u8 {
        self.missed
    }

    /// Number of threshold crossings since creation.
    pub fn cumulative(&self) -> u32 {
        self.cumulative_cnt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_crossed_only_above_limit() {
        let mut counter = LostBeaconCounter::new(2);
        assert!(!counter.record_miss());
        assert!(!counter.record_miss());
        assert!(counter.record_miss());
        assert_eq!(counter.missed(), 0);
        assert_eq!(counter.cumulative(), 1);
    }

    #[test]
    fn test_reset_restarts_count() {
        let mut counter = LostBeaconCounter::new(1);
        counter.record_miss();
        counter.reset();
        assert!(!counter.record_miss());
        assert!(counter.record_miss());
    }
}
