use std::time::Duration;

/// Fixed game timings
#[derive(Debug, Clone)]
pub struct SessionTiming {
    /// Shortest delay between trial start and the light coming on
    pub onset_min_ms: u64,
    /// Width of the uniform onset range above `onset_min_ms`
    pub onset_span_ms: u64,
    pub response_window_ms: u64,
    /// Pause between one trial's result and the next trial
    pub cooldown_ms: u64,
    /// How long the summary stays up before the session resets
    pub summary_hold_ms: u64,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            onset_min_ms: 300,
            onset_span_ms: 700,
            response_window_ms: 300,
            cooldown_ms: 1500,
            summary_hold_ms: 6000,
        }
    }
}

impl SessionTiming {
    /// Maps a unit sample in `[0, 1)` onto the onset range
    pub fn onset_delay(&self, unit: f64) -> Duration {
        let ms = self.onset_min_ms as f64 + unit.clamp(0.0, 1.0) * self.onset_span_ms as f64;
        Duration::from_nanos((ms * 1_000_000.0) as u64)
    }

    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.response_window_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn summary_hold(&self) -> Duration {
        Duration::from_millis(self.summary_hold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onset_range_bounds() {
        let t = SessionTiming::default();
        assert_eq!(t.onset_delay(0.0), Duration::from_millis(300));
        assert_eq!(t.onset_delay(0.5), Duration::from_millis(650));
        assert!(t.onset_delay(0.999_999) < Duration::from_millis(1000));
    }
}
