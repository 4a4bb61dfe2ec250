use serde::Serialize;

/// Exponentially weighted moving average. The first sample seeds the value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RollingAverage {
    value: f64,
    samples: u64,
    #[serde(skip)]
    alpha: f64,
}

impl RollingAverage {
    /// Create an empty average with smoothing factor `alpha`, clamped to (0, 1].
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() && alpha > 0.0 {
            alpha.min(1.0)
        } else {
            1.0
        };
        Self {
            value: 0.0,
            samples: 0,
            alpha,
        }
    }

    /// Fold one sample into the average.
    pub fn record(&mut self, sample: f64) {
        if self.samples == 0 {
            self.value = sample;
        } else {
            self.value += self.alpha * (sample - self.value);
        }
        self.samples += 1;
    }

    /// Current average, 0.0 before the first sample.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of samples folded in so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds() {
        let mut avg = RollingAverage::new(0.1);
        avg.record(10.0);
        assert!((avg.value() - 10.0).abs() < f64::EPSILON);
        assert_eq!(avg.samples(), 1);
    }

    #[test]
    fn later_samples_are_smoothed() {
        let mut avg = RollingAverage::new(0.5);
        avg.record(10.0);
        avg.record(20.0);
        assert!((avg.value() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_alpha_falls_back_to_last_sample() {
        let mut avg = RollingAverage::new(0.0);
        avg.record(1.0);
        avg.record(3.0);
        assert!((avg.value() - 3.0).abs() < f64::EPSILON);
    }
}
