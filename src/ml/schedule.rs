use serde::{Deserialize, Serialize};

/// Staircase exponential decay: the rate drops by `decay_rate`
/// once every `decay_steps` optimizer steps and stays flat in between.
///
/// `rate(step) = base_rate * decay_rate ^ floor(step / decay_steps)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaircaseDecay {
    pub base_rate:   f64,
    pub decay_rate:  f64,
    /// 0 disables decay.
    pub decay_steps: usize,
}

impl StaircaseDecay {
    pub fn new(base_rate: f64, decay_rate: f64, decay_steps: usize) -> Self {
        Self { base_rate, decay_rate, decay_steps }
    }

    pub fn rate_at(&self, step: usize) -> f64 {
        if self.decay_steps == 0 {
            return self.base_rate;
        }
        let stairs = (step / self.decay_steps).min(i32::MAX as usize) as i32;
        self.base_rate * self.decay_rate.powi(stairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staircase_values() {
        let s = StaircaseDecay::new(0.1, 0.5, 10);
        assert!((s.rate_at(0) - 0.1).abs() < 1e-12);
        assert!((s.rate_at(9) - 0.1).abs() < 1e-12);
        assert!((s.rate_at(10) - 0.05).abs() < 1e-12);
        assert!((s.rate_at(25) - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_zero_steps_is_constant() {
        let s = StaircaseDecay::new(1e-4, 0.96, 0);
        assert_eq!(s.rate_at(1_000_000), 1e-4);
    }

    #[test]
    fn test_never_increases() {
        let s = StaircaseDecay::new(1e-3, 0.96, 3);
        let rates: Vec<f64> = (0..30).map(|step| s.rate_at(step)).collect();
        assert!(rates.windows(2).all(|w| w[1] <= w[0]));
    }
}
