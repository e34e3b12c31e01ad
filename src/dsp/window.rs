//! Window functions
//!
//! Plain elementwise multipliers applied by the caller before a transform.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tapering window applied to a block before the FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunction {
    /// `0.5·(1 − cos(2πi/(N−1)))`
    #[default]
    Hann,
    /// `0.54 − 0.46·cos(2πi/(N−1))`
    Hamming,
    /// Three-term cosine: `0.42 − 0.5·cos(2πi/(N−1)) + 0.08·cos(4πi/(N−1))`
    Blackman,
}

impl WindowFunction {
    /// Multiplier for sample `i` of an `n`-sample window
    ///
    /// Windows of length 0 or 1 are all ones.
    pub fn coefficient(&self, i: usize, n: usize) -> f64 {
        if n <= 1 {
            return 1.0;
        }
        let phase = 2.0 * PI * i as f64 / (n - 1) as f64;
        match self {
            WindowFunction::Hann => 0.5 * (1.0 - phase.cos()),
            WindowFunction::Hamming => 0.54 - 0.46 * phase.cos(),
            WindowFunction::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
        }
    }

    /// Window `samples` in place
    pub fn apply(&self, samples: &mut [f64]) {
        let n = samples.len();
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample *= self.coefficient(i, n);
        }
    }

    /// Windowed copy of `samples`
    pub fn applied(&self, samples: &[f64]) -> Vec<f64> {
        let mut out = samples.to_vec();
        self.apply(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(WindowFunction::Hann, 0.0 ; "hann")]
    #[test_case(WindowFunction::Hamming, 0.08 ; "hamming")]
    #[test_case(WindowFunction::Blackman, 0.0 ; "blackman")]
    fn test_window_edges_and_center(window: WindowFunction, edge: f64) {
        let n = 65;
        assert_relative_eq!(window.coefficient(0, n), edge, epsilon = 1e-12);
        assert_relative_eq!(window.coefficient(n - 1, n), edge, epsilon = 1e-12);
        assert_relative_eq!(window.coefficient(n / 2, n), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_is_symmetric() {
        let n = 128;
        for window in [WindowFunction::Hann, WindowFunction::Hamming, WindowFunction::Blackman] {
            for i in 0..n / 2 {
                assert_relative_eq!(
                    window.coefficient(i, n),
                    window.coefficient(n - 1 - i, n),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_apply_matches_applied() {
        let samples = vec![1.0; 16];
        let copy = WindowFunction::Hann.applied(&samples);

        let mut in_place = samples.clone();
        WindowFunction::Hann.apply(&mut in_place);

        assert_eq!(copy, in_place);
        assert_eq!(samples, vec![1.0; 16]);
    }

    #[test]
    fn test_degenerate_lengths() {
        let mut one = [0.5];
        WindowFunction::Blackman.apply(&mut one);
        assert_eq!(one, [0.5]);

        let mut empty: [f64; 0] = [];
        WindowFunction::Hann.apply(&mut empty);
    }
}
