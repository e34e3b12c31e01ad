//! Spectrum snapshot

use serde::{Deserialize, Serialize};

/// One analysis result
///
/// Built once per analysis tick and never mutated afterwards; publishing a
/// new frame replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumFrame {
    /// Smoothed linear magnitude per display band
    pub magnitudes: Vec<f64>,
    /// Center frequency of each band (Hz), parallel to `magnitudes`
    pub band_frequencies: Vec<f64>,
    /// Frequency of the loudest FFT bin (Hz)
    pub peak_frequency_hz: f64,
    /// RMS of the raw (unwindowed) analysis window
    pub rms_level: f64,
    /// Absolute peak of the raw analysis window
    pub peak_level: f64,
}

impl SpectrumFrame {
    /// All-zero frame over the given band centers
    pub fn silent(band_frequencies: Vec<f64>) -> Self {
        Self {
            magnitudes: vec![0.0; band_frequencies.len()],
            band_frequencies,
            ..Self::default()
        }
    }

    pub fn num_bands(&self) -> usize {
        self.magnitudes.len()
    }

    /// Band magnitudes in dBFS, floored at `floor_db`
    pub fn magnitudes_db(&self, floor_db: f64) -> Vec<f64> {
        self.magnitudes
            .iter()
            .map(|&m| {
                if m > 0.0 {
                    (20.0 * m.log10()).max(floor_db)
                } else {
                    floor_db
                }
            })
            .collect()
    }

    /// Index of the loudest band
    pub fn loudest_band(&self) -> Option<usize> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}
