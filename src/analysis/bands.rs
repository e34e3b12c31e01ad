//! Display band to FFT bin mapping

use log::debug;

use crate::config::AnalyzerConfig;

/// One display band: a half-open bin range `[low_bin, high_bin)` and its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRange {
    pub low_bin: usize,
    pub high_bin: usize,
    /// Geometric (log scale) or arithmetic (linear scale) mean of the band edges
    pub center_frequency: f64,
}

impl BandRange {
    /// Number of bins covered
    pub fn width(&self) -> usize {
        self.high_bin - self.low_bin
    }
}

/// Precomputed mapping from display bands to FFT bins
///
/// Every band covers at least one bin, so none is ever silently empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    bands: Vec<BandRange>,
    bin_width: f64,
}

impl BandTable {
    /// Build the table for `config` at `sample_rate`
    ///
    /// The upper frequency is capped at Nyquist. `config` is expected to be
    /// normalized (power-of-two FFT size, positive increasing range).
    pub fn build(config: &AnalyzerConfig, sample_rate: f64) -> Self {
        let num_bands = config.num_bands.max(1);
        let bin_width = sample_rate / config.fft_size.max(1) as f64;
        let min_freq = config.min_frequency;
        let max_freq = config.max_frequency.min(sample_rate / 2.0).max(min_freq);

        let edges = |i: usize| -> (f64, f64) {
            if config.use_log_scale {
                let log_min = min_freq.log10();
                let step = (max_freq.log10() - log_min) / num_bands as f64;
                (
                    10.0_f64.powf(log_min + i as f64 * step),
                    10.0_f64.powf(log_min + (i + 1) as f64 * step),
                )
            } else {
                let step = (max_freq - min_freq) / num_bands as f64;
                (min_freq + i as f64 * step, min_freq + (i + 1) as f64 * step)
            }
        };

        let bands = (0..num_bands)
            .map(|i| {
                let (freq_low, freq_high) = edges(i);
                let center_frequency = if config.use_log_scale {
                    (freq_low * freq_high).sqrt()
                } else {
                    (freq_low + freq_high) / 2.0
                };

                let low_bin = (freq_low / bin_width) as usize;
                let mut high_bin = (freq_high / bin_width) as usize;
                if high_bin <= low_bin {
                    high_bin = low_bin + 1;
                }

                BandRange {
                    low_bin,
                    high_bin,
                    center_frequency,
                }
            })
            .collect();

        debug!(
            "Built {} {} bands over {:.1}-{:.1} Hz (bin width {:.3} Hz)",
            num_bands,
            if config.use_log_scale { "log" } else { "linear" },
            min_freq,
            max_freq,
            bin_width
        );

        Self { bands, bin_width }
    }

    pub fn bands(&self) -> &[BandRange] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Hz per FFT bin
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Band center frequencies in band order
    pub fn center_frequencies(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.center_frequency).collect()
    }
}
