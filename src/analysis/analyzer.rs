//! Spectrum Analyzer
//!
//! Per tick: copy the newest `fft_size` samples, take level metrics from the
//! raw block, apply a Hann window, transform, scale bin magnitudes by
//! `2 / fft_size`, reduce bins to display bands by maximum, and blend with
//! the previous frame using a one-pole smoother.
//!
//! All scratch buffers are allocated up front and reused on every tick.

use log::{debug, info, warn};
use num_complex::Complex64;

use super::bands::BandTable;
use super::frame::SpectrumFrame;
use super::rolling::RollingSampleWindow;
use crate::config::AnalyzerConfig;
use crate::dsp::{transform_real_into, WindowFunction, DEFAULT_SAMPLE_RATE};

/// Windowed FFT analyzer with band mapping and smoothing
#[derive(Debug, Clone)]
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    sample_rate: f64,
    window: Vec<f64>,
    bands: BandTable,
    smoothed: Vec<f64>,
    samples: Vec<f64>,
    windowed: Vec<f64>,
    spectrum: Vec<Complex64>,
    magnitudes: Vec<f64>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer; `config` is normalized first
    pub fn new(config: AnalyzerConfig, sample_rate: f64) -> Self {
        let config = config.normalized();
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        let fft_size = config.fft_size;

        Self {
            bands: BandTable::build(&config, sample_rate),
            smoothed: vec![0.0; config.num_bands],
            samples: vec![0.0; fft_size],
            windowed: vec![0.0; fft_size],
            spectrum: vec![Complex64::new(0.0, 0.0); fft_size],
            magnitudes: vec![0.0; fft_size / 2],
            window: (0..fft_size)
                .map(|i| WindowFunction::Hann.coefficient(i, fft_size))
                .collect(),
            config,
            sample_rate,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    pub fn band_table(&self) -> &BandTable {
        &self.bands
    }

    /// Replace the configuration
    ///
    /// Rebuilds the band table and scratch buffers and clears smoothing.
    pub fn reconfigure(&mut self, config: AnalyzerConfig) {
        let config = config.normalized();
        if config == self.config {
            return;
        }
        info!(
            "Analyzer reconfigured: fft {} -> {}, bands {} -> {}",
            self.config.fft_size, config.fft_size, self.config.num_bands, config.num_bands
        );
        *self = Self::new(config, self.sample_rate);
    }

    /// Rebuild the band mapping for a new stream rate
    ///
    /// Smoothing history is cleared since bins no longer line up. Invalid
    /// rates are ignored.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        if !sample_rate.is_finite() || sample_rate <= 0.0 || sample_rate == self.sample_rate {
            return;
        }
        debug!("Analyzer sample rate {} -> {}", self.sample_rate, sample_rate);
        self.sample_rate = sample_rate;
        self.bands = BandTable::build(&self.config, sample_rate);
        self.reset();
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }

    /// Copy the newest `fft_size` samples out of `window`
    ///
    /// A window smaller than the FFT leaves the tail zeroed.
    pub fn load_from(&mut self, window: &RollingSampleWindow) {
        let copied = window.copy_latest_into(&mut self.samples);
        self.samples[copied..].fill(0.0);
    }

    /// Load raw samples; anything past `fft_size` is ignored, missing tail is zeroed
    pub fn load_block(&mut self, block: &[f32]) {
        let count = block.len().min(self.samples.len());
        for (slot, &sample) in self.samples.iter_mut().zip(&block[..count]) {
            *slot = sample as f64;
        }
        self.samples[count..].fill(0.0);
    }

    /// Analyze whatever was last loaded
    ///
    /// The loaded block is left untouched, so repeated calls see the same
    /// input.
    pub fn compute(&mut self) -> SpectrumFrame {
        let fft_size = self.samples.len();

        let (sum_squares, peak_level) = self
            .samples
            .iter()
            .fold((0.0, 0.0_f64), |(sum, peak), &x| (sum + x * x, peak.max(x.abs())));
        let rms_level = (sum_squares / fft_size as f64).sqrt();

        for ((out, &x), &w) in self.windowed.iter_mut().zip(&self.samples).zip(&self.window) {
            *out = x * w;
        }
        if let Err(e) = transform_real_into(&self.windowed, &mut self.spectrum) {
            warn!("Spectrum transform failed: {}", e);
            return SpectrumFrame::silent(self.bands.center_frequencies());
        }

        let scale = 2.0 / fft_size as f64;
        let half = self.magnitudes.len();
        for (magnitude, bin) in self.magnitudes.iter_mut().zip(&self.spectrum[..half]) {
            *magnitude = bin.norm() * scale;
        }

        let peak_bin = self
            .magnitudes
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best })
            .0;
        let peak_frequency_hz = peak_bin as f64 * self.bands.bin_width();

        let alpha = self.config.smoothing_factor;
        for (smoothed, band) in self.smoothed.iter_mut().zip(self.bands.bands()) {
            let high = band.high_bin.min(half);
            let value = if band.low_bin >= high {
                0.0
            } else {
                self.magnitudes[band.low_bin..high]
                    .iter()
                    .copied()
                    .fold(0.0, f64::max)
            };
            *smoothed = alpha * *smoothed + (1.0 - alpha) * value;
        }

        SpectrumFrame {
            magnitudes: self.smoothed.clone(),
            band_frequencies: self.bands.center_frequencies(),
            peak_frequency_hz,
            rms_level,
            peak_level,
        }
    }

    /// Load from a rolling window and analyze
    pub fn analyze(&mut self, window: &RollingSampleWindow) -> SpectrumFrame {
        self.load_from(window);
        self.compute()
    }

    /// Analyze a raw mono block
    pub fn analyze_block(&mut self, block: &[f32]) -> SpectrumFrame {
        self.load_block(block);
        self.compute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sine(frequency: f64, amplitude: f64, sample_rate: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (amplitude * (2.0 * PI * frequency * i as f64 / sample_rate).sin()) as f32)
            .collect()
    }

    fn unsmoothed() -> AnalyzerConfig {
        AnalyzerConfig {
            smoothing_factor: 0.0,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn test_peak_frequency_within_one_bin() {
        let mut analyzer = SpectrumAnalyzer::new(unsmoothed(), 44100.0);
        let frame = analyzer.analyze_block(&sine(1000.0, 0.5, 44100.0, 4096));

        let bin_width = 44100.0 / 4096.0;
        assert!(
            (frame.peak_frequency_hz - 1000.0).abs() <= bin_width,
            "peak at {} Hz",
            frame.peak_frequency_hz
        );
    }

    #[test]
    fn test_levels_from_raw_block() {
        let mut analyzer = SpectrumAnalyzer::new(unsmoothed(), 44100.0);
        let frame = analyzer.analyze_block(&sine(1000.0, 0.5, 44100.0, 4096));

        assert_relative_eq!(frame.rms_level, 0.5 / 2.0_f64.sqrt(), epsilon = 2e-3);
        assert!(frame.peak_level <= 0.5 + 1e-6);
        assert!(frame.peak_level > 0.49);
    }

    #[test]
    fn test_loudest_band_contains_tone() {
        let mut analyzer = SpectrumAnalyzer::new(unsmoothed(), 44100.0);
        let frame = analyzer.analyze_block(&sine(1000.0, 0.5, 44100.0, 4096));

        let loudest = frame.loudest_band().unwrap();
        let band = analyzer.band_table().bands()[loudest];
        let bin_width = analyzer.band_table().bin_width();
        let tone_bin = (1000.0 / bin_width).round() as usize;
        assert!(band.low_bin <= tone_bin + 1 && tone_bin <= band.high_bin + 1);
        // Hann-windowed sine peaks near amplitude / 2 after 2/N scaling
        assert!(frame.magnitudes[loudest] > 0.2);
    }

    #[test]
    fn test_smoothing_converges() {
        let config = AnalyzerConfig {
            smoothing_factor: 0.5,
            ..AnalyzerConfig::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(config, 44100.0);
        let block = sine(1000.0, 0.5, 44100.0, 4096);

        let mut raw = SpectrumAnalyzer::new(unsmoothed(), 44100.0);
        let target = raw.analyze_block(&block);
        let i = target.loudest_band().unwrap();

        let first = analyzer.analyze_block(&block);
        assert_relative_eq!(first.magnitudes[i], 0.5 * target.magnitudes[i], max_relative = 1e-9);
        let second = analyzer.analyze_block(&block);
        assert_relative_eq!(second.magnitudes[i], 0.75 * target.magnitudes[i], max_relative = 1e-9);

        analyzer.reset();
        let after_reset = analyzer.analyze_block(&block);
        assert_relative_eq!(after_reset.magnitudes[i], first.magnitudes[i], max_relative = 1e-9);
    }

    #[test]
    fn test_silence_yields_zero_frame() {
        let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0);
        let frame = analyzer.analyze(&RollingSampleWindow::new(4096));

        assert_eq!(frame.num_bands(), 128);
        assert!(frame.magnitudes.iter().all(|&m| m == 0.0));
        assert_eq!(frame.rms_level, 0.0);
        assert_eq!(frame.peak_level, 0.0);
        assert_eq!(frame.peak_frequency_hz, 0.0);
    }

    #[test]
    fn test_repeated_compute_sees_raw_block() {
        let mut analyzer = SpectrumAnalyzer::new(unsmoothed(), 44100.0);
        analyzer.load_block(&sine(1000.0, 0.5, 44100.0, 4096));

        let first = analyzer.compute();
        let second = analyzer.compute();
        assert_eq!(first, second);
        assert_relative_eq!(second.rms_level, 0.5 / 2.0_f64.sqrt(), epsilon = 2e-3);
    }

    #[test]
    fn test_short_window_is_zero_padded() {
        let mut window = RollingSampleWindow::new(16);
        window.push_mono(&[1.0; 16]);

        let mut analyzer = SpectrumAnalyzer::new(unsmoothed(), 44100.0);
        let frame = analyzer.analyze(&window);
        assert_relative_eq!(frame.peak_level, 1.0);
        assert_relative_eq!(frame.rms_level, (16.0_f64 / 4096.0).sqrt(), max_relative = 1e-9);
    }

    #[test]
    fn test_reconfigure_and_sample_rate() {
        let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), 44100.0);
        analyzer.reconfigure(AnalyzerConfig {
            fft_size: 1000,
            num_bands: 32,
            ..AnalyzerConfig::default()
        });
        assert_eq!(analyzer.fft_size(), 1024);
        assert_eq!(analyzer.band_table().len(), 32);

        analyzer.set_sample_rate(96000.0);
        assert_eq!(analyzer.sample_rate(), 96000.0);
        assert_relative_eq!(analyzer.band_table().bin_width(), 93.75);

        analyzer.set_sample_rate(-1.0);
        assert_eq!(analyzer.sample_rate(), 96000.0);
    }
}
