//! Engine and analyzer configuration
//!
//! Both structs deserialize from partial JSON documents; missing fields take
//! their defaults. [`EngineConfig::normalized`] repairs anything fixable
//! (rounding the FFT size, clamping smoothing) so the engine never has to
//! reject a slider value.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dsp::{next_power_of_two, DEFAULT_SAMPLE_RATE};
use crate::error::{EngineError, Result};

/// Smallest FFT the analyzer will run
pub const MIN_FFT_SIZE: usize = 2;

/// Largest FFT the analyzer will run
pub const MAX_FFT_SIZE: usize = 1 << 16;

/// Spectrum analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// FFT window size (rounded up to a power of two)
    pub fft_size: usize,
    /// Minimum number of new samples between analyses (0 = every tick)
    pub hop_size: usize,
    /// One-pole smoothing factor in [0, 1]; higher is smoother
    pub smoothing_factor: f64,
    /// Lowest displayed frequency (Hz)
    pub min_frequency: f64,
    /// Highest displayed frequency (Hz), capped at Nyquist
    pub max_frequency: f64,
    /// Number of display bands
    pub num_bands: usize,
    /// Logarithmic (true) or linear band spacing
    pub use_log_scale: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            hop_size: 1024,
            smoothing_factor: 0.7,
            min_frequency: 20.0,
            max_frequency: 20000.0,
            num_bands: 128,
            use_log_scale: true,
        }
    }
}

impl AnalyzerConfig {
    /// Repair out-of-range values
    ///
    /// - `fft_size` clamped to [`MIN_FFT_SIZE`, `MAX_FFT_SIZE`], then rounded up
    ///   to a power of two
    /// - `num_bands` at least 1
    /// - `smoothing_factor` clamped to [0, 1] (non-finite falls back to default)
    /// - frequency range made positive, finite and increasing
    pub fn normalized(&self) -> Self {
        let defaults = Self::default();

        let smoothing_factor = if self.smoothing_factor.is_finite() {
            self.smoothing_factor.clamp(0.0, 1.0)
        } else {
            defaults.smoothing_factor
        };

        let min_frequency = if self.min_frequency.is_finite() && self.min_frequency > 0.0 {
            self.min_frequency
        } else {
            defaults.min_frequency
        };
        let max_frequency = if self.max_frequency.is_finite() && self.max_frequency > min_frequency {
            self.max_frequency
        } else {
            (min_frequency * 2.0).max(defaults.max_frequency)
        };

        let normalized = Self {
            fft_size: next_power_of_two(self.fft_size.clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)),
            hop_size: self.hop_size,
            smoothing_factor,
            min_frequency,
            max_frequency,
            num_bands: self.num_bands.max(1),
            use_log_scale: self.use_log_scale,
        };
        if normalized != *self {
            debug!("Analyzer config normalized: {:?} -> {:?}", self, normalized);
        }
        normalized
    }
}

/// Top-level engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stream sample rate (Hz)
    pub sample_rate: f64,
    /// Interleaved channel count of incoming blocks
    pub channels: usize,
    /// Spectrum analyzer settings
    pub analyzer: AnalyzerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 2,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings that cannot be repaired
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!("sample rate must be positive, got {}", self.sample_rate),
            });
        }
        if self.channels == 0 {
            return Err(EngineError::InvalidConfig {
                reason: "channel count must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Copy with the analyzer settings repaired
    pub fn normalized(&self) -> Self {
        Self {
            analyzer: self.analyzer.normalized(),
            ..self.clone()
        }
    }
}
