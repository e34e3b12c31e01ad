//! 5-band parametric equalizer
//!
//! Five peaking biquad sections in series with fixed band order. Setters
//! clamp instead of rejecting and ignore bad band indices, so a stray UI or
//! automation value can never take the audio path down.

use super::biquad::BiquadFilter;
use serde::{Deserialize, Serialize};

/// Number of EQ bands
pub const NUM_BANDS: usize = 5;

/// Factory center frequencies, one per band (Hz)
pub const DEFAULT_FREQUENCIES: [f64; NUM_BANDS] = [60.0, 250.0, 1000.0, 4000.0, 12000.0];

pub const MIN_FREQUENCY: f64 = 20.0;
pub const MAX_FREQUENCY: f64 = 20000.0;
pub const MIN_GAIN_DB: f64 = -12.0;
pub const MAX_GAIN_DB: f64 = 12.0;
pub const MIN_Q: f64 = 0.1;
pub const MAX_Q: f64 = 10.0;
pub const DEFAULT_Q: f64 = 0.707;

/// Sample rate used until the host or device reports one
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Bands with |gain| at or below this are skipped entirely
const ACTIVE_GAIN_THRESHOLD_DB: f64 = 0.01;

/// Which parameter of a band an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandParameter {
    Gain,
    Frequency,
    Q,
}

impl BandParameter {
    /// Clamp `value` into this parameter's domain
    pub fn clamp(&self, value: f64) -> f64 {
        match self {
            BandParameter::Gain => value.clamp(MIN_GAIN_DB, MAX_GAIN_DB),
            BandParameter::Frequency => value.clamp(MIN_FREQUENCY, MAX_FREQUENCY),
            BandParameter::Q => value.clamp(MIN_Q, MAX_Q),
        }
    }

    /// (min, max) of this parameter's domain
    pub fn range(&self) -> (f64, f64) {
        match self {
            BandParameter::Gain => (MIN_GAIN_DB, MAX_GAIN_DB),
            BandParameter::Frequency => (MIN_FREQUENCY, MAX_FREQUENCY),
            BandParameter::Q => (MIN_Q, MAX_Q),
        }
    }
}

/// Single EQ band configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    /// Center frequency in Hz (20-20000)
    pub frequency: f64,
    /// Gain in dB (-12 to +12)
    #[serde(rename = "gain_db")]
    pub gain_db: f64,
    /// Q factor / bandwidth (0.1 to 10.0)
    pub q: f64,
    /// Whether this band is enabled
    pub enabled: bool,
}

impl Default for EqBand {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            gain_db: 0.0,
            q: DEFAULT_Q,
            enabled: true,
        }
    }
}

impl EqBand {
    /// Create an enabled band, clamping every value into its domain
    pub fn new(frequency: f64, gain_db: f64, q: f64) -> Self {
        Self {
            frequency: BandParameter::Frequency.clamp(frequency),
            gain_db: BandParameter::Gain.clamp(gain_db),
            q: BandParameter::Q.clamp(q),
            enabled: true,
        }
    }

    /// Read one parameter
    pub fn get(&self, parameter: BandParameter) -> f64 {
        match parameter {
            BandParameter::Gain => self.gain_db,
            BandParameter::Frequency => self.frequency,
            BandParameter::Q => self.q,
        }
    }

    /// Whether the band contributes to processing and the response curve
    pub fn is_active(&self) -> bool {
        self.enabled && self.gain_db.abs() > ACTIVE_GAIN_THRESHOLD_DB
    }
}

/// Full persisted EQ state: five bands in fixed order plus bypass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualizerState {
    pub bands: [EqBand; NUM_BANDS],
    pub bypass: bool,
}

impl Default for EqualizerState {
    /// Factory defaults: 60/250/1k/4k/12k Hz, flat, Q 0.707
    fn default() -> Self {
        Self {
            bands: DEFAULT_FREQUENCIES.map(|frequency| EqBand {
                frequency,
                ..EqBand::default()
            }),
            bypass: false,
        }
    }
}

/// 5-band parametric EQ
#[derive(Debug, Clone)]
pub struct Equalizer {
    bands: [EqBand; NUM_BANDS],
    filters: [BiquadFilter; NUM_BANDS],
    sample_rate: f64,
    bypass: bool,
}

impl Default for Equalizer {
    fn default() -> Self {
        Self::with_sample_rate(DEFAULT_SAMPLE_RATE)
    }
}

impl Equalizer {
    /// Create a flat EQ at the default sample rate
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flat EQ tuned for `sample_rate`
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        let defaults = EqualizerState::default();
        let mut eq = Self {
            bands: defaults.bands,
            filters: Default::default(),
            sample_rate: if sample_rate.is_finite() && sample_rate > 0.0 {
                sample_rate
            } else {
                DEFAULT_SAMPLE_RATE
            },
            bypass: defaults.bypass,
        };
        eq.update_all_filters();
        eq
    }

    /// Current sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Retune every band for a new sample rate and clear filter memory
    ///
    /// Non-positive or non-finite rates are ignored.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return;
        }
        self.sample_rate = sample_rate;
        self.update_all_filters();
        self.reset();
    }

    /// Clear filter memory without touching parameters
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    pub fn set_band_gain(&mut self, index: usize, gain_db: f64) {
        self.set_band_parameter(index, BandParameter::Gain, gain_db);
    }

    pub fn set_band_frequency(&mut self, index: usize, frequency: f64) {
        self.set_band_parameter(index, BandParameter::Frequency, frequency);
    }

    pub fn set_band_q(&mut self, index: usize, q: f64) {
        self.set_band_parameter(index, BandParameter::Q, q);
    }

    /// Clamp and store one band parameter, then retune that band
    ///
    /// Out-of-range indices and non-finite values are ignored.
    pub fn set_band_parameter(&mut self, index: usize, parameter: BandParameter, value: f64) {
        if index >= NUM_BANDS || !value.is_finite() {
            return;
        }
        let value = parameter.clamp(value);
        let band = &mut self.bands[index];
        match parameter {
            BandParameter::Gain => band.gain_db = value,
            BandParameter::Frequency => band.frequency = value,
            BandParameter::Q => band.q = value,
        }
        self.update_filter(index);
    }

    /// Enable or disable a single band
    pub fn set_band_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(band) = self.bands.get_mut(index) {
            band.enabled = enabled;
        }
    }

    /// Get a band by index
    pub fn band(&self, index: usize) -> Option<&EqBand> {
        self.bands.get(index)
    }

    /// All bands in fixed order
    pub fn bands(&self) -> &[EqBand; NUM_BANDS] {
        &self.bands
    }

    /// Gain of a band in dB (0 for bad indices)
    pub fn band_gain(&self, index: usize) -> f64 {
        self.band(index).map_or(0.0, |b| b.gain_db)
    }

    /// Frequency of a band in Hz (1000 for bad indices)
    pub fn band_frequency(&self, index: usize) -> f64 {
        self.band(index).map_or(1000.0, |b| b.frequency)
    }

    /// Q of a band (0.707 for bad indices)
    pub fn band_q(&self, index: usize) -> f64 {
        self.band(index).map_or(DEFAULT_Q, |b| b.q)
    }

    /// Skip all processing. Filter memory is left alone so toggling is click-free.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Process one stereo frame in place
    #[inline]
    pub fn process(&mut self, left: &mut f32, right: &mut f32) {
        if self.bypass {
            return;
        }
        for (band, filter) in self.bands.iter().zip(self.filters.iter_mut()) {
            if band.is_active() {
                *left = filter.process(*left, 0);
                *right = filter.process(*right, 1);
            }
        }
    }

    /// Process one mono sample
    #[inline]
    pub fn process_mono(&mut self, sample: f32) -> f32 {
        if self.bypass {
            return sample;
        }
        let mut output = sample;
        for (band, filter) in self.bands.iter().zip(self.filters.iter_mut()) {
            if band.is_active() {
                output = filter.process(output, 0);
            }
        }
        output
    }

    /// Process an interleaved block in place
    ///
    /// Only the first two channels are filtered; any others pass through.
    pub fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        if self.bypass || channels == 0 {
            return;
        }
        let filtered = channels.min(2);
        for frame in buffer.chunks_mut(channels) {
            for (channel, sample) in frame.iter_mut().take(filtered).enumerate() {
                for (band, filter) in self.bands.iter().zip(self.filters.iter_mut()) {
                    if band.is_active() {
                        *sample = filter.process(*sample, channel);
                    }
                }
            }
        }
    }

    /// Combined response of all active bands at `frequency`, in dB
    ///
    /// Computed from the coefficients alone, independent of live audio.
    pub fn response_at(&self, frequency: f64) -> f64 {
        let magnitude: f64 = self
            .bands
            .iter()
            .zip(self.filters.iter())
            .filter(|(band, _)| band.is_active())
            .map(|(_, filter)| filter.magnitude_at(frequency, self.sample_rate))
            .product();
        20.0 * magnitude.log10()
    }

    /// Snapshot of bands and bypass
    pub fn state(&self) -> EqualizerState {
        EqualizerState {
            bands: self.bands,
            bypass: self.bypass,
        }
    }

    /// Apply a full state, clamping each value as the setters do
    ///
    /// Each band is retuned exactly once.
    pub fn apply_state(&mut self, state: &EqualizerState) {
        for (index, incoming) in state.bands.iter().enumerate() {
            let band = &mut self.bands[index];
            for parameter in [BandParameter::Gain, BandParameter::Frequency, BandParameter::Q] {
                let value = incoming.get(parameter);
                if !value.is_finite() {
                    continue;
                }
                let value = parameter.clamp(value);
                match parameter {
                    BandParameter::Gain => band.gain_db = value,
                    BandParameter::Frequency => band.frequency = value,
                    BandParameter::Q => band.q = value,
                }
            }
            band.enabled = incoming.enabled;
            self.update_filter(index);
        }
        self.bypass = state.bypass;
    }

    fn update_filter(&mut self, index: usize) {
        let band = self.bands[index];
        self.filters[index].set_peaking_eq(self.sample_rate, band.frequency, band.gain_db, band.q);
    }

    fn update_all_filters(&mut self) {
        for index in 0..NUM_BANDS {
            self.update_filter(index);
        }
    }
}
