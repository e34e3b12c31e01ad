//! Control/UI side of the bridge

use std::sync::Arc;

use log::{debug, warn};

use super::Shared;
use crate::analysis::SpectrumFrame;
use crate::dsp::{BandParameter, Equalizer, EqualizerState, DEFAULT_Q};
use crate::error::Result;

/// Cloneable handle for parameter edits, state save/load and spectrum reads
///
/// Every method is safe to call from any thread and never waits on the
/// audio callback.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    shared: Arc<Shared>,
}

impl EngineHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn set_band_gain(&self, index: usize, gain_db: f64) {
        self.shared.params.set(index, BandParameter::Gain, gain_db);
    }

    pub fn set_band_frequency(&self, index: usize, frequency: f64) {
        self.shared.params.set(index, BandParameter::Frequency, frequency);
    }

    pub fn set_band_q(&self, index: usize, q: f64) {
        self.shared.params.set(index, BandParameter::Q, q);
    }

    pub fn set_band_parameter(&self, index: usize, parameter: BandParameter, value: f64) {
        self.shared.params.set(index, parameter, value);
    }

    pub fn set_band_enabled(&self, index: usize, enabled: bool) {
        self.shared.params.set_enabled(index, enabled);
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.shared.params.set_bypass(bypass);
    }

    pub fn is_bypassed(&self) -> bool {
        self.shared.params.is_bypassed()
    }

    /// Host automation edit; returns `false` for an unknown parameter id
    pub fn set_normalized(&self, id: u32, normalized: f64) -> bool {
        self.shared.params.set_normalized(id, normalized)
    }

    pub fn get_normalized(&self, id: u32) -> Option<f64> {
        self.shared.params.get_normalized(id)
    }

    /// Gain of a band in dB (0 for bad indices)
    pub fn band_gain(&self, index: usize) -> f64 {
        self.shared.params.get(index, BandParameter::Gain).unwrap_or(0.0)
    }

    /// Frequency of a band in Hz (1000 for bad indices)
    pub fn band_frequency(&self, index: usize) -> f64 {
        self.shared
            .params
            .get(index, BandParameter::Frequency)
            .unwrap_or(1000.0)
    }

    /// Q of a band (0.707 for bad indices)
    pub fn band_q(&self, index: usize) -> f64 {
        self.shared.params.get(index, BandParameter::Q).unwrap_or(DEFAULT_Q)
    }

    pub fn sample_rate(&self) -> f64 {
        self.shared.sample_rate()
    }

    /// Current bands and bypass flag
    pub fn state(&self) -> EqualizerState {
        self.shared.params.snapshot()
    }

    /// Replace every band and the bypass flag (values clamped)
    pub fn apply_state(&self, state: &EqualizerState) {
        self.shared.params.store_state(state);
    }

    /// Encode the current state in the persisted byte layout
    pub fn serialize_state(&self) -> Vec<u8> {
        self.state().to_bytes()
    }

    /// Decode and apply a persisted state
    ///
    /// The bytes are fully decoded before anything is applied, so on error
    /// the current state is untouched.
    pub fn deserialize_state(&self, bytes: &[u8]) -> Result<()> {
        match EqualizerState::from_bytes(bytes) {
            Ok(state) => {
                debug!("Restored EQ state (bypass: {})", state.bypass);
                self.apply_state(&state);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected persisted EQ state: {}", e);
                Err(e)
            }
        }
    }

    /// Latest published spectrum
    pub fn spectrum_snapshot(&self) -> Arc<SpectrumFrame> {
        self.shared.slot.snapshot()
    }

    /// Combined EQ response at `frequency` in dB, from the current parameters
    ///
    /// Ignores bypass so the curve can be drawn while bypassed.
    pub fn response_at(&self, frequency: f64) -> f64 {
        self.preview_equalizer().response_at(frequency)
    }

    /// [`response_at`](Self::response_at) over many frequencies
    pub fn response_curve(&self, frequencies: &[f64]) -> Vec<f64> {
        let eq = self.preview_equalizer();
        frequencies.iter().map(|&f| eq.response_at(f)).collect()
    }

    fn preview_equalizer(&self) -> Equalizer {
        let mut eq = Equalizer::with_sample_rate(self.sample_rate());
        eq.apply_state(&self.state());
        eq
    }
}
