//! Lock-free EQ parameter store
//!
//! Values are `f64` bit patterns in `AtomicU64`s. Writers clamp, store, then
//! raise the dirty flag with `Release`; the audio side clears it with
//! `Acquire` once per block and re-reads everything. A write that races the
//! re-read leaves the flag raised, so the next block picks it up again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::dsp::{
    BandParameter, EqBand, EqualizerState, MAX_FREQUENCY, MAX_GAIN_DB, MAX_Q, MIN_FREQUENCY,
    MIN_GAIN_DB, MIN_Q, NUM_BANDS,
};

const PARAMS_PER_BAND: u32 = 3;

/// Raw id of the global bypass parameter
pub const BYPASS_PARAMETER_ID: u32 = NUM_BANDS as u32 * PARAMS_PER_BAND;

/// Host-facing parameter identity
///
/// Ids are `band * 3 + {0 gain, 1 frequency, 2 q}` followed by bypass (15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterId {
    Band {
        band: usize,
        parameter: BandParameter,
    },
    Bypass,
}

impl ParameterId {
    /// Decode a raw host id; unknown ids give `None`
    pub fn from_raw(id: u32) -> Option<Self> {
        if id == BYPASS_PARAMETER_ID {
            return Some(ParameterId::Bypass);
        }
        if id > BYPASS_PARAMETER_ID {
            return None;
        }
        let parameter = match id % PARAMS_PER_BAND {
            0 => BandParameter::Gain,
            1 => BandParameter::Frequency,
            _ => BandParameter::Q,
        };
        Some(ParameterId::Band {
            band: (id / PARAMS_PER_BAND) as usize,
            parameter,
        })
    }

    pub fn raw(&self) -> u32 {
        match self {
            ParameterId::Band { band, parameter } => {
                let offset = match parameter {
                    BandParameter::Gain => 0,
                    BandParameter::Frequency => 1,
                    BandParameter::Q => 2,
                };
                *band as u32 * PARAMS_PER_BAND + offset
            }
            ParameterId::Bypass => BYPASS_PARAMETER_ID,
        }
    }

    /// Map a host value in [0, 1] to the plain domain
    ///
    /// Gain is linear in dB; frequency and Q are logarithmic. Bypass is
    /// 1.0 above 0.5, else 0.0.
    pub fn normalized_to_plain(&self, normalized: f64) -> f64 {
        let v = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self {
            ParameterId::Bypass => {
                if v > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParameterId::Band { parameter, .. } => match parameter {
                BandParameter::Gain => MIN_GAIN_DB + v * (MAX_GAIN_DB - MIN_GAIN_DB),
                BandParameter::Frequency => log_lerp(MIN_FREQUENCY, MAX_FREQUENCY, v),
                BandParameter::Q => log_lerp(MIN_Q, MAX_Q, v),
            },
        }
    }

    /// Inverse of [`normalized_to_plain`](Self::normalized_to_plain); plain values are clamped first
    pub fn plain_to_normalized(&self, plain: f64) -> f64 {
        match self {
            ParameterId::Bypass => {
                if plain > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParameterId::Band { parameter, .. } => {
                let value = parameter.clamp(plain);
                match parameter {
                    BandParameter::Gain => (value - MIN_GAIN_DB) / (MAX_GAIN_DB - MIN_GAIN_DB),
                    BandParameter::Frequency => log_position(MIN_FREQUENCY, MAX_FREQUENCY, value),
                    BandParameter::Q => log_position(MIN_Q, MAX_Q, value),
                }
            }
        }
    }
}

fn log_lerp(min: f64, max: f64, t: f64) -> f64 {
    min * (max / min).powf(t)
}

fn log_position(min: f64, max: f64, value: f64) -> f64 {
    (value / min).ln() / (max / min).ln()
}

fn slot(parameter: BandParameter) -> usize {
    match parameter {
        BandParameter::Gain => 0,
        BandParameter::Frequency => 1,
        BandParameter::Q => 2,
    }
}

/// Shared EQ parameters written by the control side, read by the audio side
#[derive(Debug)]
pub struct EqParameters {
    values: [[AtomicU64; 3]; NUM_BANDS],
    enabled: [AtomicBool; NUM_BANDS],
    bypass: AtomicBool,
    dirty: AtomicBool,
}

impl Default for EqParameters {
    fn default() -> Self {
        Self::from_state(&EqualizerState::default())
    }
}

impl EqParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from `state` (values clamped), marked dirty
    pub fn from_state(state: &EqualizerState) -> Self {
        let params = Self {
            values: std::array::from_fn(|_| std::array::from_fn(|_| AtomicU64::new(0))),
            enabled: std::array::from_fn(|_| AtomicBool::new(true)),
            bypass: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        };
        params.store_state(state);
        params
    }

    /// Clamp and store one band parameter
    ///
    /// Out-of-range bands and non-finite values are ignored.
    pub fn set(&self, band: usize, parameter: BandParameter, value: f64) {
        if band >= NUM_BANDS || !value.is_finite() {
            return;
        }
        self.values[band][slot(parameter)].store(parameter.clamp(value).to_bits(), Ordering::Relaxed);
        self.mark_dirty();
    }

    /// Current value of one band parameter, or `None` for a bad band index
    pub fn get(&self, band: usize, parameter: BandParameter) -> Option<f64> {
        self.values
            .get(band)
            .map(|v| f64::from_bits(v[slot(parameter)].load(Ordering::Relaxed)))
    }

    pub fn set_enabled(&self, band: usize, enabled: bool) {
        if let Some(flag) = self.enabled.get(band) {
            flag.store(enabled, Ordering::Relaxed);
            self.mark_dirty();
        }
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
        self.mark_dirty();
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass.load(Ordering::Relaxed)
    }

    /// Apply a host edit given as a raw id and a normalized value
    ///
    /// Returns `false` for unknown ids, which are otherwise ignored.
    pub fn set_normalized(&self, id: u32, normalized: f64) -> bool {
        let Some(parameter_id) = ParameterId::from_raw(id) else {
            return false;
        };
        let plain = parameter_id.normalized_to_plain(normalized);
        match parameter_id {
            ParameterId::Band { band, parameter } => self.set(band, parameter, plain),
            ParameterId::Bypass => self.set_bypass(plain > 0.5),
        }
        true
    }

    /// Current value of a host parameter in [0, 1]
    pub fn get_normalized(&self, id: u32) -> Option<f64> {
        let parameter_id = ParameterId::from_raw(id)?;
        let plain = match parameter_id {
            ParameterId::Band { band, parameter } => self.get(band, parameter)?,
            ParameterId::Bypass => f64::from(u8::from(self.is_bypassed())),
        };
        Some(parameter_id.plain_to_normalized(plain))
    }

    /// Store every band and the bypass flag, then raise the dirty flag once
    ///
    /// Non-finite values keep the stored value.
    pub fn store_state(&self, state: &EqualizerState) {
        for (band, incoming) in state.bands.iter().enumerate() {
            for parameter in [BandParameter::Gain, BandParameter::Frequency, BandParameter::Q] {
                let value = incoming.get(parameter);
                if value.is_finite() {
                    self.values[band][slot(parameter)]
                        .store(parameter.clamp(value).to_bits(), Ordering::Relaxed);
                }
            }
            self.enabled[band].store(incoming.enabled, Ordering::Relaxed);
        }
        self.bypass.store(state.bypass, Ordering::Relaxed);
        self.mark_dirty();
    }

    /// Copy of the current values
    pub fn snapshot(&self) -> EqualizerState {
        let mut state = EqualizerState::default();
        for (index, band) in state.bands.iter_mut().enumerate() {
            let value = |i: usize| f64::from_bits(self.values[index][i].load(Ordering::Relaxed));
            *band = EqBand {
                gain_db: value(0),
                frequency: value(1),
                q: value(2),
                enabled: self.enabled[index].load(Ordering::Relaxed),
            };
        }
        state.bypass = self.is_bypassed();
        state
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clear the dirty flag, returning whether it was set
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::Acquire)
    }
}
