//! DSP Building Blocks
//!
//! Transform, windowing and filtering primitives plus the 5-band
//! parametric equalizer built on top of them.

mod biquad;
mod eq;
mod fft;
mod window;

pub use biquad::{BiquadCoefficients, BiquadFilter, FilterState, MAX_CHANNELS};
pub use eq::{
    BandParameter, EqBand, Equalizer, EqualizerState, DEFAULT_FREQUENCIES, DEFAULT_Q,
    DEFAULT_SAMPLE_RATE, MAX_FREQUENCY, MAX_GAIN_DB, MAX_Q, MIN_FREQUENCY, MIN_GAIN_DB, MIN_Q,
    NUM_BANDS,
};
pub use fft::{
    inverse, is_power_of_two, magnitude, next_power_of_two, power_db, transform,
    transform_in_place, transform_real_into,
};
pub use window::WindowFunction;
