//! Spectrum Analysis
//!
//! Turns the most recent block of mono samples into a smoothed,
//! log- or linear-banded [`SpectrumFrame`] for display.
//!
//! - [`RollingSampleWindow`]: circular buffer the audio path appends to
//! - [`BandTable`]: display band to FFT bin mapping
//! - [`SpectrumAnalyzer`]: window, transform, band reduction, smoothing

mod analyzer;
mod bands;
mod frame;
mod rolling;

pub use analyzer::SpectrumAnalyzer;
pub use bands::{BandRange, BandTable};
pub use frame::SpectrumFrame;
pub use rolling::RollingSampleWindow;
