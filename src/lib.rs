//! SpectrumEQ - Real-time Spectrum Analysis and Parametric EQ
//!
//! A signal-processing engine for live audio: a 5-band peaking equalizer
//! that runs inside the audio callback, and a windowed FFT analyzer that
//! turns the filtered stream into a smoothed, banded spectrum for display.
//!
//! # Architecture
//!
//! - `dsp`: FFT, window functions, biquad sections and the equalizer
//! - `analysis`: rolling sample window, band mapping, spectrum analyzer
//! - `bridge`: audio/analysis/control split with lock-light handoff
//! - `state`: persisted EQ state byte layout
//! - `config`: serde-backed engine and analyzer settings

pub mod analysis;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod error;
pub mod state;

pub use bridge::{build, AnalysisWorker, AudioProcessor, Engine, EngineHandle, EqEngine};
pub use config::{AnalyzerConfig, EngineConfig};
pub use error::{EngineError, Result};
