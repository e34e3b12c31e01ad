//! Realtime Bridge
//!
//! Splits the engine into three parts that live on different threads:
//!
//! - [`AudioProcessor`]: owned by the audio callback; filters blocks in
//!   place and appends the mono mix to the rolling window
//! - [`AnalysisWorker`]: owned by a UI timer or worker thread; runs the
//!   analyzer and publishes frames
//! - [`EngineHandle`]: cloned freely; parameter edits, state save/load,
//!   spectrum and response reads
//!
//! Parameters cross via atomics and a dirty flag, samples via a
//! short-held mutex around the rolling window, frames via an `Arc` swap.

mod audio;
mod engine;
mod handle;
mod params;
mod slot;
mod worker;

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

pub use audio::AudioProcessor;
pub use engine::{build, Engine, EqEngine};
pub use handle::EngineHandle;
pub use params::{EqParameters, ParameterId, BYPASS_PARAMETER_ID};
pub use slot::SpectrumSlot;
pub use worker::AnalysisWorker;

use crate::analysis::RollingSampleWindow;

/// State reachable from all three parts
#[derive(Debug)]
pub(crate) struct Shared {
    params: EqParameters,
    window: Mutex<RollingSampleWindow>,
    slot: SpectrumSlot,
    sample_rate: AtomicU64,
}

impl Shared {
    fn new(sample_rate: f64, window_len: usize) -> Self {
        Self {
            params: EqParameters::new(),
            window: Mutex::new(RollingSampleWindow::new(window_len)),
            slot: SpectrumSlot::default(),
            sample_rate: AtomicU64::new(sample_rate.to_bits()),
        }
    }

    fn sample_rate(&self) -> f64 {
        f64::from_bits(self.sample_rate.load(Ordering::Acquire))
    }
}
