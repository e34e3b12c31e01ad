//! Audio-callback side of the bridge
//!
//! Nothing here allocates, logs or waits on anything but the rolling window
//! lock, which the analysis side holds only while copying samples out.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::Shared;
use crate::dsp::Equalizer;

/// Real-time processor: filters blocks in place and feeds the analyzer
///
/// Owned by the audio thread. Parameter edits made through an
/// [`EngineHandle`](super::EngineHandle) are applied at the start of the
/// next block.
#[derive(Debug)]
pub struct AudioProcessor {
    eq: Equalizer,
    shared: Arc<Shared>,
}

impl AudioProcessor {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        let eq = Equalizer::with_sample_rate(shared.sample_rate());
        let mut processor = Self { eq, shared };
        processor.sync_parameters();
        processor
    }

    /// Pull pending edits into the filters; at most once per block
    fn sync_parameters(&mut self) {
        if self.shared.params.take_dirty() {
            let state = self.shared.params.snapshot();
            self.eq.apply_state(&state);
        }
    }

    /// Filter an interleaved block in place and append its mono mix for analysis
    pub fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        self.sync_parameters();
        self.eq.process_interleaved(buffer, channels);
        self.shared.window.lock().push_interleaved(buffer, channels);
    }

    /// Filter planar stereo channels in place
    ///
    /// Only the common length of the two channels is processed.
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.sync_parameters();
        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            self.eq.process(l, r);
        }
        self.shared.window.lock().push_stereo(left, right);
    }

    /// Filter a mono block in place
    pub fn process_mono(&mut self, buffer: &mut [f32]) {
        self.sync_parameters();
        for sample in buffer.iter_mut() {
            *sample = self.eq.process_mono(*sample);
        }
        self.shared.window.lock().push_mono(buffer);
    }

    /// Prepare for a (new) stream rate
    ///
    /// Retunes the filters, clears filter memory and the rolling window and
    /// publishes the rate for the analysis side. Call outside the callback.
    pub fn prepare(&mut self, sample_rate: f64) {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return;
        }
        self.eq.set_sample_rate(sample_rate);
        self.shared
            .sample_rate
            .store(sample_rate.to_bits(), Ordering::Release);
        self.shared.window.lock().clear();
    }

    /// Transport reactivation: clear filter memory and the rolling window
    pub fn reset(&mut self) {
        self.eq.reset();
        self.shared.window.lock().clear();
    }

    pub fn sample_rate(&self) -> f64 {
        self.eq.sample_rate()
    }

    /// Filter settings the audio side is currently running
    pub fn equalizer(&self) -> &Equalizer {
        &self.eq
    }
}
