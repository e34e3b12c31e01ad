//! Analysis side of the bridge

use std::sync::Arc;

use log::{debug, info};

use super::Shared;
use crate::analysis::{RollingSampleWindow, SpectrumAnalyzer, SpectrumFrame};
use crate::config::AnalyzerConfig;

/// Runs the spectrum analyzer off the audio thread
///
/// Drive it from a UI timer, a render tick or a dedicated thread. Each
/// [`tick`](Self::tick) copies the newest window under the lock, releases it,
/// then does the FFT and banding and publishes the frame.
#[derive(Debug)]
pub struct AnalysisWorker {
    analyzer: SpectrumAnalyzer,
    shared: Arc<Shared>,
    last_analyzed: u64,
    last_generation: u64,
}

impl AnalysisWorker {
    pub(crate) fn new(shared: Arc<Shared>, config: AnalyzerConfig) -> Self {
        let analyzer = SpectrumAnalyzer::new(config, shared.sample_rate());
        shared
            .slot
            .publish(SpectrumFrame::silent(analyzer.band_table().center_frequencies()));
        Self {
            analyzer,
            shared,
            last_analyzed: 0,
            last_generation: 0,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        self.analyzer.config()
    }

    pub fn analyzer(&self) -> &SpectrumAnalyzer {
        &self.analyzer
    }

    /// Analyze if enough new audio arrived; returns whether a frame was published
    ///
    /// With `hop_size` 0 every call analyzes. A sample-rate change published
    /// by the audio side rebuilds the band table first and always analyzes.
    pub fn tick(&mut self) -> bool {
        let sample_rate = self.shared.sample_rate();
        let rate_changed = sample_rate != self.analyzer.sample_rate();
        if rate_changed {
            self.analyzer.set_sample_rate(sample_rate);
        }

        {
            let window = self.shared.window.lock();
            let written = window.total_written();
            if window.generation() != self.last_generation {
                // Window was cleared or replaced since the last analysis
                self.last_generation = window.generation();
                self.last_analyzed = 0;
            }

            let hop = self.analyzer.config().hop_size as u64;
            let fresh = written.saturating_sub(self.last_analyzed);
            if !rate_changed && hop > 0 && fresh < hop {
                return false;
            }

            self.analyzer.load_from(&window);
            self.last_analyzed = written;
        }

        let frame = self.analyzer.compute();
        self.shared.slot.publish(frame);
        true
    }

    /// Clear smoothing and publish an all-zero frame
    pub fn stop(&mut self) {
        debug!("Analysis stopped");
        self.analyzer.reset();
        self.shared.slot.publish(SpectrumFrame::silent(
            self.analyzer.band_table().center_frequencies(),
        ));
    }

    /// Swap analyzer settings; the rolling window is resized to the new FFT size
    pub fn reconfigure(&mut self, config: AnalyzerConfig) {
        let old_size = self.analyzer.fft_size();
        self.analyzer.reconfigure(config);
        let fft_size = self.analyzer.fft_size();

        if fft_size != old_size {
            let fresh = RollingSampleWindow::new(fft_size);
            let previous = std::mem::replace(&mut *self.shared.window.lock(), fresh);
            drop(previous);
            self.last_analyzed = 0;
            info!("Rolling window resized to {} samples", fft_size);
        }
        self.shared.slot.publish(SpectrumFrame::silent(
            self.analyzer.band_table().center_frequencies(),
        ));
    }
}
