//! Engine assembly and the host-facing capability trait

use std::sync::Arc;

use log::info;

use super::{AnalysisWorker, AudioProcessor, EngineHandle, Shared};
use crate::analysis::SpectrumFrame;
use crate::config::EngineConfig;
use crate::error::Result;

/// What a host or presentation adapter needs from the engine
pub trait EqEngine {
    /// Filter an interleaved block in place and feed the analyzer
    fn ingest_samples(&mut self, buffer: &mut [f32]);

    /// Apply a normalized host parameter edit; `false` for unknown ids
    fn set_parameter(&self, id: u32, normalized: f64) -> bool;

    /// Latest spectrum frame
    fn spectrum_snapshot(&self) -> Arc<SpectrumFrame>;

    /// EQ response in dB at each frequency
    fn response_curve(&self, frequencies: &[f64]) -> Vec<f64>;

    /// Persisted state bytes
    fn serialize_state(&self) -> Vec<u8>;

    /// Restore persisted state; the current state survives a failure
    fn deserialize_state(&self, bytes: &[u8]) -> Result<()>;
}

/// Create the three bridge parts for `config`
///
/// # Errors
/// [`EngineError::InvalidConfig`](crate::EngineError::InvalidConfig) for a
/// non-positive sample rate or zero channels.
pub fn build(config: &EngineConfig) -> Result<(AudioProcessor, AnalysisWorker, EngineHandle)> {
    config.validate()?;
    let config = config.normalized();

    let shared = Arc::new(Shared::new(config.sample_rate, config.analyzer.fft_size));
    let worker = AnalysisWorker::new(Arc::clone(&shared), config.analyzer.clone());
    let processor = AudioProcessor::new(Arc::clone(&shared));
    let handle = EngineHandle::new(shared);

    info!(
        "Engine ready: {} Hz, {} channels, fft {}, {} bands",
        config.sample_rate, config.channels, config.analyzer.fft_size, config.analyzer.num_bands
    );
    Ok((processor, worker, handle))
}

/// All bridge parts on one thread, for offline rendering and tests
#[derive(Debug)]
pub struct Engine {
    processor: AudioProcessor,
    worker: AnalysisWorker,
    handle: EngineHandle,
    channels: usize,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let (processor, worker, handle) = build(config)?;
        Ok(Self {
            processor,
            worker,
            handle,
            channels: config.channels,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn processor_mut(&mut self) -> &mut AudioProcessor {
        &mut self.processor
    }

    pub fn worker_mut(&mut self) -> &mut AnalysisWorker {
        &mut self.worker
    }

    /// Run one analysis tick
    pub fn analyze(&mut self) -> bool {
        self.worker.tick()
    }

    pub fn into_parts(self) -> (AudioProcessor, AnalysisWorker, EngineHandle) {
        (self.processor, self.worker, self.handle)
    }
}

impl EqEngine for Engine {
    fn ingest_samples(&mut self, buffer: &mut [f32]) {
        self.processor.process_interleaved(buffer, self.channels);
        self.worker.tick();
    }

    fn set_parameter(&self, id: u32, normalized: f64) -> bool {
        self.handle.set_normalized(id, normalized)
    }

    fn spectrum_snapshot(&self) -> Arc<SpectrumFrame> {
        self.handle.spectrum_snapshot()
    }

    fn response_curve(&self, frequencies: &[f64]) -> Vec<f64> {
        self.handle.response_curve(frequencies)
    }

    fn serialize_state(&self) -> Vec<u8> {
        self.handle.serialize_state()
    }

    fn deserialize_state(&self, bytes: &[u8]) -> Result<()> {
        self.handle.deserialize_state(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::error::EngineError;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use std::f32::consts::PI;

    fn config(hop_size: usize) -> EngineConfig {
        EngineConfig {
            channels: 1,
            analyzer: AnalyzerConfig {
                fft_size: 1024,
                hop_size,
                num_bands: 32,
                smoothing_factor: 0.0,
                ..AnalyzerConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    fn tone(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * PI * 1000.0 * i as f32 / 44100.0).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f64 {
        (samples.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_build_rejects_bad_config() {
        let bad = EngineConfig {
            channels: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(build(&bad), Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_initial_snapshot_is_silent() {
        let engine = Engine::new(&config(0)).unwrap();
        let frame = engine.spectrum_snapshot();
        assert_eq!(frame.num_bands(), 32);
        assert!(frame.magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_edits_apply_on_next_block() {
        let mut engine = Engine::new(&config(0)).unwrap();
        engine.handle().set_band_gain(2, 12.0);
        assert_eq!(engine.processor_mut().equalizer().band_gain(2), 0.0);

        let mut block = tone(4096);
        engine.ingest_samples(&mut block);
        assert_eq!(engine.processor_mut().equalizer().band_gain(2), 12.0);

        // Skip the filter's settling time
        let ratio = rms(&block[2048..]) / rms(&tone(4096)[2048..]);
        assert_relative_eq!(ratio, 10f64.powf(12.0 / 20.0), max_relative = 0.02);
    }

    #[test]
    fn test_bypass_is_transparent() {
        let mut engine = Engine::new(&config(0)).unwrap();
        engine.handle().set_band_gain(2, 12.0);
        engine.handle().set_bypass(true);

        let mut block = tone(512);
        engine.ingest_samples(&mut block);
        assert_eq!(block, tone(512));
    }

    #[test]
    fn test_hop_size_gates_analysis() {
        let mut engine = Engine::new(&config(1024)).unwrap();
        let mut signal = tone(1024);
        let (first, second) = signal.split_at_mut(512);

        engine.processor_mut().process_mono(first);
        assert!(!engine.analyze());
        assert!(engine.spectrum_snapshot().magnitudes.iter().all(|&m| m == 0.0));

        engine.processor_mut().process_mono(second);
        assert!(engine.analyze());
        assert!(!engine.analyze());

        let frame = engine.spectrum_snapshot();
        assert!((frame.peak_frequency_hz - 1000.0).abs() <= 44100.0 / 1024.0);
    }

    #[test]
    fn test_hop_counts_from_reset() {
        let mut engine = Engine::new(&config(1024)).unwrap();
        let mut block = tone(1024);
        engine.processor_mut().process_mono(&mut block);
        assert!(engine.analyze());

        // Fewer new samples than were written before the reset, but a full hop
        engine.processor_mut().reset();
        let mut block = tone(1500);
        engine.processor_mut().process_mono(&mut block);
        assert!(engine.analyze());
        assert!(!engine.analyze());
    }

    #[test]
    fn test_sample_rate_change_reaches_analyzer() {
        let mut engine = Engine::new(&config(1024)).unwrap();
        engine.processor_mut().prepare(48000.0);

        // Rate change forces a tick even with no new audio
        assert!(engine.analyze());
        assert_eq!(engine.worker_mut().analyzer().sample_rate(), 48000.0);
        assert_eq!(engine.handle().sample_rate(), 48000.0);
        assert!(!engine.analyze());
    }

    #[test]
    fn test_stop_publishes_silence() {
        let mut engine = Engine::new(&config(0)).unwrap();
        let mut block = tone(1024);
        engine.ingest_samples(&mut block);
        assert!(engine.spectrum_snapshot().rms_level > 0.1);

        engine.worker_mut().stop();
        let frame = engine.spectrum_snapshot();
        assert_eq!(frame.rms_level, 0.0);
        assert!(frame.magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_reconfigure_resizes_window() {
        let mut engine = Engine::new(&config(0)).unwrap();
        engine.worker_mut().reconfigure(AnalyzerConfig {
            fft_size: 2048,
            num_bands: 16,
            ..AnalyzerConfig::default()
        });
        assert_eq!(engine.worker_mut().config().fft_size, 2048);
        assert_eq!(engine.spectrum_snapshot().num_bands(), 16);
    }

    #[test]
    fn test_state_round_trip_through_trait() {
        let engine = Engine::new(&config(0)).unwrap();
        engine.handle().set_band_gain(0, -6.5);
        engine.handle().set_band_q(4, 3.0);
        let bytes = engine.serialize_state();

        let other = Engine::new(&config(0)).unwrap();
        other.deserialize_state(&bytes).unwrap();
        assert_eq!(other.handle().state(), engine.handle().state());

        assert!(other.deserialize_state(&bytes[..50]).is_err());
        assert_eq!(other.handle().band_gain(0), -6.5);
    }

    #[test]
    fn test_set_parameter_and_response_curve() {
        let engine = Engine::new(&config(0)).unwrap();
        // Band 2 gain at full scale
        assert!(engine.set_parameter(6, 1.0));
        assert!(!engine.set_parameter(16, 1.0));

        let curve = engine.response_curve(&[1000.0, 10.0]);
        assert_relative_eq!(curve[0], 12.0, epsilon = 0.1);
        assert!(curve[1].abs() < 0.5);
        assert_eq!(engine.handle().state().bands[2].gain_db, 12.0);
        assert_eq!(engine.handle().get_normalized(6), Some(1.0));
    }

    #[test]
    fn test_handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<EngineHandle>();
    }
}
