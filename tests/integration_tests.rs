//! Integration Tests
//!
//! End-to-end tests for the spectrum/EQ pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use spectrum_eq::analysis::SpectrumAnalyzer;
use spectrum_eq::dsp::{Equalizer, EqualizerState};
use spectrum_eq::{build, AnalyzerConfig, Engine, EngineConfig, EqEngine};

const SAMPLE_RATE: f64 = 44100.0;
const FFT_SIZE: usize = 4096;

/// Helper to create a test sine wave
fn create_sine(frequency: f64, amplitude: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin()) as f32
        })
        .collect()
}

fn rms(samples: &[f32]) -> f64 {
    (samples.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
}

fn engine_config(channels: usize) -> EngineConfig {
    EngineConfig {
        sample_rate: SAMPLE_RATE,
        channels,
        analyzer: AnalyzerConfig {
            fft_size: FFT_SIZE,
            hop_size: 0,
            ..AnalyzerConfig::default()
        },
    }
}

// === Flat EQ Pipeline ===

#[test]
fn test_flat_eq_is_transparent_and_peak_is_found() {
    let input = create_sine(1000.0, 0.5, FFT_SIZE * 2);

    let mut eq = Equalizer::with_sample_rate(SAMPLE_RATE);
    let output: Vec<f32> = input.iter().map(|&s| eq.process_mono(s)).collect();

    for (a, b) in input.iter().zip(&output) {
        assert!((a - b).abs() <= 0.001 * 0.5, "sample deviated: {} vs {}", a, b);
    }
    let deviation = (rms(&output) - rms(&input)).abs() / rms(&input);
    assert!(deviation < 0.001, "RMS deviation {}", deviation);

    let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), SAMPLE_RATE);
    let frame = analyzer.analyze_block(&output[output.len() - FFT_SIZE..]);
    let bin_width = SAMPLE_RATE / FFT_SIZE as f64;
    assert!(
        (frame.peak_frequency_hz - 1000.0).abs() <= bin_width,
        "Expected peak near 1000 Hz, got {:.1} Hz",
        frame.peak_frequency_hz
    );
}

// === Boosted Band ===

#[test]
fn test_plus_12_db_band_quadruples_rms() {
    let input = create_sine(1000.0, 0.5, (SAMPLE_RATE / 2.0) as usize);

    let mut bypassed = Engine::new(&engine_config(1)).unwrap();
    bypassed.handle().set_band_gain(2, 12.0);
    bypassed.handle().set_bypass(true);
    let mut dry = input.clone();
    for block in dry.chunks_mut(512) {
        bypassed.ingest_samples(block);
    }

    let mut boosted = Engine::new(&engine_config(1)).unwrap();
    boosted.handle().set_band_gain(2, 12.0);
    boosted.handle().set_band_q(2, 0.707);
    let mut wet = input.clone();
    for block in wet.chunks_mut(512) {
        boosted.ingest_samples(block);
    }

    // Measure after the filter has settled
    let settled = 4096;
    let ratio = rms(&wet[settled..]) / rms(&dry[settled..]);
    assert!(
        (ratio - 10f64.powf(12.0 / 20.0)).abs() < 0.1,
        "Expected ~3.98x RMS, got {:.3}x",
        ratio
    );

    // Display follows the boosted signal
    let dry_frame = bypassed.spectrum_snapshot();
    let wet_frame = boosted.spectrum_snapshot();
    assert!(wet_frame.rms_level > 3.5 * dry_frame.rms_level);
    assert!((wet_frame.peak_frequency_hz - 1000.0).abs() <= SAMPLE_RATE / FFT_SIZE as f64);
}

#[test]
fn test_stereo_interleaved_processing() {
    let mono = create_sine(1000.0, 0.25, 8192);
    let mut interleaved: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();

    let mut engine = Engine::new(&engine_config(2)).unwrap();
    engine.handle().set_band_gain(2, -12.0);
    for block in interleaved.chunks_mut(1024) {
        engine.ingest_samples(block);
    }

    let left: Vec<f32> = interleaved.iter().step_by(2).copied().collect();
    let right: Vec<f32> = interleaved.iter().skip(1).step_by(2).copied().collect();
    assert_eq!(left, right);

    let ratio = rms(&left[4096..]) / rms(&mono[4096..]);
    assert!((ratio - 10f64.powf(-12.0 / 20.0)).abs() < 0.01, "ratio {}", ratio);
}

// === Persisted State ===

#[test]
fn test_state_round_trip_between_engines() {
    let source = Engine::new(&EngineConfig::default()).unwrap();
    source.handle().set_band_gain(0, 4.5);
    source.handle().set_band_frequency(1, 330.0);
    source.handle().set_band_q(3, 2.2);
    source.handle().set_bypass(true);

    let bytes = source.serialize_state();
    assert_eq!(bytes.len(), 128);

    let target = Engine::new(&EngineConfig::default()).unwrap();
    target.deserialize_state(&bytes).unwrap();
    assert_eq!(target.handle().state(), source.handle().state());
    assert!(target.handle().is_bypassed());

    // A corrupt stream leaves the previous state alone
    let before = target.handle().state();
    let mut corrupt = bytes.clone();
    corrupt[0] = 9;
    assert!(target.deserialize_state(&corrupt).is_err());
    assert_eq!(target.handle().state(), before);
}

#[test]
fn test_default_state_bytes_decode_to_factory_settings() {
    let bytes = EqualizerState::default().to_bytes();
    let state = EqualizerState::from_bytes(&bytes).unwrap();
    let frequencies: Vec<f64> = state.bands.iter().map(|b| b.frequency).collect();
    assert_eq!(frequencies, vec![60.0, 250.0, 1000.0, 4000.0, 12000.0]);
    assert!(!state.bypass);
}

// === Threaded Bridge ===

#[test]
fn test_audio_and_analysis_threads() {
    let config = EngineConfig {
        channels: 2,
        analyzer: AnalyzerConfig {
            fft_size: 2048,
            hop_size: 512,
            smoothing_factor: 0.0,
            ..AnalyzerConfig::default()
        },
        ..EngineConfig::default()
    };
    let (mut processor, mut worker, handle) = build(&config).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let audio = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mono = create_sine(1000.0, 0.5, 44100);
            let mut frames: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
            for block in frames.chunks_mut(256 * 2) {
                processor.process_interleaved(block, 2);
            }
            done.store(true, Ordering::Release);
        })
    };

    let control = {
        let handle = handle.clone();
        thread::spawn(move || {
            for step in 0..200 {
                handle.set_band_gain(4, (step % 24) as f64 - 12.0);
            }
            handle.set_band_gain(4, 0.0);
        })
    };

    let mut published = 0;
    while !done.load(Ordering::Acquire) {
        if worker.tick() {
            published += 1;
        }
        thread::yield_now();
    }
    audio.join().unwrap();
    control.join().unwrap();
    if worker.tick() {
        published += 1;
    }

    assert!(published >= 1);
    let frame = handle.spectrum_snapshot();
    assert_eq!(frame.num_bands(), 128);
    assert!(
        (frame.peak_frequency_hz - 1000.0).abs() <= 44100.0 / 2048.0,
        "peak at {:.1} Hz",
        frame.peak_frequency_hz
    );
    assert_eq!(handle.band_gain(4), 0.0);
}
