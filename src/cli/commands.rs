//! CLI Command Implementations

use anyhow::{bail, Context, Result};
use log::{debug, info};

use super::BandArgs;
use crate::bridge::{Engine, EqEngine};
use crate::config::{AnalyzerConfig, EngineConfig};
use crate::dsp::{EqualizerState, MAX_FREQUENCY, MIN_FREQUENCY, NUM_BANDS};

/// Build an EQ state from command-line band settings
pub fn band_state(args: &BandArgs) -> Result<EqualizerState> {
    for (name, values) in [("gains", &args.gains), ("freqs", &args.freqs), ("qs", &args.qs)] {
        if values.len() > NUM_BANDS {
            bail!("--{} takes at most {} values, got {}", name, NUM_BANDS, values.len());
        }
    }

    let mut state = EqualizerState::default();
    for (band, &gain) in state.bands.iter_mut().zip(&args.gains) {
        band.gain_db = gain;
    }
    for (band, &frequency) in state.bands.iter_mut().zip(&args.freqs) {
        band.frequency = frequency;
    }
    for (band, &q) in state.bands.iter_mut().zip(&args.qs) {
        band.q = q;
    }
    state.bypass = args.bypass;
    Ok(state)
}

/// `count` log-spaced frequencies across the audible range
pub fn log_frequencies(count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![MIN_FREQUENCY; count];
    }
    let ratio = MAX_FREQUENCY / MIN_FREQUENCY;
    (0..count)
        .map(|i| MIN_FREQUENCY * ratio.powf(i as f64 / (count - 1) as f64))
        .collect()
}

/// Print the response curve for the given bands
pub fn response(bands: &BandArgs, points: usize, sample_rate: f64) -> Result<()> {
    let state = band_state(bands)?;
    let config = EngineConfig {
        sample_rate,
        ..EngineConfig::default()
    };
    let engine = Engine::new(&config).context("failed to build engine")?;
    engine.handle().apply_state(&state);

    let frequencies = log_frequencies(points);
    let curve = engine.response_curve(&frequencies);

    println!("{:>10}  {:>8}", "Hz", "dB");
    for (frequency, db) in frequencies.iter().zip(&curve) {
        println!("{:>10.1}  {:>+8.2}", frequency, db);
    }
    Ok(())
}

/// Synthesize a sine, process it block by block and report the spectrum
#[allow(clippy::too_many_arguments)]
pub fn tone(
    bands: &BandArgs,
    frequency: f64,
    amplitude: f64,
    duration: f64,
    sample_rate: f64,
    fft_size: usize,
    json: bool,
) -> Result<()> {
    const BLOCK_SIZE: usize = 512;

    let state = band_state(bands)?;
    let config = EngineConfig {
        sample_rate,
        channels: 1,
        analyzer: AnalyzerConfig {
            fft_size,
            hop_size: BLOCK_SIZE,
            ..AnalyzerConfig::default()
        },
    };
    let mut engine = Engine::new(&config).context("failed to build engine")?;
    engine.handle().apply_state(&state);

    let total = (duration.max(0.0) * sample_rate) as usize;
    if total == 0 {
        bail!("duration {}s at {} Hz yields no samples", duration, sample_rate);
    }
    info!("Rendering {} samples of {} Hz", total, frequency);

    let step = 2.0 * std::f64::consts::PI * frequency / sample_rate;
    let input: Vec<f32> = (0..total)
        .map(|i| (amplitude * (step * i as f64).sin()) as f32)
        .collect();

    let mut output = input.clone();
    for block in output.chunks_mut(BLOCK_SIZE) {
        engine.ingest_samples(block);
    }
    debug!("Processed {} blocks", total.div_ceil(BLOCK_SIZE));

    let frame = engine.spectrum_snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&*frame)?);
        return Ok(());
    }

    println!("=== Spectrum ===");
    println!("Peak frequency: {:.1} Hz", frame.peak_frequency_hz);
    println!("Window RMS: {:.4}", frame.rms_level);
    println!("Window peak: {:.4}", frame.peak_level);
    if let Some(band) = frame.loudest_band() {
        println!(
            "Loudest band: #{} ({:.1} Hz, {:.1} dB)",
            band,
            frame.band_frequencies[band],
            frame.magnitudes_db(-120.0)[band]
        );
    }
    println!();
    println!("Input RMS: {:.4}", rms(&input));
    println!("Output RMS: {:.4}", rms(&output));
    Ok(())
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Print band settings as persisted-state hex
pub fn encode_state(bands: &BandArgs) -> Result<()> {
    let state = band_state(bands)?;
    println!("{}", to_hex(&state.to_bytes()));
    Ok(())
}

/// Decode persisted-state hex and print it as JSON
pub fn decode_state(hex: &str) -> Result<()> {
    let bytes = from_hex(hex)?;
    let state = EqualizerState::from_bytes(&bytes).context("invalid persisted state")?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn from_hex(hex: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("hex string has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let text: String = pair.iter().collect();
            u8::from_str_radix(&text, 16).with_context(|| format!("invalid hex byte '{}'", text))
        })
        .collect()
}
