//! CLI Module
//!
//! Command-line front end for inspecting the engine offline.

pub mod commands;

use clap::{Args, Parser, Subcommand};

/// SpectrumEQ - spectrum analysis and parametric EQ toolkit
#[derive(Parser, Debug)]
#[command(name = "spectrum-eq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Band settings shared by several commands; omitted values keep factory defaults
#[derive(Args, Debug, Clone, Default)]
pub struct BandArgs {
    /// Band gains in dB, comma separated, band 0 first
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub gains: Vec<f64>,

    /// Band center frequencies in Hz, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub freqs: Vec<f64>,

    /// Band Q factors, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub qs: Vec<f64>,

    /// Bypass the whole EQ
    #[arg(long)]
    pub bypass: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the EQ response curve in dB
    #[command(name = "response")]
    Response {
        #[command(flatten)]
        bands: BandArgs,

        /// Number of log-spaced points between 20 Hz and 20 kHz
        #[arg(short, long, default_value_t = 32)]
        points: usize,

        /// Sample rate in Hz
        #[arg(short, long, default_value_t = 44100.0)]
        sample_rate: f64,
    },

    /// Run a synthesized sine through the engine and report the spectrum
    #[command(name = "tone")]
    Tone {
        #[command(flatten)]
        bands: BandArgs,

        /// Tone frequency in Hz
        #[arg(long, default_value_t = 1000.0)]
        frequency: f64,

        /// Peak amplitude
        #[arg(long, default_value_t = 0.5)]
        amplitude: f64,

        /// Length in seconds
        #[arg(long, default_value_t = 1.0)]
        duration: f64,

        /// Sample rate in Hz
        #[arg(short, long, default_value_t = 44100.0)]
        sample_rate: f64,

        /// FFT size (rounded up to a power of two)
        #[arg(long, default_value_t = 4096)]
        fft_size: usize,

        /// Print the full spectrum frame as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode or decode persisted EQ state
    #[command(name = "state")]
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Print band settings as persisted-state hex
    Encode {
        #[command(flatten)]
        bands: BandArgs,
    },

    /// Decode persisted-state hex and print it as JSON
    Decode {
        /// Hex string (whitespace ignored)
        hex: String,
    },
}
