//! SpectrumEQ CLI
//!
//! Offline front end for the spectrum analyzer and EQ engine.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::debug;

use spectrum_eq::cli::{commands, Cli, Commands, StateAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    debug!("SpectrumEQ v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("SpectrumEQ v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Response {
            bands,
            points,
            sample_rate,
        } => commands::response(&bands, points, sample_rate),
        Commands::Tone {
            bands,
            frequency,
            amplitude,
            duration,
            sample_rate,
            fft_size,
            json,
        } => commands::tone(
            &bands,
            frequency,
            amplitude,
            duration,
            sample_rate,
            fft_size,
            json,
        ),
        Commands::State { action } => match action {
            StateAction::Encode { bands } => commands::encode_state(&bands),
            StateAction::Decode { hex } => commands::decode_state(&hex),
        },
    }
}
