//! bankforge CLI - Command-line interface for instrument bank conversion
//!
//! This binary compiles instrument tables into native SBNK banks and SF2
//! SoundFonts, and inspects envelope register conversions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use bankforge_cli::commands;
use bankforge_cli::commands::convert::ConvertOptions;
use bankforge_model::Envelope;

/// bankforge - Instrument Bank Compiler
#[derive(Parser)]
#[command(name = "bankforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an instrument table into SBNK and SF2 banks
    Convert {
        /// Path to the instrument table (CSV)
        input: PathBuf,

        /// SBNK output path (default: next to the input, .sbnk)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// SF2 output path (default: next to the input, .sf2)
        #[arg(long)]
        sf2: Option<PathBuf>,

        /// Directory of numbered WAV samples (default: <input dir>/samples)
        #[arg(long)]
        samples: Option<PathBuf>,

        /// Bank name stored in the SF2 file (default: input file stem)
        #[arg(long)]
        bank_name: Option<String>,

        /// Wave archive slot referenced by PCM notes in the SBNK bank
        #[arg(long, default_value_t = 0)]
        wave_archive: u16,

        /// Only write the SBNK bank
        #[arg(long)]
        no_sf2: bool,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show time/level and SF2 values for one set of envelope registers
    Envelope {
        /// Attack register (0-127)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=127))]
        attack: u8,

        /// Decay register (0-127)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=127))]
        decay: u8,

        /// Sustain register (0-127)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=127))]
        sustain: u8,

        /// Release register (0-127)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=127))]
        release: u8,

        /// Pan register (0-127, 64 = center)
        #[arg(short, long, default_value_t = 64, value_parser = clap::value_parser!(u8).range(0..=127))]
        pan: u8,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            sf2,
            samples,
            bank_name,
            wave_archive,
            no_sf2,
            json,
        } => {
            let defaults = ConvertOptions::for_input(&input);
            let options = ConvertOptions {
                sbnk_path: output.unwrap_or(defaults.sbnk_path),
                sf2_path: sf2.unwrap_or(defaults.sf2_path),
                samples_dir: samples.unwrap_or(defaults.samples_dir),
                bank_name: bank_name.unwrap_or(defaults.bank_name),
                wave_archive,
                skip_sf2: no_sf2,
                input,
            };
            commands::convert::run(&options, json)
        }
        Commands::Envelope {
            attack,
            decay,
            sustain,
            release,
            pan,
            json,
        } => {
            let envelope = Envelope {
                attack,
                decay,
                sustain,
                release,
                pan,
            };
            commands::envelope::run(&envelope, json)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
