//! Envelope command implementation
//!
//! Shows how one set of envelope registers maps to time/level values and to
//! SF2 generator amounts.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use bankforge_backend_sf2::Sf2Envelope;
use bankforge_model::Envelope;

use super::json_output::{EnvelopeDomain, EnvelopeGenerators, EnvelopeOutput};

/// Convert one register set.
pub fn describe(envelope: &Envelope) -> EnvelopeOutput {
    let sf2 = Sf2Envelope::from_envelope(envelope);
    EnvelopeOutput {
        registers: [
            envelope.attack,
            envelope.decay,
            envelope.sustain,
            envelope.release,
            envelope.pan,
        ],
        domain: EnvelopeDomain {
            attack_ms: envelope.attack_ms(),
            decay_ms: envelope.decay_time_ms(),
            sustain_fraction: envelope.sustain_fraction(),
            release_ms: envelope.release_time_ms(),
        },
        sf2: EnvelopeGenerators {
            pan: sf2.pan,
            attack_timecents: sf2.attack,
            decay_timecents: sf2.decay,
            sustain_centibels: sf2.sustain,
            release_timecents: sf2.release,
        },
    }
}

/// Run the envelope command
pub fn run(envelope: &Envelope, json_output: bool) -> Result<ExitCode> {
    let output = describe(envelope);

    if json_output {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    let [a, d, s, r, pan] = output.registers;
    println!(
        "{} A={} D={} S={} R={} pan={}",
        "Registers:".cyan().bold(),
        a,
        d,
        s,
        r,
        pan
    );
    println!("\n{}", "Time/level".cyan().bold());
    println!("  attack   {:>10.1} ms", output.domain.attack_ms);
    println!("  decay    {:>10.1} ms", output.domain.decay_ms);
    println!("  sustain  {:>10.3}", output.domain.sustain_fraction);
    println!("  release  {:>10.1} ms", output.domain.release_ms);

    println!("\n{}", "SF2 generators".cyan().bold());
    println!("  pan      {:>6} {}", output.sf2.pan, "(0.1%)".dimmed());
    println!("  attack   {:>6} {}", output.sf2.attack_timecents, "tc".dimmed());
    println!("  decay    {:>6} {}", output.sf2.decay_timecents, "tc".dimmed());
    println!("  sustain  {:>6} {}", output.sf2.sustain_centibels, "cB".dimmed());
    println!("  release  {:>6} {}", output.sf2.release_timecents, "tc".dimmed());

    Ok(ExitCode::SUCCESS)
}
