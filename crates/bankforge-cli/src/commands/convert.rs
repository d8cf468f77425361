//! Convert command implementation
//!
//! Compiles an instrument table into a native SBNK bank and, when a sample
//! directory is available, an SF2 SoundFont.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use bankforge_backend_sbnk::SbnkEncoder;
use bankforge_backend_sf2::{assemble_bank, AssembleOptions, SampleLibrary, DEFAULT_BANK_NAME};
use bankforge_model::{
    build_bank, read_table_file, InstrumentTable, NativeBankEncoder, Warning, WarningCode,
};

use super::json_output::{
    error_codes, ConvertOutput, ConvertResult, JsonError, JsonWarning, OutputFile,
};
use super::reporting::{print_output, print_warnings};

/// Directory searched for samples when none is given, relative to the table.
pub const DEFAULT_SAMPLES_DIR: &str = "samples";

/// Settings of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub sbnk_path: PathBuf,
    pub sf2_path: PathBuf,
    pub samples_dir: PathBuf,
    pub bank_name: String,
    /// Wave archive slot written into PCM note definitions.
    pub wave_archive: u16,
    /// Skip the SF2 stage entirely.
    pub skip_sf2: bool,
}

impl ConvertOptions {
    /// Options with every output placed next to the input table.
    pub fn for_input(input: &Path) -> Self {
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        let bank_name = input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BANK_NAME)
            .to_string();
        Self {
            input: input.to_path_buf(),
            sbnk_path: input.with_extension("sbnk"),
            sf2_path: input.with_extension("sf2"),
            samples_dir: dir.join(DEFAULT_SAMPLES_DIR),
            bank_name,
            wave_archive: 0,
            skip_sf2: false,
        }
    }
}

/// Why a conversion stopped.
#[derive(Debug)]
pub enum ConvertFailure {
    /// The table could not be loaded; nothing was written.
    Input(JsonError),
    /// An output could not be produced.
    Output(JsonError),
}

impl ConvertFailure {
    /// Exit code: 1 for input errors, 2 for output errors.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ConvertFailure::Input(_) => ExitCode::from(1),
            ConvertFailure::Output(_) => ExitCode::from(2),
        }
    }

    pub fn error(&self) -> &JsonError {
        match self {
            ConvertFailure::Input(e) | ConvertFailure::Output(e) => e,
        }
    }
}

/// Outcome of a conversion, with warnings grouped by stage.
#[derive(Debug, Default)]
pub struct ConvertReport {
    pub load_warnings: Vec<Warning>,
    pub build_warnings: Vec<Warning>,
    pub sf2_warnings: Vec<Warning>,
    pub slots: usize,
    pub instruments: usize,
    pub sbnk: Option<OutputFile>,
    pub sf2: Option<OutputFile>,
    pub sf2_presets: usize,
    pub sf2_samples: usize,
}

impl ConvertReport {
    /// All warnings in stage order.
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.load_warnings
            .iter()
            .chain(&self.build_warnings)
            .chain(&self.sf2_warnings)
    }
}

fn input_error(message: String, file: &str) -> ConvertFailure {
    ConvertFailure::Input(JsonError::new(error_codes::TABLE_SCHEMA, message).with_file(file))
}

fn output_error(code: &str, message: String, file: &str) -> ConvertFailure {
    ConvertFailure::Output(JsonError::new(code, message).with_file(file))
}

/// Write bytes and describe the written file.
fn write_output(path: &Path, bytes: &[u8]) -> Result<OutputFile> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(OutputFile {
        path: path.display().to_string(),
        hash: blake3::hash(bytes).to_hex().to_string(),
        size: bytes.len() as u64,
    })
}

/// Run the conversion pipeline without printing anything.
///
/// Warnings collected before a failure are kept in `report`.
pub fn convert(
    options: &ConvertOptions,
    report: &mut ConvertReport,
) -> Result<(), ConvertFailure> {
    let input = options.input.display().to_string();

    let table =
        read_table_file(&options.input).map_err(|e| input_error(e.to_string(), &input))?;
    let loaded =
        InstrumentTable::from_table(table).map_err(|e| input_error(e.to_string(), &input))?;
    report.load_warnings = loaded.warnings;

    let built = build_bank(&loaded.table);
    report.build_warnings = built.warnings;
    let bank = built.bank;
    report.slots = bank.len();
    report.instruments = bank.instruments().iter().filter(|i| !i.is_null()).count();

    // Native bank
    let sbnk_path = options.sbnk_path.display().to_string();
    let bytes = SbnkEncoder::new(options.wave_archive)
        .encode(&bank)
        .map_err(|e| output_error(error_codes::SBNK_ENCODE, e.to_string(), &sbnk_path))?;
    let sbnk = write_output(&options.sbnk_path, &bytes)
        .map_err(|e| output_error(error_codes::SBNK_WRITE, format!("{:#}", e), &sbnk_path))?;
    report.sbnk = Some(sbnk);

    if options.skip_sf2 {
        return Ok(());
    }

    // SoundFont
    let library = if options.samples_dir.is_dir() {
        SampleLibrary::open(&options.samples_dir).map_err(|e| e.to_string())
    } else {
        Err("directory does not exist".to_string())
    };
    let mut library = match library {
        Ok(library) => library,
        Err(reason) => {
            report.sf2_warnings.push(Warning::new(
                WarningCode::SampleSourceAbsent,
                format!(
                    "sample directory {}: {}; SF2 output skipped",
                    options.samples_dir.display(),
                    reason
                ),
            ));
            return Ok(());
        }
    };

    let assembled = assemble_bank(
        &bank,
        &mut library,
        &AssembleOptions {
            bank_name: options.bank_name.clone(),
        },
    );
    report.sf2_warnings = assembled.warnings;
    report.sf2_presets = assembled.bank.presets.len();
    report.sf2_samples = assembled.bank.samples.len();

    let sf2_path = options.sf2_path.display().to_string();
    let bytes = assembled
        .bank
        .to_bytes()
        .map_err(|e| output_error(error_codes::SF2_WRITE, e.to_string(), &sf2_path))?;
    let sf2 = write_output(&options.sf2_path, &bytes)
        .map_err(|e| output_error(error_codes::SF2_WRITE, format!("{:#}", e), &sf2_path))?;
    report.sf2 = Some(sf2);

    Ok(())
}

/// Run the convert command
///
/// # Returns
/// Exit code: 0 success, 1 input error, 2 output error
pub fn run(options: &ConvertOptions, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(options)
    } else {
        run_human(options)
    }
}

/// Run convert with human-readable (colored) output
fn run_human(options: &ConvertOptions) -> Result<ExitCode> {
    let start = Instant::now();

    println!("{} {}", "Converting:".cyan().bold(), options.input.display());
    if options.skip_sf2 {
        println!("{} {}", "SF2:".dimmed(), "disabled".yellow());
    } else {
        println!("{} {}", "Samples:".dimmed(), options.samples_dir.display());
    }

    let mut report = ConvertReport::default();
    let outcome = convert(options, &mut report);

    print_warnings("load", &report.load_warnings);
    print_warnings("build", &report.build_warnings);
    print_warnings("sf2", &report.sf2_warnings);

    if let Err(failure) = outcome {
        let error = failure.error();
        println!(
            "\n{} {} {}",
            "FAILED".red().bold(),
            error.code.dimmed(),
            error.message
        );
        return Ok(failure.exit_code());
    }

    println!(
        "\n{} {} instrument(s) in {} slot(s)",
        "Bank:".cyan().bold(),
        report.instruments,
        report.slots
    );
    if let Some(sbnk) = &report.sbnk {
        print_output("SBNK", sbnk);
    }
    match &report.sf2 {
        Some(sf2) => {
            print_output("SF2 ", sf2);
            println!(
                "    {} preset(s), {} sample(s)",
                report.sf2_presets, report.sf2_samples
            );
        }
        None if !options.skip_sf2 => println!("  {} SF2 skipped", "-".yellow()),
        None => {}
    }

    let warning_count = report.warnings().count();
    println!(
        "\n{} in {:?}{}",
        "SUCCESS".green().bold(),
        start.elapsed(),
        if warning_count > 0 {
            format!(" ({} warning(s))", warning_count)
        } else {
            String::new()
        }
    );
    Ok(ExitCode::SUCCESS)
}

/// Run convert with machine-readable JSON output
fn run_json(options: &ConvertOptions) -> Result<ExitCode> {
    let start = Instant::now();
    let mut report = ConvertReport::default();
    let outcome = convert(options, &mut report);
    let warnings: Vec<JsonWarning> = report.warnings().map(JsonWarning::from).collect();

    let (output, code) = match outcome {
        Ok(()) => {
            let result = ConvertResult {
                slots: report.slots,
                instruments: report.instruments,
                sbnk: report.sbnk.clone(),
                sf2: report.sf2.clone(),
                sf2_presets: report.sf2_presets,
                sf2_samples: report.sf2_samples,
                duration_ms: start.elapsed().as_millis() as u64,
            };
            (ConvertOutput::success(result, warnings), ExitCode::SUCCESS)
        }
        Err(failure) => {
            let code = failure.exit_code();
            (
                ConvertOutput::failure(vec![failure.error().clone()], warnings),
                code,
            )
        }
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(code)
}
