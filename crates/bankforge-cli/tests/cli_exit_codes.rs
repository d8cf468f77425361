//! Exit codes and JSON diagnostics of the `bankforge` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const TABLE: &str = "InstrumentID,Type,WaveID,Comment\n0,simple,0,Piano\n2,psg,3,Lead\n";

fn bankforge(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bankforge"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run bankforge")
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_success_without_samples_exits_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bank.csv"), TABLE).unwrap();

    let output = bankforge(&["convert", "bank.csv", "--json"], dir.path());
    assert_eq!(output.status.code(), Some(0));

    let value = json(&output);
    assert_eq!(value["success"], true);
    assert_eq!(value["result"]["slots"], 3);
    assert_eq!(value["result"]["instruments"], 2);
    assert!(value["result"]["sbnk"]["hash"].as_str().unwrap().len() == 64);
    assert!(value["result"].get("sf2").map_or(true, Value::is_null));
    let codes: Vec<&str> = value["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["W301"]);
    assert!(dir.path().join("bank.sbnk").exists());
}

#[test]
fn test_schema_error_exits_one() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bank.csv"), "InstrumentID,WaveID\n0,1\n").unwrap();

    let output = bankforge(&["convert", "bank.csv", "--json"], dir.path());
    assert_eq!(output.status.code(), Some(1));

    let value = json(&output);
    assert_eq!(value["success"], false);
    assert_eq!(value["errors"][0]["code"], "CLI_001");
    assert!(!dir.path().join("bank.sbnk").exists());
}

#[test]
fn test_header_only_table_exits_one_without_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bank.csv"), "InstrumentID,Type,WaveID\n").unwrap();
    fs::create_dir(dir.path().join("samples")).unwrap();

    let output = bankforge(&["convert", "bank.csv", "--json"], dir.path());
    assert_eq!(output.status.code(), Some(1));

    let value = json(&output);
    assert_eq!(value["success"], false);
    assert_eq!(value["errors"][0]["code"], "CLI_001");
    assert!(!dir.path().join("bank.sbnk").exists());
    assert!(!dir.path().join("bank.sf2").exists());
}

#[test]
fn test_missing_input_exits_one() {
    let dir = TempDir::new().unwrap();
    let output = bankforge(&["convert", "absent.csv"], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unwritable_output_exits_two() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bank.csv"), TABLE).unwrap();
    fs::create_dir(dir.path().join("taken")).unwrap();

    let output = bankforge(
        &["convert", "bank.csv", "-o", "taken", "--no-sf2", "--json"],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json(&output)["errors"][0]["code"], "CLI_003");
}

#[test]
fn test_envelope_json() {
    let dir = TempDir::new().unwrap();
    let output = bankforge(
        &["envelope", "-a", "127", "-d", "127", "-s", "127", "-r", "127", "--json"],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(0));
    let value = json(&output);
    assert_eq!(value["registers"], serde_json::json!([127, 127, 127, 127, 64]));
}

#[test]
fn test_envelope_register_out_of_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = bankforge(
        &["envelope", "-a", "200", "-d", "0", "-s", "0", "-r", "0"],
        dir.path(),
    );
    assert!(!output.status.success());
}
