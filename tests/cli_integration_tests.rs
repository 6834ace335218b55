//! End-to-end tests of the sweeplog binary over temporary log directories
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn rows(n_states: u32, count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "CSV_ROW,0.1,{:.1},1.0,{},({}/20)\n",
                (i % 2) as f64,
                n_states,
                15 + i % 5
            )
        })
        .collect()
}

/// Two logs: 6 of 10 rows ternary in the first, 9 of 10 binary in the second
fn write_sample_logs(dir: &Path) {
    let first = format!(
        "# Seeds: 20\n# Command: run --sweep-optimizer=ga --sweep-fitness=task\ngens=120 pop=40\n{}{}",
        rows(3, 6),
        rows(0, 4)
    );
    let second = format!("# Seeds: 20\ngens=480 pop=40\n{}{}", rows(2, 9), rows(4, 1));
    fs::write(dir.join("cont_base_g120.log"), first).unwrap();
    fs::write(dir.join("binary_g480.log"), second).unwrap();
}

fn summary(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_comprehensive_run_reports_distribution() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== COMPREHENSIVE VALIDATION RESULTS ==="))
        .stdout(predicate::str::contains("Total experiments: 2"))
        .stdout(predicate::str::contains("Total parameter combinations: 20"))
        .stdout(predicate::str::contains("Ternary   :    6 ( 30.0%)"))
        .stdout(predicate::str::contains("Binary    :    9 ( 45.0%)"))
        .stdout(predicate::str::contains("Detailed summary saved to:"));

    let json = summary(&dir.path().join("validation_summary.json"));
    assert_eq!(json["total_experiments"], 2);
    assert_eq!(json["total_combinations"], 20);
    assert_eq!(json["state_distribution"]["2"], 9);
    assert_eq!(json["state_distribution"]["3"], 6);
    let total: u64 = json["state_distribution"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 20);
    assert_eq!(json["interval_method"], "wald");
    assert_eq!(json["experiments"]["cont_base_g120"]["conditions"], 10);
    assert_eq!(json["experiments"]["cont_base_g120"]["metadata"]["optimizer"], "ga");
    assert_eq!(json["experiments"]["binary_g480"]["metadata"]["gens"], 480);
}

#[test]
fn test_summary_is_byte_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());
    let path = dir.path().join("validation_summary.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("-d").arg(dir.path()).assert().success();
    let first = fs::read(&path).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("-d").arg(dir.path()).assert().success();
    assert_eq!(first, fs::read(&path).unwrap());
}

#[test]
fn test_empty_directory_exits_gracefully() {
    let dir = TempDir::new().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No log files found"));
    assert!(!dir.path().join("validation_summary.json").exists());
}

#[test]
fn test_logs_without_data_rows_exit_gracefully() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cont_base.log"), "# Seeds: 20\nCSV_ROW,abc,0.5\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No valid data found"));
    assert!(!dir.path().join("validation_summary.json").exists());
}

#[test]
fn test_final_profile_writes_final_summary() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path()).arg("--profile").arg("final");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== FINAL COMPREHENSIVE VALIDATION RESULTS ==="))
        .stdout(predicate::str::contains("=== FINAL SUMMARY AND CONCLUSIONS ==="))
        .stdout(predicate::str::contains("[95% CI: "))
        .stdout(predicate::str::ends_with("Individual experiment logs: 2 files\n"));

    let json = summary(&dir.path().join("final_validation_summary.json"));
    assert_eq!(json["interval_method"], "wilson");
    assert_eq!(json["continuous_ternary_rate"], 0.6);
    assert!(json["discrete_ternary_rate"].is_null());
    assert_eq!(json["binary_constraint_rate"], 0.9);
    assert_eq!(json["optimizer_consistency"], false);
    assert!(!dir.path().join("validation_summary.json").exists());
}

#[test]
fn test_ci_flag_overrides_profile_default() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--profile")
        .arg("final")
        .arg("--ci")
        .arg("wald");
    cmd.assert().success();

    let json = summary(&dir.path().join("final_validation_summary.json"));
    assert_eq!(json["interval_method"], "wald");
}

#[test]
fn test_config_file_in_directory_is_applied() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());
    fs::write(
        dir.path().join("sweeplog.toml"),
        "profile = \"final\"\ninterval_method = \"wald\"\n",
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== FINAL COMPREHENSIVE VALIDATION RESULTS ==="));

    let json = summary(&dir.path().join("final_validation_summary.json"));
    assert_eq!(json["interval_method"], "wald");
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());
    fs::write(dir.path().join("sweeplog.toml"), "confidence = 0.99\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn test_output_flag_and_no_json() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());
    let out = dir.path().join("custom.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path()).arg("-o").arg(&out);
    cmd.assert().success();
    assert!(out.exists());
    assert!(!dir.path().join("validation_summary.json").exists());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path()).arg("--no-json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Detailed summary saved to:").not());
    assert!(!dir.path().join("validation_summary.json").exists());
}

#[test]
fn test_debug_tracing_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    write_sample_logs(dir.path());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sweeplog");
    cmd.arg("--dir").arg(dir.path()).arg("--debug").arg("--no-json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Discovered").not())
        .stderr(predicate::str::contains("Discovered 2 log file(s)"));
}
