//! End-to-end analysis run: discover, aggregate, report, summarize

use crate::aggregate::load_dir;
use crate::config::Settings;
use crate::profile::ReportProfile;
use crate::report::write_report;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Report printed; the summary path if one was written
    Completed { summary: Option<PathBuf> },
    /// Nothing to analyse; a notice was printed and no summary written
    NoData,
}

/// Run the analysis described by `settings`, printing to `out`
pub fn run<W: Write>(settings: &Settings, out: &mut W) -> Result<RunOutcome> {
    tracing::debug!(
        "Analysing {} with profile {} ({} intervals)",
        settings.dir.display(),
        settings.profile,
        settings.interval_method
    );

    let dataset = match load_dir(&settings.dir) {
        Ok(dataset) => dataset,
        Err(err) if err.is_empty_input() => {
            writeln!(out, "{}", err)?;
            return Ok(RunOutcome::NoData);
        }
        Err(err) => return Err(err.into()),
    };

    let summary = write_report(out, &dataset, settings.profile, settings.interval_method)
        .context("Failed to write report")?;

    if let Some(path) = &settings.output {
        summary.write_to(path)?;
        writeln!(out, "Detailed summary saved to: {}", path.display())?;
    }
    if settings.profile == ReportProfile::Final {
        writeln!(
            out,
            "Individual experiment logs: {} files",
            dataset.experiment_count()
        )?;
    }

    Ok(RunOutcome::Completed {
        summary: settings.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, Overrides};
    use std::fs;
    use tempfile::TempDir;

    fn settings(dir: &TempDir, write_json: bool) -> Settings {
        Settings::resolve(
            dir.path().to_path_buf(),
            AnalysisConfig::default(),
            Overrides::default(),
            write_json,
        )
    }

    #[test]
    fn test_empty_directory_prints_notice() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let outcome = run(&settings(&dir, true), &mut out).unwrap();
        assert_eq!(outcome, RunOutcome::NoData);
        assert!(String::from_utf8(out).unwrap().starts_with("No log files found"));
        assert!(!dir.path().join("validation_summary.json").exists());
    }

    #[test]
    fn test_logs_without_rows_print_notice() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cont_base.log"), "# Seeds: 5\nnoise\n").unwrap();
        let mut out = Vec::new();
        let outcome = run(&settings(&dir, true), &mut out).unwrap();
        assert_eq!(outcome, RunOutcome::NoData);
        assert!(String::from_utf8(out).unwrap().starts_with("No valid data found"));
    }

    #[test]
    fn test_run_writes_summary() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cont_base_g120.log"),
            "CSV_ROW,0.1,0.5,1.0,3,[H](18/20)\nCSV_ROW,0.1,0.5,1.0,2,(2/20)\n",
        )
        .unwrap();
        let mut out = Vec::new();
        let outcome = run(&settings(&dir, true), &mut out).unwrap();
        let path = dir.path().join("validation_summary.json");
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                summary: Some(path.clone())
            }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total parameter combinations: 2"));
        assert!(text.ends_with(&format!("Detailed summary saved to: {}\n", path.display())));
        assert!(path.exists());
    }

    #[test]
    fn test_final_profile_closes_with_log_count() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("binary_g120.log"), "CSV_ROW,0.1,0.5,1.0,2\n").unwrap();
        fs::write(dir.path().join("cont_base_g120.log"), "CSV_ROW,0.1,0.5,1.0,3\n").unwrap();
        let cli = Overrides {
            profile: Some(ReportProfile::Final),
            ..Overrides::default()
        };
        let settings = Settings::resolve(
            dir.path().to_path_buf(),
            AnalysisConfig::default(),
            cli,
            true,
        );

        let mut out = Vec::new();
        run(&settings, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let path = dir.path().join("final_validation_summary.json");
        assert!(text.ends_with(&format!(
            "Detailed summary saved to: {}\nIndividual experiment logs: 2 files\n",
            path.display()
        )));
    }

    #[test]
    fn test_comprehensive_profile_has_no_log_count() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("binary_g120.log"), "CSV_ROW,0.1,0.5,1.0,2\n").unwrap();
        let mut out = Vec::new();
        run(&settings(&dir, false), &mut out).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("Individual experiment logs"));
    }

    #[test]
    fn test_run_without_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("binary_g120.log"), "CSV_ROW,0.1,0.5,1.0,2\n").unwrap();
        let mut out = Vec::new();
        let outcome = run(&settings(&dir, false), &mut out).unwrap();
        assert_eq!(outcome, RunOutcome::Completed { summary: None });
        assert!(!dir.path().join("validation_summary.json").exists());
    }
}
