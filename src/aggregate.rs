//! Log discovery and aggregation
//!
//! Finds `*.log` files, parses each one once and builds a [`Dataset`]:
//! every row tagged with its experiment name and inherited run parameters,
//! plus a per-experiment map keyed by file stem.

use crate::error::{AnalysisError, Result};
use crate::parser::LogParser;
use crate::record::{ExperimentRecord, LogRecord};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of sweep logs
pub const LOG_EXTENSION: &str = "log";

/// Unified rows plus per-experiment records
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All rows, in experiment-name order then file order
    pub rows: Vec<LogRecord>,
    pub experiments: BTreeMap<String, ExperimentRecord>,
}

impl Dataset {
    /// Number of log files aggregated, including files without rows
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Experiments whose name contains `fragment`
    pub fn experiments_matching(&self, fragment: &str) -> usize {
        self.experiments
            .keys()
            .filter(|name| name.contains(fragment))
            .count()
    }
}

/// List `*.log` files directly inside `dir`, sorted by path
///
/// Hidden files (names starting with `.`) are skipped, as a shell glob would.
pub fn discover_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| AnalysisError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut logs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AnalysisError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == LOG_EXTENSION) {
            logs.push(path);
        }
    }
    logs.sort();

    if logs.is_empty() {
        return Err(AnalysisError::NoLogFiles {
            dir: dir.to_path_buf(),
        });
    }

    tracing::debug!("Discovered {} log file(s) in {}", logs.len(), dir.display());
    Ok(logs)
}

/// Parse every log and merge the results into one dataset
pub fn aggregate(paths: &[PathBuf]) -> Result<Dataset> {
    let parser = LogParser::new()?;
    let mut experiments = BTreeMap::new();

    for path in paths {
        let bytes = fs::read(path).map_err(|source| AnalysisError::Io {
            path: path.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let parsed = parser.parse(&content);

        let name = experiment_name(path);
        tracing::debug!(
            "Parsed {}: {} row(s), {} skipped, {} metadata key(s)",
            name,
            parsed.rows.len(),
            parsed.skipped_rows,
            parsed.metadata.len()
        );

        let rows = parsed
            .rows
            .into_iter()
            .map(|row| LogRecord::from_parsed(row, &name, &parsed.metadata))
            .collect();

        experiments.insert(
            name.clone(),
            ExperimentRecord {
                name,
                size_bytes: bytes.len() as u64,
                rows,
                metadata: parsed.metadata,
            },
        );
    }

    let rows: Vec<LogRecord> = experiments
        .values()
        .flat_map(|exp: &ExperimentRecord| exp.rows.iter().cloned())
        .collect();

    if rows.is_empty() {
        return Err(AnalysisError::NoValidData { files: paths.len() });
    }

    Ok(Dataset { rows, experiments })
}

/// Discover and aggregate in one step
pub fn load_dir(dir: &Path) -> Result<Dataset> {
    let paths = discover_logs(dir)?;
    aggregate(&paths)
}

/// File stem used as the experiment name
pub fn experiment_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
