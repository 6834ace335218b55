//! Analysis configuration
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional `sweeplog.toml`, and the report profile's defaults.
//!
//! # Example sweeplog.toml
//!
//! ```toml
//! profile = "final"
//! interval_method = "wald"
//! output = "reports/final.json"
//! ```

use crate::profile::ReportProfile;
use crate::stats::IntervalMethod;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the analysed directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "sweeplog.toml";

/// Contents of a `sweeplog.toml` file; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub profile: Option<ReportProfile>,
    pub interval_method: Option<IntervalMethod>,
    pub output: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Explicit file if given, else `sweeplog.toml` in `dir` if present
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("Loading config from {}", candidate.display());
            return Self::from_file(candidate);
        }
        Ok(Self::default())
    }
}

/// Values supplied on the command line, each overriding the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<ReportProfile>,
    pub interval_method: Option<IntervalMethod>,
    pub output: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dir: PathBuf,
    pub profile: ReportProfile,
    pub interval_method: IntervalMethod,
    /// Summary path; `None` suppresses the JSON summary
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Merge CLI overrides over the config file over profile defaults
    pub fn resolve(dir: PathBuf, config: AnalysisConfig, cli: Overrides, write_json: bool) -> Self {
        let profile = cli.profile.or(config.profile).unwrap_or_default();
        let interval_method = cli
            .interval_method
            .or(config.interval_method)
            .unwrap_or_else(|| profile.default_interval_method());
        let output = write_json.then(|| {
            cli.output
                .or(config.output)
                .unwrap_or_else(|| dir.join(profile.default_summary_file()))
        });

        Self {
            dir,
            profile,
            interval_method,
            output,
        }
    }
}
