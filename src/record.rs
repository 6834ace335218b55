//! Core data model for parsed sweep logs
//!
//! A log file yields [`ParsedRow`]s plus [`ExperimentMetadata`]; the
//! aggregator turns each row into a [`LogRecord`] tagged with its
//! experiment and inherited run parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default optimizer when a log never names one
pub const DEFAULT_OPTIMIZER: &str = "ga";
/// Default fitness function when a log never names one
pub const DEFAULT_FITNESS: &str = "task";
/// Default energy model when a log never names one
pub const DEFAULT_ENERGY_MODEL: &str = "base";

/// Ternary outcome category
pub const TERNARY: u32 = 3;
/// Binary outcome category
pub const BINARY: u32 = 2;

/// Human-readable name for an `n_states` category
pub fn state_name(n_states: u32) -> String {
    match n_states {
        0 => "Analog".to_string(),
        1 => "Single".to_string(),
        2 => "Binary".to_string(),
        3 => "Ternary".to_string(),
        4 => "Quaternary".to_string(),
        n => format!("{}-state", n),
    }
}

/// Agreement across repeated runs of one parameter combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consensus {
    pub successes: u64,
    pub trials: u64,
}

impl Consensus {
    /// Build a consensus pair, rejecting `successes > trials`
    pub fn new(successes: u64, trials: u64) -> Option<Self> {
        (successes <= trials).then_some(Self { successes, trials })
    }
}

/// One `CSV_ROW` line as extracted by the parser, before tagging
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub sigma: f64,
    pub energy_zero: f64,
    pub energy_abs1: f64,
    pub n_states: u32,
    pub hysteresis: bool,
    pub consensus: Option<Consensus>,
}

/// A result row tagged with its experiment and run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub sigma: f64,
    pub energy_zero: f64,
    pub energy_abs1: f64,
    pub n_states: u32,
    pub hysteresis: bool,
    pub consensus: Option<Consensus>,
    /// File stem of the originating log
    pub experiment: String,
    pub optimizer: String,
    pub fitness: String,
    pub energy_model: String,
}

impl LogRecord {
    /// Tag a parsed row with experiment name and metadata-derived defaults
    pub fn from_parsed(row: ParsedRow, experiment: &str, metadata: &ExperimentMetadata) -> Self {
        Self {
            sigma: row.sigma,
            energy_zero: row.energy_zero,
            energy_abs1: row.energy_abs1,
            n_states: row.n_states,
            hysteresis: row.hysteresis,
            consensus: row.consensus,
            experiment: experiment.to_string(),
            optimizer: metadata.text_or("optimizer", DEFAULT_OPTIMIZER),
            fitness: metadata.text_or("fitness", DEFAULT_FITNESS),
            energy_model: metadata.text_or("energy_model", DEFAULT_ENERGY_MODEL),
        }
    }
}

/// Metadata value: integers stay integers in the JSON summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Int(i64),
    Text(String),
}

impl MetaValue {
    /// Integer when the raw token is all ASCII digits, text otherwise
    pub fn from_token(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return MetaValue::Int(n);
            }
        }
        MetaValue::Text(raw.to_string())
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Int(n) => write!(f, "{}", n),
            MetaValue::Text(s) => f.write_str(s),
        }
    }
}

/// Per-file key/value metadata from comment and parameter-echo lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentMetadata {
    entries: BTreeMap<String, MetaValue>,
}

impl ExperimentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, overwriting any earlier value
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Value rendered as text, or `default` when the key is absent
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| default.to_string())
    }

    /// Number of keys set
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One log file's rows and metadata, keyed by file stem
#[derive(Debug, Clone)]
pub struct ExperimentRecord {
    pub name: String,
    pub size_bytes: u64,
    pub rows: Vec<LogRecord>,
    pub metadata: ExperimentMetadata,
}
