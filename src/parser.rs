//! Log line classification and parsing
//!
//! A sweep log mixes three kinds of useful lines with arbitrary noise:
//!
//! ```text
//! # Seeds: 20
//! # Command: ./sweep --sweep-optimizer=cmaes --sweep-fitness=reg
//! gens=120 pop=40 optimizer=ga fitness=task energy_model=base
//! CSV_ROW,0.1,0.5,1.0,3,[H] agreed (18/20)
//! ```
//!
//! [`LogParser::classify`] turns each line into a [`LineKind`]; a single
//! loop in [`LogParser::parse`] folds the classified lines into a
//! [`ParsedLog`].

use crate::error::Result;
use crate::record::{Consensus, ExperimentMetadata, MetaValue, ParsedRow};
use regex::Regex;

/// Prefix of a data row
pub const DATA_ROW_PREFIX: &str = "CSV_ROW,";
/// Prefix of a comment line carrying metadata
pub const COMMENT_PREFIX: &str = "# ";
/// Free-text marker for a hysteretic run
pub const HYSTERESIS_MARKER: &str = "[H]";

/// Keys kept from an `optimizer=... fitness=...` parameter echo
const RUN_PARAMETER_KEYS: [&str; 3] = ["optimizer", "fitness", "energy_model"];

/// Classified view of a single log line
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// `# ` comment; may carry seeds or the command line
    Comment(CommentLine),
    /// Parameter echo with `key=value` tokens
    Parameters(Vec<(String, MetaValue)>),
    /// A well-formed `CSV_ROW`
    DataRow(ParsedRow),
    /// Noise, or a malformed data row
    Ignored,
}

/// Metadata carried by a comment line
#[derive(Debug, Clone, PartialEq)]
pub enum CommentLine {
    Seeds(i64),
    Command {
        command: String,
        optimizer: Option<String>,
        fitness: Option<String>,
    },
    Other,
}

/// Rows and metadata extracted from one log file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub rows: Vec<ParsedRow>,
    pub metadata: ExperimentMetadata,
    /// `CSV_ROW` lines that failed to parse
    pub skipped_rows: usize,
}

/// Line parser with its patterns compiled once
#[derive(Debug, Clone)]
pub struct LogParser {
    consensus: Regex,
    optimizer_flag: Regex,
    fitness_flag: Regex,
}

impl LogParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            consensus: Regex::new(r"\((\d+)/(\d+)\)")?,
            optimizer_flag: Regex::new(r"--sweep-optimizer=(\w+)")?,
            fitness_flag: Regex::new(r"--sweep-fitness=(\w+)")?,
        })
    }

    /// Parse the full text of one log file
    pub fn parse(&self, content: &str) -> ParsedLog {
        let mut parsed = ParsedLog::default();

        for line in content.lines() {
            match self.classify(line) {
                LineKind::Comment(CommentLine::Seeds(seeds)) => {
                    parsed.metadata.insert("seeds", MetaValue::Int(seeds));
                }
                LineKind::Comment(CommentLine::Command {
                    command,
                    optimizer,
                    fitness,
                }) => {
                    if let Some(optimizer) = optimizer {
                        parsed.metadata.insert("optimizer", MetaValue::Text(optimizer));
                    }
                    if let Some(fitness) = fitness {
                        parsed.metadata.insert("fitness", MetaValue::Text(fitness));
                    }
                    parsed.metadata.insert("command", MetaValue::Text(command));
                }
                LineKind::Comment(CommentLine::Other) => {}
                LineKind::Parameters(pairs) => {
                    for (key, value) in pairs {
                        parsed.metadata.insert(key, value);
                    }
                }
                LineKind::DataRow(row) => parsed.rows.push(row),
                LineKind::Ignored => {
                    if line.starts_with(DATA_ROW_PREFIX) {
                        tracing::debug!("Skipping malformed data row: {}", line);
                        parsed.skipped_rows += 1;
                    }
                }
            }
        }

        parsed
    }

    /// Classify one line. Comments win over parameter echoes, which win
    /// over data rows.
    pub fn classify(&self, line: &str) -> LineKind {
        if line.starts_with(COMMENT_PREFIX) {
            return LineKind::Comment(self.classify_comment(line));
        }
        if line.contains("gens=") && line.contains("pop=") {
            return LineKind::Parameters(parameter_tokens(line, None));
        }
        if line.contains("optimizer=") && line.contains("fitness=") {
            return LineKind::Parameters(parameter_tokens(line, Some(&RUN_PARAMETER_KEYS)));
        }
        if line.starts_with(DATA_ROW_PREFIX) {
            return match self.parse_data_row(line) {
                Some(row) => LineKind::DataRow(row),
                None => LineKind::Ignored,
            };
        }
        LineKind::Ignored
    }

    fn classify_comment(&self, line: &str) -> CommentLine {
        if line.contains("Seeds:") {
            return line
                .split_whitespace()
                .last()
                .and_then(|token| token.parse::<i64>().ok())
                .map(CommentLine::Seeds)
                .unwrap_or(CommentLine::Other);
        }
        if line.contains("Command:") {
            let command = line[COMMENT_PREFIX.len()..].trim().to_string();
            let optimizer = flag_value(&command, "--sweep-optimizer=", &self.optimizer_flag, "ga");
            let fitness = flag_value(&command, "--sweep-fitness=", &self.fitness_flag, "task");
            return CommentLine::Command {
                command,
                optimizer,
                fitness,
            };
        }
        CommentLine::Other
    }

    /// Parse `CSV_ROW,<sigma>,<e0>,<e1>,<n_states>,<free text>`
    pub fn parse_data_row(&self, line: &str) -> Option<ParsedRow> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 5 {
            return None;
        }

        let sigma = fields[1].trim().parse::<f64>().ok()?;
        let energy_zero = fields[2].trim().parse::<f64>().ok()?;
        let energy_abs1 = fields[3].trim().parse::<f64>().ok()?;
        let n_states = fields[4].trim().parse::<u32>().ok()?;

        let remainder = fields[5..].join(",");
        let hysteresis = remainder.contains(HYSTERESIS_MARKER);
        let consensus = self.consensus.captures(&remainder).and_then(|caps| {
            let successes = caps[1].parse::<u64>().ok()?;
            let trials = caps[2].parse::<u64>().ok()?;
            let consensus = Consensus::new(successes, trials);
            if consensus.is_none() {
                tracing::warn!(
                    "Dropping consensus ({}/{}) with more successes than trials",
                    successes,
                    trials
                );
            }
            consensus
        });

        Some(ParsedRow {
            sigma,
            energy_zero,
            energy_abs1,
            n_states,
            hysteresis,
            consensus,
        })
    }
}

/// Convenience wrapper compiling a parser for one-off use
pub fn parse_log(content: &str) -> Result<ParsedLog> {
    Ok(LogParser::new()?.parse(content))
}

/// Extract a `--flag=<word>` value; `fallback` when the flag is present
/// without a word value, `None` when the flag is absent
fn flag_value(command: &str, marker: &str, pattern: &Regex, fallback: &str) -> Option<String> {
    if !command.contains(marker) {
        return None;
    }
    let value = pattern
        .captures(command)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| fallback.to_string());
    Some(value)
}

/// Split whitespace-separated `key=value` tokens, optionally keeping only
/// the listed keys
fn parameter_tokens(line: &str, keep: Option<&[&str]>) -> Vec<(String, MetaValue)> {
    line.split_whitespace()
        .filter_map(|token| token.split_once('='))
        .filter(|(key, _)| keep.map_or(true, |keys| keys.contains(key)))
        .map(|(key, value)| {
            let value = match keep {
                // Run parameters are names, never counts
                Some(_) => MetaValue::Text(value.to_string()),
                None => MetaValue::from_token(value),
            };
            (key.to_string(), value)
        })
        .collect()
}
