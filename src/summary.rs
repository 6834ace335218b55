//! JSON summary of a validation run
//!
//! The summary keeps a stable top-level shape across profiles:
//! `total_experiments`, `total_combinations`, `state_distribution`, the
//! profile's rate fields, `hypotheses` and `experiments`. Every map is
//! ordered, so two runs over the same logs serialize byte-for-byte equal.

use crate::aggregate::Dataset;
use crate::analysis::Conclusions;
use crate::hypothesis::HypothesisOutcome;
use crate::record::ExperimentMetadata;
use crate::stats::{count_states, IntervalMethod, Proportion};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Per-experiment entry of the summary
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExperimentSummary {
    /// Number of parsed result rows
    pub conditions: usize,
    pub metadata: ExperimentMetadata,
}

/// Verdict of one hypothesis that carries a check
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HypothesisVerdict {
    pub id: String,
    pub title: String,
    pub passed: bool,
    pub verdict: String,
}

/// Root JSON summary structure
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub total_experiments: usize,
    pub total_combinations: usize,
    pub state_distribution: BTreeMap<u32, usize>,
    pub interval_method: IntervalMethod,
    /// Fraction of rows flagged `[H]` (comprehensive profile)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hysteresis_rate: Option<f64>,
    /// Headline rates (final profile)
    #[serde(flatten)]
    pub conclusions: Option<Conclusions>,
    pub hypotheses: Vec<HypothesisVerdict>,
    pub experiments: BTreeMap<String, ExperimentSummary>,
}

impl SummaryReport {
    /// Build the totals, distribution and experiment map from a dataset
    pub fn new(dataset: &Dataset, interval_method: IntervalMethod) -> Self {
        let experiments = dataset
            .experiments
            .iter()
            .map(|(name, exp)| {
                (
                    name.clone(),
                    ExperimentSummary {
                        conditions: exp.rows.len(),
                        metadata: exp.metadata.clone(),
                    },
                )
            })
            .collect();

        Self {
            total_experiments: dataset.experiment_count(),
            total_combinations: dataset.rows.len(),
            state_distribution: count_states(&dataset.rows),
            interval_method,
            hysteresis_rate: None,
            conclusions: None,
            hypotheses: Vec::new(),
            experiments,
        }
    }

    /// Record the share of hysteretic rows
    pub fn with_hysteresis_rate(mut self, dataset: &Dataset) -> Self {
        self.hysteresis_rate = Some(Proportion::of(&dataset.rows, |row| row.hysteresis).rate());
        self
    }

    pub fn with_conclusions(mut self, conclusions: Conclusions) -> Self {
        self.conclusions = Some(conclusions);
        self
    }

    /// Add verdicts of the outcomes that have one, in the order given
    pub fn add_outcomes<'a, I>(&mut self, outcomes: I)
    where
        I: IntoIterator<Item = &'a HypothesisOutcome>,
    {
        for outcome in outcomes {
            if let (Some(passed), Some(verdict)) = (outcome.passed, outcome.verdict()) {
                self.hypotheses.push(HypothesisVerdict {
                    id: outcome.id.to_string(),
                    title: outcome.title.to_string(),
                    passed,
                    verdict: verdict.to_string(),
                });
            }
        }
    }

    /// Serialize to indented JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the indented JSON summary to `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        tracing::debug!("Wrote summary to {}", path.display());
        Ok(())
    }
}
