//! Convergence comparisons and run-level conclusions
//!
//! These are the fixed, non-declarative tables of the report: generation
//! and population effects, and the headline rates the final summary
//! draws its conclusions from.

use crate::aggregate::Dataset;
use crate::hypothesis::OPTIMIZERS;
use crate::record::{LogRecord, BINARY, TERNARY};
use crate::stats::Proportion;
use serde::Serialize;

/// Experiment families compared at 120 vs 480 generations
pub const GENERATION_BASES: &[&str] = &["cont_base", "cont_leak", "binary", "discrete"];
/// Population sizes compared in `convergence_pop` runs
pub const POPULATION_SIZES: &[u32] = &[40, 200];

/// Ternary and binary rates of a row subset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateRates {
    pub ternary: f64,
    pub binary: f64,
}

impl StateRates {
    fn of(rows: &[&LogRecord]) -> Self {
        Self {
            ternary: Proportion::of_state(rows.iter().copied(), TERNARY).rate(),
            binary: Proportion::of_state(rows.iter().copied(), BINARY).rate(),
        }
    }
}

/// Short vs long run comparison for one experiment family
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationComparison {
    pub base: &'static str,
    pub short_run: StateRates,
    pub long_run: StateRates,
}

impl GenerationComparison {
    /// Change in ternary rate from 120 to 480 generations
    pub fn ternary_delta(&self) -> f64 {
        self.long_run.ternary - self.short_run.ternary
    }

    pub fn binary_delta(&self) -> f64 {
        self.long_run.binary - self.short_run.binary
    }
}

/// Ternary rate at one population size
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEffect {
    pub population: u32,
    pub ternary_rate: f64,
    pub rows: usize,
}

fn rows_containing<'a>(rows: &'a [LogRecord], fragment: &str) -> Vec<&'a LogRecord> {
    rows.iter()
        .filter(|row| row.experiment.contains(fragment))
        .collect()
}

/// 120 vs 480 generation rates for each family that has both runs
pub fn generation_comparisons(rows: &[LogRecord]) -> Vec<GenerationComparison> {
    GENERATION_BASES
        .iter()
        .filter_map(|&base| {
            let short = rows_containing(rows, &format!("{}_g120", base));
            let long = rows_containing(rows, &format!("{}_g480", base));
            if short.is_empty() || long.is_empty() {
                return None;
            }
            Some(GenerationComparison {
                base,
                short_run: StateRates::of(&short),
                long_run: StateRates::of(&long),
            })
        })
        .collect()
}

/// Ternary rate by population size among `convergence_pop` runs
pub fn population_effects(rows: &[LogRecord]) -> Vec<PopulationEffect> {
    let pop_rows = rows_containing(rows, "convergence_pop");
    POPULATION_SIZES
        .iter()
        .filter_map(|&population| {
            let marker = format!("pop{}", population);
            let subset: Vec<&LogRecord> = pop_rows
                .iter()
                .copied()
                .filter(|row| row.experiment.contains(&marker))
                .collect();
            if subset.is_empty() {
                return None;
            }
            Some(PopulationEffect {
                population,
                ternary_rate: StateRates::of(&subset).ternary,
                rows: subset.len(),
            })
        })
        .collect()
}

/// Experiment counts by family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentCounts {
    pub continuous: usize,
    pub binary: usize,
    pub discrete: usize,
    pub total: usize,
}

/// Headline rates of the final report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conclusions {
    /// Ternary rate over all continuous-only rows
    pub continuous_ternary_rate: Option<f64>,
    /// Ternary rate over all discrete-only rows
    pub discrete_ternary_rate: Option<f64>,
    /// Binary rate over all binary-only rows
    pub binary_constraint_rate: Option<f64>,
    /// No optimizer yields a ternary outcome in continuous-only runs
    pub optimizer_consistency: bool,
    #[serde(skip)]
    pub counts: ExperimentCounts,
}

/// Rate above which continuous-only runs confirm ternary emergence
pub const TERNARY_EMERGENCE_THRESHOLD: f64 = 0.1;
/// Rate above which discrete-only runs count as ternary with quantizers
pub const QUANTIZED_TERNARY_THRESHOLD: f64 = 0.5;
/// Rate above which the binary-only constraint is considered effective
pub const BINARY_CONSTRAINT_THRESHOLD: f64 = 0.9;

impl Conclusions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let rows = &dataset.rows;
        let rate = |fragment: &str, state: u32| {
            Proportion::of_state(rows_containing(rows, fragment), state).checked_rate()
        };

        let optimizer_consistency = !rows.iter().any(|row| {
            row.experiment.contains("cont_")
                && OPTIMIZERS.contains(&row.optimizer.as_str())
                && row.n_states == TERNARY
        });

        Self {
            continuous_ternary_rate: rate("cont_", TERNARY),
            discrete_ternary_rate: rate("discrete_", TERNARY),
            binary_constraint_rate: rate("binary_", BINARY),
            optimizer_consistency,
            counts: ExperimentCounts {
                continuous: dataset.experiments_matching("cont_"),
                binary: dataset.experiments_matching("binary_"),
                discrete: dataset.experiments_matching("discrete_"),
                total: dataset.experiment_count(),
            },
        }
    }

    pub fn continuous_verdict(&self) -> &'static str {
        match self.continuous_ternary_rate {
            Some(rate) if rate > TERNARY_EMERGENCE_THRESHOLD => "TERNARY EMERGENCE CONFIRMED",
            _ => "NO SIGNIFICANT TERNARY EMERGENCE",
        }
    }

    pub fn discrete_verdict(&self) -> &'static str {
        match self.discrete_ternary_rate {
            Some(rate) if rate > QUANTIZED_TERNARY_THRESHOLD => "TERNARY WITH QUANTIZERS",
            _ => "LIMITED TERNARY",
        }
    }

    pub fn binary_verdict(&self) -> &'static str {
        match self.binary_constraint_rate {
            Some(rate) if rate > BINARY_CONSTRAINT_THRESHOLD => "CONSTRAINTS WORK",
            _ => "CONSTRAINT VIOLATION",
        }
    }

    pub fn consistency_verdict(&self) -> &'static str {
        if self.optimizer_consistency {
            "CONFIRMED - no optimizer produces ternary in continuous systems"
        } else {
            "OPTIMIZER-DEPENDENT - ternary emergence varies by algorithm"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ExperimentMetadata, ExperimentRecord};
    use std::collections::BTreeMap;

    fn row(experiment: &str, n_states: u32) -> LogRecord {
        LogRecord {
            sigma: 0.1,
            energy_zero: 0.5,
            energy_abs1: 1.0,
            n_states,
            hysteresis: false,
            consensus: None,
            experiment: experiment.to_string(),
            optimizer: "ga".to_string(),
            fitness: "task".to_string(),
            energy_model: "base".to_string(),
        }
    }

    fn dataset(rows: Vec<LogRecord>) -> Dataset {
        let mut experiments = BTreeMap::new();
        for r in &rows {
            experiments
                .entry(r.experiment.clone())
                .or_insert_with(|| ExperimentRecord {
                    name: r.experiment.clone(),
                    size_bytes: 0,
                    rows: Vec::new(),
                    metadata: ExperimentMetadata::new(),
                })
                .rows
                .push(r.clone());
        }
        Dataset { rows, experiments }
    }

    #[test]
    fn test_generation_comparison_requires_both_runs() {
        let rows = vec![
            row("cont_base_g120", 3),
            row("cont_base_g120", 2),
            row("cont_base_g480", 3),
            row("binary_g120", 2),
        ];
        let comparisons = generation_comparisons(&rows);
        assert_eq!(comparisons.len(), 1);
        let c = &comparisons[0];
        assert_eq!(c.base, "cont_base");
        assert_eq!(c.short_run.ternary, 0.5);
        assert_eq!(c.long_run.ternary, 1.0);
        assert_eq!(c.ternary_delta(), 0.5);
        assert_eq!(c.binary_delta(), -0.5);
    }

    #[test]
    fn test_population_effects() {
        let rows = vec![
            row("convergence_pop40", 3),
            row("convergence_pop40", 2),
            row("convergence_pop200", 3),
            row("cont_base_pop40", 3),
        ];
        let effects = population_effects(&rows);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].population, 40);
        assert_eq!(effects[0].ternary_rate, 0.5);
        assert_eq!(effects[0].rows, 2);
        assert_eq!(effects[1].population, 200);
        assert_eq!(effects[1].ternary_rate, 1.0);
    }

    #[test]
    fn test_conclusions() {
        let data = dataset(vec![
            row("cont_base_g120", 2),
            row("cont_base_g120", 2),
            row("discrete_g120", 3),
            row("binary_g120", 2),
        ]);
        let c = Conclusions::from_dataset(&data);
        assert_eq!(c.continuous_ternary_rate, Some(0.0));
        assert_eq!(c.discrete_ternary_rate, Some(1.0));
        assert_eq!(c.binary_constraint_rate, Some(1.0));
        assert!(c.optimizer_consistency);
        assert_eq!(c.counts.continuous, 1);
        assert_eq!(c.counts.total, 3);
        assert_eq!(c.continuous_verdict(), "NO SIGNIFICANT TERNARY EMERGENCE");
        assert_eq!(c.discrete_verdict(), "TERNARY WITH QUANTIZERS");
        assert_eq!(c.binary_verdict(), "CONSTRAINTS WORK");
    }

    #[test]
    fn test_conclusions_missing_family_is_none() {
        let data = dataset(vec![row("cont_base_g120", 3)]);
        let c = Conclusions::from_dataset(&data);
        assert_eq!(c.discrete_ternary_rate, None);
        assert_eq!(c.binary_constraint_rate, None);
        assert!(!c.optimizer_consistency);
        assert_eq!(c.binary_verdict(), "CONSTRAINT VIOLATION");
    }

    #[test]
    fn test_conclusions_serialize_null_rates() {
        let data = dataset(vec![row("cont_base_g120", 3)]);
        let json = serde_json::to_value(Conclusions::from_dataset(&data)).unwrap();
        assert_eq!(json["continuous_ternary_rate"], 1.0);
        assert!(json["discrete_ternary_rate"].is_null());
        assert!(json.get("counts").is_none());
    }
}
