//! Declarative hypothesis checks
//!
//! Each research claim is a [`Hypothesis`]: a row scope, an optional
//! segmentation, the outcome states to tally and a [`Check`]. One
//! evaluation loop ([`evaluate`]) serves every entry of the tables
//! returned by [`comprehensive_hypotheses`] and [`final_hypotheses`].
//!
//! # Example
//!
//! ```
//! use sweeplog::hypothesis::{evaluate, Check, Hypothesis, RowFilter, Split};
//! use sweeplog::stats::IntervalMethod;
//!
//! let h = Hypothesis::new("H3", "Binary-only constraint")
//!     .scope(RowFilter::experiment("binary_"))
//!     .states(&[2])
//!     .check(Check::LowerBoundAtLeast { state: 2, threshold: 0.90 });
//!
//! // No rows in scope: the hypothesis is omitted
//! assert!(evaluate(&h, &[], IntervalMethod::Wilson).is_none());
//! ```

use crate::record::{state_name, LogRecord, BINARY, TERNARY};
use crate::stats::{is_non_increasing, Interval, IntervalMethod, Proportion};

/// Optimizers compared in the by-optimizer checks
pub const OPTIMIZERS: &[&str] = &["ga", "random", "cmaes"];
/// Fitness functions compared in the robustness check
pub const FITNESS_FUNCTIONS: &[&str] = &["task", "reg", "info"];
/// Energy models compared in the robustness check
pub const ENERGY_MODELS: &[&str] = &["base", "asym", "leak"];

/// Row selection by experiment name and noise level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub experiment_contains: Option<&'static str>,
    pub max_sigma: Option<f64>,
    pub sigma: Option<f64>,
}

impl RowFilter {
    /// Rows whose experiment name contains `fragment`
    pub fn experiment(fragment: &'static str) -> Self {
        Self {
            experiment_contains: Some(fragment),
            ..Self::default()
        }
    }

    pub fn max_sigma(mut self, sigma: f64) -> Self {
        self.max_sigma = Some(sigma);
        self
    }

    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn matches(&self, row: &LogRecord) -> bool {
        self.experiment_contains
            .map_or(true, |f| row.experiment.contains(f))
            && self.max_sigma.map_or(true, |s| row.sigma <= s)
            && self.sigma.map_or(true, |s| row.sigma == s)
    }

    pub fn select<'a>(&self, rows: &'a [LogRecord]) -> Vec<&'a LogRecord> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// How the scoped rows are broken into segments
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    /// One unlabeled segment
    None,
    /// One segment per listed optimizer, in list order
    Optimizer(&'static [&'static str]),
    /// One segment per listed fitness function, in list order
    Fitness(&'static [&'static str]),
    /// One segment per listed energy model, in list order
    EnergyModel(&'static [&'static str]),
    /// One segment per distinct `_`-separated token of the experiment name,
    /// sorted by token
    ExperimentToken(usize),
    /// One segment per distinct `energy_zero`, ascending
    EnergyZero,
}

impl Split {
    fn segments<'a>(&self, rows: Vec<&'a LogRecord>) -> Vec<(Option<String>, Vec<&'a LogRecord>)> {
        let segments = match self {
            Split::None => vec![(None, rows)],
            Split::Optimizer(values) => listed(&rows, values, |r| r.optimizer.as_str()),
            Split::Fitness(values) => listed(&rows, values, |r| r.fitness.as_str()),
            Split::EnergyModel(values) => listed(&rows, values, |r| r.energy_model.as_str()),
            Split::ExperimentToken(index) => {
                let mut tokens: Vec<&str> = rows
                    .iter()
                    .map(|r| experiment_token(&r.experiment, *index))
                    .collect();
                tokens.sort_unstable();
                tokens.dedup();
                tokens
                    .into_iter()
                    .map(|token| {
                        let subset = rows
                            .iter()
                            .copied()
                            .filter(|r| experiment_token(&r.experiment, *index) == token)
                            .collect();
                        (Some(token.to_string()), subset)
                    })
                    .collect()
            }
            Split::EnergyZero => {
                let mut values: Vec<f64> = rows.iter().map(|r| r.energy_zero).collect();
                values.sort_by(f64::total_cmp);
                values.dedup();
                values
                    .into_iter()
                    .map(|value| {
                        let subset = rows
                            .iter()
                            .copied()
                            .filter(|r| r.energy_zero == value)
                            .collect();
                        (Some(format!("E₀={:4.1}", value)), subset)
                    })
                    .collect()
            }
        };

        segments
            .into_iter()
            .filter(|(_, subset)| !subset.is_empty())
            .collect()
    }
}

/// One segment per listed value, labeled in upper case
fn listed<'a>(
    rows: &[&'a LogRecord],
    values: &[&str],
    key: fn(&LogRecord) -> &str,
) -> Vec<(Option<String>, Vec<&'a LogRecord>)> {
    values
        .iter()
        .map(|value| {
            let subset = rows.iter().copied().filter(|r| key(*r) == *value).collect();
            (Some(value.to_uppercase()), subset)
        })
        .collect()
}

fn experiment_token(experiment: &str, index: usize) -> &str {
    experiment.split('_').nth(index).unwrap_or("")
}

/// What a hypothesis asserts about its segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// Tallies only, no verdict
    Describe,
    /// `state` is more frequent than `rival` and their intervals do not
    /// overlap, in every segment
    Exceeds { state: u32, rival: u32 },
    /// Interval lower bound of `state` reaches `threshold`, in every segment
    LowerBoundAtLeast { state: u32, threshold: f64 },
    /// `state` never occurs, in any segment
    Absent { state: u32 },
    /// Rate of `state` never rises from one segment to the next
    NonIncreasing { state: u32 },
}

impl Check {
    fn segment_verdict(&self, rows: &[&LogRecord], method: IntervalMethod) -> Option<bool> {
        match *self {
            Check::Exceeds { state, rival } => {
                let ours = Proportion::of_state(rows.iter().copied(), state);
                let theirs = Proportion::of_state(rows.iter().copied(), rival);
                Some(
                    ours.rate() > theirs.rate()
                        && ours.interval(method).entirely_above(&theirs.interval(method)),
                )
            }
            Check::LowerBoundAtLeast { state, threshold } => {
                let p = Proportion::of_state(rows.iter().copied(), state);
                Some(p.interval(method).lower >= threshold)
            }
            Check::Absent { state } => Some(rows.iter().all(|r| r.n_states != state)),
            Check::Describe | Check::NonIncreasing { .. } => None,
        }
    }
}

/// Text shown for a passing or failing verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictLabels {
    pub pass: &'static str,
    pub fail: &'static str,
}

impl VerdictLabels {
    pub const PASS_FAIL: VerdictLabels = VerdictLabels {
        pass: "PASS",
        fail: "FAIL",
    };

    pub fn label(&self, passed: bool) -> &'static str {
        if passed {
            self.pass
        } else {
            self.fail
        }
    }
}

/// A named, declarative research claim
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub id: &'static str,
    pub title: &'static str,
    pub scope: RowFilter,
    pub split: Split,
    pub states: &'static [u32],
    pub check: Check,
    pub labels: VerdictLabels,
}

impl Hypothesis {
    pub fn new(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            scope: RowFilter::default(),
            split: Split::None,
            states: &[TERNARY, BINARY],
            check: Check::Describe,
            labels: VerdictLabels::PASS_FAIL,
        }
    }

    pub fn scope(mut self, scope: RowFilter) -> Self {
        self.scope = scope;
        self
    }

    pub fn split(mut self, split: Split) -> Self {
        self.split = split;
        self
    }

    pub fn states(mut self, states: &'static [u32]) -> Self {
        self.states = states;
        self
    }

    pub fn check(mut self, check: Check) -> Self {
        self.check = check;
        self
    }

    pub fn labels(mut self, pass: &'static str, fail: &'static str) -> Self {
        self.labels = VerdictLabels { pass, fail };
        self
    }
}

/// Count and interval of one outcome state within a segment
#[derive(Debug, Clone, PartialEq)]
pub struct StateTally {
    pub n_states: u32,
    pub proportion: Proportion,
    pub interval: Interval,
}

impl StateTally {
    pub fn name(&self) -> String {
        state_name(self.n_states)
    }
}

/// Result for one segment of a hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOutcome {
    pub label: Option<String>,
    pub tallies: Vec<StateTally>,
    /// Rate of the checked state, when the check names one
    pub checked_rate: Option<f64>,
    /// Rate of the checked state minus its rival (`Exceeds` only)
    pub advantage: Option<f64>,
    pub passed: Option<bool>,
}

/// Result of evaluating a hypothesis over the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisOutcome {
    pub id: &'static str,
    pub title: &'static str,
    pub check: Check,
    pub segments: Vec<SegmentOutcome>,
    pub passed: Option<bool>,
    pub labels: VerdictLabels,
}

impl HypothesisOutcome {
    pub fn verdict(&self) -> Option<&'static str> {
        self.passed.map(|p| self.labels.label(p))
    }
}

/// Evaluate one hypothesis; `None` when its scope selects no rows
pub fn evaluate(
    hypothesis: &Hypothesis,
    rows: &[LogRecord],
    method: IntervalMethod,
) -> Option<HypothesisOutcome> {
    let scoped = hypothesis.scope.select(rows);
    if scoped.is_empty() {
        tracing::debug!("Hypothesis {} has no rows in scope", hypothesis.id);
        return None;
    }

    let segments: Vec<SegmentOutcome> = hypothesis
        .split
        .segments(scoped)
        .into_iter()
        .map(|(label, subset)| evaluate_segment(hypothesis, label, &subset, method))
        .collect();

    if segments.is_empty() {
        return None;
    }

    let passed = match hypothesis.check {
        Check::Describe => None,
        Check::NonIncreasing { .. } => {
            let rates: Vec<f64> = segments.iter().filter_map(|s| s.checked_rate).collect();
            Some(is_non_increasing(&rates))
        }
        _ => Some(segments.iter().all(|s| s.passed == Some(true))),
    };

    Some(HypothesisOutcome {
        id: hypothesis.id,
        title: hypothesis.title,
        check: hypothesis.check,
        segments,
        passed,
        labels: hypothesis.labels,
    })
}

fn evaluate_segment(
    hypothesis: &Hypothesis,
    label: Option<String>,
    rows: &[&LogRecord],
    method: IntervalMethod,
) -> SegmentOutcome {
    let tallies = hypothesis
        .states
        .iter()
        .map(|&n_states| {
            let proportion = Proportion::of_state(rows.iter().copied(), n_states);
            StateTally {
                n_states,
                proportion,
                interval: proportion.interval(method),
            }
        })
        .collect();

    let rate_of = |state: u32| Proportion::of_state(rows.iter().copied(), state).rate();
    let (checked_rate, advantage) = match hypothesis.check {
        Check::Describe => (None, None),
        Check::Exceeds { state, rival } => {
            (Some(rate_of(state)), Some(rate_of(state) - rate_of(rival)))
        }
        Check::LowerBoundAtLeast { state, .. }
        | Check::Absent { state }
        | Check::NonIncreasing { state } => (Some(rate_of(state)), None),
    };

    SegmentOutcome {
        label,
        tallies,
        checked_rate,
        advantage,
        passed: hypothesis.check.segment_verdict(rows, method),
    }
}

/// Claims checked by the comprehensive report
pub fn comprehensive_hypotheses() -> Vec<Hypothesis> {
    vec![
        Hypothesis::new("H1", "Continuous-only at low noise (σ≤0.3)")
            .scope(RowFilter::experiment("cont_").max_sigma(0.3))
            .states(&[TERNARY, BINARY])
            .check(Check::Exceeds {
                state: TERNARY,
                rival: BINARY,
            }),
        Hypothesis::new("H2", "Energy zero sensitivity (σ=0.1, continuous-only)")
            .scope(RowFilter::experiment("cont_base").sigma(0.1))
            .split(Split::EnergyZero)
            .states(&[TERNARY])
            .check(Check::NonIncreasing { state: TERNARY }),
        Hypothesis::new("H3", "Binary-only constraint")
            .scope(RowFilter::experiment("binary_"))
            .states(&[BINARY])
            .check(Check::LowerBoundAtLeast {
                state: BINARY,
                threshold: 0.90,
            }),
    ]
}

/// Energy-model ablations, grouped by the model token of the experiment name
pub fn ablation_robustness() -> Vec<Hypothesis> {
    vec![Hypothesis::new("ABL", "Energy model ablations")
        .scope(RowFilter::experiment("ablation_"))
        .split(Split::ExperimentToken(1))
        .states(&[TERNARY, BINARY])]
}

/// Claims checked by the final report, in section order
pub fn final_hypotheses() -> Vec<Hypothesis> {
    vec![
        Hypothesis::new("H1", "Continuous-only by optimizer (σ≤0.3)")
            .scope(RowFilter::experiment("cont_").max_sigma(0.3))
            .split(Split::Optimizer(OPTIMIZERS))
            .states(&[TERNARY, BINARY])
            .check(Check::Absent { state: TERNARY })
            .labels("CONSISTENT ACROSS OPTIMIZERS", "OPTIMIZER-DEPENDENT"),
        Hypothesis::new("H3", "Binary-only constraint by optimizer")
            .scope(RowFilter::experiment("binary_"))
            .split(Split::Optimizer(OPTIMIZERS))
            .states(&[BINARY])
            .check(Check::LowerBoundAtLeast {
                state: BINARY,
                threshold: 0.90,
            }),
        Hypothesis::new("H5", "Fitness function robustness")
            .scope(RowFilter::experiment("fitness_"))
            .split(Split::Fitness(FITNESS_FUNCTIONS))
            .states(&[TERNARY]),
        Hypothesis::new("EM", "Energy model robustness (continuous-only)")
            .scope(RowFilter::experiment("cont_"))
            .split(Split::EnergyModel(ENERGY_MODELS))
            .states(&[TERNARY]),
    ]
}
