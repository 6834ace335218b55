//! Binomial statistics over parsed log records
//!
//! Counts, rates and 95% confidence intervals. The interval formula is a
//! strategy ([`IntervalMethod`]) chosen by configuration: the Wald normal
//! approximation and the Wilson score interval disagree at small sample
//! sizes, so neither is hard-wired.

use crate::record::LogRecord;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// z-score for a two-sided 95% interval
pub const Z_95: f64 = 1.96;

/// Binomial confidence interval formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMethod {
    /// Normal approximation: p ± z·sqrt(p(1-p)/n)
    Wald,
    /// Wilson score interval, better behaved for small n
    Wilson,
}

impl fmt::Display for IntervalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalMethod::Wald => f.write_str("wald"),
            IntervalMethod::Wilson => f.write_str("wilson"),
        }
    }
}

/// Probability bounds, both within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        lower: 0.0,
        upper: 0.0,
    };

    fn clamped(lower: f64, upper: f64) -> Self {
        Self {
            lower: lower.max(0.0),
            upper: upper.min(1.0),
        }
    }

    /// True when this interval lies strictly above `other`
    pub fn entirely_above(&self, other: &Interval) -> bool {
        self.lower > other.upper
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}-{:.3}", self.lower, self.upper)
    }
}

/// 95% confidence interval for `successes` out of `trials`
///
/// Returns `(0, 0)` when `trials == 0`.
pub fn confidence_interval(successes: u64, trials: u64, method: IntervalMethod) -> Interval {
    if trials == 0 {
        return Interval::EMPTY;
    }

    let n = trials as f64;
    let p = successes as f64 / n;

    match method {
        IntervalMethod::Wald => {
            let margin = Z_95 * (p * (1.0 - p) / n).sqrt();
            Interval::clamped(p - margin, p + margin)
        }
        IntervalMethod::Wilson => {
            let z2 = Z_95 * Z_95;
            let denominator = 1.0 + z2 / n;
            let centre = (p + z2 / (2.0 * n)) / denominator;
            let margin = Z_95 * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt() / denominator;
            Interval::clamped(centre - margin, centre + margin)
        }
    }
}

/// Successes out of trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Proportion {
    pub successes: u64,
    pub trials: u64,
}

impl Proportion {
    pub fn new(successes: u64, trials: u64) -> Self {
        Self { successes, trials }
    }

    /// Count rows satisfying `predicate`
    pub fn of<'a, I, F>(rows: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = &'a LogRecord>,
        F: Fn(&LogRecord) -> bool,
    {
        rows.into_iter().fold(Self::default(), |acc, row| Self {
            successes: acc.successes + u64::from(predicate(row)),
            trials: acc.trials + 1,
        })
    }

    /// Rate of rows in state `n_states`
    pub fn of_state<'a, I>(rows: I, n_states: u32) -> Self
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        Self::of(rows, |row| row.n_states == n_states)
    }

    /// Success rate, 0 when there are no trials
    pub fn rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.successes as f64 / self.trials as f64
        }
    }

    /// Success rate, `None` when there are no trials
    pub fn checked_rate(&self) -> Option<f64> {
        (self.trials > 0).then(|| self.rate())
    }

    pub fn interval(&self, method: IntervalMethod) -> Interval {
        confidence_interval(self.successes, self.trials, method)
    }
}

/// Histogram of `n_states`, keys ascending
pub fn count_states<'a, I>(rows: I) -> BTreeMap<u32, usize>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.n_states).or_insert(0) += 1;
    }
    counts
}

/// True when no rate exceeds the one before it
pub fn is_non_increasing(rates: &[f64]) -> bool {
    rates.windows(2).all(|pair| pair[1] <= pair[0])
}

/// Integers up to 2^24 are exact in `f32`, and so is any sum of them
/// that stays within that bound
const F32_EXACT_INTEGER: u64 = 1 << 24;

/// Mean consensus trial count ("seeds per combination")
///
/// Sums with Trueno SIMD when the total cannot leave the exact integer
/// range of `f32`, with wide integer arithmetic otherwise. `None` when no
/// row reports a consensus tuple.
pub fn mean_consensus_trials(rows: &[LogRecord]) -> Option<f64> {
    let trials: Vec<u64> = rows
        .iter()
        .filter_map(|row| row.consensus.map(|c| c.trials))
        .collect();

    if trials.is_empty() {
        return None;
    }

    let n = trials.len() as u64;
    let simd_total = trials
        .iter()
        .all(|&t| t <= F32_EXACT_INTEGER / n)
        .then(|| {
            let values: Vec<f32> = trials.iter().map(|&t| t as f32).collect();
            trueno::Vector::from_slice(&values).sum().ok()
        })
        .flatten();

    let total = simd_total.map_or_else(
        || trials.iter().map(|&t| u128::from(t)).sum::<u128>() as f64,
        f64::from,
    );
    Some(total / n as f64)
}
