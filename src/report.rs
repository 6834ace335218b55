//! Console report rendering
//!
//! [`write_report`] walks the profile's sections in order, prints each one
//! and collects everything the JSON summary needs along the way.

use crate::aggregate::Dataset;
use crate::analysis::{generation_comparisons, population_effects, Conclusions};
use crate::hypothesis::{evaluate, Check, Hypothesis, HypothesisOutcome, StateTally};
use crate::profile::{ReportProfile, Section};
use crate::record::state_name;
use crate::stats::{count_states, mean_consensus_trials, IntervalMethod, Proportion};
use crate::summary::SummaryReport;
use std::io::{self, Write};

/// Indentation of lines inside a block
const INDENT: &str = "     ";

/// Print the report for `profile` and return the matching summary
pub fn write_report<W: Write>(
    out: &mut W,
    dataset: &Dataset,
    profile: ReportProfile,
    method: IntervalMethod,
) -> io::Result<SummaryReport> {
    let mut outcomes: Vec<HypothesisOutcome> = Vec::new();
    let mut conclusions = None;

    for section in profile.sections() {
        match section {
            Section::Header => write_header(out, profile.title(), dataset)?,
            Section::Distribution {
                with_hysteresis,
                with_intervals,
            } => write_distribution(out, dataset, with_hysteresis, with_intervals, method)?,
            Section::Hypotheses {
                heading,
                hypotheses,
            } => {
                let evaluated = evaluate_all(&hypotheses, dataset, method);
                write_hypotheses(out, heading, &evaluated)?;
                outcomes.extend(evaluated);
            }
            Section::Convergence => write_convergence(out, dataset)?,
            Section::ExperimentListing => write_listing(out, dataset)?,
            Section::Conclusions => {
                let c = Conclusions::from_dataset(dataset);
                write_conclusions(out, &c)?;
                conclusions = Some(c);
            }
        }
    }

    let mut summary = SummaryReport::new(dataset, method);
    if profile == ReportProfile::Comprehensive {
        summary = summary.with_hysteresis_rate(dataset);
    }
    if let Some(c) = conclusions {
        summary = summary.with_conclusions(c);
    }
    summary.add_outcomes(&outcomes);
    Ok(summary)
}

fn evaluate_all(
    hypotheses: &[Hypothesis],
    dataset: &Dataset,
    method: IntervalMethod,
) -> Vec<HypothesisOutcome> {
    hypotheses
        .iter()
        .filter_map(|h| evaluate(h, &dataset.rows, method))
        .collect()
}

fn write_header<W: Write>(out: &mut W, title: &str, dataset: &Dataset) -> io::Result<()> {
    writeln!(out, "=== {} ===", title)?;
    writeln!(out, "Total experiments: {}", dataset.experiment_count())?;
    writeln!(out, "Total parameter combinations: {}", dataset.rows.len())?;
    if let Some(seeds) = mean_consensus_trials(&dataset.rows) {
        writeln!(out, "Average seeds per combination: {:.1}", seeds)?;
    }
    writeln!(out)
}

fn write_distribution<W: Write>(
    out: &mut W,
    dataset: &Dataset,
    with_hysteresis: bool,
    with_intervals: bool,
    method: IntervalMethod,
) -> io::Result<()> {
    if with_intervals {
        writeln!(out, "=== OVERALL STATE DISTRIBUTION (with 95% CIs) ===")?;
    } else {
        writeln!(out, "=== OVERALL STATE DISTRIBUTION ===")?;
    }

    let total = dataset.rows.len();
    for (n_states, count) in count_states(&dataset.rows) {
        let name = state_name(n_states);
        if with_intervals {
            let p = Proportion::new(count as u64, total as u64);
            writeln!(
                out,
                "{:10}: {:4}/{} ({:.3}) [95% CI: {}]",
                name,
                count,
                total,
                p.rate(),
                p.interval(method)
            )?;
        } else {
            writeln!(out, "{:10}: {:4} ({:5.1}%)", name, count, percent(count, total))?;
        }
    }

    if with_hysteresis {
        let hysteresis = dataset.rows.iter().filter(|r| r.hysteresis).count();
        writeln!(
            out,
            "{:10}: {:4} ({:5.1}%)",
            "Hysteresis",
            hysteresis,
            percent(hysteresis, total)
        )?;
    }
    writeln!(out)
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

fn format_tally(tally: &StateTally) -> String {
    format!(
        "{}: {}/{} ({:.3}) [95% CI: {}]",
        tally.name(),
        tally.proportion.successes,
        tally.proportion.trials,
        tally.proportion.rate(),
        tally.interval
    )
}

fn write_hypotheses<W: Write>(
    out: &mut W,
    heading: &str,
    outcomes: &[HypothesisOutcome],
) -> io::Result<()> {
    writeln!(out, "=== {} ===", heading)?;
    if outcomes.is_empty() {
        writeln!(out, "{}(no matching data)", INDENT)?;
        writeln!(out)?;
    }
    for outcome in outcomes {
        write_outcome(out, outcome)?;
    }
    Ok(())
}

fn write_outcome<W: Write>(out: &mut W, outcome: &HypothesisOutcome) -> io::Result<()> {
    writeln!(out, "{} - {}:", outcome.id, outcome.title)?;

    let per_segment_verdict = matches!(
        outcome.check,
        Check::Exceeds { .. } | Check::LowerBoundAtLeast { .. }
    );

    for segment in &outcome.segments {
        let tallies: Vec<String> = segment.tallies.iter().map(format_tally).collect();
        match &segment.label {
            None => {
                for tally in &tallies {
                    writeln!(out, "{}{}", INDENT, tally)?;
                }
                if let Some(advantage) = segment.advantage {
                    writeln!(out, "{}Advantage: {:+.3}", INDENT, advantage)?;
                }
            }
            Some(label) => {
                let suffix = match segment.passed {
                    Some(passed) if per_segment_verdict => {
                        format!(" - {}", if passed { "PASS" } else { "FAIL" })
                    }
                    _ => String::new(),
                };
                writeln!(
                    out,
                    "{}{:8}: {}{}",
                    INDENT,
                    label,
                    tallies.join(" | "),
                    suffix
                )?;
            }
        }
    }

    match outcome.check {
        Check::LowerBoundAtLeast { threshold, .. } => {
            writeln!(out, "{}Target: ≥{:.2}", INDENT, threshold)?;
        }
        Check::NonIncreasing { .. } => {
            let declining = if outcome.passed == Some(true) { "YES" } else { "NO" };
            writeln!(out, "{}Declining trend: {}", INDENT, declining)?;
        }
        Check::Describe | Check::Exceeds { .. } | Check::Absent { .. } => {}
    }

    if let Some(verdict) = outcome.verdict() {
        writeln!(out, "{}Result: {}", INDENT, verdict)?;
    }
    writeln!(out)
}

fn write_convergence<W: Write>(out: &mut W, dataset: &Dataset) -> io::Result<()> {
    writeln!(out, "=== CONVERGENCE ANALYSIS ===")?;

    for c in generation_comparisons(&dataset.rows) {
        writeln!(
            out,
            "{:12}: 120gen T={:.3} B={:.3} | 480gen T={:.3} B={:.3} | ΔT={:+.3} ΔB={:+.3}",
            c.base,
            c.short_run.ternary,
            c.short_run.binary,
            c.long_run.ternary,
            c.long_run.binary,
            c.ternary_delta(),
            c.binary_delta()
        )?;
    }

    let effects = population_effects(&dataset.rows);
    if !effects.is_empty() {
        writeln!(out)?;
        writeln!(out, "Population size effects:")?;
        for effect in effects {
            writeln!(
                out,
                "{}Pop {:3}: Ternary rate {:.3} (n={})",
                INDENT, effect.population, effect.ternary_rate, effect.rows
            )?;
        }
    }
    writeln!(out)
}

fn write_listing<W: Write>(out: &mut W, dataset: &Dataset) -> io::Result<()> {
    writeln!(out, "=== EXPERIMENT SUMMARY ===")?;
    for (name, exp) in &dataset.experiments {
        let size_kb = exp.size_bytes as f64 / 1024.0;
        writeln!(
            out,
            "{:20} ({:6.1} KB): {:2} conditions, {}gen/{}pop/{}seeds",
            name,
            size_kb,
            exp.rows.len(),
            exp.metadata.text_or("gens", "unknown"),
            exp.metadata.text_or("pop", "unknown"),
            exp.metadata.text_or("seeds", "unknown")
        )?;
    }
    writeln!(out)
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{:.3}", r))
}

fn write_conclusions<W: Write>(out: &mut W, c: &Conclusions) -> io::Result<()> {
    writeln!(out, "=== FINAL SUMMARY AND CONCLUSIONS ===")?;
    writeln!(out, "Experiments completed:")?;
    writeln!(out, "  Continuous-only: {}", c.counts.continuous)?;
    writeln!(out, "  Binary-only:     {}", c.counts.binary)?;
    writeln!(out, "  Discrete-only:   {}", c.counts.discrete)?;
    writeln!(out, "  Total:           {}", c.counts.total)?;
    writeln!(out)?;

    writeln!(out, "CONCLUSIONS:")?;
    writeln!(
        out,
        "1. Continuous-only ternary rate: {} - {}",
        format_rate(c.continuous_ternary_rate),
        c.continuous_verdict()
    )?;
    writeln!(
        out,
        "2. Discrete-only ternary rate:   {} - {}",
        format_rate(c.discrete_ternary_rate),
        c.discrete_verdict()
    )?;
    writeln!(
        out,
        "3. Binary constraint success:    {} - {}",
        format_rate(c.binary_constraint_rate),
        c.binary_verdict()
    )?;
    writeln!(out, "4. Optimizer consistency: {}", c.consistency_verdict())?;
    writeln!(out)
}
