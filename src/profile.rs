//! Report profiles
//!
//! A profile fixes which sections the report prints, the default
//! interval method and the default summary file name. Both profiles run
//! through the same pipeline.

use crate::hypothesis::{ablation_robustness, comprehensive_hypotheses, final_hypotheses, Hypothesis};
use crate::stats::IntervalMethod;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which validation report to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportProfile {
    /// Hypothesis validation with convergence and ablation tables
    #[default]
    Comprehensive,
    /// Optimizer, fitness and energy-model robustness with conclusions
    Final,
}

/// One block of console output, in print order
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Experiment and combination totals
    Header,
    /// Outcome-state histogram
    Distribution {
        with_hysteresis: bool,
        with_intervals: bool,
    },
    /// A titled group of hypotheses
    Hypotheses {
        heading: &'static str,
        hypotheses: Vec<Hypothesis>,
    },
    /// Generation and population comparison tables
    Convergence,
    /// Per-experiment listing with file size and run parameters
    ExperimentListing,
    /// Experiment counts by family and headline conclusions
    Conclusions,
}

impl ReportProfile {
    pub fn title(&self) -> &'static str {
        match self {
            ReportProfile::Comprehensive => "COMPREHENSIVE VALIDATION RESULTS",
            ReportProfile::Final => "FINAL COMPREHENSIVE VALIDATION RESULTS",
        }
    }

    /// Interval formula used unless configuration overrides it
    pub fn default_interval_method(&self) -> IntervalMethod {
        match self {
            ReportProfile::Comprehensive => IntervalMethod::Wald,
            ReportProfile::Final => IntervalMethod::Wilson,
        }
    }

    /// Summary file name used unless configuration overrides it
    pub fn default_summary_file(&self) -> &'static str {
        match self {
            ReportProfile::Comprehensive => "validation_summary.json",
            ReportProfile::Final => "final_validation_summary.json",
        }
    }

    pub fn sections(&self) -> Vec<Section> {
        match self {
            ReportProfile::Comprehensive => vec![
                Section::Header,
                Section::Distribution {
                    with_hysteresis: true,
                    with_intervals: false,
                },
                Section::Hypotheses {
                    heading: "HYPOTHESIS VALIDATION (with 95% CIs)",
                    hypotheses: comprehensive_hypotheses(),
                },
                Section::Convergence,
                Section::Hypotheses {
                    heading: "ENERGY MODEL ROBUSTNESS",
                    hypotheses: ablation_robustness(),
                },
                Section::ExperimentListing,
            ],
            ReportProfile::Final => {
                let mut sections = vec![
                    Section::Header,
                    Section::Distribution {
                        with_hysteresis: false,
                        with_intervals: true,
                    },
                ];
                let headings = [
                    "H1: CONTINUOUS-ONLY ANALYSIS BY OPTIMIZER",
                    "H3: BINARY-ONLY CONSTRAINT VALIDATION",
                    "H5: FITNESS FUNCTION ROBUSTNESS",
                    "ENERGY MODEL ROBUSTNESS SUMMARY",
                ];
                for (heading, hypothesis) in headings.into_iter().zip(final_hypotheses()) {
                    sections.push(Section::Hypotheses {
                        heading,
                        hypotheses: vec![hypothesis],
                    });
                }
                sections.push(Section::ExperimentListing);
                sections.push(Section::Conclusions);
                sections
            }
        }
    }
}

impl fmt::Display for ReportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportProfile::Comprehensive => f.write_str("comprehensive"),
            ReportProfile::Final => f.write_str("final"),
        }
    }
}
