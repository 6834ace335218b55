//! sweeplog - Parameter-sweep log analysis and hypothesis validation
//!
//! This library parses experiment logs (comment metadata, parameter echoes
//! and `CSV_ROW` result lines), aggregates them across a directory, computes
//! binomial rates with Wald or Wilson confidence intervals, evaluates a
//! declarative table of research hypotheses and renders a console report
//! plus a deterministic JSON summary.

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod hypothesis;
pub mod parser;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod report;
pub mod stats;
pub mod summary;
