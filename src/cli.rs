//! CLI argument parsing for sweeplog

use crate::config::Overrides;
use crate::profile::ReportProfile;
use crate::stats::IntervalMethod;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sweeplog")]
#[command(version)]
#[command(
    about = "Parse parameter-sweep logs and report hypothesis validation statistics",
    long_about = None
)]
pub struct Cli {
    /// Directory containing the *.log files to analyse
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Report profile (default: comprehensive)
    #[arg(long, value_enum)]
    pub profile: Option<ReportProfile>,

    /// Confidence interval method (default depends on the profile)
    #[arg(long = "ci", value_enum, value_name = "METHOD")]
    pub interval_method: Option<IntervalMethod>,

    /// Path of the JSON summary (default: <DIR>/<profile summary file>)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// TOML config file (default: <DIR>/sweeplog.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the report without writing the JSON summary
    #[arg(long = "no-json")]
    pub no_json: bool,

    /// Enable debug tracing on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Values that take precedence over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            profile: self.profile,
            interval_method: self.interval_method,
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["sweeplog"]);
        assert_eq!(cli.dir, PathBuf::from("."));
        assert!(cli.profile.is_none());
        assert!(cli.interval_method.is_none());
        assert!(cli.output.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.no_json);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_dir_short_and_long() {
        let cli = Cli::parse_from(["sweeplog", "-d", "runs"]);
        assert_eq!(cli.dir, PathBuf::from("runs"));
        let cli = Cli::parse_from(["sweeplog", "--dir", "other"]);
        assert_eq!(cli.dir, PathBuf::from("other"));
    }

    #[test]
    fn test_cli_profile_flag() {
        let cli = Cli::parse_from(["sweeplog", "--profile", "final"]);
        assert_eq!(cli.profile, Some(ReportProfile::Final));
    }

    #[test]
    fn test_cli_ci_flag() {
        let cli = Cli::parse_from(["sweeplog", "--ci", "wilson"]);
        assert_eq!(cli.interval_method, Some(IntervalMethod::Wilson));
    }

    #[test]
    fn test_cli_rejects_unknown_ci() {
        assert!(Cli::try_parse_from(["sweeplog", "--ci", "exact"]).is_err());
    }

    #[test]
    fn test_cli_output_and_no_json() {
        let cli = Cli::parse_from(["sweeplog", "-o", "out.json", "--no-json", "--debug"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert!(cli.no_json);
        assert!(cli.debug);
    }

    #[test]
    fn test_overrides_carry_flags() {
        let cli = Cli::parse_from(["sweeplog", "--profile", "final", "--ci", "wald"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.profile, Some(ReportProfile::Final));
        assert_eq!(overrides.interval_method, Some(IntervalMethod::Wald));
        assert!(overrides.output.is_none());
    }
}
