use anyhow::Result;
use clap::Parser;
use std::io;
use sweeplog::{
    cli::Cli,
    config::{AnalysisConfig, Settings},
    pipeline,
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = AnalysisConfig::discover(args.config.as_deref(), &args.dir)?;
    let settings = Settings::resolve(args.dir.clone(), config, args.overrides(), !args.no_json);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    pipeline::run(&settings, &mut out)?;

    Ok(())
}
