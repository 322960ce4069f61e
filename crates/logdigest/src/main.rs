//! logdigest: condense build logs and NUnit test results
//!
//! Reads a build log or NUnit XML result file from a path or stdin and
//! prints a compact report of errors, warnings and failed tests.

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use logdigest::app;
use logdigest::config::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "starting logdigest");

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    app::run(&config, stdin, stdout).context("logdigest failed")?;
    Ok(())
}
