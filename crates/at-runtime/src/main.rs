//! # Atomica
//!
//! Command-line entry point. Builds one Context from the process arguments,
//! drains its input, and tears it down.
//!
//! ```text
//! atomica -in in.melt -log none
//! atomica -k on t 4 -sf kk -in in.lj
//! atomica -h
//! ```

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use at_runtime::Context;
use at_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{debug, info};

fn run() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("telemetry initialisation failed")?;

    let ctx = Context::new(std::env::args())?;
    if ctx.config().help {
        ctx.close();
        return Ok(());
    }

    let mut commands = 0usize;
    if let Some(input) = ctx.input() {
        while let Some(command) = input
            .next_command()
            .context("failed to read input commands")?
        {
            debug!("[Input] {}", command);
            commands += 1;
        }
    }
    info!("[Input] Read {} command(s)", commands);

    let report = ctx.close();
    debug!(
        "[Atomica] Destroyed {} subsystem(s) after {:?}",
        report.destroyed.len(),
        report.elapsed
    );
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
