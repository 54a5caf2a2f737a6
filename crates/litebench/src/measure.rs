//! Execution orchestration: speed-tool invocations per strategy.
//!
//! Each invocation is a single blocking call. Nothing is retried or
//! cancelled here; the external tool enforces its own per-benchmark
//! timeout via the `--timeout` flag it is handed. Exit statuses are
//! returned unmasked so the caller can propagate the tool's own code.

use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::info;

use crate::identity::{RunConfig, Strategy};
use crate::{Error, Result};

/// Per-benchmark timeout handed through to the speed tool, in seconds.
const SPEED_TIMEOUT_SECS: &str = "7200";

/// Invoke the speed tool once per requested strategy.
///
/// A failing invocation does not prevent later ones; every status is
/// collected and returned in invocation order.
///
/// # Errors
/// Fails only if an invocation cannot be launched at all.
pub fn run(speed_tool: &Path, run_dir: &Path, config: &RunConfig) -> Result<Vec<ExitStatus>> {
    let shared = shared_args(run_dir, config);
    let mut statuses = Vec::new();
    for flags in invocations(config.strategy) {
        info!(?flags, "measuring benchmark speed");
        let status = Command::new(speed_tool)
            .args(&shared)
            .args(*flags)
            .status()
            .map_err(|e| Error::ToolLaunch {
                tool: speed_tool.display().to_string(),
                source: e,
            })?;
        statuses.push(status);
    }
    Ok(statuses)
}

/// Strategy-specific flag sets, one per invocation.
///
/// `Both` is a single invocation emitting one combined log with both
/// result blocks; the extractor scrapes each block with its own markers.
const fn invocations(strategy: Strategy) -> &'static [&'static [&'static str]] {
    match strategy {
        Strategy::Absolute => &[&["--absolute"]],
        Strategy::Relative => &[&["--relative"]],
        Strategy::Both => &[&["--absolute", "--relative"]],
    }
}

/// Flag set shared by every invocation.
fn shared_args(run_dir: &Path, config: &RunConfig) -> Vec<String> {
    let target_module = if config.arty {
        "run_litex_arty"
    } else {
        "run_litex_sim"
    };

    let mut args = vec![
        "--builddir".to_string(),
        run_dir.join("benchmarks").display().to_string(),
        "--logdir".to_string(),
        run_dir.join("logs").display().to_string(),
        "--json-output".to_string(),
        "--target-module".to_string(),
        target_module.to_string(),
        "--timeout".to_string(),
        SPEED_TIMEOUT_SECS.to_string(),
        "--baselinedir".to_string(),
        "baseline-data".to_string(),
        "--no-json-comma".to_string(),
        "--cpu-type".to_string(),
        config.cpu_type.clone(),
        "--cpu-variant".to_string(),
        config.cpu_variant.clone(),
    ];
    if !config.arty {
        args.push("--threads".to_string());
        args.push(config.threads.to_string());
    }
    args.push("--bus-data-width".to_string());
    args.push(config.bus_data_width.to_string());
    args.push("--use-cache".to_string());
    args.push(config.use_cache.to_string());
    args.push("--output-dir".to_string());
    args.push(run_dir.display().to_string());
    args.push("--integrated-sram-size".to_string());
    args.push(config.integrated_sram_size.to_string());
    args
}
