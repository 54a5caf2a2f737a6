//! Build orchestration: crt0 bootstrap, Embench suite build, and
//! ELF-to-raw-binary conversion of every built benchmark.

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::{Error, Result};

/// Per-benchmark objcopy timeout.
const CONVERT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a directory unless it is already present.
///
/// # Errors
/// Fails only on a real filesystem error, never on an existing directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Copy the generic linker script from the Embench checkout into the run
/// directory, where the assembled ldflags point at it.
///
/// # Errors
/// Fails if the script is absent or the copy fails.
pub fn copy_linker_script(embench_dir: &Path, run_dir: &Path) -> Result<()> {
    let src = embench_dir.join("config/sim/boards/generic/linker.ld");
    std::fs::copy(&src, run_dir.join("linker.ld"))?;
    Ok(())
}

/// Run the crt0 bootstrap build under `<run>/software/bios`.
///
/// crt0.o is a hard prerequisite for every benchmark link, so a nonzero
/// exit aborts the run.
///
/// # Errors
/// Fails if make cannot be launched or exits nonzero.
pub fn compile_crt0(make: &str, run_dir: &Path, makefile: &Path) -> Result<()> {
    let bios_dir = run_dir.join("software/bios");
    info!(dir = %bios_dir.display(), "building crt0");
    let status = Command::new(make)
        .arg("-C")
        .arg(&bios_dir)
        .arg("-f")
        .arg(makefile)
        .status()
        .map_err(|e| Error::ToolLaunch {
            tool: make.to_string(),
            source: e,
        })?;
    if !status.success() {
        return Err(Error::ToolFailed {
            tool: "crt0 bootstrap make".to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

/// Run the benchmark-suite build tool with the assembled argument list.
///
/// # Errors
/// Fails if the tool cannot be launched or exits nonzero.
pub fn compile_suite(build_tool: &Path, args: &[String]) -> Result<()> {
    info!(tool = %build_tool.display(), "building benchmark suite");
    debug!(?args, "suite build arguments");
    let status = Command::new(build_tool)
        .args(args)
        .status()
        .map_err(|e| Error::ToolLaunch {
            tool: build_tool.display().to_string(),
            source: e,
        })?;
    if !status.success() {
        return Err(Error::ToolFailed {
            tool: build_tool.display().to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

/// Convert every built benchmark under `bench_root` to a raw binary image.
///
/// Benchmarks are visited in sorted order and conversion stops at the
/// first failure: an image that cannot be produced cannot be measured,
/// and converting the rest would only yield misleading partial results.
/// Returns the names of the converted benchmarks.
///
/// # Errors
/// Fails with full diagnostics (benchmark, directory, command, captured
/// output) on the first nonzero exit or timeout.
pub fn convert_benchmarks(bench_root: &Path, objcopy: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(bench_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    for name in &names {
        convert_one(bench_root, name, objcopy)?;
    }
    Ok(names)
}

fn convert_one(bench_root: &Path, bench: &str, objcopy: &str) -> Result<()> {
    let dir = bench_root.join(bench);
    let args = [
        "-O".to_string(),
        "binary".to_string(),
        bench.to_string(),
        format!("{bench}.bin"),
    ];
    let command = format!("{objcopy} {}", args.join(" "));
    debug!(%bench, "converting to raw binary");

    let mut cmd = Command::new(objcopy);
    cmd.args(&args)
        .current_dir(&dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let (output, timed_out) =
        run_captured(&mut cmd, CONVERT_TIMEOUT).map_err(|e| Error::ToolLaunch {
            tool: objcopy.to_string(),
            source: e,
        })?;

    if timed_out || !output.status.success() {
        let reason = if timed_out {
            format!("timed out after {}s", CONVERT_TIMEOUT.as_secs())
        } else {
            format!("failed with return code {:?}", output.status.code())
        };
        return Err(Error::ConversionFailed {
            bench: bench.to_string(),
            dir,
            command,
            reason,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Run a command to completion with captured output, killing it once the
/// timeout elapses. The second field reports whether the kill fired.
fn run_captured(cmd: &mut Command, timeout: Duration) -> std::io::Result<(Output, bool)> {
    let mut child = cmd.spawn()?;
    let start = Instant::now();
    loop {
        if child.try_wait()?.is_some() {
            return Ok((child.wait_with_output()?, false));
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            return Ok((child.wait_with_output()?, true));
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
