//! Platform metadata collection for reproducibility.
//!
//! Records the CPU core's source revision (when a checkout is present)
//! and the installed toolchain/simulator versions into `platform.json`
//! inside the run directory. Downstream reporting consumes the file;
//! the harness itself never reads it back.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use serde::Serialize;
use tracing::{debug, info};

use crate::{Error, Result};

/// Recorded CPU-core revision and tool version banners.
#[derive(Debug, Serialize)]
pub struct Descriptor {
    /// CPU core name mapped to its checked-out git revision.
    #[serde(rename = "CPU", skip_serializing_if = "Option::is_none")]
    pub cpu: Option<BTreeMap<String, String>>,
    /// Tool label mapped to its version banner.
    #[serde(flatten)]
    pub tools: BTreeMap<String, String>,
}

/// Collect the platform descriptor.
///
/// A missing `pythondata-cpu-<cpu_type>` checkout is simply omitted; a
/// tool whose version query cannot be run or exits nonzero is fatal.
///
/// # Errors
/// Fails if `git` fails on an existing checkout or any version query fails.
pub fn collect(
    cpu_type: &str,
    sources_dir: &Path,
    tools: &[(&str, &str)],
) -> Result<Descriptor> {
    let cpu = cpu_revision(cpu_type, sources_dir)?;
    let mut versions = BTreeMap::new();
    for (label, command) in tools {
        versions.insert((*label).to_string(), query_version(command)?);
    }
    Ok(Descriptor {
        cpu,
        tools: versions,
    })
}

/// Serialize the descriptor to `<run>/platform.json`.
///
/// # Errors
/// Fails if serialization or the write fails.
pub fn write(run_dir: &Path, descriptor: &Descriptor) -> Result<()> {
    let path = run_dir.join("platform.json");
    let json = serde_json::to_string(descriptor)?;
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "wrote platform descriptor");
    Ok(())
}

fn cpu_revision(cpu_type: &str, sources_dir: &Path) -> Result<Option<BTreeMap<String, String>>> {
    let checkout = sources_dir.join(format!("pythondata-cpu-{cpu_type}"));
    if !checkout.is_dir() {
        debug!(checkout = %checkout.display(), "no CPU source checkout, omitting revision");
        return Ok(None);
    }

    let output = Command::new("git")
        .arg("-C")
        .arg(&checkout)
        .args(["rev-parse", "HEAD"])
        .output()
        .map_err(|e| Error::ToolLaunch {
            tool: "git".to_string(),
            source: e,
        })?;
    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: "git rev-parse".to_string(),
            code: output.status.code(),
        });
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Some(BTreeMap::from([(cpu_type.to_string(), sha)])))
}

fn query_version(command: &str) -> Result<String> {
    let output = Command::new(command)
        .arg("--version")
        .output()
        .map_err(|e| Error::ToolLaunch {
            tool: command.to_string(),
            source: e,
        })?;
    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: format!("{command} --version"),
            code: output.status.code(),
        });
    }
    Ok(strip_banner(&String::from_utf8_lossy(&output.stdout)))
}

/// Keep only the banner text before the copyright notice, flattened to
/// one line so the descriptor stays compact.
#[must_use]
pub fn strip_banner(text: &str) -> String {
    let head = text.split("Copyright").next().unwrap_or(text);
    head.replace('\n', " ")
}
