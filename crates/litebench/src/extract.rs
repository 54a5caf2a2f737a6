//! Log-snapshot diffing and JSON result extraction.
//!
//! The speed tool appends `speed*` logs to a directory that survives
//! across runs; a before/after set difference isolates the logs this run
//! produced. Inside a log, each result payload is one JSON object
//! bracketed by literal marker text printed by the tool. The markers are
//! an assumed-stable contract of the upstream log format.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::{Error, Result};

/// Marker profile delimiting one embedded JSON block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    /// The `"speed results"` block holding absolute speeds.
    Absolute,
    /// The `"speed results"` block holding relative speeds, closed by `All`.
    Relative,
}

impl Profile {
    const fn name(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
        }
    }

    /// Delimiter pattern for this profile. A combined log carries the
    /// absolute block first and the relative block second; backtracking on
    /// the greedy body keeps each capture inside its own markers.
    fn regex(self) -> &'static Regex {
        static ABSOLUTE: OnceLock<Regex> = OnceLock::new();
        static RELATIVE: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::Absolute => ABSOLUTE.get_or_init(|| {
                Regex::new(r#""speed results" :\s*(\{[\s\S]*\})\s*"speed results""#).unwrap()
            }),
            Self::Relative => RELATIVE.get_or_init(|| {
                Regex::new(r#"\}\s*"speed results" :\s*(\{[\s\S]*\})\s*All"#).unwrap()
            }),
        }
    }
}

/// Snapshot the set of speed logs currently in `logs_dir`.
///
/// A directory that does not exist yet snapshots as empty.
///
/// # Errors
/// Fails on a filesystem error while listing the directory.
pub fn snapshot(logs_dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut logs = BTreeSet::new();
    if !logs_dir.is_dir() {
        return Ok(logs);
    }
    for entry in std::fs::read_dir(logs_dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with("speed") {
            logs.insert(entry.path());
        }
    }
    Ok(logs)
}

/// Log files created since `before`, in lexicographic order.
#[must_use]
pub fn delta(before: &BTreeSet<PathBuf>, after: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
    after.difference(before).cloned().collect()
}

/// Extract the JSON block for `profile` from `log` and write it verbatim
/// to `dest`.
///
/// # Errors
/// An unmatched marker pair is a hard error: a missing block means the
/// measurement stage did not produce the requested results, and writing
/// an empty file would hide that.
pub fn write_block(log: &Path, dest: &Path, profile: Profile) -> Result<()> {
    let content = std::fs::read_to_string(log)?;
    let caps = profile
        .regex()
        .captures(&content)
        .ok_or_else(|| Error::MarkerUnmatched {
            log: log.to_path_buf(),
            profile: profile.name(),
        })?;
    std::fs::write(dest, caps[1].as_bytes())?;
    info!(profile = profile.name(), dest = %dest.display(), "extracted results");
    Ok(())
}
