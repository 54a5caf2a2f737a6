//! Build-variable file parsing.
//!
//! The `LiteX SoC` software build generates `variables.mak` under the run's
//! software tree; it describes the cross toolchain and the generated
//! header/library layout as `key=value` lines.

use std::collections::BTreeMap;
use std::path::Path;

use crate::{Error, Result};

/// Keys that flag assembly cannot proceed without.
pub const REQUIRED_KEYS: &[&str] = &[
    "TRIPLE",
    "BUILDINC_DIRECTORY",
    "CPU_DIRECTORY",
    "SOC_DIRECTORY",
    "CPUFLAGS",
    "PICOLIBC_DIRECTORY",
];

/// CPU/toolchain parameters loaded from the generated variables file.
///
/// Read-only after load.
#[derive(Clone, Debug, Default)]
pub struct CpuParams {
    vars: BTreeMap<String, String>,
}

impl CpuParams {
    /// Load parameters from a `variables.mak` file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or a non-`export` line has no `=`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    pub(crate) fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut vars = BTreeMap::new();
        for line in content.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            // `export NAME` lines mark variables for sub-makes; skip them.
            let mut tokens = line.split_whitespace();
            if tokens.next() == Some("export") && tokens.next().is_some() {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                return Err(Error::MalformedVariables {
                    path: path.to_path_buf(),
                    line: line.to_string(),
                });
            };
            vars.insert(key.to_string(), val.to_string());
        }
        Ok(Self { vars })
    }

    /// Look up an optional variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Look up a variable the run cannot proceed without.
    ///
    /// # Errors
    /// Returns [`Error::MissingVariable`] if the key is absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::MissingVariable(key.to_string()))
    }

    /// Fail fast if any key required for flag assembly is absent.
    ///
    /// # Errors
    /// Returns [`Error::MissingVariable`] naming the first absent key.
    pub fn validate_required(&self) -> Result<()> {
        for key in REQUIRED_KEYS {
            self.require(key)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            vars: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}
