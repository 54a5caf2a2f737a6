//! Run identity and per-run configuration derivation.

use clap::ValueEnum;

/// Measurement strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Wall-time-like speed per benchmark.
    Absolute,
    /// Speed normalized against baseline data.
    Relative,
    /// Both result sets from a single combined run.
    Both,
}

impl Strategy {
    /// Whether this strategy produces `result_abs.json`.
    #[must_use]
    pub const fn wants_absolute(self) -> bool {
        matches!(self, Self::Absolute | Self::Both)
    }

    /// Whether this strategy produces `result.json`.
    #[must_use]
    pub const fn wants_relative(self) -> bool {
        matches!(self, Self::Relative | Self::Both)
    }
}

/// Resolved configuration for one benchmark run.
///
/// Derivations here are pure; directory creation belongs to the build
/// orchestrator.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// CPU core under test (e.g. `vexriscv`).
    pub cpu_type: String,
    /// CPU variant (e.g. `standard`, `standard+ghdl` for microwatt).
    pub cpu_variant: String,
    /// Internal bus data width in bits.
    pub bus_data_width: u32,
    /// Whether caches are enabled (rocket chip).
    pub use_cache: bool,
    /// SRAM/program stack size in bytes.
    pub integrated_sram_size: u32,
    /// Simulation thread count.
    pub threads: usize,
    /// Run on an Arty FPGA board instead of simulation.
    pub arty: bool,
    /// Requested measurement strategy.
    pub strategy: Strategy,
}

impl RunConfig {
    /// Canonical identity naming this run's artifact tree.
    ///
    /// Deterministic in (`cpu_type`, `cpu_variant`, `bus_data_width`, `use_cache`):
    /// the same tuple always yields the same identity, so repeated runs
    /// with one configuration share one directory and runs with different
    /// configurations never collide.
    #[must_use]
    pub fn run_identity(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.cpu_type, self.cpu_variant, self.bus_data_width, self.use_cache
        )
    }

    /// Architecture tag handed to the build tool.
    #[must_use]
    pub const fn arch(&self) -> &'static str {
        if self.arty { "arty" } else { "sim" }
    }

    /// Target clock rate. Simulation runs at 1 MHz, the Arty board at 100.
    #[must_use]
    pub const fn cpu_mhz(&self) -> u32 {
        if self.arty { 100 } else { 1 }
    }

    /// blackparrot has no hardware multiply; its benchmarks link a soft
    /// multiply helper object ahead of crt0.
    #[must_use]
    pub fn needs_mul_helper(&self) -> bool {
        self.cpu_type == "blackparrot"
    }
}
