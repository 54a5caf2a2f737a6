//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::Parser;
use litebench::Strategy;

/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "litebench")]
#[command(about = "Run Embench benchmarks against a LiteX SoC CPU core")]
#[command(version)]
pub struct Cli {
    /// CPU type to run benchmarks on
    #[arg(long)]
    pub cpu_type: String,

    /// CPU variant (microwatt wants standard+ghdl, blackparrot wants sim)
    #[arg(long, default_value = "standard")]
    pub cpu_variant: String,

    /// Measurement strategy
    #[arg(long, value_enum)]
    pub benchmark_strategy: Strategy,

    /// Parent directory for the run directory
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of threads for the simulation to run on
    #[arg(long, default_value = "1")]
    pub threads: usize,

    /// Run benchmarks on an Arty FPGA board instead of simulation
    #[arg(long)]
    pub arty: bool,

    /// SRAM/program stack size; microwatt, blackparrot, rocket, openc906
    /// and cva6 need at least 0x8000
    #[arg(long, default_value = "0x2000", value_parser = parse_size)]
    pub integrated_sram_size: u32,

    /// Internal bus data width
    #[arg(long, default_value = "32")]
    pub bus_data_width: u32,

    /// Use caches (rocket chip)
    #[arg(long)]
    pub use_cache: bool,

    /// Embench checkout containing the suite build and speed tools
    #[arg(long, default_value = "Embench")]
    pub embench_dir: PathBuf,

    /// Directory holding pythondata-cpu-* checkouts
    #[arg(long, default_value = ".")]
    pub sources_dir: PathBuf,

    /// Makefile driving the crt0 bootstrap build
    #[arg(long, default_value = "mk_crt0.mak")]
    pub crt0_makefile: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a size given in hex (0x-prefixed) or decimal.
fn parse_size(arg: &str) -> Result<u32, String> {
    let arg = arg.trim();
    if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex size: {e}"))
    } else {
        arg.parse().map_err(|e| format!("invalid size: {e}"))
    }
}
