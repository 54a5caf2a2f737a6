//! litebench CLI - Embench benchmark harness for `LiteX SoC` CPU cores.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, EXIT_FAILURE};
use litebench::{Pipeline, RunConfig};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "litebench=debug"
    } else {
        "litebench=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_target(false)
        .init();

    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let config = RunConfig {
        cpu_type: cli.cpu_type.clone(),
        cpu_variant: cli.cpu_variant.clone(),
        bus_data_width: cli.bus_data_width,
        use_cache: cli.use_cache,
        integrated_sram_size: cli.integrated_sram_size,
        threads: cli.threads,
        arty: cli.arty,
        strategy: cli.benchmark_strategy,
    };

    let pipeline = match Pipeline::prepare(
        &cli.output_dir,
        config,
        &cli.embench_dir,
        &cli.sources_dir,
        &cli.crt0_makefile,
    ) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_FAILURE;
        }
    };

    match pipeline.run() {
        // Measurement failures propagate the external tool's own exit code.
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_FAILURE
        }
    }
}
