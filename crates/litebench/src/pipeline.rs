//! Sequential run pipeline.
//!
//! Identity → build variables → platform metadata → argument assembly →
//! build → measure → extract, strictly in that order. Every external
//! tool invocation blocks until the subprocess terminates; any
//! concurrency lives inside the invoked tools and is opaque here.
//!
//! One run owns its run directory exclusively. Two concurrent runs with
//! different identities never collide; two sharing an identity are
//! unsafe and must be prevented by the caller (no locking here).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tracing::info;

use crate::extract::Profile;
use crate::identity::RunConfig;
use crate::variables::CpuParams;
use crate::{Error, Result, build, buildargs, extract, measure, platform};

/// External tool locations, resolved once per run.
///
/// Every collaborator the pipeline spawns lives here so tests can point
/// the pipeline at stubs.
#[derive(Clone, Debug)]
pub struct Tools {
    /// Embench suite build tool.
    pub build_tool: PathBuf,
    /// Embench speed measurement tool.
    pub speed_tool: PathBuf,
    /// make binary driving the crt0 bootstrap.
    pub make: String,
    /// Makefile for the crt0 bootstrap build.
    pub crt0_makefile: PathBuf,
    /// Cross compiler; build flag target and version-query subject.
    pub compiler: String,
    /// ELF-to-raw converter.
    pub objcopy: String,
    /// Simulation backend, version-query subject only.
    pub simulator: String,
    /// Directory holding `pythondata-cpu-*` checkouts.
    pub sources_dir: PathBuf,
    /// Embench checkout, for the generic linker script.
    pub embench_dir: PathBuf,
}

impl Tools {
    /// Resolve tool locations from the Embench checkout and the CPU triple.
    ///
    /// # Errors
    /// Fails if the toolchain triple is missing from the parameters.
    pub fn resolve(
        embench_dir: &Path,
        sources_dir: &Path,
        crt0_makefile: &Path,
        params: &CpuParams,
    ) -> Result<Self> {
        let triple = params.require("TRIPLE")?;
        Ok(Self {
            build_tool: embench_dir.join("build_all.py"),
            speed_tool: embench_dir.join("benchmark_speed.py"),
            make: "make".to_string(),
            crt0_makefile: crt0_makefile.to_path_buf(),
            compiler: format!("{triple}-gcc"),
            objcopy: format!("{triple}-objcopy"),
            simulator: "verilator".to_string(),
            sources_dir: sources_dir.to_path_buf(),
            embench_dir: embench_dir.to_path_buf(),
        })
    }
}

/// Outcome of one full run.
#[derive(Debug)]
pub struct RunOutcome {
    /// The run's artifact directory.
    pub run_dir: PathBuf,
    /// Measurement exit statuses in invocation order, unmasked.
    pub measure_statuses: Vec<ExitStatus>,
}

impl RunOutcome {
    /// Process exit code: the first nonzero measurement status, else 0.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.measure_statuses
            .iter()
            .find(|status| !status.success())
            .map_or(0, |status| status.code().unwrap_or(1))
    }
}

/// One prepared benchmark run.
#[derive(Debug)]
pub struct Pipeline {
    config: RunConfig,
    run_dir: PathBuf,
    params: CpuParams,
    tools: Tools,
}

impl Pipeline {
    /// Resolve the run identity, load the build variables, and locate the
    /// external tools. Configuration errors surface here, before any
    /// subprocess is started.
    ///
    /// # Errors
    /// Fails if the variables file is absent or malformed, or a required
    /// toolchain variable is missing.
    pub fn prepare(
        output_dir: &Path,
        config: RunConfig,
        embench_dir: &Path,
        sources_dir: &Path,
        crt0_makefile: &Path,
    ) -> Result<Self> {
        let run_dir = output_dir.join(config.run_identity());
        info!(run_dir = %run_dir.display(), "preparing benchmark run");

        let variables = run_dir.join("software/include/generated/variables.mak");
        let params = CpuParams::load(&variables)?;
        params.validate_required()?;

        let tools = Tools::resolve(embench_dir, sources_dir, crt0_makefile, &params)?;
        Ok(Self {
            config,
            run_dir,
            params,
            tools,
        })
    }

    /// Replace the resolved tool set, e.g. with test stubs.
    #[must_use]
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    /// The run's artifact directory.
    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Drive the run end to end.
    ///
    /// # Errors
    /// Fails on any fatal stage error (metadata collection, build,
    /// conversion, extraction). Measurement failures are not errors; they
    /// surface through [`RunOutcome::exit_code`].
    pub fn run(&self) -> Result<RunOutcome> {
        self.collect_platform()?;
        self.build()?;

        let before = extract::snapshot(&self.logs_dir())?;
        let statuses = measure::run(&self.tools.speed_tool, &self.run_dir, &self.config)?;
        self.extract_results(&before)?;

        Ok(RunOutcome {
            run_dir: self.run_dir.clone(),
            measure_statuses: statuses,
        })
    }

    fn logs_dir(&self) -> PathBuf {
        self.run_dir.join("logs")
    }

    fn collect_platform(&self) -> Result<()> {
        let queried = [
            ("toolchain", self.tools.compiler.as_str()),
            ("verilator", self.tools.simulator.as_str()),
        ];
        let descriptor =
            platform::collect(&self.config.cpu_type, &self.tools.sources_dir, &queried)?;
        platform::write(&self.run_dir, &descriptor)
    }

    fn build(&self) -> Result<()> {
        build::ensure_dir(&self.run_dir.join("benchmarks"))?;
        build::ensure_dir(&self.logs_dir())?;
        build::copy_linker_script(&self.tools.embench_dir, &self.run_dir)?;

        let args = buildargs::assemble(
            &self.run_dir,
            self.config.arch(),
            self.config.cpu_mhz(),
            &self.params,
            self.config.needs_mul_helper(),
        )?;

        build::compile_crt0(&self.tools.make, &self.run_dir, &self.tools.crt0_makefile)?;
        build::compile_suite(&self.tools.build_tool, &args)?;
        build::convert_benchmarks(&self.run_dir.join("benchmarks/src"), &self.tools.objcopy)?;
        Ok(())
    }

    fn extract_results(&self, before: &BTreeSet<PathBuf>) -> Result<()> {
        let after = extract::snapshot(&self.logs_dir())?;
        let new_logs = extract::delta(before, &after);
        let Some(log) = new_logs.first() else {
            return Err(Error::NoNewLogs {
                dir: self.logs_dir(),
            });
        };

        if self.config.strategy.wants_absolute() {
            let dest = self.run_dir.join("result_abs.json");
            extract::write_block(log, &dest, Profile::Absolute)?;
        }
        if self.config.strategy.wants_relative() {
            let dest = self.run_dir.join("result.json");
            extract::write_block(log, &dest, Profile::Relative)?;
        }
        Ok(())
    }
}
