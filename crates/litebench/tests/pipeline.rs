//! End-to-end pipeline runs against stub external tools.

use std::path::{Path, PathBuf};

use litebench::{Pipeline, RunConfig, Strategy, Tools};

/// Write an executable shell script stub into `dir`.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

fn config(strategy: Strategy) -> RunConfig {
    RunConfig {
        cpu_type: "vexriscv".to_string(),
        cpu_variant: "standard".to_string(),
        bus_data_width: 32,
        use_cache: false,
        integrated_sram_size: 0x2000,
        threads: 1,
        arty: false,
        strategy,
    }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    root: PathBuf,
    run_dir: PathBuf,
    embench_dir: PathBuf,
    tools_dir: PathBuf,
}

impl Fixture {
    /// Lay out a run directory with a generated variables file, an Embench
    /// checkout skeleton, and stub toolchain binaries.
    fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().to_path_buf();
        let run_dir = root.join("vexriscv_standard_32_false");
        let tools_dir = root.join("tools");
        std::fs::create_dir_all(&tools_dir).expect("mkdir tools");

        let generated = run_dir.join("software/include/generated");
        std::fs::create_dir_all(&generated).expect("mkdir generated");
        std::fs::create_dir_all(run_dir.join("software/bios")).expect("mkdir bios");
        let variables = format!(
            "TRIPLE={}/fake\n\
             BUILDINC_DIRECTORY={}\n\
             CPU_DIRECTORY={}/cpu\n\
             SOC_DIRECTORY={}/soc\n\
             CPUFLAGS=-march=rv32i\n\
             PICOLIBC_DIRECTORY={}/picolibc\n",
            tools_dir.display(),
            generated.display(),
            root.display(),
            root.display(),
            root.display(),
        );
        std::fs::write(generated.join("variables.mak"), variables).expect("write variables");

        let embench_dir = root.join("Embench");
        std::fs::create_dir_all(embench_dir.join("config/sim/boards/generic"))
            .expect("mkdir embench");
        std::fs::write(
            embench_dir.join("config/sim/boards/generic/linker.ld"),
            "MEMORY {}\n",
        )
        .expect("write linker script");

        write_script(
            &tools_dir,
            "fake-gcc",
            "printf 'fake-gcc 1.0\\nCopyright (C) nobody\\n'",
        );
        write_script(
            &tools_dir,
            "fake-verilator",
            "printf 'Verilator 5.020\\nCopyright 2003\\n'",
        );
        write_script(&tools_dir, "fake-objcopy", ": > \"$4\"");
        write_script(&tools_dir, "make", "exit 0");

        Self {
            _tmp: tmp,
            root,
            run_dir,
            embench_dir,
            tools_dir,
        }
    }

    /// Stub build tool that produces one benchmark artifact.
    fn build_tool(&self) -> PathBuf {
        write_script(
            &self.tools_dir,
            "build_all",
            &format!(
                "mkdir -p {run}/benchmarks/src/aha-mont64\n\
                 : > {run}/benchmarks/src/aha-mont64/aha-mont64",
                run = self.run_dir.display()
            ),
        )
    }

    /// Stub speed tool writing `log` into the run's log directory.
    fn speed_tool(&self, log: &str, exit_code: i32) -> PathBuf {
        write_script(
            &self.tools_dir,
            "benchmark_speed",
            &format!(
                "printf '%s' '{log}' > {run}/logs/speed-test.log\nexit {exit_code}",
                run = self.run_dir.display()
            ),
        )
    }

    fn tools(&self, speed_tool: PathBuf) -> Tools {
        Tools {
            build_tool: self.build_tool(),
            speed_tool,
            make: self.tools_dir.join("make").display().to_string(),
            crt0_makefile: self.root.join("mk_crt0.mak"),
            compiler: self.tools_dir.join("fake-gcc").display().to_string(),
            objcopy: self.tools_dir.join("fake-objcopy").display().to_string(),
            simulator: self.tools_dir.join("fake-verilator").display().to_string(),
            sources_dir: self.root.clone(),
            embench_dir: self.embench_dir.clone(),
        }
    }

    fn pipeline(&self, strategy: Strategy, speed_tool: PathBuf) -> Pipeline {
        Pipeline::prepare(
            &self.root,
            config(strategy),
            &self.embench_dir,
            &self.root,
            &self.root.join("mk_crt0.mak"),
        )
        .expect("prepare")
        .with_tools(self.tools(speed_tool))
    }
}

#[test]
fn absolute_run_produces_only_the_absolute_result() {
    let fixture = Fixture::new();
    let speed = fixture.speed_tool(r#""speed results" : {"a": 1} "speed results""#, 0);
    let outcome = fixture
        .pipeline(Strategy::Absolute, speed)
        .run()
        .expect("run");

    assert_eq!(outcome.exit_code(), 0);
    let result = std::fs::read_to_string(fixture.run_dir.join("result_abs.json"))
        .expect("read result_abs.json");
    assert_eq!(result, r#"{"a": 1}"#);
    assert!(!fixture.run_dir.join("result.json").exists());

    // Full persisted layout for one run.
    assert!(fixture.run_dir.join("platform.json").is_file());
    assert!(fixture.run_dir.join("linker.ld").is_file());
    assert!(
        fixture
            .run_dir
            .join("benchmarks/src/aha-mont64/aha-mont64.bin")
            .is_file()
    );
}

#[test]
fn both_run_extracts_two_blocks_from_one_combined_log() {
    let fixture = Fixture::new();
    let log = r#""speed results" : {"abs": 1} "speed results" : {"rel": 2} All"#;
    let speed = fixture.speed_tool(log, 0);
    let outcome = fixture.pipeline(Strategy::Both, speed).run().expect("run");

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        std::fs::read_to_string(fixture.run_dir.join("result_abs.json")).expect("abs"),
        r#"{"abs": 1}"#
    );
    assert_eq!(
        std::fs::read_to_string(fixture.run_dir.join("result.json")).expect("rel"),
        r#"{"rel": 2}"#
    );
}

#[test]
fn platform_descriptor_records_tool_versions() {
    let fixture = Fixture::new();
    let speed = fixture.speed_tool(r#""speed results" : {"a": 1} "speed results""#, 0);
    fixture
        .pipeline(Strategy::Absolute, speed)
        .run()
        .expect("run");

    let platform = std::fs::read_to_string(fixture.run_dir.join("platform.json"))
        .expect("read platform.json");
    let descriptor: serde_json::Value = serde_json::from_str(&platform).expect("valid JSON");
    assert_eq!(descriptor["toolchain"], "fake-gcc 1.0 ");
    assert_eq!(descriptor["verilator"], "Verilator 5.020 ");
    // No pythondata-cpu-vexriscv checkout in the fixture.
    assert!(descriptor.get("CPU").is_none());
}

#[test]
fn measurement_failure_propagates_the_tool_exit_code() {
    let fixture = Fixture::new();
    // Tool writes a usable log but reports failure; extraction succeeds
    // and the tool's own code is what the caller sees.
    let speed = fixture.speed_tool(r#""speed results" : {"a": 1} "speed results""#, 3);
    let outcome = fixture
        .pipeline(Strategy::Absolute, speed)
        .run()
        .expect("run");
    assert_eq!(outcome.exit_code(), 3);
}

#[test]
fn missing_log_is_a_hard_extraction_failure() {
    let fixture = Fixture::new();
    let speed = write_script(&fixture.tools_dir, "benchmark_speed", "exit 0");
    let err = fixture
        .pipeline(Strategy::Absolute, speed)
        .run()
        .unwrap_err();
    assert!(matches!(err, litebench::Error::NoNewLogs { .. }));
}

#[test]
fn missing_variables_file_fails_before_any_tool_runs() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = Pipeline::prepare(
        tmp.path(),
        config(Strategy::Absolute),
        &tmp.path().join("Embench"),
        tmp.path(),
        &tmp.path().join("mk_crt0.mak"),
    )
    .unwrap_err();
    assert!(matches!(err, litebench::Error::Io(_)));
}
