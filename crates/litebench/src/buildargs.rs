//! Build argument assembly for the benchmark-suite build tool.
//!
//! Pure: nothing here touches the filesystem or starts a subprocess.
//! Flag values are composed from ordered token sequences and joined with
//! single spaces only at this boundary, so the output is byte-identical
//! across repeated calls with the same inputs.

use std::path::Path;

use crate::Result;
use crate::variables::CpuParams;

/// Assemble the full argument list for `build_all`.
///
/// `mul_helper` links the soft multiply object ahead of crt0 for CPUs
/// without hardware multiply. All paths handed to the build tool are
/// absolute when `run_dir` is; no working-directory state is assumed.
///
/// # Errors
/// Returns [`crate::Error::MissingVariable`] before any subprocess is
/// started if a required toolchain parameter is absent.
pub fn assemble(
    run_dir: &Path,
    arch: &str,
    cpu_mhz: u32,
    params: &CpuParams,
    mul_helper: bool,
) -> Result<Vec<String>> {
    let triple = params.require("TRIPLE")?;
    let buildinc = params.require("BUILDINC_DIRECTORY")?;
    let cpu_dir = params.require("CPU_DIRECTORY")?;
    let soc_dir = params.require("SOC_DIRECTORY")?;
    let cpu_flags = params.require("CPUFLAGS")?;
    let picolibc = params.require("PICOLIBC_DIRECTORY")?;

    let cflags = [
        "-v".to_string(),
        format!("-I{buildinc}"),
        format!("-I{buildinc}/../libc"),
        format!("-I{cpu_dir}"),
        format!("-I{soc_dir}/software/include"),
        format!("-I{soc_dir}/software/libbase"),
        "-std=gnu99".to_string(),
        cpu_flags.to_string(),
        format!("-I{picolibc}/newlib/libc/tinystdio"),
        format!("-I{picolibc}/newlib/libc/include"),
        "-O2".to_string(),
        "-ffunction-sections".to_string(),
    ]
    .join(" ");

    let mut user_libs: Vec<String> = Vec::new();
    if mul_helper {
        // Link order matters: the multiply helper must precede crt0.
        user_libs.push(format!("{buildinc}/../bios/mul.o"));
    }
    user_libs.push(format!("{buildinc}/../bios/crt0.o"));
    user_libs.push(format!("-L{buildinc}"));
    user_libs.push(format!("-L{buildinc}/../libc"));
    user_libs.push(format!("-L{buildinc}/../libcompiler_rt"));
    user_libs.push(format!("-L{buildinc}/../libbase"));
    for lib in ["-lc", "-lcompiler_rt", "-lbase", "-lgcc"] {
        user_libs.push(lib.to_string());
    }

    let ldflags = [
        "-nostdlib".to_string(),
        "-nodefaultlibs".to_string(),
        "-nolibc".to_string(),
        "-Wl,--verbose".to_string(),
        cpu_flags.to_string(),
        format!("-T{buildinc}/../../linker.ld"),
        "-N".to_string(),
    ]
    .join(" ");

    Ok(vec![
        "--builddir".to_string(),
        run_dir.join("benchmarks").display().to_string(),
        "--logdir".to_string(),
        run_dir.join("logs").display().to_string(),
        "--arch".to_string(),
        arch.to_string(),
        "--chip".to_string(),
        "generic".to_string(),
        "--cpu-mhz".to_string(),
        cpu_mhz.to_string(),
        "--timeout".to_string(),
        "120".to_string(),
        "--cc".to_string(),
        format!("{triple}-gcc"),
        format!("--cflags={cflags}"),
        format!("--user-libs={}", user_libs.join(" ")),
        format!("--ldflags={ldflags}"),
        "--clean".to_string(),
        "--warmup-heat".to_string(),
        "0".to_string(),
        "-v".to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::path::PathBuf;

    fn params() -> CpuParams {
        CpuParams::from_pairs(&[
            ("TRIPLE", "riscv64-unknown-elf"),
            ("BUILDINC_DIRECTORY", "/soc/build/include"),
            ("CPU_DIRECTORY", "/soc/cpu/vexriscv"),
            ("SOC_DIRECTORY", "/soc"),
            ("CPUFLAGS", "-march=rv32i -mabi=ilp32"),
            ("PICOLIBC_DIRECTORY", "/soc/picolibc"),
        ])
    }

    fn run_dir() -> PathBuf {
        PathBuf::from("/runs/vexriscv_standard_32_false")
    }

    #[test]
    fn assembly_is_byte_identical_across_calls() {
        let first = assemble(&run_dir(), "sim", 1, &params(), false).expect("assemble");
        let second = assemble(&run_dir(), "sim", 1, &params(), false).expect("assemble");
        assert_eq!(first, second);
    }

    #[test]
    fn composes_the_exact_flag_surface() {
        let args = assemble(&run_dir(), "sim", 1, &params(), false).expect("assemble");
        assert_eq!(
            args[..14],
            [
                "--builddir",
                "/runs/vexriscv_standard_32_false/benchmarks",
                "--logdir",
                "/runs/vexriscv_standard_32_false/logs",
                "--arch",
                "sim",
                "--chip",
                "generic",
                "--cpu-mhz",
                "1",
                "--timeout",
                "120",
                "--cc",
                "riscv64-unknown-elf-gcc",
            ]
        );
        assert_eq!(
            args[14],
            "--cflags=-v -I/soc/build/include -I/soc/build/include/../libc \
             -I/soc/cpu/vexriscv -I/soc/software/include -I/soc/software/libbase \
             -std=gnu99 -march=rv32i -mabi=ilp32 -I/soc/picolibc/newlib/libc/tinystdio \
             -I/soc/picolibc/newlib/libc/include -O2 -ffunction-sections"
        );
        assert_eq!(
            args[15],
            "--user-libs=/soc/build/include/../bios/crt0.o -L/soc/build/include \
             -L/soc/build/include/../libc -L/soc/build/include/../libcompiler_rt \
             -L/soc/build/include/../libbase -lc -lcompiler_rt -lbase -lgcc"
        );
        assert_eq!(
            args[16],
            "--ldflags=-nostdlib -nodefaultlibs -nolibc -Wl,--verbose \
             -march=rv32i -mabi=ilp32 -T/soc/build/include/../../linker.ld -N"
        );
        assert_eq!(args[17..], ["--clean", "--warmup-heat", "0", "-v"]);
    }

    #[test]
    fn arty_tag_and_clock_pass_through() {
        let args = assemble(&run_dir(), "arty", 100, &params(), false).expect("assemble");
        assert_eq!(&args[4..6], &["--arch", "arty"]);
        assert_eq!(&args[8..10], &["--cpu-mhz", "100"]);
    }

    #[test]
    fn mul_helper_precedes_crt0() {
        let args = assemble(&run_dir(), "sim", 1, &params(), true).expect("assemble");
        let user_libs = args
            .iter()
            .find(|a| a.starts_with("--user-libs="))
            .expect("user-libs flag");
        assert!(user_libs.starts_with(
            "--user-libs=/soc/build/include/../bios/mul.o /soc/build/include/../bios/crt0.o"
        ));
    }

    #[test]
    fn missing_key_fails_before_anything_runs() {
        let incomplete = CpuParams::from_pairs(&[("TRIPLE", "riscv64-unknown-elf")]);
        let err = assemble(&run_dir(), "sim", 1, &incomplete, false).unwrap_err();
        assert!(matches!(err, Error::MissingVariable(key) if key == "BUILDINC_DIRECTORY"));
    }
}
