//! litebench - Embench benchmark harness for `LiteX SoC` CPU cores.
//!
//! Turns a CPU/variant descriptor into a reproducible sequence of external
//! tool invocations (cross compiler, Embench build and speed tools, a
//! simulation or FPGA backend) and scrapes the resulting logs back into
//! structured speed results.
//!
//! # Example
//!
//! ```ignore
//! use litebench::{Pipeline, RunConfig, Strategy};
//!
//! let config = RunConfig { /* cpu type, variant, strategy, ... */ };
//! let pipeline = Pipeline::prepare(&output_dir, config, &embench, &sources, &makefile)?;
//! let outcome = pipeline.run()?;
//! std::process::exit(outcome.exit_code());
//! ```

pub mod build;
pub mod buildargs;
pub mod extract;
pub mod identity;
pub mod measure;
pub mod pipeline;
pub mod platform;
pub mod variables;

mod error;
pub use error::{Error, Result};

pub use extract::Profile;
pub use identity::{RunConfig, Strategy};
pub use pipeline::{Pipeline, RunOutcome, Tools};
pub use platform::Descriptor as PlatformDescriptor;
pub use variables::CpuParams;

#[cfg(test)]
pub(crate) mod test_util;
