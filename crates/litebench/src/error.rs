use std::path::PathBuf;

use thiserror::Error;

/// Harness errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed build-variable line in {}: {line:?}", .path.display())]
    MalformedVariables { path: PathBuf, line: String },
    #[error("missing build variable `{0}`")]
    MissingVariable(String),
    #[error("failed to launch `{tool}`: {source}")]
    ToolLaunch { tool: String, source: std::io::Error },
    #[error("`{tool}` failed with exit code {code:?}")]
    ToolFailed { tool: String, code: Option<i32> },
    #[error(
        "conversion of benchmark \"{bench}\" {reason}\n\
         in directory \"{}\"\n\
         command was: {command}\n\
         {stdout}{stderr}",
        .dir.display()
    )]
    ConversionFailed {
        bench: String,
        dir: PathBuf,
        command: String,
        reason: String,
        stdout: String,
        stderr: String,
    },
    #[error("no new speed logs found in {}", .dir.display())]
    NoNewLogs { dir: PathBuf },
    #[error("no {profile} speed-results block found in {}", .log.display())]
    MarkerUnmatched { log: PathBuf, profile: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
