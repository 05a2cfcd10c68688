use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("input file does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to run probe `{program}`: {source}")]
    ProbeSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("probe `{program}` failed (exit code {code:?}): {stderr}")]
    ProbeFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse probe output as a duration: {0}")]
    DurationParse(String),

    #[error("failed to open frame stream from `{program}`: {source}")]
    PipeSetup {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("frame stream ended early at frame {frame} (needed {expected} bytes): {source}")]
    StreamTruncated {
        frame: usize,
        expected: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("decoder `{program}` exited with failure (exit code {code:?})")]
    DecoderExit { program: String, code: Option<i32> },

    #[error("failed to write output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write frame to display: {0}")]
    DisplayWrite(#[source] std::io::Error),
}
