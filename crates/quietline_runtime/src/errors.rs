use std::time::Duration;

use thiserror::Error;

/// Failure on the popup path. Callers never see these directly: the driver
/// logs them and degrades to a `PopupOutcome`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PopupError {
    #[error("failed to spawn worker `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("failed to encode worker request: {0}")]
    Encode(String),
    #[error("worker io failed: {0}")]
    Io(String),
    #[error("worker exited unsuccessfully: {0}")]
    WorkerExit(String),
    #[error("worker produced no output")]
    EmptyOutput,
    #[error("malformed worker output: {0}")]
    MalformedOutput(String),
    #[error("worker missed its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}
