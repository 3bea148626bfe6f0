use thiserror::Error;

/// Rejections the notify tool reports back to the caller as `Error: ...`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Message exceeds maximum length of 10,000 characters")]
    MessageTooLong,
    #[error("Timeout must be between 5 and 300 seconds")]
    TimeoutOutOfRange,
    #[error(
        "Cannot display popup - no display available. This feature requires a graphical environment."
    )]
    Headless,
    #[error("Invalid arguments - {0}")]
    InvalidArguments(String),
}

impl NotifyError {
    /// The exact string handed back to the tool host.
    pub fn to_tool_output(&self) -> String {
        format!("Error: {self}")
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("conversation log io error: {0}")]
    Io(String),
    #[error("conversation log serialize error: {0}")]
    Serialize(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChimeError {
    #[error("no sound player available on this platform")]
    Unavailable,
    #[error("failed to start sound player `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("sound player `{program}` exited with {status}")]
    Failed { program: String, status: String },
    #[error("sound player `{program}` did not finish in time")]
    TimedOut { program: String },
}
