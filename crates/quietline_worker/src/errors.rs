use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to read popup request: {0}")]
    ReadRequest(#[source] std::io::Error),
    #[error("invalid popup request: {0}")]
    DecodeRequest(#[from] serde_json::Error),
    #[error("failed to start popup window: {0}")]
    Gui(String),
    #[error("failed to write popup outcome: {0}")]
    WriteOutcome(#[source] std::io::Error),
}
