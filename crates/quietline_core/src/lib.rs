//! Contract types shared between the popup caller and the GUI worker process.

mod config;
mod outcome;
mod request;
mod session;
mod theme;

pub use config::{PopupConfig, Theme, DEFAULT_HISTORY_LIMIT, DEFAULT_POPUP_TITLE};
pub use outcome::{parse_outcome_document, OutcomeDocument, OutcomeParseError, PopupOutcome};
pub use request::{HistoryEntry, PopupRequest, Role, WorkerRequest};
pub use session::{Gesture, PopupSession, SessionState};
pub use theme::{resolve_palette, ThemeColors};

/// Lower bound of the message length accepted by the notify tool, in characters.
pub const MIN_MESSAGE_CHARS: usize = 1;
/// Upper bound of the message length accepted by the notify tool, in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;
/// Accepted range for an explicit popup timeout, in seconds.
pub const MIN_TIMEOUT_SECS: f64 = 5.0;
pub const MAX_TIMEOUT_SECS: f64 = 300.0;

#[cfg(test)]
mod tests;
