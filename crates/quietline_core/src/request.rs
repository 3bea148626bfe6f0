use serde::{Deserialize, Serialize};

use crate::config::PopupConfig;
use crate::theme::ThemeColors;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior exchange shown as a chat bubble above the current message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything one popup invocation needs. Built once per call and consumed
/// by the driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopupRequest {
    pub message: String,
    pub config: PopupConfig,
    pub history: Vec<HistoryEntry>,
    pub wait_for_response: bool,
}

impl PopupRequest {
    pub fn new(message: impl Into<String>, config: PopupConfig) -> Self {
        Self {
            message: message.into(),
            config,
            history: Vec::new(),
            wait_for_response: true,
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn with_wait_for_response(mut self, wait_for_response: bool) -> Self {
        self.wait_for_response = wait_for_response;
        self
    }

    /// History bubbles the worker should render: none if history is hidden,
    /// otherwise the last `history_limit` entries in order.
    pub fn visible_history(&self) -> &[HistoryEntry] {
        if !self.config.show_history {
            return &[];
        }
        let start = self
            .history
            .len()
            .saturating_sub(self.config.history_limit);
        &self.history[start..]
    }
}

/// Document written to the worker's stdin: the request plus the palette the
/// caller resolved, so the worker never probes the platform theme itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    #[serde(flatten)]
    pub request: PopupRequest,
    pub colors: ThemeColors,
}
