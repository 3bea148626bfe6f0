use quietline_core::{
    PopupConfig, Theme, DEFAULT_POPUP_TITLE, MAX_MESSAGE_CHARS, MAX_TIMEOUT_SECS,
    MIN_MESSAGE_CHARS, MIN_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

use crate::errors::NotifyError;

/// Arguments of one `notify` tool call. Omitted fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotifyArgs {
    pub message: String,
    #[serde(default = "default_true")]
    pub wait_for_response: bool,
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub show_history: bool,
    #[serde(default)]
    pub chime_enabled: bool,
    #[serde(default)]
    pub theme: Theme,
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    DEFAULT_POPUP_TITLE.to_owned()
}

impl NotifyArgs {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            wait_for_response: true,
            timeout: None,
            title: default_title(),
            show_history: true,
            chime_enabled: false,
            theme: Theme::Auto,
        }
    }

    pub fn with_wait_for_response(mut self, wait_for_response: bool) -> Self {
        self.wait_for_response = wait_for_response;
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_show_history(mut self, show_history: bool) -> Self {
        self.show_history = show_history;
        self
    }

    pub fn with_chime(mut self, chime_enabled: bool) -> Self {
        self.chime_enabled = chime_enabled;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Check message length and timeout range. Length is counted in chars.
    /// Complexity: O(n), n = message bytes.
    pub fn validate(&self) -> Result<(), NotifyError> {
        let chars = self.message.chars().count();
        if chars < MIN_MESSAGE_CHARS {
            return Err(NotifyError::EmptyMessage);
        }
        if chars > MAX_MESSAGE_CHARS {
            return Err(NotifyError::MessageTooLong);
        }
        if let Some(timeout) = self.timeout {
            // NaN fails the range check.
            if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout) {
                return Err(NotifyError::TimeoutOutOfRange);
            }
        }
        Ok(())
    }

    /// Overlay these arguments on `base`; window geometry, fonts and history
    /// limit stay as configured there.
    pub fn popup_config(&self, base: &PopupConfig) -> PopupConfig {
        PopupConfig {
            title: self.title.clone(),
            timeout: self.timeout,
            show_history: self.show_history,
            chime_enabled: self.chime_enabled,
            theme: self.theme,
            ..base.clone()
        }
    }
}
