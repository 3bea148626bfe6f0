use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_POPUP_TITLE: &str = "Quietline";
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the platform dark-mode setting.
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Appearance and behavior of one popup window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub topmost: bool,
    /// Seconds without interaction before the worker reports a timeout.
    pub timeout: Option<f64>,
    pub show_history: bool,
    pub history_limit: usize,
    pub chime_enabled: bool,
    pub theme: Theme,
    pub font_family: String,
    pub font_size: u16,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_POPUP_TITLE.to_owned(),
            width: 500,
            height: 600,
            topmost: true,
            timeout: None,
            show_history: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            chime_enabled: false,
            theme: Theme::Auto,
            font_family: "SF Pro Text".to_owned(),
            font_size: 14,
        }
    }
}

impl PopupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_topmost(mut self, topmost: bool) -> Self {
        self.topmost = topmost;
        self
    }

    pub fn with_timeout_secs(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_show_history(mut self, show_history: bool) -> Self {
        self.show_history = show_history;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
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

    pub fn with_font(mut self, family: impl Into<String>, size: u16) -> Self {
        self.font_family = family.into();
        self.font_size = size;
        self
    }

    /// Configured timeout as a `Duration`. Negative, zero, non-finite, and
    /// unrepresentably large values mean "no timer".
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
