use serde::{Deserialize, Serialize};

use crate::config::Theme;

/// Named colors for the popup, as `#rrggbb` strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub window_bg: String,
    pub surface_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub text_placeholder: String,
    pub user_bubble_bg: String,
    pub user_bubble_fg: String,
    pub assistant_bubble_bg: String,
    pub assistant_bubble_fg: String,
    pub code_bg: String,
    pub code_fg: String,
    pub input_bg: String,
    pub input_border: String,
    pub input_fg: String,
    pub accent: String,
    pub accent_hover: String,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            window_bg: "#1c1c1e".to_owned(),
            surface_bg: "#2c2c2e".to_owned(),
            text_primary: "#ffffff".to_owned(),
            text_secondary: "#98989d".to_owned(),
            text_placeholder: "#555555".to_owned(),
            user_bubble_bg: "#0a84ff".to_owned(),
            user_bubble_fg: "#ffffff".to_owned(),
            assistant_bubble_bg: "#2c2c2e".to_owned(),
            assistant_bubble_fg: "#ffffff".to_owned(),
            code_bg: "#111111".to_owned(),
            code_fg: "#e5e5e7".to_owned(),
            input_bg: "#000000".to_owned(),
            input_border: "#3a3a3c".to_owned(),
            input_fg: "#ffffff".to_owned(),
            accent: "#0a84ff".to_owned(),
            accent_hover: "#409cff".to_owned(),
        }
    }

    pub fn light() -> Self {
        Self {
            window_bg: "#f5f5f7".to_owned(),
            surface_bg: "#ffffff".to_owned(),
            text_primary: "#1d1d1f".to_owned(),
            text_secondary: "#6e6e73".to_owned(),
            text_placeholder: "#aeaeb2".to_owned(),
            user_bubble_bg: "#007aff".to_owned(),
            user_bubble_fg: "#ffffff".to_owned(),
            assistant_bubble_bg: "#e9e9eb".to_owned(),
            assistant_bubble_fg: "#1d1d1f".to_owned(),
            code_bg: "#f4f4f4".to_owned(),
            code_fg: "#1d1d1f".to_owned(),
            input_bg: "#ffffff".to_owned(),
            input_border: "#d1d1d6".to_owned(),
            input_fg: "#1d1d1f".to_owned(),
            accent: "#007aff".to_owned(),
            accent_hover: "#0066cc".to_owned(),
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Self::dark()
    }
}

/// Pick the palette for `theme`; `prefers_dark` is consulted only for `Auto`.
/// Allocation: one palette. Complexity: O(1).
pub fn resolve_palette(theme: Theme, prefers_dark: bool) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors::dark(),
        Theme::Light => ThemeColors::light(),
        Theme::Auto if prefers_dark => ThemeColors::dark(),
        Theme::Auto => ThemeColors::light(),
    }
}
