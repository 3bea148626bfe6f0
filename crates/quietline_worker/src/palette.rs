use eframe::egui::Color32;
use quietline_core::ThemeColors;
use tracing::warn;

/// `ThemeColors` decoded into egui colors once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub window_bg: Color32,
    pub surface_bg: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_placeholder: Color32,
    pub user_bubble_bg: Color32,
    pub user_bubble_fg: Color32,
    pub assistant_bubble_bg: Color32,
    pub assistant_bubble_fg: Color32,
    pub code_bg: Color32,
    pub code_fg: Color32,
    pub input_bg: Color32,
    pub input_border: Color32,
    pub input_fg: Color32,
    pub accent: Color32,
    pub accent_hover: Color32,
    pub dark: bool,
}

impl Palette {
    pub fn from_colors(colors: &ThemeColors) -> Self {
        let fallback = if colors.is_dark() {
            Color32::WHITE
        } else {
            Color32::BLACK
        };
        let pick = |name: &str, hex: &str| {
            parse_hex(hex).unwrap_or_else(|| {
                warn!(color = name, value = hex, "invalid palette color");
                fallback
            })
        };

        Self {
            window_bg: pick("window_bg", &colors.window_bg),
            surface_bg: pick("surface_bg", &colors.surface_bg),
            text_primary: pick("text_primary", &colors.text_primary),
            text_secondary: pick("text_secondary", &colors.text_secondary),
            text_placeholder: pick("text_placeholder", &colors.text_placeholder),
            user_bubble_bg: pick("user_bubble_bg", &colors.user_bubble_bg),
            user_bubble_fg: pick("user_bubble_fg", &colors.user_bubble_fg),
            assistant_bubble_bg: pick("assistant_bubble_bg", &colors.assistant_bubble_bg),
            assistant_bubble_fg: pick("assistant_bubble_fg", &colors.assistant_bubble_fg),
            code_bg: pick("code_bg", &colors.code_bg),
            code_fg: pick("code_fg", &colors.code_fg),
            input_bg: pick("input_bg", &colors.input_bg),
            input_border: pick("input_border", &colors.input_border),
            input_fg: pick("input_fg", &colors.input_fg),
            accent: pick("accent", &colors.accent),
            accent_hover: pick("accent_hover", &colors.accent_hover),
            dark: luminance(pick("window_bg", &colors.window_bg)) < 0.5,
        }
    }
}

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex(value: &str) -> Option<Color32> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match digits.len() {
        6 => Some(Color32::from_rgb(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
        )),
        3 => {
            let short = |index: usize| channel(index..index + 1).map(|nibble| nibble * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

fn luminance(color: Color32) -> f32 {
    (0.299 * f32::from(color.r()) + 0.587 * f32::from(color.g()) + 0.114 * f32::from(color.b()))
        / 255.0
}
