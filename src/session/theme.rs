//! Theme selection
//!
//! An explicit theme always wins. Otherwise the host's color-scheme
//! preference picks between the two built-in themes.

use std::env;

pub const LIGHT_THEME: &str = "vs-light";
pub const DARK_THEME: &str = "vs-dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    Dark,
    #[default]
    Light,
}

impl ColorScheme {
    pub fn theme(self) -> &'static str {
        match self {
            Self::Dark => DARK_THEME,
            Self::Light => LIGHT_THEME,
        }
    }
}

/// Host color-scheme preference, queried on every render
pub trait ColorSchemeSource: Send + Sync {
    fn color_scheme(&self) -> ColorScheme;
}

impl ColorSchemeSource for ColorScheme {
    fn color_scheme(&self) -> ColorScheme {
        *self
    }
}

/// Preference from configuration, falling back to the terminal for `auto`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemColorScheme {
    setting: String,
}

impl SystemColorScheme {
    /// `setting` is `dark`, `light` or `auto`
    pub fn new(setting: impl Into<String>) -> Self {
        Self {
            setting: setting.into(),
        }
    }

    fn from_terminal() -> ColorScheme {
        env::var("COLORFGBG")
            .ok()
            .and_then(|value| parse_colorfgbg(&value))
            .unwrap_or_default()
    }
}

impl Default for SystemColorScheme {
    fn default() -> Self {
        Self::new("auto")
    }
}

impl ColorSchemeSource for SystemColorScheme {
    fn color_scheme(&self) -> ColorScheme {
        match self.setting.to_ascii_lowercase().as_str() {
            "dark" => ColorScheme::Dark,
            "light" => ColorScheme::Light,
            _ => Self::from_terminal(),
        }
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); ANSI backgrounds
/// 0-6 and 8 are dark.
fn parse_colorfgbg(value: &str) -> Option<ColorScheme> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(match background {
        0..=6 | 8 => ColorScheme::Dark,
        _ => ColorScheme::Light,
    })
}

/// Explicit theme if given, else the scheme's built-in theme
pub fn resolve_theme(explicit: Option<&str>, scheme: ColorScheme) -> String {
    match explicit {
        Some(theme) if !theme.is_empty() => theme.to_string(),
        _ => scheme.theme().to_string(),
    }
}
