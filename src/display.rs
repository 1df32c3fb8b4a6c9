use std::env;

/// The output surface the active theme is applied to
pub trait DisplaySurface {
    fn set_dark_mode(&mut self, enabled: bool);

    /// Platform preference consulted by `Theme::Auto`
    fn prefers_dark(&self) -> bool;
}

/// Terminal output mode, reported by `desk settings show`
#[derive(Debug, Clone, Default)]
pub struct TerminalDisplay {
    dark: bool,
    prefers_dark: bool,
}

impl TerminalDisplay {
    /// `preference` overrides what the terminal reports about its background
    pub fn new(preference: Option<bool>) -> Self {
        Self {
            dark: false,
            prefers_dark: preference.unwrap_or_else(detect_dark_background),
        }
    }
}

impl DisplaySurface for TerminalDisplay {
    fn set_dark_mode(&mut self, enabled: bool) {
        if self.dark != enabled {
            tracing::debug!(dark = enabled, "display mode changed");
        }
        self.dark = enabled;
    }

    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}

fn detect_dark_background() -> bool {
    env::var("COLORFGBG")
        .ok()
        .and_then(|value| background_is_dark(&value))
        .unwrap_or(false)
}

/// Reads a `COLORFGBG` value such as `15;0` or `0;default;15`.
/// The last field is the background color index.
pub fn background_is_dark(colorfgbg: &str) -> Option<bool> {
    let background: u8 = colorfgbg.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(background, 0..=6 | 8))
}
