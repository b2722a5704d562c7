use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::{read_state, write_state, KeyValueStore, THEME_KEY};

/// Light or dark appearance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The color set for this theme.
    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT_PALETTE,
            Theme::Dark => &DARK_PALETTE,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

/// Named colors used by the views, as `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub surface_hover: &'static str,
    pub primary: &'static str,
    pub primary_hover: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub card: &'static str,
    pub card_hover: &'static str,
}

pub const LIGHT_PALETTE: Palette = Palette {
    background: "#FFFFFF",
    surface: "#F8FAFC",
    surface_hover: "#F1F5F9",
    primary: "#3B82F6",
    primary_hover: "#2563EB",
    secondary: "#64748B",
    accent: "#8B5CF6",
    text: "#1E293B",
    text_secondary: "#64748B",
    border: "#E2E8F0",
    success: "#10B981",
    warning: "#F59E0B",
    error: "#EF4444",
    card: "#FFFFFF",
    card_hover: "#F8FAFC",
};

pub const DARK_PALETTE: Palette = Palette {
    background: "#0F172A",
    surface: "#1E293B",
    surface_hover: "#334155",
    primary: "#60A5FA",
    primary_hover: "#3B82F6",
    secondary: "#94A3B8",
    accent: "#A78BFA",
    text: "#F8FAFC",
    text_secondary: "#94A3B8",
    border: "#334155",
    success: "#34D399",
    warning: "#FBBF24",
    error: "#F87171",
    card: "#1E293B",
    card_hover: "#334155",
};

impl Palette {
    /// Parses `#RRGGBB` into its components.
    pub fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

#[derive(Serialize, Deserialize)]
struct ThemeState {
    theme: Theme,
}

/// Holds the active theme and persists it independently of the tasks.
pub struct ThemeStore {
    theme: Theme,
    storage: Box<dyn KeyValueStore>,
}

impl ThemeStore {
    /// Loads the stored theme, falling back to [`Theme::default`].
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let theme = match read_state::<ThemeState>(storage.as_ref(), THEME_KEY) {
            Ok(Some(s)) => s.theme,
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "stored theme is unreadable, using default");
                Theme::default()
            }
        };
        ThemeStore { theme, storage }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn colors(&self) -> &'static Palette {
        self.theme.palette()
    }

    /// Flips between light and dark and returns the new theme.
    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = write_state(self.storage.as_ref(), THEME_KEY, &ThemeState { theme }) {
            tracing::warn!(error = %e, "failed to persist theme");
        }
    }
}
