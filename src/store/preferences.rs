use serde::{Deserialize, Serialize};

use super::KvStore;

pub const THEME_KEY: &str = "theme";
pub const SLIDERS_KEY: &str = "sliders-enabled";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSnapshot {
    pub theme: Theme,
    /// False when the theme came from the OS fallback.
    pub theme_saved: bool,
    pub sliders_enabled: bool,
    pub storage_available: bool,
}

/// Theme and slider toggles stored in a [`KvStore`].
pub struct Preferences<'a> {
    store: &'a mut KvStore,
}

impl<'a> Preferences<'a> {
    pub fn new(store: &'a mut KvStore) -> Self {
        Self { store }
    }

    /// Saved theme, if any. Any saved value other than `dark` reads as light.
    pub fn saved_theme(&self) -> Option<Theme> {
        match self.store.get(THEME_KEY) {
            Some("") | None => None,
            Some("dark") => Some(Theme::Dark),
            Some(_) => Some(Theme::Light),
        }
    }

    pub fn preferred_theme(&self, os_prefers_dark: bool) -> Theme {
        self.saved_theme().unwrap_or(if os_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn sliders_enabled(&self) -> bool {
        self.store.get(SLIDERS_KEY) == Some("1")
    }

    pub fn set_sliders_enabled(&mut self, enabled: bool) -> bool {
        self.store.set(SLIDERS_KEY, if enabled { "1" } else { "0" })
    }

    pub fn snapshot(&self, os_prefers_dark: bool) -> PreferenceSnapshot {
        PreferenceSnapshot {
            theme: self.preferred_theme(os_prefers_dark),
            theme_saved: self.saved_theme().is_some(),
            sliders_enabled: self.sliders_enabled(),
            storage_available: self.store.is_available(),
        }
    }
}
