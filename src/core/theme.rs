//! Light/dark theme preference.

use crate::store::PreferenceStore;
use anyhow::Result;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application-scoped theme setting. Read once from the store when created
/// and written back on every [`ThemeSettings::toggle`].
pub struct ThemeSettings {
    store: Arc<dyn PreferenceStore>,
    theme: Theme,
}

impl ThemeSettings {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let theme = match store.get(THEME_KEY) {
            Ok(Some(value)) if value == Theme::Dark.as_str() => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::Light
            }
        };
        debug!(%theme, "Loaded theme preference");
        Self { store, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.store.set(THEME_KEY, next.as_str())?;
        self.theme = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        let settings = ThemeSettings::load(Arc::new(MemoryStore::new()));
        assert_eq!(settings.theme(), Theme::Light);
        assert!(!settings.is_dark());
    }

    #[test]
    fn test_unknown_value_is_light() {
        let store = Arc::new(MemoryStore::new());
        store.set(THEME_KEY, "solarized").unwrap();
        let settings = ThemeSettings::load(store);
        assert_eq!(settings.theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = ThemeSettings::load(store.clone());

        assert_eq!(settings.toggle().unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        let reloaded = ThemeSettings::load(store.clone());
        assert!(reloaded.is_dark());

        assert_eq!(settings.toggle().unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }
}
