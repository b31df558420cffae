use std::collections::BTreeMap;

use super::Size;
use crate::core::ThemeHandle;
use crate::theme::title_case;

/// Label shown next to the toggle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToggleLabel {
    /// "`<Next>` Mode".
    #[default]
    Default,
    Fixed(String),
    /// Keyed by the side currently active (the light or dark theme name).
    /// Missing keys use the default label.
    PerTheme(BTreeMap<String, String>),
}

/// What a renderer needs to draw the toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleState {
    pub is_dark: bool,
    /// The side currently shown.
    pub current: String,
    /// The theme activating the toggle switches to.
    pub next: String,
    /// `None` unless labels are enabled.
    pub label: Option<String>,
    pub aria_label: String,
    /// Size classes followed by the active theme's button classes.
    pub class: String,
}

/// A two-state light/dark switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeToggle {
    pub light_theme: String,
    pub dark_theme: String,
    pub size: Size,
    pub show_label: bool,
    pub label: ToggleLabel,
}

impl Default for ThemeToggle {
    fn default() -> Self {
        Self {
            light_theme: "light".to_string(),
            dark_theme: "dark".to_string(),
            size: Size::default(),
            show_label: false,
            label: ToggleLabel::default(),
        }
    }
}

impl ThemeToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn themes(mut self, light: impl Into<String>, dark: impl Into<String>) -> Self {
        self.light_theme = light.into();
        self.dark_theme = dark.into();
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Enables the label.
    pub fn label(mut self, label: ToggleLabel) -> Self {
        self.show_label = true;
        self.label = label;
        self
    }

    pub fn state(&self, handle: &ThemeHandle) -> ToggleState {
        let theme = handle.theme();
        let is_dark = theme == self.dark_theme;
        let (current, next) = if is_dark {
            (&self.dark_theme, &self.light_theme)
        } else {
            (&self.light_theme, &self.dark_theme)
        };

        let default_label = || format!("{} Mode", title_case(next));
        let label = self.show_label.then(|| match &self.label {
            ToggleLabel::Default => default_label(),
            ToggleLabel::Fixed(text) => text.clone(),
            ToggleLabel::PerTheme(labels) => labels
                .get(current.as_str())
                .cloned()
                .unwrap_or_else(default_label),
        });

        ToggleState {
            is_dark,
            current: current.clone(),
            next: next.clone(),
            label,
            aria_label: format!("Switch to {} theme", next),
            class: format!(
                "{} {}",
                self.size.button_class(),
                handle.theme_object().colors.button
            ),
        }
    }

    /// Flips the theme. Returns the theme applied.
    pub fn activate(&self, handle: &ThemeHandle) -> String {
        handle.toggle_theme(&self.light_theme, Some(&self.dark_theme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::{ColorMode, ManualPreference};
    use crate::storage::StorageMode;
    use crate::{ThemeCore, ThemeOptions};

    fn core() -> ThemeCore {
        ThemeCore::builder(ThemeOptions::new().storage_type(StorageMode::None))
            .preference(ManualPreference::new(ColorMode::Light))
            .build()
    }

    #[test]
    fn test_default_toggle_flips_light_dark() {
        let core = core();
        let toggle = ThemeToggle::new();

        let state = toggle.state(&core.handle());
        assert!(!state.is_dark);
        assert_eq!(state.next, "dark");
        assert_eq!(state.label, None);
        assert_eq!(state.aria_label, "Switch to dark theme");
        assert!(state.class.starts_with("p-2 text-base bg-gray-900"));

        assert_eq!(toggle.activate(&core.handle()), "dark");
        assert!(toggle.state(&core.handle()).is_dark);
        assert_eq!(toggle.activate(&core.handle()), "light");
    }

    #[test]
    fn test_labels() {
        let core = core();
        let handle = core.handle();

        let plain = ThemeToggle::new().label(ToggleLabel::Default);
        assert_eq!(plain.state(&handle).label.as_deref(), Some("Dark Mode"));

        let fixed = ThemeToggle::new().label(ToggleLabel::Fixed("Theme".to_string()));
        assert_eq!(fixed.state(&handle).label.as_deref(), Some("Theme"));

        let per_theme = ThemeToggle::new().label(ToggleLabel::PerTheme(BTreeMap::from([(
            "dark".to_string(),
            "Lights on".to_string(),
        )])));
        assert_eq!(per_theme.state(&handle).label.as_deref(), Some("Dark Mode"));
        handle.set_theme("dark");
        assert_eq!(per_theme.state(&handle).label.as_deref(), Some("Lights on"));
    }

    #[test]
    fn test_custom_pair_from_unrelated_theme() {
        let core = core();
        core.set_theme("green");
        let toggle = ThemeToggle::new().themes("blue", "purple");

        let state = toggle.state(&core.handle());
        assert_eq!(state.current, "blue");
        assert_eq!(state.next, "purple");

        assert_eq!(toggle.activate(&core.handle()), "blue");
        assert_eq!(toggle.activate(&core.handle()), "purple");
    }
}
