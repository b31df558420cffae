use std::time::{Duration, Instant};

use crate::theme::title_case;

/// How long the indicator stays visible by default.
pub const DEFAULT_INDICATOR_DURATION: Duration = Duration::from_millis(3000);

/// A transient notice shown after the theme changes.
///
/// Feed it every theme name you observe. The first observation only records
/// the starting theme; later ones that differ show the notice for
/// `duration`.
#[derive(Debug, Clone)]
pub struct ThemeIndicator {
    pub duration: Duration,
    pub show_theme_name: bool,
    last_seen: Option<String>,
    visible_until: Option<Instant>,
}

impl Default for ThemeIndicator {
    fn default() -> Self {
        Self {
            duration: DEFAULT_INDICATOR_DURATION,
            show_theme_name: true,
            last_seen: None,
            visible_until: None,
        }
    }
}

impl ThemeIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn show_theme_name(mut self, show: bool) -> Self {
        self.show_theme_name = show;
        self
    }

    /// Records `theme`. Returns true when this observation shows the notice.
    pub fn observe(&mut self, theme: &str, now: Instant) -> bool {
        let changed = match self.last_seen.as_deref() {
            None => false,
            Some(last) => last != theme,
        };
        if self.last_seen.as_deref() != Some(theme) {
            self.last_seen = Some(theme.to_string());
        }
        if changed {
            self.visible_until = Some(now + self.duration);
        }
        changed
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }

    /// "`<Name>` Theme" for the last observed theme, if names are shown.
    pub fn message(&self) -> Option<String> {
        if !self.show_theme_name {
            return None;
        }
        self.last_seen
            .as_deref()
            .map(|theme| format!("{} Theme", title_case(theme)))
    }
}
