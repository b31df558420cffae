//! Caller options and the frozen resolution snapshot.
//!
//! [`ThemeOptions`] is what a host writes: every field is optional and has a
//! documented default. It deserializes from JSON or YAML with camelCase keys:
//!
//! ```yaml
//! initialTheme: blue
//! fallbackTheme: light
//! storageType: session
//! followSystemPreference: initial-only
//! transitionDurationMs: 150
//! scheduleThemes:
//!   - { theme: dark, from: "18:00", to: "06:00" }
//! ```
//!
//! [`ResolutionConfig`] is the immutable snapshot a [`ThemeCore`](crate::ThemeCore)
//! takes at construction. Changing behavior means building a new core.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ThemeError;
use crate::schedule::{Schedule, ScheduleEntry};
use crate::storage::{StorageBackend, StorageMode, DEFAULT_STORAGE_KEY};
use crate::theme::{merge_with_defaults, Theme, ThemeColors, ThemeRegistry};

/// Theme used when nothing else applies.
pub const DEFAULT_FALLBACK_THEME: &str = "light";
/// Default transition duration in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 300;

/// Called after every accepted theme change with the new name and theme.
pub type ThemeChangeCallback = Arc<dyn Fn(&str, &Theme) + Send + Sync>;

/// Whether the OS light/dark preference drives the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "FollowSystemRepr")]
pub enum FollowSystem {
    /// Never.
    #[default]
    Off,
    /// At startup and on every change.
    Always,
    /// Only while the user has no persisted choice.
    InitialOnly,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FollowSystemRepr {
    Flag(bool),
    Name(String),
}

impl TryFrom<FollowSystemRepr> for FollowSystem {
    type Error = String;

    fn try_from(repr: FollowSystemRepr) -> Result<Self, Self::Error> {
        match repr {
            FollowSystemRepr::Flag(false) => Ok(FollowSystem::Off),
            FollowSystemRepr::Flag(true) => Ok(FollowSystem::Always),
            FollowSystemRepr::Name(name) => match name.as_str() {
                "off" => Ok(FollowSystem::Off),
                "always" => Ok(FollowSystem::Always),
                "initial-only" => Ok(FollowSystem::InitialOnly),
                other => Err(format!(
                    "unknown followSystemPreference '{}': expected off, always or initial-only",
                    other
                )),
            },
        }
    }
}

/// Caller-supplied theming options.
///
/// # Example
///
/// ```rust
/// use themekeeper::{FollowSystem, StorageMode, ThemeOptions};
///
/// let options = ThemeOptions::new()
///     .initial_theme("blue")
///     .storage_type(StorageMode::Session)
///     .follow_system_preference(FollowSystem::InitialOnly)
///     .schedule("dark", "18:00", "06:00");
///
/// assert_eq!(options.fallback_theme, "light");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeOptions {
    pub initial_theme: Option<String>,
    /// Overrides and additions, merged over the built-in themes in order.
    pub themes: Map<String, Value>,
    pub fallback_theme: String,
    pub storage_key: String,
    pub storage_type: StorageMode,
    pub follow_system_preference: FollowSystem,
    /// `0` disables transition styling.
    pub transition_duration_ms: u64,
    pub schedule_themes: Vec<ScheduleEntry>,
    #[serde(skip)]
    pub on_theme_change: Option<ThemeChangeCallback>,
    /// Replaces the built-in store for durable and session modes.
    #[serde(skip)]
    pub storage_backend: Option<Arc<dyn StorageBackend>>,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            initial_theme: None,
            themes: Map::new(),
            fallback_theme: DEFAULT_FALLBACK_THEME.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_type: StorageMode::default(),
            follow_system_preference: FollowSystem::default(),
            transition_duration_ms: DEFAULT_TRANSITION_MS,
            schedule_themes: Vec::new(),
            on_theme_change: None,
            storage_backend: None,
        }
    }
}

impl ThemeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from JSON.
    pub fn from_json_str(source: &str) -> Result<Self, ThemeError> {
        serde_json::from_str(source).map_err(|e| ThemeError::InvalidOptions {
            path: None,
            message: e.to_string(),
        })
    }

    /// Parses options from YAML.
    pub fn from_yaml_str(source: &str) -> Result<Self, ThemeError> {
        serde_yaml::from_str(source).map_err(|e| ThemeError::InvalidOptions {
            path: None,
            message: e.to_string(),
        })
    }

    /// Loads options from a `.json`, `.yaml` or `.yml` file.
    ///
    /// Files with any other extension are parsed as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let with_path = |e: ThemeError| match e {
            ThemeError::InvalidOptions { message, .. } => ThemeError::InvalidOptions {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        };

        let source = fs::read_to_string(path).map_err(|e| ThemeError::InvalidOptions {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            Self::from_yaml_str(&source).map_err(with_path)
        } else {
            Self::from_json_str(&source).map_err(with_path)
        }
    }

    pub fn initial_theme(mut self, name: impl Into<String>) -> Self {
        self.initial_theme = Some(name.into());
        self
    }

    /// Adds or overrides a theme. The theme's name is its registry key.
    pub fn theme(mut self, theme: Theme) -> Self {
        match serde_json::to_value(&theme) {
            Ok(value) => {
                self.themes.insert(theme.name.clone(), value);
            }
            Err(e) => tracing::warn!(theme = %theme.name, error = %e, "could not record theme"),
        }
        self
    }

    /// Adds or overrides a theme from a bare color set.
    pub fn theme_colors(mut self, name: impl Into<String>, colors: ThemeColors) -> Self {
        let name = name.into();
        match serde_json::to_value(&colors) {
            Ok(value) => {
                self.themes.insert(name, value);
            }
            Err(e) => tracing::warn!(theme = %name, error = %e, "could not record theme colors"),
        }
        self
    }

    /// Adds or overrides a theme from an untyped value, validated later.
    pub fn raw_theme(mut self, name: impl Into<String>, value: Value) -> Self {
        self.themes.insert(name.into(), value);
        self
    }

    pub fn fallback_theme(mut self, name: impl Into<String>) -> Self {
        self.fallback_theme = name.into();
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn storage_type(mut self, mode: StorageMode) -> Self {
        self.storage_type = mode;
        self
    }

    pub fn follow_system_preference(mut self, follow: FollowSystem) -> Self {
        self.follow_system_preference = follow;
        self
    }

    pub fn transition_duration_ms(mut self, duration_ms: u64) -> Self {
        self.transition_duration_ms = duration_ms;
        self
    }

    /// Appends a schedule slot. Earlier slots take precedence.
    pub fn schedule(
        mut self,
        theme: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.schedule_themes.push(ScheduleEntry::new(theme, from, to));
        self
    }

    pub fn on_theme_change(mut self, callback: impl Fn(&str, &Theme) + Send + Sync + 'static) -> Self {
        self.on_theme_change = Some(Arc::new(callback));
        self
    }

    pub fn storage_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.storage_backend = Some(backend);
        self
    }

    /// The registry these options describe: built-ins merged with `themes`.
    pub fn registry(&self) -> ThemeRegistry {
        merge_with_defaults(self.themes.clone())
    }
}

impl fmt::Debug for ThemeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeOptions")
            .field("initial_theme", &self.initial_theme)
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .field("fallback_theme", &self.fallback_theme)
            .field("storage_key", &self.storage_key)
            .field("storage_type", &self.storage_type)
            .field("follow_system_preference", &self.follow_system_preference)
            .field("transition_duration_ms", &self.transition_duration_ms)
            .field("schedule_themes", &self.schedule_themes)
            .field("on_theme_change", &self.on_theme_change.is_some())
            .field("storage_backend", &self.storage_backend.is_some())
            .finish()
    }
}

/// Immutable resolution settings, frozen when a core is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionConfig {
    pub initial_theme: Option<String>,
    pub fallback_theme: String,
    pub storage_key: String,
    pub storage_mode: StorageMode,
    pub follow_system: FollowSystem,
    pub transition_duration_ms: u64,
    pub schedule: Schedule,
}

impl ResolutionConfig {
    /// Freezes `options`, parsing the schedule. Malformed slots are dropped
    /// with a warning.
    pub fn from_options(options: &ThemeOptions) -> Self {
        Self {
            initial_theme: options.initial_theme.clone(),
            fallback_theme: options.fallback_theme.clone(),
            storage_key: options.storage_key.clone(),
            storage_mode: options.storage_type,
            follow_system: options.follow_system_preference,
            transition_duration_ms: options.transition_duration_ms,
            schedule: Schedule::from_entries(&options.schedule_themes),
        }
    }

    /// Returns true when the preference listener should run, given whether a
    /// persisted theme was found at startup.
    pub fn listens_to_preference(&self, found_persisted: bool) -> bool {
        match self.follow_system {
            FollowSystem::Off => false,
            FollowSystem::Always => true,
            FollowSystem::InitialOnly => !found_persisted,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self::from_options(&ThemeOptions::default())
    }
}
