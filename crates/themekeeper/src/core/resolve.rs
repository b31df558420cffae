//! The initial-theme priority chain.
//!
//! One function decides which theme a fresh core starts with. Pre-paint uses
//! the same function, so the best-guess paint and the settled state can only
//! disagree when their inputs do (a storage backend answering differently the
//! second time, for example).

use crate::config::{FollowSystem, ResolutionConfig};
use crate::preference::ColorMode;
use crate::theme::ThemeRegistry;

/// Which rung of the priority chain produced the initial theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Persisted,
    SystemPreference,
    InitialTheme,
    Fallback,
    /// The fallback is not registered; the registry's first theme was used.
    FirstRegistered,
}

/// Outcome of [`resolve_initial`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub theme: String,
    pub source: ResolutionSource,
}

/// Everything the priority chain reads, gathered up front.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInputs<'a> {
    pub registry: &'a ThemeRegistry,
    pub config: &'a ResolutionConfig,
    /// Raw value read from persistence, if any.
    pub persisted: Option<&'a str>,
    /// Current OS preference, if it was read.
    pub preference: Option<ColorMode>,
}

impl ResolutionInputs<'_> {
    /// The persisted value, only when it names a registered theme.
    pub fn registered_persisted(&self) -> Option<&str> {
        self.persisted.filter(|name| self.registry.contains(name))
    }
}

/// Picks the initial theme.
///
/// 1. A persisted value naming a registered theme, when the storage mode persists
/// 2. The OS preference, when following it (`initial-only` requires step 1 to
///    have found nothing) and it names a registered theme
/// 3. `initial_theme`, when registered
/// 4. `fallback_theme`, when registered, else the first registered theme
///
/// Returns `None` only for an empty registry.
pub fn resolve_initial(inputs: &ResolutionInputs<'_>) -> Option<Resolution> {
    let ResolutionInputs {
        registry, config, ..
    } = *inputs;
    let pick = |theme: &str, source| Resolution {
        theme: theme.to_string(),
        source,
    };

    let persisted = if config.storage_mode.persists() {
        inputs.registered_persisted()
    } else {
        None
    };
    if let Some(name) = persisted {
        return Some(pick(name, ResolutionSource::Persisted));
    }

    let follows = match config.follow_system {
        FollowSystem::Off => false,
        FollowSystem::Always | FollowSystem::InitialOnly => true,
    };
    if follows {
        if let Some(mode) = inputs.preference {
            if registry.contains(mode.theme_name()) {
                return Some(pick(mode.theme_name(), ResolutionSource::SystemPreference));
            }
        }
    }

    if let Some(initial) = config.initial_theme.as_deref() {
        if registry.contains(initial) {
            return Some(pick(initial, ResolutionSource::InitialTheme));
        }
    }

    if registry.contains(&config.fallback_theme) {
        return Some(pick(&config.fallback_theme, ResolutionSource::Fallback));
    }

    registry
        .first()
        .map(|theme| pick(&theme.name, ResolutionSource::FirstRegistered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeOptions;
    use crate::storage::StorageMode;
    use crate::theme::{builtin, default_registry, ThemeRegistry};

    fn config(options: ThemeOptions) -> ResolutionConfig {
        ResolutionConfig::from_options(&options)
    }

    fn resolve(
        registry: &ThemeRegistry,
        config: &ResolutionConfig,
        persisted: Option<&str>,
        preference: Option<ColorMode>,
    ) -> Resolution {
        resolve_initial(&ResolutionInputs {
            registry,
            config,
            persisted,
            preference,
        })
        .unwrap()
    }

    #[test]
    fn test_persisted_wins_over_everything() {
        let registry = default_registry();
        let config = config(
            ThemeOptions::new()
                .follow_system_preference(FollowSystem::Always)
                .initial_theme("blue"),
        );
        let resolution = resolve(&registry, &config, Some("dark"), Some(ColorMode::Light));
        assert_eq!(resolution.theme, "dark");
        assert_eq!(resolution.source, ResolutionSource::Persisted);
    }

    #[test]
    fn test_unregistered_persisted_value_is_ignored() {
        let registry = default_registry();
        let config = config(ThemeOptions::new().initial_theme("green"));
        let resolution = resolve(&registry, &config, Some("solarized"), None);
        assert_eq!(resolution.theme, "green");
    }

    #[test]
    fn test_persisted_ignored_when_mode_does_not_persist() {
        let registry = default_registry();
        let config = config(ThemeOptions::new().storage_type(StorageMode::Custom));
        let resolution = resolve(&registry, &config, Some("dark"), None);
        assert_eq!(resolution.source, ResolutionSource::Fallback);
    }

    #[test]
    fn test_preference_only_when_following() {
        let registry = default_registry();
        let off = config(ThemeOptions::new().initial_theme("purple"));
        assert_eq!(
            resolve(&registry, &off, None, Some(ColorMode::Dark)).theme,
            "purple"
        );

        let initial_only =
            config(ThemeOptions::new().follow_system_preference(FollowSystem::InitialOnly));
        let resolution = resolve(&registry, &initial_only, None, Some(ColorMode::Dark));
        assert_eq!(resolution.theme, "dark");
        assert_eq!(resolution.source, ResolutionSource::SystemPreference);
    }

    #[test]
    fn test_preference_skipped_when_its_theme_is_missing() {
        let registry = ThemeRegistry::from_themes([builtin("light").unwrap().clone()]);
        let config = config(ThemeOptions::new().follow_system_preference(FollowSystem::Always));
        let resolution = resolve(&registry, &config, None, Some(ColorMode::Dark));
        assert_eq!(resolution.theme, "light");
        assert_eq!(resolution.source, ResolutionSource::Fallback);
    }

    #[test]
    fn test_first_registered_when_fallback_missing() {
        let registry = ThemeRegistry::from_themes([
            builtin("green").unwrap().clone(),
            builtin("blue").unwrap().clone(),
        ]);
        let config = config(ThemeOptions::new().initial_theme("nope"));
        let resolution = resolve(&registry, &config, None, None);
        assert_eq!(resolution.theme, "green");
        assert_eq!(resolution.source, ResolutionSource::FirstRegistered);
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = ThemeRegistry::new();
        let config = ResolutionConfig::default();
        assert!(resolve_initial(&ResolutionInputs {
            registry: &registry,
            config: &config,
            persisted: None,
            preference: None,
        })
        .is_none());
    }
}
