//! # Themekeeper
//!
//! Named themes for component UIs: one current theme, resolved from competing
//! sources, persisted, and pushed to document-level style state.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use themekeeper::{
//!     use_theme, ColorMode, Document, FollowSystem, ManualPreference, StorageMode,
//!     ThemeCore, ThemeOptions,
//! };
//!
//! let preference = ManualPreference::new(ColorMode::Light);
//! let document = Arc::new(Document::new());
//!
//! let core = ThemeCore::builder(
//!     ThemeOptions::new()
//!         .storage_type(StorageMode::Session)
//!         .follow_system_preference(FollowSystem::Always),
//! )
//! .preference(preference.clone())
//! .style_target(document.clone())
//! .build();
//!
//! let _guard = core.enter();
//! assert_eq!(use_theme().theme(), "light");
//!
//! // The OS switched to dark mode.
//! preference.set(ColorMode::Dark);
//! assert_eq!(use_theme().theme(), "dark");
//! assert_eq!(document.property("--theme-primary").as_deref(), Some("black"));
//! assert!(document.has_class("dark"));
//! ```
//!
//! ## Resolution
//!
//! The starting theme is the first of:
//!
//! 1. The persisted choice, if it names a registered theme
//! 2. The OS preference, when [`FollowSystem`] allows it
//! 3. [`ThemeOptions::initial_theme`]
//! 4. The fallback theme (`"light"`), else the first registered theme
//!
//! After that, user calls, OS preference changes and the time-of-day schedule
//! all go through [`ThemeHandle::set_theme`], so storage, the document and
//! `on_theme_change` never disagree with the current theme.
//!
//! ## Capabilities
//!
//! Everything platform-specific sits behind a trait and can be replaced:
//!
//! | Trait | Default | Test double |
//! |-------|---------|-------------|
//! | [`StorageBackend`] | [`FileStorage`] / [`MemoryStorage`] | [`MemoryStorage`] |
//! | [`PreferenceSource`] | [`SystemPreference`] (`dark-light`) | [`ManualPreference`] |
//! | [`StyleTarget`] | [`Document`] | [`Document`] |
//! | [`Clock`] | [`SystemClock`] | [`FixedClock`] |
//! | [`Ticker`] | [`ThreadTicker`] | [`ManualTicker`] |
//!
//! ## Diagnostics
//!
//! Malformed themes, unknown theme names and storage failures never surface
//! as errors. They are logged through `tracing` at WARN and resolved by
//! falling back. Install a subscriber to see them.

pub mod config;
pub mod context;
pub mod controls;
pub mod core;
pub mod error;
pub mod preference;
pub mod safelist;
pub mod schedule;
pub mod storage;
pub mod style;
pub mod subscription;
pub mod theme;

#[cfg(test)]
mod test_support;

pub use config::{
    FollowSystem, ResolutionConfig, ThemeChangeCallback, ThemeOptions, DEFAULT_FALLBACK_THEME,
    DEFAULT_TRANSITION_MS,
};
pub use context::{try_use_theme, use_theme, ContextGuard};
pub use controls::{
    PreviewType, SelectorOption, SelectorVariant, Size, Swatch, ThemeIndicator, ThemeSelector,
    ThemeToggle, ToggleLabel, ToggleState,
};
pub use crate::core::{
    prepaint, resolve_initial, Resolution, ResolutionInputs, ResolutionSource, ThemeCore,
    ThemeCoreBuilder, ThemeHandle, ThemeListener, SCHEDULE_INTERVAL,
};
pub use error::{StorageError, ThemeError};
pub use preference::{
    is_system_theme, theme_for_system, ColorMode, ManualPreference, PreferenceCallback,
    PreferenceSource, SystemPreference,
};
pub use safelist::{extract_theme_classes, generate_safelist};
pub use schedule::{
    Clock, FixedClock, ManualTicker, Schedule, ScheduleEntry, ScheduleSlot, SystemClock,
    ThreadTicker, Ticker, TimeOfDay,
};
pub use storage::{
    FileStorage, MemoryStorage, PersistenceAdapter, StorageBackend, StorageMode,
    DEFAULT_STORAGE_KEY,
};
pub use style::{css_root_block, theme_to_css_vars, Document, StyleApplier, StyleTarget};
pub use subscription::Subscription;
pub use theme::{
    builtin, default_registry, merge_with_defaults, normalize_themes, Theme, ThemeColors,
    ThemeInput, ThemeRegistry,
};
