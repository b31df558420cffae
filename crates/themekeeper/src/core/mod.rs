//! The resolution and synchronization core.
//!
//! A [`ThemeCore`] owns the single "current theme" cell and everything that
//! may change it. Every trigger funnels through one `set_theme` path:
//!
//! ```text
//! user call ─────────┐
//! toggle ────────────┤
//! OS preference ─────┼──► set_theme ──► state ──► persistence ──► document
//! schedule tick ─────┘                      └──► on_theme_change, listeners
//! ```
//!
//! # Lifecycle
//!
//! Building a core resolves the initial theme ([`resolve_initial`]), applies
//! it to the style target and, depending on configuration, starts the
//! preference listener and the schedule timer. [`ThemeCore::destroy`] (or
//! dropping the core) releases both exactly once. After that, stray callbacks
//! from either source change nothing.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use themekeeper::{
//!     ColorMode, Document, ManualPreference, StorageMode, ThemeCore, ThemeOptions,
//! };
//!
//! let document = Arc::new(Document::new());
//! let core = ThemeCore::builder(ThemeOptions::new().storage_type(StorageMode::None))
//!     .preference(ManualPreference::new(ColorMode::Light))
//!     .style_target(document.clone())
//!     .build();
//!
//! assert_eq!(core.theme(), "light");
//! core.toggle_theme("light", None);
//! assert_eq!(core.theme(), "dark");
//! assert_eq!(document.attribute("data-theme").as_deref(), Some("dark"));
//! ```

mod handle;
mod resolve;

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use handle::{ThemeHandle, ThemeListener};
pub use resolve::{resolve_initial, Resolution, ResolutionInputs, ResolutionSource};

use handle::CoreInner;

use crate::config::{FollowSystem, ResolutionConfig, ThemeOptions};
use crate::context::ContextGuard;
use crate::preference::{ColorMode, PreferenceSource, SystemPreference};
use crate::schedule::{Clock, SystemClock, ThreadTicker, Ticker};
use crate::storage::PersistenceAdapter;
use crate::style::{self, Document, StyleApplier, StyleTarget};
use crate::subscription::Subscription;
use crate::theme::{default_registry, Theme, ThemeRegistry};

/// Cadence of schedule checks.
pub const SCHEDULE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct Resources {
    preference: Option<Subscription>,
    schedule: Option<Subscription>,
}

/// Builds a [`ThemeCore`] with injected capabilities.
///
/// Anything not supplied gets the production default: the OS preference,
/// the local clock, a background-thread ticker and an in-memory
/// [`Document`].
pub struct ThemeCoreBuilder {
    options: ThemeOptions,
    registry: Option<ThemeRegistry>,
    preference: Option<Arc<dyn PreferenceSource>>,
    target: Option<Arc<dyn StyleTarget>>,
    clock: Option<Arc<dyn Clock>>,
    ticker: Option<Arc<dyn Ticker>>,
}

impl ThemeCoreBuilder {
    /// Uses `registry` instead of merging `options.themes` over the built-ins.
    pub fn registry(mut self, registry: ThemeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn preference(mut self, source: impl PreferenceSource + 'static) -> Self {
        self.preference = Some(Arc::new(source));
        self
    }

    pub fn style_target(mut self, target: Arc<dyn StyleTarget>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn ticker(mut self, ticker: impl Ticker + 'static) -> Self {
        self.ticker = Some(Arc::new(ticker));
        self
    }

    pub fn build(self) -> ThemeCore {
        let registry = match self.registry {
            Some(registry) if !registry.is_empty() => registry,
            Some(_) => {
                tracing::warn!("no valid themes provided, using default themes");
                default_registry()
            }
            None => self.options.registry(),
        };
        let config = ResolutionConfig::from_options(&self.options);
        let storage =
            PersistenceAdapter::new(config.storage_mode, self.options.storage_backend.clone());
        let preference = self
            .preference
            .unwrap_or_else(|| Arc::new(SystemPreference::new()));
        let target = self
            .target
            .unwrap_or_else(|| Arc::new(Document::new()) as Arc<dyn StyleTarget>);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ticker = self.ticker.unwrap_or_else(|| Arc::new(ThreadTicker));

        let persisted = load_persisted(&storage, &config);
        let inputs = ResolutionInputs {
            registry: &registry,
            config: &config,
            persisted: persisted.as_deref(),
            preference: read_preference(preference.as_ref(), &config),
        };
        let found_persisted = inputs.registered_persisted().is_some();
        let initial = match resolve_initial(&inputs) {
            Some(resolution) => {
                tracing::debug!(
                    theme = %resolution.theme,
                    source = ?resolution.source,
                    "resolved initial theme"
                );
                resolution.theme
            }
            None => config.fallback_theme.clone(),
        };

        let applier = StyleApplier::new(target);
        applier.setup_transition(config.transition_duration_ms);
        if let Some(theme) = registry.get(&initial) {
            applier.apply(theme);
        }

        let inner = Arc::new(CoreInner::new(
            registry,
            config,
            storage,
            applier,
            self.options.on_theme_change.clone(),
            initial,
        ));

        let mut resources = Resources::default();
        if inner.config.listens_to_preference(found_persisted) {
            let weak = Arc::downgrade(&inner);
            resources.preference = Some(preference.subscribe(Arc::new(move |mode: ColorMode| {
                if let Some(inner) = weak.upgrade() {
                    inner.follow(mode.theme_name(), "system preference");
                }
            })));
        }
        if !inner.config.schedule.is_empty() {
            check_schedule(&inner, clock.as_ref());
            let weak = Arc::downgrade(&inner);
            resources.schedule = Some(ticker.start(
                SCHEDULE_INTERVAL,
                Arc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        check_schedule(&inner, clock.as_ref());
                    }
                }),
            ));
        }

        ThemeCore {
            handle: ThemeHandle { inner },
            resources: Mutex::new(resources),
        }
    }
}

fn load_persisted(storage: &PersistenceAdapter, config: &ResolutionConfig) -> Option<String> {
    if config.storage_mode.persists() {
        storage.load(&config.storage_key)
    } else {
        None
    }
}

fn read_preference(source: &dyn PreferenceSource, config: &ResolutionConfig) -> Option<ColorMode> {
    match config.follow_system {
        FollowSystem::Off => None,
        FollowSystem::Always | FollowSystem::InitialOnly => Some(source.read()),
    }
}

fn check_schedule(inner: &CoreInner, clock: &dyn Clock) {
    let now = clock.now();
    let scheduled = inner
        .config
        .schedule
        .matching(now)
        .find(|name| inner.registry.contains(name));
    tracing::trace!(now = %now, theme = ?scheduled, "schedule check");
    if let Some(name) = scheduled {
        inner.follow(name, "schedule");
    }
}

/// Best-guess application of the theme a core built from `options` would
/// start with, for hosts that paint before the core exists.
///
/// Installs the preload stylesheet only if none is present and returns the
/// predicted theme name. The core's first application removes it.
pub fn prepaint(
    options: &ThemeOptions,
    target: &dyn StyleTarget,
    preference: &dyn PreferenceSource,
) -> Option<String> {
    let registry = options.registry();
    let config = ResolutionConfig::from_options(options);
    let storage = PersistenceAdapter::new(config.storage_mode, options.storage_backend.clone());
    let persisted = load_persisted(&storage, &config);
    let resolution = resolve_initial(&ResolutionInputs {
        registry: &registry,
        config: &config,
        persisted: persisted.as_deref(),
        preference: read_preference(preference, &config),
    })?;
    let theme = registry.get(&resolution.theme)?;
    style::prepaint(target, theme);
    Some(resolution.theme)
}

/// A running theming instance.
///
/// See the [module documentation](self) for the lifecycle.
pub struct ThemeCore {
    handle: ThemeHandle,
    resources: Mutex<Resources>,
}

impl ThemeCore {
    /// Builds a core with production capabilities.
    pub fn new(options: ThemeOptions) -> Self {
        Self::builder(options).build()
    }

    pub fn builder(options: ThemeOptions) -> ThemeCoreBuilder {
        ThemeCoreBuilder {
            options,
            registry: None,
            preference: None,
            target: None,
            clock: None,
            ticker: None,
        }
    }

    /// A cloneable handle for consumers.
    pub fn handle(&self) -> ThemeHandle {
        self.handle.clone()
    }

    /// Makes this core the nearest enclosing instance on the current thread
    /// until the guard is dropped. See [`use_theme`](crate::use_theme).
    pub fn enter(&self) -> ContextGuard {
        ContextGuard::enter(self.handle())
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.handle.inner.config
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.handle.inner.registry
    }

    pub fn theme(&self) -> String {
        self.handle.theme()
    }

    pub fn theme_object(&self) -> Theme {
        self.handle.theme_object()
    }

    pub fn set_theme(&self, name: &str) -> String {
        self.handle.set_theme(name)
    }

    pub fn toggle_theme(&self, theme_a: &str, theme_b: Option<&str>) -> String {
        self.handle.toggle_theme(theme_a, theme_b)
    }

    pub fn available_themes(&self) -> Vec<String> {
        self.handle.available_themes()
    }

    pub fn is_theme_available(&self, name: &str) -> bool {
        self.handle.is_theme_available(name)
    }

    pub fn get_theme_property(&self, path: &str) -> String {
        self.handle.get_theme_property(path)
    }

    pub fn get_theme_class(&self, name: &str) -> String {
        self.handle.get_theme_class(name)
    }

    pub fn subscribe(&self, listener: impl Fn(&str, &Theme) + Send + Sync + 'static) -> Subscription {
        self.handle.subscribe(listener)
    }

    pub fn forget_persisted_theme(&self) {
        self.handle.forget_persisted_theme()
    }

    /// Returns true until [`destroy`](Self::destroy) runs.
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Stops the preference listener and the schedule timer and detaches
    /// all listeners. Idempotent; also runs on drop.
    pub fn destroy(&self) {
        if !self.handle.inner.kill() {
            return;
        }
        let mut resources = self
            .resources
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(subscription) = resources.preference.take() {
            subscription.cancel();
        }
        if let Some(subscription) = resources.schedule.take() {
            subscription.cancel();
        }
        tracing::debug!("theme core destroyed");
    }
}

impl Drop for ThemeCore {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for ThemeCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeCore")
            .field("theme", &self.theme())
            .field("themes", &self.registry().len())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{FixedClock, ManualTicker, TimeOfDay};
    use crate::storage::{MemoryStorage, StorageBackend, StorageMode};
    use crate::test_support::capture_warnings;
    use crate::preference::ManualPreference;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;

    struct Fixture {
        storage: Arc<MemoryStorage>,
        preference: ManualPreference,
        document: Arc<Document>,
        clock: FixedClock,
        ticker: ManualTicker,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                storage: Arc::new(MemoryStorage::new()),
                preference: ManualPreference::new(ColorMode::Light),
                document: Arc::new(Document::new()),
                clock: FixedClock::new(TimeOfDay::new(12, 0).unwrap()),
                ticker: ManualTicker::new(),
            }
        }

        fn build(&self, options: ThemeOptions) -> ThemeCore {
            ThemeCore::builder(options.storage_backend(self.storage.clone()))
                .preference(self.preference.clone())
                .style_target(self.document.clone())
                .clock(self.clock.clone())
                .ticker(self.ticker.clone())
                .build()
        }
    }

    #[test]
    fn test_set_theme_persists_and_applies() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new());
        for name in core.available_themes() {
            assert_eq!(core.set_theme(&name), name);
            assert_eq!(core.theme(), name);
            assert_eq!(fx.storage.peek("themekeeper-theme").as_deref(), Some(name.as_str()));
            assert_eq!(fx.document.attribute("data-theme").as_deref(), Some(name.as_str()));
        }
    }

    #[test]
    fn test_unknown_theme_falls_back_with_warning() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new().initial_theme("blue"));
        let (applied, warnings) = capture_warnings(|| core.set_theme("neon"));
        assert_eq!(applied, "light");
        assert_eq!(core.theme(), "light");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("theme=neon"));
    }

    #[test]
    fn test_toggle_light_dark() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new());
        assert_eq!(core.toggle_theme("light", None), "dark");
        assert_eq!(core.toggle_theme("light", None), "light");
    }

    #[test]
    fn test_toggle_between_two_themes() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new());
        assert_eq!(core.toggle_theme("blue", Some("purple")), "blue");
        assert_eq!(core.toggle_theme("blue", Some("purple")), "purple");
        assert_eq!(core.toggle_theme("blue", Some("purple")), "blue");
    }

    #[test]
    fn test_initial_resolution_neither_persists_nor_notifies() {
        let fx = Fixture::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let core = fx.build(
            ThemeOptions::new()
                .initial_theme("green")
                .on_theme_change(move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
        );
        assert_eq!(core.theme(), "green");
        assert_eq!(fx.storage.peek("themekeeper-theme"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        core.set_theme("dark");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_custom_storage_notifies_without_io() {
        let fx = Fixture::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let core = fx.build(
            ThemeOptions::new()
                .storage_type(StorageMode::Custom)
                .on_theme_change(move |name, theme| {
                    assert_eq!(name, theme.name);
                    log.lock().unwrap().push(name.to_string());
                }),
        );
        core.set_theme("purple");
        assert_eq!(*seen.lock().unwrap(), vec!["purple".to_string()]);
        assert_eq!(fx.storage.peek("themekeeper-theme"), None);
    }

    #[test]
    fn test_preference_listener_follows_changes() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new().follow_system_preference(FollowSystem::Always));
        assert_eq!(core.theme(), "light");

        fx.preference.set(ColorMode::Dark);
        assert_eq!(core.theme(), "dark");
        assert_eq!(fx.storage.peek("themekeeper-theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_initial_only_listener_skipped_when_persisted() {
        let fx = Fixture::new();
        fx.storage.set("themekeeper-theme", "blue").unwrap();
        let core =
            fx.build(ThemeOptions::new().follow_system_preference(FollowSystem::InitialOnly));
        assert_eq!(core.theme(), "blue");
        assert_eq!(fx.preference.listener_count(), 0);

        fx.preference.set(ColorMode::Dark);
        assert_eq!(core.theme(), "blue");
    }

    #[test]
    fn test_preference_ignored_for_unregistered_theme() {
        let fx = Fixture::new();
        let registry = ThemeRegistry::from_themes([
            crate::theme::builtin("light").unwrap().clone(),
            crate::theme::builtin("blue").unwrap().clone(),
        ]);
        let core = ThemeCore::builder(
            ThemeOptions::new()
                .storage_type(StorageMode::None)
                .follow_system_preference(FollowSystem::Always),
        )
        .registry(registry)
        .preference(fx.preference.clone())
        .style_target(fx.document.clone())
        .ticker(fx.ticker.clone())
        .build();

        fx.preference.set(ColorMode::Dark);
        assert_eq!(core.theme(), "light");
    }

    #[test]
    fn test_schedule_checks_immediately_and_every_minute() {
        let fx = Fixture::new();
        fx.clock.set(TimeOfDay::new(23, 0).unwrap());
        let core = fx.build(
            ThemeOptions::new()
                .schedule("dark", "18:00", "06:00")
                .schedule("light", "06:00", "18:00"),
        );
        assert_eq!(core.theme(), "dark");
        assert_eq!(fx.ticker.periods(), vec![SCHEDULE_INTERVAL]);

        fx.clock.set(TimeOfDay::new(6, 0).unwrap());
        fx.ticker.tick();
        assert_eq!(core.theme(), "light");

        fx.clock.set(TimeOfDay::new(12, 0).unwrap());
        fx.ticker.tick();
        assert_eq!(core.theme(), "light");
    }

    #[test]
    fn test_schedule_skips_unregistered_match() {
        let fx = Fixture::new();
        let core = fx.build(
            ThemeOptions::new()
                .schedule("sunset", "00:00", "00:00")
                .schedule("purple", "11:00", "13:00"),
        );
        assert_eq!(core.theme(), "purple");
    }

    #[test]
    fn test_schedule_does_not_renotify_current_theme() {
        let fx = Fixture::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let core = fx.build(
            ThemeOptions::new()
                .schedule("blue", "00:00", "00:00")
                .on_theme_change(move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
        );
        fx.ticker.tick();
        fx.ticker.tick();
        assert_eq!(core.theme(), "blue");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_destroy_releases_sources_once() {
        let fx = Fixture::new();
        let core = fx.build(
            ThemeOptions::new()
                .follow_system_preference(FollowSystem::Always)
                .schedule("dark", "18:00", "06:00"),
        );
        assert_eq!(fx.preference.listener_count(), 1);
        assert_eq!(fx.ticker.active(), 1);

        core.destroy();
        core.destroy();
        assert!(!core.is_active());
        assert_eq!(fx.preference.listener_count(), 0);
        assert_eq!(fx.ticker.active(), 0);
    }

    #[test]
    fn test_drop_tears_down() {
        let fx = Fixture::new();
        {
            let _core = fx.build(ThemeOptions::new().follow_system_preference(FollowSystem::Always));
            assert_eq!(fx.preference.listener_count(), 1);
        }
        assert_eq!(fx.preference.listener_count(), 0);
    }

    /// An `on_theme_change` that records every name and lingers on "blue",
    /// reporting when it starts lingering.
    fn lingering_on_blue(
        log: Arc<Mutex<Vec<String>>>,
    ) -> (impl Fn(&str, &Theme) + Send + Sync + 'static, mpsc::Receiver<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let entered_tx = Mutex::new(entered_tx);
        let callback = move |name: &str, _: &Theme| {
            if name == "blue" {
                let _ = entered_tx.lock().unwrap().send(());
                thread::sleep(Duration::from_millis(100));
            }
            log.lock().unwrap().push(name.to_string());
        };
        (callback, entered_rx)
    }

    #[test]
    fn test_concurrent_changes_notify_in_state_order() {
        let fx = Fixture::new();
        let notified = Arc::new(Mutex::new(Vec::new()));
        let (callback, entered) = lingering_on_blue(Arc::clone(&notified));
        let core = fx.build(
            ThemeOptions::new()
                .storage_type(StorageMode::Custom)
                .on_theme_change(callback),
        );

        let slow = core.handle();
        let first = thread::spawn(move || slow.set_theme("blue"));
        entered.recv().unwrap();
        core.set_theme("dark");
        first.join().unwrap();

        assert_eq!(core.theme(), "dark");
        assert_eq!(*notified.lock().unwrap(), vec!["blue", "dark"]);
        assert_eq!(fx.document.attribute("data-theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_destroy_waits_for_change_in_flight() {
        let fx = Fixture::new();
        let notified = Arc::new(Mutex::new(Vec::new()));
        let (callback, entered) = lingering_on_blue(Arc::clone(&notified));
        let core = fx.build(ThemeOptions::new().on_theme_change(callback));

        let slow = core.handle();
        let first = thread::spawn(move || slow.set_theme("blue"));
        entered.recv().unwrap();
        core.destroy();
        let at_destroy = notified.lock().unwrap().len();
        first.join().unwrap();

        assert_eq!(at_destroy, 1);
        assert_eq!(notified.lock().unwrap().len(), at_destroy);
        assert_eq!(core.set_theme("dark"), "blue");
        assert_eq!(fx.storage.peek("themekeeper-theme").as_deref(), Some("blue"));
    }

    #[test]
    fn test_change_from_listener_is_ignored() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new());
        let handle = core.handle();
        let _subscription = core.subscribe(move |name, _| {
            if name == "blue" {
                handle.set_theme("green");
            }
        });

        let (applied, warnings) = capture_warnings(|| core.set_theme("blue"));
        assert_eq!(applied, "blue");
        assert_eq!(core.theme(), "blue");
        assert!(warnings.iter().any(|w| w.contains("from a change callback")));

        assert_eq!(core.set_theme("purple"), "purple");
    }

    #[test]
    fn test_derived_accessors() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new().initial_theme("dark"));
        assert_eq!(core.theme_object().name, "dark");
        assert!(core.is_theme_available("purple"));
        assert!(!core.is_theme_available("neon"));
        assert_eq!(core.get_theme_property("colors.primary"), "bg-black");
        assert_eq!(core.get_theme_property("colors.nope"), "");
        assert_eq!(core.get_theme_property("colors"), "");
        assert_eq!(core.get_theme_property("name"), "dark");
        assert_eq!(core.get_theme_class("accent"), "bg-neutral-900");
        assert_eq!(core.get_theme_class("meta.description"), "Dark theme");
        assert_eq!(core.get_theme_class("missing"), "");
    }

    #[test]
    fn test_forget_persisted_theme() {
        let fx = Fixture::new();
        let core = fx.build(ThemeOptions::new());
        core.set_theme("dark");
        core.forget_persisted_theme();
        assert_eq!(fx.storage.peek("themekeeper-theme"), None);
        assert_eq!(core.theme(), "dark");
    }

    #[test]
    fn test_prepaint_predicts_and_core_supersedes() {
        let fx = Fixture::new();
        fx.storage.set("themekeeper-theme", "purple").unwrap();
        let options = ThemeOptions::new().storage_backend(fx.storage.clone());

        let predicted = prepaint(&options, fx.document.as_ref(), &fx.preference);
        assert_eq!(predicted.as_deref(), Some("purple"));
        assert!(fx.document.has_stylesheet(style::PRELOAD_STYLESHEET_ID));

        let core = fx.build(options);
        assert_eq!(core.theme(), "purple");
        assert!(!fx.document.has_stylesheet(style::PRELOAD_STYLESHEET_ID));
    }

    #[test]
    fn test_transition_configured_from_options() {
        let fx = Fixture::new();
        let _core = fx.build(ThemeOptions::new().transition_duration_ms(120));
        assert_eq!(
            fx.document.property(style::TRANSITION_DURATION_PROPERTY).as_deref(),
            Some("120ms")
        );

        let fx = Fixture::new();
        let _core = fx.build(ThemeOptions::new().transition_duration_ms(0));
        assert!(!fx.document.has_class(style::TRANSITION_CLASS));
    }
}
