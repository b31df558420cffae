//! Shared core state and the cloneable handle consumers hold.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use serde_json::Value;

use crate::config::{ResolutionConfig, ThemeChangeCallback};
use crate::storage::PersistenceAdapter;
use crate::style::StyleApplier;
use crate::subscription::Subscription;
use crate::theme::{Theme, ThemeRegistry};

/// Listener registered through [`ThemeHandle::subscribe`].
pub type ThemeListener = Arc<dyn Fn(&str, &Theme) + Send + Sync>;

/// The one mutable cell.
pub(crate) struct CoreState {
    pub(crate) current: String,
}

pub(crate) struct CoreInner {
    pub(crate) registry: ThemeRegistry,
    pub(crate) config: ResolutionConfig,
    pub(crate) storage: PersistenceAdapter,
    pub(crate) applier: StyleApplier,
    pub(crate) on_change: Option<ThemeChangeCallback>,
    pub(crate) state: Mutex<CoreState>,
    /// Held for a whole transition, notifications included. Reads only take
    /// `state`.
    change: Mutex<()>,
    /// The thread inside a transition, if any.
    changing_thread: Mutex<Option<ThreadId>>,
    listeners: Mutex<Vec<(u64, ThemeListener)>>,
    next_listener: AtomicU64,
    alive: AtomicBool,
}

impl CoreInner {
    pub(crate) fn new(
        registry: ThemeRegistry,
        config: ResolutionConfig,
        storage: PersistenceAdapter,
        applier: StyleApplier,
        on_change: Option<ThemeChangeCallback>,
        initial: String,
    ) -> Self {
        Self {
            registry,
            config,
            storage,
            applier,
            on_change,
            state: Mutex::new(CoreState { current: initial }),
            change: Mutex::new(()),
            changing_thread: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            alive: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the core dead. Returns false if it already was.
    ///
    /// Waits for a transition running on another thread, so nothing changes
    /// once this returns.
    pub(crate) fn kill(&self) -> bool {
        // A callback destroying its own core already holds the change lock.
        let _change = if self.in_change_callback() {
            None
        } else {
            Some(lock(&self.change))
        };
        let was_alive = self.alive.swap(false, Ordering::SeqCst);
        if was_alive {
            lock(&self.listeners).clear();
        }
        was_alive
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, CoreState> {
        lock(&self.state)
    }

    pub(crate) fn current(&self) -> String {
        self.state().current.clone()
    }

    /// The registered theme for `name`, else the fallback, else the first.
    pub(crate) fn lookup_or_fallback(&self, name: &str) -> Option<&Theme> {
        self.registry
            .get(name)
            .or_else(|| self.registry.get(&self.config.fallback_theme))
            .or_else(|| self.registry.first())
    }

    fn in_change_callback(&self) -> bool {
        *lock(&self.changing_thread) == Some(thread::current().id())
    }

    pub(crate) fn set_theme(&self, requested: &str) -> String {
        if self.in_change_callback() {
            tracing::warn!(theme = %requested, "theme change requested from a change callback, ignoring");
            return self.current();
        }
        let _change = lock(&self.change);
        if !self.is_alive() {
            tracing::warn!(theme = %requested, "theme core has been destroyed, ignoring theme change");
            return self.current();
        }

        if !self.registry.contains(requested) {
            tracing::warn!(
                theme = %requested,
                fallback = %self.config.fallback_theme,
                "theme not found, using fallback"
            );
        }
        let Some(theme) = self.lookup_or_fallback(requested) else {
            return self.current();
        };
        let _scope = ChangeScope::enter(&self.changing_thread);

        {
            let mut state = self.state();
            state.current = theme.name.clone();
            if self.config.storage_mode.persists() {
                self.storage.save(&self.config.storage_key, &theme.name);
            }
            self.applier.apply(theme);
        }
        tracing::debug!(theme = %theme.name, "theme changed");

        if let Some(callback) = &self.on_change {
            callback(&theme.name, theme);
        }
        let listeners: Vec<ThemeListener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&theme.name, theme);
        }

        theme.name.clone()
    }

    /// Applies a schedule or preference pick unless it is already current.
    pub(crate) fn follow(&self, name: &str, origin: &'static str) {
        if !self.is_alive() || !self.registry.contains(name) {
            tracing::trace!(theme = %name, origin, "ignoring theme suggestion");
            return;
        }
        if self.state().current == name {
            return;
        }
        tracing::debug!(theme = %name, origin, "following theme suggestion");
        self.set_theme(name);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks the current thread as inside a transition until dropped.
struct ChangeScope<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
}

impl<'a> ChangeScope<'a> {
    fn enter(owner: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(owner) = Some(thread::current().id());
        Self { owner }
    }
}

impl Drop for ChangeScope<'_> {
    fn drop(&mut self) {
        *lock(self.owner) = None;
    }
}

/// The light/dark opposite used when toggling without a second theme.
fn opposite(current: &str) -> &'static str {
    if current == "light" {
        "dark"
    } else {
        "light"
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn lookup_path(theme: &Theme, path: &str) -> String {
    let Ok(root) = serde_json::to_value(theme) else {
        return String::new();
    };
    let mut value = &root;
    for segment in path.split('.') {
        match value.get(segment) {
            Some(next) => value = next,
            None => return String::new(),
        }
    }
    scalar_to_string(value)
}

/// Cheap, cloneable access to a running [`ThemeCore`](crate::ThemeCore).
///
/// This is what consumers hold. Reads always reflect the core's current
/// state; once the core is destroyed, changes are ignored with a warning.
#[derive(Clone)]
pub struct ThemeHandle {
    pub(crate) inner: Arc<CoreInner>,
}

impl ThemeHandle {
    /// Name of the active theme.
    pub fn theme(&self) -> String {
        self.inner.current()
    }

    /// The active theme. Never absent while the registry is non-empty.
    pub fn theme_object(&self) -> Theme {
        let current = self.inner.current();
        match self.inner.lookup_or_fallback(&current) {
            Some(theme) => theme.clone(),
            None => Theme::new(current, Default::default()),
        }
    }

    /// Switches to `name`, or to the fallback theme if `name` is not
    /// registered. Returns the name actually applied.
    pub fn set_theme(&self, name: &str) -> String {
        self.inner.set_theme(name)
    }

    /// Switches to `theme_a`, or away from it when it is already active.
    ///
    /// Away means `theme_b` when given, otherwise the light/dark opposite of
    /// the current theme.
    pub fn toggle_theme(&self, theme_a: &str, theme_b: Option<&str>) -> String {
        let current = self.inner.current();
        let target = if current == theme_a {
            theme_b.unwrap_or_else(|| opposite(&current))
        } else {
            theme_a
        };
        self.inner.set_theme(target)
    }

    /// Registered theme names, in registry order.
    pub fn available_themes(&self) -> Vec<String> {
        self.inner.registry.names().map(str::to_string).collect()
    }

    pub fn is_theme_available(&self, name: &str) -> bool {
        self.inner.registry.contains(name)
    }

    /// Dotted lookup into the active theme, e.g. `colors.primary` or
    /// `meta.description`. Missing segments and non-scalar values give `""`.
    pub fn get_theme_property(&self, path: &str) -> String {
        lookup_path(&self.theme_object(), path)
    }

    /// Like [`get_theme_property`](Self::get_theme_property), but a bare
    /// color slot name (`"accent"`) is looked up in `colors` first.
    pub fn get_theme_class(&self, name: &str) -> String {
        let theme = self.theme_object();
        if !name.contains('.') {
            if let Some(class) = theme.colors.get(name).filter(|class| !class.is_empty()) {
                return class.to_string();
            }
        }
        lookup_path(&theme, name)
    }

    /// The registry backing this core.
    pub fn registry(&self) -> &ThemeRegistry {
        &self.inner.registry
    }

    /// Runs `listener` after every accepted theme change until the returned
    /// subscription is released.
    pub fn subscribe(&self, listener: impl Fn(&str, &Theme) + Send + Sync + 'static) -> Subscription {
        if !self.inner.is_alive() {
            return Subscription::noop();
        }
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::new(listener)));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.listeners).retain(|(existing, _)| *existing != id);
            }
        })
    }

    /// Removes the persisted theme, if the storage mode persists.
    pub fn forget_persisted_theme(&self) {
        if self.inner.config.storage_mode.persists() {
            self.inner.storage.remove(&self.inner.config.storage_key);
        }
    }

    /// Returns true until the owning core is destroyed.
    pub fn is_active(&self) -> bool {
        self.inner.is_alive()
    }
}

impl fmt::Debug for ThemeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeHandle")
            .field("theme", &self.theme())
            .field("active", &self.is_active())
            .finish()
    }
}
