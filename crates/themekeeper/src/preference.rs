//! OS-level light/dark preference.
//!
//! A [`PreferenceSource`] reports the current [`ColorMode`] and notifies
//! subscribers when it changes. Two implementations ship here:
//!
//! - [`SystemPreference`]: asks the OS through `dark-light`, polling on a
//!   background thread while subscribed
//! - [`ManualPreference`]: the host pushes changes (from a windowing toolkit
//!   event, a test, a settings screen)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use serde::{Deserialize, Serialize};

use crate::subscription::Subscription;

/// The user's preferred color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn from_is_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }

    /// The theme name conventionally bound to this mode (`"light"` / `"dark"`).
    pub fn theme_name(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

/// Callback invoked with the new mode on every preference change.
pub type PreferenceCallback = Arc<dyn Fn(ColorMode) + Send + Sync>;

/// A source of the OS light/dark preference.
pub trait PreferenceSource: Send + Sync {
    /// Reads the current preference.
    fn read(&self) -> ColorMode;

    /// Registers `callback` for changes until the returned subscription is
    /// cancelled or dropped.
    fn subscribe(&self, callback: PreferenceCallback) -> Subscription;
}

/// Returns true when `theme` is the theme name of the current preference.
pub fn is_system_theme(source: &dyn PreferenceSource, theme: &str) -> bool {
    source.read().theme_name() == theme
}

/// Picks `dark` or `light` according to the current preference.
pub fn theme_for_system<'a>(source: &dyn PreferenceSource, light: &'a str, dark: &'a str) -> &'a str {
    match source.read() {
        ColorMode::Light => light,
        ColorMode::Dark => dark,
    }
}

type ThemeDetector = fn() -> ColorMode;

fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        OsThemeMode::Dark => ColorMode::Dark,
        OsThemeMode::Light => ColorMode::Light,
    }
}

/// Default interval between OS checks while subscribed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// OS preference via `dark-light`.
///
/// `dark-light` has no change notification, so each subscription runs a
/// polling thread that reports transitions. The thread exits when its
/// subscription is released.
#[derive(Debug, Clone)]
pub struct SystemPreference {
    detector: ThemeDetector,
    poll_interval: Duration,
}

impl SystemPreference {
    pub fn new() -> Self {
        Self {
            detector: os_theme_detector,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the detector, e.g. to force a mode.
    pub fn with_detector(mut self, detector: ThemeDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for SystemPreference {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceSource for SystemPreference {
    fn read(&self) -> ColorMode {
        (self.detector)()
    }

    fn subscribe(&self, callback: PreferenceCallback) -> Subscription {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let detector = self.detector;
        let interval = self.poll_interval;

        let spawned = thread::Builder::new()
            .name("themekeeper-preference".to_string())
            .spawn(move || {
                let mut last = detector();
                while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                    let current = detector();
                    if current != last {
                        last = current;
                        callback(current);
                    }
                }
            });

        match spawned {
            Ok(_) => Subscription::new(move || {
                let _ = stop_tx.send(());
            }),
            Err(e) => {
                tracing::warn!(error = %e, "could not start preference watcher");
                Subscription::noop()
            }
        }
    }
}

struct ManualInner {
    mode: Mutex<ColorMode>,
    listeners: Mutex<Vec<(u64, PreferenceCallback)>>,
    next_id: AtomicU64,
}

/// A preference source driven by the host.
///
/// Clones share state, so one clone can be handed to a
/// [`ThemeCore`](crate::ThemeCore) while another reports changes.
#[derive(Clone)]
pub struct ManualPreference {
    inner: Arc<ManualInner>,
}

impl ManualPreference {
    pub fn new(initial: ColorMode) -> Self {
        Self {
            inner: Arc::new(ManualInner {
                mode: Mutex::new(initial),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Records a new preference and notifies subscribers if it changed.
    pub fn set(&self, mode: ColorMode) {
        {
            let mut current = lock(&self.inner.mode);
            if *current == mode {
                return;
            }
            *current = mode;
        }
        // Callbacks run without the lock held so they may re-enter.
        let listeners: Vec<PreferenceCallback> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for listener in listeners {
            listener(mode);
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }
}

impl PreferenceSource for ManualPreference {
    fn read(&self) -> ColorMode {
        *lock(&self.inner.mode)
    }

    fn subscribe(&self, callback: PreferenceCallback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, callback));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.listeners).retain(|(existing, _)| *existing != id);
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
