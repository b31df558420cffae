//! Recurring timers driving schedule checks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::subscription::Subscription;

/// Callback run on every tick.
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Starts recurring callbacks.
pub trait Ticker: Send + Sync {
    /// Runs `tick` every `period` until the returned subscription is released.
    /// The first tick happens one period after the call.
    fn start(&self, period: Duration, tick: TickCallback) -> Subscription;
}

/// A ticker backed by one background thread per registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTicker;

impl Ticker for ThreadTicker {
    fn start(&self, period: Duration, tick: TickCallback) -> Subscription {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let spawned = thread::Builder::new()
            .name("themekeeper-schedule".to_string())
            .spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(period) {
                    tick();
                }
            });

        match spawned {
            Ok(_) => Subscription::new(move || {
                let _ = stop_tx.send(());
            }),
            Err(e) => {
                tracing::warn!(error = %e, "could not start schedule timer");
                Subscription::noop()
            }
        }
    }
}

#[derive(Default)]
struct ManualTickerInner {
    callbacks: Mutex<Vec<(u64, Duration, TickCallback)>>,
    next_id: AtomicU64,
}

/// A ticker advanced by hand. Clones share registrations.
#[derive(Clone, Default)]
pub struct ManualTicker {
    inner: Arc<ManualTickerInner>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every live registration once.
    pub fn tick(&self) {
        let callbacks: Vec<TickCallback> = lock(&self.inner.callbacks)
            .iter()
            .map(|(_, _, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Number of live registrations.
    pub fn active(&self) -> usize {
        lock(&self.inner.callbacks).len()
    }

    /// Periods of the live registrations, in registration order.
    pub fn periods(&self) -> Vec<Duration> {
        lock(&self.inner.callbacks)
            .iter()
            .map(|(_, period, _)| *period)
            .collect()
    }
}

impl Ticker for ManualTicker {
    fn start(&self, period: Duration, tick: TickCallback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.callbacks).push((id, period, tick));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.callbacks).retain(|(existing, _, _)| *existing != id);
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_manual_ticker_fires_until_released() {
        let ticker = ManualTicker::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = ticker.start(
            Duration::from_secs(60),
            Arc::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        ticker.tick();
        ticker.tick();
        assert_eq!(ticker.periods(), vec![Duration::from_secs(60)]);
        sub.cancel();
        ticker.tick();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(ticker.active(), 0);
    }

    #[test]
    fn test_thread_ticker_ticks_and_stops() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = ThreadTicker.start(
            Duration::from_millis(5),
            Arc::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while count.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        sub.cancel();
        assert!(count.load(Ordering::SeqCst) > 0);
    }
}
