//! The consumer surface: reaching the nearest enclosing core.
//!
//! Consumers call [`use_theme`] to get a [`ThemeHandle`] without threading
//! one through every function. A core becomes reachable on the current thread
//! for as long as the [`ContextGuard`] returned by
//! [`ThemeCore::enter`](crate::ThemeCore::enter) is alive. Guards nest; the
//! innermost live core wins, so independent cores can coexist in one process.
//!
//! ```rust
//! use themekeeper::{try_use_theme, use_theme, StorageMode, ThemeCore, ThemeOptions};
//!
//! let core = ThemeCore::new(ThemeOptions::new().storage_type(StorageMode::None));
//! assert!(try_use_theme().is_err());
//!
//! let _guard = core.enter();
//! assert_eq!(use_theme().theme(), "light");
//! ```

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

use crate::core::ThemeHandle;
use crate::error::ThemeError;

thread_local! {
    static STACK: RefCell<Vec<(u64, ThemeHandle)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ENTRY: Cell<u64> = const { Cell::new(0) };
}

/// Keeps a core reachable through [`use_theme`] on this thread.
///
/// Guards may be dropped in any order; each removes only its own entry.
#[must_use = "the core is only reachable while the guard is alive"]
pub struct ContextGuard {
    entry: u64,
    // The stack is per-thread; the guard must be dropped where it was made.
    _not_send: PhantomData<*const ()>,
}

impl ContextGuard {
    pub(crate) fn enter(handle: ThemeHandle) -> Self {
        let entry = NEXT_ENTRY.with(|next| {
            let entry = next.get();
            next.set(entry + 1);
            entry
        });
        STACK.with(|stack| stack.borrow_mut().push((entry, handle)));
        Self {
            entry,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let _ = STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().position(|(entry, _)| *entry == self.entry) {
                stack.remove(position);
            }
        });
    }
}

/// The nearest enclosing live core, or an error when there is none.
pub fn try_use_theme() -> Result<ThemeHandle, ThemeError> {
    STACK
        .with(|stack| {
            stack
                .borrow()
                .iter()
                .rev()
                .map(|(_, handle)| handle)
                .find(|handle| handle.is_active())
                .cloned()
        })
        .ok_or(ThemeError::NoActiveContext)
}

/// The nearest enclosing live core.
///
/// # Panics
///
/// Panics with "no active theming context" when called outside every
/// [`ThemeCore::enter`](crate::ThemeCore::enter) scope. That is a wiring
/// mistake; use [`try_use_theme`] to probe instead.
pub fn use_theme() -> ThemeHandle {
    match try_use_theme() {
        Ok(handle) => handle,
        Err(e) => panic!("{}", e),
    }
}
