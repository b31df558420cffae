//! Theme persistence.
//!
//! The [`PersistenceAdapter`] is the only storage entry point the core uses.
//! It selects exactly one backend per [`StorageMode`] and wraps every call so
//! that backend failures are logged and turned into "no data" / no-op results.
//!
//! | Mode | Backend | I/O |
//! |------|---------|-----|
//! | `Durable` | [`FileStorage`] (or an injected backend) | yes |
//! | `Session` | process-scoped [`MemoryStorage`] (or an injected backend) | yes |
//! | `Custom` | none; the host persists via `on_theme_change` | no |
//! | `None` | none | no |

mod backend;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use backend::{session_storage, FileStorage, MemoryStorage, StorageBackend, DATA_DIR_ENV};

/// Default key under which the theme name is stored.
pub const DEFAULT_STORAGE_KEY: &str = "themekeeper-theme";

/// Where the selected theme is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Survives restarts.
    #[default]
    #[serde(alias = "local")]
    Durable,
    /// Lives for the current process.
    Session,
    /// The host application persists; no internal I/O.
    Custom,
    /// Nothing is persisted.
    None,
}

impl StorageMode {
    /// Returns true for the modes that perform internal I/O.
    pub fn persists(self) -> bool {
        matches!(self, StorageMode::Durable | StorageMode::Session)
    }
}

/// Failure-swallowing front end over one storage backend.
#[derive(Clone)]
pub struct PersistenceAdapter {
    mode: StorageMode,
    backend: Option<Arc<dyn StorageBackend>>,
}

impl PersistenceAdapter {
    /// Selects the backend for `mode`.
    ///
    /// `backend` replaces the built-in store for `Durable` and `Session`; it is
    /// ignored for `Custom` and `None`. When the durable location cannot be
    /// determined, persistence is disabled with a warning.
    pub fn new(mode: StorageMode, backend: Option<Arc<dyn StorageBackend>>) -> Self {
        let backend = match mode {
            StorageMode::Custom | StorageMode::None => None,
            _ if backend.is_some() => backend,
            StorageMode::Durable => match FileStorage::default_location() {
                Ok(files) => Some(Arc::new(files) as Arc<dyn StorageBackend>),
                Err(e) => {
                    tracing::warn!(error = %e, "durable theme storage unavailable, persistence disabled");
                    None
                }
            },
            StorageMode::Session => Some(session_storage() as Arc<dyn StorageBackend>),
        };
        Self { mode, backend }
    }

    /// An adapter that never stores anything.
    pub fn disabled() -> Self {
        Self {
            mode: StorageMode::None,
            backend: None,
        }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Returns true when reads and writes reach a backend.
    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    /// Reads `key`. Failures are logged and read as absent.
    pub fn load(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "error reading theme from storage");
                None
            }
        }
    }

    /// Writes `value` under `key`. Failures are logged and ignored.
    pub fn save(&self, key: &str, value: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.set(key, value) {
            tracing::warn!(key, error = %e, "error writing theme to storage");
        }
    }

    /// Removes `key`. Failures are logged and ignored.
    pub fn remove(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.remove(key) {
            tracing::warn!(key, error = %e, "error removing theme from storage");
        }
    }
}

impl fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("mode", &self.mode)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::test_support::capture_warnings;

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable {
                reason: "quota exceeded".to_string(),
            })
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable {
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable {
                reason: "quota exceeded".to_string(),
            })
        }
    }

    #[test]
    fn test_failures_are_swallowed_and_logged() {
        let adapter = PersistenceAdapter::new(StorageMode::Durable, Some(Arc::new(BrokenStorage)));

        let (loaded, warnings) = capture_warnings(|| {
            adapter.save("k", "dark");
            adapter.remove("k");
            adapter.load("k")
        });

        assert_eq!(loaded, None);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.contains("quota exceeded")));
    }

    #[test]
    fn test_injected_backend_used_for_durable() {
        let memory = Arc::new(MemoryStorage::new());
        let adapter = PersistenceAdapter::new(StorageMode::Durable, Some(memory.clone()));
        adapter.save("k", "green");
        assert_eq!(memory.peek("k").as_deref(), Some("green"));
        assert_eq!(adapter.load("k").as_deref(), Some("green"));
        adapter.remove("k");
        assert_eq!(memory.peek("k"), None);
    }

    #[test]
    fn test_custom_mode_performs_no_io() {
        let memory = Arc::new(MemoryStorage::new());
        memory.set("k", "blue").unwrap();
        let adapter = PersistenceAdapter::new(StorageMode::Custom, Some(memory.clone()));

        assert!(!adapter.is_active());
        assert_eq!(adapter.load("k"), None);
        adapter.save("k", "dark");
        assert_eq!(memory.peek("k").as_deref(), Some("blue"));
    }

    #[test]
    fn test_none_mode_is_noop() {
        let adapter = PersistenceAdapter::new(StorageMode::None, None);
        adapter.save("k", "dark");
        assert_eq!(adapter.load("k"), None);
        assert_eq!(adapter.mode(), StorageMode::None);
    }

    #[test]
    fn test_session_mode_uses_process_store() {
        let adapter = PersistenceAdapter::new(StorageMode::Session, None);
        adapter.save("adapter-session-test", "purple");
        assert_eq!(
            session_storage().peek("adapter-session-test").as_deref(),
            Some("purple")
        );
        adapter.remove("adapter-session-test");
    }

    #[test]
    fn test_storage_mode_serde_names() {
        let mode: StorageMode = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(mode, StorageMode::Durable);
        let mode: StorageMode = serde_json::from_str("\"session\"").unwrap();
        assert_eq!(mode, StorageMode::Session);
        assert_eq!(serde_json::to_string(&StorageMode::None).unwrap(), "\"none\"");
        assert!(StorageMode::Durable.persists());
        assert!(!StorageMode::Custom.persists());
    }
}
