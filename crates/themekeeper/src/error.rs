//! Error types.
//!
//! Most failures in this crate never reach the caller: malformed themes,
//! unknown theme names and storage faults are logged and resolved by falling
//! back. The types here cover the few cases that do surface.

use std::path::PathBuf;

/// Errors surfaced by the theming layer.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The consumer surface was used where no [`ThemeCore`](crate::ThemeCore)
    /// is reachable. This is a wiring defect, not a runtime condition.
    #[error("no active theming context: use_theme() called outside of ThemeCore::enter()")]
    NoActiveContext,

    /// A schedule boundary was not a valid `HH:MM` time of day.
    #[error("invalid time of day '{value}': expected HH:MM (00:00-23:59)")]
    InvalidTimeOfDay { value: String },

    /// An options document could not be parsed.
    #[error("invalid theme options{}: {message}", source_label(.path))]
    InvalidOptions {
        path: Option<PathBuf>,
        message: String,
    },

    /// A storage backend failed. Only returned by backends themselves; the
    /// persistence adapter swallows it.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn source_label(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

/// Failure of a key-value storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend exists but the operation failed.
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend cannot be used at all (disabled, no location, quota).
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_active_context_display() {
        let msg = ThemeError::NoActiveContext.to_string();
        assert!(msg.contains("no active theming context"));
    }

    #[test]
    fn test_invalid_time_display() {
        let err = ThemeError::InvalidTimeOfDay {
            value: "25:00".to_string(),
        };
        assert!(err.to_string().contains("25:00"));
    }

    #[test]
    fn test_invalid_options_display_with_path() {
        let err = ThemeError::InvalidOptions {
            path: Some(PathBuf::from("/etc/theme.yaml")),
            message: "bad key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/theme.yaml"));
        assert!(msg.contains("bad key"));
    }

    #[test]
    fn test_invalid_options_display_without_path() {
        let err = ThemeError::InvalidOptions {
            path: None,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "invalid theme options: bad key");
    }

    #[test]
    fn test_storage_error_converts() {
        let err: ThemeError = StorageError::Unavailable {
            reason: "disabled".to_string(),
        }
        .into();
        assert!(err.to_string().contains("disabled"));
    }
}
