//! Propagating the active theme to document-level style state.
//!
//! This module provides:
//!
//! - [`StyleTarget`]: The document abstraction the core writes to
//! - [`Document`]: An in-memory target
//! - [`StyleApplier`]: Clears the previous theme and applies the next one
//! - [`prepaint`]: Best-guess application before the core has resolved
//!
//! # What Gets Applied
//!
//! For a theme named `dark`:
//!
//! | Target | Value |
//! |--------|-------|
//! | `--theme-<slot>` | each color slot, category prefix stripped (`bg-black` → `black`) |
//! | `cssVars` entries | verbatim |
//! | `data-theme` attribute | `dark` |
//! | `dark` class | present iff the theme name is `dark` |

mod document;
mod templates;

use std::sync::{Arc, Mutex};

pub use document::{Document, StyleTarget};

use crate::theme::Theme;

/// Prefix of every per-slot custom property.
pub const THEME_PROPERTY_PREFIX: &str = "--theme-";
/// Attribute holding the active theme name.
pub const THEME_ATTRIBUTE: &str = "data-theme";
/// Class present while the `dark` theme is active.
pub const DARK_CLASS: &str = "dark";
/// Id of the stylesheet installed by [`prepaint`].
pub const PRELOAD_STYLESHEET_ID: &str = "theme-preload-style";
/// Id of the transition stylesheet.
pub const TRANSITION_STYLESHEET_ID: &str = "theme-transition-style";
/// Class enabling transitions.
pub const TRANSITION_CLASS: &str = "theme-transition";
/// Custom property holding the transition duration.
pub const TRANSITION_DURATION_PROPERTY: &str = "--theme-transition-duration";

/// Category prefixes stripped from slot values.
const CATEGORY_PREFIXES: [&str; 4] = ["bg-", "text-", "border-", "shadow-"];

/// Strips one leading category prefix (`bg-`, `text-`, `border-`, `shadow-`).
pub fn strip_category_prefix(value: &str) -> &str {
    CATEGORY_PREFIXES
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value)
}

/// The `--theme-<slot>` properties for a theme, in slot order.
pub fn theme_to_css_vars(theme: &Theme) -> Vec<(String, String)> {
    theme
        .colors
        .slots()
        .map(|(slot, value)| {
            (
                format!("{}{}", THEME_PROPERTY_PREFIX, slot),
                strip_category_prefix(value).to_string(),
            )
        })
        .collect()
}

/// A `:root { name: value; ... }` block for the given custom properties.
///
/// Returns `None` (after a warning) if the stylesheet template fails.
pub fn css_root_block(properties: &[(String, String)]) -> Option<String> {
    templates::root_block(properties)
}

fn mark_active(target: &dyn StyleTarget, theme: &Theme) {
    target.set_attribute(THEME_ATTRIBUTE, &theme.name);
    target.set_class(DARK_CLASS, theme.name == "dark");
}

/// Applies `theme` as a preload stylesheet, unless one is already installed.
///
/// This is a best-effort step for hosts that paint before the core has
/// finished resolving. The next [`StyleApplier::apply`] removes it. Returns
/// true when the stylesheet was installed.
pub fn prepaint(target: &dyn StyleTarget, theme: &Theme) -> bool {
    if target.has_stylesheet(PRELOAD_STYLESHEET_ID) {
        return false;
    }
    let Some(css) = templates::root_block(&theme_to_css_vars(theme)) else {
        return false;
    };
    target.insert_stylesheet(PRELOAD_STYLESHEET_ID, &css);
    mark_active(target, theme);
    true
}

/// Applies themes to a [`StyleTarget`], remembering what it set.
pub struct StyleApplier {
    target: Arc<dyn StyleTarget>,
    applied: Mutex<Vec<String>>,
}

impl StyleApplier {
    pub fn new(target: Arc<dyn StyleTarget>) -> Self {
        Self {
            target,
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn target(&self) -> &Arc<dyn StyleTarget> {
        &self.target
    }

    /// Removes the properties set by the previous [`apply`](Self::apply).
    pub fn clear(&self) {
        let mut applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
        for name in applied.drain(..) {
            self.target.remove_property(&name);
        }
    }

    /// Replaces the previous theme's properties with `theme`'s.
    pub fn apply(&self, theme: &Theme) {
        self.target.remove_stylesheet(PRELOAD_STYLESHEET_ID);
        self.clear();

        let mut applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
        let explicit = theme.css_vars.iter().flatten();
        let slots = theme_to_css_vars(theme);
        for (name, value) in explicit.map(|(k, v)| (k.as_str(), v.as_str())).chain(
            slots
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        ) {
            self.target.set_property(name, value);
            applied.push(name.to_string());
        }

        mark_active(self.target.as_ref(), theme);
    }

    /// Enables transitions of `duration_ms`. Zero disables them.
    pub fn setup_transition(&self, duration_ms: u64) {
        if duration_ms == 0 {
            self.remove_transition();
            return;
        }
        self.target
            .set_property(TRANSITION_DURATION_PROPERTY, &format!("{}ms", duration_ms));
        self.target.set_class(TRANSITION_CLASS, true);
        if !self.target.has_stylesheet(TRANSITION_STYLESHEET_ID) {
            if let Some(css) = templates::transition_rules(TRANSITION_DURATION_PROPERTY) {
                self.target.insert_stylesheet(TRANSITION_STYLESHEET_ID, &css);
            }
        }
    }

    /// Removes the transition class, property and stylesheet.
    pub fn remove_transition(&self) {
        self.target.set_class(TRANSITION_CLASS, false);
        self.target.remove_property(TRANSITION_DURATION_PROPERTY);
        self.target.remove_stylesheet(TRANSITION_STYLESHEET_ID);
    }
}
