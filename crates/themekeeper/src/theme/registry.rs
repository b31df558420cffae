//! Theme registry: validation, normalization and merging.
//!
//! Raw theme inputs arrive in three shapes: complete [`Theme`]s, bare
//! [`ThemeColors`] sets, or untyped JSON values (from option files). The
//! registry turns all of them into a uniform, ordered name → [`Theme`]
//! mapping.
//!
//! # Normalization Rules
//!
//! For each `(name, input)` pair, in order:
//!
//! 1. A structurally valid theme is kept (its `name` is aligned with the key)
//! 2. A structurally valid color set is wrapped with [`Theme::from_colors`]
//! 3. Anything else is dropped with one `warn!` diagnostic
//!
//! Validation never fails the whole operation.

use std::collections::HashMap;

use serde_json::Value;

use super::defaults::{builtin_themes, default_registry};
use super::theme::{Theme, ThemeColors, REQUIRED_COLOR_SLOTS};

/// One raw theme definition, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeInput {
    /// A complete theme.
    Theme(Theme),
    /// A bare color set; the registry key becomes the theme name.
    Colors(ThemeColors),
    /// An untyped value, validated structurally.
    Raw(Value),
}

impl From<Theme> for ThemeInput {
    fn from(theme: Theme) -> Self {
        ThemeInput::Theme(theme)
    }
}

impl From<ThemeColors> for ThemeInput {
    fn from(colors: ThemeColors) -> Self {
        ThemeInput::Colors(colors)
    }
}

impl From<Value> for ThemeInput {
    fn from(value: Value) -> Self {
        ThemeInput::Raw(value)
    }
}

/// An input entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTheme {
    pub name: String,
    pub reason: String,
}

/// Returns true when `value` has all nine required color slots as strings.
///
/// Empty strings are allowed.
pub fn is_valid_theme_colors(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    REQUIRED_COLOR_SLOTS
        .iter()
        .all(|slot| object.get(*slot).is_some_and(Value::is_string))
}

/// Returns true when `value` has a non-blank string `name` and valid `colors`.
pub fn is_valid_theme(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let named = object
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    named && object.get("colors").is_some_and(is_valid_theme_colors)
}

/// Ordered, validated mapping from theme name to [`Theme`].
///
/// Iteration order is insertion order; replacing an existing name keeps its
/// original position.
#[derive(Debug, Clone, Default)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
    index: HashMap<String, usize>,
}

impl ThemeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from already-validated themes, keyed by their names.
    pub fn from_themes(themes: impl IntoIterator<Item = Theme>) -> Self {
        let mut registry = Self::new();
        for theme in themes {
            registry.insert(theme);
        }
        registry
    }

    /// Inserts or replaces a theme under its own name.
    pub fn insert(&mut self, theme: Theme) {
        match self.index.get(&theme.name) {
            Some(&position) => self.themes[position] = theme,
            None => {
                self.index.insert(theme.name.clone(), self.themes.len());
                self.themes.push(theme);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.index.get(name).map(|&position| &self.themes[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the first theme in iteration order.
    pub fn first(&self) -> Option<&Theme> {
        self.themes.first()
    }

    /// Returns theme names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|theme| theme.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Normalizes raw inputs, logging one warning per dropped entry.
pub fn normalize_themes<I, S, T>(raw: I) -> ThemeRegistry
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: Into<ThemeInput>,
{
    let (registry, rejected) = normalize_themes_with_report(raw);
    for entry in &rejected {
        tracing::warn!(theme = %entry.name, reason = %entry.reason, "invalid theme, skipping");
    }
    registry
}

/// Normalizes raw inputs and returns the dropped entries instead of logging them.
pub fn normalize_themes_with_report<I, S, T>(raw: I) -> (ThemeRegistry, Vec<RejectedTheme>)
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: Into<ThemeInput>,
{
    let mut registry = ThemeRegistry::new();
    let mut rejected = Vec::new();

    for (name, input) in raw {
        let name = name.into();
        match normalize_entry(&name, input.into()) {
            Ok(theme) => registry.insert(theme),
            Err(reason) => rejected.push(RejectedTheme { name, reason }),
        }
    }

    (registry, rejected)
}

fn normalize_entry(name: &str, input: ThemeInput) -> Result<Theme, String> {
    let theme = match input {
        ThemeInput::Theme(theme) => {
            let value = serde_json::to_value(&theme).map_err(|e| e.to_string())?;
            if !is_valid_theme(&value) {
                return Err("theme name must be a non-empty string".to_string());
            }
            theme
        }
        ThemeInput::Colors(colors) => Theme::from_colors(name, colors),
        ThemeInput::Raw(value) => {
            if is_valid_theme(&value) {
                serde_json::from_value::<Theme>(value)
                    .map_err(|e| format!("malformed theme: {}", e))?
            } else if is_valid_theme_colors(&value) {
                let colors = serde_json::from_value::<ThemeColors>(value)
                    .map_err(|e| format!("malformed colors: {}", e))?;
                Theme::from_colors(name, colors)
            } else {
                return Err(describe_invalid(&value));
            }
        }
    };
    Ok(align_name(name, theme))
}

fn align_name(key: &str, mut theme: Theme) -> Theme {
    if theme.name != key {
        tracing::debug!(key, name = %theme.name, "theme name differs from its key; using key");
        theme.name = key.to_string();
    }
    theme
}

fn describe_invalid(value: &Value) -> String {
    match value.as_object() {
        None => format!("expected a theme or color set, found {}", kind_of(value)),
        Some(object) => {
            let colors = object.get("colors").unwrap_or(value);
            let missing: Vec<&str> = REQUIRED_COLOR_SLOTS
                .iter()
                .copied()
                .filter(|slot| !colors.get(*slot).is_some_and(Value::is_string))
                .collect();
            format!("missing color slots: {}", missing.join(", "))
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merges caller overrides over the built-in themes and normalizes the result.
///
/// Built-ins come first; an override with a built-in's name replaces it in
/// place; new names are appended. If nothing valid survives, the built-in
/// registry is returned and a warning is logged, so the result is never empty.
pub fn merge_with_defaults<I, S, T>(overrides: I) -> ThemeRegistry
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: Into<ThemeInput>,
{
    let mut merged: Vec<(String, ThemeInput)> = builtin_themes()
        .iter()
        .map(|theme| (theme.name.clone(), ThemeInput::Theme(theme.clone())))
        .collect();

    for (name, input) in overrides {
        let name = name.into();
        let input = input.into();
        match merged.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = input,
            None => merged.push((name, input)),
        }
    }

    let registry = normalize_themes(merged);
    if registry.is_empty() {
        tracing::warn!("no valid themes provided, using default themes");
        return default_registry();
    }
    registry
}
