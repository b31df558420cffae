//! Theme and color-slot types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The nine color slots every theme must define, in application order.
pub const REQUIRED_COLOR_SLOTS: [&str; 9] = [
    "primary",
    "secondary",
    "text",
    "textMuted",
    "accent",
    "border",
    "shadow",
    "button",
    "buttonOutline",
];

/// Named style-class strings for a theme.
///
/// Values are opaque: they are forwarded to the presentation layer (usually
/// utility CSS classes such as `bg-white` or `text-gray-900`) and never parsed.
/// Themes may carry additional slots beyond the nine required ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub text_muted: String,
    pub accent: String,
    pub border: String,
    pub shadow: String,
    pub button: String,
    pub button_outline: String,
    /// Extra slots, keyed by their wire name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ThemeColors {
    /// Returns the value of a slot by its wire name (`textMuted`, not `text_muted`).
    pub fn get(&self, slot: &str) -> Option<&str> {
        let value = match slot {
            "primary" => &self.primary,
            "secondary" => &self.secondary,
            "text" => &self.text,
            "textMuted" => &self.text_muted,
            "accent" => &self.accent,
            "border" => &self.border,
            "shadow" => &self.shadow,
            "button" => &self.button,
            "buttonOutline" => &self.button_outline,
            other => return self.extra.get(other).map(String::as_str),
        };
        Some(value.as_str())
    }

    /// Iterates `(slot, value)` pairs: required slots first, then extras by name.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &str)> {
        let required: [(&str, &str); 9] = [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("text", self.text.as_str()),
            ("textMuted", self.text_muted.as_str()),
            ("accent", self.accent.as_str()),
            ("border", self.border.as_str()),
            ("shadow", self.shadow.as_str()),
            ("button", self.button.as_str()),
            ("buttonOutline", self.button_outline.as_str()),
        ];
        required
            .into_iter()
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Adds an extra slot, returning the updated colors for chaining.
    pub fn with_slot(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(slot.into(), value.into());
        self
    }
}

/// A complete theme definition.
///
/// # Example
///
/// ```rust
/// use themekeeper::{Theme, ThemeColors};
///
/// let colors = themekeeper::theme::builtin("dark").unwrap().colors.clone();
/// let theme = Theme::from_colors("midnight", colors)
///     .css_var("--brand", "#101020");
///
/// assert_eq!(theme.description(), Some("Midnight theme"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
    /// Explicit custom properties set verbatim alongside the color slots.
    #[serde(default, rename = "cssVars", skip_serializing_if = "Option::is_none")]
    pub css_vars: Option<BTreeMap<String, String>>,
    /// Open metadata. `description` and `author` are conventional keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Theme {
    /// Creates a theme with no extra custom properties and no metadata.
    pub fn new(name: impl Into<String>, colors: ThemeColors) -> Self {
        Self {
            name: name.into(),
            colors,
            css_vars: None,
            meta: None,
        }
    }

    /// Wraps a bare color set, describing it as "`<Name>` theme".
    pub fn from_colors(name: impl Into<String>, colors: ThemeColors) -> Self {
        let name = name.into();
        let description = format!("{} theme", title_case(&name));
        Self::new(name, colors).meta_value("description", Value::String(description))
    }

    /// Adds an explicit custom property, returning the updated theme.
    pub fn css_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css_vars
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds a metadata entry, returning the updated theme.
    pub fn meta_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.get_or_insert_with(Map::new).insert(key.into(), value);
        self
    }

    /// Returns `meta.description` when it is a string.
    pub fn description(&self) -> Option<&str> {
        self.meta.as_ref()?.get("description")?.as_str()
    }
}

/// Upper-cases the first character of a theme name.
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
