//! Built-in themes.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::registry::ThemeRegistry;
use super::theme::{Theme, ThemeColors};

/// Names of the built-in themes, in registry order.
pub const BUILTIN_THEME_NAMES: [&str; 5] = ["light", "dark", "blue", "green", "purple"];

fn colors(slots: [&str; 9]) -> ThemeColors {
    let [primary, secondary, text, text_muted, accent, border, shadow, button, button_outline] =
        slots;
    ThemeColors {
        primary: primary.to_string(),
        secondary: secondary.to_string(),
        text: text.to_string(),
        text_muted: text_muted.to_string(),
        accent: accent.to_string(),
        border: border.to_string(),
        shadow: shadow.to_string(),
        button: button.to_string(),
        button_outline: button_outline.to_string(),
        extra: BTreeMap::new(),
    }
}

static BUILTIN_THEMES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme::from_colors(
            "light",
            colors([
                "bg-white",
                "bg-gray-50",
                "text-gray-900",
                "text-gray-600",
                "bg-gray-100",
                "border-gray-200",
                "shadow-gray-200/20",
                "bg-gray-900 text-white hover:bg-gray-800",
                "border-gray-200 text-gray-900 hover:bg-gray-50",
            ]),
        ),
        Theme::from_colors(
            "dark",
            colors([
                "bg-black",
                "bg-neutral-950",
                "text-white",
                "text-neutral-400",
                "bg-neutral-900",
                "border-neutral-800",
                "shadow-black/60",
                "bg-white text-black hover:bg-neutral-200",
                "border-neutral-800 text-white hover:bg-neutral-900",
            ]),
        ),
        // Navy with a cyan accent
        Theme::from_colors(
            "blue",
            colors([
                "bg-[#0A192F]",
                "bg-[#112240]",
                "text-[#E6F1FF]",
                "text-[#8892B0]",
                "bg-[#1E2D4D]",
                "border-[#233554]",
                "shadow-[#0A192F]/60",
                "bg-[#64FFDA] text-[#0A192F] hover:bg-[#64FFDA]/90",
                "border-[#64FFDA] text-[#64FFDA] hover:bg-[#64FFDA]/10",
            ]),
        ),
        // Forest
        Theme::from_colors(
            "green",
            colors([
                "bg-[#1A2F1C]",
                "bg-[#2A3E2B]",
                "text-[#E8FFF0]",
                "text-[#9DB5A3]",
                "bg-[#2F442F]",
                "border-[#3D5C3E]",
                "shadow-[#1A2F1C]/60",
                "bg-[#7CFF8E] text-[#1A2F1C] hover:bg-[#7CFF8E]/90",
                "border-[#7CFF8E] text-[#7CFF8E] hover:bg-[#7CFF8E]/10",
            ]),
        ),
        // Royal purple
        Theme::from_colors(
            "purple",
            colors([
                "bg-[#13111C]",
                "bg-[#1F1B2E]",
                "text-[#F2E9FF]",
                "text-[#9D91BB]",
                "bg-[#2A2440]",
                "border-[#382F5A]",
                "shadow-[#13111C]/60",
                "bg-[#B69DFF] text-[#13111C] hover:bg-[#B69DFF]/90",
                "border-[#B69DFF] text-[#B69DFF] hover:bg-[#B69DFF]/10",
            ]),
        ),
    ]
});

/// Returns a built-in theme by name.
pub fn builtin(name: &str) -> Option<&'static Theme> {
    BUILTIN_THEMES.iter().find(|theme| theme.name == name)
}

/// Returns all built-in themes in registry order.
pub fn builtin_themes() -> &'static [Theme] {
    &BUILTIN_THEMES
}

/// Returns a registry holding exactly the built-in themes.
pub fn default_registry() -> ThemeRegistry {
    ThemeRegistry::from_themes(BUILTIN_THEMES.iter().cloned())
}
