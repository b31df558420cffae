//! Class lists for CSS purgers.
//!
//! Utility-CSS toolchains drop classes they cannot find in source. Theme
//! values only exist at runtime, so hosts feed these lists into the purger's
//! safelist.

use crate::theme::ThemeRegistry;

/// Utility classes the controls emit on top of theme values.
pub const UTILITY_CLASSES: &[&str] = &[
    // position
    "top-4",
    "right-4",
    "bottom-4",
    "left-4",
    "fixed",
    // padding
    "p-1.5",
    "p-2",
    "p-3",
    "p-4",
    "p-6",
    "px-3",
    "py-2",
    // text size
    "text-sm",
    "text-base",
    "text-lg",
    // flex
    "flex",
    "items-center",
    "gap-2",
    // spacing
    "mt-1",
    "mb-1",
    // rounding
    "rounded",
    "rounded-lg",
    "rounded-full",
    "z-10",
    "z-50",
    "transition-colors",
    "transition-transform",
    "duration-200",
];

/// Every class used by any theme's color slots, de-duplicated in first-seen
/// order.
pub fn extract_theme_classes(registry: &ThemeRegistry) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for theme in registry.iter() {
        for (_, value) in theme.colors.slots() {
            for class in value.split_whitespace() {
                if !classes.iter().any(|seen| seen == class) {
                    classes.push(class.to_string());
                }
            }
        }
    }
    classes
}

/// [`extract_theme_classes`] followed by [`UTILITY_CLASSES`].
pub fn generate_safelist(registry: &ThemeRegistry) -> Vec<String> {
    let mut safelist = extract_theme_classes(registry);
    safelist.extend(UTILITY_CLASSES.iter().map(|class| class.to_string()));
    safelist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{builtin, default_registry};

    #[test]
    fn test_extract_splits_and_dedupes() {
        let registry = ThemeRegistry::from_themes([builtin("light").unwrap().clone()]);
        let classes = extract_theme_classes(&registry);

        assert_eq!(classes[0], "bg-white");
        assert!(classes.contains(&"hover:bg-gray-800".to_string()));
        let text_white = classes.iter().filter(|c| *c == "text-white").count();
        assert_eq!(text_white, 1);
        // "border-gray-200" appears in two slots.
        let border = classes.iter().filter(|c| *c == "border-gray-200").count();
        assert_eq!(border, 1);
    }

    #[test]
    fn test_safelist_appends_utilities() {
        let registry = default_registry();
        let safelist = generate_safelist(&registry);
        let themes = extract_theme_classes(&registry);

        assert_eq!(&safelist[..themes.len()], &themes[..]);
        assert_eq!(safelist.len(), themes.len() + UTILITY_CLASSES.len());
        assert_eq!(safelist.last().map(String::as_str), Some("duration-200"));
    }
}
