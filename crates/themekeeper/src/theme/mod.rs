//! Theme definitions and the theme registry.
//!
//! This module provides:
//!
//! - [`ThemeColors`]: The nine required style-class slots plus extras
//! - [`Theme`]: A named color set with optional custom properties and metadata
//! - [`ThemeRegistry`]: Ordered, validated name → theme mapping
//! - [`normalize_themes`] / [`merge_with_defaults`]: Tolerant input handling
//!
//! Theme values are opaque style-class strings. Nothing here parses CSS.

mod defaults;
mod registry;
#[allow(clippy::module_inception)]
mod theme;

pub use defaults::{builtin, builtin_themes, default_registry, BUILTIN_THEME_NAMES};
pub use registry::{
    is_valid_theme, is_valid_theme_colors, merge_with_defaults, normalize_themes,
    normalize_themes_with_report, RejectedTheme, ThemeInput, ThemeRegistry,
};
pub use theme::{title_case, Theme, ThemeColors, REQUIRED_COLOR_SLOTS};
