//! Presentation-free models of the theme controls.
//!
//! Each control turns a [`ThemeHandle`](crate::ThemeHandle) into plain state a
//! renderer can draw (labels, flags, class strings) and exposes the one action
//! a user can take. Nothing here draws anything.
//!
//! - [`ThemeToggle`]: flips between a light and a dark theme
//! - [`ThemeSelector`]: lists every registered theme
//! - [`ThemeIndicator`]: a transient "theme changed" notice

mod indicator;
mod selector;
mod toggle;

use serde::{Deserialize, Serialize};

pub use indicator::{ThemeIndicator, DEFAULT_INDICATOR_DURATION};
pub use selector::{PreviewType, SelectorOption, SelectorVariant, Swatch, ThemeSelector};
pub use toggle::{ThemeToggle, ToggleLabel, ToggleState};

/// Control size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Sm,
    #[default]
    Md,
    Lg,
}

impl Size {
    /// Text size class.
    pub fn text_class(self) -> &'static str {
        match self {
            Size::Sm => "text-sm",
            Size::Md => "text-base",
            Size::Lg => "text-lg",
        }
    }

    /// Padding plus text size, for round buttons.
    pub fn button_class(self) -> &'static str {
        match self {
            Size::Sm => "p-1.5 text-sm",
            Size::Md => "p-2 text-base",
            Size::Lg => "p-3 text-lg",
        }
    }
}
