use serde::{Deserialize, Serialize};

use super::Size;
use crate::core::ThemeHandle;
use crate::theme::{title_case, Theme};

/// Layout of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorVariant {
    #[default]
    Dropdown,
    Grid,
    Buttons,
    /// Icons only; labels are never shown.
    Icons,
}

/// Which color slots a preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewType {
    /// One dot per slot: primary, secondary, accent, button.
    #[default]
    ColorCircles,
    /// A surface and a bar: primary, accent.
    MiniMockup,
}

impl PreviewType {
    fn slots(self) -> &'static [&'static str] {
        match self {
            PreviewType::ColorCircles => &["primary", "secondary", "accent", "button"],
            PreviewType::MiniMockup => &["primary", "accent"],
        }
    }
}

/// One preview color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub slot: String,
    pub class: String,
}

/// One entry of the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    pub name: String,
    /// Title-cased name.
    pub label: String,
    pub description: Option<String>,
    pub active: bool,
    /// Empty unless previews are enabled.
    pub swatches: Vec<Swatch>,
}

/// Lists every registered theme and switches between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSelector {
    pub variant: SelectorVariant,
    pub size: Size,
    pub show_labels: bool,
    pub show_preview: bool,
    pub preview_type: PreviewType,
}

impl Default for ThemeSelector {
    fn default() -> Self {
        Self {
            variant: SelectorVariant::default(),
            size: Size::default(),
            show_labels: true,
            show_preview: false,
            preview_type: PreviewType::default(),
        }
    }
}

impl ThemeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(mut self, variant: SelectorVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn show_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    pub fn preview(mut self, preview_type: PreviewType) -> Self {
        self.show_preview = true;
        self.preview_type = preview_type;
        self
    }

    /// Whether renderers should print labels next to the options.
    pub fn labels_visible(&self) -> bool {
        self.show_labels && self.variant != SelectorVariant::Icons
    }

    /// Every registered theme, in registry order.
    pub fn options(&self, handle: &ThemeHandle) -> Vec<SelectorOption> {
        let current = handle.theme();
        handle
            .registry()
            .iter()
            .map(|theme| SelectorOption {
                name: theme.name.clone(),
                label: title_case(&theme.name),
                description: theme.description().map(str::to_string),
                active: theme.name == current,
                swatches: self.swatches(theme),
            })
            .collect()
    }

    fn swatches(&self, theme: &Theme) -> Vec<Swatch> {
        if !self.show_preview {
            return Vec::new();
        }
        self.preview_type
            .slots()
            .iter()
            .filter_map(|slot| {
                theme.colors.get(slot).map(|class| Swatch {
                    slot: slot.to_string(),
                    class: class.to_string(),
                })
            })
            .collect()
    }

    /// Switches to `name`. Returns the theme actually applied.
    pub fn select(&self, handle: &ThemeHandle, name: &str) -> String {
        handle.set_theme(name)
    }
}
