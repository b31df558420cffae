//! Terminal rendering of the control models.

use console::{style, Style};
use themekeeper::{SelectorOption, ThemeIndicator, ToggleState};

/// One line per theme, the active one highlighted.
pub fn selector(options: &[SelectorOption], show_descriptions: bool) -> String {
    let width = options
        .iter()
        .map(|option| option.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for option in options {
        let (marker, label_style) = if option.active {
            ("●", Style::new().green().bold())
        } else {
            ("○", Style::new().dim())
        };
        let label = format!("{:<width$}", option.label, width = width);
        out.push_str(&format!("{} {}", marker, label_style.apply_to(label)));
        if show_descriptions {
            if let Some(description) = &option.description {
                out.push_str(&format!("  {}", style(description).dim()));
            }
        }
        for swatch in &option.swatches {
            out.push_str(&format!("  {}={}", swatch.slot, style(&swatch.class).cyan()));
        }
        out.push('\n');
    }
    out
}

/// The active theme, plus the toggle hint when the toggle covers it.
pub fn current(theme: &str, state: &ToggleState) -> String {
    let mut out = format!("{}", style(theme).bold());
    if state.current == theme {
        if let Some(label) = &state.label {
            out.push_str(&format!("  ({})", style(label).dim()));
        }
    }
    out
}

/// The indicator notice, if one should show.
pub fn indicator(indicator: &ThemeIndicator) -> Option<String> {
    indicator
        .message()
        .map(|message| format!("{} {}", style("◆").magenta(), style(message).bold()))
}
