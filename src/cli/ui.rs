use crate::core::theme::Theme;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string. Dark terminals get brighter accents.
pub fn style_text(text: &str, style_type: StyleType, theme: Theme) -> String {
    let styled = match (style_type, theme) {
        (StyleType::Title, _) => style(text).bold().underlined(),
        (StyleType::Value, Theme::Dark) => style(text).cyan().bright().bold(),
        (StyleType::Value, Theme::Light) => style(text).blue().bold(),
        (StyleType::Error, _) => style(text).red(),
        (StyleType::Subtle, _) => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str, theme: Theme) -> Cell {
    let color = match theme {
        Theme::Dark => Color::Cyan,
        Theme::Light => Color::DarkBlue,
    };
    Cell::new(text).fg(color).add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a right-aligned `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Percentage change with an arrow, green when rising and red when falling.
pub fn change_text(change: f64) -> String {
    let text = format!("{change:.2}%");
    if change >= 0.0 {
        style(format!("▲ {text}")).green().bold().to_string()
    } else {
        style(format!("▼ {text}")).red().bold().to_string()
    }
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");

    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Creates a spinner for requests with no measurable progress.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
