use super::ui;
use crate::core::theme::ThemeSettings;
use anyhow::Result;

pub fn run(settings: &mut ThemeSettings, toggle: bool) -> Result<()> {
    if toggle {
        settings.toggle()?;
    }
    let mode = if settings.is_dark() {
        "Dark mode"
    } else {
        "Light mode"
    };
    println!(
        "Theme: {}",
        ui::style_text(mode, ui::StyleType::Value, settings.theme())
    );
    Ok(())
}
