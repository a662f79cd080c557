use super::ui;
use crate::core::currency::RateSource;
use crate::core::history::{HISTORY_DAYS, History};
use crate::core::session::{Session, load_history_for};
use crate::core::theme::Theme;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Color};

const BAR_WIDTH: f64 = 30.0;

/// Horizontal bar for a rate, scaled between the window's low and high.
fn bar(rate: f64, min: f64, max: f64) -> String {
    let span = max - min;
    let len = if span > 0.0 {
        1 + ((rate - min) / span * (BAR_WIDTH - 1.0)).round() as usize
    } else {
        (BAR_WIDTH / 2.0) as usize
    };
    "█".repeat(len)
}

pub fn display_as_table(history: &History, theme: Theme) -> String {
    let summary = &history.summary;
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date", theme),
        ui::header_cell(&format!("{} → {}", history.base, history.target), theme),
        ui::header_cell("", theme),
    ]);

    for point in &history.points {
        let chart = match (point.rate, summary.min, summary.max) {
            (Some(rate), Some(min), Some(max)) => Cell::new(bar(rate, min, max)).fg(match theme {
                Theme::Dark => Color::Cyan,
                Theme::Light => Color::Blue,
            }),
            _ => Cell::new("no data").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(point.date.format("%Y-%m-%d")),
            ui::format_optional_cell(point.rate, |r| format!("{r:.4}")),
            chart,
        ]);
    }

    let mut output = format!(
        "{} ({} Day History)",
        ui::style_text(
            &format!("{} → {}", history.base, history.target),
            ui::StyleType::Title,
            theme
        ),
        HISTORY_DAYS
    );
    if let Some(change) = summary.percent_change {
        output.push_str(&format!("  {}", ui::change_text(change)));
    }
    output.push_str("\n\n");
    output.push_str(&table.to_string());

    let format_bound = |v: Option<f64>| v.map_or("N/A".to_string(), |v| format!("{v:.4}"));
    output.push_str(&format!(
        "\n\nHigh: {}\nLow: {}",
        format_bound(summary.max),
        format_bound(summary.min)
    ));

    output
}

pub async fn run(
    session: &mut Session,
    source: &dyn RateSource,
    today: NaiveDate,
    theme: Theme,
) -> Result<()> {
    let pending = session.request_history();

    let pb = ui::new_progress_bar(HISTORY_DAYS as u64, "Fetching history...");
    let outcome = load_history_for(source, pending, today, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    if let Some(outcome) = outcome {
        session.apply_history(outcome);
    }

    match session.history() {
        Some(history) => println!("{}", display_as_table(history, theme)),
        None => println!(
            "{}",
            ui::style_text("History unavailable.", ui::StyleType::Error, theme)
        ),
    }
    Ok(())
}
