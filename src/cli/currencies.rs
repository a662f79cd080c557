use super::ui;
use crate::core::currency::{CurrencyMeta, RateSource, filter_currencies};
use crate::core::session::{MetadataState, Session};
use crate::core::theme::Theme;
use anyhow::Result;
use comfy_table::Cell;

pub fn display_as_table(currencies: &[&CurrencyMeta], session: &Session, theme: Theme) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code", theme),
        ui::header_cell("Name", theme),
        ui::header_cell("Symbol", theme),
    ]);

    for currency in currencies {
        let marker = if currency.code == session.from() {
            " (from)"
        } else if currency.code == session.to() {
            " (to)"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(format!("{}{}", currency.code, marker)),
            Cell::new(&currency.name),
            Cell::new(&currency.symbol),
        ]);
    }

    table.to_string()
}

pub async fn run(
    session: &mut Session,
    source: &dyn RateSource,
    search: Option<&str>,
    theme: Theme,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching currencies...");
    session.load_metadata(source).await;
    pb.finish_and_clear();

    match session.metadata() {
        MetadataState::Ready(_) => {
            let matches = filter_currencies(session.currencies(), search.unwrap_or(""));
            if matches.is_empty() {
                println!(
                    "{}",
                    ui::style_text("No matching currencies.", ui::StyleType::Subtle, theme)
                );
            } else {
                println!("{}", display_as_table(&matches, session, theme));
            }
        }
        MetadataState::Failed(e) => {
            println!(
                "{}",
                ui::style_text(
                    &format!("Currency list unavailable: {e}"),
                    ui::StyleType::Error,
                    theme
                )
            );
        }
        MetadataState::Loading => {
            println!("{}", ui::style_text("Loading...", ui::StyleType::Subtle, theme));
        }
    }

    Ok(())
}
