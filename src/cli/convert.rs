use super::ui;
use crate::core::convert::format_amount;
use crate::core::currency::RateSource;
use crate::core::session::{ConversionView, PendingRates, Session, load_rates};
use crate::core::theme::Theme;
use anyhow::Result;

/// Renders the conversion line, e.g. `$100.00 ➝ €92.00`.
pub fn render_view(view: &ConversionView) -> String {
    match view {
        ConversionView::Loading => "⏳".to_string(),
        ConversionView::Unavailable(message) => message.clone(),
        ConversionView::Converted {
            amount,
            from,
            value,
            to,
        } => format!(
            "{} ➝ {}",
            format_amount(*amount, from),
            format_amount(*value, to)
        ),
        ConversionView::Placeholder => "-".to_string(),
    }
}

async fn settle_rates(session: &mut Session, source: &dyn RateSource, pending: PendingRates) {
    let pb = ui::new_spinner(&format!("Fetching {} rates...", pending.base()));
    if let Some(outcome) = load_rates(source, pending).await {
        session.apply_rates(outcome);
    }
    pb.finish_and_clear();
}

pub async fn run(
    session: &mut Session,
    source: &dyn RateSource,
    swap: bool,
    theme: Theme,
) -> Result<()> {
    let pending = if swap {
        session.swap()
    } else {
        let base = session.from().to_string();
        session.select_base(&base)
    };
    settle_rates(session, source, pending).await;

    let view = session.view();
    let line = render_view(&view);
    let style_type = match view {
        ConversionView::Unavailable(_) => ui::StyleType::Error,
        ConversionView::Converted { .. } => ui::StyleType::Value,
        _ => ui::StyleType::Subtle,
    };
    println!("{}", ui::style_text(&line, style_type, theme));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_view() {
        let converted = ConversionView::Converted {
            amount: 100.0,
            from: "USD".into(),
            value: 92.0,
            to: "EUR".into(),
        };
        assert_eq!(render_view(&converted), "$100.00 ➝ €92.00");
        assert_eq!(render_view(&ConversionView::Placeholder), "-");
        assert_eq!(
            render_view(&ConversionView::Unavailable("Failed to fetch rates".into())),
            "Failed to fetch rates"
        );
    }
}
