pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::core::config::AppConfig;
use crate::core::currency::LocalCurrencyResolver;
use crate::core::session::Session;
use crate::core::theme::ThemeSettings;
use anyhow::Result;
use tracing::{debug, info};

pub const DEFAULT_TARGET: &str = "EUR";
pub const DEFAULT_AMOUNT: &str = "100";

pub enum AppCommand {
    Currencies {
        search: Option<String>,
    },
    Convert {
        amount: Option<String>,
        from: Option<String>,
        to: Option<String>,
        swap: bool,
    },
    History {
        from: Option<String>,
        to: Option<String>,
    },
    Theme {
        toggle: bool,
    },
}

/// Builds a session from command-line values, falling back to the config file
/// and finally to the user's local currency for the base.
async fn new_session(
    config: &AppConfig,
    resolver: &dyn LocalCurrencyResolver,
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
) -> Session {
    let from = match from.or_else(|| config.from.clone()) {
        Some(from) => from,
        None => resolver.resolve().await,
    };
    let to = to
        .or_else(|| config.to.clone())
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());
    let amount = amount
        .or_else(|| config.amount.clone())
        .unwrap_or_else(|| DEFAULT_AMOUNT.to_string());

    debug!(%from, %to, %amount, "Starting session");
    Session::new(&from, &to, &amount)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxc starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(path = ?config_path, "Loaded config");

    let mut theme = ThemeSettings::load(store::open_default(&config));

    let (base_url, api_key) = config.rates_provider();
    let source = providers::exchangerate_api::ExchangeRateApiProvider::new(base_url, api_key)?;
    let resolver = providers::ipapi::IpApiResolver::new(config.geo_base_url());

    let mut session = match command {
        AppCommand::Theme { toggle } => return cli::theme::run(&mut theme, toggle),
        AppCommand::Currencies { search } => {
            let mut session = new_session(&config, &resolver, None, None, None).await;
            cli::currencies::run(&mut session, &source, search.as_deref(), theme.theme()).await?;
            session
        }
        AppCommand::Convert {
            amount,
            from,
            to,
            swap,
        } => {
            let mut session = new_session(&config, &resolver, from, to, amount).await;
            cli::convert::run(&mut session, &source, swap, theme.theme()).await?;
            session
        }
        AppCommand::History { from, to } => {
            let mut session = new_session(&config, &resolver, from, to, None).await;
            let today = chrono::Utc::now().date_naive();
            cli::history::run(&mut session, &source, today, theme.theme()).await?;
            session
        }
    };

    session.teardown();
    Ok(())
}
