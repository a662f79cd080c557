//! Diagnostic logging to stderr.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "fxc";

/// HTTP client crates whose warnings are worth seeing next to ours.
const HTTP_TARGETS: [&str; 2] = ["reqwest", "hyper_util"];

/// Which targets may log. Everything is off unless `verbose`; then `fxc`
/// logs at debug and the HTTP stack only reports warnings.
fn log_targets(verbose: bool) -> Targets {
    if !verbose {
        return Targets::new().with_target(APP_TARGET, LevelFilter::OFF);
    }
    HTTP_TARGETS.iter().fold(
        Targets::new().with_target(APP_TARGET, LevelFilter::DEBUG),
        |targets, target| targets.with_target(*target, LevelFilter::WARN),
    )
}

/// Installs the global subscriber. `RUST_LOG` narrows what `verbose` allows.
///
/// Output is pretty-printed on a terminal and compact without colors when
/// stderr is redirected.
pub fn init_logging(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { "off" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry()
        .with(log_targets(verbose))
        .with(env_filter);

    if console::Term::stderr().is_term() {
        registry
            .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().compact().with_ansi(false).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
