//! Converter session state.
//!
//! A [`Session`] owns everything the converter screen shows: the currency list,
//! the selected pair, the entered amount, the rate table for the current base
//! and the derived converted value. Every mutator re-derives the converted
//! value before returning.
//!
//! Network work is split in two steps so the caller decides where it runs:
//! `select_base` / `request_history` hand out a pending request, the free
//! functions [`load_rates`] and [`load_history_for`] perform it, and
//! `apply_rates` / `apply_history` commit the outcome. Only the outcome of the
//! most recent request is ever committed; older in-flight requests are aborted.

use crate::core::convert::{convert, parse_amount};
use crate::core::currency::{CurrencyMeta, RateSource, RateTable, load_currencies};
use crate::core::history::{History, load_history};
use anyhow::Result;
use chrono::NaiveDate;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use tracing::{debug, warn};

pub const RATES_UNAVAILABLE: &str = "Failed to fetch rates";

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataState {
    Loading,
    Ready(Vec<CurrencyMeta>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatesState {
    NotLoaded,
    Loading { base: String },
    Loaded { base: String, rates: RateTable },
    Failed { base: String, message: String },
}

/// What the conversion line should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionView {
    Loading,
    Unavailable(String),
    Converted {
        amount: f64,
        from: String,
        value: f64,
        to: String,
    },
    /// Nothing to show yet, or the target is not quoted for this base.
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct PendingRates {
    ticket: Ticket,
    base: String,
    registration: AbortRegistration,
}

impl PendingRates {
    pub fn base(&self) -> &str {
        &self.base
    }
}

pub struct RatesOutcome {
    ticket: Ticket,
    base: String,
    result: Result<RateTable>,
}

pub struct PendingHistory {
    ticket: Ticket,
    base: String,
    target: String,
    registration: AbortRegistration,
}

pub struct HistoryOutcome {
    ticket: Ticket,
    history: History,
}

/// Issues the request described by `pending`. Returns `None` when the request
/// was aborted by a newer selection or by [`Session::teardown`].
pub async fn load_rates(source: &dyn RateSource, pending: PendingRates) -> Option<RatesOutcome> {
    let PendingRates {
        ticket,
        base,
        registration,
    } = pending;

    let fetched = Abortable::new(source.fetch_latest(&base), registration).await;
    match fetched {
        Ok(result) => Some(RatesOutcome {
            ticket,
            base,
            result,
        }),
        Err(_) => {
            debug!(%base, "Rate request aborted");
            None
        }
    }
}

pub async fn load_history_for(
    source: &dyn RateSource,
    pending: PendingHistory,
    today: NaiveDate,
    on_step: &(dyn Fn() + Send + Sync),
) -> Option<HistoryOutcome> {
    let PendingHistory {
        ticket,
        base,
        target,
        registration,
    } = pending;

    let fetch = load_history(source, &base, &target, today, on_step);
    let fetched = Abortable::new(fetch, registration).await;
    match fetched {
        Ok(history) => Some(HistoryOutcome { ticket, history }),
        Err(_) => {
            debug!(%base, %target, "History request aborted");
            None
        }
    }
}

#[derive(Default)]
struct RequestSlot {
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl RequestSlot {
    fn next(&mut self) -> (Ticket, AbortRegistration) {
        self.abort();
        self.generation += 1;
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        (Ticket(self.generation), registration)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.in_flight.is_some() && ticket.0 == self.generation
    }

    fn finish(&mut self) {
        self.in_flight = None;
    }

    fn abort(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

pub struct Session {
    metadata: MetadataState,
    from: String,
    to: String,
    amount: String,
    rates: RatesState,
    converted: Option<f64>,
    rates_slot: RequestSlot,
    history: Option<History>,
    history_slot: RequestSlot,
}

impl Session {
    pub fn new(from: &str, to: &str, amount: &str) -> Self {
        Self {
            metadata: MetadataState::Loading,
            from: from.to_uppercase(),
            to: to.to_uppercase(),
            amount: amount.to_string(),
            rates: RatesState::NotLoaded,
            converted: None,
            rates_slot: RequestSlot::default(),
            history: None,
            history_slot: RequestSlot::default(),
        }
    }

    /// Loads the supported currency list. A failure leaves the list empty and
    /// is recorded as [`MetadataState::Failed`].
    pub async fn load_metadata(&mut self, source: &dyn RateSource) {
        self.metadata = match load_currencies(source).await {
            Ok(currencies) => MetadataState::Ready(currencies),
            Err(e) => {
                warn!(error = %e, "Failed to load currency list");
                MetadataState::Failed(e.to_string())
            }
        };
    }

    pub fn metadata(&self) -> &MetadataState {
        &self.metadata
    }

    pub fn currencies(&self) -> &[CurrencyMeta] {
        match &self.metadata {
            MetadataState::Ready(currencies) => currencies,
            _ => &[],
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn rates(&self) -> &RatesState {
        &self.rates
    }

    pub fn converted(&self) -> Option<f64> {
        self.converted
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    /// Switches the base currency and starts a fresh rate request for it.
    /// Any request still in flight for a previous base is aborted.
    pub fn select_base(&mut self, base: &str) -> PendingRates {
        let base = base.to_uppercase();
        if base != self.from {
            self.clear_history();
        }
        self.from = base;
        let (ticket, registration) = self.rates_slot.next();
        self.rates = RatesState::Loading {
            base: self.from.clone(),
        };
        self.recompute();
        debug!(base = %self.from, ?ticket, "Requesting rates");

        PendingRates {
            ticket,
            base: self.from.clone(),
            registration,
        }
    }

    /// Commits a finished rate request. Outcomes from superseded requests are
    /// dropped and `false` is returned.
    pub fn apply_rates(&mut self, outcome: RatesOutcome) -> bool {
        if !self.rates_slot.is_current(outcome.ticket) {
            debug!(base = %outcome.base, ticket = ?outcome.ticket, "Discarding stale rates");
            return false;
        }
        self.rates_slot.finish();

        self.rates = match outcome.result {
            Ok(rates) => RatesState::Loaded {
                base: outcome.base,
                rates,
            },
            Err(e) => {
                warn!(base = %outcome.base, error = %e, "Failed to fetch rates");
                RatesState::Failed {
                    base: outcome.base,
                    message: e.to_string(),
                }
            }
        };
        self.recompute();
        true
    }

    pub fn select_target(&mut self, target: &str) {
        let target = target.to_uppercase();
        if target != self.to {
            self.clear_history();
        }
        self.to = target;
        self.recompute();
    }

    pub fn set_amount(&mut self, amount: &str) {
        self.amount = amount.to_string();
        self.recompute();
    }

    /// Exchanges base and target. The base changed, so new rates are needed.
    pub fn swap(&mut self) -> PendingRates {
        if self.from != self.to {
            self.clear_history();
        }
        let new_base = std::mem::replace(&mut self.to, self.from.clone());
        self.select_base(&new_base)
    }

    pub fn view(&self) -> ConversionView {
        match (&self.rates, self.converted) {
            (RatesState::Loading { .. }, _) => ConversionView::Loading,
            (RatesState::Failed { .. }, _) => {
                ConversionView::Unavailable(RATES_UNAVAILABLE.to_string())
            }
            (RatesState::Loaded { .. }, Some(value)) => ConversionView::Converted {
                amount: parse_amount(&self.amount),
                from: self.from.clone(),
                value,
                to: self.to.clone(),
            },
            _ => ConversionView::Placeholder,
        }
    }

    /// Starts a history request for the current pair, aborting an older one.
    pub fn request_history(&mut self) -> PendingHistory {
        let (ticket, registration) = self.history_slot.next();
        PendingHistory {
            ticket,
            base: self.from.clone(),
            target: self.to.clone(),
            registration,
        }
    }

    /// Commits a finished history request. Outcomes from superseded requests
    /// or for a pair other than the selected one are dropped.
    pub fn apply_history(&mut self, outcome: HistoryOutcome) -> bool {
        if !self.history_slot.is_current(outcome.ticket) {
            debug!(ticket = ?outcome.ticket, "Discarding stale history");
            return false;
        }
        if outcome.history.base != self.from || outcome.history.target != self.to {
            debug!(
                base = %outcome.history.base,
                target = %outcome.history.target,
                "Discarding history for another pair"
            );
            return false;
        }
        self.history_slot.finish();
        self.history = Some(outcome.history);
        true
    }

    /// Abandons in-flight requests. Their outcomes can no longer be applied.
    pub fn teardown(&mut self) {
        self.rates_slot.abort();
        self.history_slot.abort();
    }

    /// History belongs to one pair; a pair change aborts its request and
    /// drops what was shown.
    fn clear_history(&mut self) {
        self.history_slot.abort();
        self.history = None;
    }

    fn recompute(&mut self) {
        self.converted = match &self.rates {
            RatesState::Loaded { rates, .. } => convert(parse_amount(&self.amount), rates, &self.to),
            _ => None,
        };
    }
}
