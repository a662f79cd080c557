//! Currency metadata and the exchange-rate source abstraction

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Rates keyed by currency code, relative to a single base currency.
pub type RateTable = HashMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyMeta {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Supported currencies as `(code, name)` pairs, in the order the source lists them.
    async fn fetch_codes(&self) -> Result<Vec<(String, String)>>;

    async fn fetch_latest(&self, base: &str) -> Result<RateTable>;

    async fn fetch_history(&self, base: &str, date: NaiveDate) -> Result<RateTable>;
}

#[async_trait]
pub trait LocalCurrencyResolver: Send + Sync {
    /// Best-effort guess of the user's currency. Never fails.
    async fn resolve(&self) -> String;
}

/// Display symbol for a currency code, empty when unknown.
pub fn symbol_for(code: &str) -> &'static str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "NGN" => "₦",
        "JPY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "Fr",
        "CNY" => "¥",
        "INR" => "₹",
        "ZAR" => "R",
        "KRW" => "₩",
        "SEK" | "NOK" | "DKK" => "kr",
        "SGD" => "S$",
        "HKD" => "HK$",
        "BRL" => "R$",
        "MXN" => "$",
        "RUB" => "₽",
        "AED" => "د.إ",
        "GHS" => "₵",
        "KES" => "KSh",
        "TZS" => "TSh",
        "UGX" => "USh",
        "IDR" => "Rp",
        "MYR" => "RM",
        "PHP" => "₱",
        "THB" => "฿",
        "VND" => "₫",
        _ => "",
    }
}

/// Fetches the supported currency list and attaches display symbols.
///
/// Codes are upper-cased and duplicates after the first occurrence are dropped,
/// so the returned list is unique by code and keeps the source ordering.
pub async fn load_currencies(source: &dyn RateSource) -> Result<Vec<CurrencyMeta>> {
    let codes = source.fetch_codes().await?;
    let mut seen = HashSet::new();

    let currencies: Vec<CurrencyMeta> = codes
        .into_iter()
        .filter_map(|(code, name)| {
            let code = code.trim().to_uppercase();
            if code.is_empty() || !seen.insert(code.clone()) {
                return None;
            }
            Some(CurrencyMeta {
                symbol: symbol_for(&code).to_string(),
                code,
                name,
            })
        })
        .collect();

    debug!("Loaded {} currencies", currencies.len());
    Ok(currencies)
}

/// Filters currencies by a search query matched against code or name, ignoring case.
pub fn filter_currencies<'a>(currencies: &'a [CurrencyMeta], query: &str) -> Vec<&'a CurrencyMeta> {
    let query = query.trim();
    let code_query = query.to_uppercase();
    let name_query = query.to_lowercase();

    currencies
        .iter()
        .filter(|c| c.code.contains(&code_query) || c.name.to_lowercase().contains(&name_query))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;

    /// In-memory rate source used across the crate's unit tests.
    #[derive(Default)]
    pub(crate) struct StaticRateSource {
        pub codes: Vec<(String, String)>,
        pub latest: HashMap<String, RateTable>,
        pub history: HashMap<(String, NaiveDate), RateTable>,
        pub fail_codes: bool,
    }

    #[async_trait]
    impl RateSource for StaticRateSource {
        async fn fetch_codes(&self) -> Result<Vec<(String, String)>> {
            if self.fail_codes {
                return Err(anyhow!("network unreachable"));
            }
            Ok(self.codes.clone())
        }

        async fn fetch_latest(&self, base: &str) -> Result<RateTable> {
            self.latest
                .get(base)
                .cloned()
                .ok_or_else(|| anyhow!("No rates for base: {}", base))
        }

        async fn fetch_history(&self, base: &str, date: NaiveDate) -> Result<RateTable> {
            self.history
                .get(&(base.to_string(), date))
                .cloned()
                .ok_or_else(|| anyhow!("No history for {} on {}", base, date))
        }
    }

    fn pair(code: &str, name: &str) -> (String, String) {
        (code.to_string(), name.to_string())
    }

    #[tokio::test]
    async fn test_load_currencies_attaches_symbols() {
        let source = StaticRateSource {
            codes: vec![
                pair("USD", "United States Dollar"),
                pair("EUR", "Euro"),
                pair("XCD", "East Caribbean Dollar"),
            ],
            ..Default::default()
        };

        let currencies = load_currencies(&source).await.unwrap();
        assert_eq!(currencies.len(), 3);
        assert_eq!(currencies[0].code, "USD");
        assert_eq!(currencies[0].symbol, "$");
        assert_eq!(currencies[1].symbol, "€");
        assert_eq!(currencies[2].symbol, "");
        assert_eq!(currencies[2].name, "East Caribbean Dollar");
    }

    #[tokio::test]
    async fn test_load_currencies_normalizes_and_dedupes_codes() {
        let source = StaticRateSource {
            codes: vec![
                pair("gbp", "Pound Sterling"),
                pair("GBP", "Duplicate"),
                pair("", "Nameless"),
            ],
            ..Default::default()
        };

        let currencies = load_currencies(&source).await.unwrap();
        assert_eq!(currencies.len(), 1);
        assert_eq!(currencies[0].code, "GBP");
        assert_eq!(currencies[0].name, "Pound Sterling");
        assert_eq!(currencies[0].symbol, "£");
    }

    #[tokio::test]
    async fn test_load_currencies_propagates_failure() {
        let source = StaticRateSource {
            fail_codes: true,
            ..Default::default()
        };
        assert!(load_currencies(&source).await.is_err());
    }

    #[test]
    fn test_filter_currencies_matches_code_or_name() {
        let currencies = vec![
            CurrencyMeta {
                code: "USD".into(),
                name: "United States Dollar".into(),
                symbol: "$".into(),
            },
            CurrencyMeta {
                code: "EUR".into(),
                name: "Euro".into(),
                symbol: "€".into(),
            },
            CurrencyMeta {
                code: "AUD".into(),
                name: "Australian Dollar".into(),
                symbol: "A$".into(),
            },
        ];

        let by_code: Vec<_> = filter_currencies(&currencies, "eu")
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(by_code, vec!["EUR"]);

        let by_name: Vec<_> = filter_currencies(&currencies, "DOLLAR")
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(by_name, vec!["USD", "AUD"]);

        assert_eq!(filter_currencies(&currencies, "").len(), 3);
        assert!(filter_currencies(&currencies, "yen").is_empty());
    }
}
