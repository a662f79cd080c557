use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::currency::{RateSource, RateTable};

/// Client for the exchangerate-api.com v6 API.
///
/// URLs take the form `{base_url}/{api_key}/{endpoint}`; the key segment is
/// left out when no key is configured.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("fxc/1.0").build()?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        match &self.api_key {
            Some(key) => format!("{}/{}/{}", self.base_url, key, endpoint),
            None => format!("{}/{}", self.base_url, endpoint),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        debug!("Requesting {}", endpoint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for endpoint: {}", e, endpoint))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for endpoint: {}",
                response.status(),
                endpoint
            ));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", endpoint, e))
    }
}

#[derive(Debug, Deserialize)]
struct CodesResponse {
    supported_codes: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    conversion_rates: HashMap<String, f64>,
}

impl RatesResponse {
    /// Drops entries that are not usable rates.
    fn into_table(self) -> RateTable {
        self.conversion_rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .collect()
    }
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(name = "CodesFetch", skip(self))]
    async fn fetch_codes(&self) -> Result<Vec<(String, String)>> {
        let data: CodesResponse = self.get_json("codes").await?;
        Ok(data.supported_codes)
    }

    #[instrument(name = "LatestFetch", skip(self))]
    async fn fetch_latest(&self, base: &str) -> Result<RateTable> {
        let data: RatesResponse = self.get_json(&format!("latest/{base}")).await?;
        Ok(data.into_table())
    }

    #[instrument(name = "HistoryFetch", skip(self))]
    async fn fetch_history(&self, base: &str, date: NaiveDate) -> Result<RateTable> {
        let endpoint = format!("history/{}/{}", base, date.format("%Y-%m-%d"));
        let data: RatesResponse = self.get_json(&endpoint).await?;
        Ok(data.into_table())
    }
}
