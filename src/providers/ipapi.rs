use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::config::FALLBACK_CURRENCY;
use crate::core::currency::LocalCurrencyResolver;

/// Looks up the user's local currency from their IP address via ipapi.co.
pub struct IpApiResolver {
    base_url: String,
}

impl IpApiResolver {
    pub fn new(base_url: &str) -> Self {
        IpApiResolver {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn lookup(&self) -> Result<Option<String>> {
        let url = format!("{}/json/", self.base_url);
        debug!("Requesting location from {}", url);

        let client = reqwest::Client::builder().user_agent("fxc/1.0").build()?;
        let data = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<IpApiResponse>()
            .await?;

        Ok(data
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    currency: Option<String>,
}

#[async_trait]
impl LocalCurrencyResolver for IpApiResolver {
    async fn resolve(&self) -> String {
        match self.lookup().await {
            Ok(Some(currency)) => currency,
            Ok(None) => FALLBACK_CURRENCY.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to resolve local currency");
                FALLBACK_CURRENCY.to_string()
            }
        }
    }
}
