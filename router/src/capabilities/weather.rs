// Weather capability: current conditions from OpenWeatherMap

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::error;

use super::{title_case, CapabilityKind, CapabilityProvider, FetchResult};

pub struct WeatherProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    async fn request(&self, city: &str, api_key: &str, timeout: Duration) -> Result<FetchResult> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status();
        let data: Value = resp.json().await?;
        if !status.is_success() {
            let msg = data["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Ok(FetchResult::failure(format!("Weather API error: {}", msg)));
        }

        let temp = data["main"]
            .get("temp")
            .filter(|v| v.is_number())
            .ok_or_else(|| anyhow::anyhow!("Weather response missing 'main.temp'"))?;
        let desc = data["weather"][0]["description"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Weather response missing 'weather[0].description'"))?;

        let mut text = format!("{}: {}°C, {}.", title_case(city), temp, desc);
        if let Some(humidity) = data["main"].get("humidity").filter(|v| !v.is_null()) {
            text.push_str(&format!(" Humidity: {}%.", humidity));
        }
        if let Some(wind) = data["wind"].get("speed").filter(|v| !v.is_null()) {
            text.push_str(&format!(" Wind speed: {} m/s.", wind));
        }

        Ok(FetchResult::success(text, data))
    }
}

#[async_trait]
impl CapabilityProvider for WeatherProvider {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Weather
    }

    async fn fetch(&self, city: &str, timeout: Duration) -> FetchResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return FetchResult::failure("Weather API key not configured.");
        };

        match self.request(city, api_key, timeout).await {
            Ok(result) => result,
            Err(e) => {
                error!("Weather API error: {:#}", e);
                FetchResult::failure(e.to_string())
            }
        }
    }
}
