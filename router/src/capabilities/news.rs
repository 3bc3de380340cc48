// News capability: latest articles for a topic from NewsAPI

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::error;

use super::{CapabilityKind, CapabilityProvider, FetchResult};

const PAGE_SIZE: usize = 3;

pub struct NewsProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl NewsProvider {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    async fn request(&self, topic: &str, api_key: &str, timeout: Duration) -> Result<FetchResult> {
        let page_size = PAGE_SIZE.to_string();
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", topic),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ])
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
            return Ok(FetchResult::failure(format!("News API error: {}", msg)));
        }

        let articles = data["articles"].as_array().cloned().unwrap_or_default();
        if articles.is_empty() {
            return Ok(FetchResult::failure("No news articles found."));
        }

        let summaries: Vec<String> = articles
            .iter()
            .take(PAGE_SIZE)
            .filter_map(|art| {
                let title = art["title"].as_str()?;
                let source = art["source"]["name"].as_str()?;
                let url = art["url"].as_str().unwrap_or("");
                Some(format!("📰 {} — {} ({})", title, source, url))
            })
            .collect();

        Ok(FetchResult::success(summaries.join("\n"), Value::Array(articles)))
    }
}

#[async_trait]
impl CapabilityProvider for NewsProvider {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::News
    }

    async fn fetch(&self, topic: &str, timeout: Duration) -> FetchResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return FetchResult::failure("News API key not configured.");
        };

        match self.request(topic, api_key, timeout).await {
            Ok(result) => result,
            Err(e) => {
                error!("News API error: {:#}", e);
                FetchResult::failure(e.to_string())
            }
        }
    }
}
