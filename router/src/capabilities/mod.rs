//! External data capabilities.
//!
//! A closed set of providers, looked up by [`CapabilityKind`] in a
//! [`CapabilityRegistry`]. Whatever happens on the wire, a provider call
//! produces exactly one [`FetchResult`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::metrics::Metrics;

pub mod news;
pub mod weather;

pub use news::NewsProvider;
pub use weather::WeatherProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Weather,
    News,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Weather => "weather",
            CapabilityKind::News => "news",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CapabilityKind::Weather => "Weather API",
            CapabilityKind::News => "News API",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success { text: String, data: Value },
    Failure { error: String },
}

impl FetchResult {
    pub fn success(text: impl Into<String>, data: Value) -> Self {
        FetchResult::Success {
            text: text.into(),
            data,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        FetchResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// The text handed to the synthesizer: the summary, or the error note.
    pub fn observation(&self) -> &str {
        match self {
            FetchResult::Success { text, .. } => text,
            FetchResult::Failure { error } => error,
        }
    }
}

#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    async fn fetch(&self, parameter: &str, timeout: Duration) -> FetchResult;
}

#[derive(Clone)]
pub struct CapabilityRegistry {
    providers: HashMap<CapabilityKind, Arc<dyn CapabilityProvider>>,
    timeout: Duration,
    metrics: Metrics,
}

impl CapabilityRegistry {
    pub fn new(timeout: Duration, metrics: Metrics) -> Self {
        Self {
            providers: HashMap::new(),
            timeout,
            metrics,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn CapabilityProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub async fn fetch(&self, kind: CapabilityKind, parameter: &str) -> FetchResult {
        let result = match self.providers.get(&kind) {
            Some(provider) => {
                info!(capability = kind.as_str(), parameter, "Fetching capability data");
                match tokio::time::timeout(self.timeout, provider.fetch(parameter, self.timeout))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => FetchResult::failure(format!(
                        "{} request timed out after {}s.",
                        kind.display_name(),
                        self.timeout.as_secs()
                    )),
                }
            }
            None => FetchResult::failure(format!("{} is not available.", kind.display_name())),
        };

        match &result {
            FetchResult::Success { .. } => {
                info!(capability = kind.as_str(), parameter, "Capability fetch successful")
            }
            FetchResult::Failure { error } => {
                warn!(capability = kind.as_str(), parameter, %error, "Capability fetch failed")
            }
        }
        self.metrics.record_capability_call(kind, result.is_ok());
        result
    }
}

/// Uppercases the first letter of every alphabetic run.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
