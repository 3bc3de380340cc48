//! In-process doubles for the model and the capability providers.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::capabilities::{CapabilityKind, CapabilityProvider, CapabilityRegistry, FetchResult};
use crate::llm::{LlmClient, LlmError};
use crate::metrics::Metrics;

/// Replies with queued responses in order and records every prompt.
/// `None` entries fail the call; an empty queue fails too.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedLlm {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_script(responses.into_iter().map(|r| Some(r.into())))
    }

    pub fn from_script(script: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            responses: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self::from_script([])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.lock().pop_front() {
            Some(Some(text)) => Ok(text),
            Some(None) | None => Err(LlmError::Http("scripted failure".to_string())),
        }
    }
}

/// Returns the same result for every call and records the parameters.
pub struct StaticProvider {
    kind: CapabilityKind,
    result: FetchResult,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl StaticProvider {
    pub fn ok(kind: CapabilityKind, text: &str) -> Self {
        Self::returning(kind, FetchResult::success(text, Value::Null))
    }

    pub fn err(kind: CapabilityKind, error: &str) -> Self {
        Self::returning(kind, FetchResult::failure(error))
    }

    pub fn returning(kind: CapabilityKind, result: FetchResult) -> Self {
        Self {
            kind,
            result,
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CapabilityProvider for StaticProvider {
    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    async fn fetch(&self, parameter: &str, _timeout: Duration) -> FetchResult {
        self.calls.lock().push(parameter.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

pub fn registry_with(
    weather: &Arc<StaticProvider>,
    news: &Arc<StaticProvider>,
) -> CapabilityRegistry {
    CapabilityRegistry::new(Duration::from_secs(1), Metrics::new().expect("metrics"))
        .with_provider(weather.clone())
        .with_provider(news.clone())
}
