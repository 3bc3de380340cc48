// Planner Agent: Turns a user query into a structured action plan

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm::{complete_within, LlmClient};
use crate::memory::MemoryContext;
use crate::models::{Plan, Query};

pub struct PlannerAgent {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl PlannerAgent {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Returns `None` when the model gives nothing usable: a normal outcome that
    /// sends the query down the keyword fallback.
    pub async fn generate(&self, query: &Query, context: &MemoryContext) -> Option<Plan> {
        info!("Planner: Building plan for query: {}", query);
        let prompt = build_prompt(query, context);

        let response = match complete_within(self.llm.as_ref(), &prompt, self.timeout).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Planner: model call failed, no plan: {}", e);
                return None;
            }
        };

        let plan = parse_plan(&response);
        match &plan {
            Some(plan) => info!(
                "Planner: {} action(s) planned: {}",
                plan.plan.len(),
                plan.explanation
            ),
            None => debug!("Planner: unusable model output: {}", response),
        }
        plan
    }
}

fn build_prompt(query: &Query, context: &MemoryContext) -> String {
    format!(
        r#"You are a planning assistant that decides how to answer a user's query.
You may use these actions:
- fetch_weather: get current weather. Parameters: {{"city": "<city name>"}}
- fetch_news: get the latest news articles. Parameters: {{"topic": "<topic>"}}
- reply: finish and answer the user. Parameters: {{"tone": "<tone of the answer>"}}

Use only the actions you need, in order, and end with reply.
If the user refers to something from previous queries (like "that place", "it", "there"), resolve it from the conversation context.

{context}

Current user query: "{query}"

Respond with ONLY a JSON object of this shape, with no other text:
{{"plan": [{{"action": "fetch_weather", "city": "Paris"}}, {{"action": "reply", "tone": "friendly"}}], "explanation": "<why this plan>"}}"#
    )
}

/// Tolerant plan parsing: the whole text, else the outermost `{...}` span.
pub fn parse_plan(response: &str) -> Option<Plan> {
    let trimmed = response.trim();
    let value = serde_json::from_str::<Value>(trimmed)
        .ok()
        .or_else(|| {
            let start = trimmed.find('{')?;
            let end = trimmed.rfind('}')?;
            if end < start {
                return None;
            }
            serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
        })?;

    match value.get("plan") {
        Some(plan) if value.is_object() && !plan.is_null() => {}
        _ => return None,
    }
    serde_json::from_value(value).ok()
}
