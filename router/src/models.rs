use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::capabilities::CapabilityKind;
use crate::error::QueryError;

/// A trimmed, non-empty user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dominant information category of a turn; selects the synthesis template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Weather,
    News,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Weather => "weather",
            Category::News => "news",
        }
    }
}

/// One step of a plan. Steps that name no known action are kept as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum Action {
    FetchWeather { city: Option<String> },
    FetchNews { topic: Option<String> },
    Reply { tone: Option<String> },
    Unknown { name: String },
}

// Objects models tend to nest step parameters under.
const NESTED_PARAM_KEYS: [&str; 3] = ["args", "parameters", "params"];

// Nested parameters win over flat ones.
fn step_param(step: &Map<String, Value>, key: &str) -> Option<String> {
    NESTED_PARAM_KEYS
        .iter()
        .filter_map(|nested| step.get(*nested).and_then(Value::as_object))
        .find_map(|args| args.get(key))
        .or_else(|| step.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl Action {
    fn named(name: &str, step: &Map<String, Value>) -> Self {
        match name {
            "fetch_weather" => Action::FetchWeather {
                city: step_param(step, "city"),
            },
            "fetch_news" => Action::FetchNews {
                topic: step_param(step, "topic"),
            },
            "reply" => Action::Reply {
                tone: step_param(step, "tone"),
            },
            _ => Action::Unknown {
                name: name.to_string(),
            },
        }
    }
}

impl From<Value> for Action {
    fn from(step: Value) -> Self {
        match step {
            Value::Object(step) => match step.get("action") {
                Some(Value::String(name)) => Action::named(name, &step),
                Some(other) => Action::Unknown {
                    name: other.to_string(),
                },
                None => Action::Unknown {
                    name: String::new(),
                },
            },
            // a bare string is an action name without parameters
            Value::String(name) => Action::named(&name, &Map::new()),
            other => Action::Unknown {
                name: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Plan {
    pub plan: Vec<Action>,
    #[serde(default)]
    pub explanation: String,
}

// API Request/Response models
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub reasoning: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apis: Option<Vec<CapabilityKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ExecutionDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionDetails {
    pub explanation: String,
    pub observations: Vec<String>,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AskResponse {
    Answer(Answer),
    Error { error: String },
}

#[derive(Debug, Serialize)]
pub struct MemoryListing {
    pub entries: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
}
