// Classifier Agent: Keyword intent matching used when the planner has no plan

use std::collections::BTreeSet;
use tracing::{info, warn};

use super::executor::reasoning_label;
use super::synthesizer::{SynthesisRequest, SynthesizerAgent};
use crate::capabilities::{CapabilityKind, CapabilityRegistry};
use crate::memory::MemoryContext;
use crate::models::{Answer, Category, Query};

const WEATHER_KEYWORDS: [&str; 5] = ["weather", "temperature", "rain", "snow", "forecast"];
const NEWS_KEYWORDS: [&str; 4] = ["news", "headline", "update", "report"];
const NEWS_FILLERS: [&str; 3] = ["news about", "latest news on", "news"];

pub const MISSING_CITY_ANSWER: &str = "Please specify the city you'd like the weather for.";
pub const MISSING_CITY_REASONING: &str = "Weather query detected but no city found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Weather { city: Option<String> },
    News { topic: String },
    General,
}

/// First match wins: weather, then news, then general.
pub fn classify(query: &str) -> Intent {
    let q_lower = query.to_lowercase();

    if WEATHER_KEYWORDS.iter().any(|k| q_lower.contains(k)) {
        return Intent::Weather {
            city: extract_city(&q_lower),
        };
    }
    if NEWS_KEYWORDS.iter().any(|k| q_lower.contains(k)) {
        return Intent::News {
            topic: extract_topic(&q_lower),
        };
    }
    Intent::General
}

fn strip_edges(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '?' | '.'))
}

fn extract_city(q_lower: &str) -> Option<String> {
    let (_, rest) = q_lower.split_once(" in ")?;
    let city = rest.replace("today", "").replace("now", "");
    let city = strip_edges(&city);
    (!city.is_empty()).then(|| city.to_string())
}

fn extract_topic(q_lower: &str) -> String {
    let topic = NEWS_FILLERS
        .iter()
        .fold(q_lower.to_string(), |acc, filler| acc.replace(filler, ""));
    match strip_edges(&topic) {
        "" => "general".to_string(),
        topic => topic.to_string(),
    }
}

pub struct ClassifierAgent<'a> {
    capabilities: &'a CapabilityRegistry,
    synthesizer: &'a SynthesizerAgent,
}

impl<'a> ClassifierAgent<'a> {
    pub fn new(capabilities: &'a CapabilityRegistry, synthesizer: &'a SynthesizerAgent) -> Self {
        Self {
            capabilities,
            synthesizer,
        }
    }

    pub async fn answer(&self, query: &Query, context: &MemoryContext) -> Answer {
        let (kind, parameter, category, detected) = match classify(query.as_str()) {
            Intent::Weather { city: Some(city) } => {
                info!("Classifier: Weather intent, city '{}'", city);
                (
                    Some(CapabilityKind::Weather),
                    city,
                    Category::Weather,
                    "Detected weather-related query.",
                )
            }
            Intent::Weather { city: None } => {
                warn!("Classifier: Weather query detected but no city specified");
                return Answer {
                    reasoning: MISSING_CITY_REASONING.to_string(),
                    answer: MISSING_CITY_ANSWER.to_string(),
                    apis: None,
                    details: None,
                };
            }
            Intent::News { topic } => {
                info!("Classifier: News intent, topic '{}'", topic);
                (
                    Some(CapabilityKind::News),
                    topic,
                    Category::News,
                    "Detected news-related query.",
                )
            }
            Intent::General => {
                info!("Classifier: General intent");
                (None, String::new(), Category::General, "Detected general question.")
            }
        };

        let fetched = match kind {
            Some(kind) => Some((kind, self.capabilities.fetch(kind, &parameter).await)),
            None => None,
        };

        let answer = self
            .synthesizer
            .synthesize(SynthesisRequest {
                query,
                context,
                facts: fetched.as_ref().map(|(_, result)| result.observation()),
                category,
                tone: None,
            })
            .await;

        let reasoning = match &fetched {
            Some((kind, _)) => format!("{} {}", detected, reasoning_label(&BTreeSet::from([*kind]))),
            None => format!("{} Responding via the language model.", detected),
        };
        Answer {
            reasoning,
            answer,
            apis: fetched.map(|(kind, _)| vec![kind]),
            details: None,
        }
    }
}
