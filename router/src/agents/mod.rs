pub mod classifier;
pub mod executor;
pub mod planner;
pub mod synthesizer;

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::capabilities::CapabilityRegistry;
use crate::config::Timeouts;
use crate::llm::LlmClient;
use crate::memory::ConversationMemory;
use crate::metrics::{Metrics, QueryPath};
use crate::models::{Answer, AskResponse, ExecutionDetails, Query};

use classifier::ClassifierAgent;
use executor::ExecutorAgent;
use planner::PlannerAgent;
use synthesizer::SynthesizerAgent;

/// Per-query pipeline: record, plan, then execute or fall back.
pub struct QueryRouter {
    memory: ConversationMemory,
    planner: PlannerAgent,
    synthesizer: SynthesizerAgent,
    capabilities: CapabilityRegistry,
    metrics: Metrics,
}

impl QueryRouter {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        capabilities: CapabilityRegistry,
        memory: ConversationMemory,
        timeouts: Timeouts,
        metrics: Metrics,
    ) -> Self {
        Self {
            memory,
            planner: PlannerAgent::new(llm.clone(), timeouts.planner),
            synthesizer: SynthesizerAgent::new(llm, timeouts.synthesis),
            capabilities,
            metrics,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    #[instrument(skip(self, raw), fields(request_id = %Uuid::new_v4()))]
    pub async fn submit(&self, raw: &str) -> AskResponse {
        let query = match Query::new(raw) {
            Ok(query) => query,
            Err(e) => {
                self.metrics.record_query(QueryPath::Rejected);
                return AskResponse::Error {
                    error: e.to_string(),
                };
            }
        };

        self.memory.record(&query);
        info!(
            "Added query to memory. Total queries in memory: {}",
            self.memory.len()
        );

        let started = Instant::now();
        let context = self.memory.context();

        let answer = match self.planner.generate(&query, &context).await {
            Some(plan) => {
                self.metrics.record_query(QueryPath::Planner);
                let outcome = ExecutorAgent::new(&self.capabilities, &self.synthesizer)
                    .run(&plan, &query, &context)
                    .await;
                let used: Vec<_> = outcome.trace.used.iter().copied().collect();
                Answer {
                    reasoning: outcome.reasoning,
                    answer: outcome.answer,
                    apis: (!used.is_empty()).then_some(used),
                    details: Some(ExecutionDetails {
                        explanation: plan.explanation,
                        observations: outcome.trace.observations,
                        category: outcome.trace.category,
                    }),
                }
            }
            None => {
                info!("No usable plan, falling back to keyword classification");
                self.metrics.record_query(QueryPath::Fallback);
                ClassifierAgent::new(&self.capabilities, &self.synthesizer)
                    .answer(&query, &context)
                    .await
            }
        };

        info!(
            "Processed query in {:.2}s | reasoning={}",
            started.elapsed().as_secs_f64(),
            answer.reasoning
        );
        AskResponse::Answer(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilityKind;
    use crate::models::Category;
    use crate::testing::{registry_with, ScriptedLlm, StaticProvider};

    struct Harness {
        router: QueryRouter,
        llm: Arc<ScriptedLlm>,
        weather: Arc<StaticProvider>,
        news: Arc<StaticProvider>,
        metrics: Metrics,
    }

    fn harness(llm: ScriptedLlm, weather: StaticProvider) -> Harness {
        let llm = Arc::new(llm);
        let weather = Arc::new(weather);
        let news = Arc::new(StaticProvider::ok(CapabilityKind::News, "📰 Story — Wire (u)"));
        let metrics = Metrics::new().unwrap();
        let router = QueryRouter::new(
            llm.clone(),
            registry_with(&weather, &news),
            ConversationMemory::new(5),
            Timeouts::default(),
            metrics.clone(),
        );
        Harness {
            router,
            llm,
            weather,
            news,
            metrics,
        }
    }

    fn sunny() -> StaticProvider {
        StaticProvider::ok(
            CapabilityKind::Weather,
            "Paris: 18°C, clear sky. Humidity: 60%.",
        )
    }

    fn answer(response: AskResponse) -> Answer {
        match response {
            AskResponse::Answer(answer) => answer,
            AskResponse::Error { error } => panic!("unexpected error: {error}"),
        }
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_anything_else() {
        let h = harness(ScriptedLlm::new(["unused"]), sunny());
        h.router.memory().record(&Query::new("weather in Rome").unwrap());

        let response = h.router.submit("   ").await;
        assert_eq!(
            response,
            AskResponse::Error {
                error: "Please provide a non-empty query.".into()
            }
        );
        assert_eq!(h.router.memory().list().entries, vec!["weather in Rome"]);
        assert_eq!(h.llm.call_count(), 0);
        assert_eq!(h.metrics.query_count(QueryPath::Rejected), 1);
    }

    #[tokio::test]
    async fn valid_plan_is_executed() {
        let plan = r#"{"plan": [{"action": "fetch_weather", "city": "Paris"}, {"action": "fetch_news", "topic": "france"}, {"action": "reply", "tone": "friendly"}], "explanation": "weather and news"}"#;
        let h = harness(ScriptedLlm::new([plan, "Sunny in Paris, and here is the news."]), sunny());

        let answer = answer(h.router.submit("weather and news for Paris").await);
        assert_eq!(answer.answer, "Sunny in Paris, and here is the news.");
        assert_eq!(answer.reasoning, "Used: Weather API, News API");
        assert_eq!(
            answer.apis,
            Some(vec![CapabilityKind::Weather, CapabilityKind::News])
        );
        let details = answer.details.unwrap();
        assert_eq!(details.category, Category::Weather);
        assert_eq!(details.explanation, "weather and news");
        assert_eq!(details.observations.len(), 2);
        assert_eq!(h.weather.calls(), vec!["Paris"]);
        assert_eq!(h.news.calls(), vec!["france"]);
        assert_eq!(h.metrics.query_count(QueryPath::Planner), 1);
    }

    #[tokio::test]
    async fn planner_outage_falls_back_to_keywords() {
        let h = harness(
            ScriptedLlm::from_script([None, Some("It's 18°C and clear in Paris.".to_string())]),
            sunny(),
        );

        let answer = answer(h.router.submit("weather in Paris").await);
        assert_eq!(h.weather.calls(), vec!["paris"]);
        assert_eq!(answer.answer, "It's 18°C and clear in Paris.");
        assert!(answer.reasoning.contains("Weather API"));
        assert_eq!(answer.apis, Some(vec![CapabilityKind::Weather]));
        assert!(answer.details.is_none());

        let synthesis_prompt = &h.llm.prompts()[1];
        assert!(synthesis_prompt.contains("Paris: 18°C, clear sky. Humidity: 60%."));
        assert!(synthesis_prompt.contains("about the weather"));
        assert_eq!(h.metrics.query_count(QueryPath::Fallback), 1);
    }

    #[tokio::test]
    async fn json_without_plan_key_falls_back() {
        let h = harness(
            ScriptedLlm::new([r#"{"answer": "just weather"}"#, "fallback answer"]),
            sunny(),
        );

        let answer = answer(h.router.submit("weather in Paris").await);
        assert_eq!(answer.answer, "fallback answer");
        assert_eq!(h.weather.calls(), vec!["paris"]);
        assert_eq!(h.metrics.query_count(QueryPath::Fallback), 1);
    }

    #[tokio::test]
    async fn planner_sees_the_current_query_in_memory() {
        let h = harness(
            ScriptedLlm::new([r#"{"plan": []}"#, "a", r#"{"plan": []}"#, "b"]),
            sunny(),
        );

        h.router.submit("weather in Rome").await;
        h.router.submit("and what about there tomorrow?").await;

        let prompts = h.llm.prompts();
        assert!(prompts[2].contains("1. and what about there tomorrow?\n2. weather in Rome"));
        assert_eq!(h.router.memory().list().count, 2);
    }

    #[tokio::test]
    async fn failed_weather_fetch_is_answered_conversationally() {
        let h = harness(
            ScriptedLlm::from_script([None, Some("I couldn't reach the weather service.".to_string())]),
            StaticProvider::err(CapabilityKind::Weather, "Weather API key not configured."),
        );

        let answer = answer(h.router.submit("weather in Paris").await);
        assert_eq!(answer.answer, "I couldn't reach the weather service.");
        assert!(h.llm.prompts()[1].contains("Weather API key not configured."));
    }
}
