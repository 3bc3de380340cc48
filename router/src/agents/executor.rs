// Executor Agent: Runs a plan's actions against the capability providers

use std::collections::BTreeSet;
use tracing::{info, warn};

use super::synthesizer::{SynthesisRequest, SynthesizerAgent};
use crate::capabilities::{CapabilityKind, CapabilityRegistry};
use crate::memory::MemoryContext;
use crate::models::{Action, Category, Plan, Query};

/// Working state of one plan run.
#[derive(Debug, Default)]
pub struct ExecutionTrace {
    pub observations: Vec<String>,
    pub category: Category,
    pub used: BTreeSet<CapabilityKind>,
}

impl ExecutionTrace {
    fn record_fetch(&mut self, kind: CapabilityKind, observation: String) {
        self.observations.push(observation);
        self.used.insert(kind);
        self.category = match (self.category, kind) {
            (_, CapabilityKind::Weather) => Category::Weather,
            (Category::Weather, CapabilityKind::News) => Category::Weather,
            (_, CapabilityKind::News) => Category::News,
        };
    }

    fn facts(&self) -> Option<String> {
        if self.observations.is_empty() {
            None
        } else {
            Some(self.observations.join("\n"))
        }
    }
}

#[derive(Debug)]
pub struct ExecutionOutcome {
    pub answer: String,
    pub reasoning: String,
    pub trace: ExecutionTrace,
}

/// "Used: Weather API, News API", or "general" when nothing was called.
pub fn reasoning_label(used: &BTreeSet<CapabilityKind>) -> String {
    if used.is_empty() {
        return "general".to_string();
    }
    let names: Vec<&str> = used.iter().map(CapabilityKind::display_name).collect();
    format!("Used: {}", names.join(", "))
}

pub struct ExecutorAgent<'a> {
    capabilities: &'a CapabilityRegistry,
    synthesizer: &'a SynthesizerAgent,
}

impl<'a> ExecutorAgent<'a> {
    pub fn new(capabilities: &'a CapabilityRegistry, synthesizer: &'a SynthesizerAgent) -> Self {
        Self {
            capabilities,
            synthesizer,
        }
    }

    pub async fn run(&self, plan: &Plan, query: &Query, context: &MemoryContext) -> ExecutionOutcome {
        info!("Executor: Running {} planned action(s)", plan.plan.len());
        let mut trace = ExecutionTrace::default();
        let mut tone = None;

        for action in &plan.plan {
            match action {
                Action::FetchWeather { city } => match non_blank(city) {
                    Some(city) => {
                        let result = self.capabilities.fetch(CapabilityKind::Weather, city).await;
                        trace.record_fetch(CapabilityKind::Weather, result.observation().to_string());
                    }
                    None => trace
                        .observations
                        .push("Skipped weather lookup: no city provided.".to_string()),
                },
                Action::FetchNews { topic } => match non_blank(topic) {
                    Some(topic) => {
                        let result = self.capabilities.fetch(CapabilityKind::News, topic).await;
                        trace.record_fetch(CapabilityKind::News, result.observation().to_string());
                    }
                    None => trace
                        .observations
                        .push("Skipped news lookup: no topic provided.".to_string()),
                },
                Action::Reply { tone: reply_tone } => {
                    tone = reply_tone.as_deref();
                    break;
                }
                Action::Unknown { name } => {
                    warn!("Executor: ignoring unknown action '{}'", name);
                    trace
                        .observations
                        .push(format!("Unknown action '{}' ignored.", name));
                }
            }
        }

        let facts = trace.facts();
        let answer = self
            .synthesizer
            .synthesize(SynthesisRequest {
                query,
                context,
                facts: facts.as_deref(),
                category: trace.category,
                tone,
            })
            .await;

        ExecutionOutcome {
            answer,
            reasoning: reasoning_label(&trace.used),
            trace,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
