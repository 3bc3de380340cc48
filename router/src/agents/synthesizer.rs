// Synthesizer Agent: Blends memory, the query and fetched facts into one answer

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::llm::{complete_within, LlmClient};
use crate::memory::MemoryContext;
use crate::models::{Category, Query};

pub const APOLOGY: &str = "Sorry, I could not generate a complete answer right now.";
const NO_FACTS: &str = "No factual data available.";

pub struct SynthesisRequest<'a> {
    pub query: &'a Query,
    pub context: &'a MemoryContext,
    pub facts: Option<&'a str>,
    pub category: Category,
    pub tone: Option<&'a str>,
}

pub struct SynthesizerAgent {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl SynthesizerAgent {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Never fails: a model error yields [`APOLOGY`].
    pub async fn synthesize(&self, request: SynthesisRequest<'_>) -> String {
        info!(
            "Synthesizer: Answering '{}' as {}",
            request.query,
            request.category.as_str()
        );
        let prompt = build_prompt(&request);

        match complete_within(self.llm.as_ref(), &prompt, self.timeout).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("Synthesizer: LLM error combining factual data: {}", e);
                APOLOGY.to_string()
            }
        }
    }
}

fn base_prompt(category: Category) -> &'static str {
    match category {
        Category::Weather => {
            "You are a helpful assistant. The user asked a question about the weather.\n\
             Use the following factual weather data to generate a short, conversational answer."
        }
        Category::News => {
            "You are an AI assistant. The user asked for news or updates.\n\
             Summarize the factual news items given below into a natural, coherent answer."
        }
        Category::General => "You are a helpful assistant answering general questions.",
    }
}

fn build_prompt(request: &SynthesisRequest<'_>) -> String {
    let facts = request
        .facts
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(NO_FACTS);
    let tone = match request.tone.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tone) => format!(" Answer in a {} tone.", tone),
        None => String::new(),
    };

    format!(
        "{base}\n\n{context}\n\nCurrent user query: \"{query}\"\n\n\
         Factual data (from API):\n{facts}\n\n\
         Please provide a clear answer (2 to 4 sentences).{tone} \
         If the user refers to something from previous queries (like \"that place\", \"it\", \"there\"), \
         use the context from previous queries to understand what they mean.",
        base = base_prompt(request.category),
        context = request.context,
        query = request.query,
    )
}
