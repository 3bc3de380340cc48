use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::capabilities::CapabilityKind;

/// Which path produced the answer for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPath {
    Planner,
    Fallback,
    Rejected,
}

impl QueryPath {
    fn as_str(&self) -> &'static str {
        match self {
            QueryPath::Planner => "planner",
            QueryPath::Fallback => "fallback",
            QueryPath::Rejected => "rejected",
        }
    }
}

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    queries: IntCounterVec,
    capability_calls: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let queries = IntCounterVec::new(
            Opts::new("router_queries_total", "Queries handled, by answering path"),
            &["path"],
        )?;
        let capability_calls = IntCounterVec::new(
            Opts::new(
                "router_capability_calls_total",
                "Capability provider calls, by capability and outcome",
            ),
            &["capability", "outcome"],
        )?;

        registry.register(Box::new(queries.clone()))?;
        registry.register(Box::new(capability_calls.clone()))?;

        Ok(Self {
            registry,
            queries,
            capability_calls,
        })
    }

    pub fn record_query(&self, path: QueryPath) {
        self.queries.with_label_values(&[path.as_str()]).inc();
    }

    pub fn record_capability_call(&self, kind: CapabilityKind, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.capability_calls
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
    }

    #[cfg(test)]
    pub fn query_count(&self, path: QueryPath) -> u64 {
        self.queries.with_label_values(&[path.as_str()]).get()
    }

    pub fn encode(&self) -> Result<(Vec<u8>, String)> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((buffer, encoder.format_type().to_string()))
    }
}
