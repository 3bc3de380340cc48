//! Short-term conversation memory.
//!
//! A process-wide, bounded FIFO of recent queries. The handle is cheap to
//! clone and every operation is atomic on its own, but nothing orders one
//! request's `record` against its later `context` snapshot: a concurrent
//! request may append in between, and its query will then show up in the
//! other request's prompt context.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::models::{MemoryListing, Query};

pub const EMPTY_CONTEXT: &str = "No previous queries in this session";

#[derive(Clone)]
pub struct ConversationMemory {
    capacity: usize,
    entries: Arc<Mutex<VecDeque<String>>>,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, query: &Query) {
        let mut entries = self.entries.lock();
        entries.push_back(query.as_str().to_string());
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Snapshot of the current entries, rendered on demand.
    pub fn context(&self) -> MemoryContext {
        MemoryContext {
            entries: self.entries.lock().iter().cloned().collect(),
        }
    }

    pub fn list(&self) -> MemoryListing {
        let entries: Vec<String> = self.entries.lock().iter().cloned().collect();
        MemoryListing {
            count: entries.len(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Oldest-first copy of memory taken at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryContext {
    entries: Vec<String>,
}

impl MemoryContext {
    /// Entries most-recent-first.
    pub fn recent_first(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for MemoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_CONTEXT);
        }
        writeln!(f, "Previous queries in this conversation:")?;
        for (idx, query) in self.recent_first().enumerate() {
            writeln!(f, "{}. {}", idx + 1, query)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Query {
        Query::new(text).unwrap()
    }

    #[test]
    fn keeps_only_the_most_recent_entries_in_insertion_order() {
        let memory = ConversationMemory::new(5);
        for i in 1..=8 {
            memory.record(&q(&format!("query {i}")));
        }

        let listing = memory.list();
        assert_eq!(listing.count, 5);
        assert_eq!(
            listing.entries,
            vec!["query 4", "query 5", "query 6", "query 7", "query 8"]
        );
    }

    #[test]
    fn empty_context_renders_sentinel() {
        let memory = ConversationMemory::new(5);
        assert!(memory.context().is_empty());
        assert_eq!(memory.context().to_string(), EMPTY_CONTEXT);
    }

    #[test]
    fn context_is_numbered_most_recent_first() {
        let memory = ConversationMemory::new(10);
        memory.record(&q("weather in Paris"));
        memory.record(&q("what about tomorrow there?"));

        let ctx = memory.context();
        assert_eq!(
            ctx.to_string(),
            "Previous queries in this conversation:\n\
             1. what about tomorrow there?\n\
             2. weather in Paris\n"
        );
        // rendering twice gives the same text
        assert_eq!(ctx.to_string(), ctx.to_string());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_writes() {
        let memory = ConversationMemory::new(5);
        memory.record(&q("first"));
        let ctx = memory.context();
        memory.record(&q("second"));

        assert_eq!(ctx.recent_first().collect::<Vec<_>>(), vec!["first"]);
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let memory = ConversationMemory::new(5);
        memory.record(&q("hello"));
        memory.clear();
        memory.clear();
        assert_eq!(memory.len(), 0);
        assert_eq!(memory.list().count, 0);
    }

    #[test]
    fn clones_share_the_same_store() {
        let memory = ConversationMemory::new(5);
        let handle = memory.clone();
        handle.record(&q("from another request"));
        assert_eq!(memory.list().entries, vec!["from another request"]);
    }
}
