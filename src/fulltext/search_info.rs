//! `SearchInformation`, spec §3/§5: per-search context shared read-mostly
//! among worker copies. "A copy shares the term map (non-owning) but has
//! independent counts — used per worker thread."

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Dual,
    Word,
    Ngram,
}

/// One `TermMap` slot: `{qtf, df, ttf, done, termNode}` minus the term
/// node pointer, which lives in the operator tree itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermEntry {
    pub query_term_frequency: u32,
    pub document_frequency: u32,
    pub total_term_frequency: u64,
    pub done: bool,
}

pub type TermMap = HashMap<String, TermEntry>;

/// Per-search context. The owning instance allocates its own `TermMap`;
/// `clone_for_worker` hands out a reference-counted, non-owning copy with
/// independent document counters, matching the parallel sections' "each
/// worker mutates only its own cloned nodes, not the shared term map"
/// rule (spec §5).
pub struct SearchInformation {
    term_map: Arc<RwLock<TermMap>>,
    owns_term_map: bool,
    pub document_count: u32,
    pub total_document_length: u64,
    pub average_document_length: f64,
    pub total_document_frequency: u32,
    pub index_type: IndexType,
    pub normalized: bool,
}

impl SearchInformation {
    pub fn new(index_type: IndexType, document_count: u32) -> Self {
        SearchInformation {
            term_map: Arc::new(RwLock::new(HashMap::new())),
            owns_term_map: true,
            document_count,
            total_document_length: 0,
            average_document_length: 0.0,
            total_document_frequency: 0,
            index_type,
            normalized: false,
        }
    }

    /// Worker copy used inside one parallel section; per spec §4.2, the
    /// first worker thread does not copy at all (it runs against the
    /// owning `SearchInformation` directly) — callers should reserve
    /// this for workers after the first.
    pub fn clone_for_worker(&self) -> Self {
        SearchInformation {
            term_map: self.term_map.clone(),
            owns_term_map: false,
            document_count: self.document_count,
            total_document_length: self.total_document_length,
            average_document_length: self.average_document_length,
            total_document_frequency: self.total_document_frequency,
            index_type: self.index_type,
            normalized: self.normalized,
        }
    }

    pub fn owns_term_map(&self) -> bool {
        self.owns_term_map
    }

    pub fn term_entry(&self, term: &str) -> Option<TermEntry> {
        self.term_map.read().get(term).cloned()
    }

    pub fn set_term_entry(&self, term: &str, entry: TermEntry) {
        self.term_map.write().insert(term.to_string(), entry);
    }

    /// Only valid between parallel sections (spec §5: "writes to [the
    /// term map] occur only between parallel sections").
    pub fn terms_needing_measurement(&self, limit: usize) -> Vec<String> {
        self.term_map
            .read()
            .iter()
            .filter(|(_, e)| !e.done)
            .take(limit)
            .map(|(term, _)| term.clone())
            .collect()
    }
}
