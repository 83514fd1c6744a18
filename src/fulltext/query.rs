//! `Query`: parses tea syntax and resolves it against a term index into
//! a runnable `OperatorNode` tree, spec §3/§4.2. Grounded on
//! original_source `FullText2/Query.cpp`'s parse-then-build split; the
//! positional operators (`#location`/`#end`/`#window`) are accepted
//! syntactically but have no position index to act on, so they degrade
//! to their operand (see DESIGN.md).

use std::sync::Arc;

use crate::core::error::Result;
use crate::core::types::{DocumentId, DocumentScore, UNDEFINED_DOCUMENT_ID};
use crate::fulltext::frequency::Frequency;
use crate::fulltext::operator::combiner::Combiner;
use crate::fulltext::operator::node::{MatchMode, OperatorNode, PostingList, TermLeaf};
use crate::fulltext::parser::{self, TeaNode};
use crate::fulltext::scorer::ScoreCalculatorRegistry;
use crate::fulltext::search_info::SearchInformation;

/// Resolves a term to its inverted postings. Implemented by whatever
/// owns the on-disk index; kept abstract here so the operator tree
/// never depends on storage.
pub trait TermIndexProvider {
    fn postings_for(&self, term: &str, match_mode: MatchMode, lang: Option<&str>) -> Result<Arc<PostingList>>;
}

pub struct Query {
    pub root: OperatorNode,
}

impl Query {
    pub fn parse(text: &str, index: &dyn TermIndexProvider, default_calc: &str) -> Result<Query> {
        let tea = parser::parse(text)?;
        let root = Self::build(&tea, index, default_calc)?;
        Ok(Query { root })
    }

    fn build(node: &TeaNode, index: &dyn TermIndexProvider, default_calc: &str) -> Result<OperatorNode> {
        match node {
            TeaNode::AndNot(a, b) => Ok(OperatorNode::AndNot {
                left: Box::new(Self::build(a, index, default_calc)?),
                right: Box::new(Self::build(b, index, default_calc)?),
            }),

            TeaNode::And { combiner, children } => {
                let combiner = Combiner::from_name(combiner)?;
                let built = Self::build_all(children, index, default_calc)?;
                let n = built.len();
                Ok(OperatorNode::TermAnd { children: built, scales: vec![1.0; n], getas: vec![0.0; n], combiner, current: UNDEFINED_DOCUMENT_ID })
            }

            TeaNode::Or { combiner, children } => {
                let combiner = Combiner::from_name(combiner)?;
                let built = Self::build_all(children, index, default_calc)?;
                Ok(OperatorNode::Or { children: built, combiner, current: UNDEFINED_DOCUMENT_ID })
            }

            TeaNode::Scale(f, child) => {
                Ok(OperatorNode::Weight { scale: *f, operand: Box::new(Self::build(child, index, default_calc)?) })
            }

            TeaNode::Term { match_mode, calc, lang, text } => {
                let mode = MatchMode::from_code(*match_mode)?;
                let postings = index.postings_for(text, mode, lang.as_deref())?;
                let calc_name = calc.clone().unwrap_or_else(|| default_calc.to_string());
                Ok(OperatorNode::TermSingle(TermLeaf::new(text.clone(), mode, calc_name, lang.clone(), postings)))
            }

            TeaNode::Word { match_mode, text } => {
                let mode = match match_mode {
                    Some(c) => MatchMode::from_code(*c)?,
                    None => MatchMode::ExactWord,
                };
                let postings = index.postings_for(text, mode, None)?;
                Ok(OperatorNode::TermSingle(TermLeaf::new(text.clone(), mode, default_calc.to_string(), None, postings)))
            }

            TeaNode::Syn(children) => {
                let built = Self::build_all(children, index, default_calc)?;
                Ok(OperatorNode::TermOr { children: built, combiner: Combiner::Max, current: UNDEFINED_DOCUMENT_ID })
            }

            TeaNode::WordList { n, words } => {
                let built = Self::build_all(words, index, default_calc)?;
                if built.len() != *n {
                    return Err(crate::core::error::Error::new(
                        crate::core::error::ErrorKind::WrongParameter,
                        format!("wordlist declared {n} words but {} were given", built.len()),
                    ));
                }
                let len = built.len();
                Ok(OperatorNode::TermAnd { children: built, scales: vec![1.0; len], getas: vec![0.0; len], combiner: Combiner::Sum, current: UNDEFINED_DOCUMENT_ID })
            }

            TeaNode::FreeText { match_mode, lang, scale, max, text } => {
                let mode = MatchMode::from_code(*match_mode)?;
                let mut words: Vec<&str> = text.split_whitespace().collect();
                if let Some(max) = max {
                    words.truncate(*max);
                }
                let mut leaves = Vec::with_capacity(words.len());
                for w in &words {
                    let postings = index.postings_for(w, mode, lang.as_deref())?;
                    leaves.push(OperatorNode::TermSingle(TermLeaf::new(*w, mode, default_calc.to_string(), lang.clone(), postings)));
                }
                let combined = OperatorNode::TermOr { children: leaves, combiner: Combiner::Sum, current: UNDEFINED_DOCUMENT_ID };
                if (*scale - 1.0).abs() > f64::EPSILON {
                    Ok(OperatorNode::Weight { scale: *scale, operand: Box::new(combined) })
                } else {
                    Ok(combined)
                }
            }

            // No position index backs these two; they pass their operand through unchanged.
            TeaNode::Location(_, child) | TeaNode::End(_, child) => Self::build(child, index, default_calc),

            TeaNode::Window { children, .. } => {
                let built = Self::build_all(children, index, default_calc)?;
                let len = built.len();
                Ok(OperatorNode::TermAnd { children: built, scales: vec![1.0; len], getas: vec![0.0; len], combiner: Combiner::Sum, current: UNDEFINED_DOCUMENT_ID })
            }
        }
    }

    fn build_all(children: &[TeaNode], index: &dyn TermIndexProvider, default_calc: &str) -> Result<Vec<OperatorNode>> {
        children.iter().map(|c| Self::build(c, index, default_calc)).collect()
    }

    /// Enumerate matches in `[lo, hi)`, scoring each. Used directly for
    /// a single-threaded search and as the per-worker unit in
    /// `fulltext::parallel::result`.
    pub fn collect_matches(
        &mut self,
        registry: &ScoreCalculatorRegistry,
        search: &SearchInformation,
        lo: DocumentId,
        hi: DocumentId,
    ) -> Result<Vec<(DocumentId, DocumentScore)>> {
        let mut results = Vec::new();
        let mut next = lo;
        loop {
            let d = self.root.lower_bound(next, false);
            if !d.is_defined() || d.0 >= hi.0 {
                break;
            }
            let score = self.root.get_score(registry, search)?;
            results.push((d, score));
            next = match d.0.checked_add(1) {
                Some(n) => DocumentId(n),
                None => break,
            };
        }
        Ok(results)
    }

    /// The `Frequency` tree shape mirroring this query's operator tree,
    /// populated from already-built (global) leaf postings. Used by
    /// callers that want a single-threaded document frequency without
    /// going through `parallel::document_frequency`.
    pub fn frequency(&self) -> Frequency {
        frequency_shape(&self.root)
    }
}

fn frequency_shape(node: &OperatorNode) -> Frequency {
    match node {
        OperatorNode::TermSingle(leaf) => Frequency::leaf(leaf.document_frequency(), leaf.total_term_frequency()),
        OperatorNode::Or { children, .. }
        | OperatorNode::TermOr { children, .. }
        | OperatorNode::TermAnd { children, .. }
        | OperatorNode::TermTf { children, .. } => {
            Frequency { document_frequency: 0, total_term_frequency: 0, children: children.iter().map(frequency_shape).collect() }
        }
        OperatorNode::AndNot { left, .. } | OperatorNode::Add { left, .. } => {
            Frequency { document_frequency: 0, total_term_frequency: 0, children: vec![frequency_shape(left)] }
        }
        OperatorNode::Weight { operand, .. } => frequency_shape(operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeIndex {
        postings: HashMap<String, Arc<PostingList>>,
    }

    impl TermIndexProvider for FakeIndex {
        fn postings_for(&self, term: &str, _match_mode: MatchMode, _lang: Option<&str>) -> Result<Arc<PostingList>> {
            Ok(self.postings.get(term).cloned().unwrap_or_else(|| Arc::new(PostingList::default())))
        }
    }

    fn fake_index() -> FakeIndex {
        let mut postings = HashMap::new();
        postings.insert("cat".to_string(), Arc::new(PostingList::from_doc_ids([1, 3, 5])));
        postings.insert("dog".to_string(), Arc::new(PostingList::from_doc_ids([3, 5, 7])));
        FakeIndex { postings }
    }

    #[test]
    fn and_not_tea_syntax_resolves_through_the_index() {
        let index = fake_index();
        let mut query = Query::parse(r"#and-not(#term[e](cat),#term[e](dog))", &index, "Tf").unwrap();
        let registry = ScoreCalculatorRegistry::new();
        let search = SearchInformation::new(crate::fulltext::search_info::IndexType::Word, 10);
        let hits = query.collect_matches(&registry, &search, DocumentId(0), DocumentId(u32::MAX)).unwrap();
        let ids: Vec<u32> = hits.iter().map(|(d, _)| d.0).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn and_tea_syntax_intersects_both_terms() {
        let index = fake_index();
        let mut query = Query::parse(r"#and[](#term[e](cat),#term[e](dog))", &index, "Tf").unwrap();
        let registry = ScoreCalculatorRegistry::new();
        let search = SearchInformation::new(crate::fulltext::search_info::IndexType::Word, 10);
        let hits = query.collect_matches(&registry, &search, DocumentId(0), DocumentId(u32::MAX)).unwrap();
        let ids: Vec<u32> = hits.iter().map(|(d, _)| d.0).collect();
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn unknown_command_surfaces_as_wrong_parameter() {
        let index = fake_index();
        let err = Query::parse("#nope(x)", &index, "Tf").unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::WrongParameter);
    }
}
