//! The operator tree, spec §4.2. Design note §9: "the pure-virtual
//! pattern in the source should become a sealed variant set" — so this
//! is one `OperatorNode` enum rather than a trait-object hierarchy.
//! "Cyclic operator graphs are avoided by construction: copy-constructors
//! deep-clone children" is `OperatorNode::fork`, used to hand each
//! parallel worker its own cursor state over shared, read-only postings.

use std::sync::Arc;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocumentId, DocumentScore, UNDEFINED_DOCUMENT_ID};
use crate::fulltext::operator::combiner::Combiner;
use crate::fulltext::scorer::{arg_type, Argument, ScoreCalculator, ScoreCalculatorRegistry};
use crate::fulltext::search_info::SearchInformation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    MultiLanguage,
    StringMatch,
    ExactWord,
    WordHead,
    WordTail,
    SimpleWord,
}

impl MatchMode {
    pub fn from_code(code: char) -> Result<Self> {
        Ok(match code {
            'm' => MatchMode::MultiLanguage,
            'n' => MatchMode::StringMatch,
            'e' => MatchMode::ExactWord,
            'h' => MatchMode::WordHead,
            't' => MatchMode::WordTail,
            's' => MatchMode::SimpleWord,
            other => return Err(Error::new(ErrorKind::WrongParameter, format!("unknown match code {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Posting {
    pub doc_id: DocumentId,
    pub term_frequency: u32,
}

/// Inverted list for one term, sorted ascending by document id. Stands
/// in for the original's on-disk posting cursor; shared read-only
/// across worker forks via `Arc`.
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    pub fn new(mut postings: Vec<Posting>) -> Self {
        postings.sort_by_key(|p| p.doc_id.0);
        PostingList { postings }
    }

    pub fn from_doc_ids(doc_ids: impl IntoIterator<Item = u32>) -> Self {
        Self::new(doc_ids.into_iter().map(|id| Posting { doc_id: DocumentId(id), term_frequency: 1 }).collect())
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn total_term_frequency(&self) -> u64 {
        self.postings.iter().map(|p| p.term_frequency as u64).sum()
    }
}

/// `TermSingle`'s leaf cursor over one term's postings, spec §4.2.
pub struct TermLeaf {
    pub term: String,
    pub match_mode: MatchMode,
    pub calc_name: String,
    pub lang: Option<String>,
    postings: Arc<PostingList>,
    pos: usize,
    current: DocumentId,
    calculator: Option<Box<dyn ScoreCalculator>>,
    cached_idf: Option<f64>,
}

impl TermLeaf {
    pub fn new(
        term: impl Into<String>,
        match_mode: MatchMode,
        calc_name: impl Into<String>,
        lang: Option<String>,
        postings: Arc<PostingList>,
    ) -> Self {
        TermLeaf {
            term: term.into(),
            match_mode,
            calc_name: calc_name.into(),
            lang,
            postings,
            pos: 0,
            current: UNDEFINED_DOCUMENT_ID,
            calculator: None,
            cached_idf: None,
        }
    }

    pub fn fork(&self) -> TermLeaf {
        TermLeaf {
            term: self.term.clone(),
            match_mode: self.match_mode,
            calc_name: self.calc_name.clone(),
            lang: self.lang.clone(),
            postings: self.postings.clone(),
            pos: 0,
            current: UNDEFINED_DOCUMENT_ID,
            calculator: self.calculator.as_ref().map(|c| c.copy()),
            cached_idf: self.cached_idf,
        }
    }

    pub fn current_doc(&self) -> DocumentId {
        self.current
    }

    /// Monotonic advance contract, spec §4.2: calls with `id` no greater
    /// than the cached position return it unchanged.
    pub fn lower_bound(&mut self, id: DocumentId, _rough: bool) -> DocumentId {
        if self.current.is_defined() && self.current.0 >= id.0 {
            return self.current;
        }
        while self.pos < self.postings.postings.len() && self.postings.postings[self.pos].doc_id.0 < id.0 {
            self.pos += 1;
        }
        self.current =
            self.postings.postings.get(self.pos).map(|p| p.doc_id).unwrap_or(UNDEFINED_DOCUMENT_ID);
        self.current
    }

    pub fn current_term_frequency(&self) -> u32 {
        self.postings
            .postings
            .get(self.pos)
            .filter(|p| p.doc_id == self.current)
            .map(|p| p.term_frequency)
            .unwrap_or(0)
    }

    pub fn document_frequency(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn total_term_frequency(&self) -> u64 {
        self.postings.total_term_frequency()
    }

    fn base_args(&self, search: &SearchInformation) -> Vec<Argument> {
        vec![
            Argument::new(arg_type::DOCUMENT_LENGTH, 0.0),
            Argument::new(arg_type::AVERAGE_DOCUMENT_LENGTH, search.average_document_length),
            Argument::new(arg_type::DOCUMENT_FREQUENCY, self.document_frequency() as f64),
            Argument::new(arg_type::TOTAL_DOCUMENT_FREQUENCY, search.total_document_frequency as f64),
            Argument::new(arg_type::TOTAL_TERM_FREQUENCY, self.total_term_frequency() as f64),
        ]
    }

    fn score_with_tf(&mut self, registry: &ScoreCalculatorRegistry, search: &SearchInformation, tf: f64) -> Result<DocumentScore> {
        if self.calculator.is_none() {
            self.calculator = Some(registry.create(&self.calc_name, "")?);
        }
        let calculator = self
            .calculator
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::Unexpected, "score calculator pointer is null"))?;
        let mut args = self.base_args(search);
        args.push(Argument::new(arg_type::TERM_FREQUENCY, tf));
        let first = calculator.first_step(&args)?;
        let idf = match self.cached_idf {
            Some(v) => v,
            None => {
                let v = calculator.second_step(&args)?;
                self.cached_idf = Some(v);
                v
            }
        };
        Ok(first * idf)
    }

    pub fn get_score(&mut self, registry: &ScoreCalculatorRegistry, search: &SearchInformation) -> Result<DocumentScore> {
        let tf = self.current_term_frequency() as f64;
        self.score_with_tf(registry, search, tf)
    }
}

/// The query operator tree. One sealed variant set in place of the
/// original's pure-virtual node hierarchy (spec §9).
pub enum OperatorNode {
    Or { children: Vec<OperatorNode>, combiner: Combiner, current: DocumentId },
    AndNot { left: Box<OperatorNode>, right: Box<OperatorNode> },
    Add { left: Box<OperatorNode>, right: Box<OperatorNode>, combiner: Combiner },
    Weight { scale: f64, operand: Box<OperatorNode> },
    TermSingle(TermLeaf),
    TermAnd { children: Vec<OperatorNode>, scales: Vec<f64>, getas: Vec<f64>, combiner: Combiner, current: DocumentId },
    TermTf { children: Vec<OperatorNode>, scales: Vec<f64>, current: DocumentId },
    TermOr { children: Vec<OperatorNode>, combiner: Combiner, current: DocumentId },
}

fn lower_bound_min(children: &mut [OperatorNode], id: DocumentId, rough: bool) -> DocumentId {
    let mut min = UNDEFINED_DOCUMENT_ID;
    for child in children.iter_mut() {
        let cur = child.current_doc();
        let d = if cur.is_defined() && cur.0 >= id.0 { cur } else { child.lower_bound(id, rough) };
        if d.is_defined() && (!min.is_defined() || d.0 < min.0) {
            min = d;
        }
    }
    min
}

impl OperatorNode {
    pub fn current_doc(&self) -> DocumentId {
        match self {
            OperatorNode::Or { current, .. } => *current,
            OperatorNode::AndNot { left, .. } => left.current_doc(),
            OperatorNode::Add { left, .. } => left.current_doc(),
            OperatorNode::Weight { operand, .. } => operand.current_doc(),
            OperatorNode::TermSingle(leaf) => leaf.current_doc(),
            OperatorNode::TermAnd { current, .. } => *current,
            OperatorNode::TermTf { current, .. } => *current,
            OperatorNode::TermOr { current, .. } => *current,
        }
    }

    /// `lowerBound(searchInfo, id, rough)`, spec §4.2. `rough = true`
    /// permits positional false positives, used during estimation.
    pub fn lower_bound(&mut self, id: DocumentId, rough: bool) -> DocumentId {
        match self {
            OperatorNode::TermSingle(leaf) => leaf.lower_bound(id, rough),

            OperatorNode::Or { children, current, .. }
            | OperatorNode::TermOr { children, current, .. }
            | OperatorNode::TermTf { children, current, .. } => {
                *current = lower_bound_min(children, id, rough);
                *current
            }

            OperatorNode::AndNot { left, right } => {
                let mut target = id;
                loop {
                    let l = left.lower_bound(target, rough);
                    if !l.is_defined() {
                        return l;
                    }
                    let r = right.lower_bound(l, true);
                    if r == l {
                        target = match l.0.checked_add(1) {
                            Some(n) => DocumentId(n),
                            None => return UNDEFINED_DOCUMENT_ID,
                        };
                        continue;
                    }
                    return l;
                }
            }

            OperatorNode::Add { left, right, .. } => {
                let l = left.lower_bound(id, rough);
                if l.is_defined() {
                    right.lower_bound(l, true);
                }
                l
            }

            OperatorNode::Weight { operand, .. } => operand.lower_bound(id, rough),

            OperatorNode::TermAnd { children, current, .. } => {
                let mut target = id;
                'outer: loop {
                    if !target.is_defined() {
                        *current = UNDEFINED_DOCUMENT_ID;
                        return *current;
                    }
                    for child in children.iter_mut() {
                        let d = child.lower_bound(target, rough);
                        if !d.is_defined() {
                            *current = UNDEFINED_DOCUMENT_ID;
                            return *current;
                        }
                        if d.0 != target.0 {
                            target = d;
                            continue 'outer;
                        }
                    }
                    *current = target;
                    return target;
                }
            }
        }
    }

    pub fn get_score(&mut self, registry: &ScoreCalculatorRegistry, search: &SearchInformation) -> Result<DocumentScore> {
        match self {
            OperatorNode::TermSingle(leaf) => leaf.get_score(registry, search),

            OperatorNode::Or { children, combiner, current } | OperatorNode::TermOr { children, combiner, current } => {
                let mut acc: Option<f64> = None;
                for child in children.iter_mut() {
                    if child.current_doc() == *current {
                        let s = child.get_score(registry, search)?;
                        acc = Some(match acc {
                            None => s,
                            Some(a) => combiner.apply(a, s),
                        });
                    }
                }
                Ok(acc.unwrap_or(0.0))
            }

            OperatorNode::AndNot { left, .. } => left.get_score(registry, search),

            OperatorNode::Add { left, right, combiner } => {
                let doc = left.current_doc();
                let l = left.get_score(registry, search)?;
                if doc.is_defined() && right.current_doc() == doc {
                    let r = right.get_score(registry, search)?;
                    Ok(combiner.apply(l, r))
                } else {
                    Ok(l)
                }
            }

            OperatorNode::Weight { scale, operand } => Ok(*scale * operand.get_score(registry, search)?),

            OperatorNode::TermAnd { children, scales, getas, combiner, .. } => {
                let mut acc: Option<f64> = None;
                for (i, child) in children.iter_mut().enumerate() {
                    let s = child.get_score(registry, search)?;
                    let scaled = s * scales.get(i).copied().unwrap_or(1.0) + getas.get(i).copied().unwrap_or(0.0);
                    acc = Some(match acc {
                        None => scaled,
                        Some(a) => combiner.apply(a, scaled),
                    });
                }
                Ok(acc.unwrap_or(0.0))
            }

            OperatorNode::TermTf { children, scales, current } => {
                let mut tf_total = 0.0f64;
                let mut exemplar: Option<usize> = None;
                for (i, child) in children.iter_mut().enumerate() {
                    if child.current_doc() == *current {
                        if let OperatorNode::TermSingle(leaf) = child {
                            tf_total += leaf.current_term_frequency() as f64 * scales.get(i).copied().unwrap_or(1.0);
                            if exemplar.is_none() {
                                exemplar = Some(i);
                            }
                        }
                    }
                }
                match exemplar {
                    Some(i) => {
                        if let OperatorNode::TermSingle(leaf) = &mut children[i] {
                            leaf.score_with_tf(registry, search, tf_total)
                        } else {
                            Ok(0.0)
                        }
                    }
                    None => Ok(0.0),
                }
            }
        }
    }

    /// Estimated hit count, spec §4.2 (used for candidate cost ranking,
    /// not exact results).
    pub fn estimate_count(&self, collection_size: f64) -> f64 {
        match self {
            OperatorNode::TermSingle(leaf) => leaf.document_frequency() as f64,
            OperatorNode::Or { children, .. } | OperatorNode::TermOr { children, .. } | OperatorNode::TermTf { children, .. } => {
                let product: f64 = children
                    .iter()
                    .map(|c| 1.0 - (c.estimate_count(collection_size) / collection_size.max(1.0)))
                    .product();
                collection_size * (1.0 - product)
            }
            OperatorNode::AndNot { left, right } => {
                let left_count = left.estimate_count(collection_size);
                let right_count = right.estimate_count(collection_size);
                left_count * (1.0 - right_count / collection_size.max(1.0))
            }
            OperatorNode::Add { left, .. } => left.estimate_count(collection_size),
            OperatorNode::Weight { operand, .. } => operand.estimate_count(collection_size),
            OperatorNode::TermAnd { children, .. } => children
                .iter()
                .map(|c| c.estimate_count(collection_size))
                .fold(f64::INFINITY, f64::min)
                .min(collection_size),
        }
    }

    /// Deep-clone for a parallel worker: shares postings (`Arc`) but
    /// resets cursor state, per spec §9's copy-constructor note and
    /// §4.2's "each worker gets ... cloned term nodes".
    pub fn fork(&self) -> OperatorNode {
        match self {
            OperatorNode::TermSingle(leaf) => OperatorNode::TermSingle(leaf.fork()),
            OperatorNode::Or { children, combiner, .. } => {
                OperatorNode::Or { children: children.iter().map(OperatorNode::fork).collect(), combiner: *combiner, current: UNDEFINED_DOCUMENT_ID }
            }
            OperatorNode::TermOr { children, combiner, .. } => OperatorNode::TermOr {
                children: children.iter().map(OperatorNode::fork).collect(),
                combiner: *combiner,
                current: UNDEFINED_DOCUMENT_ID,
            },
            OperatorNode::AndNot { left, right } => {
                OperatorNode::AndNot { left: Box::new(left.fork()), right: Box::new(right.fork()) }
            }
            OperatorNode::Add { left, right, combiner } => {
                OperatorNode::Add { left: Box::new(left.fork()), right: Box::new(right.fork()), combiner: *combiner }
            }
            OperatorNode::Weight { scale, operand } => OperatorNode::Weight { scale: *scale, operand: Box::new(operand.fork()) },
            OperatorNode::TermAnd { children, scales, getas, combiner, .. } => OperatorNode::TermAnd {
                children: children.iter().map(OperatorNode::fork).collect(),
                scales: scales.clone(),
                getas: getas.clone(),
                combiner: *combiner,
                current: UNDEFINED_DOCUMENT_ID,
            },
            OperatorNode::TermTf { children, scales, .. } => OperatorNode::TermTf {
                children: children.iter().map(OperatorNode::fork).collect(),
                scales: scales.clone(),
                current: UNDEFINED_DOCUMENT_ID,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(doc_ids: &[u32]) -> OperatorNode {
        OperatorNode::TermSingle(TermLeaf::new(
            "x",
            MatchMode::ExactWord,
            "Tf",
            None,
            Arc::new(PostingList::from_doc_ids(doc_ids.iter().copied())),
        ))
    }

    #[test]
    fn lower_bound_is_monotonic_for_term_single() {
        let mut node = term(&[2, 5, 9]);
        assert_eq!(node.lower_bound(DocumentId(3), false), DocumentId(5));
        assert_eq!(node.lower_bound(DocumentId(1), false), DocumentId(5));
        assert_eq!(node.lower_bound(DocumentId(6), false), DocumentId(9));
        assert_eq!(node.lower_bound(DocumentId(10), false), UNDEFINED_DOCUMENT_ID);
    }

    #[test]
    fn or_of_a_and_empty_is_a() {
        let mut or_node = OperatorNode::Or { children: vec![term(&[1, 3, 5]), term(&[])], combiner: Combiner::Sum, current: UNDEFINED_DOCUMENT_ID };
        let mut seen = Vec::new();
        let mut id = DocumentId(0);
        loop {
            id = or_node.lower_bound(DocumentId(id.0.wrapping_add(1)), false);
            if !id.is_defined() {
                break;
            }
            seen.push(id.0);
        }
        assert_eq!(seen, vec![1, 3, 5]);
    }

    #[test]
    fn and_not_scenario_d() {
        let mut node = OperatorNode::AndNot { left: Box::new(term(&[1, 3, 5, 7])), right: Box::new(term(&[3, 7])) };
        let mut seen = Vec::new();
        let mut next = DocumentId(1);
        loop {
            let d = node.lower_bound(next, false);
            if !d.is_defined() {
                break;
            }
            seen.push(d.0);
            next = match d.0.checked_add(1) {
                Some(n) => DocumentId(n),
                None => break,
            };
        }
        assert_eq!(seen, vec![1, 5]);
    }

    #[test]
    fn term_and_restarts_from_first_child_on_mismatch() {
        let mut node = OperatorNode::TermAnd {
            children: vec![term(&[1, 4, 6]), term(&[2, 4, 6])],
            scales: vec![1.0, 1.0],
            getas: vec![0.0, 0.0],
            combiner: Combiner::Sum,
            current: UNDEFINED_DOCUMENT_ID,
        };
        assert_eq!(node.lower_bound(DocumentId(1), false), DocumentId(4));
        assert_eq!(node.lower_bound(DocumentId(5), false), DocumentId(6));
    }

    #[test]
    fn fork_resets_cursor_but_shares_postings() {
        let mut node = term(&[1, 2, 3]);
        node.lower_bound(DocumentId(2), false);
        let forked = node.fork();
        assert_eq!(forked.current_doc(), UNDEFINED_DOCUMENT_ID);
    }
}
