//! Fork-join document-frequency/count/result sections, spec §4.2/§5:
//! "`[1, MaxDocumentID+1]` is split into k equal ranges, k from the
//! document-volume heuristic and the process thread cap; each worker
//! forks its own term nodes and scans its range independently; results
//! merge element-wise (`Frequency::merge`) or by partition order, since
//! ranges never overlap." Grounded on original_source
//! `FullText2/OperatorNode.cpp`'s `getDocumentFrequency`/`getSearchResult`
//! parallel sections. `rayon` drives the document-frequency/count
//! reductions the way teacher modules use it for bulk scans; `GetResult`
//! instead uses `crossbeam`'s scoped threads and channels, grounded on
//! teacher's `writer::parallel_writer::ParallelWriter`, since it hands
//! partitions back as each worker finishes rather than waiting on a
//! single reduction.

use rayon::prelude::*;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{DocumentId, DocumentScore};
use crate::fulltext::frequency::Frequency;
use crate::fulltext::operator::node::OperatorNode;
use crate::fulltext::query::Query;
use crate::fulltext::scorer::ScoreCalculatorRegistry;
use crate::fulltext::search_info::SearchInformation;

/// Splits `[1, max_document_id]` into `workers` contiguous, non-empty,
/// half-open ranges `[lo, hi)`.
fn partition_ranges(max_document_id: u32, workers: usize) -> Vec<(DocumentId, DocumentId)> {
    let workers = workers.max(1) as u32;
    if max_document_id == 0 {
        return vec![(DocumentId(1), DocumentId(1))];
    }
    let chunk = (max_document_id / workers).max(1);
    let mut ranges = Vec::new();
    let mut start = 1u32;
    for i in 0..workers {
        if start > max_document_id {
            break;
        }
        let end = if i == workers - 1 { max_document_id + 1 } else { (start + chunk).min(max_document_id + 1) };
        ranges.push((DocumentId(start), DocumentId(end)));
        start = end;
    }
    ranges
}

fn frequency_of_range(node: &mut OperatorNode, lo: DocumentId, hi: DocumentId) -> Frequency {
    match node {
        OperatorNode::TermSingle(leaf) => {
            let mut document_frequency = 0u32;
            let mut total_term_frequency = 0u64;
            let mut next = lo;
            loop {
                let d = leaf.lower_bound(next, false);
                if !d.is_defined() || d.0 >= hi.0 {
                    break;
                }
                document_frequency += 1;
                total_term_frequency += leaf.current_term_frequency() as u64;
                next = match d.0.checked_add(1) {
                    Some(n) => DocumentId(n),
                    None => break,
                };
            }
            Frequency::leaf(document_frequency, total_term_frequency)
        }
        OperatorNode::Or { children, .. }
        | OperatorNode::TermOr { children, .. }
        | OperatorNode::TermAnd { children, .. }
        | OperatorNode::TermTf { children, .. } => Frequency {
            document_frequency: 0,
            total_term_frequency: 0,
            children: children.iter_mut().map(|c| frequency_of_range(c, lo, hi)).collect(),
        },
        OperatorNode::AndNot { left, .. } | OperatorNode::Add { left, .. } => {
            Frequency { document_frequency: 0, total_term_frequency: 0, children: vec![frequency_of_range(left, lo, hi)] }
        }
        OperatorNode::Weight { operand, .. } => frequency_of_range(operand, lo, hi),
    }
}

/// `GetDocumentFrequency`: scan each partition with an independently
/// forked copy of the operator tree, then merge element-wise.
pub fn document_frequency(query: &Query, config: &Config, max_document_id: u32) -> Result<Frequency> {
    let ranges = partition_ranges(max_document_id, config.worker_count_for(max_document_id));
    let parts: Vec<Frequency> = ranges
        .par_iter()
        .map(|&(lo, hi)| {
            let mut forked = query.root.fork();
            frequency_of_range(&mut forked, lo, hi)
        })
        .collect();
    Frequency::merge_all(parts)
}

/// `GetCount`: same partitioning, but only the hit count is needed.
pub fn count(query: &Query, config: &Config, max_document_id: u32) -> u64 {
    let ranges = partition_ranges(max_document_id, config.worker_count_for(max_document_id));
    ranges
        .par_iter()
        .map(|&(lo, hi)| {
            let mut forked = query.root.fork();
            let mut n = 0u64;
            let mut next = lo;
            loop {
                let d = forked.lower_bound(next, false);
                if !d.is_defined() || d.0 >= hi.0 {
                    break;
                }
                n += 1;
                next = match d.0.checked_add(1) {
                    Some(v) => DocumentId(v),
                    None => break,
                };
            }
            n
        })
        .sum()
}

/// `GetResult`: per-partition scored hits, merged as each worker
/// completes. Workers run on a scoped thread pool and hand their
/// partition back over a channel the moment they finish, the way
/// teacher's `ParallelWriter` hands segments back to its caller rather
/// than waiting on a join barrier; since partitions never overlap,
/// reassembling strictly by partition index (not arrival order) still
/// yields ascending document ids.
pub fn result(
    query: &Query,
    registry: &ScoreCalculatorRegistry,
    search: &SearchInformation,
    config: &Config,
    max_document_id: u32,
) -> Result<Vec<(DocumentId, DocumentScore)>> {
    let ranges = partition_ranges(max_document_id, config.worker_count_for(max_document_id));
    let (tx, rx) = crossbeam::channel::bounded::<(usize, Result<Vec<(DocumentId, DocumentScore)>>)>(ranges.len());

    let scoped = crossbeam::thread::scope(|scope| {
        for (i, &(lo, hi)) in ranges.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let mut forked_query = Query { root: query.root.fork() };
                // spec §4.2: the first worker operates against the owning
                // SearchInformation; subsequent workers use independent counts.
                let worker_search = if i == 0 { None } else { Some(search.clone_for_worker()) };
                let outcome = forked_query.collect_matches(registry, worker_search.as_ref().unwrap_or(search), lo, hi);
                let _ = tx.send((i, outcome));
            });
        }
        drop(tx);

        let mut parts: Vec<Option<Result<Vec<(DocumentId, DocumentScore)>>>> = (0..ranges.len()).map(|_| None).collect();
        while let Ok((i, outcome)) = rx.recv() {
            parts[i] = Some(outcome);
        }

        let mut merged = Vec::new();
        for part in parts {
            merged.extend(part.expect("every partition reports exactly once")?);
        }
        Ok(merged)
    });

    match scoped {
        Ok(outcome) => outcome,
        Err(_) => panic!("a GetResult worker thread panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulltext::operator::node::{MatchMode, PostingList, TermLeaf};
    use crate::fulltext::search_info::IndexType;
    use std::sync::Arc;

    fn term_query(doc_ids: &[u32]) -> Query {
        Query {
            root: OperatorNode::TermSingle(TermLeaf::new(
                "x",
                MatchMode::ExactWord,
                "Tf",
                None,
                Arc::new(PostingList::from_doc_ids(doc_ids.iter().copied())),
            )),
        }
    }

    #[test]
    fn partition_ranges_cover_the_whole_span_without_overlap() {
        let ranges = partition_ranges(1000, 4);
        assert_eq!(ranges.first().unwrap().0, DocumentId(1));
        assert_eq!(ranges.last().unwrap().1, DocumentId(1001));
        for w in ranges.windows(2) {
            assert_eq!(w[0].1, w[1].0);
        }
    }

    #[test]
    fn parallel_document_frequency_matches_the_full_posting_list() {
        let query = term_query(&[1, 50, 200, 400, 999]);
        let config = Config::default();
        let freq = document_frequency(&query, &config, 1000).unwrap();
        assert_eq!(freq.document_frequency, 5);
    }

    #[test]
    fn parallel_count_matches_document_frequency() {
        let query = term_query(&[3, 7, 900]);
        let config = Config::default();
        assert_eq!(count(&query, &config, 1000), 3);
    }

    #[test]
    fn parallel_result_is_sorted_by_document_id() {
        let query = term_query(&[3, 7, 900]);
        let config = Config::default();
        let registry = ScoreCalculatorRegistry::new();
        let search = SearchInformation::new(IndexType::Word, 1000);
        let hits = result(&query, &registry, &search, &config, 1000).unwrap();
        let ids: Vec<u32> = hits.iter().map(|(d, _)| d.0).collect();
        assert_eq!(ids, vec![3, 7, 900]);
    }
}
