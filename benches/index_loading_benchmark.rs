use std::sync::Arc;

use cascadedb::core::config::Config;
use cascadedb::core::types::VectorKey;
use cascadedb::fulltext::operator::node::{MatchMode, PostingList, TermLeaf};
use cascadedb::fulltext::{parallel, OperatorNode, Query, ScoreCalculatorRegistry, SearchInformation};
use cascadedb::fulltext::search_info::IndexType;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const MAX_DOCUMENT_ID: u32 = 200_000;

fn even_postings() -> Arc<PostingList> {
    Arc::new(PostingList::from_doc_ids((1..=MAX_DOCUMENT_ID).step_by(2)))
}

fn bench_document_frequency(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("fulltext_parallel_document_frequency");

    for workers in [1, 2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, &workers| {
            let mut cfg = config.clone();
            cfg.max_df_workers = workers;
            let query = Query {
                root: OperatorNode::TermSingle(TermLeaf::new("term", MatchMode::ExactWord, "Tf", None, even_postings())),
            };
            b.iter(|| {
                let freq = parallel::document_frequency(&query, &cfg, MAX_DOCUMENT_ID).unwrap();
                black_box(freq.document_frequency);
            });
        });
    }
    group.finish();
}

fn bench_parallel_result(c: &mut Criterion) {
    let config = Config::default();
    let registry = ScoreCalculatorRegistry::new();
    let search = SearchInformation::new(IndexType::Word, MAX_DOCUMENT_ID);

    c.bench_function("fulltext_parallel_result", |b| {
        let query = Query { root: OperatorNode::TermSingle(TermLeaf::new("term", MatchMode::ExactWord, "Tf", None, even_postings())) };
        b.iter(|| {
            let hits = parallel::result(&query, &registry, &search, &config, MAX_DOCUMENT_ID).unwrap();
            black_box(hits.len());
        });
    });
}

fn bench_operator_fork(c: &mut Criterion) {
    let postings = even_postings();
    c.bench_function("operator_node_fork", |b| {
        let node = OperatorNode::TermSingle(TermLeaf::new("term", MatchMode::ExactWord, "Tf", None, postings.clone()));
        b.iter(|| {
            let forked = node.fork();
            black_box(forked.current_doc());
        });
    });
}

criterion_group!(benches, bench_document_frequency, bench_parallel_result, bench_operator_fork);
criterion_main!(benches);

#[allow(dead_code)]
fn unused_key_reference() -> VectorKey {
    VectorKey(0)
}
