use std::sync::Arc;

use cascadedb::physical::mmap_backend::MmapPhysicalFile;
use cascadedb::physical::page_manager::PhysicalFile;
use cascadedb::vector::{FileIdentifier, VectorFile};
use cascadedb::vector::open_option::OpenOption;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

fn identifier() -> FileIdentifier {
    let mut id = FileIdentifier::new();
    id.set("FieldNumber", "1").set("FieldType.0", "4"); // one Float64 column
    id
}

fn open_file(dir: &tempfile::TempDir) -> VectorFile {
    let file: Arc<dyn PhysicalFile> = Arc::new(MmapPhysicalFile::create(dir.path().join("bench.vec"), 4096).unwrap());
    VectorFile::create(file, identifier()).unwrap()
}

fn bench_single_insert(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let vector_file = open_file(&dir);

    c.bench_function("vector_file_single_insert", |b| {
        let mut key = 0u32;
        b.iter(|| {
            vector_file
                .insert(&vec![cascadedb::vector::Value::UInt32(key), cascadedb::vector::Value::Float64(key as f64)], false)
                .unwrap();
            key += 1;
        });
    });
}

fn bench_batch_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_file_batch_insert");

    for batch_size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), batch_size, |b, &batch_size| {
            let dir = tempfile::tempdir().unwrap();
            let vector_file = open_file(&dir);
            let mut key_counter = 0u32;

            b.iter(|| {
                for _ in 0..batch_size {
                    vector_file
                        .insert(&vec![cascadedb::vector::Value::UInt32(key_counter), cascadedb::vector::Value::Float64(key_counter as f64)], true)
                        .unwrap();
                    key_counter += 1;
                }
                vector_file.flush().unwrap();
            });
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let vector_file = open_file(&dir);
    let mut rng = rand::thread_rng();
    for key in 0..1000u32 {
        // column payload is randomized rather than mirroring the key, so the
        // scan touches realistically varied block contents instead of a
        // perfectly predictable access pattern.
        let payload: f64 = rng.gen_range(0.0..1.0);
        vector_file.insert(&vec![cascadedb::vector::Value::UInt32(key), cascadedb::vector::Value::Float64(payload)], false).unwrap();
    }

    c.bench_function("vector_file_full_scan", |b| {
        b.iter(|| {
            vector_file.reset();
            let mut count = 0u32;
            while let Some(tuple) = vector_file.get_next(&OpenOption::scan()).unwrap() {
                black_box(&tuple);
                count += 1;
            }
            black_box(count);
        });
    });
}

criterion_group!(benches, bench_single_insert, bench_batch_insert, bench_scan);
criterion_main!(benches);
