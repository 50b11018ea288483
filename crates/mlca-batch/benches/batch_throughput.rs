use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion};
use mlca_batch::{load_plan, run_plan, RunOpts};
use tempfile::tempdir;

fn bench_batch(c: &mut Criterion) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../plans/smoke.yaml");
    let plan = load_plan(&path).expect("load plan");

    c.bench_function("batch_smoke_serial", |b| {
        b.iter(|| {
            let dir = tempdir().expect("bench dir");
            run_plan(&plan, dir.path(), &RunOpts::default()).expect("bench run");
        });
    });
    c.bench_function("batch_smoke_parallel", |b| {
        b.iter(|| {
            let dir = tempdir().expect("bench dir");
            run_plan(&plan, dir.path(), &RunOpts { concurrency: 4 }).expect("bench run");
        });
    });
}

criterion_group!(benches, bench_batch);
criterion_main!(benches);
