use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use qcm_core::exam::{build_exam, compute_quotas};
use qcm_core::memory::MemoryStore;
use qcm_core::model::Question;

fn lesson(prefix: &str, n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            Question::new(
                format!("{prefix} {i}"),
                vec!["a".into(), "b".into(), "c".into(), "d".into()],
                [i % 4],
            )
            .unwrap()
        })
        .collect()
}

fn bench_quotas(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_quotas");

    group.bench_function("5_lessons_exam_20", |b| {
        let sizes = [12, 30, 8, 45, 20];
        b.iter(|| compute_quotas(black_box(&sizes), black_box(20)))
    });

    group.bench_function("40_lessons_exam_40", |b| {
        let sizes: Vec<usize> = (0..40).map(|i| 5 + i % 7).collect();
        b.iter(|| compute_quotas(black_box(&sizes), black_box(40)))
    });

    group.finish();
}

fn bench_build_exam(c: &mut Criterion) {
    let store = (0..6).fold(MemoryStore::new(), |store, i| {
        let name = format!("lesson-{i}");
        let questions = lesson(&name, 50 + i * 10);
        store.with_lesson("bench", &name, questions)
    });
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("build_exam_40", |b| {
        b.iter(|| build_exam(&store, black_box("bench"), black_box(40), &mut rng))
    });
}

criterion_group!(benches, bench_quotas, bench_build_exam);
criterion_main!(benches);
