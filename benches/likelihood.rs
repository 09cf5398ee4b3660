use criterion::{criterion_group, criterion_main, Criterion};
use pnga_core::{repair_genes, AdjacencyMatrix, LikelihoodEvaluator, Paradigm, ReplicateSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_likelihood(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let data = ReplicateSet::synthetic(&mut rng, 3, 10, 12, 3, 0.8).unwrap();
    let mut genes = AdjacencyMatrix::random(&mut rng, 12, 20);
    repair_genes(&mut genes, &mut rng).unwrap();

    for paradigm in [Paradigm::Cotemporal, Paradigm::NextStepOne, Paradigm::NextStepOneTwo] {
        let evaluator = LikelihoodEvaluator::new(&data, paradigm).unwrap();
        c.bench_function(&format!("log_likelihood_12x12_{}", paradigm.selector()), |b| {
            b.iter(|| evaluator.log_likelihood(&genes))
        });
    }
}

fn bench_repair(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let sparse = AdjacencyMatrix::random(&mut rng, 12, 5);
    let dense = AdjacencyMatrix::random(&mut rng, 12, 60);

    c.bench_function("repair_12x12_sparse", |b| {
        b.iter(|| {
            let mut g = sparse.clone();
            repair_genes(&mut g, &mut rng)
        })
    });

    c.bench_function("repair_12x12_dense", |b| {
        b.iter(|| {
            let mut g = dense.clone();
            repair_genes(&mut g, &mut rng)
        })
    });
}

criterion_group!(benches, bench_likelihood, bench_repair);
criterion_main!(benches);
