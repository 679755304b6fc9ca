//! Benchmarks for the native hashes and circuit synthesis

use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mixer_core::crypto::{leaf_commitment, mimc_hash2, IvTable, MixerTree, Note};
use mixer_core::proof::{MixerCircuit, MixerWitness, PublicInputs};

fn bench_mimc_hash2(c: &mut Criterion) {
    let iv = Fr::from(0u64);
    let a = Fr::from(1u64);
    let b = Fr::from(2u64);

    c.bench_function("mimc_hash2", |bench| {
        bench.iter(|| black_box(mimc_hash2(black_box(&iv), black_box(&a), black_box(&b))))
    });
}

fn bench_leaf_commitment(c: &mut Criterion) {
    let secret = Fr::from(3u64);
    let wallet = Fr::from(5u64);

    c.bench_function("leaf_commitment", |bench| {
        bench.iter(|| black_box(leaf_commitment(black_box(&secret), black_box(&wallet))))
    });
}

fn bench_tree_append(c: &mut Criterion) {
    let ivs = IvTable::shared();

    c.bench_function("tree_append", |bench| {
        bench.iter_with_setup(
            || MixerTree::new(ivs),
            |mut tree| black_box(tree.append(Fr::from(42u64)).unwrap()),
        )
    });
}

fn bench_circuit_synthesis(c: &mut Criterion) {
    let ivs = IvTable::shared();
    let mut tree = MixerTree::new(ivs);
    let note = Note::new(Fr::from(3u64), Fr::from(5u64));
    let index = tree.append(*note.leaf().as_field()).unwrap();
    let path = tree.proof(index).unwrap();

    let witness = MixerWitness {
        public: PublicInputs {
            root: tree.root(),
            wallet_address: note.wallet_address,
            nullifier: *note.nullifier(ivs).as_field(),
        },
        nullifier_secret: note.secret,
        directions: path.directions,
        siblings: path.siblings,
    };

    let mut group = c.benchmark_group("circuit");
    group.sample_size(10);
    group.bench_function("synthesize_and_check", |bench| {
        bench.iter(|| {
            let cs = ConstraintSystem::<Fr>::new_ref();
            MixerCircuit::new(ivs, witness.clone())
                .generate_constraints(cs.clone())
                .unwrap();
            black_box(cs.is_satisfied().unwrap())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_mimc_hash2,
    bench_leaf_commitment,
    bench_tree_append,
    bench_circuit_synthesis
);
criterion_main!(benches);
