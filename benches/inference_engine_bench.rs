use criterion::{black_box, criterion_group, criterion_main, Criterion};

use featuremap::FeatureMap;
use inference_engine::{EngineLimits, InferenceEngine};
use sstruct::{Nucleotide, Sequence, SStruct};

fn random_sequence(length: usize, seed: u64) -> Sequence {
    let bases = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::U];
    let mut state = seed.max(1);
    let nucleotides = (0..length)
        .map(|_| {
            // xorshift64, good enough for a deterministic benchmark fixture.
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            bases[(state % 4) as usize]
        })
        .collect();
    Sequence::new(nucleotides)
}

fn viterbi_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference_engine");
    for &length in &[20usize, 50, 80] {
        let sequence = random_sequence(length, 0xA5A5_5A5A + length as u64);
        let example = SStruct::new(sequence);

        group.bench_function(format!("compute_viterbi_{length}"), |b| {
            b.iter(|| {
                let mut engine = InferenceEngine::new(false, EngineLimits::default());
                engine.load_sequence(&example).unwrap();
                engine.load_values(FeatureMap::default(), vec![0.1; 8192], None).unwrap();
                engine.compute_viterbi().unwrap();
                black_box(engine.viterbi_score());
            });
        });
    }
    group.finish();
}

fn inside_outside_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference_engine");
    for &length in &[20usize, 40] {
        let sequence = random_sequence(length, 0x1234_5678 + length as u64);
        let example = SStruct::new(sequence);

        group.bench_function(format!("compute_inside_outside_{length}"), |b| {
            b.iter(|| {
                let mut engine = InferenceEngine::new(false, EngineLimits::default());
                engine.load_sequence(&example).unwrap();
                engine.load_values(FeatureMap::default(), vec![0.1; 8192], None).unwrap();
                engine.compute_viterbi().unwrap();
                engine.compute_inside().unwrap();
                engine.compute_outside().unwrap();
                engine.compute_posterior().unwrap();
                black_box(engine.compute_log_partition_coefficient());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, viterbi_benchmark, inside_outside_benchmark);
criterion_main!(benches);
