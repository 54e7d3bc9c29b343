//! Criterion benchmarks for lamb-core
//!
//! Run with: cargo bench -p lamb-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lamb_core::{Lfo, LfoShape, Module, SequenceKind, Sequencer, StepSequencer};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("LFO");

    let shapes = [("Square", LfoShape::Square), ("Triangle", LfoShape::Triangle)];

    for (name, shape) in &shapes {
        for &block_size in BLOCK_SIZES {
            group.bench_with_input(
                BenchmarkId::new(*name, block_size),
                &block_size,
                |b, &size| {
                    let mut lfo = Lfo::new(2.0);
                    lfo.set_shape(*shape);
                    lfo.set_duty(0.3);
                    let mut buffer = vec![0.0_f32; size];
                    b.iter(|| {
                        lfo.generate(black_box(SAMPLE_RATE), &mut buffer);
                        black_box(&buffer);
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sequencer");

    for kind in SequenceKind::ALL {
        group.bench_function(kind.name(), |b| {
            let mut seq = Sequencer::new();
            seq.set_sequence_kind(kind);
            seq.set_skip_mask([false, true, false, true, true, false, false, true]);
            b.iter(|| black_box(seq.advance()));
        });
    }

    // Worst case: probes run out every advance
    group.bench_function("exhausted_probes", |b| {
        let mut seq = Sequencer::new();
        seq.set_sequence_kind(SequenceKind::PlusTwoMinusOne);
        seq.set_skip_mask([false, true, true, true, true, true, true, false]);
        seq.set_step(7);
        b.iter(|| black_box(seq.advance()));
    });

    group.finish();
}

fn bench_step_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("StepSequencer");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, &size| {
                let mut voice = StepSequencer::new(10.0);
                b.iter(|| {
                    voice.process(SAMPLE_RATE, size, None, |e| {
                        black_box(e);
                    });
                });
            },
        );
    }

    group.finish();
}

fn bench_module(c: &mut Criterion) {
    let mut group = c.benchmark_group("Module");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, &size| {
                let mut module = Module::new();
                module.channel_mut(1).set_shape(LfoShape::Triangle);
                let mut a = vec![0.0_f32; size];
                let mut bb = vec![0.0_f32; size];
                let mut cc = vec![0.0_f32; size];
                b.iter(|| {
                    module.process(SAMPLE_RATE, [&mut a[..], &mut bb[..], &mut cc[..]], |e| {
                        black_box(e);
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lfo,
    bench_sequencer,
    bench_step_sequencer,
    bench_module,
);

criterion_main!(benches);
