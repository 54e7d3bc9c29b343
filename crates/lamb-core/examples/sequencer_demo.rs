//! Sequencer demo: every stepping rule, with and without skipped steps.
//!
//! Run with: cargo run -p lamb-core --example sequencer_demo

use lamb_core::{ClockRatio, ClockSync, SequenceKind, Sequencer, StepPins};

fn pattern(kind: SequenceKind, skip: [bool; 8], count: usize) -> String {
    let mut seq = Sequencer::with_seed(1);
    seq.set_sequence_kind(kind);
    seq.set_skip_mask(skip);
    (0..count)
        .map(|_| seq.advance().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    println!("=== Sequences, no skips ===\n");
    for kind in SequenceKind::ALL {
        println!("{:>2} {:<8} {}", kind.index(), kind.name(), pattern(kind, [false; 8], 16));
    }

    let skip = [false, false, true, false, false, true, false, false];
    println!("\n=== Sequences, steps 2 and 5 skipped ===\n");
    for kind in SequenceKind::ALL {
        println!("{:>2} {:<8} {}", kind.index(), kind.name(), pattern(kind, skip, 16));
    }

    println!("\n=== Step pins ===\n");
    for step in 0..8 {
        let pins = StepPins::encode(step);
        println!("step {step}: {pins:?}");
    }

    println!("\n=== Clock ratios at 2 Hz ===\n");
    let mut clock = ClockSync::new();
    clock.on_pulse(0.0);
    clock.on_pulse(0.5);
    for ratio in ClockRatio::ALL {
        let hz = clock.frequency_for(ratio).unwrap_or(0.0);
        println!("{:>3}  {hz:>8.4} Hz", ratio.label());
    }
}
