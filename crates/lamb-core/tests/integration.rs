//! Integration tests for lamb-core.
//!
//! Exercises the public API the way the audio callback and control surface
//! use it: waveform measurements over whole periods, clock lock and loss,
//! every sequence rule against its reference pattern, and the assembled
//! module driven buffer by buffer.

use lamb_core::{
    ClockRatio, ClockSync, Lfo, LfoShape, Module, ModuleControls, NUM_STEPS, SequenceKind,
    Sequencer, StepPins, StepSequencer, TriggerMode, dac_code,
};

const SAMPLE_RATE: f32 = 48000.0;

fn advance_n(seq: &mut Sequencer, count: usize) -> Vec<usize> {
    (0..count).map(|_| seq.advance()).collect()
}

// ============================================================================
// 1. Oscillator
// ============================================================================

#[test]
fn square_duty_cycle_matches_high_fraction() {
    // 100 Hz at 48 kHz: 480 samples per period
    for &duty in &[0.1, 0.25, 0.5, 0.75, 0.9] {
        let mut lfo = Lfo::new(100.0);
        lfo.set_duty(duty);
        let mut buffer = vec![0.0_f32; 480];
        lfo.generate(SAMPLE_RATE, &mut buffer);

        let high = buffer.iter().filter(|&&v| v == 1.0).count() as f32;
        let expected = duty * 480.0;
        assert!(
            (high - expected).abs() <= 1.0,
            "duty {duty}: {high} high samples, expected {expected}"
        );
    }
}

#[test]
fn triangle_is_continuous_across_breakpoint() {
    let mut lfo = Lfo::new(50.0);
    lfo.set_shape(LfoShape::Triangle);
    lfo.set_duty(0.3);
    let mut buffer = vec![0.0_f32; 960 * 3];
    lfo.generate(SAMPLE_RATE, &mut buffer);

    // Steepest slope is the rising segment: 1 / (0.3 * 960) per sample
    let max_step = 1.0 / (0.3 * 960.0) + 1e-4;
    for pair in buffer.windows(2) {
        let jump = (pair[1] - pair[0]).abs();
        // Includes the wrap from the falling ramp back to 0
        assert!(jump <= max_step, "jump {jump} exceeds {max_step}");
    }
}

#[test]
fn generate_is_seamless_across_buffer_sizes() {
    let mut whole = Lfo::new(3.7);
    whole.set_shape(LfoShape::Triangle);
    let mut split = whole.clone();

    let mut a = vec![0.0_f32; 4096];
    whole.generate(SAMPLE_RATE, &mut a);

    let mut b = vec![0.0_f32; 4096];
    let mut offset = 0;
    for size in [1, 63, 64, 500, 1024, 2444] {
        split.generate(SAMPLE_RATE, &mut b[offset..offset + size]);
        offset += size;
    }
    assert_eq!(offset, 4096);
    assert_eq!(a, b);
}

#[test]
fn parameter_changes_between_buffers_stay_in_range() {
    let mut lfo = Lfo::new(1.0);
    let mut buffer = [0.0_f32; 64];
    for i in 0..100 {
        lfo.set_frequency(i as f32 * 37.0);
        lfo.set_duty(i as f32 / 50.0 - 0.5);
        lfo.set_shape(LfoShape::from_index((i % 2) as u8));
        lfo.generate(SAMPLE_RATE, &mut buffer);
        assert!(buffer.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!((0.0..1.0).contains(&lfo.phase()));
    }
}

// ============================================================================
// 2. Clock sync
// ============================================================================

#[test]
fn clock_locks_then_loses_on_long_gap() {
    let mut clock = ClockSync::new();
    assert!(!clock.on_pulse(0.0));
    assert!(clock.on_pulse(0.5));
    assert_eq!(clock.measured_period(), Some(0.5));

    assert!(!clock.on_pulse(25.5));
    assert!(!clock.is_valid());
    assert_eq!(clock.measured_period(), Some(0.5));
    assert_eq!(clock.effective_frequency(), None);

    // Re-armed by the next pulse pair
    assert!(clock.on_pulse(26.0));
}

#[test]
fn ratio_lookup_against_one_hertz_clock() {
    let mut clock = ClockSync::new();
    clock.on_pulse(3.0);
    clock.on_pulse(4.0);

    clock.set_ratio_index(8);
    assert!((clock.effective_frequency().unwrap() - 1.0).abs() < 1e-6);
    clock.set_ratio_index(9);
    assert!((clock.effective_frequency().unwrap() - 2.0).abs() < 1e-6);
    clock.set_ratio_index(0);
    assert!((clock.effective_frequency().unwrap() - 1.0 / 9.0).abs() < 1e-6);
    assert_eq!(clock.current_ratio(), ClockRatio::Div9);
}

// ============================================================================
// 3. Sequencer rules
// ============================================================================

#[test]
fn every_rule_matches_reference_pattern() {
    let cases: [(SequenceKind, [usize; 8]); 6] = [
        (SequenceKind::Up, [1, 2, 3, 4, 5, 6, 7, 0]),
        (SequenceKind::Down, [7, 6, 5, 4, 3, 2, 1, 0]),
        (SequenceKind::UpDown, [1, 2, 3, 4, 5, 6, 7, 6]),
        (SequenceKind::PlusTwoMinusOne, [2, 1, 3, 2, 4, 3, 5, 4]),
        (SequenceKind::PlusOneMinusTwo, [1, 7, 0, 6, 7, 5, 6, 4]),
        (SequenceKind::MinusThreePlusFive, [5, 2, 7, 4, 1, 6, 3, 0]),
    ];
    for (kind, expected) in cases {
        let mut seq = Sequencer::new();
        seq.set_sequence_kind(kind);
        assert_eq!(advance_n(&mut seq, 8), expected.to_vec(), "{}", kind.name());
    }
}

#[test]
fn up_down_flips_only_at_ends() {
    let mut seq = Sequencer::new();
    seq.set_sequence_kind(SequenceKind::UpDown);
    let steps = advance_n(&mut seq, 30);
    let mut forward = true;
    let mut prev = 0;
    for step in steps {
        let rising = step == (prev + 1) % NUM_STEPS;
        if rising != forward {
            assert!(prev == 0 || prev == 7, "turned at {prev}");
            forward = rising;
        }
        prev = step;
    }
}

#[test]
fn skip_and_all_skipped_hold() {
    let mut seq = Sequencer::new();
    seq.set_skip_mask([false, true, false, false, false, false, false, false]);
    assert_eq!(seq.advance(), 2);

    seq.set_skip_mask([true; NUM_STEPS]);
    for _ in 0..5 {
        assert_eq!(seq.advance(), 2);
    }
}

#[test]
fn current_step_never_skipped_for_any_rule() {
    let mask = [false, true, true, false, false, true, false, true];
    for kind in SequenceKind::ALL {
        let mut seq = Sequencer::with_seed(99);
        seq.set_skip_mask(mask);
        seq.set_sequence_kind(kind);
        for _ in 0..200 {
            let step = seq.advance();
            // Holding on the start step is allowed; landing on a skip is not
            assert!(step == 0 || !mask[step], "{} landed on {step}", kind.name());
        }
    }
}

#[test]
fn sequence_change_resets_direction_mid_pattern() {
    let mut seq = Sequencer::new();
    seq.set_sequence_kind(SequenceKind::UpDown);
    advance_n(&mut seq, 9);
    assert!(!seq.is_direction_forward());

    seq.set_sequence_kind(SequenceKind::PlusOneMinusTwo);
    assert!(seq.is_direction_forward());
    let from = seq.current_step();
    assert_eq!(seq.advance(), (from + 1) % NUM_STEPS);
}

// ============================================================================
// 4. Voice and module
// ============================================================================

#[test]
fn gate_mode_advances_once_per_edge() {
    let mut voice = StepSequencer::new(10.0);
    voice.set_trigger_mode(TriggerMode::Gate);

    let mut seen = Vec::new();
    for level in [false, true, true, true, false, false, true, false, true] {
        if let Some(step) = voice.gate(level) {
            seen.push(step);
        }
        voice.tick(SAMPLE_RATE);
    }
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn module_drives_pins_and_dac() {
    let mut module = Module::new();
    module.sequencer_mut().set_rate(10.0);
    module.sequencer_mut().set_sequence_kind(SequenceKind::Down);

    let mut a = vec![0.0_f32; 480];
    let mut b = vec![0.0_f32; 480];
    let mut c = vec![0.0_f32; 480];
    let mut pins = Vec::new();
    for _ in 0..95 {
        module.process(SAMPLE_RATE, [&mut a[..], &mut b[..], &mut c[..]], |event| {
            pins.push(StepPins::encode(event.to));
        });
        for &v in &a {
            assert!(dac_code(v) == 0 || dac_code(v) == 4095);
        }
    }
    // Ten edges in 0.95 s, starting 7, 6, ...
    assert_eq!(pins.len(), 10);
    assert_eq!(pins[0], [true, true, true]);
    assert_eq!(pins[1], [false, true, true]);
}

#[test]
fn controls_applied_from_another_thread() {
    use std::sync::Arc;

    let controls = Arc::new(ModuleControls::new());
    let writer = Arc::clone(&controls);
    std::thread::spawn(move || {
        writer.lfo(2).set_frequency(25.0);
        writer.sequencer.set_sequence_index(1);
        writer.sequencer.press_step();
    })
    .join()
    .unwrap();

    let mut module = Module::new();
    controls.apply(&mut module);
    assert_eq!(module.current_step(), 7);
    assert!((module.channel(2).free_frequency() - 25.0).abs() < 1e-6);
}
