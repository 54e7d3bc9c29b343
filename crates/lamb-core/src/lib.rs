//! Lamb Core - LFO and step sequencer engine for a modular voice
//!
//! This crate holds the real-time parts of the module: phase-accumulator
//! LFOs with duty-cycle shaping, external clock measurement with
//! division/multiplication ratios, and an 8-step sequencer with selectable
//! progression rules and per-step skip.
//!
//! # Core Abstractions
//!
//! ## Oscillators
//!
//! - [`Lfo`] - Square/triangle LFO, normalized `[0, 1]` output
//! - [`LfoChannel`] - LFO plus its free-running and clock-sync settings
//!
//! ## Clock
//!
//! - [`ClockSync`] - Pulse period measurement with a 20 s loss timeout
//! - [`ClockRatio`] - The 17 ratios from ÷9 to ×9
//!
//! ## Sequencer
//!
//! - [`Sequencer`] - Step state machine (current step, skip mask, direction phase)
//! - [`SequenceKind`] - The stepping rules in selector order
//! - [`StepSequencer`] - Sequencer driven by its own clock LFO or a gate
//! - [`RisingEdge`] - Low-to-high transition detector
//!
//! ## Integration
//!
//! - [`Module`] - Three LFOs sharing one clock, plus the sequencer
//! - [`ModuleControls`] - Lock-free parameter handoff from a control thread
//! - [`StepPins`], [`SelectorPins`], [`dac_code`] - Hardware encodings
//!
//! ## Utilities
//!
//! - Scaling: [`scale_to_range`], [`scale_to_range_log`], [`expo_map`], etc.
//! - Parameter metadata: [`ParamDescriptor`], [`FrequencyControl`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! lamb-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use lamb_core::{LfoShape, Module, SequenceKind};
//!
//! let mut module = Module::new();
//! module.channel_mut(1).set_shape(LfoShape::Triangle);
//! module.sequencer_mut().set_sequence_kind(SequenceKind::UpDown);
//!
//! let mut a = [0.0_f32; 256];
//! let mut b = [0.0_f32; 256];
//! let mut c = [0.0_f32; 256];
//! let mut steps = Vec::new();
//! module.process(48000.0, [&mut a[..], &mut b[..], &mut c[..]], |event| steps.push(event.to));
//!
//! assert!(b.iter().all(|v| (0.0..=1.0).contains(v)));
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations or locks in the audio callback
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Never fails at run time**: Bad inputs are clamped or ignored

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock_sync;
pub mod control;
pub mod edge;
pub mod lfo;
pub mod math;
pub mod module;
pub mod param_info;
pub mod pins;
pub mod rng;
pub mod sequence;
pub mod sequencer;
pub mod step_sequencer;

// Re-export main types at crate root
pub use clock_sync::{CLOCK_RATIO_COUNT, CLOCK_TIMEOUT_SECS, ClockRatio, ClockSync, RATIO_LABELS};
pub use control::{
    AtomicF32, LfoControls, MAX_PRESSES_PER_BUFFER, ModuleControls, SequencerControls,
};
pub use edge::{DEFAULT_THRESHOLD, RisingEdge};
pub use lfo::{FrequencyRange, Lfo, LfoShape, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ, shape_value};
pub use math::{
    constrain, expo_map, lerp, scale_to_range, scale_to_range_log, scale_to_range_out_log,
    snap_to_step,
};
pub use module::{CHANNEL_NAMES, LFO_COUNT, LfoChannel, Module};
pub use param_info::{FrequencyControl, ParamDescriptor, ParamScale, ParamUnit};
pub use pins::{DAC_MAX, SelectorPins, StepPins, dac_code};
pub use rng::Rng;
pub use sequence::{NUM_STEPS, SEQUENCE_NAMES, SEQUENCE_SLOTS, SequenceKind};
pub use sequencer::{MAX_PROBES, Sequencer, pack_mask, unpack_mask};
pub use step_sequencer::{MAX_RATE_HZ, MIN_RATE_HZ, StepEvent, StepSequencer, TriggerMode};
