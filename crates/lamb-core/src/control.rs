//! Lock-free parameter handoff from a control thread to the audio callback.
//!
//! The control thread stores into the shared blocks at any time; the audio
//! callback calls `apply` once per buffer before [`Module::process`]. Every
//! parameter is one atomic word loaded with `Ordering::Relaxed`, so a read
//! can be stale but never torn. The skip mask travels as a single byte for
//! the same reason.
//!
//! Step button presses are counted rather than flagged: each press advances
//! exactly once even if several land within one buffer. At most
//! [`MAX_PRESSES_PER_BUFFER`] are applied per buffer; the rest stay queued.
//!
//! ```rust
//! use lamb_core::{Module, ModuleControls};
//!
//! let controls = ModuleControls::new();
//! let mut module = Module::new();
//!
//! // Control thread
//! controls.lfo(0).set_frequency(4.0);
//! controls.sequencer.set_skip_mask(0b0000_0010);
//! controls.sequencer.press_step();
//!
//! // Audio thread, start of buffer
//! controls.apply(&mut module);
//! assert_eq!(module.current_step(), 2);
//! assert!((module.channel(0).free_frequency() - 4.0).abs() < 1e-6);
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use libm::roundf;

use crate::clock_sync::ClockRatio;
use crate::lfo::{FrequencyRange, LfoShape};
use crate::module::{LFO_COUNT, LfoChannel, Module};
use crate::param_info::{FrequencyControl, ParamDescriptor};
use crate::sequence::NUM_STEPS;
use crate::sequencer::unpack_mask;
use crate::step_sequencer::{StepSequencer, TriggerMode};

/// `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    /// New atomic holding `value`.
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    /// Current value.
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Replace the value.
    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Replace the value, returning the previous one.
    #[inline]
    pub fn swap(&self, value: f32) -> f32 {
        f32::from_bits(self.bits.swap(value.to_bits(), Ordering::Relaxed))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Shared parameters of one LFO channel.
#[derive(Debug)]
pub struct LfoControls {
    frequency: AtomicF32,
    duty: AtomicF32,
    shape: AtomicU8,
    range: AtomicU8,
    external_clock: AtomicBool,
    ratio: AtomicU8,
    /// Pending phase jump; NaN when none is pending
    phase_request: AtomicF32,
}

impl Default for LfoControls {
    fn default() -> Self {
        Self::from_channel(&LfoChannel::default())
    }
}

impl LfoControls {
    /// Controls mirroring the current settings of `channel`.
    pub fn from_channel(channel: &LfoChannel) -> Self {
        let lfo = channel.lfo();
        Self {
            frequency: AtomicF32::new(channel.free_frequency()),
            duty: AtomicF32::new(lfo.duty()),
            shape: AtomicU8::new(lfo.shape().index()),
            range: AtomicU8::new(range_index(lfo.range())),
            external_clock: AtomicBool::new(channel.external_clock()),
            ratio: AtomicU8::new(channel.ratio().index() as u8),
            phase_request: AtomicF32::new(f32::NAN),
        }
    }

    /// Free-running frequency in Hz.
    pub fn set_frequency(&self, hz: f32) {
        self.frequency.store(hz);
    }

    /// Duty cycle in `[0, 1]`.
    pub fn set_duty(&self, duty: f32) {
        self.duty.store(duty);
    }

    /// FREQ knob at normalized `position`. Sets a frequency or a clock
    /// ratio depending on the current RANGE and external clock settings.
    pub fn set_frequency_knob(&self, position: f32) {
        let range = range_from_index(self.range.load(Ordering::Relaxed));
        let external = self.external_clock.load(Ordering::Relaxed);
        match FrequencyControl::resolve(position, range, external) {
            FrequencyControl::Hertz(hz) => self.set_frequency(hz),
            FrequencyControl::Ratio(ratio) => self.set_ratio(ratio),
        }
    }

    /// DUTY knob at normalized `position`.
    pub fn set_duty_knob(&self, position: f32) {
        self.set_duty(ParamDescriptor::duty_cycle().denormalize(position));
    }

    /// Waveform shape.
    pub fn set_shape(&self, shape: LfoShape) {
        self.shape.store(shape.index(), Ordering::Relaxed);
    }

    /// RANGE switch.
    pub fn set_range(&self, range: FrequencyRange) {
        self.range.store(range_index(range), Ordering::Relaxed);
    }

    /// External clock on/off.
    pub fn set_external_clock(&self, enabled: bool) {
        self.external_clock.store(enabled, Ordering::Relaxed);
    }

    /// Clock ratio.
    pub fn set_ratio(&self, ratio: ClockRatio) {
        self.ratio.store(ratio.index() as u8, Ordering::Relaxed);
    }

    /// Request a phase jump, applied once at the next buffer.
    pub fn request_phase(&self, phase: f32) {
        self.phase_request.store(phase);
    }

    /// Push the latest values into `channel`.
    pub fn apply(&self, channel: &mut LfoChannel) {
        channel.set_frequency(self.frequency.load());
        channel.set_duty(self.duty.load());
        channel.set_shape(LfoShape::from_index(self.shape.load(Ordering::Relaxed)));
        channel.set_range(range_from_index(self.range.load(Ordering::Relaxed)));
        channel.set_external_clock(self.external_clock.load(Ordering::Relaxed));
        if let Some(ratio) = ClockRatio::from_index(usize::from(self.ratio.load(Ordering::Relaxed))) {
            channel.set_ratio(ratio);
        }
        let phase = self.phase_request.swap(f32::NAN);
        if !phase.is_nan() {
            channel.lfo_mut().set_phase(phase);
        }
    }
}

/// Step presses applied by one [`SequencerControls::apply`] call.
pub const MAX_PRESSES_PER_BUFFER: u32 = NUM_STEPS as u32;

/// Shared parameters of the sequencer voice.
#[derive(Debug)]
pub struct SequencerControls {
    rate: AtomicF32,
    skip_mask: AtomicU8,
    sequence: AtomicU8,
    trigger_mode: AtomicU8,
    /// Step presses not yet applied
    pending_steps: AtomicU32,
}

impl Default for SequencerControls {
    fn default() -> Self {
        Self::from_sequencer(&StepSequencer::default())
    }
}

impl SequencerControls {
    /// Controls mirroring the current settings of `voice`.
    pub fn from_sequencer(voice: &StepSequencer) -> Self {
        let seq = voice.sequencer();
        Self {
            rate: AtomicF32::new(voice.rate()),
            skip_mask: AtomicU8::new(seq.skip_bits()),
            sequence: AtomicU8::new(seq.sequence_kind().index() as u8),
            trigger_mode: AtomicU8::new(voice.trigger_mode().index()),
            pending_steps: AtomicU32::new(0),
        }
    }

    /// Internal clock rate in Hz.
    pub fn set_rate(&self, hz: f32) {
        self.rate.store(hz);
    }

    /// RATE knob at normalized `position`, logarithmic over 0.1-10 Hz.
    pub fn set_rate_knob(&self, position: f32) {
        self.set_rate(ParamDescriptor::sequencer_rate().denormalize(position));
    }

    /// Whole skip mask, bit `i` = step `i`.
    pub fn set_skip_mask(&self, bits: u8) {
        self.skip_mask.store(bits, Ordering::Relaxed);
    }

    /// Flip one step's skip flag. Ignored past step 7.
    pub fn toggle_skip(&self, step: usize) {
        if step < NUM_STEPS {
            self.skip_mask.fetch_xor(1 << step, Ordering::Relaxed);
        }
    }

    /// Current skip mask bits.
    pub fn skip_mask(&self) -> u8 {
        self.skip_mask.load(Ordering::Relaxed)
    }

    /// Sequence selector position. The reserved slot is stored but has no
    /// effect when applied.
    pub fn set_sequence_index(&self, index: u8) {
        self.sequence.store(index, Ordering::Relaxed);
    }

    /// Sequence selector at normalized `position` over all eight slots.
    pub fn set_sequence_knob(&self, position: f32) {
        let slot = roundf(ParamDescriptor::sequence_select().denormalize(position));
        self.set_sequence_index(slot as u8);
    }

    /// Trigger source.
    pub fn set_trigger_mode(&self, mode: TriggerMode) {
        self.trigger_mode.store(mode.index(), Ordering::Relaxed);
    }

    /// Register one step button press.
    pub fn press_step(&self) {
        self.pending_steps.fetch_add(1, Ordering::Relaxed);
    }

    /// Push the latest values into `voice`. Returns how many step presses
    /// were applied, never more than [`MAX_PRESSES_PER_BUFFER`].
    pub fn apply(&self, voice: &mut StepSequencer) -> u32 {
        voice.set_rate(self.rate.load());
        voice.set_trigger_mode(TriggerMode::from_index(self.trigger_mode.load(Ordering::Relaxed)));

        let seq = voice.sequencer_mut();
        seq.set_skip_mask(unpack_mask(self.skip_mask.load(Ordering::Relaxed)));
        seq.set_sequence_index(usize::from(self.sequence.load(Ordering::Relaxed)));

        let queued = self
            .pending_steps
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n - n.min(MAX_PRESSES_PER_BUFFER))
            })
            .unwrap_or_else(|n| n);
        let presses = queued.min(MAX_PRESSES_PER_BUFFER);
        for _ in 0..presses {
            seq.manual_step();
        }
        presses
    }
}

/// Shared control block for a whole [`Module`].
#[derive(Debug, Default)]
pub struct ModuleControls {
    /// Per-channel LFO controls, A to C.
    pub lfos: [LfoControls; LFO_COUNT],
    /// Sequencer controls.
    pub sequencer: SequencerControls,
}

impl ModuleControls {
    /// Controls matching a default [`Module`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls mirroring the current settings of `module`.
    pub fn from_module(module: &Module) -> Self {
        Self {
            lfos: core::array::from_fn(|i| LfoControls::from_channel(module.channel(i))),
            sequencer: SequencerControls::from_sequencer(module.sequencer()),
        }
    }

    /// Controls of channel `index`. Panics past [`LFO_COUNT`].
    pub fn lfo(&self, index: usize) -> &LfoControls {
        &self.lfos[index]
    }

    /// Push all latest values into `module`.
    pub fn apply(&self, module: &mut Module) {
        for (i, controls) in self.lfos.iter().enumerate() {
            controls.apply(module.channel_mut(i));
        }
        self.sequencer.apply(module.sequencer_mut());
    }
}

fn range_index(range: FrequencyRange) -> u8 {
    match range {
        FrequencyRange::Low => 0,
        FrequencyRange::High => 1,
    }
}

fn range_from_index(index: u8) -> FrequencyRange {
    if index == 0 {
        FrequencyRange::Low
    } else {
        FrequencyRange::High
    }
}
