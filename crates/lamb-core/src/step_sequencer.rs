//! Clocked step sequencer: internal clock LFO, edge detection and the
//! [`Sequencer`] state machine wired together.
//!
//! In [`TriggerMode::Internal`] a square LFO runs at the sequencer rate and
//! every rising edge of its output advances one step. In
//! [`TriggerMode::Gate`] the internal clock keeps running (so switching back
//! is seamless) but only rising edges of the external gate advance.
//!
//! Edges are stamped with the absolute sample index at which they occur, so
//! a single edge can never advance the sequencer twice.

use crate::edge::RisingEdge;
use crate::lfo::{Lfo, LfoShape};
use crate::math::constrain;
use crate::sequence::SequenceKind;
use crate::sequencer::Sequencer;

/// Slowest internal sequencer clock, in Hz.
pub const MIN_RATE_HZ: f32 = 0.1;

/// Fastest internal sequencer clock, in Hz.
pub const MAX_RATE_HZ: f32 = 10.0;

/// What advances the sequencer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriggerMode {
    /// Rising edges of the internal clock LFO.
    #[default]
    Internal,
    /// Rising edges of the external gate input.
    Gate,
}

impl TriggerMode {
    /// Mode from a stored byte (0 = internal, anything else = gate).
    pub fn from_index(index: u8) -> Self {
        if index == 0 {
            TriggerMode::Internal
        } else {
            TriggerMode::Gate
        }
    }

    /// Byte encoding of this mode.
    pub fn index(&self) -> u8 {
        match self {
            TriggerMode::Internal => 0,
            TriggerMode::Gate => 1,
        }
    }

    /// Lowercase display name.
    pub fn name(&self) -> &'static str {
        match self {
            TriggerMode::Internal => "internal",
            TriggerMode::Gate => "gate",
        }
    }
}

/// A step change produced while processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepEvent {
    /// Absolute sample index of the edge.
    pub sample_index: u64,
    /// Offset of the edge inside the current buffer.
    pub offset: usize,
    /// Step before the advance.
    pub from: usize,
    /// Step after the advance.
    pub to: usize,
}

/// Sequencer voice with its own clock.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    clock: Lfo,
    clock_edge: RisingEdge,
    gate_edge: RisingEdge,
    sequencer: Sequencer,
    mode: TriggerMode,
    /// Absolute index of the next sample to be processed
    sample_index: u64,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl StepSequencer {
    /// Internally clocked sequencer at `rate_hz`.
    pub fn new(rate_hz: f32) -> Self {
        Self::with_sequencer(rate_hz, Sequencer::new())
    }

    /// Internally clocked voice around an existing state machine.
    pub fn with_sequencer(rate_hz: f32, sequencer: Sequencer) -> Self {
        let mut clock = Lfo::new(clamp_rate(rate_hz));
        clock.set_shape(LfoShape::Square);
        clock.set_duty(0.5);
        Self {
            clock,
            clock_edge: RisingEdge::new(),
            gate_edge: RisingEdge::new(),
            sequencer,
            mode: TriggerMode::Internal,
            sample_index: 0,
        }
    }

    /// Set the internal clock rate, clamped to 0.1–10 Hz.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.clock.set_frequency(clamp_rate(rate_hz));
    }

    /// Internal clock rate in Hz.
    pub fn rate(&self) -> f32 {
        self.clock.frequency()
    }

    /// Select what advances the sequencer.
    ///
    /// Switching source clears the edge stamp, so an edge from the new
    /// source on the same sample as the last one from the old source still
    /// advances.
    pub fn set_trigger_mode(&mut self, mode: TriggerMode) {
        if mode != self.mode {
            self.sequencer.clear_edge();
            self.mode = mode;
        }
    }

    /// Current trigger source.
    pub fn trigger_mode(&self) -> TriggerMode {
        self.mode
    }

    /// The underlying state machine.
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Mutable access for skip toggles and sequence selection.
    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    /// Current step.
    pub fn current_step(&self) -> usize {
        self.sequencer.current_step()
    }

    /// Shorthand for selecting the rule.
    pub fn set_sequence_kind(&mut self, kind: SequenceKind) {
        self.sequencer.set_sequence_kind(kind);
    }

    /// Operator step button.
    pub fn manual_step(&mut self) -> usize {
        self.sequencer.manual_step()
    }

    /// Last internal clock sample.
    pub fn clock_value(&self) -> f32 {
        self.clock.value()
    }

    /// Absolute index of the next sample to be processed.
    pub fn sample_index(&self) -> u64 {
        self.sample_index
    }

    /// Feed the external gate level at the current sample position.
    ///
    /// Returns the new step when a rising edge advanced the sequencer. Always
    /// `None` in internal mode. Repeated calls within the same sample never
    /// advance twice.
    pub fn gate(&mut self, high: bool) -> Option<usize> {
        let rising = self.gate_edge.process_level(high);
        if !rising || self.mode != TriggerMode::Gate {
            return None;
        }
        Some(self.sequencer.trigger(self.sample_index))
    }

    /// Run the internal clock for one sample.
    ///
    /// Returns the step change, if the clock produced one.
    #[inline]
    pub fn tick(&mut self, sample_rate: f32) -> Option<StepEvent> {
        let index = self.sample_index;
        self.sample_index = self.sample_index.wrapping_add(1);

        let sample = self.clock.next_sample(sample_rate);
        let rising = self.clock_edge.process(sample);
        if !rising || self.mode != TriggerMode::Internal {
            return None;
        }

        let from = self.sequencer.current_step();
        let to = self.sequencer.trigger(index);
        Some(StepEvent {
            sample_index: index,
            offset: 0,
            from,
            to,
        })
    }

    /// Run one audio buffer of `frames` samples.
    ///
    /// `on_step` is called for every clock edge with its buffer offset. The
    /// internal clock waveform is written to `clock_out` when provided; it
    /// must then hold at least `frames` samples.
    pub fn process<F>(
        &mut self,
        sample_rate: f32,
        frames: usize,
        mut clock_out: Option<&mut [f32]>,
        mut on_step: F,
    ) where
        F: FnMut(StepEvent),
    {
        for offset in 0..frames {
            if let Some(mut event) = self.tick(sample_rate) {
                event.offset = offset;
                on_step(event);
            }
            if let Some(out) = clock_out.as_deref_mut()
                && let Some(slot) = out.get_mut(offset)
            {
                *slot = self.clock.value();
            }
        }
    }

    /// Restart clock and pattern from step 0.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.clock_edge.reset();
        self.gate_edge.reset();
        self.sequencer.reset();
    }
}

#[inline]
fn clamp_rate(rate_hz: f32) -> f32 {
    constrain(rate_hz, MIN_RATE_HZ, MAX_RATE_HZ)
}
