//! The assembled module: three LFO channels sharing one external clock,
//! plus the step sequencer voice.
//!
//! [`Module::process`] is the audio callback. Per buffer it:
//!
//! 1. polls the clock for timeout,
//! 2. re-derives each channel's frequency (clock ratio when synced, free
//!    frequency otherwise),
//! 3. generates each channel into its output buffer,
//! 4. runs the sequencer clock sample by sample, reporting step changes.
//!
//! Elapsed time is counted in samples, so pulses fed through
//! [`Module::clock_pulse`] are stamped on the audio timeline.

use crate::clock_sync::{ClockRatio, ClockSync};
use crate::lfo::{FrequencyRange, Lfo, LfoShape};
use crate::param_info::FrequencyControl;
use crate::step_sequencer::{StepEvent, StepSequencer};

/// Number of LFO channels.
pub const LFO_COUNT: usize = 3;

/// Channel labels as printed on the panel.
pub const CHANNEL_NAMES: [&str; LFO_COUNT] = ["A", "B", "C"];

/// One LFO channel with its free-running and clock-sync settings.
#[derive(Debug, Clone)]
pub struct LfoChannel {
    lfo: Lfo,
    /// Frequency used when not synced, and as fallback on clock loss
    free_frequency: f32,
    external_clock: bool,
    ratio: ClockRatio,
}

impl Default for LfoChannel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LfoChannel {
    /// Free-running channel at `freq_hz`.
    pub fn new(freq_hz: f32) -> Self {
        let lfo = Lfo::new(freq_hz);
        Self {
            free_frequency: lfo.frequency(),
            lfo,
            external_clock: false,
            ratio: ClockRatio::Unity,
        }
    }

    /// Set the free-running frequency (clamped to the device range).
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.lfo.set_frequency(freq_hz);
        self.free_frequency = self.lfo.frequency();
    }

    /// Free-running frequency in Hz.
    pub fn free_frequency(&self) -> f32 {
        self.free_frequency
    }

    /// Apply a normalized FREQ knob position.
    ///
    /// Sets the free frequency on the RANGE curve, or the clock ratio when
    /// external clock is enabled.
    pub fn set_frequency_knob(&mut self, position: f32) {
        match FrequencyControl::resolve(position, self.lfo.range(), self.external_clock) {
            FrequencyControl::Hertz(hz) => self.set_frequency(hz),
            FrequencyControl::Ratio(ratio) => self.ratio = ratio,
        }
    }

    /// Enable or disable slaving to the external clock.
    pub fn set_external_clock(&mut self, enabled: bool) {
        self.external_clock = enabled;
    }

    /// Whether the channel follows the external clock.
    pub fn external_clock(&self) -> bool {
        self.external_clock
    }

    /// Select this channel's clock ratio.
    pub fn set_ratio(&mut self, ratio: ClockRatio) {
        self.ratio = ratio;
    }

    /// This channel's clock ratio.
    pub fn ratio(&self) -> ClockRatio {
        self.ratio
    }

    /// Set waveform shape.
    pub fn set_shape(&mut self, shape: LfoShape) {
        self.lfo.set_shape(shape);
    }

    /// Set duty cycle.
    pub fn set_duty(&mut self, duty: f32) {
        self.lfo.set_duty(duty);
    }

    /// Set the RANGE switch.
    pub fn set_range(&mut self, range: FrequencyRange) {
        self.lfo.set_range(range);
    }

    /// The oscillator.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    /// Mutable oscillator access.
    pub fn lfo_mut(&mut self) -> &mut Lfo {
        &mut self.lfo
    }

    /// Whether the channel is currently locked to `clock`.
    pub fn is_synced(&self, clock: &ClockSync) -> bool {
        self.external_clock && clock.is_valid()
    }

    /// Re-derive the running frequency from `clock`.
    ///
    /// Falls back to the free frequency when external clock is off or the
    /// clock is invalid. Returns the frequency now in effect.
    pub fn sync(&mut self, clock: &ClockSync) -> f32 {
        let target = if self.external_clock {
            clock.frequency_for(self.ratio).unwrap_or(self.free_frequency)
        } else {
            self.free_frequency
        };
        self.lfo.set_frequency(target);
        self.lfo.frequency()
    }
}

/// Three LFOs, a shared clock input and the step sequencer.
///
/// # Example
///
/// ```rust
/// use lamb_core::{ClockRatio, Module};
///
/// let mut module = Module::new();
/// module.channel_mut(0).set_external_clock(true);
/// module.channel_mut(0).set_ratio(ClockRatio::Mul2);
///
/// let (mut a, mut b, mut c) = ([0.0_f32; 480], [0.0_f32; 480], [0.0_f32; 480]);
/// module.clock_pulse();
/// for _ in 0..100 {
///     module.process(48000.0, [&mut a[..], &mut b[..], &mut c[..]], |_| {});
/// }
/// module.clock_pulse();
///
/// // One pulse per second, doubled
/// let hz = module.clock().frequency_for(ClockRatio::Mul2).unwrap();
/// assert!((hz - 2.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Module {
    channels: [LfoChannel; LFO_COUNT],
    clock: ClockSync,
    sequencer: StepSequencer,
    elapsed_samples: u64,
    elapsed_seconds: f64,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    /// Module with all channels at 1 Hz and the sequencer at 1 Hz.
    pub fn new() -> Self {
        Self::with_parts(
            core::array::from_fn(|_| LfoChannel::default()),
            ClockSync::new(),
            StepSequencer::default(),
        )
    }

    /// Assemble a module from configured parts.
    pub fn with_parts(
        channels: [LfoChannel; LFO_COUNT],
        clock: ClockSync,
        sequencer: StepSequencer,
    ) -> Self {
        Self {
            channels,
            clock,
            sequencer,
            elapsed_samples: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Audio callback. Fills each output with its channel's waveform and
    /// reports sequencer step changes through `on_step`.
    ///
    /// All outputs are processed for the length of the shortest one.
    pub fn process<F>(&mut self, sample_rate: f32, outputs: [&mut [f32]; LFO_COUNT], on_step: F)
    where
        F: FnMut(StepEvent),
    {
        let frames = outputs.iter().map(|o| o.len()).min().unwrap_or(0);

        self.clock.poll(self.elapsed_seconds);
        for (channel, output) in self.channels.iter_mut().zip(outputs) {
            channel.sync(&self.clock);
            channel.lfo.generate(sample_rate, &mut output[..frames]);
        }

        self.sequencer.process(sample_rate, frames, None, on_step);

        if sample_rate > 0.0 && sample_rate.is_finite() {
            self.elapsed_samples += frames as u64;
            self.elapsed_seconds += frames as f64 / f64::from(sample_rate);
        }
    }

    /// Register an external clock pulse at the current audio time.
    ///
    /// Returns whether the clock is valid afterwards.
    pub fn clock_pulse(&mut self) -> bool {
        self.clock.on_pulse(self.elapsed_seconds)
    }

    /// Register an external clock pulse at an explicit time in seconds.
    pub fn clock_pulse_at(&mut self, timestamp: f64) -> bool {
        self.clock.on_pulse(timestamp)
    }

    /// External gate level for the sequencer. Returns the new step on an
    /// accepted edge.
    pub fn gate(&mut self, high: bool) -> Option<usize> {
        self.sequencer.gate(high)
    }

    /// Operator step button.
    pub fn manual_step(&mut self) -> usize {
        self.sequencer.manual_step()
    }

    /// Current sequencer step.
    pub fn current_step(&self) -> usize {
        self.sequencer.current_step()
    }

    /// Channel `index` (0 = A). Panics past [`LFO_COUNT`].
    pub fn channel(&self, index: usize) -> &LfoChannel {
        &self.channels[index]
    }

    /// Mutable channel `index` (0 = A). Panics past [`LFO_COUNT`].
    pub fn channel_mut(&mut self, index: usize) -> &mut LfoChannel {
        &mut self.channels[index]
    }

    /// All channels.
    pub fn channels(&self) -> &[LfoChannel; LFO_COUNT] {
        &self.channels
    }

    /// Shared clock input.
    pub fn clock(&self) -> &ClockSync {
        &self.clock
    }

    /// Mutable clock input.
    pub fn clock_mut(&mut self) -> &mut ClockSync {
        &mut self.clock
    }

    /// Sequencer voice.
    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Mutable sequencer voice.
    pub fn sequencer_mut(&mut self) -> &mut StepSequencer {
        &mut self.sequencer
    }

    /// Samples processed so far.
    pub fn elapsed_samples(&self) -> u64 {
        self.elapsed_samples
    }

    /// Audio time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }
}
