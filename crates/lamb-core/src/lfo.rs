//! Low Frequency Oscillator with variable duty cycle.
//!
//! A phase accumulator produces a normalized `[0.0, 1.0]` control signal in
//! one of two shapes. The DUTY parameter sets the pulse width of the square
//! and the symmetry of the triangle, so the triangle can be swept all the way
//! into a rising ramp (duty 1) or a falling sawtooth (duty 0).
//!
//! Phase persists between [`Lfo::generate`] calls, so the output is
//! continuous across arbitrary buffer sizes and sample rates.

use crate::math::constrain;
use libm::floorf;

/// Lowest frequency the oscillator will run at, in Hz.
pub const MIN_FREQUENCY_HZ: f32 = 0.05;

/// Highest frequency the oscillator will run at, in Hz.
pub const MAX_FREQUENCY_HZ: f32 = 2000.0;

/// Floor applied to the triangle segment denominators.
///
/// Keeps duty 0 and duty 1 finite: they degenerate to a pure ramp instead of
/// dividing by zero.
pub const DUTY_EPSILON: f32 = 1e-6;

/// Output waveform shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoShape {
    /// Pulse wave; duty sets the fraction of the period spent high.
    #[default]
    Square,
    /// Rise over `[0, duty)`, fall over `[duty, 1)`.
    Triangle,
}

impl LfoShape {
    /// Shape from the SHAPE switch value (0 = square, anything else = triangle).
    pub fn from_index(index: u8) -> Self {
        if index == 0 {
            LfoShape::Square
        } else {
            LfoShape::Triangle
        }
    }

    /// SHAPE switch value for this shape.
    pub fn index(&self) -> u8 {
        match self {
            LfoShape::Square => 0,
            LfoShape::Triangle => 1,
        }
    }

    /// Lowercase display name.
    pub fn name(&self) -> &'static str {
        match self {
            LfoShape::Square => "square",
            LfoShape::Triangle => "triangle",
        }
    }
}

/// RANGE switch position.
///
/// Selects which frequency span the FREQ knob covers. It has no effect on the
/// waveform itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrequencyRange {
    /// 0.05 Hz to 10 Hz.
    #[default]
    Low,
    /// 10 Hz to 2000 Hz.
    High,
}

impl FrequencyRange {
    /// `(min, max)` frequency in Hz covered by the FREQ knob.
    pub fn bounds(&self) -> (f32, f32) {
        match self {
            FrequencyRange::Low => (MIN_FREQUENCY_HZ, 10.0),
            FrequencyRange::High => (10.0, MAX_FREQUENCY_HZ),
        }
    }

    /// Lowercase display name.
    pub fn name(&self) -> &'static str {
        match self {
            FrequencyRange::Low => "low",
            FrequencyRange::High => "high",
        }
    }
}

/// Phase-accumulator LFO.
///
/// # Example
///
/// ```rust
/// use lamb_core::{Lfo, LfoShape};
///
/// let mut lfo = Lfo::new(2.0);
/// lfo.set_shape(LfoShape::Triangle);
/// lfo.set_duty(0.25);
///
/// let mut buffer = [0.0; 128];
/// lfo.generate(48000.0, &mut buffer);
/// assert!(buffer.iter().all(|&v| (0.0..=1.0).contains(&v)));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Frequency in Hz, within [MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ]
    frequency: f32,
    /// Duty cycle [0.0, 1.0]
    duty: f32,
    shape: LfoShape,
    range: FrequencyRange,
    /// Most recent output sample
    value: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Lfo {
    /// Create a square LFO at `freq_hz` with 50% duty.
    pub fn new(freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            frequency: clamp_frequency(freq_hz),
            duty: 0.5,
            shape: LfoShape::Square,
            range: FrequencyRange::Low,
            value: 0.0,
        }
    }

    /// Set frequency in Hz, clamped to the device range.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = clamp_frequency(freq_hz);
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set duty cycle, clamped to `[0, 1]`.
    pub fn set_duty(&mut self, duty: f32) {
        self.duty = constrain(duty, 0.0, 1.0);
    }

    /// Current duty cycle.
    pub fn duty(&self) -> f32 {
        self.duty
    }

    /// Set waveform shape.
    pub fn set_shape(&mut self, shape: LfoShape) {
        self.shape = shape;
    }

    /// Current waveform shape.
    pub fn shape(&self) -> LfoShape {
        self.shape
    }

    /// Set the RANGE switch position.
    pub fn set_range(&mut self, range: FrequencyRange) {
        self.range = range;
    }

    /// Current RANGE switch position.
    pub fn range(&self) -> FrequencyRange {
        self.range
    }

    /// Jump to a phase position. Values outside `[0, 1)` wrap.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = if phase.is_finite() { wrap_phase(phase) } else { 0.0 };
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase and output to zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.value = 0.0;
    }

    /// Last sample produced.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance by one sample and return the new output.
    ///
    /// A non-positive or non-finite sample rate holds the previous output
    /// without moving the phase.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return self.value;
        }
        self.phase += self.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            // Increments above one cycle per sample
            if self.phase >= 1.0 {
                self.phase = wrap_phase(self.phase);
            }
        }
        self.value = self.value_at_phase();
        self.value
    }

    /// Fill `output` with consecutive samples.
    ///
    /// Called once per audio buffer. Never allocates.
    pub fn generate(&mut self, sample_rate: f32, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    /// Waveform value at the current phase, without advancing.
    #[inline]
    pub fn value_at_phase(&self) -> f32 {
        shape_value(self.shape, self.phase, self.duty)
    }
}

/// Evaluate a waveform at `phase` with duty cycle `duty`.
#[inline]
pub fn shape_value(shape: LfoShape, phase: f32, duty: f32) -> f32 {
    match shape {
        LfoShape::Square => {
            if phase < duty {
                1.0
            } else {
                0.0
            }
        }
        LfoShape::Triangle => {
            let v = if phase < duty {
                phase / duty.max(DUTY_EPSILON)
            } else {
                1.0 - (phase - duty) / (1.0 - duty).max(DUTY_EPSILON)
            };
            constrain(v, 0.0, 1.0)
        }
    }
}

#[inline]
fn clamp_frequency(freq_hz: f32) -> f32 {
    constrain(freq_hz, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
}

#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - floorf(phase);
    // x - floor(x) rounds up to 1.0 for tiny negative x
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
