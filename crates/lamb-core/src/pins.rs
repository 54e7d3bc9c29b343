//! Bit encodings for the hardware around the core.
//!
//! - Step output drives a 3-to-8 decoder with active-high inputs.
//! - Sequence selection is read from an 8-to-3 priority encoder whose
//!   outputs are active-low.
//! - LFO outputs go to a 12-bit DAC.
//!
//! All pin arrays are LSB first: `pins[0]` is bit 0.

use crate::math::constrain;
use crate::sequence::NUM_STEPS;

/// Highest code of the 12-bit DAC.
pub const DAC_MAX: u16 = 4095;

/// Active-high step index for the step decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPins;

impl StepPins {
    /// Pin levels selecting `step`. Only the low three bits are used.
    pub fn encode(step: usize) -> [bool; 3] {
        core::array::from_fn(|bit| step & (1 << bit) != 0)
    }

    /// Step index selected by `pins`.
    pub fn decode(pins: [bool; 3]) -> usize {
        pins.iter()
            .enumerate()
            .fold(0, |acc, (bit, &high)| if high { acc | (1 << bit) } else { acc })
            % NUM_STEPS
    }
}

/// Active-low sequence selector from the priority encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorPins;

impl SelectorPins {
    /// Selector position from raw pin levels. Bits are inverted.
    ///
    /// ```rust
    /// use lamb_core::SelectorPins;
    ///
    /// // All pins high: nothing asserted, position 0
    /// assert_eq!(SelectorPins::decode([true, true, true]), 0);
    /// assert_eq!(SelectorPins::decode([false, true, false]), 5);
    /// ```
    pub fn decode(pins: [bool; 3]) -> usize {
        pins.iter()
            .enumerate()
            .fold(0, |acc, (bit, &high)| if high { acc } else { acc | (1 << bit) })
    }

    /// Raw pin levels reporting position `index`.
    pub fn encode(index: usize) -> [bool; 3] {
        core::array::from_fn(|bit| index & (1 << bit) == 0)
    }
}

/// DAC code for a `[0, 1]` sample, rounded to nearest.
///
/// Out-of-range and NaN samples are clamped.
pub fn dac_code(sample: f32) -> u16 {
    let scaled = constrain(sample, 0.0, 1.0) * f32::from(DAC_MAX);
    libm::roundf(scaled) as u16
}
