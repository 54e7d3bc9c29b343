//! Parameter descriptors for control-surface mapping.
//!
//! Every control on the module (FREQ, DUTY, sequencer rate, sequence selector)
//! delivers a normalized position in `[0.0, 1.0]`. A [`ParamDescriptor`]
//! carries the range and taper that turns that position into a plain value,
//! and back again for display.
//!
//! The FREQ control is special: in free-running mode it is a logarithmic
//! frequency knob whose range depends on the RANGE switch, while in
//! external-clock mode the same knob becomes a linear selector over the 17
//! clock ratios. [`FrequencyControl::resolve`] encodes that switch.
//!
//! # Example
//!
//! ```rust
//! use lamb_core::{FrequencyControl, FrequencyRange, ParamDescriptor};
//!
//! let freq = ParamDescriptor::lfo_frequency(FrequencyRange::Low);
//! assert!((freq.denormalize(0.0) - 0.05).abs() < 1e-6);
//! assert!((freq.denormalize(1.0) - 10.0).abs() < 1e-3);
//!
//! match FrequencyControl::resolve(1.0, FrequencyRange::Low, true) {
//!     FrequencyControl::Ratio(ratio) => assert_eq!(ratio.label(), "x9"),
//!     FrequencyControl::Hertz(_) => unreachable!(),
//! }
//! ```

use crate::clock_sync::{CLOCK_RATIO_COUNT, ClockRatio};
use crate::lfo::FrequencyRange;
use crate::math::{
    constrain, lerp, scale_to_range, scale_to_range_log, scale_to_range_out_log, snap_to_step,
};
use crate::sequence::SEQUENCE_SLOTS;

/// Scaling curve for parameter normalization.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`
/// - **Stepped(n)**: linear, quantized to `n` evenly spaced positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScale {
    /// Linear mapping (default).
    #[default]
    Linear,
    /// Logarithmic mapping. More resolution at low values. Requires `min > 0`.
    Logarithmic,
    /// Discrete positions across the range (selectors, ratio switches).
    Stepped(u16),
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Frequency in Hz.
    #[default]
    Hertz,
    /// Unitless fraction in `[0, 1]`.
    Fraction,
    /// Ordinal index into a table.
    Index,
}

impl ParamUnit {
    /// Short unit suffix for displays.
    pub fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Hertz => " Hz",
            ParamUnit::Fraction => "",
            ParamUnit::Index => "",
        }
    }
}

/// Metadata for one control-surface parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display.
    pub name: &'static str,
    /// Short name for hardware displays, max 8 characters.
    pub short_name: &'static str,
    /// Unit type for formatting the value.
    pub unit: ParamUnit,
    /// Minimum plain value.
    pub min: f32,
    /// Maximum plain value.
    pub max: f32,
    /// Power-on value.
    pub default: f32,
    /// Normalization curve.
    pub scale: ParamScale,
}

impl ParamDescriptor {
    /// LFO FREQ control for the given RANGE switch position.
    ///
    /// Low covers 0.05–10 Hz, High covers 10–2000 Hz; both logarithmic.
    pub fn lfo_frequency(range: FrequencyRange) -> Self {
        let (min, max) = range.bounds();
        Self {
            name: "Frequency",
            short_name: "Freq",
            unit: ParamUnit::Hertz,
            min,
            max,
            default: 1.0_f32.clamp(min, max),
            scale: ParamScale::Logarithmic,
        }
    }

    /// LFO DUTY control (0–1, default 0.5).
    pub fn duty_cycle() -> Self {
        Self {
            name: "Duty Cycle",
            short_name: "Duty",
            unit: ParamUnit::Fraction,
            min: 0.0,
            max: 1.0,
            default: 0.5,
            scale: ParamScale::Linear,
        }
    }

    /// FREQ control while external clock is active: 17 ratio positions.
    pub fn clock_ratio() -> Self {
        Self {
            name: "Clock Ratio",
            short_name: "Ratio",
            unit: ParamUnit::Index,
            min: 0.0,
            max: (CLOCK_RATIO_COUNT - 1) as f32,
            default: ClockRatio::Unity.index() as f32,
            scale: ParamScale::Stepped(CLOCK_RATIO_COUNT as u16),
        }
    }

    /// Sequencer internal clock rate (0.1–10 Hz, logarithmic, default 1 Hz).
    pub fn sequencer_rate() -> Self {
        Self {
            name: "Sequencer Rate",
            short_name: "Rate",
            unit: ParamUnit::Hertz,
            min: 0.1,
            max: 10.0,
            default: 1.0,
            scale: ParamScale::Logarithmic,
        }
    }

    /// Sequence selector (rotary switch over the sequence table slots).
    pub fn sequence_select() -> Self {
        Self {
            name: "Sequence",
            short_name: "Seq",
            unit: ParamUnit::Index,
            min: 0.0,
            max: (SEQUENCE_SLOTS - 1) as f32,
            default: 0.0,
            scale: ParamScale::Stepped(SEQUENCE_SLOTS as u16),
        }
    }

    /// Clamps a value to this parameter's valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        constrain(value, self.min, self.max)
    }

    /// Converts a plain value to a normalized position in `[0, 1]`.
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear | ParamScale::Stepped(_) => {
                scale_to_range(value, self.min, self.max, 0.0, 1.0)
            }
            ParamScale::Logarithmic => scale_to_range_log(value, self.min, self.max, 0.0, 1.0),
        }
    }

    /// Converts a normalized position to a plain value.
    ///
    /// Positions outside `[0, 1]` are clamped first. Stepped parameters
    /// round to the nearest position.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let t = constrain(normalized, 0.0, 1.0);
        match self.scale {
            ParamScale::Linear => lerp(self.min, self.max, t),
            ParamScale::Logarithmic => scale_to_range_out_log(t, 0.0, 1.0, self.min, self.max),
            ParamScale::Stepped(steps) => {
                let last = f32::from(steps.max(1) - 1);
                if last == 0.0 {
                    return self.min;
                }
                let position = snap_to_step(t * last, 1.0);
                lerp(self.min, self.max, position / last)
            }
        }
    }
}

/// What the FREQ knob means right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyControl {
    /// Free-running frequency in Hz.
    Hertz(f32),
    /// Clock division/multiplication relative to the external clock.
    Ratio(ClockRatio),
}

impl FrequencyControl {
    /// Resolve a normalized FREQ knob position.
    ///
    /// Free-running: logarithmic over the RANGE bounds. External clock: linear
    /// over the 17 ratio positions, rounded to the nearest one.
    pub fn resolve(position: f32, range: FrequencyRange, external_clock: bool) -> Self {
        if external_clock {
            FrequencyControl::Ratio(ClockRatio::from_position(position))
        } else {
            FrequencyControl::Hertz(ParamDescriptor::lfo_frequency(range).denormalize(position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_frequency_midpoint() {
        let desc = ParamDescriptor::lfo_frequency(FrequencyRange::High);
        // Geometric mean of 10 and 2000
        let mid = desc.denormalize(0.5);
        assert!((mid - 141.421).abs() < 0.05, "got {mid}");
        assert!((desc.normalize(mid) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_denormalize_clamps_position() {
        let desc = ParamDescriptor::duty_cycle();
        assert_eq!(desc.denormalize(-1.0), 0.0);
        assert_eq!(desc.denormalize(2.0), 1.0);
    }

    #[test]
    fn test_stepped_rounds_to_nearest() {
        let desc = ParamDescriptor::clock_ratio();
        assert_eq!(desc.denormalize(0.0), 0.0);
        assert_eq!(desc.denormalize(0.5), 8.0);
        assert_eq!(desc.denormalize(1.0), 16.0);
        // 0.49 * 16 = 7.84 -> 8
        assert_eq!(desc.denormalize(0.49), 8.0);
    }

    #[test]
    fn test_sequence_select_positions() {
        let desc = ParamDescriptor::sequence_select();
        assert!((desc.denormalize(1.0) - 7.0).abs() < 1e-5);
        assert!((desc.denormalize(3.0 / 7.0) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_free_running() {
        match FrequencyControl::resolve(0.0, FrequencyRange::High, false) {
            FrequencyControl::Hertz(hz) => assert!((hz - 10.0).abs() < 1e-3),
            FrequencyControl::Ratio(_) => panic!("expected Hz"),
        }
    }

    #[test]
    fn test_resolve_external_clock_is_linear() {
        assert_eq!(
            FrequencyControl::resolve(0.5, FrequencyRange::Low, true),
            FrequencyControl::Ratio(ClockRatio::Unity)
        );
        assert_eq!(
            FrequencyControl::resolve(0.0, FrequencyRange::High, true),
            FrequencyControl::Ratio(ClockRatio::Div9)
        );
    }
}
