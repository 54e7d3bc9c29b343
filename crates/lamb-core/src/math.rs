//! Scaling utilities for control-rate values.
//!
//! Pure numeric mappings used to turn raw control positions (knobs, sliders,
//! potentiometer readings) into frequencies, duty cycles and clock-ratio
//! positions. All functions are allocation-free and `no_std`.
//!
//! | Function | Mapping |
//! |----------|---------|
//! | [`constrain`] | Clamp into `[min, max]` |
//! | [`scale_to_range`] | Linear in, linear out |
//! | [`scale_to_range_log`] | Logarithmic in, linear out |
//! | [`scale_to_range_out_log`] | Linear in, logarithmic out |
//! | [`expo_map`] | Normalized exponential curve |
//! | [`snap_to_step`] | Quantize to a step grid |
//!
//! None of these functions fail. Inputs that have no meaningful mapping
//! (logarithms of non-positive values, zero-width input ranges) fall back to
//! the low end of the output range so a running control loop never stalls.

use libm::{expf, logf, roundf};

/// Clamp `n` into `[min, max]`.
///
/// NaN input collapses to `min`.
///
/// # Example
/// ```rust
/// use lamb_core::constrain;
///
/// assert_eq!(constrain(1.5, 0.0, 1.0), 1.0);
/// assert_eq!(constrain(-3.0, 0.05, 2000.0), 0.05);
/// ```
#[inline]
pub fn constrain(n: f32, min: f32, max: f32) -> f32 {
    if n.is_nan() {
        return min;
    }
    n.max(min).min(max)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `num` from `[in_min, in_max]` to `[out_min, out_max]` linearly.
///
/// The result is not clamped. A zero-width input range returns `out_min`.
///
/// # Example
/// ```rust
/// use lamb_core::scale_to_range;
///
/// assert_eq!(scale_to_range(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
/// ```
#[inline]
pub fn scale_to_range(num: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    (num - in_min) * (out_max - out_min) / span + out_min
}

/// Map `num` from a logarithmic input range to a linear output range.
///
/// The position of `num` is measured in log space between `in_min` and
/// `in_max`, then applied linearly to the output. Requires all input values
/// to be positive; otherwise `out_min` is returned.
pub fn scale_to_range_log(num: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if num <= 0.0 || in_min <= 0.0 || in_max <= 0.0 {
        return out_min;
    }
    let log_min = logf(in_min);
    let log_span = logf(in_max) - log_min;
    if log_span == 0.0 {
        return out_min;
    }
    let t = (logf(num) - log_min) / log_span;
    lerp(out_min, out_max, t)
}

/// Map `num` from a linear input range to a logarithmic output range.
///
/// This is the knob taper used for frequency controls: equal knob travel
/// multiplies the output by an equal factor. Requires a positive output
/// range; otherwise `out_min` is returned.
///
/// # Example
/// ```rust
/// use lamb_core::scale_to_range_out_log;
///
/// // Halfway along a 0.1-10 Hz log knob is the geometric mean, 1 Hz.
/// let hz = scale_to_range_out_log(0.5, 0.0, 1.0, 0.1, 10.0);
/// assert!((hz - 1.0).abs() < 1e-4);
/// ```
pub fn scale_to_range_out_log(
    num: f32,
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
) -> f32 {
    if out_min <= 0.0 || out_max <= 0.0 {
        return out_min;
    }
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let t = (num - in_min) / span;
    let log_min = logf(out_min);
    let log_max = logf(out_max);
    expf(lerp(log_min, log_max, t))
}

/// Exponential curve over the unit interval.
///
/// `(e^{kx} - 1) / (e^k - 1)` with `x` clamped to `[0, 1]`. Endpoints are
/// fixed at 0 and 1; `k > 0` bends the curve toward the low end and `k = 0`
/// is the identity.
pub fn expo_map(t: f32, k: f32) -> f32 {
    let x = constrain(t, 0.0, 1.0);
    if k == 0.0 {
        return x;
    }
    (expf(k * x) - 1.0) / (expf(k) - 1.0)
}

/// Round `value` to the nearest multiple of `step`.
///
/// A non-positive step leaves the value untouched.
#[inline]
pub fn snap_to_step(value: f32, step: f32) -> f32 {
    if step > 0.0 {
        roundf(value / step) * step
    } else {
        value
    }
}
