//! External clock measurement and ratio-locked frequency derivation.
//!
//! The clock input delivers discrete pulses. The time between the two most
//! recent pulses is the clock period; the LFO then runs at a fixed division
//! or multiplication of that clock, selected from 17 ratios between ÷9 and ×9.
//!
//! A period longer than [`CLOCK_TIMEOUT_SECS`] (clock slower than 0.05 Hz)
//! means the clock is considered absent. Loss of clock is not an error: the
//! unit reports itself invalid and callers fall back to free-running.

use libm::roundf;

use crate::math::constrain;

/// Number of selectable clock ratios.
pub const CLOCK_RATIO_COUNT: usize = 17;

/// Longest pulse spacing, in seconds, still treated as a running clock.
pub const CLOCK_TIMEOUT_SECS: f64 = 20.0;

/// Clock division/multiplication ratio.
///
/// Ordered ascending; the ordinal is the knob position in external-clock
/// mode, with [`ClockRatio::Unity`] at index 8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockRatio {
    /// ÷9
    Div9,
    /// ÷8
    Div8,
    /// ÷7
    Div7,
    /// ÷6
    Div6,
    /// ÷5
    Div5,
    /// ÷4
    Div4,
    /// ÷3
    Div3,
    /// ÷2
    Div2,
    /// ×1
    #[default]
    Unity,
    /// ×2
    Mul2,
    /// ×3
    Mul3,
    /// ×4
    Mul4,
    /// ×5
    Mul5,
    /// ×6
    Mul6,
    /// ×7
    Mul7,
    /// ×8
    Mul8,
    /// ×9
    Mul9,
}

/// Display labels for all ratios, indexed by ordinal.
pub const RATIO_LABELS: [&str; CLOCK_RATIO_COUNT] = [
    "/9", "/8", "/7", "/6", "/5", "/4", "/3", "/2", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8",
    "x9",
];

impl ClockRatio {
    /// Every ratio in ascending order.
    pub const ALL: [ClockRatio; CLOCK_RATIO_COUNT] = [
        ClockRatio::Div9,
        ClockRatio::Div8,
        ClockRatio::Div7,
        ClockRatio::Div6,
        ClockRatio::Div5,
        ClockRatio::Div4,
        ClockRatio::Div3,
        ClockRatio::Div2,
        ClockRatio::Unity,
        ClockRatio::Mul2,
        ClockRatio::Mul3,
        ClockRatio::Mul4,
        ClockRatio::Mul5,
        ClockRatio::Mul6,
        ClockRatio::Mul7,
        ClockRatio::Mul8,
        ClockRatio::Mul9,
    ];

    /// Ratio at ordinal `index`, or `None` past ×9.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Ordinal of this ratio in `[0, 16]`.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Ratio nearest to a normalized knob position. Linear, no hysteresis.
    pub fn from_position(position: f32) -> Self {
        let t = constrain(position, 0.0, 1.0);
        let index = roundf(t * (CLOCK_RATIO_COUNT - 1) as f32) as usize;
        Self::ALL[index.min(CLOCK_RATIO_COUNT - 1)]
    }

    /// Factor applied to the measured clock frequency.
    pub fn multiplier(&self) -> f32 {
        let index = self.index() as i32;
        let unity = ClockRatio::Unity.index() as i32;
        if index >= unity {
            (index - unity + 1) as f32
        } else {
            1.0 / (unity - index + 1) as f32
        }
    }

    /// Short label such as `"/3"` or `"x4"`.
    pub fn label(&self) -> &'static str {
        RATIO_LABELS[self.index()]
    }

    /// Parse a label. Accepts `/n`, `÷n`, `xn`, `×n` and `*n`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let (divide, digits) = if let Some(rest) = label.strip_prefix('/') {
            (true, rest)
        } else if let Some(rest) = label.strip_prefix('÷') {
            (true, rest)
        } else if let Some(rest) = label
            .strip_prefix('x')
            .or_else(|| label.strip_prefix('X'))
            .or_else(|| label.strip_prefix('×'))
            .or_else(|| label.strip_prefix('*'))
        {
            (false, rest)
        } else {
            return None;
        };
        let n: usize = digits.trim().parse().ok()?;
        let unity = ClockRatio::Unity.index();
        match (divide, n) {
            (_, 1) => Some(ClockRatio::Unity),
            (true, 2..=9) => Self::from_index(unity + 1 - n),
            (false, 2..=9) => Self::from_index(unity + n - 1),
            _ => None,
        }
    }
}

/// External clock measurement state.
///
/// # Example
///
/// ```rust
/// use lamb_core::{ClockRatio, ClockSync};
///
/// let mut clock = ClockSync::new();
/// clock.set_ratio(ClockRatio::Mul2);
///
/// clock.on_pulse(10.0);
/// clock.on_pulse(10.5);
///
/// assert!(clock.is_valid());
/// assert_eq!(clock.measured_period(), Some(0.5));
/// assert_eq!(clock.effective_frequency(), Some(4.0));
/// ```
#[derive(Debug, Clone)]
pub struct ClockSync {
    /// Timestamp of the most recent pulse, in seconds
    last_pulse: Option<f64>,
    /// Spacing of the last accepted pulse pair, in seconds
    period: Option<f64>,
    valid: bool,
    ratio: ClockRatio,
    timeout: f64,
}

impl Default for ClockSync {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSync {
    /// Create an unarmed clock with the standard 20 second timeout.
    pub fn new() -> Self {
        Self::with_timeout(CLOCK_TIMEOUT_SECS)
    }

    /// Create an unarmed clock with a custom timeout in seconds.
    ///
    /// Non-positive or non-finite timeouts fall back to the standard one.
    pub fn with_timeout(timeout_secs: f64) -> Self {
        let timeout = if timeout_secs > 0.0 && timeout_secs.is_finite() {
            timeout_secs
        } else {
            CLOCK_TIMEOUT_SECS
        };
        Self {
            last_pulse: None,
            period: None,
            valid: false,
            ratio: ClockRatio::Unity,
            timeout,
        }
    }

    /// Record a clock pulse at `timestamp` seconds.
    ///
    /// Returns whether the clock is valid after this pulse. The first pulse
    /// only arms the unit. A gap longer than the timeout invalidates the
    /// clock and leaves the previous period untouched; the pulse still
    /// becomes the reference for the next one. A pulse earlier than the
    /// previous one re-arms the unit. A pulse at the same instant as the
    /// previous one is ignored.
    pub fn on_pulse(&mut self, timestamp: f64) -> bool {
        if !timestamp.is_finite() {
            return self.valid;
        }
        let Some(last) = self.last_pulse else {
            self.last_pulse = Some(timestamp);
            self.valid = false;
            return false;
        };

        let period = timestamp - last;
        if period == 0.0 {
            return self.valid;
        }
        self.last_pulse = Some(timestamp);

        if period < 0.0 || period > self.timeout {
            if self.valid {
                #[cfg(feature = "tracing")]
                tracing::debug!(gap = period, "clock_sync: lost external clock");
            }
            self.valid = false;
            return false;
        }

        if !self.valid {
            #[cfg(feature = "tracing")]
            tracing::debug!(period, "clock_sync: locked to external clock");
        }
        self.period = Some(period);
        self.valid = true;
        true
    }

    /// Invalidate the clock if no pulse has arrived within the timeout.
    ///
    /// Call periodically with the current time in seconds. Returns whether
    /// the clock is still valid.
    pub fn poll(&mut self, now: f64) -> bool {
        if self.valid
            && let Some(last) = self.last_pulse
            && now - last > self.timeout
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(silence = now - last, "clock_sync: clock timed out");
            self.valid = false;
        }
        self.valid
    }

    /// Forget all pulses.
    pub fn reset(&mut self) {
        self.last_pulse = None;
        self.period = None;
        self.valid = false;
    }

    /// Whether the clock is currently running.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Last accepted pulse spacing in seconds, if any pair was accepted.
    ///
    /// Kept across clock loss so the value reflects the last good period.
    pub fn measured_period(&self) -> Option<f64> {
        self.period
    }

    /// Measured clock frequency in Hz, only while valid.
    pub fn measured_frequency(&self) -> Option<f32> {
        if !self.valid {
            return None;
        }
        self.period.map(|p| (1.0 / p) as f32)
    }

    /// Timeout window in seconds.
    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    /// Select the division/multiplication ratio.
    pub fn set_ratio(&mut self, ratio: ClockRatio) {
        self.ratio = ratio;
    }

    /// Select the ratio by ordinal. Returns `false` and keeps the current
    /// ratio when `index > 16`.
    pub fn set_ratio_index(&mut self, index: usize) -> bool {
        match ClockRatio::from_index(index) {
            Some(ratio) => {
                self.ratio = ratio;
                true
            }
            None => false,
        }
    }

    /// Currently selected ratio.
    pub fn current_ratio(&self) -> ClockRatio {
        self.ratio
    }

    /// Clock-locked frequency for the selected ratio, only while valid.
    pub fn effective_frequency(&self) -> Option<f32> {
        self.frequency_for(self.ratio)
    }

    /// Clock-locked frequency for an arbitrary ratio, only while valid.
    ///
    /// Lets several LFOs share one clock input with their own ratios.
    pub fn frequency_for(&self, ratio: ClockRatio) -> Option<f32> {
        self.measured_frequency().map(|hz| hz * ratio.multiplier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_table() {
        assert_eq!(ClockRatio::ALL.len(), CLOCK_RATIO_COUNT);
        for (i, ratio) in ClockRatio::ALL.iter().enumerate() {
            assert_eq!(ratio.index(), i);
            assert_eq!(ClockRatio::from_label(ratio.label()), Some(*ratio));
        }
        assert_eq!(ClockRatio::Unity.index(), 8);
        assert!((ClockRatio::Div9.multiplier() - 1.0 / 9.0).abs() < 1e-7);
        assert_eq!(ClockRatio::Div2.multiplier(), 0.5);
        assert_eq!(ClockRatio::Unity.multiplier(), 1.0);
        assert_eq!(ClockRatio::Mul9.multiplier(), 9.0);
        assert_eq!(ClockRatio::from_index(17), None);
    }

    #[test]
    fn test_ratio_labels_parse() {
        assert_eq!(ClockRatio::from_label("÷4"), Some(ClockRatio::Div4));
        assert_eq!(ClockRatio::from_label("×3"), Some(ClockRatio::Mul3));
        assert_eq!(ClockRatio::from_label("/1"), Some(ClockRatio::Unity));
        assert_eq!(ClockRatio::from_label("x10"), None);
        assert_eq!(ClockRatio::from_label("4"), None);
    }

    #[test]
    fn test_ratio_from_position() {
        assert_eq!(ClockRatio::from_position(0.0), ClockRatio::Div9);
        assert_eq!(ClockRatio::from_position(0.5), ClockRatio::Unity);
        assert_eq!(ClockRatio::from_position(1.0), ClockRatio::Mul9);
        assert_eq!(ClockRatio::from_position(9.0), ClockRatio::Mul9);
        assert_eq!(ClockRatio::from_position(1.0 / 16.0), ClockRatio::Div8);
    }

    #[test]
    fn test_first_pulse_only_arms() {
        let mut clock = ClockSync::new();
        assert!(!clock.on_pulse(1.0));
        assert!(!clock.is_valid());
        assert_eq!(clock.effective_frequency(), None);
    }

    #[test]
    fn test_pulse_pair_and_timeout_gap() {
        let mut clock = ClockSync::new();
        clock.on_pulse(0.0);
        assert!(clock.on_pulse(0.5));
        assert_eq!(clock.measured_period(), Some(0.5));

        assert!(!clock.on_pulse(25.5));
        assert!(!clock.is_valid());
        assert_eq!(clock.measured_period(), Some(0.5));
        assert_eq!(clock.effective_frequency(), None);

        // Next pulse pair re-arms
        assert!(clock.on_pulse(26.5));
        assert_eq!(clock.measured_period(), Some(1.0));
    }

    #[test]
    fn test_exactly_twenty_seconds_is_valid() {
        let mut clock = ClockSync::new();
        clock.on_pulse(0.0);
        assert!(clock.on_pulse(20.0));
        assert!((clock.measured_frequency().unwrap() - 0.05).abs() < 1e-7);
    }

    #[test]
    fn test_effective_frequency_ratios() {
        let mut clock = ClockSync::new();
        clock.on_pulse(3.0);
        clock.on_pulse(4.0);

        assert!(clock.set_ratio_index(8));
        assert_eq!(clock.effective_frequency(), Some(1.0));
        assert!(clock.set_ratio_index(9));
        assert_eq!(clock.effective_frequency(), Some(2.0));
        assert!(clock.set_ratio_index(0));
        let f = clock.effective_frequency().unwrap();
        assert!((f - 1.0 / 9.0).abs() < 1e-7);

        assert!(!clock.set_ratio_index(17));
        assert_eq!(clock.current_ratio(), ClockRatio::Div9);
    }

    #[test]
    fn test_poll_times_out() {
        let mut clock = ClockSync::new();
        clock.on_pulse(0.0);
        clock.on_pulse(1.0);
        assert!(clock.poll(20.0));
        assert!(!clock.poll(21.5));
        assert_eq!(clock.measured_period(), Some(1.0));
    }

    #[test]
    fn test_backwards_timestamp_rearms() {
        let mut clock = ClockSync::new();
        clock.on_pulse(5.0);
        clock.on_pulse(6.0);
        assert!(!clock.on_pulse(2.0));
        assert!(clock.on_pulse(2.25));
        assert_eq!(clock.measured_period(), Some(0.25));
    }

    #[test]
    fn test_duplicate_pulse_ignored() {
        let mut clock = ClockSync::new();
        clock.on_pulse(1.0);
        clock.on_pulse(2.0);
        assert!(clock.on_pulse(2.0));
        assert_eq!(clock.measured_period(), Some(1.0));
    }

    #[test]
    fn test_custom_timeout() {
        let mut clock = ClockSync::with_timeout(2.0);
        clock.on_pulse(0.0);
        assert!(!clock.on_pulse(3.0));
        assert_eq!(ClockSync::with_timeout(-1.0).timeout(), CLOCK_TIMEOUT_SECS);
    }
}
