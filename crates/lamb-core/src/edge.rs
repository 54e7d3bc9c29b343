//! Rising-edge detection on sampled signals and gate levels.
//!
//! The detector compares each sample with the previous one; it never looks
//! at oscillator phase. One low-to-high transition produces exactly one
//! `true`, however long the signal then stays high.

/// Default level separating low from high for `[0, 1]` signals.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Low-to-high transition detector.
///
/// # Example
///
/// ```rust
/// use lamb_core::RisingEdge;
///
/// let mut edge = RisingEdge::new();
/// let fired: Vec<bool> = [0.0, 1.0, 1.0, 0.0, 1.0]
///     .iter()
///     .map(|&s| edge.process(s))
///     .collect();
/// assert_eq!(fired, [false, true, false, false, true]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RisingEdge {
    threshold: f32,
    high: bool,
}

impl Default for RisingEdge {
    fn default() -> Self {
        Self::new()
    }
}

impl RisingEdge {
    /// Detector at [`DEFAULT_THRESHOLD`], starting low.
    pub const fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    /// Detector at a custom threshold, starting low.
    pub const fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            high: false,
        }
    }

    /// Feed one sample; `true` when it crosses from below to at/above the
    /// threshold.
    #[inline]
    pub fn process(&mut self, sample: f32) -> bool {
        self.process_level(sample >= self.threshold)
    }

    /// Feed one boolean gate level; `true` on a low-to-high transition.
    #[inline]
    pub fn process_level(&mut self, high: bool) -> bool {
        let rising = high && !self.high;
        self.high = high;
        rising
    }

    /// Whether the last input was high.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Force the remembered level, e.g. to avoid a spurious edge after
    /// switching sources.
    pub fn prime(&mut self, high: bool) {
        self.high = high;
    }

    /// Forget the previous level.
    pub fn reset(&mut self) {
        self.high = false;
    }
}
