//! Eight-step sequencer state machine.
//!
//! State is the pair `(current step, direction phase)` plus the skip mask and
//! the selected [`SequenceKind`]. Each advance applies the rule once and then
//! keeps chaining it from the candidate (not from the current step) while the
//! candidate is skipped, for at most [`NUM_STEPS`] probes in total.
//!
//! Holding is the only failure mode: when every step is skipped, or the
//! probes run out without reaching an active step, the advance is a no-op.

use crate::rng::Rng;
use crate::sequence::{NUM_STEPS, SequenceKind};

/// Upper bound on rule applications per advance.
pub const MAX_PROBES: usize = NUM_STEPS;

/// Step sequencer.
///
/// # Example
///
/// ```rust
/// use lamb_core::{SequenceKind, Sequencer};
///
/// let mut seq = Sequencer::new();
/// seq.set_skip(1, true);
///
/// assert_eq!(seq.advance(), 2);
///
/// seq.set_sequence_kind(SequenceKind::Down);
/// assert_eq!(seq.advance(), 0);
/// assert_eq!(seq.advance(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct Sequencer {
    current: usize,
    skip: [bool; NUM_STEPS],
    kind: SequenceKind,
    /// Direction phase for bidirectional rules; `true` = forward
    forward: bool,
    rng: Rng,
    /// Stamp of the last edge accepted by [`Sequencer::trigger`]
    last_edge: Option<u64>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Sequencer at step 0, no skips, `Up`.
    pub fn new() -> Self {
        Self::with_seed(0x1234_5678)
    }

    /// Same as [`Sequencer::new`] with a specific seed for the `random` rule.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            current: 0,
            skip: [false; NUM_STEPS],
            kind: SequenceKind::Up,
            forward: true,
            rng: Rng::new(seed),
            last_edge: None,
        }
    }

    /// Advance one step using the selected rule. Returns the new step.
    pub fn advance(&mut self) -> usize {
        if self.all_skipped() {
            #[cfg(feature = "tracing")]
            tracing::trace!(step = self.current, "sequencer: all steps skipped, holding");
            return self.current;
        }

        let saved_forward = self.forward;
        let mut next = self
            .kind
            .next_step(self.current, &mut self.forward, &self.skip, &mut self.rng);
        let mut probes = 1;
        while self.skip[next] && probes < MAX_PROBES {
            next = self
                .kind
                .next_step(next, &mut self.forward, &self.skip, &mut self.rng);
            probes += 1;
        }

        if self.skip[next] {
            // Probes exhausted: treat as all skipped
            self.forward = saved_forward;
            #[cfg(feature = "tracing")]
            tracing::trace!(step = self.current, "sequencer: no active step reachable, holding");
            return self.current;
        }

        self.current = next;
        self.current
    }

    /// Operator-triggered step; identical to [`Sequencer::advance`].
    pub fn manual_step(&mut self) -> usize {
        self.advance()
    }

    /// Advance once for the edge identified by `edge`.
    ///
    /// Repeating the stamp of the last accepted edge is a no-op, so one
    /// logical edge never advances twice. Use a monotonically increasing
    /// stamp such as the sample index at which the edge occurred.
    pub fn trigger(&mut self, edge: u64) -> usize {
        if self.last_edge == Some(edge) {
            return self.current;
        }
        self.last_edge = Some(edge);
        self.advance()
    }

    /// Forget the last accepted edge stamp, so the next `trigger` call
    /// advances whatever its stamp.
    pub fn clear_edge(&mut self) {
        self.last_edge = None;
    }

    /// Current step in `[0, 7]`.
    pub fn current_step(&self) -> usize {
        self.current
    }

    /// Jump to `step`. Returns `false` for indices past 7.
    pub fn set_step(&mut self, step: usize) -> bool {
        if step < NUM_STEPS {
            self.current = step;
            true
        } else {
            false
        }
    }

    /// Include or exclude a step. Returns `false` for indices past 7.
    pub fn set_skip(&mut self, step: usize, skipped: bool) -> bool {
        match self.skip.get_mut(step) {
            Some(slot) => {
                *slot = skipped;
                true
            }
            None => false,
        }
    }

    /// Flip the skip flag of a step. Returns `false` for indices past 7.
    pub fn toggle_skip(&mut self, step: usize) -> bool {
        match self.skip.get_mut(step) {
            Some(slot) => {
                *slot = !*slot;
                true
            }
            None => false,
        }
    }

    /// Whether `step` is skipped. Out-of-range steps report `false`.
    pub fn is_skipped(&self, step: usize) -> bool {
        self.skip.get(step).copied().unwrap_or(false)
    }

    /// Replace the whole skip mask.
    pub fn set_skip_mask(&mut self, mask: [bool; NUM_STEPS]) {
        self.skip = mask;
    }

    /// Current skip mask.
    pub fn skip_mask(&self) -> [bool; NUM_STEPS] {
        self.skip
    }

    /// Skip mask packed into a byte, bit `i` = step `i`.
    pub fn skip_bits(&self) -> u8 {
        pack_mask(&self.skip)
    }

    /// Whether every step is skipped.
    pub fn all_skipped(&self) -> bool {
        self.skip.iter().all(|&s| s)
    }

    /// Select the stepping rule.
    ///
    /// Selecting a different rule resets the direction phase to forward.
    pub fn set_sequence_kind(&mut self, kind: SequenceKind) {
        if kind != self.kind {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = self.kind.name(), to = kind.name(), "sequencer: sequence changed");
            self.kind = kind;
            self.forward = true;
        }
    }

    /// Select the rule by selector position. Returns `false` and keeps the
    /// current rule for the reserved slot or anything past it.
    pub fn set_sequence_index(&mut self, index: usize) -> bool {
        match SequenceKind::from_index(index) {
            Some(kind) => {
                self.set_sequence_kind(kind);
                true
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(index, "sequencer: ignoring unassigned sequence slot");
                false
            }
        }
    }

    /// Selected rule.
    pub fn sequence_kind(&self) -> SequenceKind {
        self.kind
    }

    /// Direction phase; `true` while in the forward sub-phase.
    pub fn is_direction_forward(&self) -> bool {
        self.forward
    }

    /// Return to step 0 in the forward phase. Skip mask and rule are kept.
    pub fn reset(&mut self) {
        self.current = 0;
        self.forward = true;
        self.last_edge = None;
    }
}

/// Pack a skip mask into a byte, bit `i` = step `i`.
pub fn pack_mask(mask: &[bool; NUM_STEPS]) -> u8 {
    mask.iter()
        .enumerate()
        .fold(0u8, |bits, (i, &s)| if s { bits | (1 << i) } else { bits })
}

/// Unpack a byte into a skip mask, bit `i` = step `i`.
pub fn unpack_mask(bits: u8) -> [bool; NUM_STEPS] {
    core::array::from_fn(|i| bits & (1 << i) != 0)
}
