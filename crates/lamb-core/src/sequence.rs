//! Step-progression rules for the 8-step sequencer.
//!
//! The table is ordered: the ordinal of each [`SequenceKind`] is its position
//! on the sequence selector, so new rules may only be appended. Slot 7 is
//! reserved and currently selects nothing.

use crate::rng::Rng;

/// Number of steps in a pattern.
pub const NUM_STEPS: usize = 8;

/// Number of selector positions, including the reserved slot.
pub const SEQUENCE_SLOTS: usize = 8;

/// Display names of the implemented rules, indexed by ordinal.
pub const SEQUENCE_NAMES: [&str; SequenceKind::COUNT] =
    ["up", "down", "up/down", "random", "+2-1", "+1-2", "-3+5"];

/// Named stepping rule.
///
/// | kind | next step |
/// |------|-----------|
/// | `Up` | `+1` |
/// | `Down` | `-1` |
/// | `UpDown` | `+1` while forward, `-1` while backward; turns at the first and last non-skipped steps |
/// | `Random` | uniform over all eight steps |
/// | `PlusTwoMinusOne` | alternates `+2`, `-1` |
/// | `PlusOneMinusTwo` | alternates `+1`, `-2` |
/// | `MinusThreePlusFive` | alternates `-3`, `+5` |
///
/// All arithmetic wraps modulo [`NUM_STEPS`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Ascending.
    #[default]
    Up,
    /// Descending.
    Down,
    /// Ping-pong between the outermost active steps.
    UpDown,
    /// Uniformly random step.
    Random,
    /// Two forward, one back.
    PlusTwoMinusOne,
    /// One forward, two back.
    PlusOneMinusTwo,
    /// Three back, five forward.
    MinusThreePlusFive,
}

impl SequenceKind {
    /// Number of implemented rules.
    pub const COUNT: usize = 7;

    /// Implemented rules in selector order.
    pub const ALL: [SequenceKind; Self::COUNT] = [
        SequenceKind::Up,
        SequenceKind::Down,
        SequenceKind::UpDown,
        SequenceKind::Random,
        SequenceKind::PlusTwoMinusOne,
        SequenceKind::PlusOneMinusTwo,
        SequenceKind::MinusThreePlusFive,
    ];

    /// Rule at selector position `index`. The reserved slot and anything
    /// past it yield `None`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Selector position of this rule.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Display name, e.g. `"up/down"` or `"+2-1"`.
    pub fn name(&self) -> &'static str {
        SEQUENCE_NAMES[self.index()]
    }

    /// Look a rule up by display name (case-insensitive).
    ///
    /// Also accepts `updown` and `up-down` for [`SequenceKind::UpDown`].
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("updown") || name.eq_ignore_ascii_case("up-down") {
            return Some(SequenceKind::UpDown);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Whether the rule reads or flips the direction phase.
    pub fn uses_direction(&self) -> bool {
        !matches!(
            self,
            SequenceKind::Up | SequenceKind::Down | SequenceKind::Random
        )
    }

    /// Apply the rule once from `current`.
    ///
    /// `forward` is the direction phase; bidirectional rules read and update
    /// it. `skip` is consulted live by `UpDown` for its turning points.
    pub fn next_step(
        &self,
        current: usize,
        forward: &mut bool,
        skip: &[bool; NUM_STEPS],
        rng: &mut Rng,
    ) -> usize {
        match self {
            SequenceKind::Up => offset(current, 1),
            SequenceKind::Down => offset(current, -1),
            SequenceKind::UpDown => {
                if Some(current) == skip.iter().position(|&s| !s) {
                    *forward = true;
                }
                if Some(current) == skip.iter().rposition(|&s| !s) {
                    *forward = false;
                }
                if *forward {
                    offset(current, 1)
                } else {
                    offset(current, -1)
                }
            }
            SequenceKind::Random => rng.next_below(NUM_STEPS as u32) as usize,
            SequenceKind::PlusTwoMinusOne => alternate(current, 2, -1, forward),
            SequenceKind::PlusOneMinusTwo => alternate(current, 1, -2, forward),
            SequenceKind::MinusThreePlusFive => alternate(current, -3, 5, forward),
        }
    }
}

#[inline]
fn offset(current: usize, delta: isize) -> usize {
    (current as isize + delta).rem_euclid(NUM_STEPS as isize) as usize
}

/// First move while forward, second while backward; flips the phase.
#[inline]
fn alternate(current: usize, first: isize, second: isize, forward: &mut bool) -> usize {
    let next = if *forward {
        offset(current, first)
    } else {
        offset(current, second)
    };
    *forward = !*forward;
    next
}
