//! Streak debouncer.
//!
//! A mode transition is only accepted after a configurable number of
//! consecutive same-direction classifications.  Two independent counters
//! are kept: the night streak (watched while the light is off, for dusk)
//! and the day streak (watched while the light is on, for dawn).
//!
//! ```text
//!           Night  Night  Day   Night  Night  Night   (watching Dusk, min = 3)
//!  night:    1      2      0     1      2      3 → fire, back to 0
//! ```
//!
//! Ambiguous samples never touch either counter.

use super::classifier::Classification;

/// Which transition the current mode is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watch {
    /// Light is off: waiting for nightfall.
    Dusk,
    /// Light is on: waiting for daybreak.
    Dawn,
}

/// Outcome of feeding one classification into the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not enough evidence yet (or no information at all).
    Hold,
    /// The night streak reached its minimum.
    Dusk,
    /// The day streak reached its minimum.
    Dawn,
}

/// Minimum consecutive samples before each transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakLimits {
    pub day: u8,
    pub night: u8,
}

#[derive(Debug, Clone)]
pub struct StreakDebouncer {
    limits: StreakLimits,
    day_streak: u8,
    night_streak: u8,
}

impl StreakDebouncer {
    pub fn new(limits: StreakLimits) -> Self {
        Self {
            limits,
            day_streak: 0,
            night_streak: 0,
        }
    }

    /// Feed one classified sample.
    ///
    /// `dusk_allowed` gates the night streak: while the accumulated day is
    /// still shorter than the configured minimum, the streak may build up
    /// (capped at its minimum) but never fires.
    pub fn observe(&mut self, class: Classification, watch: Watch, dusk_allowed: bool) -> Verdict {
        match (watch, class) {
            (_, Classification::Ambiguous) => Verdict::Hold,

            (Watch::Dusk, Classification::Day) | (Watch::Dawn, Classification::Night) => {
                // The opposing streak and the irrelevant one both start over.
                self.reset();
                Verdict::Hold
            }

            (Watch::Dusk, Classification::Night) => {
                self.day_streak = 0;
                self.night_streak = self.night_streak.saturating_add(1).min(self.limits.night);
                if dusk_allowed && self.night_streak >= self.limits.night {
                    self.night_streak = 0;
                    Verdict::Dusk
                } else {
                    Verdict::Hold
                }
            }

            (Watch::Dawn, Classification::Day) => {
                self.night_streak = 0;
                self.day_streak = self.day_streak.saturating_add(1);
                if self.day_streak >= self.limits.day {
                    self.day_streak = 0;
                    Verdict::Dawn
                } else {
                    Verdict::Hold
                }
            }
        }
    }

    /// Clear both counters (entry into a new mode).
    pub fn reset(&mut self) {
        self.day_streak = 0;
        self.night_streak = 0;
    }

    pub fn day_streak(&self) -> u8 {
        self.day_streak
    }

    pub fn night_streak(&self) -> u8 {
        self.night_streak
    }

    pub fn limits(&self) -> StreakLimits {
        self.limits
    }
}
