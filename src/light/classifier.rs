//! Tri-state light classifier with a hysteresis band.
//!
//! A single ambient-light reading is mapped onto [`Classification`]
//! against two thresholds.  Readings inside the band between them are
//! [`Classification::Ambiguous`]: a stable "no information" answer that
//! never counts as a vote for either side.

use serde::{Deserialize, Serialize};

/// Normalised sensor voltage: 0 = dark, 255 = bright.
pub type LightSample = u8;

/// Result of classifying one [`LightSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Day,
    Night,
    Ambiguous,
}

/// Resolved integer thresholds.  Invariant: `dark < light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Samples strictly below this are Night.
    pub dark: u8,
    /// Samples strictly above this are Day.
    pub light: u8,
}

impl Thresholds {
    /// Derive thresholds from a dark-level midpoint and hysteresis
    /// half-width, both in millivolts, against the ADC reference.
    ///
    /// Values are truncated toward zero exactly as an integer cast of the
    /// floating-point expression would.  The caller guarantees
    /// `supply_mv > 0`.
    pub fn from_millivolts(supply_mv: u16, dark_mv: u16, hysteresis_mv: u16) -> Self {
        let scale = |mv: u32| -> u8 {
            let raw = mv * 255 / supply_mv as u32;
            raw.min(u8::MAX as u32) as u8
        };
        let dark_mv = dark_mv as u32;
        let hysteresis_mv = hysteresis_mv as u32;
        Self {
            dark: scale(dark_mv.saturating_sub(hysteresis_mv)),
            light: scale(dark_mv + hysteresis_mv),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.dark < self.light
    }
}

/// Classify a single sample.  Pure; no internal state.
pub fn classify(sample: LightSample, thresholds: &Thresholds) -> Classification {
    if sample > thresholds.light {
        Classification::Day
    } else if sample < thresholds.dark {
        Classification::Night
    } else {
        Classification::Ambiguous
    }
}
