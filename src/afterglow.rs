//! Afterglow calculation and night-time brightness limitation.
//!
//! At dusk the number of day ticks counted since the last dawn decides how
//! long the light stays on.  The relation is inverse: short (winter) days
//! leave a long natural night ahead, so the light burns longer; long
//! (summer) days give a short afterglow.  The clamp bounds the energy
//! spent regardless of season.
//!
//! ```text
//!  afterglow
//!     max ┤━━━━━━━┓
//!         │        ╲
//!         │         ╲   constant - day_ticks
//!     min ┤          ┗━━━━━━━━━━━━━
//!         └──────────────────────────▶ day_ticks
//! ```

use serde::{Deserialize, Serialize};

/// Tunables of the afterglow formula, all in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfterglowParams {
    /// Constant the day ticks are subtracted from.
    pub tick_constant: u16,
    /// Lower bound of the result.  Invariant: `1 <= min <= max`.
    pub min: u16,
    /// Upper bound of the result.
    pub max: u16,
}

impl Default for AfterglowParams {
    fn default() -> Self {
        Self {
            tick_constant: 630,
            min: 120,
            max: 400,
        }
    }
}

/// Night ticks to keep the light on after a day of `day_ticks`.
///
/// Always lies in `[params.min, params.max]`.
pub fn afterglow_ticks(day_ticks: u16, params: &AfterglowParams) -> u16 {
    if day_ticks >= params.tick_constant {
        return params.min;
    }
    (params.tick_constant - day_ticks).clamp(params.min, params.max)
}

/// Two-step brightness reduction late in the night to conserve battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessLimits {
    /// Night ticks after dusk at which `pwm1` applies.
    pub threshold1: u16,
    pub pwm1: u8,
    /// Night ticks after dusk at which `pwm2` applies.
    pub threshold2: u16,
    pub pwm2: u8,
}

impl BrightnessLimits {
    /// Values shipped with the first production units.
    pub const FIRST_PRODUCTION: Self = Self {
        threshold1: 150,
        pwm1: 170,
        threshold2: 270,
        pwm2: 105,
    };

    /// Put the two steps in ascending threshold order.
    ///
    /// Returns `true` if a swap was needed.
    pub fn normalise(&mut self) -> bool {
        if self.threshold1 > self.threshold2 {
            core::mem::swap(&mut self.threshold1, &mut self.threshold2);
            core::mem::swap(&mut self.pwm1, &mut self.pwm2);
            true
        } else {
            false
        }
    }

    /// Duty to hold after `elapsed` night ticks, never above `max_duty`.
    pub fn duty_after(&self, elapsed: u16, max_duty: u8) -> u8 {
        let duty = if elapsed >= self.threshold2 {
            self.pwm2
        } else if elapsed >= self.threshold1 {
            self.pwm1
        } else {
            max_duty
        };
        duty.min(max_duty)
    }
}
