//! Sleep-level policy.
//!
//! Between wake events the processor returns to the lowest sleep level
//! the current situation allows:
//!
//! | Situation                      | Level                      |
//! |--------------------------------|----------------------------|
//! | Sensor conversion in flight    | stay awake                 |
//! | Light output enabled (PWM)     | `Idle` (I/O clock running) |
//! | Otherwise                      | configured level           |

use serde::{Deserialize, Serialize};

/// Hardware sleep levels, shallowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SleepLevel {
    /// CPU halted, peripheral clocks running.
    Idle = 0,
    /// I/O clock halted, ADC still able to convert.
    AdcNoiseReduction = 1,
    /// Only the wake timer runs.
    PowerDown = 2,
    /// Power-down with the main oscillator kept running.
    Standby = 4,
}

impl SleepLevel {
    /// Decode a raw selector.
    ///
    /// Reserved selectors return `None`; callers clamp them to `Idle`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::AdcNoiseReduction),
            2 => Some(Self::PowerDown),
            4 => Some(Self::Standby),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// What the main loop should do once all pending events are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleDecision {
    /// A conversion is pending; the converter may not run in deep sleep.
    StayAwake,
    /// Sleep at the given level until the next interrupt.
    Sleep(SleepLevel),
}

/// Pick the sleep level for the current situation.
pub fn idle_decision(configured: SleepLevel, output_enabled: bool, sample_in_flight: bool) -> IdleDecision {
    if sample_in_flight {
        IdleDecision::StayAwake
    } else if output_enabled {
        IdleDecision::Sleep(SleepLevel::Idle)
    } else {
        IdleDecision::Sleep(configured)
    }
}
