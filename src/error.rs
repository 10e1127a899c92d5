//! Unified error types for the light controller.
//!
//! The runtime control loop has no channel to report faults (no display,
//! no persistent log), so errors only surface at configuration time and
//! at the platform boundary.  All variants are `Copy` so they can be
//! collected into fixed-capacity lists without allocation.

use core::fmt;

use crate::scheduler::Cadence;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A tunable is out of its valid range.
    Config(ConfigError),
    /// The light sensor misbehaved at the platform boundary.
    Sensor(SensorError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A single violated configuration rule.
///
/// [`EngineConfig::validate`](crate::config::EngineConfig::validate)
/// reports these; [`EngineConfig::sanitize`](crate::config::EngineConfig::sanitize)
/// clamps the offending value instead and records the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Supply voltage of zero makes the millivolt conversion meaningless.
    ZeroSupplyVoltage,
    /// `dark_threshold >= light_threshold`: no hysteresis band.
    ThresholdsInverted { dark: u8, light: u8 },
    /// A streak minimum of zero would fire a transition without evidence.
    ZeroStreak,
    /// `min_afterglow > max_afterglow`.
    AfterglowBoundsInverted { min: u16, max: u16 },
    /// An afterglow minimum of zero would leave the light off all night.
    ZeroAfterglow,
    /// The dimmer would never reach zero.
    ZeroDimmerStep,
    /// A maximum duty of zero means the light never turns on.
    ZeroMaxDuty,
    /// The wake timer interval for a cadence is zero.
    ZeroWakeInterval(Cadence),
    /// A cadence would never trigger a sample.
    ZeroWakesPerSample(Cadence),
    /// Day/night sample-rate ratio of zero.
    ZeroSampleRateRatio,
    /// The sleep selector names a reserved hardware mode.
    ReservedSleepLevel(u8),
    /// Brightness limitation thresholds given in descending order.
    LimitationOrder,
    /// A brightness limitation step dims the light to duty zero.
    ZeroLimitationPwm,
    /// Night-install requested with a zero budget.
    ZeroNightInstall,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSupplyVoltage => write!(f, "supply voltage is zero"),
            Self::ThresholdsInverted { dark, light } => {
                write!(f, "dark threshold {dark} not below light threshold {light}")
            }
            Self::ZeroStreak => write!(f, "streak minimum is zero"),
            Self::AfterglowBoundsInverted { min, max } => {
                write!(f, "afterglow minimum {min} above maximum {max}")
            }
            Self::ZeroAfterglow => write!(f, "afterglow minimum is zero"),
            Self::ZeroDimmerStep => write!(f, "dimmer step is zero"),
            Self::ZeroMaxDuty => write!(f, "maximum duty is zero"),
            Self::ZeroWakeInterval(c) => write!(f, "{c:?} wake interval is zero"),
            Self::ZeroWakesPerSample(c) => write!(f, "{c:?} wakes per sample is zero"),
            Self::ZeroSampleRateRatio => write!(f, "sample-rate ratio is zero"),
            Self::ReservedSleepLevel(raw) => write!(f, "sleep selector {raw} is reserved"),
            Self::LimitationOrder => write!(f, "brightness limitation thresholds out of order"),
            Self::ZeroLimitationPwm => write!(f, "brightness limitation duty is zero"),
            Self::ZeroNightInstall => write!(f, "night-install budget is zero"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A conversion result arrived while none was requested.
    Unrequested,
    /// A new conversion was requested while one is still running.
    Busy,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrequested => write!(f, "unrequested conversion result"),
            Self::Busy => write!(f, "conversion already in flight"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
