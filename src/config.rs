//! Engine configuration.
//!
//! All tunables are populated once at startup, from compiled-in presets
//! ([`Profile`]) or, on the host simulator, from a TOML file.  Nothing is
//! persisted and nothing survives a reset.
//!
//! Malformed tunables are never a runtime fault: [`EngineConfig::sanitize`]
//! clamps each one to the nearest safe value, logs the adjustment, and
//! returns the resolved [`Settings`] the engine runs on.
//! [`EngineConfig::validate`] applies the same rules strictly for tooling.

use heapless::Vec;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::afterglow::{AfterglowParams, BrightnessLimits};
use crate::error::ConfigError;
use crate::light::{StreakLimits, Thresholds};
use crate::power::SleepLevel;
use crate::scheduler::{Cadence, CadenceTiming, Schedule};

/// Fallback ADC reference when the configured one is zero.
pub const DEFAULT_SUPPLY_MV: u16 = 2500;

/// Upper bound on the number of distinct adjustments one config can need.
pub const MAX_ADJUSTMENTS: usize = 16;

// ---------------------------------------------------------------------------
// Raw tunables
// ---------------------------------------------------------------------------

/// How the classifier thresholds are specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightLevels {
    /// Dark level and hysteresis half-width in millivolts at the sensor pin.
    Millivolts {
        supply_mv: u16,
        dark_mv: u16,
        hysteresis_mv: u16,
    },
    /// Thresholds directly on the 0–255 sample scale.
    Raw { dark: u8, light: u8 },
}

/// What a confirmed daybreak does while the light is on or ramping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DawnPolicy {
    /// Switch straight to Day, discarding any remaining budget or ramp.
    #[default]
    AbortToDay,
    /// Fade out through SlowTurnoff; a running ramp is left to finish.
    FinishRamp,
}

/// Compiled-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sim", derive(clap::ValueEnum))]
pub enum Profile {
    /// Minute-scale sampling: a day sample every 2 min, a night sample every minute.
    Production,
    /// Same algorithm at second scale, for bench testing within minutes.
    Testing,
}

/// Every tunable of the engine, in physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Light classification ---
    pub light_levels: LightLevels,

    // --- Debouncing ---
    /// Consecutive day samples before dawn is accepted.
    pub min_day_streak: u8,
    /// Consecutive night samples before dusk is accepted.
    pub min_night_streak: u8,
    /// Minimum day length, in night ticks, before dusk may fire.
    pub minimum_day_before_night: u16,
    /// Day sample period divided by night sample period.
    pub sample_rate_ratio: u8,

    // --- Afterglow ---
    pub afterglow: AfterglowParams,
    /// Optional late-night brightness reduction.
    pub brightness_limits: Option<BrightnessLimits>,

    // --- Output ---
    /// Duty written at dusk (8-bit PWM).
    pub max_duty: u8,
    /// Duty decrement per wake event during SlowTurnoff.
    pub dimmer_step: u8,

    // --- Timing & power ---
    pub schedule: Schedule,
    /// Raw sleep-mode selector (0 Idle, 1 ADC noise reduction, 2 power-down, 4 standby).
    pub sleep_level: u8,

    // --- Behaviour ---
    pub dawn_policy: DawnPolicy,
    /// Boot into a fixed-length night for installation checks.
    pub night_install_ticks: Option<u16>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(Profile::Production)
    }
}

impl EngineConfig {
    /// Build the configuration for a compiled-in profile.
    pub fn preset(profile: Profile) -> Self {
        let schedule = match profile {
            Profile::Production => Schedule {
                day: CadenceTiming {
                    wake_interval_ms: 8000,
                    wakes_per_sample: 15,
                },
                night: CadenceTiming {
                    wake_interval_ms: 4000,
                    wakes_per_sample: 15,
                },
            },
            Profile::Testing => Schedule {
                day: CadenceTiming {
                    wake_interval_ms: 250,
                    wakes_per_sample: 8,
                },
                night: CadenceTiming {
                    wake_interval_ms: 125,
                    wakes_per_sample: 8,
                },
            },
        };

        Self {
            light_levels: LightLevels::Millivolts {
                supply_mv: DEFAULT_SUPPLY_MV,
                dark_mv: 450,
                hysteresis_mv: 10,
            },
            min_day_streak: 30,
            min_night_streak: 5,
            minimum_day_before_night: 300, // 5 h; shortest day is near 8 h
            sample_rate_ratio: 2,
            afterglow: AfterglowParams::default(),
            brightness_limits: None,
            max_duty: u8::MAX,
            dimmer_step: 2, // ~10 min fade at a 4 s wake interval
            schedule,
            sleep_level: SleepLevel::PowerDown.as_raw(),
            dawn_policy: DawnPolicy::AbortToDay,
            night_install_ticks: None,
        }
    }

    /// Check every rule strictly.  Returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.resolve().adjustments.first() {
            Some(e) => Err(*e),
            None => Ok(()),
        }
    }

    /// Resolve into runtime [`Settings`], clamping malformed values.
    ///
    /// Every adjustment is logged at `warn` and returned alongside.
    pub fn sanitize(&self) -> Sanitized {
        let resolved = self.resolve();
        for adjustment in &resolved.adjustments {
            warn!("config: {} (clamped)", adjustment);
        }

        let implied = self.schedule.implied_ratio();
        if implied != resolved.settings.sample_rate_ratio as u64 {
            warn!(
                "config: sample-rate ratio {} differs from the {} implied by the wake schedule",
                resolved.settings.sample_rate_ratio, implied
            );
        }

        let s = &resolved.settings;
        info!(
            "config: thresholds dark={} light={}, streaks day={} night={}, min day ticks={}, \
             afterglow {}..={} (constant {}), sleep={:?}",
            s.thresholds.dark,
            s.thresholds.light,
            s.streaks.day,
            s.streaks.night,
            s.min_day_ticks,
            s.afterglow.min,
            s.afterglow.max,
            s.afterglow.tick_constant,
            s.sleep_level,
        );
        resolved
    }

    fn resolve(&self) -> Sanitized {
        let mut adjustments: Vec<ConfigError, MAX_ADJUSTMENTS> = Vec::new();
        let mut note = |e: ConfigError| {
            // Capacity covers one entry per rule.
            let _ = adjustments.push(e);
        };

        // Thresholds
        let mut thresholds = match self.light_levels {
            LightLevels::Millivolts {
                supply_mv,
                dark_mv,
                hysteresis_mv,
            } => {
                let supply = if supply_mv == 0 {
                    note(ConfigError::ZeroSupplyVoltage);
                    DEFAULT_SUPPLY_MV
                } else {
                    supply_mv
                };
                Thresholds::from_millivolts(supply, dark_mv, hysteresis_mv)
            }
            LightLevels::Raw { dark, light } => Thresholds { dark, light },
        };
        if !thresholds.is_valid() {
            note(ConfigError::ThresholdsInverted {
                dark: thresholds.dark,
                light: thresholds.light,
            });
            if thresholds.dark == u8::MAX {
                thresholds = Thresholds {
                    dark: u8::MAX - 1,
                    light: u8::MAX,
                };
            } else {
                thresholds.light = thresholds.dark + 1;
            }
        }

        // Streaks
        if self.min_day_streak == 0 || self.min_night_streak == 0 {
            note(ConfigError::ZeroStreak);
        }
        let streaks = StreakLimits {
            day: self.min_day_streak.max(1),
            night: self.min_night_streak.max(1),
        };

        // Day length gate
        let ratio = if self.sample_rate_ratio == 0 {
            note(ConfigError::ZeroSampleRateRatio);
            1
        } else {
            self.sample_rate_ratio
        };
        let min_day_ticks = self.minimum_day_before_night / ratio as u16;

        // Afterglow bounds
        let mut afterglow = self.afterglow;
        if afterglow.min == 0 {
            note(ConfigError::ZeroAfterglow);
            afterglow.min = 1;
        }
        if afterglow.min > afterglow.max {
            note(ConfigError::AfterglowBoundsInverted {
                min: afterglow.min,
                max: afterglow.max,
            });
            afterglow.max = afterglow.min;
        }

        let brightness_limits = self.brightness_limits.map(|mut limits| {
            if limits.normalise() {
                note(ConfigError::LimitationOrder);
            }
            if limits.pwm1 == 0 || limits.pwm2 == 0 {
                note(ConfigError::ZeroLimitationPwm);
                limits.pwm1 = limits.pwm1.max(1);
                limits.pwm2 = limits.pwm2.max(1);
            }
            limits
        });

        // Output
        let max_duty = if self.max_duty == 0 {
            note(ConfigError::ZeroMaxDuty);
            1
        } else {
            self.max_duty
        };
        let dimmer_step = if self.dimmer_step == 0 {
            note(ConfigError::ZeroDimmerStep);
            1
        } else {
            self.dimmer_step
        };

        // Schedule
        let mut schedule = self.schedule;
        for cadence in [Cadence::Day, Cadence::Night] {
            let timing = match cadence {
                Cadence::Day => &mut schedule.day,
                Cadence::Night => &mut schedule.night,
            };
            if timing.wake_interval_ms == 0 {
                note(ConfigError::ZeroWakeInterval(cadence));
                timing.wake_interval_ms = 1;
            }
            if timing.wakes_per_sample == 0 {
                note(ConfigError::ZeroWakesPerSample(cadence));
                timing.wakes_per_sample = 1;
            }
        }

        let sleep_level = SleepLevel::from_raw(self.sleep_level).unwrap_or_else(|| {
            note(ConfigError::ReservedSleepLevel(self.sleep_level));
            SleepLevel::Idle
        });

        let night_install_ticks = match self.night_install_ticks {
            Some(0) => {
                note(ConfigError::ZeroNightInstall);
                None
            }
            other => other,
        };

        Sanitized {
            settings: Settings {
                thresholds,
                streaks,
                min_day_ticks,
                sample_rate_ratio: ratio,
                afterglow,
                brightness_limits,
                max_duty,
                dimmer_step,
                schedule,
                sleep_level,
                dawn_policy: self.dawn_policy,
                night_install_ticks,
            },
            adjustments,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Runtime form of [`EngineConfig`]: every invariant holds, every derived
/// value is computed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub streaks: StreakLimits,
    /// Day ticks that must accumulate before dusk may fire.
    pub min_day_ticks: u16,
    pub sample_rate_ratio: u8,
    pub afterglow: AfterglowParams,
    pub brightness_limits: Option<BrightnessLimits>,
    pub max_duty: u8,
    pub dimmer_step: u8,
    pub schedule: Schedule,
    pub sleep_level: SleepLevel,
    pub dawn_policy: DawnPolicy,
    pub night_install_ticks: Option<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        EngineConfig::default().resolve().settings
    }
}

/// Output of [`EngineConfig::sanitize`].
#[derive(Debug, Clone)]
pub struct Sanitized {
    pub settings: Settings,
    /// Every rule that needed clamping, in check order.
    pub adjustments: Vec<ConfigError, MAX_ADJUSTMENTS>,
}
