//! Fuzz target: `EngineConfig::sanitize`
//!
//! Builds an engine config from arbitrary bytes and asserts that the
//! resolved settings always satisfy their invariants, so an engine built
//! from them can run.
//!
//! cargo fuzz run fuzz_config_sanitize

#![no_main]

use libfuzzer_sys::fuzz_target;
use solarlight::afterglow::{AfterglowParams, BrightnessLimits, afterglow_ticks};
use solarlight::config::{EngineConfig, LightLevels};
use solarlight::scheduler::{CadenceTiming, Schedule};

fn u16_at(data: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([data[i], data[i + 1]])
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 24 {
        return;
    }

    let config = EngineConfig {
        light_levels: if data[0] & 1 == 0 {
            LightLevels::Raw {
                dark: data[1],
                light: data[2],
            }
        } else {
            LightLevels::Millivolts {
                supply_mv: u16_at(data, 1),
                dark_mv: u16_at(data, 3),
                hysteresis_mv: data[5] as u16,
            }
        },
        min_day_streak: data[6],
        min_night_streak: data[7],
        minimum_day_before_night: u16_at(data, 8),
        sample_rate_ratio: data[10],
        afterglow: AfterglowParams {
            tick_constant: u16_at(data, 11),
            min: u16_at(data, 13),
            max: u16_at(data, 15),
        },
        brightness_limits: (data[0] & 2 != 0).then(|| BrightnessLimits {
            threshold1: data[17] as u16,
            pwm1: data[18],
            threshold2: data[19] as u16,
            pwm2: data[20],
        }),
        max_duty: data[21],
        dimmer_step: data[22],
        schedule: Schedule {
            day: CadenceTiming {
                wake_interval_ms: data[23] as u32,
                wakes_per_sample: data[1],
            },
            night: CadenceTiming {
                wake_interval_ms: data[2] as u32,
                wakes_per_sample: data[3],
            },
        },
        sleep_level: data[4],
        night_install_ticks: (data[0] & 4 != 0).then(|| data[5] as u16),
        ..EngineConfig::default()
    };

    let sanitized = config.sanitize();
    let s = sanitized.settings;
    assert!(s.thresholds.dark < s.thresholds.light);
    assert!(s.afterglow.min >= 1 && s.afterglow.min <= s.afterglow.max);
    assert!(s.max_duty >= 1 && s.dimmer_step >= 1);
    if let Some(l) = s.brightness_limits {
        assert!(l.threshold1 <= l.threshold2);
        assert!(l.pwm1 >= 1 && l.pwm2 >= 1);
    }
    assert_eq!(config.validate().is_ok(), sanitized.adjustments.is_empty());

    let a = afterglow_ticks(u16_at(data, 8), &s.afterglow);
    assert!(a >= s.afterglow.min && a <= s.afterglow.max);
});
