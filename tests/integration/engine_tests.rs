//! Engine scenarios: full day/night cycles driven through the port traits.

use crate::mock_hw::{
    AMBIGUOUS_SAMPLE, DAY_SAMPLE, MockPlatform, NIGHT_SAMPLE, PortCall, RecordingSink,
    bench_config, feed, feed_n, started,
};

use solarlight::afterglow::{AfterglowParams, BrightnessLimits};
use solarlight::app::events::AppEvent;
use solarlight::app::service::Engine;
use solarlight::config::{DawnPolicy, EngineConfig, Profile};
use solarlight::error::{ConfigError, Error, SensorError};
use solarlight::fsm::Mode;
use solarlight::power::{IdleDecision, SleepLevel};
use solarlight::scheduler::Cadence;

/// Bench config with a fixed afterglow of `ticks`.
fn short_night(ticks: u16) -> EngineConfig {
    EngineConfig {
        afterglow: AfterglowParams {
            tick_constant: 630,
            min: ticks,
            max: ticks,
        },
        ..bench_config()
    }
}

/// 400 day ticks followed by a confirmed dusk.
fn run_day(engine: &mut Engine, hw: &mut MockPlatform, sink: &mut RecordingSink) {
    feed_n(engine, hw, sink, DAY_SAMPLE, 400);
    feed_n(engine, hw, sink, NIGHT_SAMPLE, 3);
}

// ── Dusk ──────────────────────────────────────────────────────

#[test]
fn dusk_after_400_day_ticks_grants_230_night_ticks() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());

    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 400);
    assert_eq!(engine.mode(), Mode::Day);
    assert_eq!(engine.telemetry().tick_budget, 400);

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    assert_eq!(engine.mode(), Mode::Day, "two night samples are not a streak");

    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    assert_eq!(engine.mode(), Mode::Night);
    assert_eq!(sink.dusks(), vec![(400, 230)]);
    assert_eq!(engine.telemetry().tick_budget, 230);
    assert!(hw.enabled);
    assert_eq!(hw.duty, 255);
}

#[test]
fn ticks_in_mode_restart_at_each_transition() {
    let (mut engine, mut hw, mut sink) = started(&short_night(4));
    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 20);
    assert_eq!(engine.telemetry().ticks_in_mode, 20);

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    assert_eq!(engine.mode(), Mode::Night);
    assert_eq!(engine.telemetry().ticks_in_mode, 0);

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    let t = engine.telemetry();
    assert_eq!((t.mode, t.ticks_in_mode), (Mode::Night, 2));
    assert_eq!(t.samples, 25);
}

#[test]
fn broken_streak_starts_over() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 10);

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    assert_eq!(engine.mode(), Mode::Day);
    assert_eq!(engine.telemetry().tick_budget, 11);

    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    assert_eq!(engine.mode(), Mode::Night);
    assert_eq!(sink.dusks(), vec![(11, 400)]);
}

#[test]
fn no_dusk_before_minimum_day() {
    let config = EngineConfig {
        minimum_day_before_night: 300,
        sample_rate_ratio: 2,
        ..bench_config()
    };
    let (mut engine, mut hw, mut sink) = started(&config);
    assert_eq!(engine.settings().min_day_ticks, 150);

    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 149);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 10);
    assert_eq!(engine.mode(), Mode::Day, "a short day must not end in dusk");
    assert_eq!(engine.telemetry().night_streak, 3, "gated streak is capped");
    assert_eq!(engine.telemetry().tick_budget, 149);

    feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    assert_eq!(engine.mode(), Mode::Night);
    assert_eq!(sink.dusks(), vec![(150, 400)]);
}

#[test]
fn ambiguous_samples_change_nothing() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 5);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    let before = engine.telemetry();

    feed_n(&mut engine, &mut hw, &mut sink, AMBIGUOUS_SAMPLE, 20);
    let after = engine.telemetry();
    assert_eq!(after.mode, Mode::Day);
    assert_eq!(after.tick_budget, before.tick_budget);
    assert_eq!(after.night_streak, before.night_streak);
    assert_eq!(after.samples, before.samples + 20);

    // The streak survives the ambiguous run.
    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    assert_eq!(engine.mode(), Mode::Night);
}

// ── Night budget ──────────────────────────────────────────────

#[test]
fn budget_exhausts_in_exactly_budget_night_samples() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    run_day(&mut engine, &mut hw, &mut sink);
    assert_eq!(engine.telemetry().tick_budget, 230);

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 229);
    assert_eq!(engine.mode(), Mode::Night);
    assert_eq!(engine.telemetry().tick_budget, 1);

    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);
    assert!(hw.enabled, "the ramp starts from a lit output");
}

#[test]
fn ambiguous_samples_do_not_spend_the_budget() {
    let (mut engine, mut hw, mut sink) = started(&short_night(4));
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    assert_eq!(engine.mode(), Mode::Night);

    feed_n(&mut engine, &mut hw, &mut sink, AMBIGUOUS_SAMPLE, 50);
    assert_eq!(engine.telemetry().tick_budget, 4);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 4);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);
}

#[test]
fn night_output_is_written_once() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    run_day(&mut engine, &mut hw, &mut sink);
    let writes = hw.duty_writes();

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 100);
    assert_eq!(hw.duty_writes(), writes, "unchanged duty is not rewritten");
}

#[test]
fn brightness_limits_step_the_duty_down() {
    let config = EngineConfig {
        brightness_limits: Some(BrightnessLimits {
            threshold1: 2,
            pwm1: 170,
            threshold2: 4,
            pwm2: 105,
        }),
        ..short_night(10)
    };
    let (mut engine, mut hw, mut sink) = started(&config);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    assert_eq!(hw.duty, 255);

    let mut seen = Vec::new();
    for _ in 0..5 {
        feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
        seen.push(hw.duty);
    }
    assert_eq!(seen, vec![255, 170, 170, 105, 105]);
}

#[test]
fn zero_limitation_duty_still_lights_the_night() {
    let config = EngineConfig {
        brightness_limits: Some(BrightnessLimits {
            threshold1: 1,
            pwm1: 0,
            threshold2: 2,
            pwm2: 0,
        }),
        ..short_night(10)
    };
    let (mut engine, mut hw, mut sink) = started(&config);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);

    for _ in 0..5 {
        feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
        assert_eq!(engine.mode(), Mode::Night);
        assert!(hw.enabled);
        assert!(hw.duty >= 1, "night output dimmed to zero");
    }
    assert_eq!(hw.duty, 1);
}

// ── Slow turn-off ─────────────────────────────────────────────

#[test]
fn ramp_finishes_within_ceil_max_over_step_wakes() {
    let (mut engine, mut hw, mut sink) = started(&short_night(2));
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);

    // 255 in steps of 2: 127 dims, the 128th wake finishes.
    for _ in 0..127 {
        engine.on_wake(&mut hw, &mut sink);
    }
    assert_eq!(engine.mode(), Mode::SlowTurnoff);
    assert_eq!(hw.duty, 1);
    assert!(hw.enabled);

    engine.on_wake(&mut hw, &mut sink);
    assert_eq!(engine.mode(), Mode::Day);
    assert!(!hw.enabled);
    assert_eq!(hw.duty, 0);
    assert_eq!(
        sink.mode_changes(),
        vec![
            (Mode::Day, Mode::Night),
            (Mode::Night, Mode::SlowTurnoff),
            (Mode::SlowTurnoff, Mode::Day),
        ]
    );
}

#[test]
fn ramp_disables_before_zeroing_duty() {
    let config = EngineConfig {
        dimmer_step: 255,
        ..short_night(1)
    };
    let (mut engine, mut hw, mut sink) = started(&config);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 4);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);

    hw.clear();
    engine.on_wake(&mut hw, &mut sink);
    assert_eq!(engine.mode(), Mode::Day);
    assert_eq!(
        &hw.calls[..2],
        &[PortCall::SetOutputEnabled(false), PortCall::SetDuty(0)]
    );
}

// ── Dawn ──────────────────────────────────────────────────────

#[test]
fn dawn_aborts_the_night() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    run_day(&mut engine, &mut hw, &mut sink);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 30);

    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 3);
    assert_eq!(engine.mode(), Mode::Day);
    assert!(!hw.enabled);
    assert!(sink.events.contains(&AppEvent::Dawn { ticks_left: 200 }));
}

#[test]
fn dawn_aborts_the_ramp() {
    let (mut engine, mut hw, mut sink) = started(&short_night(1));
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 4);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);

    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 3);
    assert_eq!(engine.mode(), Mode::Day);
    assert!(sink.events.contains(&AppEvent::Dawn { ticks_left: 0 }));
    assert!(!hw.enabled);
}

#[test]
fn finish_ramp_policy_dims_out_instead() {
    let config = EngineConfig {
        dawn_policy: DawnPolicy::FinishRamp,
        dimmer_step: 51,
        ..bench_config()
    };
    let (mut engine, mut hw, mut sink) = started(&config);
    run_day(&mut engine, &mut hw, &mut sink);

    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 3);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);
    assert!(hw.enabled);

    // Samples no longer matter; 255 / 51 = 5 wakes to dark.
    for _ in 0..4 {
        feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE);
        assert_eq!(engine.mode(), Mode::SlowTurnoff);
    }
    feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE);
    assert_eq!(engine.mode(), Mode::Day);
    assert!(!hw.enabled);
}

// ── Round trip ────────────────────────────────────────────────

#[test]
fn full_cycle_returns_to_a_clean_day() {
    let (mut engine, mut hw, mut sink) = started(&short_night(3));
    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 20);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3 + 3);
    for _ in 0..128 {
        engine.on_wake(&mut hw, &mut sink);
    }
    assert_eq!(engine.mode(), Mode::Day);

    let t = engine.telemetry();
    assert_eq!(t.tick_budget, 0);
    assert_eq!(t.day_streak, 0);
    assert_eq!(t.night_streak, 0);
    assert!(!t.output_enabled);
    assert_eq!(t.cadence, Cadence::Day);

    // The next day accumulates from zero.
    feed_n(&mut engine, &mut hw, &mut sink, DAY_SAMPLE, 7);
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    assert_eq!(sink.dusks(), vec![(20, 3), (7, 3)]);
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn wake_interval_follows_the_mode() {
    let (mut engine, mut hw, mut sink) = started(&short_night(1));
    assert_eq!(
        hw.calls[..],
        [
            PortCall::SetDuty(0),
            PortCall::SetOutputEnabled(false),
            PortCall::SetWakeInterval {
                cadence: Cadence::Day,
                interval_ms: 8000
            },
        ]
    );

    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 3);
    assert_eq!((hw.cadence, hw.interval_ms), (Some(Cadence::Night), 4000));

    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);
    assert_eq!((hw.cadence, hw.interval_ms), (Some(Cadence::Night), 4000));

    for _ in 0..128 {
        engine.on_wake(&mut hw, &mut sink);
    }
    assert_eq!((hw.cadence, hw.interval_ms), (Some(Cadence::Day), 8000));
    assert_eq!(
        hw.count(|c| matches!(c, PortCall::SetWakeInterval { .. })),
        4,
        "programmed at start and on each of the three mode changes"
    );
}

#[test]
fn production_profile_samples_every_fifteenth_wake() {
    let (mut engine, mut hw, mut sink) = started(&EngineConfig::preset(Profile::Production));
    assert_eq!(hw.interval_ms, 8000);
    assert_eq!(feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE), 15);
    assert_eq!(feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE), 15);
    assert_eq!(engine.telemetry().wakes, 30);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn unrequested_sample_is_rejected() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    let before = engine.telemetry();

    let result = engine.on_sample_ready(NIGHT_SAMPLE, &mut hw, &mut sink);
    assert_eq!(result, Err(Error::Sensor(SensorError::Unrequested)));
    assert_eq!(engine.telemetry(), before);
    assert_eq!(sink.events, vec![AppEvent::Started(Mode::Day)]);
}

#[test]
fn overlapping_conversion_is_not_started() {
    let (mut engine, mut hw, mut sink) = started(&bench_config());
    engine.on_wake(&mut hw, &mut sink);
    engine.on_wake(&mut hw, &mut sink);
    engine.on_wake(&mut hw, &mut sink);
    assert_eq!(hw.conversions(), 1);
    assert!(engine.sample_in_flight());
}

// ── Sleep policy ──────────────────────────────────────────────

#[test]
fn idle_sleeps_deep_only_while_dark_and_quiet() {
    let (mut engine, mut hw, mut sink) = started(&short_night(5));
    assert_eq!(engine.idle(&mut hw), IdleDecision::Sleep(SleepLevel::PowerDown));
    assert_eq!(hw.last_call(), Some(&PortCall::Sleep(SleepLevel::PowerDown)));

    engine.on_wake(&mut hw, &mut sink);
    hw.clear();
    assert_eq!(engine.idle(&mut hw), IdleDecision::StayAwake);
    assert!(hw.calls.is_empty(), "no sleep while converting");

    hw.conversion_pending = false;
    engine
        .on_sample_ready(NIGHT_SAMPLE, &mut hw, &mut sink)
        .expect("requested");
    feed_n(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE, 2);
    assert_eq!(engine.mode(), Mode::Night);
    assert_eq!(engine.idle(&mut hw), IdleDecision::Sleep(SleepLevel::Idle));
}

// ── Night install ─────────────────────────────────────────────

#[test]
fn night_install_boots_lit_and_counts_every_decided_sample() {
    let config = EngineConfig {
        night_install_ticks: Some(4),
        ..bench_config()
    };
    let (mut engine, mut hw, mut sink) = started(&config);
    assert_eq!(engine.mode(), Mode::NightInstall);
    assert_eq!(sink.events[0], AppEvent::Started(Mode::NightInstall));
    assert!(hw.enabled);
    assert_eq!(hw.cadence, Some(Cadence::Night));

    feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE);
    feed(&mut engine, &mut hw, &mut sink, AMBIGUOUS_SAMPLE);
    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    feed(&mut engine, &mut hw, &mut sink, DAY_SAMPLE);
    assert_eq!(engine.mode(), Mode::NightInstall);

    feed(&mut engine, &mut hw, &mut sink, NIGHT_SAMPLE);
    assert_eq!(engine.mode(), Mode::SlowTurnoff);
    assert!(sink.dusks().is_empty(), "no afterglow is computed for an install night");
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn try_new_rejects_what_new_clamps() {
    let config = EngineConfig {
        max_duty: 0,
        ..bench_config()
    };
    assert!(matches!(
        Engine::try_new(&config),
        Err(Error::Config(ConfigError::ZeroMaxDuty))
    ));

    let engine = Engine::new(&config);
    assert_eq!(engine.settings().max_duty, 1);
}

#[test]
fn reserved_sleep_level_falls_back_to_idle() {
    let config = EngineConfig {
        sleep_level: 3,
        ..bench_config()
    };
    let (engine, mut hw, _sink) = started(&config);
    assert_eq!(engine.idle(&mut hw), IdleDecision::Sleep(SleepLevel::Idle));
}
