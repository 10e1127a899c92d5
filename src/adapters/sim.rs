//! Simulated platform.
//!
//! Stands in for the microcontroller on the host: a virtual clock advanced
//! one wake interval at a time, a light sensor reading a synthetic
//! daylight curve, and a light driver that integrates on-time so a run can
//! be judged for energy use.
//!
//! Interrupts become queue pushes: [`SimPlatform::sleep_until_wake`]
//! pushes [`Event::Wake`], [`SimPlatform::finish_conversion`] pushes
//! [`Event::SampleReady`].

use log::trace;

use crate::app::ports::{LightOutputPort, LightSensorPort, PowerPort, WakeTimerPort};
use crate::events::{Event, EventQueue};
use crate::power::SleepLevel;
use crate::scheduler::Cadence;

pub const MS_PER_HOUR: u64 = 3_600_000;
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

// ───────────────────────────────────────────────────────────────
// Light curves
// ───────────────────────────────────────────────────────────────

/// Ambient light as seen by the sensor at a point in simulated time.
pub trait LightCurve {
    fn level_at(&self, t_ms: u64) -> u8;
}

impl<F: Fn(u64) -> u8> LightCurve for F {
    fn level_at(&self, t_ms: u64) -> u8 {
        self(t_ms)
    }
}

/// A passing cloud: light capped at `level` for a window each day.
#[derive(Debug, Clone, Copy)]
pub struct Cloud {
    /// Offset from midnight.
    pub start_ms: u64,
    pub duration_ms: u64,
    pub level: u8,
}

/// Repeating 24 h cycle with the day centred on noon and linear twilight
/// ramps around sunrise and sunset.
#[derive(Debug, Clone, Copy)]
pub struct DaylightCurve {
    pub day_length_ms: u64,
    pub twilight_ms: u64,
    pub night_level: u8,
    pub day_level: u8,
    pub cloud: Option<Cloud>,
}

impl DaylightCurve {
    pub fn new(day_hours: f32, twilight_minutes: u32) -> Self {
        let day_length_ms = ((day_hours.clamp(0.0, 24.0) * MS_PER_HOUR as f32) as u64).min(MS_PER_DAY);
        Self {
            day_length_ms,
            twilight_ms: u64::from(twilight_minutes) * 60_000,
            night_level: 5,
            day_level: 230,
            cloud: None,
        }
    }

    pub fn with_cloud(mut self, cloud: Cloud) -> Self {
        self.cloud = Some(cloud);
        self
    }

    /// Sunrise as an offset from midnight.
    pub fn sunrise_ms(&self) -> u64 {
        (MS_PER_DAY - self.day_length_ms) / 2
    }

    pub fn sunset_ms(&self) -> u64 {
        self.sunrise_ms() + self.day_length_ms
    }

    /// Fraction of full daylight, in thousandths.
    fn brightness_permille(&self, tod: u64) -> u64 {
        let half = self.twilight_ms / 2;
        let width = self.twilight_ms.max(1);
        let dawn_start = self.sunrise_ms().saturating_sub(half);
        let dusk_end = self.sunset_ms() + half;

        if tod < dawn_start || tod >= dusk_end {
            0
        } else if tod < self.sunrise_ms() + half {
            ((tod - dawn_start) * 1000 / width).min(1000)
        } else if tod >= self.sunset_ms().saturating_sub(half) {
            ((dusk_end - tod) * 1000 / width).min(1000)
        } else {
            1000
        }
    }
}

impl LightCurve for DaylightCurve {
    fn level_at(&self, t_ms: u64) -> u8 {
        let tod = t_ms % MS_PER_DAY;
        let span = u64::from(self.day_level.saturating_sub(self.night_level));
        let level = u64::from(self.night_level) + span * self.brightness_permille(tod) / 1000;
        let level = level.min(u64::from(u8::MAX)) as u8;

        match self.cloud {
            Some(c) if tod >= c.start_ms && tod < c.start_ms + c.duration_ms => level.min(c.level),
            _ => level,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Platform
// ───────────────────────────────────────────────────────────────

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub wakes: u64,
    pub conversions: u64,
    /// Time with the driver enabled.
    pub lit_ms: u64,
    /// Integral of duty over time, in duty·ms.
    pub duty_ms: u64,
    /// Sleeps entered, indexed by raw sleep selector.
    pub sleeps: [u64; 5],
}

pub struct SimPlatform<C> {
    curve: C,
    now_ms: u64,
    wake_interval_ms: u32,
    cadence: Cadence,
    conversion_pending: bool,
    output_enabled: bool,
    duty: u8,
    stats: SimStats,
}

impl<C: LightCurve> SimPlatform<C> {
    pub fn new(curve: C) -> Self {
        Self {
            curve,
            now_ms: 0,
            wake_interval_ms: 1000,
            cadence: Cadence::Day,
            conversion_pending: false,
            output_enabled: false,
            duty: 0,
            stats: SimStats::default(),
        }
    }

    /// Start the clock at `t_ms` instead of midnight.
    pub fn starting_at(mut self, t_ms: u64) -> Self {
        self.now_ms = t_ms;
        self
    }

    /// Complete a pending conversion, delivering its result as an interrupt.
    /// Returns `false` if nothing was pending or the queue was full.
    pub fn finish_conversion<const N: usize>(&mut self, queue: &EventQueue<N>) -> bool {
        if !self.conversion_pending {
            return false;
        }
        self.conversion_pending = false;
        let level = self.curve.level_at(self.now_ms);
        trace!("sim t={}ms: conversion -> {}", self.now_ms, level);
        queue.push(Event::SampleReady(level))
    }

    /// Let one wake interval pass and deliver the timer interrupt.
    pub fn sleep_until_wake<const N: usize>(&mut self, queue: &EventQueue<N>) -> bool {
        let dt = u64::from(self.wake_interval_ms);
        if self.output_enabled {
            self.stats.lit_ms += dt;
            self.stats.duty_ms += dt * u64::from(self.duty);
        }
        self.now_ms += dt;
        self.stats.wakes += 1;
        queue.push(Event::Wake)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn wake_interval_ms(&self) -> u32 {
        self.wake_interval_ms
    }

    pub fn output(&self) -> (bool, u8) {
        (self.output_enabled, self.duty)
    }

    pub fn conversion_pending(&self) -> bool {
        self.conversion_pending
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn curve(&self) -> &C {
        &self.curve
    }
}

impl<C> LightSensorPort for SimPlatform<C> {
    fn start_conversion(&mut self) {
        self.conversion_pending = true;
        self.stats.conversions += 1;
    }
}

impl<C> LightOutputPort for SimPlatform<C> {
    fn set_output_enabled(&mut self, enabled: bool) {
        self.output_enabled = enabled;
    }

    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }
}

impl<C> WakeTimerPort for SimPlatform<C> {
    fn set_wake_interval(&mut self, cadence: Cadence, interval_ms: u32) {
        self.cadence = cadence;
        self.wake_interval_ms = interval_ms.max(1);
    }
}

impl<C> PowerPort for SimPlatform<C> {
    fn enter_low_power_sleep(&mut self, level: SleepLevel) {
        self.stats.sleeps[usize::from(level.as_raw())] += 1;
    }
}
