//! Two-speed sample scheduler.
//!
//! A single periodic wake source drives everything.  The wake interval
//! and the number of wakes between light samples both depend on the
//! current cadence, which is how "a sample every two minutes by day,
//! every minute by night" is realised from one timer.
//!
//! ```text
//!  wake ─▶ countdown-1 ─▶ 0? ──yes──▶ reload(cadence) ─▶ SampleDue
//!                          │
//!                          no ──▶ Idle
//! ```

use log::trace;
use serde::{Deserialize, Serialize};

/// Sampling speed, selected from the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    /// Light off, slow sampling.
    Day,
    /// Light on or ramping, fast sampling.
    Night,
}

/// Wake-timer settings for one cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceTiming {
    /// Period of the wake timer in milliseconds.
    pub wake_interval_ms: u32,
    /// Wake events per light sample.
    pub wakes_per_sample: u8,
}

impl CadenceTiming {
    /// Wall-clock milliseconds between two samples.
    pub fn sample_period_ms(&self) -> u64 {
        self.wake_interval_ms as u64 * self.wakes_per_sample as u64
    }
}

/// Both cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub day: CadenceTiming,
    pub night: CadenceTiming,
}

impl Schedule {
    pub fn timing(&self, cadence: Cadence) -> CadenceTiming {
        match cadence {
            Cadence::Day => self.day,
            Cadence::Night => self.night,
        }
    }

    /// Day sample period divided by night sample period, rounded.
    pub fn implied_ratio(&self) -> u64 {
        let night = self.night.sample_period_ms().max(1);
        (self.day.sample_period_ms() + night / 2) / night
    }
}

/// What a single wake event asks of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// Nothing to sample this wake.
    Idle,
    /// The countdown expired: start a light-sensor conversion.
    SampleDue,
}

/// Wake countdown seeded from the per-cadence `wakes_per_sample`.
pub struct SampleScheduler {
    schedule: Schedule,
    countdown: u8,
    wakes: u64,
}

impl SampleScheduler {
    /// Seed the countdown from `initial`'s cadence.
    pub fn new(schedule: Schedule, initial: Cadence) -> Self {
        Self {
            schedule,
            countdown: schedule.timing(initial).wakes_per_sample.max(1),
            wakes: 0,
        }
    }

    /// Count one wake event.  `cadence` is the current mode's cadence and
    /// is only consulted when the countdown is reloaded.
    pub fn on_wake(&mut self, cadence: Cadence) -> WakeOutcome {
        self.wakes = self.wakes.wrapping_add(1);
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            trace!("wake {}: {} until sample", self.wakes, self.countdown);
            return WakeOutcome::Idle;
        }
        self.countdown = self.schedule.timing(cadence).wakes_per_sample.max(1);
        WakeOutcome::SampleDue
    }

    /// Wake interval the timer should run at for `cadence`.
    pub fn wake_interval_ms(&self, cadence: Cadence) -> u32 {
        self.schedule.timing(cadence).wake_interval_ms
    }

    pub fn countdown(&self) -> u8 {
        self.countdown
    }

    /// Total wake events seen since boot.
    pub fn wakes(&self) -> u64 {
        self.wakes
    }
}
