//! Shared mutable context threaded through every mode handler.
//!
//! `EngineContext` is the blackboard the handlers read from and write to:
//! the tick budget, the streak debouncer, the output commands the platform
//! applies after each event, and the resolved settings.  It replaces the
//! process-wide counters a bare-metal loop would keep.

use crate::afterglow::afterglow_ticks;
use crate::config::Settings;
use crate::control::dimmer::DimmerRamp;
use crate::light::StreakDebouncer;

// ---------------------------------------------------------------------------
// Output commands (written by handlers; applied by the engine)
// ---------------------------------------------------------------------------

/// Desired state of the light driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputCommands {
    /// Boost converter enable.
    pub enabled: bool,
    /// PWM duty, 0..=255.
    pub duty: u8,
}

impl OutputCommands {
    /// Light off.
    pub fn off() -> Self {
        Self::default()
    }
}

/// What happened at the last Day → Night transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuskReport {
    /// Day ticks accumulated before dusk.
    pub day_ticks: u16,
    /// Night ticks granted.
    pub afterglow: u16,
}

// ---------------------------------------------------------------------------
// EngineContext
// ---------------------------------------------------------------------------

pub struct EngineContext {
    // -- Counters --
    /// Day mode: elapsed day ticks (counts up).
    /// Night modes: remaining night ticks (counts down).
    pub tick_budget: u16,
    /// Night ticks elapsed since dusk, for brightness limitation.
    pub night_elapsed: u16,
    pub debouncer: StreakDebouncer,

    // -- Outputs --
    pub output: OutputCommands,
    pub ramp: DimmerRamp,

    // -- Reporting --
    /// Set by the Day handler when dusk fires; taken by the engine.
    pub dusk: Option<DuskReport>,
    /// Set with the unspent budget when dawn cuts a night short.
    pub dawn: Option<u16>,

    // -- Configuration --
    pub settings: Settings,
}

impl EngineContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            tick_budget: 0,
            night_elapsed: 0,
            debouncer: StreakDebouncer::new(settings.streaks),
            output: OutputCommands::off(),
            ramp: DimmerRamp::new(settings.dimmer_step),
            dusk: None,
            dawn: None,
            settings,
        }
    }

    /// Whether enough day has elapsed for dusk to be accepted.
    pub fn dusk_allowed(&self) -> bool {
        self.tick_budget >= self.settings.min_day_ticks
    }

    /// Convert the accumulated day ticks into the night budget.
    pub fn start_afterglow(&mut self) -> DuskReport {
        let report = DuskReport {
            day_ticks: self.tick_budget,
            afterglow: afterglow_ticks(self.tick_budget, &self.settings.afterglow),
        };
        self.tick_budget = report.afterglow;
        self.dusk = Some(report);
        report
    }

    /// Consume one night tick.  Returns `true` when the budget is spent.
    ///
    /// A zero budget is terminal on its own; the counter never wraps.
    pub fn consume_night_tick(&mut self) -> bool {
        if self.tick_budget == 0 {
            return true;
        }
        self.tick_budget -= 1;
        self.night_elapsed = self.night_elapsed.saturating_add(1);
        self.tick_budget == 0
    }
}
