//! Concrete mode handlers and table builder.
//!
//! ```text
//!            ┌──────[dusk streak, day ≥ minimum]──────┐
//!            │                                        ▼
//!   ┌──────▶ DAY                                    NIGHT ──[budget spent]──┐
//!   │        ▲ ▲                                      │                     │
//!   │        │ └─────────[dawn streak]*───────────────┘                     ▼
//!   │        └─────────────────[ramp finished]───────────────────── SLOW_TURNOFF
//!   │                                                                       ▲
//!   └──[dawn streak]*── NIGHT_INSTALL (boot) ──[budget spent]───────────────┘
//!
//!   * with DawnPolicy::FinishRamp a dawn streak enters SLOW_TURNOFF instead
//! ```

use super::context::{EngineContext, OutputCommands};
use super::{Mode, ModeDescriptor};
use crate::config::DawnPolicy;
use crate::control::dimmer::RampStep;
use crate::light::{Classification, Verdict, Watch};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_mode_table() -> [ModeDescriptor; Mode::COUNT] {
    [
        // Index 0 — Day
        ModeDescriptor {
            id: Mode::Day,
            name: "Day",
            on_enter: Some(day_enter),
            on_exit: None,
            on_sample: day_sample,
            on_wake: None,
        },
        // Index 1 — Night
        ModeDescriptor {
            id: Mode::Night,
            name: "Night",
            on_enter: Some(night_enter),
            on_exit: None,
            on_sample: night_sample,
            on_wake: None,
        },
        // Index 2 — SlowTurnoff
        ModeDescriptor {
            id: Mode::SlowTurnoff,
            name: "SlowTurnoff",
            on_enter: Some(slow_turnoff_enter),
            on_exit: None,
            on_sample: slow_turnoff_sample,
            on_wake: Some(slow_turnoff_wake),
        },
        // Index 3 — NightInstall
        ModeDescriptor {
            id: Mode::NightInstall,
            name: "NightInstall",
            on_enter: Some(night_install_enter),
            on_exit: None,
            on_sample: night_install_sample,
            on_wake: None,
        },
    ]
}

/// Where a confirmed dawn leads from a lit mode.
fn dawn_target(ctx: &EngineContext) -> Mode {
    match ctx.settings.dawn_policy {
        DawnPolicy::AbortToDay => Mode::Day,
        DawnPolicy::FinishRamp => Mode::SlowTurnoff,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DAY — light off, counting day ticks, watching for dusk
// ═══════════════════════════════════════════════════════════════════════════

fn day_enter(ctx: &mut EngineContext) {
    ctx.output = OutputCommands::off();
    ctx.tick_budget = 0;
    ctx.night_elapsed = 0;
    ctx.debouncer.reset();
    info!("DAY: light off, counting day ticks");
}

fn day_sample(ctx: &mut EngineContext, class: Classification) -> Option<Mode> {
    let allowed = ctx.dusk_allowed();
    match ctx.debouncer.observe(class, Watch::Dusk, allowed) {
        Verdict::Dusk => {
            let report = ctx.start_afterglow();
            info!(
                "DAY: dusk after {} day ticks, afterglow {} ticks",
                report.day_ticks, report.afterglow
            );
            Some(Mode::Night)
        }
        _ => {
            if class == Classification::Day {
                ctx.tick_budget = ctx.tick_budget.saturating_add(1);
            }
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  NIGHT — light on, afterglow budget counting down
// ═══════════════════════════════════════════════════════════════════════════

fn night_enter(ctx: &mut EngineContext) {
    ctx.output = OutputCommands {
        enabled: true,
        duty: ctx.settings.max_duty,
    };
    ctx.night_elapsed = 0;
    ctx.debouncer.reset();
    info!(
        "NIGHT: light on at duty {} for {} ticks",
        ctx.output.duty, ctx.tick_budget
    );
}

fn night_sample(ctx: &mut EngineContext, class: Classification) -> Option<Mode> {
    if ctx.debouncer.observe(class, Watch::Dawn, true) == Verdict::Dawn {
        info!("NIGHT: dawn with {} ticks left", ctx.tick_budget);
        ctx.dawn = Some(ctx.tick_budget);
        return Some(dawn_target(ctx));
    }
    if class != Classification::Night {
        return None;
    }

    let spent = ctx.consume_night_tick();
    if let Some(limits) = ctx.settings.brightness_limits {
        let duty = limits.duty_after(ctx.night_elapsed, ctx.settings.max_duty);
        if duty != ctx.output.duty {
            info!("NIGHT: brightness limited to duty {}", duty);
            ctx.output.duty = duty;
        }
    }
    debug!("NIGHT: {} ticks left", ctx.tick_budget);
    spent.then_some(Mode::SlowTurnoff)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLOW_TURNOFF — duty ramping down one step per wake
// ═══════════════════════════════════════════════════════════════════════════

fn slow_turnoff_enter(ctx: &mut EngineContext) {
    ctx.debouncer.reset();
    info!(
        "SLOW_TURNOFF: dimming from {} in steps of {}",
        ctx.output.duty,
        ctx.ramp.step_size()
    );
}

fn slow_turnoff_sample(ctx: &mut EngineContext, class: Classification) -> Option<Mode> {
    match ctx.settings.dawn_policy {
        DawnPolicy::AbortToDay => {
            if ctx.debouncer.observe(class, Watch::Dawn, true) == Verdict::Dawn {
                info!("SLOW_TURNOFF: dawn, abandoning ramp at duty {}", ctx.output.duty);
                ctx.dawn = Some(0);
                return Some(Mode::Day);
            }
            None
        }
        DawnPolicy::FinishRamp => None,
    }
}

fn slow_turnoff_wake(ctx: &mut EngineContext) -> Option<Mode> {
    match ctx.ramp.step(ctx.output.duty) {
        RampStep::Dimmed(duty) => {
            ctx.output.duty = duty;
            None
        }
        RampStep::Finished => {
            ctx.output = OutputCommands::off();
            info!("SLOW_TURNOFF: ramp finished");
            Some(Mode::Day)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  NIGHT_INSTALL — fixed-budget night at boot
// ═══════════════════════════════════════════════════════════════════════════

fn night_install_enter(ctx: &mut EngineContext) {
    ctx.tick_budget = ctx.settings.night_install_ticks.unwrap_or(0);
    ctx.night_elapsed = 0;
    ctx.debouncer.reset();
    ctx.output = OutputCommands {
        enabled: true,
        duty: ctx.settings.max_duty,
    };
    info!("NIGHT_INSTALL: light on for {} ticks", ctx.tick_budget);
}

fn night_install_sample(ctx: &mut EngineContext, class: Classification) -> Option<Mode> {
    if ctx.debouncer.observe(class, Watch::Dawn, true) == Verdict::Dawn {
        info!("NIGHT_INSTALL: dawn with {} ticks left", ctx.tick_budget);
        ctx.dawn = Some(ctx.tick_budget);
        return Some(dawn_target(ctx));
    }
    if class == Classification::Ambiguous {
        return None;
    }
    ctx.consume_night_tick().then_some(Mode::SlowTurnoff)
}
