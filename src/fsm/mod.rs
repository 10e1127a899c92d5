//! Function-pointer mode state machine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  ModeTable                                                           │
//! │  ┌─────────────┬──────────┬─────────┬───────────────┬─────────────┐  │
//! │  │ Mode        │ on_enter │ on_exit │ on_sample     │ on_wake     │  │
//! │  ├─────────────┼──────────┼─────────┼───────────────┼─────────────┤  │
//! │  │ Day         │ fn(ctx)  │  —      │ fn(ctx, cls)  │  —          │  │
//! │  │ Night       │ fn(ctx)  │  —      │ fn(ctx, cls)  │  —          │  │
//! │  │ SlowTurnoff │ fn(ctx)  │  —      │ fn(ctx, cls)  │ fn(ctx)     │  │
//! │  │ NightInstall│ fn(ctx)  │  —      │ fn(ctx, cls)  │  —          │  │
//! │  └─────────────┴──────────┴─────────┴───────────────┴─────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two event kinds drive the machine: a classified light sample (one
//! tick) and a raw wake event.  A handler returning `Some(next)` makes
//! the machine run `on_exit` for the current mode, then `on_enter` for
//! the next.  All handlers receive `&mut EngineContext`.

pub mod context;
pub mod states;

use context::EngineContext;
use log::info;

use crate::light::Classification;
use crate::scheduler::Cadence;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Operating mode.  Exactly one is active.
/// Must stay in sync with the table built in [`states::build_mode_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// Light off, counting day ticks.
    Day = 0,
    /// Light on, counting the afterglow budget down.
    Night = 1,
    /// Light ramping down one step per wake.
    SlowTurnoff = 2,
    /// Boot-time night with a fixed budget.
    NightInstall = 3,
}

impl Mode {
    /// Number of modes, sizes the table.
    pub const COUNT: usize = 4;

    /// Convert a table index back to `Mode`.  Out-of-range indices assert
    /// in debug builds and fall back to `Day` (light off) in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Day,
            1 => Self::Night,
            2 => Self::SlowTurnoff,
            3 => Self::NightInstall,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Day
            }
        }
    }

    /// Sampling cadence while in this mode.
    pub fn cadence(self) -> Cadence {
        match self {
            Self::Day => Cadence::Day,
            Self::Night | Self::SlowTurnoff | Self::NightInstall => Cadence::Night,
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// `on_enter` / `on_exit` action, run once per transition.
pub type ModeActionFn = fn(&mut EngineContext);

/// Per-sample handler.  Returns `Some(next)` to transition.
pub type SampleHandlerFn = fn(&mut EngineContext, Classification) -> Option<Mode>;

/// Per-wake handler.  Returns `Some(next)` to transition.
pub type WakeHandlerFn = fn(&mut EngineContext) -> Option<Mode>;

// ---------------------------------------------------------------------------
// Mode descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct ModeDescriptor {
    pub id: Mode,
    pub name: &'static str,
    pub on_enter: Option<ModeActionFn>,
    pub on_exit: Option<ModeActionFn>,
    pub on_sample: SampleHandlerFn,
    pub on_wake: Option<WakeHandlerFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// Owns the mode table and the current pointer; the context is threaded
/// through every call.
pub struct Fsm {
    /// Indexed by `Mode as usize`.
    table: [ModeDescriptor; Mode::COUNT],
    current: usize,
    /// Samples (ticks) handled since boot.
    tick_count: u64,
    /// Tick at which the current mode was entered.
    mode_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [ModeDescriptor; Mode::COUNT], initial: Mode) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            mode_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once, before the first event.
    pub fn start(&mut self, ctx: &mut EngineContext) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Feed one classified sample.  Returns the new mode if it changed.
    pub fn on_sample(&mut self, ctx: &mut EngineContext, class: Classification) -> Option<Mode> {
        self.tick_count += 1;
        let next = (self.table[self.current].on_sample)(ctx, class);
        next.map(|id| self.transition(id, ctx))
    }

    /// Feed one wake event.  Returns the new mode if it changed.
    pub fn on_wake(&mut self, ctx: &mut EngineContext) -> Option<Mode> {
        let next = self.table[self.current].on_wake.and_then(|wake| wake(ctx));
        next.map(|id| self.transition(id, ctx))
    }

    /// Jump to `next` regardless of handler output.  A no-op if already there.
    pub fn force_transition(&mut self, next: Mode, ctx: &mut EngineContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_mode(&self) -> Mode {
        Mode::from_index(self.current)
    }

    /// Samples handled since the current mode was entered.
    pub fn ticks_in_current_mode(&self) -> u64 {
        self.tick_count - self.mode_entry_tick
    }

    /// Samples handled since boot.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: Mode, ctx: &mut EngineContext) -> Mode {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.mode_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
        next_id
    }
}
