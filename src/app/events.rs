//! Outbound application events.
//!
//! The [`Engine`](super::service::Engine) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, simulator report, test
//! recorder).

use crate::fsm::Mode;
use crate::scheduler::Cadence;

/// Structured events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The engine has started (carries the boot mode).
    Started(Mode),

    /// The mode machine moved.
    ModeChanged { from: Mode, to: Mode },

    /// Dusk was accepted and the night budget computed.
    Dusk { day_ticks: u16, afterglow: u16 },

    /// A dawn streak fired while the light was on or ramping.
    Dawn { ticks_left: u16 },

    /// Point-in-time snapshot, emitted on request.
    Telemetry(Telemetry),
}

/// Engine state suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub mode: Mode,
    /// Samples classified since `mode` was entered.
    pub ticks_in_mode: u64,
    /// Day ticks (Day) or remaining night ticks (other modes).
    pub tick_budget: u16,
    pub day_streak: u8,
    pub night_streak: u8,
    pub duty: u8,
    pub output_enabled: bool,
    pub cadence: Cadence,
    /// Light samples classified since boot.
    pub samples: u64,
    /// Wake events seen since boot.
    pub wakes: u64,
}
