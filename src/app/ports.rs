//! Port traits — the hexagonal boundary between the engine and the platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ Engine (domain)
//! ```
//!
//! Driven adapters (light sensor, light driver, wake timer, sleep, event
//! sinks) implement these traits.  The [`Engine`](super::service::Engine)
//! consumes them via generics, so the domain core never touches registers.
//!
//! None of the calls can fail from the engine's point of view: the control
//! loop has nowhere to report a fault, so adapters log and carry on.

use crate::power::SleepLevel;
use crate::scheduler::Cadence;

// ───────────────────────────────────────────────────────────────
// Light sensor (domain → hardware, completion comes back as an event)
// ───────────────────────────────────────────────────────────────

/// Asynchronous light-level reading.
///
/// The engine calls [`start_conversion`](Self::start_conversion); the
/// platform later reports the 8-bit result as
/// [`Event::SampleReady`](crate::events::Event::SampleReady).
pub trait LightSensorPort {
    fn start_conversion(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Light output (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait LightOutputPort {
    /// Hard on/off for the driver stage (boost converter enable).
    fn set_output_enabled(&mut self, enabled: bool);

    /// PWM duty register write, 0..=255.
    fn set_duty(&mut self, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Wake timer (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Periodic wake source.  The platform delivers each firing as
/// [`Event::Wake`](crate::events::Event::Wake).
pub trait WakeTimerPort {
    /// Switch the wake period.  Called at boot and on every mode change.
    fn set_wake_interval(&mut self, cadence: Cadence, interval_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Power (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Sleep at `level` until the next interrupt.
    fn enter_low_power_sleep(&mut self, level: SleepLevel);
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The engine emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::AppEvent) {}
}
