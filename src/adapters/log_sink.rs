//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured engine events to the
//! `log` facade (serial console on the device, stderr in the simulator).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as a single line.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | mode={:?} for {} | budget={} | streak day={} night={} | \
                     out={} duty={} | cadence={:?} | samples={} wakes={}",
                    t.mode,
                    t.ticks_in_mode,
                    t.tick_budget,
                    t.day_streak,
                    t.night_streak,
                    if t.output_enabled { "ON" } else { "OFF" },
                    t.duty,
                    t.cadence,
                    t.samples,
                    t.wakes,
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            AppEvent::Dusk {
                day_ticks,
                afterglow,
            } => {
                info!("DUSK | day_ticks={} afterglow={}", day_ticks, afterglow);
            }
            AppEvent::Dawn { ticks_left } => {
                info!("DAWN | ticks_left={}", ticks_left);
            }
            AppEvent::Started(mode) => {
                info!("START | initial_mode={:?}", mode);
            }
        }
    }
}
