//! Engine — the hexagonal core.
//!
//! [`Engine`] owns the mode machine, its context and the sample scheduler.
//! The platform calls it from exactly one execution context, one event at
//! a time, so no handler ever observes a half-applied transition.  All I/O
//! flows through port traits injected at call sites.
//!
//! ```text
//!  Event::Wake ────────▶ ┌─────────────────────────┐ ──▶ LightSensorPort
//!  Event::SampleReady ──▶│         Engine          │ ──▶ LightOutputPort
//!                        │ FSM · Scheduler · Power │ ──▶ WakeTimerPort
//!                        └─────────────────────────┘ ──▶ EventSink
//!                                     │ idle()
//!                                     ▼
//!                                 PowerPort
//! ```

use log::{debug, info, warn};

use crate::config::{EngineConfig, Settings};
use crate::error::{Result, SensorError};
use crate::events::{Event, EventQueue};
use crate::fsm::context::{EngineContext, OutputCommands};
use crate::fsm::states::build_mode_table;
use crate::fsm::{Fsm, Mode};
use crate::light::classify;
use crate::power::{IdleDecision, idle_decision};
use crate::scheduler::{SampleScheduler, WakeOutcome};

use super::events::{AppEvent, Telemetry};
use super::ports::{EventSink, LightOutputPort, LightSensorPort, PowerPort, WakeTimerPort};

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

pub struct Engine {
    fsm: Fsm,
    ctx: EngineContext,
    scheduler: SampleScheduler,
    /// Output state last written to the platform.
    applied: OutputCommands,
    /// A conversion was started and its result has not arrived yet.
    sample_in_flight: bool,
    samples: u64,
}

impl Engine {
    /// Build an engine from raw tunables, clamping anything malformed.
    ///
    /// Does **not** touch the platform; call [`start`](Self::start) next.
    pub fn new(config: &EngineConfig) -> Self {
        Self::from_settings(config.sanitize().settings)
    }

    /// Build an engine, rejecting malformed tunables instead of clamping.
    pub fn try_new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn from_settings(settings: Settings) -> Self {
        let boot = if settings.night_install_ticks.is_some() {
            Mode::NightInstall
        } else {
            Mode::Day
        };
        Self {
            fsm: Fsm::new(build_mode_table(), boot),
            ctx: EngineContext::new(settings),
            scheduler: SampleScheduler::new(settings.schedule, boot.cadence()),
            applied: OutputCommands::off(),
            sample_in_flight: false,
            samples: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the boot mode, program the wake timer and the light driver.
    pub fn start(&mut self, hw: &mut (impl LightOutputPort + WakeTimerPort), sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        let mode = self.fsm.current_mode();

        // Write both outputs unconditionally so the hardware matches the model.
        hw.set_duty(self.ctx.output.duty);
        hw.set_output_enabled(self.ctx.output.enabled);
        self.applied = self.ctx.output;
        self.program_wake_timer(mode, hw);

        sink.emit(&AppEvent::Started(mode));
        info!("Engine started in {:?}", mode);
    }

    // ── Event handlers ────────────────────────────────────────

    /// Handle one wake-timer firing.
    ///
    /// Advances the dimmer ramp (SlowTurnoff only), then the sample
    /// countdown; starts a conversion when a sample is due.
    pub fn on_wake(
        &mut self,
        hw: &mut (impl LightSensorPort + LightOutputPort + WakeTimerPort),
        sink: &mut impl EventSink,
    ) {
        let prev = self.fsm.current_mode();
        let next = self.fsm.on_wake(&mut self.ctx);
        self.settle(prev, next, hw, sink);

        let cadence = self.fsm.current_mode().cadence();
        if self.scheduler.on_wake(cadence) == WakeOutcome::SampleDue {
            if self.sample_in_flight {
                warn!("sample skipped: {}", SensorError::Busy);
            } else {
                self.sample_in_flight = true;
                hw.start_conversion();
            }
        }
    }

    /// Handle a completed light-sensor conversion.
    ///
    /// A result nobody asked for is logged and ignored.
    pub fn on_sample_ready(
        &mut self,
        raw: u8,
        hw: &mut (impl LightOutputPort + WakeTimerPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if !self.sample_in_flight {
            warn!("conversion result {} arrived unrequested, ignored", raw);
            return Err(SensorError::Unrequested.into());
        }
        self.sample_in_flight = false;
        self.samples = self.samples.wrapping_add(1);

        let class = classify(raw, &self.ctx.settings.thresholds);
        debug!(
            "sample {}: raw={} {:?} budget={}",
            self.samples, raw, class, self.ctx.tick_budget
        );

        let prev = self.fsm.current_mode();
        let next = self.fsm.on_sample(&mut self.ctx, class);

        if let Some(report) = self.ctx.dusk.take() {
            sink.emit(&AppEvent::Dusk {
                day_ticks: report.day_ticks,
                afterglow: report.afterglow,
            });
        }
        if let Some(ticks_left) = self.ctx.dawn.take() {
            sink.emit(&AppEvent::Dawn { ticks_left });
        }

        self.settle(prev, next, hw, sink);
        Ok(())
    }

    /// Route one queued event to its handler.
    pub fn dispatch(
        &mut self,
        event: Event,
        hw: &mut (impl LightSensorPort + LightOutputPort + WakeTimerPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match event {
            Event::Wake => {
                self.on_wake(hw, sink);
                Ok(())
            }
            Event::SampleReady(raw) => self.on_sample_ready(raw, hw, sink),
        }
    }

    /// Drain `queue`, handling events strictly one after another.
    ///
    /// Returns the number of events handled.
    pub fn run_pending<const N: usize>(
        &mut self,
        queue: &EventQueue<N>,
        hw: &mut (impl LightSensorPort + LightOutputPort + WakeTimerPort),
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        queue.drain(|event| {
            handled += 1;
            if let Err(e) = self.dispatch(event, hw, sink) {
                debug!("queued {:?} skipped: {}", event, e);
            }
        });
        handled
    }

    /// Return the processor to the lowest sleep level allowed right now.
    pub fn idle(&self, power: &mut impl PowerPort) -> IdleDecision {
        let decision = idle_decision(
            self.ctx.settings.sleep_level,
            self.ctx.output.enabled,
            self.sample_in_flight,
        );
        if let IdleDecision::Sleep(level) = decision {
            power.enter_low_power_sleep(level);
        }
        decision
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn telemetry(&self) -> Telemetry {
        let mode = self.fsm.current_mode();
        Telemetry {
            mode,
            ticks_in_mode: self.fsm.ticks_in_current_mode(),
            tick_budget: self.ctx.tick_budget,
            day_streak: self.ctx.debouncer.day_streak(),
            night_streak: self.ctx.debouncer.night_streak(),
            duty: self.ctx.output.duty,
            output_enabled: self.ctx.output.enabled,
            cadence: mode.cadence(),
            samples: self.samples,
            wakes: self.scheduler.wakes(),
        }
    }

    /// Emit a telemetry snapshot through `sink`.
    pub fn report(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Telemetry(self.telemetry()));
    }

    pub fn mode(&self) -> Mode {
        self.fsm.current_mode()
    }

    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    pub fn output(&self) -> OutputCommands {
        self.ctx.output
    }

    pub fn sample_in_flight(&self) -> bool {
        self.sample_in_flight
    }

    // ── Internal ──────────────────────────────────────────────

    /// Apply output changes and report a mode change, if any.
    fn settle(
        &mut self,
        prev: Mode,
        next: Option<Mode>,
        hw: &mut (impl LightOutputPort + WakeTimerPort),
        sink: &mut impl EventSink,
    ) {
        self.apply_output(hw);
        if let Some(to) = next {
            self.program_wake_timer(to, hw);
            sink.emit(&AppEvent::ModeChanged { from: prev, to });
        }
    }

    /// Translate output commands into port calls, writing only what changed.
    fn apply_output(&mut self, hw: &mut impl LightOutputPort) {
        let want = self.ctx.output;
        let have = self.applied;
        if want == have {
            return;
        }
        if want.enabled {
            // Duty first so the driver never starts at a stale level.
            if want.duty != have.duty {
                hw.set_duty(want.duty);
            }
            if !have.enabled {
                hw.set_output_enabled(true);
            }
        } else {
            if have.enabled {
                hw.set_output_enabled(false);
            }
            if want.duty != have.duty {
                hw.set_duty(want.duty);
            }
        }
        self.applied = want;
    }

    fn program_wake_timer(&self, mode: Mode, hw: &mut impl WakeTimerPort) {
        let cadence = mode.cadence();
        hw.set_wake_interval(cadence, self.scheduler.wake_interval_ms(cadence));
    }
}
