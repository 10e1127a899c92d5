//! Mock platform for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without a microcontroller, and drives the engine through the
//! same wake → conversion → sample sequence the interrupts would.

use solarlight::app::events::AppEvent;
use solarlight::app::ports::{
    EventSink, LightOutputPort, LightSensorPort, PowerPort, WakeTimerPort,
};
use solarlight::app::service::Engine;
use solarlight::config::{DawnPolicy, EngineConfig, LightLevels};
use solarlight::power::SleepLevel;
use solarlight::scheduler::{Cadence, CadenceTiming, Schedule};

pub const DAY_SAMPLE: u8 = 230;
pub const NIGHT_SAMPLE: u8 = 190;
pub const AMBIGUOUS_SAMPLE: u8 = 210;

// ── Port call record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCall {
    StartConversion,
    SetOutputEnabled(bool),
    SetDuty(u8),
    SetWakeInterval { cadence: Cadence, interval_ms: u32 },
    Sleep(SleepLevel),
}

// ── MockPlatform ──────────────────────────────────────────────

pub struct MockPlatform {
    pub calls: Vec<PortCall>,
    pub enabled: bool,
    pub duty: u8,
    pub cadence: Option<Cadence>,
    pub interval_ms: u32,
    pub conversion_pending: bool,
}

#[allow(dead_code)]
impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            enabled: false,
            duty: 0,
            cadence: None,
            interval_ms: 0,
            conversion_pending: false,
        }
    }

    pub fn last_call(&self) -> Option<&PortCall> {
        self.calls.last()
    }

    pub fn conversions(&self) -> usize {
        self.count(|c| *c == PortCall::StartConversion)
    }

    pub fn duty_writes(&self) -> usize {
        self.count(|c| matches!(c, PortCall::SetDuty(_)))
    }

    pub fn count(&self, pred: impl Fn(&PortCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSensorPort for MockPlatform {
    fn start_conversion(&mut self) {
        self.conversion_pending = true;
        self.calls.push(PortCall::StartConversion);
    }
}

impl LightOutputPort for MockPlatform {
    fn set_output_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.calls.push(PortCall::SetOutputEnabled(enabled));
    }

    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        self.calls.push(PortCall::SetDuty(duty));
    }
}

impl WakeTimerPort for MockPlatform {
    fn set_wake_interval(&mut self, cadence: Cadence, interval_ms: u32) {
        self.cadence = Some(cadence);
        self.interval_ms = interval_ms;
        self.calls.push(PortCall::SetWakeInterval {
            cadence,
            interval_ms,
        });
    }
}

impl PowerPort for MockPlatform {
    fn enter_low_power_sleep(&mut self, level: SleepLevel) {
        self.calls.push(PortCall::Sleep(level));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode_changes(&self) -> Vec<(solarlight::fsm::Mode, solarlight::fsm::Mode)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ModeChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn dusks(&self) -> Vec<(u16, u16)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Dusk {
                    day_ticks,
                    afterglow,
                } => Some((*day_ticks, *afterglow)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Bench config and drivers ──────────────────────────────────

/// Raw thresholds 200/220, streaks of 3, one sample per wake, no
/// minimum day.
#[allow(dead_code)]
pub fn bench_config() -> EngineConfig {
    EngineConfig {
        light_levels: LightLevels::Raw {
            dark: 200,
            light: 220,
        },
        min_day_streak: 3,
        min_night_streak: 3,
        minimum_day_before_night: 0,
        sample_rate_ratio: 2,
        schedule: Schedule {
            day: CadenceTiming {
                wake_interval_ms: 8000,
                wakes_per_sample: 1,
            },
            night: CadenceTiming {
                wake_interval_ms: 4000,
                wakes_per_sample: 1,
            },
        },
        dawn_policy: DawnPolicy::AbortToDay,
        ..EngineConfig::default()
    }
}

/// Build and start an engine on a fresh mock platform.
#[allow(dead_code)]
pub fn started(config: &EngineConfig) -> (Engine, MockPlatform, RecordingSink) {
    let mut engine = Engine::new(config);
    let mut hw = MockPlatform::new();
    let mut sink = RecordingSink::new();
    engine.start(&mut hw, &mut sink);
    (engine, hw, sink)
}

/// Wake the engine until it starts a conversion, then deliver `raw`.
///
/// Returns the number of wakes it took.
#[allow(dead_code)]
pub fn feed(engine: &mut Engine, hw: &mut MockPlatform, sink: &mut RecordingSink, raw: u8) -> usize {
    let mut wakes = 0;
    while !hw.conversion_pending {
        engine.on_wake(hw, sink);
        wakes += 1;
        assert!(wakes <= 256, "no conversion started after {} wakes", wakes);
    }
    hw.conversion_pending = false;
    engine
        .on_sample_ready(raw, hw, sink)
        .expect("requested sample must be accepted");
    wakes
}

#[allow(dead_code)]
pub fn feed_n(engine: &mut Engine, hw: &mut MockPlatform, sink: &mut RecordingSink, raw: u8, n: usize) {
    for _ in 0..n {
        feed(engine, hw, sink, raw);
    }
}
