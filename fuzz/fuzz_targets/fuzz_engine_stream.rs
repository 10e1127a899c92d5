//! Fuzz target: `Engine::run_pending`
//!
//! Turns arbitrary bytes into a stream of wake and conversion-complete
//! interrupts, pushes them through the event queue and asserts that the
//! engine never panics and the platform always mirrors its output.
//!
//! cargo fuzz run fuzz_engine_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use solarlight::app::ports::{LightOutputPort, LightSensorPort, NullSink, WakeTimerPort};
use solarlight::app::service::Engine;
use solarlight::config::{EngineConfig, LightLevels, Profile};
use solarlight::events::{Event, EventQueue};
use solarlight::fsm::Mode;
use solarlight::scheduler::Cadence;

#[derive(Default)]
struct Mirror {
    enabled: bool,
    duty: u8,
    cadence: Option<Cadence>,
}

impl LightSensorPort for Mirror {
    fn start_conversion(&mut self) {}
}

impl LightOutputPort for Mirror {
    fn set_output_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }
}

impl WakeTimerPort for Mirror {
    fn set_wake_interval(&mut self, cadence: Cadence, _interval_ms: u32) {
        self.cadence = Some(cadence);
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&head, stream)) = data.split_first() else {
        return;
    };

    // First byte picks the thresholds and whether to boot into an install night.
    let mut config = EngineConfig::preset(Profile::Testing);
    config.light_levels = LightLevels::Raw {
        dark: head & 0x7f,
        light: (head & 0x7f).saturating_add(4),
    };
    config.min_day_streak = 2;
    config.min_night_streak = 2;
    config.minimum_day_before_night = 4;
    if head & 0x80 != 0 {
        config.night_install_ticks = Some(8);
    }

    let queue: EventQueue<8> = EventQueue::new();
    let mut engine = Engine::new(&config);
    let mut hw = Mirror::default();
    let mut sink = NullSink;
    engine.start(&mut hw, &mut sink);

    // Even bytes are wakes, odd bytes carry a conversion result.
    for chunk in stream.chunks(8) {
        for &b in chunk {
            let event = if b & 1 == 0 {
                Event::Wake
            } else {
                Event::SampleReady(b)
            };
            queue.push(event);
        }
        engine.run_pending(&queue, &mut hw, &mut sink);

        let out = engine.output();
        assert_eq!((hw.enabled, hw.duty), (out.enabled, out.duty));
        assert_eq!(hw.cadence, Some(engine.mode().cadence()));
        if engine.mode() == Mode::Day {
            assert!(!out.enabled, "light on during the day");
        }
    }
    assert_eq!(queue.dropped(), 0);
});
