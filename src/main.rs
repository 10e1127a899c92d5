//! Solar light simulator — host entry point.
//!
//! Runs the real engine against a simulated platform and a synthetic
//! daylight curve, through the same event queue an interrupt-driven
//! target would use.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  SimPlatform (sensor · driver · wake timer · sleep)            │
//! │       │ sleep_until_wake / finish_conversion                   │
//! │       ▼                                                        │
//! │  EventQueue ──▶ Engine::run_pending ──▶ Engine::idle ─┐        │
//! │       ▲                                               │        │
//! │       └───────────────────────────────────────────────┘        │
//! │                                                                │
//! │  ReportSink (LogEventSink + per-night summary)                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record, info, warn};

use solarlight::adapters::log_sink::LogEventSink;
use solarlight::adapters::sim::{Cloud, DaylightCurve, MS_PER_DAY, MS_PER_HOUR, SimPlatform};
use solarlight::app::events::AppEvent;
use solarlight::app::ports::EventSink;
use solarlight::app::service::Engine;
use solarlight::config::{EngineConfig, Profile};
use solarlight::events::EventQueue;
use solarlight::fsm::Mode;
use solarlight::power::IdleDecision;

/// Interrupt-to-main-loop queue, as it would live on the target.
static QUEUE: EventQueue = EventQueue::new();

/// Simulated time, read by the logger and the report sink.
static SIM_CLOCK_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    /// Path to a TOML engine config (overrides --profile)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compiled-in preset used when no config file is given
    #[arg(short, long, value_enum, default_value_t = Profile::Production)]
    profile: Profile,

    /// Number of simulated days, starting at midnight
    #[arg(long, default_value_t = 3)]
    days: u32,

    /// Length of the day from sunrise to sunset
    #[arg(long, default_value_t = 12.0)]
    day_hours: f32,

    /// Duration of each twilight ramp
    #[arg(long, default_value_t = 40)]
    twilight_minutes: u32,

    /// Hour of day at which a dark cloud passes
    #[arg(long)]
    cloud_at_hour: Option<f32>,

    /// How long the cloud stays
    #[arg(long, default_value_t = 15)]
    cloud_minutes: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Print the selected profile as TOML and exit
    #[arg(long)]
    print_example_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_example_config {
        println!("{}", toml::to_string(&EngineConfig::preset(args.profile))?);
        return Ok(());
    }

    log::set_logger(&LOGGER).map_err(|e| anyhow!("Failed to install logger: {}", e))?;
    log::set_max_level(args.log_level);

    // Engine configuration
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::preset(args.profile),
    };

    // Light curve
    let mut curve = DaylightCurve::new(args.day_hours, args.twilight_minutes);
    if let Some(hour) = args.cloud_at_hour {
        curve = curve.with_cloud(Cloud {
            start_ms: (hour.clamp(0.0, 24.0) * MS_PER_HOUR as f32) as u64,
            duration_ms: u64::from(args.cloud_minutes) * 60_000,
            level: curve.night_level,
        });
    }
    info!(
        "sim: {} day(s), sunrise {} sunset {}",
        args.days,
        clock(curve.sunrise_ms()),
        clock(curve.sunset_ms())
    );

    let mut platform = SimPlatform::new(curve);
    let mut engine = Engine::new(&config);
    let mut sink = ReportSink::default();
    engine.start(&mut platform, &mut sink);

    // Main loop
    let end = u64::from(args.days) * MS_PER_DAY;
    let mut next_report = MS_PER_DAY;
    while platform.now_ms() < end {
        SIM_CLOCK_MS.store(platform.now_ms(), Ordering::Relaxed);
        engine.run_pending(&QUEUE, &mut platform, &mut sink);

        match engine.idle(&mut platform) {
            IdleDecision::StayAwake => {
                if !platform.finish_conversion(&QUEUE) {
                    bail!("conversion in flight but none pending on the platform");
                }
            }
            IdleDecision::Sleep(_) => {
                platform.sleep_until_wake(&QUEUE);
            }
        }

        if platform.now_ms() >= next_report {
            engine.report(&mut sink);
            next_report += MS_PER_DAY;
        }
    }

    if QUEUE.dropped() > 0 {
        warn!("sim: {} events dropped on a full queue", QUEUE.dropped());
    }

    sink.print_summary();
    let stats = platform.stats();
    println!();
    println!(
        "lit {:.1} h, mean duty {:.0}, {} conversions, {} wakes",
        stats.lit_ms as f64 / MS_PER_HOUR as f64,
        stats.duty_ms as f64 / stats.lit_ms.max(1) as f64,
        stats.conversions,
        stats.wakes
    );

    Ok(())
}

/// Parse the engine config file at the specified path.
fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let contents = fs::read_to_string(path)
        .context(format!("Failed to read config file at {:?}", path))?;
    toml::from_str(&contents).context(format!("Failed to parse config file at {:?}", path))
}

/// `d<day> HH:MM` of simulated time.
fn clock(ms: u64) -> String {
    let day = ms / MS_PER_DAY;
    let minutes = (ms % MS_PER_DAY) / 60_000;
    format!("d{} {:02}:{:02}", day, minutes / 60, minutes % 60)
}

// ── Report sink ───────────────────────────────────────────────

#[derive(Debug)]
struct Night {
    dusk_at: u64,
    day_ticks: u16,
    afterglow: u16,
    off_at: Option<u64>,
}

/// Logs every event and remembers when each night started and ended.
#[derive(Default)]
struct ReportSink {
    log: LogEventSink,
    nights: Vec<Night>,
}

impl EventSink for ReportSink {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        let now = SIM_CLOCK_MS.load(Ordering::Relaxed);
        match event {
            AppEvent::Dusk {
                day_ticks,
                afterglow,
            } => self.nights.push(Night {
                dusk_at: now,
                day_ticks: *day_ticks,
                afterglow: *afterglow,
                off_at: None,
            }),
            AppEvent::ModeChanged { to: Mode::Day, .. } => {
                if let Some(night) = self.nights.last_mut().filter(|n| n.off_at.is_none()) {
                    night.off_at = Some(now);
                }
            }
            _ => {}
        }
    }
}

impl ReportSink {
    fn print_summary(&self) {
        println!(
            "{:>5}  {:>9}  {:>9}  {:>9}  {:>9}",
            "night", "dusk", "day ticks", "afterglow", "off"
        );
        for (i, night) in self.nights.iter().enumerate() {
            println!(
                "{:>5}  {:>9}  {:>9}  {:>9}  {:>9}",
                i + 1,
                clock(night.dusk_at),
                night.day_ticks,
                night.afterglow,
                night.off_at.map_or_else(|| "-".to_string(), clock)
            );
        }
    }
}

// ── Logger ────────────────────────────────────────────────────

/// Minimal stderr logger stamped with simulated time.
struct SimLogger;

static LOGGER: SimLogger = SimLogger;

impl Log for SimLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {:<5} {}",
                clock(SIM_CLOCK_MS.load(Ordering::Relaxed)),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
