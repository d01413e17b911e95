//! wclock host simulator.
//!
//! ```text
//! ┌──────────────────────────────┐      ┌───────────────────────────────┐
//! │ tick thread                  │      │ main thread                   │
//! │ TickSource::on_tick × F/1000 │─────▶│ ClockApp::run_iteration       │
//! │ every millisecond            │ Arc< │ stdin/stdout companion link   │
//! └──────────────────────────────┘ Sch. └───────────────────────────────┘
//! ```
//!
//! Protocol lines typed on stdin are handled as if the companion sent
//! them; outbound lines are printed to stdout, logs go to stderr.
//! Settings live in a page-cached in-memory store and are lost on exit.
//!
//! Environment: `WCLOCK_CONFIG` names a JSON [`ClockConfig`] file,
//! `WCLOCK_LOG` sets the log level.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use wclock::adapters::cached_store::CachedStore;
use wclock::adapters::console_log;
use wclock::adapters::mem_store::MemStore;
use wclock::adapters::sim::{ConsoleDisplay, NoButton, NoIr, SimAudio, SimInputs, SimRtc, SimSensor, StdioLink};
use wclock::app::ClockApp;
use wclock::app::ports::Devices;
use wclock::config::ClockConfig;
use wclock::scheduler::{SchedulerState, TickSource};

const CONFIG_ENV: &str = "WCLOCK_CONFIG";

fn load_config() -> Result<ClockConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return Ok(ClockConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let cfg: ClockConfig = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!("config loaded from {path}");
    Ok(cfg)
}

fn main() -> Result<()> {
    console_log::init().map_err(|e| anyhow::anyhow!("installing logger: {e}"))?;
    info!("wclock simulator v{}", env!("CARGO_PKG_VERSION"));

    let cfg = load_config()?;
    cfg.validate()?;

    let start = cfg.start_time.unwrap_or_default();
    let sched = Arc::new(SchedulerState::new(start));

    // ── Tick source ───────────────────────────────────────────
    let ticks_per_ms = cfg.tick_hz / 1_000;
    {
        let sched = Arc::clone(&sched);
        let tick_hz = cfg.tick_hz;
        std::thread::Builder::new()
            .name("tick".into())
            .spawn(move || {
                let mut source = TickSource::new(tick_hz);
                let mut inputs = SimInputs;
                loop {
                    for _ in 0..ticks_per_ms {
                        source.on_tick(&sched, &mut inputs);
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
            })
            .context("spawning tick thread")?;
    }

    // ── Devices ───────────────────────────────────────────────
    let mut store =
        CachedStore::new(MemStore::new()).map_err(|e| anyhow::anyhow!("opening config store: {e}"))?;
    let mut rtc = SimRtc::new(start);
    let mut light = SimSensor::new(2_048);
    let mut probe = SimSensor::new(215);
    let mut audio = SimAudio::default();
    let mut ir = NoIr;
    let mut display = ConsoleDisplay::default();
    let mut link = StdioLink::spawn();
    let mut button = NoButton;
    let mut dev = Devices {
        store: &mut store,
        rtc: &mut rtc,
        light: &mut light,
        probe: &mut probe,
        audio: &mut audio,
        ir: &mut ir,
        display: &mut display,
        link: &mut link,
        button: &mut button,
    };

    let mut app = ClockApp::new(cfg);
    app.boot(&sched, &mut dev);

    loop {
        app.run_iteration(&sched, &mut dev);
        std::thread::sleep(Duration::from_millis(1));
    }
}
