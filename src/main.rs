//! armgpio demo: Main Entry Point
//!
//! Wires the GPIO core to a simulated arm and runs the pick-and-place
//! routine on every press of control-box input 7.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  SimulatedArm          LogEventSink     JsonConfigStore      │
//! │  (Status+Io+Arm)       (EventSink)      (ConfigPort)         │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  GpioPoller ──▶ CallbackRegistry ──▶ PickPlaceRoutine        │
//! │  ArmSupervisor ──▶ SharedState (quit flag)                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use armgpio::adapters::config_file::JsonConfigStore;
use armgpio::adapters::log_sink::LogEventSink;
use armgpio::adapters::sim::{SimScript, SimulatedArm};
use armgpio::app::ports::{ConfigPort, StatusPort};
use armgpio::app::shared::SharedState;
use armgpio::config::SystemConfig;
use armgpio::gpio::{CallbackRegistry, ExecutionMode, GpioPoller};
use armgpio::routine::PickPlaceRoutine;
use armgpio::supervisor::ArmSupervisor;

/// Edge-triggered pick-and-place against a simulated arm
#[derive(Parser, Debug)]
#[command(name = "armgpio")]
#[command(about = "Run the GPIO-triggered pick-and-place demo", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulated button presses before the arm disconnects
    #[arg(short, long, value_name = "COUNT", default_value_t = 3)]
    presses: u32,

    /// Run actions on the poll thread instead of their own threads
    #[arg(long)]
    inline: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("armgpio v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => JsonConfigStore::new(path)
            .load()
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SystemConfig::default(),
    };
    if args.inline {
        config.execution_mode = ExecutionMode::Inline;
    }
    config.validate().context("invalid config")?;
    info!(
        "Config: poll={}ms, mode={:?}, trigger={}[{}] {} {}",
        config.poll_interval_ms,
        config.execution_mode,
        config.trigger.kind,
        config.trigger.index,
        config.trigger.op,
        config.trigger.threshold,
    );

    // ── 2. Arm + supervisor ───────────────────────────────────
    let shared = Arc::new(SharedState::new());
    let script = SimScript {
        presses: args.presses,
        ..SimScript::default()
    };
    let supervisor = Mutex::new((
        ArmSupervisor::new(Arc::clone(&shared), script.firmware),
        LogEventSink::new(),
    ));
    let arm = Arc::new(SimulatedArm::new(script, move |report| {
        let mut guard = supervisor.lock().unwrap_or_else(PoisonError::into_inner);
        let (sup, sink) = &mut *guard;
        sup.handle(report, sink);
    }));

    // ── 3. Routine + trigger registration ─────────────────────
    let routine = Arc::new(PickPlaceRoutine::new(&config));
    routine.prepare(arm.as_ref(), &shared).context("preparing routine")?;

    let registry = Arc::new(CallbackRegistry::new());
    let t = config.trigger;
    registry.register(
        t.kind,
        t.index,
        t.op,
        t.threshold,
        Arc::clone(&routine).trigger_action(Arc::clone(&arm), Arc::clone(&shared)),
    )?;

    // ── 4. Poller ─────────────────────────────────────────────
    let poller = GpioPoller::new(
        Arc::clone(&arm),
        registry,
        Arc::clone(&shared),
        LogEventSink::new(),
        &config,
    );
    let handle = poller.spawn()?;

    // ── 5. Wait ───────────────────────────────────────────────
    let wait = Duration::from_millis(u64::from(config.main_loop_interval_ms));
    while arm.is_connected()
        && arm.error_code() == 0
        && !shared.quit_requested()
        && handle.is_alive()
    {
        thread::sleep(wait);
    }

    handle.request_stop();
    let reason = handle.join()?;
    // Let an in-flight cycle observe quit and wind down.
    drop(shared.lock_cycle());

    let vars = shared.vars();
    info!(
        "Done: {} ({} presses, {} moves, next x={:.1}, count={})",
        reason,
        arm.presses_done(),
        arm.move_count(),
        vars.x_pos,
        vars.count,
    );
    if arm.error_code() != 0 {
        warn!("Arm ended with error code {}", arm.error_code());
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        })
        .init();
}
