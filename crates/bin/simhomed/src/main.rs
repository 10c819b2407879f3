//! # simhomed
//!
//! Composition root that wires the simulator adapters, the automation engine
//! and the console together.
//!
//! ## Responsibilities
//! - Load configuration (`simhome.toml`, env vars)
//! - Install the tracing subscriber
//! - Pick the simulator backend and build the home service
//! - Run the selected mode: the interactive home controller, or one of the
//!   standalone polling controllers until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod backend;
mod config;
mod console;
mod demo;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

use simhome_adapter_simulator_tcp::SimulatorClient;
use simhome_adapter_virtual::{VirtualPin, VirtualSimulator, VirtualThermometer};
use simhome_app::controllers::{ClimateController, IrrigationTimer};
use simhome_app::event_bus::InProcessEventBus;
use simhome_app::ports::LocalClock;
use simhome_app::registry::DeviceRegistry;
use simhome_app::services::HomeService;
use simhome_domain::event::{Event, EventKind};

use crate::backend::Backend;
use crate::config::{BackendKind, Config, Mode};
use crate::console::Console;
use crate::demo::{DEFAULT_PAUSE, Demo, SensorDriver};

const EVENT_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);
    tracing::info!(mode = ?config.mode, "simhomed starting");

    match config.mode {
        Mode::Home => run_home(config).await,
        Mode::Irrigation => run_irrigation(&config).await,
        Mode::Climate => run_climate(&config).await,
    }
}

fn init_tracing(filter: &str) {
    let (filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new("info"), true),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if invalid {
        tracing::warn!("invalid log filter, falling back to info");
    }
}

async fn run_home(config: Config) -> anyhow::Result<()> {
    let backend = match config.simulator.backend {
        BackendKind::Tcp => {
            let address = config.simulator.connection.address();
            let client = SimulatorClient::connect(config.simulator.connection.clone())
                .await
                .with_context(|| format!("could not reach the simulator at {address}"))?;
            Backend::Tcp(client)
        }
        BackendKind::Virtual => Backend::Virtual(VirtualSimulator::default()),
    };
    let driver = match backend.simulator() {
        Some(simulator) => SensorDriver::Simulator(simulator),
        None => SensorDriver::Cache,
    };

    let bus = Arc::new(InProcessEventBus::new(EVENT_CAPACITY));
    tokio::spawn(print_events(bus.subscribe()));

    let service = HomeService::new(
        DeviceRegistry::new(backend),
        Arc::clone(&bus),
        config.monitor_config(),
    );
    let count = service.initialize(config.rules).await;
    if count == 0 {
        anyhow::bail!("no devices discovered, is the simulator running?");
    }
    println!("System initialized, {count} devices discovered");

    let demo = Demo::new(driver, DEFAULT_PAUSE);
    let stdin = BufReader::new(tokio::io::stdin());
    let console = Console::new(&service, &demo, stdin, std::io::stdout());

    tokio::select! {
        result = console.run() => result.context("console failed")?,
        () = shutdown_signal() => {
            service.stop_monitoring().await;
        }
    }
    Ok(())
}

/// Print fired rules and status reports as they happen.
async fn print_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => match event.kind {
                EventKind::RuleTriggered { rule, failed, .. } if failed > 0 => {
                    println!("Running rule: {rule} ({failed} action(s) failed)");
                }
                EventKind::RuleTriggered { rule, .. } => println!("Running rule: {rule}"),
                EventKind::StatusReported(report) => println!("\n{report}"),
                other => tracing::debug!(event = %other, "home event"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event printer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn run_irrigation(config: &Config) -> anyhow::Result<()> {
    let settings = config.irrigation_config()?;
    let mut timer = IrrigationTimer::new(settings, VirtualPin::new("irrigation-valve"), LocalClock);

    println!(
        "Irrigation timer armed for {}, press Ctrl-C to stop",
        settings.start_time.format("%H:%M")
    );
    let (shutdown, rx) = watch::channel(false);
    let task = tokio::spawn(async move { timer.run(rx).await });
    shutdown_signal().await;
    shutdown.send_replace(true);
    task.await.context("irrigation timer panicked")?;
    Ok(())
}

async fn run_climate(config: &Config) -> anyhow::Result<()> {
    let probe = VirtualThermometer::at_celsius(config.climate.initial_celsius);
    let mut controller = ClimateController::new(
        config.climate_config(),
        probe,
        VirtualPin::new("cooling-output"),
    );

    println!(
        "Climate controller running at {}\u{b0}C threshold, press Ctrl-C to stop",
        config.climate.threshold_celsius
    );
    let (shutdown, rx) = watch::channel(false);
    let task = tokio::spawn(async move { controller.run(rx).await });
    shutdown_signal().await;
    shutdown.send_replace(true);
    task.await.context("climate controller panicked")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
