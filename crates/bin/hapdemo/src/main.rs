//! # hapdemo — accessory protocol demo daemon
//!
//! Composition root that wires all adapters together and runs the server.
//!
//! ## Responsibilities
//! - Load configuration (`hapdemo.toml`, optional)
//! - Initialise logging
//! - Build the demo switch accessory and register it
//! - Open the directory store
//! - Construct the accessory protocol server
//! - Register SIGINT/SIGTERM interest, then serve until one arrives
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod logging;
mod signal;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use hapdemo_adapter_http_axum::HapServer;
use hapdemo_adapter_store_fs::FsStore;
use hapdemo_adapter_virtual::{SwitchListener, VirtualSwitch};
use hapdemo_app::event_bus::InProcessEventBus;
use hapdemo_app::lifecycle::Shutdown;
use hapdemo_app::registry::AccessoryRegistry;

use crate::config::Config;
use crate::signal::Signals;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            logging::init("info");
            let err = anyhow::Error::from(err);
            tracing::error!("Homekit demo failed to start: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging.filter);

    match run(config).await {
        Ok(()) => {
            tracing::info!("Exit");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Homekit demo failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("Homekit demo starting...");

    let accessory = VirtualSwitch::new(config.accessory_info())
        .accessory()
        .context("failed to create accessory")?;
    let name = accessory.name().to_string();
    let switch_listener = SwitchListener::for_accessory(&accessory);

    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));
    let registry = Arc::new(AccessoryRegistry::new(Arc::clone(&event_bus)));
    registry
        .add(accessory)
        .context("failed to register accessory")?;
    tracing::info!("Homekit demo new accessory created: {name}");

    let store = FsStore::open(&config.store.path)
        .await
        .with_context(|| format!("failed to open store at {}", config.store.path.display()))?;
    tracing::info!("Homekit demo db created");

    let server = HapServer::new(
        store,
        Arc::clone(&registry),
        Arc::clone(&event_bus),
        config.pin()?,
    )
    .await
    .context("failed to create accessory server")?
    .with_shutdown_timeout(config.shutdown_timeout());
    tracing::info!(
        "Homekit demo server started ({})",
        server.pin().as_digits()
    );

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    let shutdown = Shutdown::new();
    let token = shutdown.token();
    let signals = Signals::register().context("failed to register signal handlers")?;
    tracing::info!("Waiting for SIGTERM signal ...");
    tokio::spawn(signal::watch(signals, shutdown));

    if let Some(switch) = switch_listener {
        tokio::spawn(switch.run(event_bus.subscribe("switch"), token.clone()));
    }

    tracing::info!("Listening ...");
    server
        .listen_and_serve(listener, token)
        .await
        .context("accessory server failed")?;
    Ok(())
}
