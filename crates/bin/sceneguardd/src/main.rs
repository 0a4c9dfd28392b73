//! # sceneguardd: sceneguard daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise `tracing` from the logging filter
//! - Construct the filesystem inventory, the virtual hub and the notice bus
//! - Construct the [`SceneValidator`], injecting adapters via port traits
//! - Build the axum router and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sceneguard_adapter_http_axum::router;
use sceneguard_adapter_http_axum::state::AppState;
use sceneguard_adapter_inventory_fs::FsInventory;
use sceneguard_adapter_virtual::{LightFaults, VirtualHub};
use sceneguard_app::event_bus::InProcessNoticeBus;
use sceneguard_app::notifier::LogNotifier;
use sceneguard_app::ports::{NoticePublisher, SceneInventory, SystemClock};
use sceneguard_app::validator::{Collaborators, SceneValidator};
use sceneguard_domain::id::EntityRef;

use crate::config::{Config, VirtualConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let bus = InProcessNoticeBus::new(256);
    let inventory = Arc::new(FsInventory::new(config.inventory.clone()));
    let hub = Arc::new(VirtualHub::new(bus.clone()));

    if config.virtual_hub.enabled {
        seed_virtual_hub(&hub, &inventory, &config.virtual_hub).await;
    }

    // Validator
    let validator = SceneValidator::new(
        config.validator.clone(),
        Collaborators {
            inventory: Arc::clone(&inventory),
            resolver: Arc::clone(&inventory),
            reader: Arc::clone(&hub),
            invoker: Arc::clone(&hub),
            notifier: LogNotifier,
            clock: SystemClock,
        },
    )?;
    if let Err(err) = validator.reload().await {
        tracing::error!(error = %err, "initial inventory load failed, starting with no scenes");
    }

    let notices = bus.subscribe();
    let runner = validator.clone();
    tokio::spawn(async move { runner.run(notices).await });

    // HTTP
    let app = router::build(AppState::new(validator, bus));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "sceneguardd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sceneguardd stopped");
    Ok(())
}

/// Create virtual lights for every inventory scene and apply configured faults.
async fn seed_virtual_hub<P>(hub: &VirtualHub<P>, inventory: &FsInventory, config: &VirtualConfig)
where
    P: NoticePublisher + Send + Sync,
{
    let scenes = match inventory.load_scenes().await {
        Ok(scenes) => scenes,
        Err(err) => {
            tracing::warn!(error = %err, "virtual hub not seeded, inventory unavailable");
            return;
        }
    };
    for scene in &scenes {
        hub.install_scene(scene, inventory);
    }

    let mut faults: BTreeMap<&str, LightFaults> = BTreeMap::new();
    for entity in &config.stuck_entities {
        faults.entry(entity.as_str()).or_default().stuck = true;
    }
    for entity in &config.slow_color_temp_entities {
        faults.entry(entity.as_str()).or_default().slow_color_temp = true;
    }
    for (raw, faults) in faults {
        let applied = EntityRef::new(raw)
            .map_err(|err| err.to_string())
            .and_then(|entity| hub.set_faults(&entity, faults).map_err(|err| err.to_string()));
        if let Err(error) = applied {
            tracing::warn!(entity = raw, %error, "virtual fault not applied");
        }
    }
    tracing::info!(scenes = scenes.len(), "virtual hub seeded");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
