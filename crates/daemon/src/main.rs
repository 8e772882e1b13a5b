use std::sync::Arc;

use anyhow::Context;
use bridge_daemon::{
    api::AppState,
    config::{self, BridgeConfig, COMMAND_TOKEN_VAR, ORION_BROKER_URL_VAR, SUBSCRIBE_TOKEN_VAR},
    orion::OrionClient,
    public_ip, server,
};
use clap::{Arg, ArgAction, Command};
use ngsi_types::Subscription;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bridge_daemon=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Vehicle bridge starting...");

    // --- Argument Parsing ---
    let matches = Command::new("vehicle_bridge")
        .about("Bridges an ORION context broker to a controlled vehicle entity")
        .arg(
            Arg::new("entity_id")
                .required(true)
                .help("The ORION ID of the entity to subscribe to"),
        )
        .arg(
            Arg::new("command_entity")
                .long("command-entity")
                .help("The ORION ID of the entity movement orders are written to"),
        )
        .arg(
            Arg::new("monitor_only")
                .short('m')
                .long("monitor-only")
                .action(ArgAction::SetTrue)
                .help("Do not send movement orders and instead only monitor the state of the car"),
        )
        .arg(
            Arg::new("listen_port")
                .long("listen-port")
                .value_parser(clap::value_parser!(u16))
                .default_value("8080")
                .help("The port to use for the hosted subscription listener"),
        )
        .arg(
            Arg::new("callback_base")
                .long("callback-base")
                .help("Publicly reachable base URI the broker delivers notifications to; discovered via ipify when omitted"),
        )
        .get_matches();

    let monitor_only = matches.get_flag("monitor_only");
    let listen_port = *matches.get_one::<u16>("listen_port").unwrap();

    // --- Environment ---
    let orion_endpoint = config::require_env(ORION_BROKER_URL_VAR)?;
    let subscribe_token = config::require_env(SUBSCRIBE_TOKEN_VAR)?;
    let command_token = if monitor_only {
        std::env::var(COMMAND_TOKEN_VAR).ok()
    } else {
        Some(config::require_env(COMMAND_TOKEN_VAR)?)
    };

    // --- Callback Resolution ---
    let callback_base = match matches.get_one::<String>("callback_base") {
        Some(uri) => uri.clone(),
        None => {
            let ip = public_ip::host_public_ip()
                .await
                .context("no --callback-base given and public IP discovery failed")?;
            tracing::info!("Discovered public IP {} for notification delivery", ip);
            format!("http://{}:{}", ip, listen_port)
        }
    };

    let config = Arc::new(BridgeConfig::new(
        orion_endpoint,
        matches.get_one::<String>("entity_id").cloned().unwrap(),
        matches.get_one::<String>("command_entity").cloned(),
        monitor_only,
        listen_port,
        callback_base,
    )?);

    let orion = Arc::new(OrionClient::new(
        &config.orion_endpoint,
        subscribe_token,
        command_token,
    )?);

    // --- Subscription Registration ---
    // Fatal when the broker answers anything but 201; the listener never
    // starts without a standing subscription.
    let notify_uri = config.notify_uri();
    tracing::info!(
        "Subscribing to entity {} through ORION broker at {} on {}...",
        config.entity_id,
        config.orion_endpoint,
        notify_uri
    );
    let subscription = Subscription::for_vehicle(&config.entity_id, &notify_uri);
    orion
        .subscribe(&subscription)
        .await
        .context("subscription registration failed")?;
    tracing::info!("Subscribed; listening on local port {}", config.listen_port);

    // --- Server ---
    let state = AppState { config, orion };
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut server_handle = tokio::spawn(server::run(state, shutdown_rx));

    // --- Graceful Shutdown ---
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received. Stopping services...");
            let _ = shutdown_tx.send(());
            server_handle.await??;
        }
        result = &mut server_handle => {
            result??;
        }
    }

    tracing::info!("Vehicle bridge stopped gracefully.");
    Ok(())
}
