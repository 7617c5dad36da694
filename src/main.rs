//! Lumia Relay - Discord to LumiaStream command bridge
//!
//! Watches one Discord channel for `!`-prefixed messages and relays each
//! command to a local LumiaStream instance over its WebSocket API.

mod bridge;
mod common;
mod config;
mod discord;
mod lumia;

use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::{debug, error, info};

use bridge::{Bridge, ChannelBundle, DriverChannels};
use common::{LogEvent, LogLevel};
use config::{env::get_config_path, load_and_validate, Credentials};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Lumia Relay v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;
    let credentials = Credentials::from_config(&config)?;

    info!("Configuration loaded successfully");
    info!("  Discord channel: {}", credentials.channel_id);
    info!("  LumiaStream: {}", credentials.lumia.display_address());

    let channels = ChannelBundle::new();
    let DriverChannels {
        mut events_rx,
        mut log_rx,
    } = channels.driver;
    let mut bridge = Bridge::new(
        credentials,
        Duration::from_secs(config.bridge.ack_interval_secs),
        channels.bridge,
    );

    // Observer: render bridge log lines through tracing
    let observer = tokio::spawn(async move {
        while let Some(event) = log_rx.recv().await {
            render_log(&event);
        }
        debug!("Observer log stream ended");
    });

    bridge.start().await;

    let mut ticker = tokio::time::interval(Duration::from_secs(config.bridge.status_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; skip it so the connections get a head start.
    ticker.tick().await;

    let mut last_status = None;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown signal received - closing connections...");
                break;
            }
            _ = ticker.tick() => {
                let status = bridge.check_status();
                if last_status.as_ref() != Some(&status) {
                    info!("{}", status);
                    last_status = Some(status);
                }
            }
            event = events_rx.recv() => match event {
                Some(event) => bridge.handle_event(event),
                None => {
                    error!("Bridge event channel closed");
                    break;
                }
            },
        }
    }

    bridge.close().await;
    drop(bridge);

    // The bridge held the last log sender; let the observer drain what is left.
    if tokio::time::timeout(Duration::from_secs(2), observer).await.is_err() {
        debug!("Observer did not finish draining");
    }

    info!("Exiting...");
    Ok(())
}

fn render_log(event: &LogEvent) {
    match event.level {
        LogLevel::Info => info!("{}", event),
        LogLevel::Debug => debug!("{}", event),
        LogLevel::Error => error!("{}", event),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
