use roleta::analysis::client::PollinationsClient;
use roleta::config::Config;
use roleta::feeds::live_casino::LiveCasinoFeed;
use roleta::session::Session;
use roleta::telemetry::alerts::AlertManager;
use roleta::telemetry::dashboard;
use roleta::telemetry::latency::LatencyTracker;

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("================================================");
    info!("  ROLETA: live roulette monitor v0.1.0");
    info!("================================================");

    let config = Config::load_or_default();
    if let Err(e) = config.validate() {
        error!("Config validation failed: {e}");
        return Err(e);
    }

    info!("--- Configuration ---");
    info!("  Feed:          {}", config.feed.url);
    info!("  Poll interval: {:?} (debounce {:?})", config.poll_interval(), config.debounce());
    info!("  Retries:       {} (base delay {}ms)", config.feed.max_retries, config.feed.retry_delay_ms);
    info!(
        "  Analysis:      {}",
        if config.analysis.enabled { config.analysis.url.as_str() } else { "disabled" }
    );
    match (&config.session.vendor, &config.session.table_id) {
        (Some(vendor), Some(id)) => info!("  Table:         {id} ({vendor})"),
        (Some(vendor), None) => info!("  Table:         first of {vendor}"),
        _ => info!("  Table:         first reported"),
    }

    // === Initialize components ===
    let latency = Arc::new(LatencyTracker::new(config.telemetry.latency_samples));
    let feed = Arc::new(LiveCasinoFeed::new(config.feed.clone()));
    let analyzer = config
        .analysis
        .enabled
        .then(|| Arc::new(PollinationsClient::new(config.analysis.clone())));
    let alerts = Arc::new(AlertManager::new(config.telemetry.clone()));

    let (mut session, handle) = Session::new(feed, analyzer, config.session.clone(), latency.clone());
    if alerts.is_configured() {
        session = session.with_alerts(alerts);
    }
    let session_task = tokio::spawn(session.run());

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // === Dashboard: redraw on every snapshot ===
    {
        let mut snapshots = handle.subscribe();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let frame = dashboard::render(&snapshots.borrow_and_update());
                        println!("{frame}");
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });
    }

    // === Telemetry loop (every 60s) ===
    {
        let latency = latency.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => latency.log_summary(),
                    _ = shutdown_rx.recv() => break,
                }
            }
        });
    }

    info!("Press Ctrl+C to shutdown.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Cleaning up...");
    let _ = shutdown_tx.send(());

    if handle.shutdown().await.is_err() {
        error!("Session already stopped");
    }
    let _ = session_task.await;

    latency.log_summary();
    info!("Roleta shutdown complete.");
    Ok(())
}
