//! `clawtrail forward` — Mirror the agent's outgoing messages.

use std::path::Path;
use std::sync::Arc;

use clawtrail_channels::{ConsoleSink, DiscordClient, DiscordConfig};
use clawtrail_core::channel::DeliverySink;
use clawtrail_forwarder::{DedupStateStore, DedupTracker, TrackerSettings};
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    once: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    config.validate_for_forward()?;

    let client = Arc::new(DiscordClient::new(DiscordConfig::from(&config))?);
    let mut store = DedupStateStore::load(&config.state_file, config.dedup_capacity);
    let sink: Arc<dyn DeliverySink> = if dry_run {
        store = store.without_persistence();
        Arc::new(ConsoleSink::new())
    } else {
        client.clone()
    };

    let settings = TrackerSettings::from(&config);
    println!("🔁 clawtrail forwarder");
    println!("   Destination: {}", settings.destination);
    println!("   Watching:    {}", settings.watch_channels.join(", "));
    println!("   Interval:    {}s", settings.poll_interval.as_secs());
    println!(
        "   State:       {} ({} tracked)",
        store.path().display(),
        store.len()
    );
    if dry_run {
        println!("   Dry run:     forwards printed, state not saved");
    }

    let mut tracker = DedupTracker::new(client, sink, store, settings);

    if once {
        let report = tracker.run_cycle().await;
        println!(
            "Forwarded {} message(s); {} fetch, {} forward, {} persist failure(s)",
            report.forwarded.len(),
            report.fetch_failures,
            report.forward_failures,
            report.persist_failures
        );
        return Ok(());
    }

    tracker
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Ctrl-C handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await;
    info!(tracked = tracker.store().len(), "Forwarder stopped");

    Ok(())
}
