//! `clawtrail format` — Session log to audit summaries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clawtrail_channels::{ConsoleSink, DiscordClient, DiscordConfig};
use clawtrail_config::{AuditConfig, ConfigError};
use clawtrail_core::channel::DeliverySink;
use clawtrail_pipeline::StreamProcessor;
use tokio::io::BufReader;
use tracing::warn;

/// Destination label used by dry runs without a configured audit channel.
const DRY_RUN_DESTINATION: &str = "audit";

pub async fn run(
    config_path: Option<&Path>,
    session: Option<String>,
    input: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (sink, destination): (Arc<dyn DeliverySink>, String) = if dry_run {
        let config = match AuditConfig::load(config_path) {
            Ok(config) => config,
            Err(ConfigError::NotFound { path }) => {
                warn!(path = %path.display(), "No config file; dry run uses defaults");
                AuditConfig::default()
            }
            Err(e) => return Err(format!("Failed to load config: {e}").into()),
        };
        let destination = if config.audit_channel_id.is_empty() {
            DRY_RUN_DESTINATION.to_string()
        } else {
            config.audit_channel_id
        };
        let sink: Arc<dyn DeliverySink> = Arc::new(ConsoleSink::new());
        (sink, destination)
    } else {
        let config = super::load_config(config_path)?;
        config.validate_for_format()?;
        let sink: Arc<dyn DeliverySink> = Arc::new(DiscordClient::new(DiscordConfig::from(&config))?);
        (sink, config.audit_channel_id)
    };

    let mut processor = StreamProcessor::new(sink, destination);
    if let Some(session) = session {
        processor = processor.with_session(session);
    }

    let summary = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
            processor.run(BufReader::new(file)).await
        }
        None => processor.run(BufReader::new(tokio::io::stdin())).await,
    };

    eprintln!("📋 {summary}");
    Ok(())
}
