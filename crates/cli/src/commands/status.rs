//! `clawtrail status` — Show configuration and dedup state.

use std::path::Path;

use clawtrail_config::AuditConfig;
use clawtrail_forwarder::DedupStateStore;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AuditConfig::default_path);
    if !path.exists() {
        println!("⚠️  No config file at {} — run `clawtrail init` first", path.display());
        return Ok(());
    }
    let config = super::load_config(Some(&path))?;

    println!("🔍 clawtrail Status");
    println!("==================");
    println!("  Config:        {}", path.display());
    println!(
        "  Token:         {}",
        if config.discord_token.is_empty() { "missing" } else { "set" }
    );
    println!("  Audit channel: {}", or_missing(&config.audit_channel_id));
    println!("  Agent user:    {}", or_missing(&config.bot_user_id));
    println!("  Watching:      {}", config.watch_channels.join(", "));
    println!("  Poll interval: {}s", config.poll_interval_secs);
    println!("  Fetch limit:   {}", config.fetch_limit);
    println!("  API base:      {}", config.api_base);

    match DedupStateStore::try_load(&config.state_file, config.dedup_capacity) {
        Ok(store) => {
            let updated = store
                .updated_at()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".into());
            println!(
                "  Dedup state:   {} ({}/{} ids, updated {updated})",
                store.path().display(),
                store.len(),
                store.capacity()
            );
        }
        Err(e) => println!("  Dedup state:   ⚠️  {e}"),
    }

    match config.validate_for_forward() {
        Ok(()) => println!("\n  ✅ Ready for `clawtrail format` and `clawtrail forward`"),
        Err(e) => println!("\n  ⚠️  {e}"),
    }

    Ok(())
}

fn or_missing(value: &str) -> &str {
    if value.is_empty() { "missing" } else { value }
}
