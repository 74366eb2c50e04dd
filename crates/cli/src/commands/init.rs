//! `clawtrail init` — Write a sample config file.

use std::path::Path;

use clawtrail_config::AuditConfig;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AuditConfig::default_path);

    if config_path.exists() && !force {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or re-run with --force to overwrite.");
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, AuditConfig::sample_toml())?;

    println!("✅ Created config at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set discord_token, audit_channel_id and bot_user_id");
    println!("   2. List the channels to mirror in watch_channels");
    println!("   3. Run: clawtrail forward");
    println!("   4. Pipe a session log: tail -F session.jsonl | clawtrail format\n");

    Ok(())
}
