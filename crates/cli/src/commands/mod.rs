pub mod format;
pub mod forward;
pub mod init;
pub mod status;

use std::path::Path;

use clawtrail_config::AuditConfig;

/// Load the config from `path` or the default location.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AuditConfig, Box<dyn std::error::Error>> {
    AuditConfig::load(path).map_err(|e| format!("Failed to load config: {e}").into())
}
