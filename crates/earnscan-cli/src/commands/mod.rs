//! Subcommands of the earnscan CLI.

pub mod analyze;
pub mod batch;
pub mod config;
pub mod extract;
pub mod output;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use earnscan_core::{CompletionGateway, EarnscanConfig, StaticGateway};

/// Load configuration from `config_path`, or the default location if it
/// exists, then apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<EarnscanConfig> {
    let config = match config_path {
        Some(path) => EarnscanConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                EarnscanConfig::from_file(&default_path)?
            } else {
                EarnscanConfig::default()
            }
        }
    };
    Ok(config.with_env_overrides())
}

/// Gateway answering from `reply_file` if given, otherwise the configured service.
pub fn build_gateway(
    config: &EarnscanConfig,
    reply_file: Option<&Path>,
) -> anyhow::Result<Arc<dyn CompletionGateway>> {
    match reply_file {
        Some(path) => {
            let reply = fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read reply file {}: {}", path.display(), e)
            })?;
            debug!("Using fixed reply from {}", path.display());
            Ok(Arc::new(StaticGateway::new(reply)))
        }
        None => Ok(config.completion.build_gateway()?),
    }
}

/// File name component of `path`, for reports.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
