//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use nfsheet_core::NfsheetConfig;

/// Load the config file given with `-c`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<NfsheetConfig> {
    if let Some(path) = config_path {
        return NfsheetConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        tracing::debug!("Using config file {}", default_path.display());
        Ok(NfsheetConfig::from_file(&default_path)?)
    } else {
        Ok(NfsheetConfig::default())
    }
}
