mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./gool.toml",
        "~/.config/gool/config.toml",
        "/etc/gool/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.max_parallel == 0 {
        anyhow::bail!("max_parallel must be at least 1");
    }

    if config.working_dir.as_os_str().is_empty() {
        anyhow::bail!("working_dir cannot be empty");
    }

    let url = config.cutlist.server_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("cutlist.server_url must be an http(s) URL, got '{}'", url);
    }

    if config.cutlist.timeout_secs == 0 {
        anyhow::bail!("cutlist.timeout_secs must be at least 1");
    }

    if config.decoder.username.is_empty() || config.decoder.password.is_empty() {
        tracing::warn!("No OTR credentials configured, encoded videos cannot be decoded");
    }

    Ok(())
}
