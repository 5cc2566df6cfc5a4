use std::path::Path;

use anyhow::Context as _;
use reelcheck_core::config::ConfigManager;
use tracing::info;

/// Write the default config to `path`.
///
/// An existing file is kept unless `force` is set.
pub fn init_config_handler(path: &Path, force: bool) -> anyhow::Result<bool> {
    let mut manager = ConfigManager::new(path);

    if force && path.exists() {
        manager
            .save()
            .with_context(|| format!("Failed to overwrite {}", path.display()))?;
        info!("Reset config at {}", path.display());
        return Ok(true);
    }

    let created = manager
        .load_or_create()
        .with_context(|| format!("Failed to initialise config at {}", path.display()))?;
    if !created {
        info!("Config already exists at {}", path.display());
    }
    Ok(created)
}
