//! Configuration management for reelcheck.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//!
//! # Example
//!
//! ```no_run
//! use reelcheck_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/reelcheck.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Reports go to {}", config.settings().paths.output_folder);
//!
//! config.settings_mut().render.workers = 8;
//! config.update_section(ConfigSection::Render).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, MediaSettings, PathSettings, RenderSettings, Settings,
    UploadSettings,
};
