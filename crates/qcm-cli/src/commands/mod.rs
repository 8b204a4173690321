pub mod add;
pub mod init;
pub mod lessons;
pub mod modules;
pub mod quiz;
pub mod stats;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use qcm_core::config::{load_config_from, QcmConfig};

/// Options shared by every subcommand.
#[derive(Debug, Default, Clone)]
pub struct Globals {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
}

impl Globals {
    /// Load the config file, then apply command-line overrides.
    pub fn resolve(&self) -> Result<QcmConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(stats_file) = &self.stats_file {
            config.stats_file = stats_file.clone();
        }
        tracing::debug!(
            "bank root {}, statistics {}",
            config.root.display(),
            config.stats_file.display()
        );
        Ok(config)
    }
}
