// config.rs — Tracker configuration loaded from .idp/tracker.toml.
//
// Every section and field is optional; missing values fall back to the
// library defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use idp_goal::HealthConfig;
use idp_insights::InsightsConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub insights: InsightsConfig,
}

impl TrackerConfig {
    /// `<data_dir>/.idp/tracker.toml`
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(".idp").join("tracker.toml")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if present; defaults when absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "ignoring tracker config");
                Self::default()
            }
        }
    }
}
