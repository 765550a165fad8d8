//! Video configuration loaded from JSON

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::swizzle::TileLayout;

/// Settings for the presentation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub fast_forward: bool,
    pub layout: TileLayout,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            fast_forward: false,
            layout: TileLayout::SWITCH,
        }
    }
}

impl VideoConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// Load config from a JSON file and check the tile layout
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        info!("loaded video config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("resolution {}x{} is empty", self.width, self.height);
        }
        self.layout.validate().context("invalid tile layout")?;
        if self.width > self.layout.padded_width {
            anyhow::bail!(
                "width {} exceeds the padded tile row width {}",
                self.width,
                self.layout.padded_width
            );
        }
        Ok(())
    }
}
