use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `endpoint_url`
pub const ENDPOINT_ENV: &str = "SITE_WIDGETS_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint_url: String,
    pub request_timeout_secs: Option<u64>,
    /// Trailing messages sent along with each request
    pub history_window: usize,
    pub brand_name: String,
    pub layout: LayoutConfig,
    pub video: VideoConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Viewports narrower than this render the expanded chat as an overlay
    pub mobile_breakpoint: u32,
    pub expanded_height: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    pub poster: String,
    pub source: String,
    pub source_type: String,
    /// Length of the clip in seconds; playback ends when the clock reaches it
    pub duration_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:8888/.netlify/functions/chat".to_string(),
            request_timeout_secs: Some(30),
            history_window: 20,
            brand_name: "Assistant".to_string(),
            layout: LayoutConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768,
            expanded_height: 550,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poster: "images/video-thumbnail.jpg".to_string(),
            source: "videos/about-me.mp4".to_string(),
            source_type: "video/mp4".to_string(),
            duration_secs: 90.0,
        }
    }
}

impl Config {
    /// Load from the user config directory, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = Self::load_from(&config_path)?;

        if let Ok(url) = std::env::var(ENDPOINT_ENV) {
            if !url.trim().is_empty() {
                config.endpoint_url = url;
            }
        }

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("site-widgets").join("config.json"))
    }
}
