use std::fs;
use std::path::Path;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use crate::cli::Cli;
use crate::scene::DEFAULT_SHADOW_MAP_SIZE;

/// Runtime settings. Loaded from an optional JSON file, then overridden by
/// command-line flags. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub show_stats: bool,
    pub antialias: bool,
    pub shadow_map_size: u32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_zoom: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            show_stats: true,
            antialias: true,
            shadow_map_size: DEFAULT_SHADOW_MAP_SIZE,
            enable_damping: true,
            damping_factor: 0.25,
            enable_zoom: true,
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text).context("invalid settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// File values first (if `--config` was given), then flags on top
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let base = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let settings = base.with_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(size) = cli.shadow_map_size {
            self.shadow_map_size = size;
        }
        if cli.no_ui {
            self.show_stats = false;
        }
        if cli.no_antialias {
            self.antialias = false;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("window size must be non-zero, got {}x{}", self.width, self.height);
        }
        if !self.shadow_map_size.is_power_of_two() {
            bail!("shadow_map_size must be a power of two, got {}", self.shadow_map_size);
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            bail!("damping_factor must be in (0, 1], got {}", self.damping_factor);
        }
        Ok(())
    }
}
