use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use egui::{vec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::measurement::{MeasurementSettings, DEFAULT_REFERENCE_LENGTH};
use crate::theme::ThemeMode;
use crate::view::{MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH};

/// Startup configuration. Read once, never written back.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub surface_width: f32,
    pub surface_height: f32,
    pub reference_length: f32,
    pub use_centimeters: bool,
    /// `tracing` filter directive, used when `RUST_LOG` is not set.
    pub log_filter: String,
    pub export_file_prefix: String,
    /// Starting theme; the side panel can switch it for the session.
    pub theme: ThemeMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            surface_width: 800.0,
            surface_height: 600.0,
            reference_length: DEFAULT_REFERENCE_LENGTH,
            use_centimeters: false,
            log_filter: "info".to_string(),
            export_file_prefix: "Measurement".to_string(),
            theme: ThemeMode::Dark,
        }
    }
}

impl AppConfig {
    pub fn file_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("com", "segmeter", "segmeter")?;
        Some(dirs.config_dir().join("config.json"))
    }

    /// Reads the config file. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = Self::file_path().context("cannot resolve config path")?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.surface_width.is_finite() {
            self.surface_width = defaults.surface_width;
        }
        if !self.surface_height.is_finite() {
            self.surface_height = defaults.surface_height;
        }
        self.surface_width = self.surface_width.max(MIN_SURFACE_WIDTH);
        self.surface_height = self.surface_height.max(MIN_SURFACE_HEIGHT);
        if !(self.reference_length.is_finite() && self.reference_length > 0.0) {
            self.reference_length = defaults.reference_length;
        }
        if self.export_file_prefix.trim().is_empty() {
            self.export_file_prefix = defaults.export_file_prefix;
        }
        self
    }

    pub fn surface_size(&self) -> Vec2 {
        vec2(self.surface_width, self.surface_height)
    }

    pub fn measurement_settings(&self) -> MeasurementSettings {
        MeasurementSettings {
            use_centimeters: self.use_centimeters,
            reference_length: self.reference_length,
        }
    }
}
