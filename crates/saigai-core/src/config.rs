// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

use crate::geo::BoundingBox;
use crate::route::{PointType, TravelMode};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// How many facilities `nearest` returns by default
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default)]
    pub default_mode: TravelMode,
    #[serde(default)]
    pub default_point_type: PointType,
    /// Replaces the built-in prefecture box when set
    #[serde(default)]
    pub prefecture_bounds: Option<BoundingBox>,
    /// Replaces the built-in metro box when set
    #[serde(default)]
    pub metro_bounds: Option<BoundingBox>,
    /// Ignore facilities further than this from the origin
    #[serde(default)]
    pub search_radius_km: Option<f64>,
}

fn default_limit() -> usize {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_mode: TravelMode::default(),
            default_point_type: PointType::default(),
            prefecture_bounds: None,
            metro_bounds: None,
            search_radius_km: None,
        }
    }
}

impl Settings {
    /// Rejects values the engine cannot use: inverted or out-of-range region
    /// boxes and non-positive search radii.
    pub fn validate(&self) -> Result<()> {
        for (name, bounds) in [
            ("prefecture_bounds", &self.prefecture_bounds),
            ("metro_bounds", &self.metro_bounds),
        ] {
            if let Some(b) = bounds {
                ensure!(
                    b.min_lat <= b.max_lat && b.min_lng <= b.max_lng,
                    "{} is inverted: {:?}",
                    name,
                    b
                );
                ensure!(
                    b.min_lat >= -90.0 && b.max_lat <= 90.0,
                    "{} latitude outside -90..90: {:?}",
                    name,
                    b
                );
                ensure!(
                    b.min_lng >= -180.0 && b.max_lng <= 180.0,
                    "{} longitude outside -180..180: {:?}",
                    name,
                    b
                );
            }
        }
        if let Some(radius) = self.search_radius_km {
            ensure!(
                radius.is_finite() && radius > 0.0,
                "search_radius_km must be a positive distance, got {}",
                radius
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SettingsManager {
    config_path: PathBuf,
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManager {
    pub fn new() -> Self {
        Self::with_path(crate::get_config_root().join(SETTINGS_FILE))
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// A missing file yields the defaults. A present file must parse and
    /// pass [`Settings::validate`].
    pub fn load(&self) -> Result<Settings> {
        let path = &self.config_path;
        if !path.exists() {
            log::debug!("No settings file at {}; using defaults", path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        log::debug!(
            "Loaded settings — path={} limit={} mode={} radius={:?}",
            path.display(),
            settings.default_limit,
            settings.default_mode.as_str(),
            settings.search_radius_km
        );
        Ok(settings)
    }

    /// Refuses to write settings that [`load`](Self::load) would reject.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate().context("Refusing to save invalid settings")?;

        let path = &self.config_path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create settings directory {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings {}", path.display()))
    }
}
