// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

pub mod config;
pub mod feed;
pub mod geo;
pub mod layers;
pub mod proximity;
pub mod region;
pub mod route;
pub mod session;

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors signalled by the pure components of the engine.
///
/// Empty inputs are never an error: every operation returns an empty result
/// for an empty snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaigaiError {
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("Invalid evacuation parameter {field}: '{value}'")]
    InvalidEvacuationParameter { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, SaigaiError>;

/// Environment variable that overrides the settings directory.
pub const CONFIG_DIR_ENV: &str = "SAIGAI_CONFIG_DIR";

/// Directory holding `settings.json`.
/// Honours `SAIGAI_CONFIG_DIR`, then the platform config dir.
pub fn get_config_root() -> PathBuf {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    ProjectDirs::from("org", "saigai", "Saigai Map")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".saigai"))
}

pub use geo::{distance_km, BoundingBox, Coordinate};
pub use layers::{Layer, LayerCategory, LayerSource, Visibility};
pub use proximity::{nearest, Facility, RankedFacility};
pub use region::{is_outside_region, ServiceRegion};
pub use route::{EvacuationRequest, PointType, RouteDescriptor, RouteTypeSelector, TravelMode};
pub use session::MapSession;
