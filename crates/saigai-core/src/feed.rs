// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

//! JSON snapshots from the layer and facility sources.

use crate::layers::Layer;
use crate::proximity::Facility;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn parse_layers(json: &str) -> Result<Vec<Layer>> {
    let layers: Vec<Layer> = serde_json::from_str(json).context("Failed to parse layer snapshot")?;

    let duplicates = duplicate_ids(&layers);
    if !duplicates.is_empty() {
        log::warn!(
            "Layer snapshot contains duplicated ids — ids={:?}",
            duplicates
        );
    }
    Ok(layers)
}

pub fn load_layers<P: AsRef<Path>>(path: P) -> Result<Vec<Layer>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layer snapshot {}", path.display()))?;
    let layers = parse_layers(&content)?;
    log::debug!(
        "Loaded layer snapshot — path={} layers={}",
        path.display(),
        layers.len()
    );
    Ok(layers)
}

pub fn parse_facilities(json: &str) -> Result<Vec<Facility>> {
    serde_json::from_str(json).context("Failed to parse facility snapshot")
}

pub fn load_facilities<P: AsRef<Path>>(path: P) -> Result<Vec<Facility>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read facility snapshot {}", path.display()))?;
    let facilities = parse_facilities(&content)?;
    log::debug!(
        "Loaded facility snapshot — path={} facilities={}",
        path.display(),
        facilities.len()
    );
    Ok(facilities)
}

/// Ids that occur more than once, in order of their second appearance.
pub fn duplicate_ids(layers: &[Layer]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for layer in layers {
        if !seen.insert(layer.id.as_str()) && reported.insert(layer.id.as_str()) {
            duplicates.push(layer.id.clone());
        }
    }
    duplicates
}
