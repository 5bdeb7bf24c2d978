// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

pub mod index;

pub use index::{
    default_active_layer, distinct_dates, filter_by_visibility, filter_for_date, find_by_id,
    group_by_source_then_category, LayerTree,
};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fixed category vocabulary. Declaration order is the navigation priority,
/// so `Ord` sorts groups the way the map menu lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LayerCategory {
    Cloud,
    Typhoon,
    HeavyRain,
    Earthquake,
    Flood,
    ChibaUniversity,
    #[default]
    Other, // Buildings and anything unrecognised
}

impl LayerCategory {
    pub const ALL: [LayerCategory; 7] = [
        LayerCategory::Cloud,
        LayerCategory::Typhoon,
        LayerCategory::HeavyRain,
        LayerCategory::Earthquake,
        LayerCategory::Flood,
        LayerCategory::ChibaUniversity,
        LayerCategory::Other,
    ];

    /// Never fails: unrecognised labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();

        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "cloud" | "clouds" => LayerCategory::Cloud,
            "typhoon" => LayerCategory::Typhoon,
            "heavy rain" | "heavyrain" | "rain" => LayerCategory::HeavyRain,
            "earthquake" => LayerCategory::Earthquake,
            "flood" | "flooding" => LayerCategory::Flood,
            "chiba university" | "chiba univ" => LayerCategory::ChibaUniversity,
            _ => LayerCategory::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LayerCategory::Cloud => "Cloud",
            LayerCategory::Typhoon => "Typhoon",
            LayerCategory::HeavyRain => "Heavy Rain",
            LayerCategory::Earthquake => "Earthquake",
            LayerCategory::Flood => "Flood",
            LayerCategory::ChibaUniversity => "Chiba University",
            LayerCategory::Other => "Other",
        }
    }

    /// Icon name handed to the map frontend.
    pub fn icon_key(&self) -> &'static str {
        match self {
            LayerCategory::Cloud => "cloud",
            LayerCategory::Typhoon => "typhoon",
            LayerCategory::HeavyRain => "rain",
            LayerCategory::Earthquake => "earthquake",
            LayerCategory::Flood => "flood",
            LayerCategory::ChibaUniversity => "university",
            _ => "building",
        }
    }
}

impl fmt::Display for LayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for LayerCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for LayerCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(LayerCategory::from_label)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSource {
    Admin,
    Prediction,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSource::Admin => f.write_str("admin"),
            LayerSource::Prediction => f.write_str("prediction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("Unknown visibility '{}'", other)),
        }
    }
}

/// One map overlay record as delivered by the layer source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Display name
    pub layer: String,
    #[serde(default)]
    pub category: LayerCategory,
    pub source: LayerSource,
    /// Hazard/forecast date, not the upload time
    #[serde(deserialize_with = "de_layer_date", serialize_with = "ser_layer_date")]
    pub layer_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub processed_url: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub description: String,
}

impl Layer {
    /// Builds a record uploaded at midnight UTC of its own `layer_date`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: LayerCategory,
        source: LayerSource,
        layer_date: NaiveDate,
        visibility: Visibility,
        file_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            layer: name.into(),
            category,
            source,
            layer_date,
            created_at: layer_date.and_time(NaiveTime::MIN).and_utc(),
            visibility,
            file_url: file_url.into(),
            processed_url: None,
            description: String::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Public and pointing at an asset the map can load.
    pub fn is_displayable(&self) -> bool {
        self.is_public() && !self.file_url.trim().is_empty()
    }

    /// The precomputed asset when one exists, otherwise the raw upload.
    pub fn asset_url(&self) -> &str {
        match self.processed_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => &self.file_url,
        }
    }
}

/// Parses `YYYY-MM-DD`, non-padded `YYYY-M-D`, `YYYY/MM/DD`, or a timestamp
/// whose date part is one of those. Time of day is discarded.
pub fn parse_layer_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default();

    let mut parts = date_part.split(|c: char| c == '-' || c == '/');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn de_layer_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_layer_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid layer_date '{}'", raw)))
}

fn ser_layer_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

/// Record ids arrive as strings or integers depending on the backend.
fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
