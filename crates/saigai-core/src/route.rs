// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

use crate::geo::Coordinate;
use crate::proximity::Facility;
use crate::{Result, SaigaiError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointType {
    #[default]
    EvacuationPoint,
    Shelter,
    Hospital,
    WaterSupply,
}

impl PointType {
    pub const ALL: [PointType; 4] = [
        PointType::EvacuationPoint,
        PointType::Shelter,
        PointType::Hospital,
        PointType::WaterSupply,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PointType::EvacuationPoint => "evacuation_point",
            PointType::Shelter => "shelter",
            PointType::Hospital => "hospital",
            PointType::WaterSupply => "water_supply",
        }
    }
}

impl FromStr for PointType {
    type Err = SaigaiError;

    fn from_str(s: &str) -> Result<Self> {
        PointType::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| SaigaiError::InvalidEvacuationParameter {
                field: "point_type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Drive,
    #[default]
    Walk,
    Cycle,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [TravelMode::Drive, TravelMode::Walk, TravelMode::Cycle];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Drive => "drive",
            TravelMode::Walk => "walk",
            TravelMode::Cycle => "cycle",
        }
    }

    /// Routing profile name used by directions services.
    pub fn provider_profile(&self) -> &'static str {
        match self {
            TravelMode::Drive => "driving",
            TravelMode::Walk => "walking",
            TravelMode::Cycle => "cycling",
        }
    }
}

impl FromStr for TravelMode {
    type Err = SaigaiError;

    fn from_str(s: &str) -> Result<Self> {
        TravelMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| SaigaiError::InvalidEvacuationParameter {
                field: "mode",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's current choice of destination kind and travel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvacuationRequest {
    pub point_type: PointType,
    pub mode: TravelMode,
}

/// Value handed to the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub point_type: PointType,
    pub mode: TravelMode,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTypeSelector {
    request: EvacuationRequest,
}

impl RouteTypeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(request: EvacuationRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> EvacuationRequest {
        self.request
    }

    /// Replaces the point type; the mode is untouched.
    /// Unknown values leave the selector unchanged.
    pub fn set_point_type(&mut self, point_type: &str) -> Result<()> {
        self.request.point_type = point_type.parse()?;
        Ok(())
    }

    /// Replaces the mode; the point type is untouched.
    /// Unknown values leave the selector unchanged.
    pub fn set_mode(&mut self, mode: &str) -> Result<()> {
        self.request.mode = mode.parse()?;
        Ok(())
    }

    pub fn to_route_descriptor(&self) -> RouteDescriptor {
        RouteDescriptor {
            point_type: self.request.point_type,
            mode: self.request.mode,
        }
    }
}

/// Everything a directions provider needs to compute one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Facility,
    pub descriptor: RouteDescriptor,
}

impl RouteRequest {
    /// Query parameters in `lng,lat` order, as web directions APIs expect.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "origin",
                format!("{},{}", self.origin.lng, self.origin.lat),
            ),
            (
                "destination",
                format!("{},{}", self.destination.lng, self.destination.lat),
            ),
            ("profile", self.descriptor.mode.provider_profile().to_string()),
            ("point_type", self.descriptor.point_type.as_str().to_string()),
        ]
    }
}

/// External routing service. Its routes and errors are opaque to the engine.
pub trait DirectionsProvider {
    type Route;
    type Error: std::error::Error;

    fn directions(&self, request: &RouteRequest) -> std::result::Result<Self::Route, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let selector = RouteTypeSelector::new();
        assert_eq!(
            selector.to_route_descriptor(),
            RouteDescriptor {
                point_type: PointType::EvacuationPoint,
                mode: TravelMode::Walk,
            }
        );
    }

    #[test]
    fn test_set_mode_keeps_point_type() {
        let mut selector = RouteTypeSelector::new();
        selector.set_point_type("hospital").unwrap();
        selector.set_mode("drive").unwrap();
        selector.set_mode("walk").unwrap();
        let descriptor = selector.to_route_descriptor();
        assert_eq!(descriptor.point_type, PointType::Hospital);
        assert_eq!(descriptor.mode, TravelMode::Walk);
    }

    #[test]
    fn test_unsupported_mode_rejected() {
        let mut selector = RouteTypeSelector::new();
        selector.set_mode("drive").unwrap();
        let err = selector.set_mode("fly").unwrap_err();
        assert_eq!(
            err,
            SaigaiError::InvalidEvacuationParameter {
                field: "mode",
                value: "fly".to_string(),
            }
        );
        assert_eq!(selector.request().mode, TravelMode::Drive);
    }

    #[test]
    fn test_unsupported_point_type_rejected() {
        let mut selector = RouteTypeSelector::new();
        assert!(matches!(
            selector.set_point_type("helipad"),
            Err(SaigaiError::InvalidEvacuationParameter {
                field: "point_type",
                ..
            })
        ));
        assert_eq!(selector.request().point_type, PointType::EvacuationPoint);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Walk".parse::<TravelMode>().is_err());
        assert_eq!(" walk ".parse::<TravelMode>(), Ok(TravelMode::Walk));
    }

    #[test]
    fn test_descriptor_serializes_snake_case() {
        let descriptor = RouteDescriptor {
            point_type: PointType::EvacuationPoint,
            mode: TravelMode::Drive,
        };
        let json = serde_json::to_value(descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"point_type": "evacuation_point", "mode": "drive"})
        );
    }

    #[test]
    fn test_query_pairs() {
        let request = RouteRequest {
            origin: Coordinate::new(35.6, 140.1),
            destination: Facility::new("Shelter", 35.7, 140.2),
            descriptor: RouteDescriptor {
                point_type: PointType::Shelter,
                mode: TravelMode::Cycle,
            },
        };
        let pairs = request.query_pairs();
        assert_eq!(pairs[0], ("origin", "140.1,35.6".to_string()));
        assert_eq!(pairs[1], ("destination", "140.2,35.7".to_string()));
        assert_eq!(pairs[2], ("profile", "cycling".to_string()));
        assert_eq!(pairs[3], ("point_type", "shelter".to_string()));
    }
}
