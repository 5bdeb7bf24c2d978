// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

use crate::config::Settings;
use crate::geo::{BoundingBox, Coordinate};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chiba prefecture, the narrow operational region.
pub const PREFECTURE_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 34.90,
    max_lat: 36.11,
    min_lng: 139.73,
    max_lng: 140.88,
};

/// Greater Tokyo (Tokyo, Kanagawa, Saitama, Chiba), the wider fallback.
pub const METRO_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 34.85,
    max_lat: 36.45,
    min_lng: 138.90,
    max_lng: 140.90,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRegion {
    #[default]
    Prefecture,
    Metro,
}

impl ServiceRegion {
    /// Narrowest first.
    pub const ALL: [ServiceRegion; 2] = [ServiceRegion::Prefecture, ServiceRegion::Metro];

    pub fn default_bounds(&self) -> BoundingBox {
        match self {
            ServiceRegion::Prefecture => PREFECTURE_BOUNDS,
            ServiceRegion::Metro => METRO_BOUNDS,
        }
    }

    /// Bounds for this region, preferring an override from the settings file.
    pub fn bounds(&self, settings: &Settings) -> BoundingBox {
        let configured = match self {
            ServiceRegion::Prefecture => settings.prefecture_bounds,
            ServiceRegion::Metro => settings.metro_bounds,
        };
        configured.unwrap_or_else(|| self.default_bounds())
    }

    /// The narrowest region whose bounds contain `point`, if any.
    pub fn containing(point: &Coordinate, settings: &Settings) -> Result<Option<ServiceRegion>> {
        for region in Self::ALL {
            if !is_outside_region(point, &region.bounds(settings))? {
                return Ok(Some(region));
            }
        }
        Ok(None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceRegion::Prefecture => "prefecture",
            ServiceRegion::Metro => "metro",
        }
    }
}

impl fmt::Display for ServiceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceRegion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefecture" | "chiba" => Ok(ServiceRegion::Prefecture),
            "metro" | "tokyo" | "kanto" => Ok(ServiceRegion::Metro),
            other => Err(format!("Unknown service region '{}'", other)),
        }
    }
}

/// True iff `point` lies strictly outside `region` on at least one axis.
/// Points on the boundary are inside.
pub fn is_outside_region(point: &Coordinate, region: &BoundingBox) -> Result<bool> {
    let point = point.validate()?;
    Ok(point.lat < region.min_lat
        || point.lat > region.max_lat
        || point.lng < region.min_lng
        || point.lng > region.max_lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SaigaiError;

    #[test]
    fn test_chiba_city_is_inside_both() {
        let chiba = Coordinate::new(35.6074, 140.1065);
        assert!(!is_outside_region(&chiba, &PREFECTURE_BOUNDS).unwrap());
        assert!(!is_outside_region(&chiba, &METRO_BOUNDS).unwrap());
    }

    #[test]
    fn test_shinjuku_only_in_metro() {
        let shinjuku = Coordinate::new(35.6938, 139.7034);
        assert!(is_outside_region(&shinjuku, &PREFECTURE_BOUNDS).unwrap());
        assert!(!is_outside_region(&shinjuku, &METRO_BOUNDS).unwrap());
        assert_eq!(
            ServiceRegion::containing(&shinjuku, &Settings::default()).unwrap(),
            Some(ServiceRegion::Metro)
        );
    }

    #[test]
    fn test_osaka_outside_everything() {
        let osaka = Coordinate::new(34.6937, 135.5023);
        assert_eq!(
            ServiceRegion::containing(&osaka, &Settings::default()).unwrap(),
            None
        );
    }

    #[test]
    fn test_boundary_is_inside() {
        let corner = Coordinate::new(PREFECTURE_BOUNDS.min_lat, PREFECTURE_BOUNDS.max_lng);
        assert!(!is_outside_region(&corner, &PREFECTURE_BOUNDS).unwrap());
    }

    #[test]
    fn test_invalid_point_is_an_error() {
        let bad = Coordinate::new(f64::NAN, 140.0);
        assert!(matches!(
            is_outside_region(&bad, &PREFECTURE_BOUNDS),
            Err(SaigaiError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_metro_encloses_prefecture() {
        let p = PREFECTURE_BOUNDS;
        let m = METRO_BOUNDS;
        assert!(m.min_lat <= p.min_lat && m.max_lat >= p.max_lat);
        assert!(m.min_lng <= p.min_lng && m.max_lng >= p.max_lng);
    }

    #[test]
    fn test_settings_override_bounds() {
        let settings = Settings {
            prefecture_bounds: Some(BoundingBox::new(0.0, 1.0, 0.0, 1.0)),
            ..Settings::default()
        };
        assert_eq!(
            ServiceRegion::Prefecture.bounds(&settings),
            BoundingBox::new(0.0, 1.0, 0.0, 1.0)
        );
        assert_eq!(ServiceRegion::Metro.bounds(&settings), METRO_BOUNDS);
    }

    #[test]
    fn test_parse_region_names() {
        assert_eq!("Chiba".parse::<ServiceRegion>(), Ok(ServiceRegion::Prefecture));
        assert_eq!("metro".parse::<ServiceRegion>(), Ok(ServiceRegion::Metro));
        assert!("osaka".parse::<ServiceRegion>().is_err());
    }
}
