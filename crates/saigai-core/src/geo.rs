// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

use crate::{Result, SaigaiError};
use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG), kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Length of one degree of latitude on the mean sphere, kilometres.
const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Returns the coordinate unchanged, or `InvalidCoordinate` if it is
    /// non-finite or outside the lat/lng ranges.
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(SaigaiError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Edges are inclusive: a point on the boundary is inside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Smallest box enclosing every point within `radius_km` of `center`.
    ///
    /// The longitude half-width is taken at the tangent latitude of the
    /// circle, not at the centre. When the circle reaches a pole or the
    /// span would cross the antimeridian, the box covers every longitude.
    /// The box is a coarse pre-filter; exact distances still come from
    /// [`distance_km`].
    pub fn around(center: Coordinate, radius_km: f64) -> Result<Self> {
        let center = center.validate()?;
        let radius_km = if radius_km.is_finite() {
            radius_km.max(0.0)
        } else {
            return Err(SaigaiError::InvalidCoordinate {
                lat: center.lat,
                lng: center.lng,
            });
        };

        let d_lat = radius_km / KM_PER_DEGREE;
        let min_lat = (center.lat - d_lat).max(-90.0);
        let max_lat = (center.lat + d_lat).min(90.0);

        let full = (-180.0, 180.0);
        let (min_lng, max_lng) = if min_lat <= -90.0 || max_lat >= 90.0 {
            full
        } else {
            let ratio = (radius_km / EARTH_RADIUS_KM).sin() / center.lat.to_radians().cos();
            if ratio >= 1.0 {
                full
            } else {
                let d_lng = ratio.asin().to_degrees();
                let (lo, hi) = (center.lng - d_lng, center.lng + d_lng);
                if lo < -180.0 || hi > 180.0 {
                    full
                } else {
                    (lo, hi)
                }
            }
        };

        Ok(Self::new(min_lat, max_lat, min_lng, max_lng))
    }
}

/// Great-circle distance in kilometres (haversine).
///
/// Fails with `InvalidCoordinate` if either endpoint is non-finite or out of
/// range.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> Result<f64> {
    let a = a.validate()?;
    let b = b.validate()?;

    // Canonical endpoint order keeps the result bit-identical when swapped.
    let (p, q) = if (a.lat, a.lng) <= (b.lat, b.lng) {
        (a, b)
    } else {
        (b, a)
    };

    let d_lat = (q.lat - p.lat).to_radians();
    let d_lng = (q.lng - p.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + p.lat.to_radians().cos() * q.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    Ok(EARTH_RADIUS_KM * c)
}
