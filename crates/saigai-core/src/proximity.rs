// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

use crate::geo::{distance_km, BoundingBox, Coordinate};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DISTANCE_KEY: &str = "distance_km";

/// A point-of-interest candidate (shelter, hospital, ...).
/// Keys other than `name`, `lat` and `lng` are kept in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Facility {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            attributes: Map::new(),
        }
    }

    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// A facility with its computed distance. A `distance_km` attribute carried
/// by the source record is dropped so the serialized form has one such key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFacility {
    #[serde(flatten)]
    pub facility: Facility,
    pub distance_km: f64,
}

impl RankedFacility {
    fn new(facility: &Facility, distance_km: f64) -> Self {
        let mut facility = facility.clone();
        if facility.attributes.remove(DISTANCE_KEY).is_some() {
            log::debug!(
                "Dropped stale '{}' attribute — facility={}",
                DISTANCE_KEY,
                facility.name
            );
        }
        Self {
            facility,
            distance_km,
        }
    }
}

/// The `limit` candidates closest to `origin`, nearest first.
///
/// Equal distances keep their input order. A `limit` larger than the
/// candidate list returns every candidate; an empty list or a zero limit
/// returns nothing. Any invalid coordinate fails the whole ranking.
pub fn nearest(
    origin: &Coordinate,
    candidates: &[Facility],
    limit: usize,
) -> Result<Vec<RankedFacility>> {
    let origin = origin.validate()?;
    rank(&origin, candidates.iter(), limit)
}

/// Like [`nearest`], restricted to candidates within `radius_km`.
pub fn nearest_within(
    origin: &Coordinate,
    candidates: &[Facility],
    limit: usize,
    radius_km: f64,
) -> Result<Vec<RankedFacility>> {
    let origin = origin.validate()?;
    let bounds = BoundingBox::around(origin, radius_km)?;

    // Box test first; exact distance is applied after ranking.
    let in_box = candidates.iter().filter(|f| bounds.contains(&f.location()));
    let mut ranked = rank(&origin, in_box, usize::MAX)?;
    ranked.retain(|r| r.distance_km <= radius_km);
    ranked.truncate(limit);
    Ok(ranked)
}

fn rank<'a, I>(origin: &Coordinate, candidates: I, limit: usize) -> Result<Vec<RankedFacility>>
where
    I: Iterator<Item = &'a Facility>,
{
    let mut ranked = candidates
        .map(|facility| {
            let d = distance_km(origin, &facility.location())?;
            Ok(RankedFacility::new(facility, d))
        })
        .collect::<Result<Vec<_>>>()?;

    // sort_by is stable, so ties keep input order
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SaigaiError;

    fn chiba() -> Coordinate {
        Coordinate::new(35.6074, 140.1065)
    }

    fn facilities() -> Vec<Facility> {
        vec![
            Facility::new("Funabashi Shelter", 35.6947, 139.9827),
            Facility::new("Chiba Central Hospital", 35.6100, 140.1100),
            Facility::new("Narita Gym", 35.7767, 140.3183),
            Facility::new("Inage School", 35.6370, 140.0920),
        ]
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let ranked = nearest(&chiba(), &facilities(), 2).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.facility.name.as_str()).collect();
        assert_eq!(names, vec!["Chiba Central Hospital", "Inage School"]);
        assert!(ranked[0].distance_km <= ranked[1].distance_km);
    }

    #[test]
    fn test_limit_larger_than_candidates() {
        let ranked = nearest(&chiba(), &facilities(), 50).unwrap();
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked.last().unwrap().facility.name, "Narita Gym");
    }

    #[test]
    fn test_zero_limit_and_empty_input() {
        assert!(nearest(&chiba(), &facilities(), 0).unwrap().is_empty());
        assert!(nearest(&chiba(), &[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            Facility::new("first", 35.7, 140.0),
            Facility::new("second", 35.7, 140.0),
            Facility::new("third", 35.7, 140.0),
        ];
        let ranked = nearest(&chiba(), &candidates, 3).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.facility.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_attributes_survive_ranking() {
        let mut hospital = Facility::new("Hospital", 35.61, 140.11);
        hospital
            .attributes
            .insert("beds".to_string(), Value::from(120));
        let ranked = nearest(&chiba(), std::slice::from_ref(&hospital), 1).unwrap();
        assert_eq!(ranked[0].facility, hospital);
    }

    #[test]
    fn test_invalid_candidate_fails() {
        let candidates = vec![Facility::new("broken", f64::NAN, 140.0)];
        assert!(matches!(
            nearest(&chiba(), &candidates, 1),
            Err(SaigaiError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_stale_distance_attribute_replaced() {
        let mut shelter = Facility::new("Shelter", 35.61, 140.11);
        shelter
            .attributes
            .insert("distance_km".to_string(), Value::from(999.0));
        shelter
            .attributes
            .insert("capacity".to_string(), Value::from(40));

        let ranked = nearest(&chiba(), std::slice::from_ref(&shelter), 1).unwrap();
        assert!(!ranked[0].facility.attributes.contains_key("distance_km"));
        assert_eq!(ranked[0].facility.attributes["capacity"], 40);

        let json = serde_json::to_string(&ranked[0]).unwrap();
        assert_eq!(json.matches("\"distance_km\"").count(), 1);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert!(back["distance_km"].as_f64().unwrap() < 1.0);
    }

    #[test]
    fn test_nearest_within_high_latitude() {
        let origin = Coordinate::new(60.0, 0.0);
        let candidates = vec![Facility::new("north-east", 65.57, 37.5)];
        let ranked = nearest_within(&origin, &candidates, 5, 2000.0).unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].distance_km <= 2000.0);
    }

    #[test]
    fn test_nearest_within_across_antimeridian() {
        let origin = Coordinate::new(0.0, 179.99);
        let candidates = vec![
            Facility::new("west side", 0.0, -179.99),
            Facility::new("far", 0.0, 170.0),
        ];
        let ranked = nearest_within(&origin, &candidates, 5, 10.0).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.facility.name.as_str()).collect();
        assert_eq!(names, vec!["west side"]);
    }

    #[test]
    fn test_nearest_within_radius() {
        let ranked = nearest_within(&chiba(), &facilities(), 10, 5.0).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.facility.name.as_str()).collect();
        assert_eq!(names, vec!["Chiba Central Hospital", "Inage School"]);
        assert!(ranked.iter().all(|r| r.distance_km <= 5.0));
    }
}
