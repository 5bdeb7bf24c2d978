// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

//! Session state owned by the caller, and the glue that strings the
//! components together for one map screen.

use crate::config::Settings;
use crate::geo::{BoundingBox, Coordinate};
use crate::layers::{self, Layer, LayerTree, Visibility};
use crate::proximity::{self, Facility};
use crate::region::{is_outside_region, ServiceRegion};
use crate::route::{DirectionsProvider, RouteRequest, RouteTypeSelector};
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub distance_km: f64,
    pub request: RouteRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvacuationPlan {
    /// The origin is not covered; the UI should warn instead of routing.
    OutsideRegion { origin: Coordinate },
    /// Nearest first. Empty when no facility qualified.
    Routes { routes: Vec<PlannedRoute> },
}

impl EvacuationPlan {
    pub fn routes(&self) -> &[PlannedRoute] {
        match self {
            EvacuationPlan::Routes { routes } => routes,
            EvacuationPlan::OutsideRegion { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapSession {
    layers: Vec<Layer>,
    current_date: Option<NaiveDate>,
    current_layer_id: Option<String>,
    selector: RouteTypeSelector,
}

impl MapSession {
    pub fn new(snapshot: Vec<Layer>) -> Self {
        let mut session = Self {
            layers: snapshot,
            ..Self::default()
        };
        session.reset_selection();
        session
    }

    pub fn with_selector(mut self, selector: RouteTypeSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Swaps in a fresh snapshot. The current layer survives if its id is
    /// still present and the layer is still displayable; otherwise the
    /// default selection is recomputed.
    pub fn replace_layers(&mut self, snapshot: Vec<Layer>) {
        self.layers = snapshot;

        let kept = self
            .current_layer_id
            .as_deref()
            .and_then(|id| layers::find_by_id(&self.layers, id))
            .filter(|l| l.is_displayable())
            .map(|l| l.layer_date);

        match kept {
            Some(date) => self.current_date = Some(date),
            None => {
                log::debug!(
                    "Current layer gone or hidden in new snapshot — id={:?}; reselecting default",
                    self.current_layer_id
                );
                self.reset_selection();
            }
        }
    }

    fn reset_selection(&mut self) {
        match layers::default_active_layer(&self.layers) {
            Some(layer) => {
                self.current_layer_id = Some(layer.id.clone());
                self.current_date = Some(layer.layer_date);
            }
            None => {
                self.current_layer_id = None;
                self.current_date = layers::distinct_dates(&self.layers).last().copied();
            }
        }
        log::debug!(
            "Session selection — layer={:?} date={:?} layers={}",
            self.current_layer_id,
            self.current_date,
            self.layers.len()
        );
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        layers::distinct_dates(&self.layers)
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    pub fn current_layer(&self) -> Option<&Layer> {
        let id = self.current_layer_id.as_deref()?;
        layers::find_by_id(&self.layers, id)
    }

    /// Moves to `date` if any layer carries it. The current layer is kept
    /// when it belongs to that date, otherwise the first displayable layer
    /// of the date (or nothing) becomes current.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        let on_date = layers::filter_for_date(&self.layers, date);
        if on_date.is_empty() {
            return false;
        }

        let keep_current = self
            .current_layer()
            .is_some_and(|l| l.layer_date == date && l.is_displayable());
        if !keep_current {
            self.current_layer_id =
                layers::default_active_layer(on_date.iter().copied()).map(|l| l.id.clone());
        }
        self.current_date = Some(date);
        true
    }

    /// Makes `id` the current layer. Unknown ids and layers that are not
    /// displayable (private, or without an asset) are refused and leave the
    /// selection unchanged.
    pub fn select_layer(&mut self, id: &str) -> bool {
        match layers::find_by_id(&self.layers, id) {
            Some(layer) if layer.is_displayable() => {
                self.current_date = Some(layer.layer_date);
                self.current_layer_id = Some(layer.id.clone());
                true
            }
            Some(_) => {
                log::debug!("Refusing to display hidden layer — id={}", id);
                false
            }
            None => false,
        }
    }

    /// Neighbouring date in the navigation bar, if there is one.
    pub fn step_date(&mut self, forward: bool) -> Option<NaiveDate> {
        let dates = self.dates();
        let target = match self.current_date {
            Some(current) if forward => dates.iter().find(|d| **d > current).copied(),
            Some(current) => dates.iter().rev().find(|d| **d < current).copied(),
            None => dates.first().copied(),
        }?;
        self.select_date(target);
        Some(target)
    }

    /// Public layers on the current date; what an anonymous visitor sees.
    pub fn visible_layers_for_current_date(&self) -> Vec<&Layer> {
        match self.current_date {
            Some(date) => layers::filter_by_visibility(
                layers::filter_for_date(&self.layers, date),
                Visibility::Public,
            ),
            None => Vec::new(),
        }
    }

    /// The source/category menu, built from public layers only.
    pub fn navigation(&self) -> LayerTree<'_> {
        layers::group_by_source_then_category(layers::filter_by_visibility(
            &self.layers,
            Visibility::Public,
        ))
    }

    pub fn selector(&self) -> &RouteTypeSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut RouteTypeSelector {
        &mut self.selector
    }

    /// Region check, then proximity ranking, then one route request per
    /// ranked facility using the current descriptor.
    pub fn plan_evacuation(
        &self,
        origin: &Coordinate,
        facilities: &[Facility],
        region: &BoundingBox,
        limit: usize,
        radius_km: Option<f64>,
    ) -> Result<EvacuationPlan> {
        if is_outside_region(origin, region)? {
            log::warn!(
                "Origin outside supported region — lat={} lng={}",
                origin.lat,
                origin.lng
            );
            return Ok(EvacuationPlan::OutsideRegion { origin: *origin });
        }

        let ranked = match radius_km {
            Some(radius) => proximity::nearest_within(origin, facilities, limit, radius)?,
            None => proximity::nearest(origin, facilities, limit)?,
        };

        let descriptor = self.selector.to_route_descriptor();
        let routes = ranked
            .into_iter()
            .map(|r| PlannedRoute {
                distance_km: r.distance_km,
                request: RouteRequest {
                    origin: *origin,
                    destination: r.facility,
                    descriptor,
                },
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Evacuation plan — candidates={} routes={} mode={}",
            facilities.len(),
            routes.len(),
            descriptor.mode
        );
        Ok(EvacuationPlan::Routes { routes })
    }

    /// Plans against the service regions narrowest first. Each pass only
    /// considers facilities inside that region; the wider region is tried
    /// when the narrower one leaves no routes. Returns the region that
    /// produced the plan, or `None` with `OutsideRegion` when no region
    /// covers the origin.
    pub fn plan_evacuation_in_service_area(
        &self,
        origin: &Coordinate,
        facilities: &[Facility],
        settings: &Settings,
        limit: usize,
        radius_km: Option<f64>,
    ) -> Result<(Option<ServiceRegion>, EvacuationPlan)> {
        let mut fallback = None;

        for region in ServiceRegion::ALL {
            let bounds = region.bounds(settings);
            if is_outside_region(origin, &bounds)? {
                continue;
            }

            let in_region: Vec<Facility> = facilities
                .iter()
                .filter(|f| bounds.contains(&f.location()))
                .cloned()
                .collect();
            let plan = self.plan_evacuation(origin, &in_region, &bounds, limit, radius_km)?;
            if !plan.routes().is_empty() {
                return Ok((Some(region), plan));
            }

            log::warn!(
                "No facilities qualify in {} region — candidates={}",
                region,
                in_region.len()
            );
            if fallback.is_none() {
                fallback = Some((Some(region), plan));
            }
        }

        match fallback {
            Some(found) => Ok(found),
            None => {
                log::warn!(
                    "Origin outside every service region — lat={} lng={}",
                    origin.lat,
                    origin.lng
                );
                Ok((None, EvacuationPlan::OutsideRegion { origin: *origin }))
            }
        }
    }

    /// Asks the provider for a route to the nearest planned facility.
    pub fn route_to_nearest<P: DirectionsProvider>(
        &self,
        provider: &P,
        plan: &EvacuationPlan,
    ) -> Option<std::result::Result<P::Route, P::Error>> {
        plan.routes()
            .first()
            .map(|planned| provider.directions(&planned.request))
    }
}
