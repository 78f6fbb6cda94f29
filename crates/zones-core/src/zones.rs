//! Delivery-zone catalog: zones plus their spatial index.
//!
//! Owns the authoritative id→zone map and keeps the grid index in step
//! with every mutation. Synchronous and not internally locked; callers
//! that share a catalog across threads wrap it in a mutex or swap
//! immutable snapshots.

use crate::geo;
use crate::grid::SpatialGridIndex;
use crate::models::{DeliveryZone, Point, UpdateZoneRequest};
use crate::pricing::PricingRules;
use std::collections::HashMap;

pub struct ZoneCatalog {
    zones: HashMap<String, DeliveryZone>,
    /// Reverse map from embedded geofence id to owning zone id, used to
    /// translate index query results back into zones.
    zone_by_geofence: HashMap<String, String>,
    index: SpatialGridIndex,
    pricing: PricingRules,
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneCatalog {
    pub fn new() -> Self {
        Self::with_settings(crate::grid::DEFAULT_CELL_SIZE_DEG, PricingRules::default())
    }

    pub fn with_settings(cell_size_deg: f64, pricing: PricingRules) -> Self {
        Self {
            zones: HashMap::new(),
            zone_by_geofence: HashMap::new(),
            index: SpatialGridIndex::with_cell_size(cell_size_deg),
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingRules {
        &self.pricing
    }

    /// Insert a zone, indexing its geofence. Reusing an existing zone id
    /// overwrites the previous zone.
    pub fn insert_zone(&mut self, zone: DeliveryZone) {
        if let Some(previous) = self.zones.remove(&zone.id) {
            self.index.remove_geofence(&previous.geofence.id);
            self.zone_by_geofence.remove(&previous.geofence.id);
        }

        self.index.add_geofence(zone.geofence.clone());
        self.zone_by_geofence
            .insert(zone.geofence.id.clone(), zone.id.clone());
        self.zones.insert(zone.id.clone(), zone);
    }

    /// Apply a partial update. None for an unknown id. A boundary change
    /// re-indexes the geofence and re-derives the center unless the
    /// request pins one explicitly.
    pub fn update_zone(&mut self, id: &str, update: UpdateZoneRequest) -> Option<DeliveryZone> {
        let zone = self.zones.get_mut(id)?;

        if let Some(name) = update.name {
            zone.name = name.clone();
            zone.geofence.name = name;
        }
        if let Some(minutes) = update.estimated_delivery_time_minutes {
            zone.estimated_delivery_time_minutes = minutes;
        }
        if let Some(fee) = update.delivery_fee {
            zone.delivery_fee = fee;
        }
        if let Some(active) = update.is_active {
            zone.is_active = active;
        }
        if let Some(metadata) = update.metadata {
            zone.metadata = metadata;
        }

        let boundary_changed = update.boundary.is_some();
        if let Some(boundary) = update.boundary {
            zone.geofence.boundary = boundary;
        }
        if let Some(center) = update.center {
            zone.geofence.center = center;
        } else if boundary_changed {
            if let Some(centroid) = geo::polygon_centroid(&zone.geofence.boundary) {
                zone.geofence.center = centroid;
            }
        }

        if boundary_changed || update.center.is_some() {
            zone.geofence.updated_at = chrono::Utc::now();
            // add_geofence overwrites the stale cell memberships.
            self.index.add_geofence(zone.geofence.clone());
        }

        Some(zone.clone())
    }

    /// Remove a zone and its geofence from the index. False for an
    /// unknown id.
    pub fn remove_zone(&mut self, id: &str) -> bool {
        let Some(zone) = self.zones.remove(id) else {
            return false;
        };
        self.index.remove_geofence(&zone.geofence.id);
        self.zone_by_geofence.remove(&zone.geofence.id);
        true
    }

    pub fn get_zone(&self, id: &str) -> Option<&DeliveryZone> {
        self.zones.get(id)
    }

    pub fn list_zones(&self) -> Vec<DeliveryZone> {
        self.zones.values().cloned().collect()
    }

    /// Zones with the active flag set. The flag never filters spatial
    /// queries; it only matters when callers ask for it explicitly.
    pub fn list_active_zones(&self) -> Vec<DeliveryZone> {
        self.zones
            .values()
            .filter(|z| z.is_active)
            .cloned()
            .collect()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Zones whose geofence polygon contains `point`, active or not.
    pub fn find_zones_containing_point(&self, point: &Point) -> Vec<DeliveryZone> {
        self.index
            .find_geofences_containing_point(point)
            .iter()
            .filter_map(|g| self.owning_zone(&g.id))
            .collect()
    }

    /// Zones whose geofence center is within `radius_m` of `center`.
    pub fn find_zones_within_radius(&self, center: &Point, radius_m: f64) -> Vec<DeliveryZone> {
        self.index
            .find_geofences_within_radius(center, radius_m)
            .iter()
            .filter_map(|g| self.owning_zone(&g.id))
            .collect()
    }

    /// Quoted delivery time in minutes for a courier trip between two
    /// points.
    pub fn estimate_delivery_time(&self, origin: &Point, destination: &Point) -> u32 {
        self.pricing
            .delivery_minutes(geo::haversine_distance(origin, destination))
    }

    /// Quoted delivery fee for a courier trip between two points.
    pub fn estimate_delivery_fee(&self, origin: &Point, destination: &Point) -> f64 {
        self.pricing
            .delivery_fee(geo::haversine_distance(origin, destination))
    }

    fn owning_zone(&self, geofence_id: &str) -> Option<DeliveryZone> {
        let zone_id = self.zone_by_geofence.get(geofence_id)?;
        self.zones.get(zone_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geofence;

    fn zone(id: &str, name: &str, active: bool) -> DeliveryZone {
        let boundary = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        DeliveryZone {
            id: id.to_string(),
            name: name.to_string(),
            geofence: Geofence::new(
                format!("gf-{id}"),
                name,
                boundary,
                Point::new(0.5, 0.5),
            ),
            estimated_delivery_time_minutes: 30,
            delivery_fee: 4.99,
            is_active: active,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn containment_maps_back_to_owning_zone() {
        let mut catalog = ZoneCatalog::new();
        catalog.insert_zone(zone("z1", "Downtown", true));

        let hits = catalog.find_zones_containing_point(&Point::new(0.5, 0.5));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "z1");

        assert!(catalog
            .find_zones_containing_point(&Point::new(2.0, 2.0))
            .is_empty());
    }

    #[test]
    fn inactive_zones_still_match_spatial_queries() {
        let mut catalog = ZoneCatalog::new();
        catalog.insert_zone(zone("z1", "Dormant", false));

        assert_eq!(
            catalog
                .find_zones_containing_point(&Point::new(0.5, 0.5))
                .len(),
            1
        );
        assert!(catalog.list_active_zones().is_empty());
        assert_eq!(catalog.list_zones().len(), 1);
    }

    #[test]
    fn update_unknown_zone_is_none() {
        let mut catalog = ZoneCatalog::new();
        assert!(catalog
            .update_zone("missing", UpdateZoneRequest::default())
            .is_none());
    }

    #[test]
    fn update_boundary_reindexes_and_recenters() {
        let mut catalog = ZoneCatalog::new();
        catalog.insert_zone(zone("z1", "Mobile", true));

        let update = UpdateZoneRequest {
            boundary: Some(vec![
                Point::new(10.0, 10.0),
                Point::new(11.0, 10.0),
                Point::new(11.0, 11.0),
                Point::new(10.0, 11.0),
            ]),
            ..Default::default()
        };
        let updated = catalog.update_zone("z1", update).unwrap();
        assert!((updated.geofence.center.lat - 10.5).abs() < 1e-9);

        assert!(catalog
            .find_zones_containing_point(&Point::new(0.5, 0.5))
            .is_empty());
        assert_eq!(
            catalog
                .find_zones_containing_point(&Point::new(10.5, 10.5))
                .len(),
            1
        );
    }

    #[test]
    fn remove_zone_clears_spatial_results() {
        let mut catalog = ZoneCatalog::new();
        catalog.insert_zone(zone("z1", "Here", true));
        catalog.insert_zone(zone("z2", "Here", true));
        assert_eq!(catalog.zone_count(), 2);

        assert!(catalog.remove_zone("z1"));
        assert!(!catalog.remove_zone("z1"));
        assert_eq!(catalog.zone_count(), 1);

        let remaining = catalog.list_zones();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "z2");
    }

    #[test]
    fn estimates_grow_with_distance() {
        let catalog = ZoneCatalog::new();
        let origin = Point::new(0.0, 0.0);
        let near = Point::new(0.01, 0.0);
        let far = Point::new(0.5, 0.0);

        assert!(
            catalog.estimate_delivery_fee(&origin, &far)
                >= catalog.estimate_delivery_fee(&origin, &near)
        );
        assert!(
            catalog.estimate_delivery_time(&origin, &far)
                >= catalog.estimate_delivery_time(&origin, &near)
        );
        assert_eq!(
            catalog.estimate_delivery_time(&origin, &origin),
            catalog.pricing().base_minutes
        );
    }
}
