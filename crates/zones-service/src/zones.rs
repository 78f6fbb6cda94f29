//! Thread-safe delivery-zone service.
//!
//! Wraps the synchronous [`ZoneCatalog`] behind a per-instance mutex
//! (the catalog itself defines no mid-mutation atomicity) and layers a
//! cache-aside path over point lookups. The catalog is always
//! authoritative; the cache only saves recomputation.

use crate::cache::{build_cache, CacheError, ZoneCache};
use crate::config::Config;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;
use zones_core::{
    geo, CreateZoneRequest, DeliveryZone, Geofence, Point, PricingRules, UpdateZoneRequest,
    ZoneCatalog, ZoneError,
};

pub struct ZoneService {
    catalog: Mutex<ZoneCatalog>,
    cache: Arc<dyn ZoneCache<Vec<DeliveryZone>>>,
    cache_ttl: Duration,
}

impl ZoneService {
    /// Build the service from configuration. Fails fast when the shared
    /// cache is selected but unreachable or unconfigured.
    pub async fn from_config(config: &Config) -> Result<Self, CacheError> {
        let cache = build_cache(config).await?;
        tracing::info!(
            provider = ?config.cache_provider,
            cell_size_deg = config.cell_size_deg,
            "zone service initialized"
        );
        Ok(Self {
            catalog: Mutex::new(ZoneCatalog::with_settings(
                config.cell_size_deg,
                PricingRules::default(),
            )),
            cache,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        })
    }

    fn catalog(&self) -> MutexGuard<'_, ZoneCatalog> {
        // A panic while holding the lock leaves the catalog usable;
        // recover the guard instead of poisoning every later call.
        self.catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a zone from a request. The geofence gets a fresh id and a
    /// centroid-derived center when the request does not pin one.
    pub async fn create_zone(&self, req: CreateZoneRequest) -> Result<DeliveryZone, ZoneError> {
        let center = req
            .center
            .or_else(|| geo::polygon_centroid(&req.boundary))
            .unwrap_or(Point::new(0.0, 0.0));

        let geofence = Geofence::new(
            Uuid::new_v4().to_string(),
            req.name.clone(),
            req.boundary,
            center,
        );
        let errors = geofence.validate();
        if !errors.is_empty() {
            return Err(ZoneError::Invalid(errors));
        }

        let zone = DeliveryZone {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            geofence,
            estimated_delivery_time_minutes: req.estimated_delivery_time_minutes,
            delivery_fee: req.delivery_fee,
            is_active: true,
            metadata: req.metadata,
        };

        self.catalog().insert_zone(zone.clone());
        self.cache.clear().await;
        tracing::debug!(zone_id = %zone.id, name = %zone.name, "zone created");
        Ok(zone)
    }

    /// Apply a partial update. None for an unknown id.
    pub async fn update_zone(&self, id: &str, update: UpdateZoneRequest) -> Option<DeliveryZone> {
        let updated = self.catalog().update_zone(id, update);
        if updated.is_some() {
            self.cache.clear().await;
            tracing::debug!(zone_id = id, "zone updated");
        }
        updated
    }

    /// Remove a zone. False for an unknown id.
    pub async fn delete_zone(&self, id: &str) -> bool {
        let removed = self.catalog().remove_zone(id);
        if removed {
            self.cache.clear().await;
            tracing::debug!(zone_id = id, "zone deleted");
        }
        removed
    }

    pub fn get_zone(&self, id: &str) -> Option<DeliveryZone> {
        self.catalog().get_zone(id).cloned()
    }

    pub fn list_zones(&self) -> Vec<DeliveryZone> {
        self.catalog().list_zones()
    }

    pub fn list_active_zones(&self) -> Vec<DeliveryZone> {
        self.catalog().list_active_zones()
    }

    pub fn zone_count(&self) -> usize {
        self.catalog().zone_count()
    }

    /// Zones containing `point`, cache-aside. A hit skips the index
    /// entirely; a miss (or any provider failure) recomputes from the
    /// catalog and backfills with the configured TTL.
    pub async fn find_zones_containing_point(&self, point: &Point) -> Vec<DeliveryZone> {
        let key = point_key(point);
        if let Some(zones) = self.cache.get(&key).await {
            tracing::debug!(key = %key, hits = zones.len(), "point lookup served from cache");
            return zones;
        }

        let zones = self.catalog().find_zones_containing_point(point);
        self.cache
            .set(&key, zones.clone(), Some(self.cache_ttl))
            .await;
        zones
    }

    /// Zones whose center is within `radius_m` of `center`. Uncached:
    /// arbitrary centers and radii make a bounded key space impossible.
    pub fn find_zones_within_radius(&self, center: &Point, radius_m: f64) -> Vec<DeliveryZone> {
        self.catalog().find_zones_within_radius(center, radius_m)
    }

    pub fn estimate_delivery_time(&self, origin: &Point, destination: &Point) -> u32 {
        self.catalog().estimate_delivery_time(origin, destination)
    }

    pub fn estimate_delivery_fee(&self, origin: &Point, destination: &Point) -> f64 {
        self.catalog().estimate_delivery_fee(origin, destination)
    }
}

/// Cache key for an exact point lookup. Six decimal places keeps keys
/// stable across float formatting while staying finer than any real
/// client coordinate.
fn point_key(point: &Point) -> String {
    format!("point:{:.6}:{:.6}", point.lat, point.lon)
}
