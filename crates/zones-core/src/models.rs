//! Core data models for the delivery-zone engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geo;

/// A geographic coordinate in decimal degrees.
///
/// Latitude is expected in [-90, 90] and longitude in [-180, 180].
/// Nothing validates this at construction; every consumer is total over
/// out-of-range input and simply produces degenerate results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned bounding rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Grow the bounds to include `point`.
    pub fn expand(&mut self, point: &Point) {
        self.min_lat = self.min_lat.min(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lat = self.max_lat.max(point.lat);
        self.max_lon = self.max_lon.max(point.lon);
    }

    pub fn from_point(point: &Point) -> Self {
        Self {
            min_lat: point.lat,
            min_lon: point.lon,
            max_lat: point.lat,
            max_lon: point.lon,
        }
    }
}

/// A named polygonal region used for point-containment tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geofence {
    pub id: String,
    pub name: String,
    /// Polygon vertices in order; the last vertex connects back to the first.
    pub boundary: Vec<Point>,
    pub center: Point,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Geofence {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        boundary: Vec<Point>,
        center: Point,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            boundary,
            center,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if a point is inside this geofence's boundary polygon.
    /// Always false for boundaries with fewer than 3 vertices.
    pub fn contains(&self, point: &Point) -> bool {
        geo::point_in_polygon(point, &self.boundary)
    }

    /// Smallest axis-aligned rectangle enclosing the boundary.
    /// None for an empty boundary.
    pub fn bounding_box(&self) -> Option<GeoBounds> {
        let mut vertices = self.boundary.iter();
        let mut bounds = GeoBounds::from_point(vertices.next()?);
        for vertex in vertices {
            bounds.expand(vertex);
        }
        Some(bounds)
    }

    /// Validate geofence configuration.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.boundary.len() < 3 {
            errors.push("Boundary must have at least 3 vertices".to_string());
        }

        if self
            .boundary
            .iter()
            .any(|p| !p.lat.is_finite() || !p.lon.is_finite())
        {
            errors.push("Boundary vertices must be finite coordinates".to_string());
        }

        if !(-90.0..=90.0).contains(&self.center.lat) {
            errors.push(format!("Center latitude {} out of range", self.center.lat));
        }
        if !(-180.0..=180.0).contains(&self.center.lon) {
            errors.push(format!("Center longitude {} out of range", self.center.lon));
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// A geofence enriched with delivery metadata (fee, ETA, active flag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: String,
    pub name: String,
    pub geofence: Geofence,
    pub estimated_delivery_time_minutes: u32,
    pub delivery_fee: f64,
    /// Toggled independently of zone existence; inactive zones still
    /// participate in spatial queries.
    pub is_active: bool,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Request to create a new delivery zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub boundary: Vec<Point>,
    /// Explicit zone center; derived from the boundary centroid if omitted.
    pub center: Option<Point>,
    pub estimated_delivery_time_minutes: u32,
    pub delivery_fee: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Request to update an existing delivery zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateZoneRequest {
    pub name: Option<String>,
    pub boundary: Option<Vec<Point>>,
    pub center: Option<Point>,
    pub estimated_delivery_time_minutes: Option<u32>,
    pub delivery_fee: Option<f64>,
    pub is_active: Option<bool>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}
