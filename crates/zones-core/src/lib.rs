pub mod error;
pub mod geo;
pub mod grid;
pub mod models;
pub mod pricing;
pub mod zones;

pub use error::ZoneError;
pub use geo::{bounding_box, haversine_distance, point_in_polygon};
pub use grid::{CellId, SpatialGridIndex, DEFAULT_CELL_SIZE_DEG};
pub use models::{
    CreateZoneRequest, DeliveryZone, GeoBounds, Geofence, Point, UpdateZoneRequest,
};
pub use pricing::PricingRules;
pub use zones::ZoneCatalog;
