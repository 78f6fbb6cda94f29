//! Uniform grid index over geofences.
//!
//! Writes fan a geofence's id out to every grid cell its bounding box
//! touches; reads narrow to one cell (point queries) or a cell rectangle
//! (radius queries) before running exact geometry tests. The index is
//! not internally synchronized: interleaved mutation and queries on the
//! same instance must be serialized by the caller.

use crate::geo;
use crate::models::{GeoBounds, Geofence, Point};
use std::collections::{HashMap, HashSet};

/// Default cell edge in degrees, ~1.1 km of latitude at the equator.
pub const DEFAULT_CELL_SIZE_DEG: f64 = 0.01;

/// Grid cell identifier derived from floor-divided coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    pub row: i64,
    pub col: i64,
}

impl CellId {
    fn for_point(point: &Point, cell_size_deg: f64) -> Self {
        Self {
            row: (point.lat / cell_size_deg).floor() as i64,
            col: (point.lon / cell_size_deg).floor() as i64,
        }
    }
}

/// Grid-bucketed spatial index over polygonal geofences.
pub struct SpatialGridIndex {
    geofences: HashMap<String, Geofence>,
    cells: HashMap<CellId, HashSet<String>>,
    cell_size_deg: f64,
}

impl Default for SpatialGridIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialGridIndex {
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE_DEG)
    }

    /// Build an index with a custom cell size in degrees. Non-finite or
    /// non-positive sizes fall back to the default rather than panic.
    pub fn with_cell_size(cell_size_deg: f64) -> Self {
        let cell_size_deg = if cell_size_deg.is_finite() && cell_size_deg > 0.0 {
            cell_size_deg
        } else {
            DEFAULT_CELL_SIZE_DEG
        };
        Self {
            geofences: HashMap::new(),
            cells: HashMap::new(),
            cell_size_deg,
        }
    }

    pub fn cell_size_deg(&self) -> f64 {
        self.cell_size_deg
    }

    /// Insert a geofence, fanning its id out to every cell its bounding
    /// box touches (inclusive range, so boundary-straddling points are
    /// never missed). Re-adding an existing id overwrites it.
    pub fn add_geofence(&mut self, geofence: Geofence) {
        if self.geofences.contains_key(&geofence.id) {
            self.remove_geofence(&geofence.id);
        }

        // A zone with no boundary still occupies its center's cell so
        // removal bookkeeping stays uniform.
        let bounds = geofence
            .bounding_box()
            .unwrap_or_else(|| GeoBounds::from_point(&geofence.center));

        let min = CellId::for_point(&Point::new(bounds.min_lat, bounds.min_lon), self.cell_size_deg);
        let max = CellId::for_point(&Point::new(bounds.max_lat, bounds.max_lon), self.cell_size_deg);

        for row in min.row..=max.row {
            for col in min.col..=max.col {
                self.cells
                    .entry(CellId { row, col })
                    .or_default()
                    .insert(geofence.id.clone());
            }
        }

        self.geofences.insert(geofence.id.clone(), geofence);
    }

    /// Remove a geofence by id. Returns false for an unknown id.
    ///
    /// Two-pass full scan: strip the id from every cell, then drop cells
    /// left empty. Linear in the cell count, which is acceptable at the
    /// intended index size.
    pub fn remove_geofence(&mut self, id: &str) -> bool {
        if self.geofences.remove(id).is_none() {
            return false;
        }

        for members in self.cells.values_mut() {
            members.remove(id);
        }
        self.cells.retain(|_, members| !members.is_empty());

        true
    }

    /// All geofences whose polygon contains `point`.
    ///
    /// Looks up the single cell the point falls in; every geofence whose
    /// box touches that cell is already a member, so an exact ray-cast
    /// over the cell's candidates is sufficient.
    pub fn find_geofences_containing_point(&self, point: &Point) -> Vec<Geofence> {
        let cell = CellId::for_point(point, self.cell_size_deg);
        let Some(candidates) = self.cells.get(&cell) else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter_map(|id| self.geofences.get(id))
            .filter(|g| g.contains(point))
            .cloned()
            .collect()
    }

    /// All geofences whose *center* lies within `radius_m` of `center`.
    ///
    /// The bounding box narrows candidates; the accept test is the
    /// haversine distance to each geofence's center, not its boundary. A
    /// large zone whose edge crosses the radius but whose center does not
    /// is excluded by design.
    pub fn find_geofences_within_radius(&self, center: &Point, radius_m: f64) -> Vec<Geofence> {
        let bounds = geo::bounding_box(center, radius_m);
        let min = CellId::for_point(&Point::new(bounds.min_lat, bounds.min_lon), self.cell_size_deg);
        let max = CellId::for_point(&Point::new(bounds.max_lat, bounds.max_lon), self.cell_size_deg);

        let mut candidates: HashSet<&String> = HashSet::new();
        for row in min.row..=max.row {
            for col in min.col..=max.col {
                if let Some(members) = self.cells.get(&CellId { row, col }) {
                    candidates.extend(members);
                }
            }
        }

        candidates
            .into_iter()
            .filter_map(|id| self.geofences.get(id))
            .filter(|g| geo::haversine_distance(center, &g.center) <= radius_m)
            .cloned()
            .collect()
    }

    pub fn get_geofence(&self, id: &str) -> Option<&Geofence> {
        self.geofences.get(id)
    }

    pub fn get_all_geofences(&self) -> Vec<Geofence> {
        self.geofences.values().cloned().collect()
    }

    pub fn geofence_count(&self) -> usize {
        self.geofences.len()
    }

    #[cfg(test)]
    fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
