//! Fee and ETA rules for distance-based estimation.

use serde::{Deserialize, Serialize};

/// Configuration for delivery pricing and time estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRules {
    /// Flat fee applied to every delivery
    pub base_fee: f64,
    /// Additional fee per kilometer of courier travel
    pub fee_per_km: f64,
    /// Floor applied after the distance component
    pub minimum_fee: f64,
    /// Fixed preparation/pickup time in minutes
    pub base_minutes: u32,
    /// Assumed courier travel speed
    pub courier_speed_kmh: f64,
    /// Cap on the quoted ETA in minutes
    pub max_minutes: u32,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            base_fee: 2.99,
            fee_per_km: 1.25,
            minimum_fee: 2.99,
            base_minutes: 10,
            courier_speed_kmh: 25.0,
            max_minutes: 120,
        }
    }
}

impl PricingRules {
    /// Delivery fee for a courier trip of `distance_m` meters.
    /// Deterministic and non-decreasing in distance.
    pub fn delivery_fee(&self, distance_m: f64) -> f64 {
        let distance_km = distance_m.max(0.0) / 1000.0;
        (self.base_fee + distance_km * self.fee_per_km).max(self.minimum_fee)
    }

    /// Estimated delivery time in minutes for a trip of `distance_m`
    /// meters. Deterministic and non-decreasing in distance.
    pub fn delivery_minutes(&self, distance_m: f64) -> u32 {
        let distance_km = distance_m.max(0.0) / 1000.0;
        let speed = self.courier_speed_kmh.max(1.0);
        let travel_minutes = (distance_km / speed * 60.0).ceil() as u32;
        (self.base_minutes + travel_minutes).min(self.max_minutes)
    }
}
