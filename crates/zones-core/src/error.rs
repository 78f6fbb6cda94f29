//! Error types for the delivery-zone engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZoneError {
    /// A zone request failed geofence validation. Carries every problem
    /// found so callers can report them all at once.
    #[error("invalid zone: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
