//! Geolocation collaborator.
//!
//! Receipts are geotagged best-effort after the write commits. A missing
//! or failing source never blocks or rolls back the sale.

use async_trait::async_trait;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Source of the device's current position.
///
/// Implementations return `None` when no fix is available; the caller
/// simply skips the geotag in that case.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Option<Coordinates>;
}

/// Fixed-position source, mainly for tests and single-site deployments.
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}
