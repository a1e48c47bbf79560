// src/things/locator.rs
// Nearest-drain lookup by coordinate

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use super::store::ThingRepository;
use super::types::Thing;
use crate::error::{LocateError, NotFoundError};
use crate::geo::{BoundingBox, Coordinate};

pub struct Locator {
    things: Arc<dyn ThingRepository>,
    radius_meters: f64,
}

impl Locator {
    pub fn new(things: Arc<dyn ThingRepository>, radius_meters: f64) -> Self {
        Self { things, radius_meters }
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// The single closest drain within the search radius.
    pub async fn find_nearby(&self, at: Coordinate) -> Result<Thing, LocateError> {
        let mut closest = self.find_closest(at, 1).await?;
        Ok(closest.remove(0))
    }

    /// Up to `limit` drains within the radius, nearest first.
    ///
    /// Never returns an empty list: no match is a `NotFoundError` on `address`.
    pub async fn find_closest(&self, at: Coordinate, limit: usize) -> Result<Vec<Thing>, LocateError> {
        let bbox = BoundingBox::around(&at, self.radius_meters);
        let candidates = self.things.within(&bbox).await?;
        let scanned = candidates.len();

        let mut in_range: Vec<(f64, Thing)> = candidates
            .into_iter()
            .map(|t| (at.distance_to(&t.coordinate()), t))
            .filter(|(d, _)| *d <= self.radius_meters)
            .collect();

        in_range.sort_by(|(da, a), (db, b)| {
            da.partial_cmp(db).unwrap_or(Ordering::Equal).then(a.id.cmp(&b.id))
        });
        in_range.truncate(limit.max(1));

        debug!(
            "Locator at {}: {} candidates, {} within {}m",
            at,
            scanned,
            in_range.len(),
            self.radius_meters
        );

        if in_range.is_empty() {
            return Err(NotFoundError::DRAIN.into());
        }
        Ok(in_range.into_iter().map(|(_, t)| t).collect())
    }
}
