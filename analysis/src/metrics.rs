//! Selection metrics: area and perimeter on the sphere.
//!
//! Area uses the Chamberlain–Duquette spherical polygon formula on a sphere
//! of radius 6 378 137 m; perimeter sums haversine distances on a sphere of
//! mean radius 6 371 008.8 m. Both match the formulas the dashboard's map
//! layer uses, so numbers shown next to a drawn shape agree with ours.

use geo::{ChamberlainDuquetteArea, HaversineLength};
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Geometry, distinct_vertices};

const SQUARE_METERS_PER_KM2: f64 = 1_000_000.0;

/// Area, perimeter, and extent of one selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionMetrics {
    pub area_m2: f64,
    pub perimeter_m: f64,
    /// Distinct vertices in the ring (closing vertex not counted twice).
    pub vertex_count: usize,
    pub bbox: BoundingBox,
}

impl SelectionMetrics {
    /// Area in km², rounded to 2 decimal places.
    #[must_use]
    pub fn area_km2(&self) -> f64 {
        round_to_hundredths(self.area_m2 / SQUARE_METERS_PER_KM2)
    }

    /// Area rounded to whole square metres.
    #[must_use]
    pub fn area_m2_rounded(&self) -> f64 {
        self.area_m2.round()
    }

    /// Perimeter rounded to whole metres.
    #[must_use]
    pub fn perimeter_m_rounded(&self) -> f64 {
        self.perimeter_m.round()
    }
}

/// Compute metrics for a validated selection. Pure and deterministic.
#[must_use]
pub fn compute_metrics(geometry: &Geometry) -> SelectionMetrics {
    let polygon = geometry.to_polygon();
    SelectionMetrics {
        area_m2: polygon.chamberlain_duquette_unsigned_area(),
        perimeter_m: polygon.exterior().haversine_length(),
        vertex_count: distinct_vertices(geometry.ring()),
        bbox: geometry.bounding_box(),
    }
}

/// Round to 2 decimal places for display.
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
