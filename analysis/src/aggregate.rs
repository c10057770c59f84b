//! Intersection aggregation: landcover breakdown of a selection.
//!
//! DESIGN
//! ======
//! Each reference feature is intersected with the selection independently.
//! A feature that cannot be intersected is logged and skipped; the rest of
//! the breakdown still ships with `features_skipped` telling the display it
//! is incomplete.
//!
//! TRADE-OFFS
//! ==========
//! Areas accumulate per feature, so overlapping reference features (a lake
//! inside a park) are counted twice. The category sum can then exceed the
//! selection area; percentages are reported as-is rather than normalized.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use geo::{BooleanOps, BoundingRect, ChamberlainDuquetteArea, Intersects, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::IntersectionError;
use crate::features::ReferenceFeature;
use crate::geometry::{Geometry, distinct_vertices, ring_to_polygon};
use crate::metrics::{SelectionMetrics, round_to_hundredths};

/// Category labels merged into the water subtotal.
pub const WATER_CATEGORIES: [&str; 3] = ["water", "river", "lake"];

// =============================================================================
// BREAKDOWN
// =============================================================================

/// Per-category intersection areas plus selection totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Category label → accumulated intersection area in m².
    pub categories: BTreeMap<String, f64>,
    pub total_intersection_m2: f64,
    /// Sum of the [`WATER_CATEGORIES`] entries.
    pub water_m2: f64,
    pub selection_area_m2: f64,
    pub selection_perimeter_m: f64,
    pub features_considered: usize,
    pub features_skipped: usize,
}

/// One display row: category, area, and share of the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub area_m2: f64,
    /// Percent of selection area, 2 decimal places.
    pub percentage: f64,
}

impl Breakdown {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// `area_m2` as a percent of the selection area, rounded to 2 decimals.
    /// Zero for a zero-area selection.
    #[must_use]
    pub fn percentage_of(&self, area_m2: f64) -> f64 {
        if self.selection_area_m2 <= 0.0 {
            return 0.0;
        }
        round_to_hundredths(area_m2 / self.selection_area_m2 * 100.0)
    }

    #[must_use]
    pub fn water_percentage(&self) -> f64 {
        self.percentage_of(self.water_m2)
    }

    /// Summed area of the given categories.
    #[must_use]
    pub fn area_of(&self, categories: &[&str]) -> f64 {
        categories
            .iter()
            .filter_map(|c| self.categories.get(*c))
            .sum()
    }

    /// Display rows, largest area first (ties broken by label).
    #[must_use]
    pub fn shares(&self) -> Vec<CategoryShare> {
        let mut shares: Vec<CategoryShare> = self
            .categories
            .iter()
            .map(|(category, &area_m2)| CategoryShare {
                category: category.clone(),
                area_m2,
                percentage: self.percentage_of(area_m2),
            })
            .collect();
        shares.sort_by(|a, b| b.area_m2.total_cmp(&a.area_m2).then_with(|| a.category.cmp(&b.category)));
        shares
    }
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Intersect every feature with `selection` and accumulate areas by category.
#[must_use]
pub fn aggregate(selection: &Geometry, metrics: &SelectionMetrics, features: &[ReferenceFeature]) -> Breakdown {
    let selection_polygon = selection.to_polygon();
    let mut categories: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = 0_usize;

    for feature in features {
        match intersection_area(&selection_polygon, feature) {
            Ok(area) if area > 0.0 => {
                *categories.entry(feature.category.clone()).or_insert(0.0) += area;
            }
            Ok(_) => {}
            Err(e) => {
                skipped += 1;
                tracing::warn!(error = %e, feature = %feature.id, "intersection skipped");
            }
        }
    }

    let total_intersection_m2: f64 = categories.values().sum();
    let water_m2: f64 = WATER_CATEGORIES
        .iter()
        .filter_map(|c| categories.get(*c))
        .sum();

    tracing::debug!(
        categories = categories.len(),
        considered = features.len(),
        skipped,
        total_intersection_m2,
        "landcover aggregated"
    );

    Breakdown {
        categories,
        total_intersection_m2,
        water_m2,
        selection_area_m2: metrics.area_m2,
        selection_perimeter_m: metrics.perimeter_m,
        features_considered: features.len(),
        features_skipped: skipped,
    }
}

/// Area in m² of `selection ∩ feature`.
pub(crate) fn intersection_area(selection: &Polygon<f64>, feature: &ReferenceFeature) -> Result<f64, IntersectionError> {
    validate_ring(feature)?;
    let polygon = ring_to_polygon(&feature.ring);

    let (Some(selection_bounds), Some(feature_bounds)) = (selection.bounding_rect(), polygon.bounding_rect()) else {
        return Ok(0.0);
    };
    if !selection_bounds.intersects(&feature_bounds) {
        return Ok(0.0);
    }

    // The sweep-line boolean ops can panic on pathological rings.
    let clipped = catch_unwind(AssertUnwindSafe(|| selection.intersection(&polygon)))
        .map_err(|_| IntersectionError::BooleanOp { id: feature.id.clone() })?;
    Ok(clipped.chamberlain_duquette_unsigned_area())
}

fn validate_ring(feature: &ReferenceFeature) -> Result<(), IntersectionError> {
    let malformed = |reason: &str| IntersectionError::Malformed { id: feature.id.clone(), reason: reason.to_owned() };

    if feature
        .ring
        .iter()
        .any(|[lon, lat]| !lon.is_finite() || !lat.is_finite())
    {
        return Err(malformed("non-finite coordinate"));
    }
    if feature.ring.len() < 4 || distinct_vertices(&feature.ring) < 3 {
        return Err(malformed("fewer than 3 distinct vertices"));
    }
    if feature.ring.first() != feature.ring.last() {
        return Err(malformed("ring not closed"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
