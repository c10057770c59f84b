//! Reference features and the seam that supplies them.
//!
//! DESIGN
//! ======
//! `FeatureSource` is the only async boundary of the pipeline. The Overpass
//! client implements it for production; tests drive the pipeline with mocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::geometry::{BoundingBox, LonLat};

/// Tag keys that make an element a landcover reference, in label priority order.
pub const LANDCOVER_TAG_KEYS: [&str; 3] = ["landuse", "natural", "water"];

/// Label used when none of [`LANDCOVER_TAG_KEYS`] is present.
pub const OTHER_CATEGORY: &str = "other";

/// OSM element type a feature was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Way,
    /// Flattened to one ring; holes and multiple outers are not reconstructed.
    Relation,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

/// An external tagged polygon used to compute landcover composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFeature {
    /// Source identifier, e.g. `way/123`.
    pub id: String,
    pub kind: ElementKind,
    pub category: String,
    pub ring: Vec<LonLat>,
    pub tags: BTreeMap<String, String>,
}

impl ReferenceFeature {
    /// Build a feature, deriving its category from `tags`.
    #[must_use]
    pub fn new(kind: ElementKind, osm_id: i64, ring: Vec<LonLat>, tags: BTreeMap<String, String>) -> Self {
        let category = category_for(&tags);
        Self { id: format!("{}/{osm_id}", kind.as_str()), kind, category, ring, tags }
    }
}

/// Category label by priority: `landuse`, then `natural`, then `water`, else `other`.
#[must_use]
pub fn category_for(tags: &BTreeMap<String, String>) -> String {
    LANDCOVER_TAG_KEYS
        .iter()
        .find_map(|key| tags.get(*key))
        .map_or_else(|| OTHER_CATEGORY.to_owned(), Clone::clone)
}

/// Supplies reference features intersecting a bounding box.
#[async_trait::async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetch landuse/natural/water features within `bbox`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure, non-success status, or
    /// an unparseable response.
    async fn fetch_features(&self, bbox: BoundingBox) -> Result<Vec<ReferenceFeature>, FetchError>;
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
