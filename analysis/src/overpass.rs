//! Overpass API client: the production [`FeatureSource`].
//!
//! Thin HTTP wrapper around the Overpass interpreter endpoint. Query building
//! and response parsing are pure functions for testability.
//!
//! FIDELITY
//! ========
//! Relations are flattened: their coordinates (top-level `geometry`, or the
//! concatenated member geometries) become one ring. Multipolygons with holes
//! or several outer rings are therefore approximated, not reconstructed.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::OverpassConfig;
use crate::error::FetchError;
use crate::features::{ElementKind, FeatureSource, LANDCOVER_TAG_KEYS, ReferenceFeature};
use crate::geometry::{BoundingBox, LonLat, close_ring};

const ELEMENT_TYPES: [&str; 2] = ["way", "relation"];

/// Remark prefix Overpass uses when a query was aborted but still answered 200.
const RUNTIME_ERROR_REMARK: &str = "runtime error";

// =============================================================================
// CLIENT
// =============================================================================

pub struct OverpassClient {
    http: reqwest::Client,
    url: String,
    query_timeout_secs: u64,
}

impl OverpassClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &OverpassConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| FetchError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: config.url.clone(), query_timeout_secs: config.timeouts.query_secs })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl FeatureSource for OverpassClient {
    async fn fetch_features(&self, bbox: BoundingBox) -> Result<Vec<ReferenceFeature>, FetchError> {
        let query = build_query(bbox, self.query_timeout_secs);
        tracing::debug!(url = %self.url, bbox = %bbox.to_overpass_filter(), "querying overpass");

        let response = self
            .http
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body: text });
        }

        let features = parse_response(&text)?;
        tracing::info!(count = features.len(), "reference features fetched");
        Ok(features)
    }
}

// =============================================================================
// QUERY
// =============================================================================

/// Overpass QL selecting ways and relations tagged with any landcover key
/// inside `bbox`, returned with inline geometry.
#[must_use]
pub fn build_query(bbox: BoundingBox, timeout_secs: u64) -> String {
    let filter = bbox.to_overpass_filter();
    let mut query = format!("[out:json][timeout:{timeout_secs}];\n(\n");
    for element in ELEMENT_TYPES {
        for key in LANDCOVER_TAG_KEYS {
            query.push_str(&format!("  {element}[\"{key}\"]({filter});\n"));
        }
    }
    query.push_str(");\nout geom;");
    query
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Deserialize)]
struct Element {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct Member {
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
}

#[derive(Deserialize, Clone, Copy)]
struct LatLon {
    lat: f64,
    lon: f64,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<Vec<ReferenceFeature>, FetchError> {
    let response: OverpassResponse = serde_json::from_str(json).map_err(|e| FetchError::Parse(e.to_string()))?;

    if let Some(remark) = &response.remark {
        if remark.trim_start().starts_with(RUNTIME_ERROR_REMARK) {
            tracing::warn!(%remark, elements = response.elements.len(), "overpass query aborted on the server");
            return Err(FetchError::Remark(remark.clone()));
        }
        tracing::warn!(%remark, "overpass returned a remark; results may be partial");
    }

    let mut features = Vec::with_capacity(response.elements.len());
    for element in response.elements {
        let kind = match element.element_type.as_str() {
            "way" => ElementKind::Way,
            "relation" => ElementKind::Relation,
            other => {
                tracing::debug!(element_type = other, id = element.id, "ignoring non-area element");
                continue;
            }
        };

        let mut ring = element_ring(&element, kind);
        if ring.is_empty() {
            tracing::debug!(id = element.id, "element has no geometry; skipped");
            continue;
        }
        if close_ring(&mut ring) {
            tracing::debug!(id = element.id, kind = kind.as_str(), "open reference ring closed by repeating first vertex");
        }

        features.push(ReferenceFeature::new(kind, element.id, ring, element.tags));
    }
    Ok(features)
}

fn element_ring(element: &Element, kind: ElementKind) -> Vec<LonLat> {
    if !element.geometry.is_empty() || kind == ElementKind::Way {
        return to_lon_lat(&element.geometry);
    }

    let flattened: Vec<Option<LatLon>> = element
        .members
        .iter()
        .flat_map(|member| member.geometry.iter().copied())
        .collect();
    if !flattened.is_empty() {
        tracing::debug!(
            id = element.id,
            members = element.members.len(),
            "relation flattened to a single ring"
        );
    }
    to_lon_lat(&flattened)
}

fn to_lon_lat(points: &[Option<LatLon>]) -> Vec<LonLat> {
    points.iter().flatten().map(|p| [p.lon, p.lat]).collect()
}

#[cfg(test)]
#[path = "overpass_test.rs"]
mod tests;
