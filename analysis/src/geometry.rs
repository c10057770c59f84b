//! Selection geometry: closed lon/lat rings and their bounding boxes.
//!
//! DESIGN
//! ======
//! A `Geometry` can only be built through validating constructors, so any
//! value in hand is a closed ring with at least three distinct, in-range
//! vertices. Open rings are closed by repeating the first vertex; that
//! leniency is recorded on the value (`auto_closed`) and logged, never silent.

use geo::{Coord, LineString, Polygon};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A `[longitude, latitude]` pair in degrees.
pub type LonLat = [f64; 2];

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// Axis-aligned lon/lat bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Bounds of a non-empty vertex list; `None` when empty.
    #[must_use]
    pub fn of(vertices: &[LonLat]) -> Option<Self> {
        let [first_lon, first_lat] = *vertices.first()?;
        let init = Self { west: first_lon, south: first_lat, east: first_lon, north: first_lat };
        Some(vertices.iter().fold(init, |bbox, &[lon, lat]| Self {
            west: bbox.west.min(lon),
            south: bbox.south.min(lat),
            east: bbox.east.max(lon),
            north: bbox.north.max(lat),
        }))
    }

    /// Overpass bbox filter order: `south,west,north,east`.
    #[must_use]
    pub fn to_overpass_filter(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// A validated, closed polygon ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    ring: Vec<LonLat>,
    auto_closed: bool,
}

impl Geometry {
    /// Validate and close a vertex ring.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when a coordinate is non-finite or out of
    /// range, or when fewer than three distinct vertices remain.
    pub fn from_ring(mut vertices: Vec<LonLat>) -> Result<Self, GeometryError> {
        for (index, &[lon, lat]) in vertices.iter().enumerate() {
            if !lon.is_finite() || !lat.is_finite() {
                return Err(GeometryError::NonFinite { index });
            }
            if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
                return Err(GeometryError::OutOfRange { index, lon, lat });
            }
        }

        let distinct = distinct_vertices(&vertices);
        if distinct < 3 {
            return Err(GeometryError::TooFewVertices { distinct });
        }

        let auto_closed = close_ring(&mut vertices);
        if auto_closed {
            tracing::warn!(vertices = vertices.len(), "selection ring was open; closed by repeating first vertex");
        }

        Ok(Self { ring: vertices, auto_closed })
    }

    /// Rectangle selection spanning `bbox`, wound counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for out-of-range or zero-extent boxes.
    pub fn rectangle(bbox: BoundingBox) -> Result<Self, GeometryError> {
        Self::from_ring(vec![
            [bbox.west, bbox.south],
            [bbox.east, bbox.south],
            [bbox.east, bbox.north],
            [bbox.west, bbox.north],
            [bbox.west, bbox.south],
        ])
    }

    /// Parse a GeoJSON document holding a polygon selection.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::GeoJson`] for malformed JSON and
    /// [`GeometryError::Unsupported`] for non-polygon content.
    pub fn from_geojson_str(raw: &str) -> Result<Self, GeometryError> {
        let geojson = raw
            .parse::<GeoJson>()
            .map_err(|e| GeometryError::GeoJson(e.to_string()))?;
        Self::from_geojson(&geojson)
    }

    /// Extract the selection from a GeoJSON geometry, feature, or the first
    /// feature of a collection (what map draw layers export).
    ///
    /// # Errors
    ///
    /// Same as [`Geometry::from_ring`], plus [`GeometryError::Unsupported`]
    /// for anything other than a polygon.
    pub fn from_geojson(geojson: &GeoJson) -> Result<Self, GeometryError> {
        match geojson {
            GeoJson::Geometry(geometry) => Self::from_geojson_value(&geometry.value),
            GeoJson::Feature(feature) => match &feature.geometry {
                Some(geometry) => Self::from_geojson_value(&geometry.value),
                None => Err(GeometryError::Unsupported("feature without geometry".into())),
            },
            GeoJson::FeatureCollection(collection) => {
                let Some(feature) = collection.features.first() else {
                    return Err(GeometryError::Unsupported("empty feature collection".into()));
                };
                if collection.features.len() > 1 {
                    tracing::warn!(
                        features = collection.features.len(),
                        "feature collection holds several shapes; analyzing the first"
                    );
                }
                match &feature.geometry {
                    Some(geometry) => Self::from_geojson_value(&geometry.value),
                    None => Err(GeometryError::Unsupported("feature without geometry".into())),
                }
            }
        }
    }

    fn from_geojson_value(value: &geojson::Value) -> Result<Self, GeometryError> {
        let geojson::Value::Polygon(rings) = value else {
            return Err(GeometryError::Unsupported(geojson_kind(value).into()));
        };
        let Some(outer) = rings.first() else {
            return Err(GeometryError::Unsupported("polygon without rings".into()));
        };
        if rings.len() > 1 {
            tracing::warn!(holes = rings.len() - 1, "selection holes ignored; analyzing outer ring");
        }

        let vertices = outer
            .iter()
            .enumerate()
            .map(|(index, position)| match position.as_slice() {
                [lon, lat, ..] => Ok([*lon, *lat]),
                _ => Err(GeometryError::GeoJson(format!("position {index} has fewer than two values"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_ring(vertices)
    }

    /// Closed ring, first vertex repeated at the end.
    #[must_use]
    pub fn ring(&self) -> &[LonLat] {
        &self.ring
    }

    /// `true` when the input ring was open and had to be closed.
    #[must_use]
    pub fn auto_closed(&self) -> bool {
        self.auto_closed
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        // Validation guarantees a non-empty ring.
        BoundingBox::of(&self.ring).unwrap_or(BoundingBox { west: 0.0, south: 0.0, east: 0.0, north: 0.0 })
    }

    /// `geo` polygon view (x = longitude, y = latitude).
    #[must_use]
    pub fn to_polygon(&self) -> Polygon<f64> {
        ring_to_polygon(&self.ring)
    }
}

// =============================================================================
// RING HELPERS
// =============================================================================

/// Close `ring` by appending its first vertex. Returns `true` if it was open.
pub(crate) fn close_ring(ring: &mut Vec<LonLat>) -> bool {
    match (ring.first().copied(), ring.last().copied()) {
        (Some(first), Some(last)) if first != last => {
            ring.push(first);
            true
        }
        _ => false,
    }
}

/// Number of distinct vertices, compared exactly.
pub(crate) fn distinct_vertices(ring: &[LonLat]) -> usize {
    let mut seen: Vec<LonLat> = Vec::with_capacity(ring.len());
    for vertex in ring {
        if !seen.contains(vertex) {
            seen.push(*vertex);
        }
    }
    seen.len()
}

pub(crate) fn ring_to_polygon(ring: &[LonLat]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
    Polygon::new(LineString::from(coords), vec![])
}

fn geojson_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;
