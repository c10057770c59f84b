#![allow(clippy::float_cmp)]

use super::*;

fn square() -> Vec<LonLat> {
    vec![[0.0, 0.0], [0.0, 0.001], [0.001, 0.001], [0.001, 0.0], [0.0, 0.0]]
}

// --- from_ring ---

#[test]
fn closed_ring_is_kept_as_is() {
    let geometry = Geometry::from_ring(square()).unwrap();
    assert_eq!(geometry.ring().len(), 5);
    assert!(!geometry.auto_closed());
}

#[test]
fn open_ring_is_closed_and_flagged() {
    let mut ring = square();
    ring.pop();
    let geometry = Geometry::from_ring(ring).unwrap();
    assert_eq!(geometry.ring().len(), 5);
    assert_eq!(geometry.ring().first(), geometry.ring().last());
    assert!(geometry.auto_closed());
}

#[test]
fn two_distinct_vertices_rejected() {
    let err = Geometry::from_ring(vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).unwrap_err();
    assert_eq!(err, GeometryError::TooFewVertices { distinct: 2 });
}

#[test]
fn empty_ring_rejected() {
    let err = Geometry::from_ring(Vec::new()).unwrap_err();
    assert_eq!(err, GeometryError::TooFewVertices { distinct: 0 });
}

#[test]
fn repeated_vertices_do_not_count_as_distinct() {
    let ring = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0]];
    assert!(matches!(Geometry::from_ring(ring), Err(GeometryError::TooFewVertices { distinct: 2 })));
}

#[test]
fn longitude_out_of_range_rejected() {
    let ring = vec![[0.0, 0.0], [181.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
    assert!(matches!(Geometry::from_ring(ring), Err(GeometryError::OutOfRange { index: 1, .. })));
}

#[test]
fn latitude_out_of_range_rejected() {
    let ring = vec![[0.0, 0.0], [1.0, 0.0], [0.0, -90.5], [0.0, 0.0]];
    assert!(matches!(Geometry::from_ring(ring), Err(GeometryError::OutOfRange { index: 2, .. })));
}

#[test]
fn nan_coordinate_rejected() {
    let ring = vec![[0.0, 0.0], [1.0, f64::NAN], [0.0, 1.0], [0.0, 0.0]];
    assert!(matches!(Geometry::from_ring(ring), Err(GeometryError::NonFinite { index: 1 })));
}

#[test]
fn boundary_coordinates_accepted() {
    let ring = vec![[-180.0, -90.0], [180.0, -90.0], [180.0, 90.0], [-180.0, -90.0]];
    assert!(Geometry::from_ring(ring).is_ok());
}

// --- rectangle / bbox ---

#[test]
fn rectangle_round_trips_its_bbox() {
    let bbox = BoundingBox { west: 10.0, south: 45.0, east: 10.5, north: 45.25 };
    let geometry = Geometry::rectangle(bbox).unwrap();
    assert_eq!(geometry.bounding_box(), bbox);
    assert!(!geometry.auto_closed());
}

#[test]
fn zero_width_rectangle_rejected() {
    let bbox = BoundingBox { west: 10.0, south: 45.0, east: 10.0, north: 45.0 };
    assert!(Geometry::rectangle(bbox).is_err());
}

#[test]
fn bbox_of_empty_is_none() {
    assert!(BoundingBox::of(&[]).is_none());
}

#[test]
fn overpass_filter_is_south_west_north_east() {
    let bbox = BoundingBox { west: 1.5, south: -2.0, east: 3.0, north: 4.25 };
    assert_eq!(bbox.to_overpass_filter(), "-2,1.5,4.25,3");
}

// --- GeoJSON ---

#[test]
fn geojson_feature_polygon_parsed() {
    let raw = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[0,0.001],[0.001,0.001],[0.001,0],[0,0]]]}}"#;
    let geometry = Geometry::from_geojson_str(raw).unwrap();
    assert_eq!(geometry.ring(), square().as_slice());
}

#[test]
fn geojson_bare_geometry_parsed() {
    let raw = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}"#;
    let geometry = Geometry::from_geojson_str(raw).unwrap();
    assert!(geometry.auto_closed());
    assert_eq!(geometry.ring().len(), 4);
}

#[test]
fn geojson_collection_uses_first_feature() {
    let raw = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,0]]]}},
        {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[5,5],[6,5],[6,6],[5,5]]]}}
    ]}"#;
    let geometry = Geometry::from_geojson_str(raw).unwrap();
    assert_eq!(geometry.bounding_box().east, 2.0);
}

#[test]
fn geojson_point_is_unsupported() {
    let raw = r#"{"type":"Point","coordinates":[0,0]}"#;
    let err = Geometry::from_geojson_str(raw).unwrap_err();
    assert_eq!(err, GeometryError::Unsupported("Point".into()));
}

#[test]
fn geojson_empty_collection_is_unsupported() {
    let raw = r#"{"type":"FeatureCollection","features":[]}"#;
    assert!(matches!(Geometry::from_geojson_str(raw), Err(GeometryError::Unsupported(_))));
}

#[test]
fn geojson_garbage_is_parse_error() {
    assert!(matches!(Geometry::from_geojson_str("not json"), Err(GeometryError::GeoJson(_))));
}

// --- helpers ---

#[test]
fn close_ring_leaves_closed_ring_alone() {
    let mut ring = square();
    assert!(!close_ring(&mut ring));
    assert_eq!(ring.len(), 5);
}

#[test]
fn close_ring_on_empty_is_noop() {
    let mut ring: Vec<LonLat> = Vec::new();
    assert!(!close_ring(&mut ring));
    assert!(ring.is_empty());
}

#[test]
fn polygon_view_uses_lon_as_x() {
    let polygon = Geometry::from_ring(square()).unwrap().to_polygon();
    let second = polygon.exterior().0[1];
    assert_eq!(second.x, 0.0);
    assert_eq!(second.y, 0.001);
}
