//! Minimal GeoJSON shapes and OSM-derived geometry helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// GeoJSON geometry. Coordinates are kept as raw JSON — the app stores
/// and forwards them, it never walks individual rings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Value,
}

/// GeoJSON feature as stored in the `geojson` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    #[serde(default)]
    pub properties: Value,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Value) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            properties,
            geometry,
        }
    }
}

/// GeoJSON feature collection returned by geo endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Build a point feature from an OSM node.
pub fn node_feature(lat: f64, lon: f64, tags: Value) -> Feature {
    Feature::new(
        Geometry {
            geometry_type: "Point".to_string(),
            coordinates: serde_json::json!([lon, lat]),
        },
        tags,
    )
}

/// Axis-aligned bounding box around a center point, `radius_m` meters on
/// each side. Used to scope Overpass queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Meters per degree of latitude.
const METERS_PER_DEG_LAT: f64 = 111_320.0;

pub fn bounding_box(center: GeoPoint, radius_m: f64) -> BoundingBox {
    let dlat = radius_m / METERS_PER_DEG_LAT;
    // Longitude degrees shrink with latitude.
    let dlon = radius_m / (METERS_PER_DEG_LAT * center.lat.to_radians().cos().max(1e-6));
    BoundingBox {
        south: center.lat - dlat,
        west: center.lon - dlon,
        north: center.lat + dlat,
        east: center.lon + dlon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_is_centered() {
        let center = GeoPoint { lat: 47.6, lon: -122.3 };
        let bbox = bounding_box(center, 1000.0);
        assert!(((bbox.north + bbox.south) / 2.0 - center.lat).abs() < 1e-9);
        assert!(((bbox.east + bbox.west) / 2.0 - center.lon).abs() < 1e-9);
        assert!(bbox.north > bbox.south);
        assert!(bbox.east > bbox.west);
    }

    #[test]
    fn longitude_span_widens_toward_the_poles() {
        let equator = bounding_box(GeoPoint { lat: 0.0, lon: 0.0 }, 1000.0);
        let north = bounding_box(GeoPoint { lat: 60.0, lon: 0.0 }, 1000.0);
        assert!((north.east - north.west) > (equator.east - equator.west));
    }

    #[test]
    fn node_feature_orders_coordinates_lon_lat() {
        let f = node_feature(47.6, -122.3, serde_json::json!({"natural": "peak"}));
        assert_eq!(f.geometry.geometry_type, "Point");
        assert_eq!(f.geometry.coordinates, serde_json::json!([-122.3, 47.6]));
    }

    #[test]
    fn feature_collection_round_trips_through_json() {
        let fc = FeatureCollection::new(vec![node_feature(1.0, 2.0, Value::Null)]);
        let text = serde_json::to_string(&fc).unwrap();
        assert!(text.contains("\"FeatureCollection\""));
        let back: FeatureCollection = serde_json::from_str(&text).unwrap();
        assert_eq!(back.features.len(), 1);
    }
}
