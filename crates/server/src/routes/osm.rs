use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use trailpack_core::geo::{bounding_box, BoundingBox, Feature, FeatureCollection, GeoPoint, Geometry, node_feature};

use trailpack_api::{db as dbq, service, OsmQueryRequest};

use crate::error::ApiErr;
use crate::routes::trips::load_feature;
use crate::storage::{sq_execute, Db};
use crate::AppConfig;

// ---------------------------------------------------------------------------
// Overpass response handling (pure)
// ---------------------------------------------------------------------------

pub(crate) struct OsmNode {
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: serde_json::Value,
}

pub(crate) struct OsmWay {
    pub osm_id: i64,
    pub tags: serde_json::Value,
    pub node_refs: Vec<i64>,
    /// (lat, lon) pairs from `out geom`.
    pub geometry: Vec<(f64, f64)>,
}

/// Overpass QL for outdoor features inside a bounding box: named
/// natural/tourism nodes, drinking water, and hikeable ways.
pub(crate) fn overpass_query(bbox: &BoundingBox) -> String {
    let b = format!("{},{},{},{}", bbox.south, bbox.west, bbox.north, bbox.east);
    format!(
        "[out:json][timeout:25];\
         (node[\"natural\"]({b});\
          node[\"tourism\"]({b});\
          node[\"amenity\"=\"drinking_water\"]({b});\
          way[\"highway\"~\"path|footway|track\"]({b});\
         );out geom;"
    )
}

/// Pull nodes and ways out of an Overpass JSON payload. Elements missing
/// required fields are skipped.
pub(crate) fn parse_overpass(body: &serde_json::Value) -> (Vec<OsmNode>, Vec<OsmWay>) {
    let mut nodes = Vec::new();
    let mut ways = Vec::new();

    let Some(elements) = body["elements"].as_array() else {
        return (nodes, ways);
    };

    for element in elements {
        let Some(osm_id) = element["id"].as_i64() else {
            continue;
        };
        let tags = element
            .get("tags")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        match element["type"].as_str() {
            Some("node") => {
                let (Some(lat), Some(lon)) = (element["lat"].as_f64(), element["lon"].as_f64())
                else {
                    continue;
                };
                nodes.push(OsmNode {
                    osm_id,
                    lat,
                    lon,
                    tags,
                });
            }
            Some("way") => {
                let node_refs = element["nodes"]
                    .as_array()
                    .map(|ns| ns.iter().filter_map(|n| n.as_i64()).collect())
                    .unwrap_or_default();
                let geometry = element["geometry"]
                    .as_array()
                    .map(|points| {
                        points
                            .iter()
                            .filter_map(|p| Some((p["lat"].as_f64()?, p["lon"].as_f64()?)))
                            .collect()
                    })
                    .unwrap_or_default();
                ways.push(OsmWay {
                    osm_id,
                    tags,
                    node_refs,
                    geometry,
                });
            }
            _ => {}
        }
    }

    (nodes, ways)
}

/// LineString feature for a way with resolved geometry.
pub(crate) fn way_feature(way: &OsmWay) -> Feature {
    let coordinates: Vec<_> = way
        .geometry
        .iter()
        .map(|(lat, lon)| serde_json::json!([lon, lat]))
        .collect();
    Feature::new(
        Geometry {
            geometry_type: "LineString".to_string(),
            coordinates: serde_json::Value::Array(coordinates),
        },
        way.tags.clone(),
    )
}

// ---------------------------------------------------------------------------
// POST /api/osm/query
// ---------------------------------------------------------------------------

/// POST /api/osm/query — fetch outdoor features around a point from the
/// configured Overpass mirror, persist them, and return GeoJSON.
pub async fn query(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<OsmQueryRequest>,
) -> Result<Json<FeatureCollection>, ApiErr> {
    if !req.lat.is_finite() || !(-90.0..=90.0).contains(&req.lat) {
        return Err(ApiErr::bad_request("latitude out of range"));
    }
    if !req.lon.is_finite() || !(-180.0..=180.0).contains(&req.lon) {
        return Err(ApiErr::bad_request("longitude out of range"));
    }

    let radius = service::clamp_radius(req.radius);
    let bbox = bounding_box(
        GeoPoint {
            lat: req.lat,
            lon: req.lon,
        },
        radius,
    );
    let query = overpass_query(&bbox);

    let client = reqwest::Client::new();
    let body: serde_json::Value = client
        .post(&config.overpass_url)
        .form(&[("data", query.as_str())])
        .send()
        .await
        .map_err(|e| {
            tracing::error!("overpass request failed: {e}");
            ApiErr::internal("geo lookup failed")
        })?
        .json()
        .await
        .map_err(|e| {
            tracing::error!("overpass response parse failed: {e}");
            ApiErr::internal("geo lookup failed")
        })?;

    let (nodes, ways) = parse_overpass(&body);
    tracing::debug!(
        "overpass returned {} nodes, {} ways",
        nodes.len(),
        ways.len()
    );

    let conn = db.conn();
    let mut features = Vec::with_capacity(nodes.len() + ways.len());

    for node in &nodes {
        sq_execute(
            &conn,
            dbq::geo::upsert_node(
                &Uuid::new_v4().to_string(),
                node.osm_id,
                node.lat,
                node.lon,
                &node.tags.to_string(),
            ),
        )
        .map_err(ApiErr::from_db("osm node upsert"))?;
        features.push(node_feature(node.lat, node.lon, node.tags.clone()));
    }

    for way in &ways {
        let feature = way_feature(way);
        let nodes_json = serde_json::to_string(&way.node_refs)
            .map_err(ApiErr::from_db("encode way nodes"))?;
        let feature_json =
            serde_json::to_string(&feature).map_err(ApiErr::from_db("encode way feature"))?;
        sq_execute(
            &conn,
            dbq::geo::upsert_way(
                &Uuid::new_v4().to_string(),
                way.osm_id,
                &way.tags.to_string(),
                &nodes_json,
                &feature_json,
            ),
        )
        .map_err(ApiErr::from_db("osm way upsert"))?;
        features.push(feature);
    }

    Ok(Json(FeatureCollection::new(features)))
}

// ---------------------------------------------------------------------------
// GET /api/geo/:id
// ---------------------------------------------------------------------------

/// GET /api/geo/:id — a stored GeoJSON document.
pub async fn get_geo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Feature>, ApiErr> {
    let conn = db.conn();
    let feature = load_feature(&conn, &id)?.ok_or_else(|| ApiErr::not_found("geometry not found"))?;
    Ok(Json(feature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;
    use trailpack_core::geo::bounding_box;

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "elements": [
                {
                    "type": "node",
                    "id": 101,
                    "lat": 47.61,
                    "lon": -122.31,
                    "tags": {"natural": "peak", "name": "Lookout"}
                },
                {
                    "type": "node",
                    "id": 102,
                    "lat": 47.62,
                    "lon": -122.32
                },
                {
                    "type": "way",
                    "id": 201,
                    "nodes": [101, 102],
                    "tags": {"highway": "path"},
                    "geometry": [
                        {"lat": 47.61, "lon": -122.31},
                        {"lat": 47.62, "lon": -122.32}
                    ]
                },
                {
                    "type": "node",
                    "id": 999
                }
            ]
        })
    }

    #[test]
    fn parse_collects_nodes_and_ways_and_skips_malformed() {
        let (nodes, ways) = parse_overpass(&sample_body());
        assert_eq!(nodes.len(), 2);
        assert_eq!(ways.len(), 1);
        assert_eq!(nodes[0].osm_id, 101);
        assert_eq!(ways[0].node_refs, vec![101, 102]);
        assert_eq!(ways[0].geometry.len(), 2);
    }

    #[test]
    fn way_features_are_linestrings_in_lon_lat_order() {
        let (_, ways) = parse_overpass(&sample_body());
        let feature = way_feature(&ways[0]);
        assert_eq!(feature.geometry.geometry_type, "LineString");
        assert_eq!(
            feature.geometry.coordinates[0],
            serde_json::json!([-122.31, 47.61])
        );
    }

    #[test]
    fn query_embeds_the_bounding_box() {
        let bbox = bounding_box(GeoPoint { lat: 47.6, lon: -122.3 }, 1000.0);
        let q = overpass_query(&bbox);
        assert!(q.starts_with("[out:json]"));
        assert!(q.contains("drinking_water"));
        assert!(q.contains(&format!("{}", bbox.south)));
        assert!(q.ends_with("out geom;"));
    }

    #[test]
    fn upserts_are_keyed_on_osm_id() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        let (nodes, _) = parse_overpass(&sample_body());
        for (i, node) in nodes.iter().enumerate() {
            sq_execute(
                &conn,
                dbq::geo::upsert_node(
                    &format!("row-{i}"),
                    node.osm_id,
                    node.lat,
                    node.lon,
                    "{}",
                ),
            )
            .unwrap();
        }
        // Same osm_id again with fresh coordinates updates in place.
        sq_execute(&conn, dbq::geo::upsert_node("row-2", 101, 48.0, -122.0, "{}")).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM osm_nodes", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
        let lat: f64 = conn
            .query_row("SELECT lat FROM osm_nodes WHERE osm_id = 101", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(lat, 48.0);
    }
}
