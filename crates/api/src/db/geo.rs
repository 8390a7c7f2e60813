//! GeoJSON + OSM query builders.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::tables::Geojson;
use super::Built;

// ── geojson documents ───────────────────────────────────────────────────────

pub fn insert_geojson(id: &str, feature_type: &str, properties: &str, geometry: &str) -> Built {
    Query::insert()
        .into_table(Geojson::Table)
        .columns([
            Geojson::Id,
            Geojson::Type,
            Geojson::Properties,
            Geojson::Geometry,
        ])
        .values_panic([
            id.into(),
            feature_type.into(),
            properties.into(),
            geometry.into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_geojson(id: &str) -> Built {
    Query::select()
        .columns([
            Geojson::Id,
            Geojson::Type,
            Geojson::Properties,
            Geojson::Geometry,
        ])
        .from(Geojson::Table)
        .and_where(Expr::col(Geojson::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn delete_geojson(id: &str) -> Built {
    Query::delete()
        .from_table(Geojson::Table)
        .and_where(Expr::col(Geojson::Id).eq(id))
        .build(SqliteQueryBuilder)
}

// ── OSM upserts ─────────────────────────────────────────────────────────────
// ON CONFLICT requires raw SQL — sea-query's ON CONFLICT support is limited.

/// UPSERT an OSM node keyed on its `osm_id`.
pub fn upsert_node(id: &str, osm_id: i64, lat: f64, lon: f64, tags: &str) -> Built {
    let sql = concat!(
        "INSERT INTO \"osm_nodes\" (\"id\", \"osm_id\", \"lat\", \"lon\", \"tags\") ",
        "VALUES (?, ?, ?, ?, ?) ",
        "ON CONFLICT (\"osm_id\") DO UPDATE SET ",
        "\"lat\" = excluded.\"lat\", ",
        "\"lon\" = excluded.\"lon\", ",
        "\"tags\" = excluded.\"tags\", ",
        "\"updated_at\" = datetime('now')",
    )
    .to_string();
    let values = sea_query::Values(vec![
        id.into(),
        osm_id.into(),
        lat.into(),
        lon.into(),
        tags.into(),
    ]);
    (sql, values)
}

/// UPSERT an OSM way keyed on its `osm_id`.
pub fn upsert_way(id: &str, osm_id: i64, tags: &str, nodes: &str, geojson: &str) -> Built {
    let sql = concat!(
        "INSERT INTO \"osm_ways\" (\"id\", \"osm_id\", \"tags\", \"nodes\", \"geojson\") ",
        "VALUES (?, ?, ?, ?, ?) ",
        "ON CONFLICT (\"osm_id\") DO UPDATE SET ",
        "\"tags\" = excluded.\"tags\", ",
        "\"nodes\" = excluded.\"nodes\", ",
        "\"geojson\" = excluded.\"geojson\", ",
        "\"updated_at\" = datetime('now')",
    )
    .to_string();
    let values = sea_query::Values(vec![
        id.into(),
        osm_id.into(),
        tags.into(),
        nodes.into(),
        geojson.into(),
    ]);
    (sql, values)
}

/// UPSERT an OSM relation keyed on its `osm_id`.
pub fn upsert_relation(id: &str, osm_id: i64, tags: &str, members: &str, geojson: &str) -> Built {
    let sql = concat!(
        "INSERT INTO \"osm_relations\" (\"id\", \"osm_id\", \"tags\", \"members\", \"geojson\") ",
        "VALUES (?, ?, ?, ?, ?) ",
        "ON CONFLICT (\"osm_id\") DO UPDATE SET ",
        "\"tags\" = excluded.\"tags\", ",
        "\"members\" = excluded.\"members\", ",
        "\"geojson\" = excluded.\"geojson\", ",
        "\"updated_at\" = datetime('now')",
    )
    .to_string();
    let values = sea_query::Values(vec![
        id.into(),
        osm_id.into(),
        tags.into(),
        members.into(),
        geojson.into(),
    ]);
    (sql, values)
}
