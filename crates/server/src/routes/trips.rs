use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use trailpack_core::geo::Feature;

use trailpack_api::{
    db as dbq, service, CreateTripRequest, MsgResponse, TripDetailResponse, TripListResponse,
    TripSummary, UpdateTripRequest,
};

use crate::error::ApiErr;
use crate::routes::auth::{AuthUser, MaybeUser};
use crate::storage::{sq_execute, sq_query_map, sq_query_row, trip_from_row, Db};

// ---------------------------------------------------------------------------
// Create trip
// ---------------------------------------------------------------------------

/// POST /api/trips — create a trip; inline GeoJSON is stored as its own
/// row and referenced.
pub async fn create_trip(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripDetailResponse>), ApiErr> {
    let name = service::validate_name(&req.name).map_err(ApiErr::from)?;
    let trip_id = Uuid::new_v4().to_string();
    let is_public = req.is_public.unwrap_or(false);

    let mut conn = db.conn();
    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin trip create"))?;

    let geojson_id = match req.geojson {
        Some(ref feature) => {
            let id = Uuid::new_v4().to_string();
            let properties = feature.properties.to_string();
            let geometry = serde_json::to_string(&feature.geometry)
                .map_err(ApiErr::from_db("encode geometry"))?;
            sq_execute(
                &tx,
                dbq::geo::insert_geojson(&id, &feature.feature_type, &properties, &geometry),
            )
            .map_err(ApiErr::from_db("insert geojson"))?;
            Some(id)
        }
        None => None,
    };

    sq_execute(
        &tx,
        dbq::trips::insert(
            &trip_id,
            &name,
            req.description.as_deref(),
            req.duration.as_deref(),
            req.weather.as_deref(),
            req.start_date.as_deref(),
            req.end_date.as_deref(),
            req.destination.as_deref(),
            &user.user_id,
            is_public,
            geojson_id.as_deref(),
        ),
    )
    .map_err(ApiErr::from_db("insert trip"))?;

    tx.commit().map_err(ApiErr::from_db("commit trip create"))?;

    let trip = sq_query_row(&conn, dbq::trips::get_by_id(&trip_id), trip_from_row)
        .map_err(ApiErr::from_db("load created trip"))?;

    Ok((
        StatusCode::CREATED,
        Json(TripDetailResponse {
            trip,
            geojson: req.geojson,
        }),
    ))
}

// ---------------------------------------------------------------------------
// List / detail
// ---------------------------------------------------------------------------

/// GET /api/trips — public trips, plus the caller's own when signed in.
pub async fn list_trips(
    State(db): State<Db>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<TripListResponse>, ApiErr> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    let conn = db.conn();
    let trips = sq_query_map(&conn, dbq::trips::list_visible(viewer), trip_from_row)
        .map_err(ApiErr::from_db("list trips"))?;
    Ok(Json(TripListResponse { trips }))
}

/// GET /api/trips/:id — trip populated with its stored geometry.
pub async fn get_trip(
    State(db): State<Db>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<TripDetailResponse>, ApiErr> {
    let conn = db.conn();

    let (trip, geojson_id) = sq_query_row(&conn, dbq::trips::get_by_id(&id), |row| {
        Ok((trip_from_row(row)?, row.get::<_, Option<String>>(10)?))
    })
    .map_err(|_| ApiErr::not_found("trip not found"))?;

    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    if !trip.is_public && viewer != Some(trip.owner_id.as_str()) {
        return Err(ApiErr::not_found("trip not found"));
    }

    let geojson = match geojson_id {
        Some(ref gid) => load_feature(&conn, gid)?,
        None => None,
    };

    Ok(Json(TripDetailResponse { trip, geojson }))
}

pub(crate) fn load_feature(
    conn: &rusqlite::Connection,
    geojson_id: &str,
) -> Result<Option<Feature>, ApiErr> {
    let row = sq_query_row(conn, dbq::geo::get_geojson(geojson_id), |row| {
        Ok((
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    });

    let Ok((feature_type, properties, geometry)) = row else {
        return Ok(None);
    };
    let Some(geometry) = geometry.and_then(|g| serde_json::from_str(&g).ok()) else {
        return Ok(None);
    };

    Ok(Some(Feature {
        feature_type: feature_type.unwrap_or_else(|| "Feature".to_string()),
        properties: properties
            .and_then(|p| serde_json::from_str(&p).ok())
            .unwrap_or(serde_json::Value::Null),
        geometry,
    }))
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

/// PUT /api/trips/:id — partial overwrite. Owner only.
pub async fn update_trip(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTripRequest>,
) -> Result<Json<TripSummary>, ApiErr> {
    let conn = db.conn();
    require_owner(&conn, &id, &user.user_id)?;

    if let Some(ref name) = req.name {
        let name = service::validate_name(name).map_err(ApiErr::from)?;
        sq_execute(&conn, dbq::trips::update_name(&id, &name))
            .map_err(ApiErr::from_db("rename trip"))?;
    }
    if let Some(ref description) = req.description {
        sq_execute(&conn, dbq::trips::update_description(&id, description))
            .map_err(ApiErr::from_db("trip description"))?;
    }
    if let Some(ref duration) = req.duration {
        sq_execute(&conn, dbq::trips::update_duration(&id, duration))
            .map_err(ApiErr::from_db("trip duration"))?;
    }
    if let Some(ref weather) = req.weather {
        sq_execute(&conn, dbq::trips::update_weather(&id, weather))
            .map_err(ApiErr::from_db("trip weather"))?;
    }
    if req.start_date.is_some() || req.end_date.is_some() {
        sq_execute(
            &conn,
            dbq::trips::update_dates(&id, req.start_date.as_deref(), req.end_date.as_deref()),
        )
        .map_err(ApiErr::from_db("trip dates"))?;
    }
    if let Some(ref destination) = req.destination {
        sq_execute(&conn, dbq::trips::update_destination(&id, destination))
            .map_err(ApiErr::from_db("trip destination"))?;
    }
    if let Some(is_public) = req.is_public {
        sq_execute(&conn, dbq::trips::update_visibility(&id, is_public))
            .map_err(ApiErr::from_db("trip visibility"))?;
    }

    let trip = sq_query_row(&conn, dbq::trips::get_by_id(&id), trip_from_row)
        .map_err(ApiErr::from_db("load updated trip"))?;
    Ok(Json(trip))
}

/// DELETE /api/trips/:id — owner only; the referenced geometry row goes too.
pub async fn delete_trip(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MsgResponse>, ApiErr> {
    let mut conn = db.conn();
    require_owner(&conn, &id, &user.user_id)?;

    let geojson_id: Option<String> =
        sq_query_row(&conn, dbq::trips::get_by_id(&id), |row| row.get(10))
            .map_err(|_| ApiErr::not_found("trip not found"))?;

    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin trip delete"))?;
    sq_execute(&tx, dbq::trips::delete(&id)).map_err(ApiErr::from_db("delete trip"))?;
    if let Some(ref gid) = geojson_id {
        sq_execute(&tx, dbq::geo::delete_geojson(gid))
            .map_err(ApiErr::from_db("delete trip geometry"))?;
    }
    tx.commit().map_err(ApiErr::from_db("commit trip delete"))?;

    Ok(Json(MsgResponse {
        msg: "trip deleted successfully".to_string(),
    }))
}

fn require_owner(conn: &rusqlite::Connection, trip_id: &str, user_id: &str) -> Result<(), ApiErr> {
    let trip = sq_query_row(conn, dbq::trips::get_by_id(trip_id), trip_from_row)
        .map_err(|_| ApiErr::not_found("trip not found"))?;
    if trip.owner_id != user_id {
        return Err(ApiErr::forbidden("not the trip owner"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;
    use trailpack_core::geo::{Geometry, node_feature};

    #[test]
    fn stored_geometry_round_trips_through_load_feature() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        let feature = node_feature(47.6, -122.3, serde_json::json!({"name": "trailhead"}));
        sq_execute(
            &conn,
            dbq::geo::insert_geojson(
                "g1",
                &feature.feature_type,
                &feature.properties.to_string(),
                &serde_json::to_string(&feature.geometry).unwrap(),
            ),
        )
        .unwrap();

        let loaded = load_feature(&conn, "g1").unwrap().unwrap();
        assert_eq!(loaded.feature_type, "Feature");
        assert_eq!(loaded.geometry.geometry_type, "Point");
        assert_eq!(loaded.properties["name"], "trailhead");
    }

    #[test]
    fn missing_geometry_loads_as_none() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        assert!(load_feature(&conn, "absent").unwrap().is_none());
    }

    #[test]
    fn corrupt_geometry_loads_as_none() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        sq_execute(
            &conn,
            dbq::geo::insert_geojson("g1", "Feature", "{}", "not json"),
        )
        .unwrap();
        assert!(load_feature(&conn, "g1").unwrap().is_none());
    }

    #[test]
    fn trip_rows_keep_their_geometry_reference() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        sq_execute(
            &conn,
            dbq::users::insert_with_password("u1", "hiker", "h@example.com", "h", "s"),
        )
        .unwrap();
        let geometry = Geometry {
            geometry_type: "Point".into(),
            coordinates: serde_json::json!([0.0, 0.0]),
        };
        sq_execute(
            &conn,
            dbq::geo::insert_geojson(
                "g1",
                "Feature",
                "{}",
                &serde_json::to_string(&geometry).unwrap(),
            ),
        )
        .unwrap();
        sq_execute(
            &conn,
            dbq::trips::insert(
                "t1",
                "North loop",
                None,
                None,
                None,
                Some("2026-06-01"),
                Some("2026-06-03"),
                Some("North Cascades"),
                "u1",
                true,
                Some("g1"),
            ),
        )
        .unwrap();

        let (trip, geojson_id) = sq_query_row(&conn, dbq::trips::get_by_id("t1"), |row| {
            Ok((trip_from_row(row)?, row.get::<_, Option<String>>(10)?))
        })
        .unwrap();
        assert_eq!(trip.destination.as_deref(), Some("North Cascades"));
        assert_eq!(geojson_id.as_deref(), Some("g1"));
    }
}
