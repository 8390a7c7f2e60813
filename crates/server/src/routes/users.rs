use axum::{
    extract::{Path, State},
    Json,
};
use rusqlite::OptionalExtension;

use trailpack_api::{
    db as dbq, service, DeleteUserRequest, FavoriteResponse, MsgResponse, ToggleFavoriteRequest,
    UpdateUserRequest, UserDetail, UserListResponse,
};

use crate::error::ApiErr;
use crate::routes::auth::{now_unix, AuthUser};
use crate::storage::{pack_from_row, sq_execute, sq_query_map, sq_query_row, trip_from_row, user_from_row, Db};

// ---------------------------------------------------------------------------
// GET /api/users
// ---------------------------------------------------------------------------

/// GET /api/users — every user, populated with their packs and trips.
pub async fn list_users(State(db): State<Db>) -> Result<Json<UserListResponse>, ApiErr> {
    let conn = db.conn();

    let users = sq_query_map(&conn, dbq::users::list_all(), user_from_row)
        .map_err(ApiErr::from_db("list users"))?;

    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let packs = sq_query_map(&conn, dbq::packs::list_by_owner(&user.id), pack_from_row)
            .map_err(ApiErr::from_db("list user packs"))?;
        let trips = sq_query_map(&conn, dbq::trips::list_by_owner(&user.id), trip_from_row)
            .map_err(ApiErr::from_db("list user trips"))?;
        out.push(UserDetail {
            user,
            packs,
            trips,
            favorites: Vec::new(),
        });
    }

    Ok(Json(UserListResponse { users: out }))
}

// ---------------------------------------------------------------------------
// GET /api/users/:id
// ---------------------------------------------------------------------------

/// GET /api/users/:id — one user, populated with their packs.
pub async fn get_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<UserDetail>, ApiErr> {
    let conn = db.conn();

    let user = sq_query_row(&conn, dbq::users::get_by_id(&id), user_from_row)
        .map_err(|_| ApiErr::not_found("User cannot be found"))?;

    let packs = sq_query_map(&conn, dbq::packs::list_by_owner(&user.id), pack_from_row)
        .map_err(ApiErr::from_db("list user packs"))?;

    Ok(Json(UserDetail {
        user,
        packs,
        trips: Vec::new(),
        favorites: Vec::new(),
    }))
}

// ---------------------------------------------------------------------------
// PUT /api/users — id in the body, as in the legacy edit endpoint
// ---------------------------------------------------------------------------

/// PUT /api/users — partial profile overwrite; returns the updated user
/// populated with their favorited packs.
pub async fn edit_user(
    State(db): State<Db>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserDetail>, ApiErr> {
    let conn = db.conn();

    let exists = sq_query_row(&conn, dbq::users::get_by_id(&req.user_id), user_from_row)
        .optional()
        .map_err(ApiErr::from_db("edit user lookup"))?;
    if exists.is_none() {
        return Err(ApiErr::not_found("Unable to edit user"));
    }

    if let Some(ref username) = req.username {
        let username = service::validate_username(username).map_err(ApiErr::from)?;
        sq_execute(&conn, dbq::users::update_username(&req.user_id, &username))
            .map_err(ApiErr::from_db("edit username"))?;
    }
    if let Some(ref name) = req.name {
        sq_execute(&conn, dbq::users::update_name(&req.user_id, name))
            .map_err(ApiErr::from_db("edit name"))?;
    }
    if let Some(ref profile_image) = req.profile_image {
        sq_execute(
            &conn,
            dbq::users::update_profile_image(&req.user_id, profile_image),
        )
        .map_err(ApiErr::from_db("edit profile image"))?;
    }
    if let Some(ref preferred_weather) = req.preferred_weather {
        sq_execute(
            &conn,
            dbq::users::update_preferred_weather(&req.user_id, preferred_weather),
        )
        .map_err(ApiErr::from_db("edit preferred weather"))?;
    }
    if let Some(ref preferred_weight) = req.preferred_weight {
        sq_execute(
            &conn,
            dbq::users::update_preferred_weight(&req.user_id, preferred_weight),
        )
        .map_err(ApiErr::from_db("edit preferred weight"))?;
    }
    if let Some(is_certified_guide) = req.is_certified_guide {
        sq_execute(
            &conn,
            dbq::users::update_certified_guide(&req.user_id, is_certified_guide),
        )
        .map_err(ApiErr::from_db("edit certified guide"))?;
    }

    let now = service::sqlite_datetime(now_unix()).map_err(ApiErr::from)?;
    sq_execute(&conn, dbq::users::touch(&req.user_id, &now))
        .map_err(ApiErr::from_db("edit user touch"))?;

    let user = sq_query_row(&conn, dbq::users::get_by_id(&req.user_id), user_from_row)
        .map_err(|_| ApiErr::not_found("Unable to edit user"))?;
    let favorites = sq_query_map(
        &conn,
        dbq::packs::list_favorited_by(&user.id),
        pack_from_row,
    )
    .map_err(ApiErr::from_db("list favorites"))?;

    Ok(Json(UserDetail {
        user,
        packs: Vec::new(),
        trips: Vec::new(),
        favorites,
    }))
}

// ---------------------------------------------------------------------------
// DELETE /api/users — id in the body
// ---------------------------------------------------------------------------

/// DELETE /api/users — remove exactly one account.
pub async fn delete_user(
    State(db): State<Db>,
    Json(req): Json<DeleteUserRequest>,
) -> Result<Json<MsgResponse>, ApiErr> {
    let conn = db.conn();

    let deleted = sq_execute(&conn, dbq::users::delete(&req.user_id))
        .map_err(ApiErr::from_db("delete user"))?;
    if deleted == 0 {
        return Err(ApiErr::not_found("User cannot be found"));
    }

    Ok(Json(MsgResponse {
        msg: "user deleted successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/users/favorite — toggle
// ---------------------------------------------------------------------------

/// POST /api/users/favorite — toggle the caller's favorite on a pack.
/// The join row and the denormalized counter move together or not at all.
pub async fn toggle_favorite(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<ToggleFavoriteRequest>,
) -> Result<Json<FavoriteResponse>, ApiErr> {
    let mut conn = db.conn();

    toggle_favorite_on(&mut conn, &user.user_id, &req.pack_id)?;

    let summary = sq_query_row(&conn, dbq::users::get_by_id(&user.user_id), user_from_row)
        .map_err(|_| ApiErr::not_found("User cannot be found"))?;
    let favorites: Vec<String> =
        sq_query_map(&conn, dbq::users::favorite_ids(&user.user_id), |row| {
            row.get(0)
        })
        .map_err(ApiErr::from_db("list favorite ids"))?;

    Ok(Json(FavoriteResponse {
        user: summary,
        favorites,
    }))
}

/// The toggle itself, in one transaction. Returns whether the pack is
/// favorited after the call.
pub fn toggle_favorite_on(
    conn: &mut rusqlite::Connection,
    user_id: &str,
    pack_id: &str,
) -> Result<bool, ApiErr> {
    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin favorite toggle"))?;

    sq_query_row(&tx, dbq::packs::get_by_id(pack_id), pack_from_row)
        .map_err(|_| ApiErr::not_found("pack not found"))?;

    let already: bool = sq_query_row(
        &tx,
        dbq::users::favorite_exists(user_id, pack_id),
        |row| row.get(0),
    )
    .unwrap_or(false);

    if already {
        sq_execute(&tx, dbq::users::delete_favorite(user_id, pack_id))
            .map_err(ApiErr::from_db("remove favorite"))?;
        sq_execute(&tx, dbq::packs::bump_favorites_count(pack_id, -1))
            .map_err(ApiErr::from_db("decrement favorites count"))?;
    } else {
        sq_execute(&tx, dbq::users::insert_favorite(user_id, pack_id))
            .map_err(ApiErr::from_db("add favorite"))?;
        sq_execute(&tx, dbq::packs::bump_favorites_count(pack_id, 1))
            .map_err(ApiErr::from_db("increment favorites count"))?;
    }

    tx.commit().map_err(ApiErr::from_db("commit favorite toggle"))?;
    Ok(!already)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;

    fn seed_user_and_pack(conn: &rusqlite::Connection) {
        sq_execute(
            conn,
            dbq::users::insert_with_password("u1", "hiker", "h@example.com", "h", "s"),
        )
        .unwrap();
        sq_execute(conn, dbq::packs::insert("p1", "Alpine loadout", "u1", true)).unwrap();
    }

    fn favorites_state(conn: &rusqlite::Connection) -> (i64, i64) {
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM favorites", [], |r| r.get(0))
            .unwrap();
        let count: i64 = conn
            .query_row("SELECT favorites_count FROM packs WHERE id = 'p1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        (rows, count)
    }

    #[test]
    fn toggle_adds_then_reverses_exactly() {
        let db = init_memory_db().unwrap();
        let mut conn = db.conn();
        seed_user_and_pack(&conn);

        assert!(toggle_favorite_on(&mut conn, "u1", "p1").unwrap());
        assert_eq!(favorites_state(&conn), (1, 1));

        assert!(!toggle_favorite_on(&mut conn, "u1", "p1").unwrap());
        assert_eq!(favorites_state(&conn), (0, 0));
    }

    #[test]
    fn toggle_on_missing_pack_is_404_and_writes_nothing() {
        let db = init_memory_db().unwrap();
        let mut conn = db.conn();
        seed_user_and_pack(&conn);

        let err = toggle_favorite_on(&mut conn, "u1", "no-such-pack").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(favorites_state(&conn), (0, 0));
    }

    #[test]
    fn counter_never_drops_below_zero() {
        let db = init_memory_db().unwrap();
        let mut conn = db.conn();
        seed_user_and_pack(&conn);

        // Corrupted legacy data: favorite row present, counter at zero.
        sq_execute(&conn, dbq::users::insert_favorite("u1", "p1")).unwrap();
        assert!(!toggle_favorite_on(&mut conn, "u1", "p1").unwrap());
        assert_eq!(favorites_state(&conn), (0, 0));
    }

    #[tokio::test]
    async fn editing_a_missing_user_is_404() {
        let db = init_memory_db().unwrap();
        let err = edit_user(
            axum::extract::State(db.clone()),
            axum::Json(UpdateUserRequest {
                user_id: "absent".into(),
                name: Some("New Name".into()),
                ..Default::default()
            }),
        )
        .await
        .expect_err("missing user must fail");
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn editing_a_user_returns_the_update_with_favorites() {
        let db = init_memory_db().unwrap();
        {
            let mut conn = db.conn();
            seed_user_and_pack(&conn);
            toggle_favorite_on(&mut conn, "u1", "p1").unwrap();
        }

        let detail = edit_user(
            axum::extract::State(db.clone()),
            axum::Json(UpdateUserRequest {
                user_id: "u1".into(),
                preferred_weight: Some("kg".into()),
                ..Default::default()
            }),
        )
        .await
        .expect("edit");
        assert_eq!(detail.0.user.preferred_weight.as_deref(), Some("kg"));
        assert_eq!(detail.0.favorites.len(), 1);
        assert_eq!(detail.0.favorites[0].id, "p1");
    }

    #[tokio::test]
    async fn deleting_a_missing_user_is_404() {
        let db = init_memory_db().unwrap();
        let err = delete_user(
            axum::extract::State(db.clone()),
            axum::Json(DeleteUserRequest {
                user_id: "absent".into(),
            }),
        )
        .await
        .expect_err("missing user must fail");
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn delete_user_removes_exactly_one_row() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed_user_and_pack(&conn);
        sq_execute(
            &conn,
            dbq::users::insert_with_password("u2", "other", "o@example.com", "h", "s"),
        )
        .unwrap();

        let deleted = sq_execute(&conn, dbq::users::delete("u1")).unwrap();
        assert_eq!(deleted, 1);
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 1);

        let missing = sq_execute(&conn, dbq::users::delete("u1")).unwrap();
        assert_eq!(missing, 0);
    }
}
