use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use trailpack_core::item::{GearItem, ItemCategory};
use trailpack_core::pack::total_weight_grams;
use trailpack_core::scoring::score_pack;
use trailpack_core::weight::WeightUnit;

use trailpack_api::{
    db as dbq, service, AddItemRequest, CreatePackRequest, ItemListResponse, ItemResponse,
    MsgResponse, PackDetailResponse, PackListQuery, PackListResponse, PackSummary,
    UpdatePackRequest,
};

use crate::error::ApiErr;
use crate::routes::auth::{AuthUser, MaybeUser};
use crate::storage::{item_from_row, pack_from_row, sq_execute, sq_query_map, sq_query_row, Db};

// ---------------------------------------------------------------------------
// Create pack
// ---------------------------------------------------------------------------

/// POST /api/packs — create an empty pack owned by the caller.
pub async fn create_pack(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<CreatePackRequest>,
) -> Result<(StatusCode, Json<PackSummary>), ApiErr> {
    let name = service::validate_name(&req.name).map_err(ApiErr::from)?;
    let pack_id = Uuid::new_v4().to_string();
    let is_public = req.is_public.unwrap_or(false);

    let conn = db.conn();
    sq_execute(
        &conn,
        dbq::packs::insert(&pack_id, &name, &user.user_id, is_public),
    )
    .map_err(ApiErr::from_db("create pack"))?;

    let pack = sq_query_row(&conn, dbq::packs::get_by_id(&pack_id), pack_from_row)
        .map_err(ApiErr::from_db("load created pack"))?;

    Ok((StatusCode::CREATED, Json(pack)))
}

// ---------------------------------------------------------------------------
// List packs
// ---------------------------------------------------------------------------

/// GET /api/packs — public packs, plus the caller's own when signed in.
pub async fn list_packs(
    State(db): State<Db>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<PackListQuery>,
) -> Result<Json<PackListResponse>, ApiErr> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    let conn = db.conn();
    let packs = sq_query_map(
        &conn,
        dbq::packs::list_visible(viewer, query.owner_id.as_deref()),
        pack_from_row,
    )
    .map_err(ApiErr::from_db("list packs"))?;
    Ok(Json(PackListResponse { packs }))
}

// ---------------------------------------------------------------------------
// Pack detail
// ---------------------------------------------------------------------------

/// GET /api/packs/:id — pack with items and the score breakdown.
pub async fn get_pack(
    State(db): State<Db>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<PackDetailResponse>, ApiErr> {
    let conn = db.conn();

    let pack = sq_query_row(&conn, dbq::packs::get_by_id(&id), pack_from_row)
        .map_err(|_| ApiErr::not_found("pack not found"))?;

    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    if !pack.is_public && viewer != Some(pack.owner_id.as_str()) {
        return Err(ApiErr::not_found("pack not found"));
    }

    let items = sq_query_map(&conn, dbq::items::list_for_pack(&id), item_from_row)
        .map_err(ApiErr::from_db("list pack items"))?;
    let score = score_pack(&gear_items(&items));

    Ok(Json(PackDetailResponse { pack, items, score }))
}

// ---------------------------------------------------------------------------
// Update / delete pack
// ---------------------------------------------------------------------------

/// PUT /api/packs/:id — rename or change visibility. Owner only.
pub async fn update_pack(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePackRequest>,
) -> Result<Json<PackSummary>, ApiErr> {
    let conn = db.conn();
    require_owner(&conn, &id, &user.user_id)?;

    if let Some(ref name) = req.name {
        let name = service::validate_name(name).map_err(ApiErr::from)?;
        sq_execute(&conn, dbq::packs::update_name(&id, &name))
            .map_err(ApiErr::from_db("rename pack"))?;
    }
    if let Some(is_public) = req.is_public {
        sq_execute(&conn, dbq::packs::update_visibility(&id, is_public))
            .map_err(ApiErr::from_db("pack visibility"))?;
    }

    let pack = sq_query_row(&conn, dbq::packs::get_by_id(&id), pack_from_row)
        .map_err(ApiErr::from_db("load updated pack"))?;
    Ok(Json(pack))
}

/// DELETE /api/packs/:id — owner only; join rows and favorites go with it.
pub async fn delete_pack(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MsgResponse>, ApiErr> {
    let mut conn = db.conn();
    require_owner(&conn, &id, &user.user_id)?;

    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin pack delete"))?;
    sq_execute(&tx, dbq::packs::delete_pack_items(&id))
        .map_err(ApiErr::from_db("delete pack items"))?;
    sq_execute(&tx, dbq::packs::delete_favorites_for_pack(&id))
        .map_err(ApiErr::from_db("delete pack favorites"))?;
    sq_execute(&tx, dbq::packs::delete(&id)).map_err(ApiErr::from_db("delete pack"))?;
    tx.commit().map_err(ApiErr::from_db("commit pack delete"))?;

    Ok(Json(MsgResponse {
        msg: "pack deleted successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Pack items
// ---------------------------------------------------------------------------

/// POST /api/packs/:id/items — add a gear item; totals are recomputed in
/// the same transaction.
pub async fn add_item(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiErr> {
    let name = service::validate_name(&req.name).map_err(ApiErr::from)?;
    if !req.weight.is_finite() || req.weight < 0.0 {
        return Err(ApiErr::bad_request("weight must be a non-negative number"));
    }
    let unit = WeightUnit::parse(req.unit.as_deref().unwrap_or("g"));
    let quantity = req.quantity.unwrap_or(1).max(1);

    let mut conn = db.conn();
    require_owner(&conn, &id, &user.user_id)?;

    let category_id: Option<String> = match req.category.as_deref() {
        Some(raw) => {
            let category = ItemCategory::parse(raw)
                .ok_or_else(|| ApiErr::bad_request("unknown item category"))?;
            sq_query_row(
                &conn,
                dbq::items::category_id_by_name(category.as_str()),
                |row| row.get(0),
            )
            .optional()
            .map_err(ApiErr::from_db("category lookup"))?
        }
        None => None,
    };

    let item_id = Uuid::new_v4().to_string();
    let tx = conn.transaction().map_err(ApiErr::from_db("begin add item"))?;
    sq_execute(
        &tx,
        dbq::items::insert(
            &item_id,
            &name,
            req.weight,
            quantity,
            unit.as_str(),
            &user.user_id,
            category_id.as_deref(),
        ),
    )
    .map_err(ApiErr::from_db("insert item"))?;
    sq_execute(&tx, dbq::items::attach_to_pack(&id, &item_id))
        .map_err(ApiErr::from_db("attach item"))?;
    recompute_pack_totals(&tx, &id)?;
    tx.commit().map_err(ApiErr::from_db("commit add item"))?;

    let item = sq_query_row(&conn, dbq::items::get_by_id(&item_id), item_from_row)
        .map_err(ApiErr::from_db("load created item"))?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /api/packs/:id/items/:item_id — detach (and drop non-global
/// items); totals are recomputed in the same transaction.
pub async fn remove_item(
    State(db): State<Db>,
    user: AuthUser,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<MsgResponse>, ApiErr> {
    let mut conn = db.conn();
    require_owner(&conn, &id, &user.user_id)?;

    let item = sq_query_row(&conn, dbq::items::get_by_id(&item_id), item_from_row)
        .map_err(|_| ApiErr::not_found("item not found"))?;

    let tx = conn
        .transaction()
        .map_err(ApiErr::from_db("begin remove item"))?;
    let detached = sq_execute(&tx, dbq::items::detach_from_pack(&id, &item_id))
        .map_err(ApiErr::from_db("detach item"))?;
    if detached == 0 {
        return Err(ApiErr::not_found("item not in pack"));
    }
    if !item.global {
        sq_execute(&tx, dbq::items::delete(&item_id)).map_err(ApiErr::from_db("delete item"))?;
    }
    recompute_pack_totals(&tx, &id)?;
    tx.commit().map_err(ApiErr::from_db("commit remove item"))?;

    Ok(Json(MsgResponse {
        msg: "item removed successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_owner(conn: &rusqlite::Connection, pack_id: &str, user_id: &str) -> Result<(), ApiErr> {
    let pack = sq_query_row(conn, dbq::packs::get_by_id(pack_id), pack_from_row)
        .map_err(|_| ApiErr::not_found("pack not found"))?;
    if pack.owner_id != user_id {
        return Err(ApiErr::forbidden("not the pack owner"));
    }
    Ok(())
}

fn gear_items(items: &[ItemResponse]) -> Vec<GearItem> {
    items
        .iter()
        .map(|i| GearItem {
            name: i.name.clone(),
            weight: i.weight,
            unit: WeightUnit::parse(&i.unit),
            quantity: i.quantity,
            category: i.category.as_deref().and_then(ItemCategory::parse),
        })
        .collect()
}

/// Refresh the denormalized weight/score cache from the current item rows.
pub fn recompute_pack_totals(conn: &rusqlite::Connection, pack_id: &str) -> Result<(), ApiErr> {
    let items = sq_query_map(conn, dbq::items::list_for_pack(pack_id), item_from_row)
        .map_err(ApiErr::from_db("load items for totals"))?;
    let gear = gear_items(&items);
    let total_weight = total_weight_grams(&gear);
    let score = score_pack(&gear);
    sq_execute(
        conn,
        dbq::packs::update_totals(pack_id, total_weight, score.total),
    )
    .map_err(ApiErr::from_db("update pack totals"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// GET /api/items — the gear catalogue
// ---------------------------------------------------------------------------

/// GET /api/items — global items plus the caller's own.
pub async fn list_items(
    State(db): State<Db>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<ItemListResponse>, ApiErr> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    let conn = db.conn();
    let items = sq_query_map(&conn, dbq::items::list_catalogue(viewer), item_from_row)
        .map_err(ApiErr::from_db("list items"))?;
    Ok(Json(ItemListResponse { items }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;

    fn seed(conn: &rusqlite::Connection) {
        sq_execute(
            conn,
            dbq::users::insert_with_password("u1", "hiker", "h@example.com", "h", "s"),
        )
        .unwrap();
        sq_execute(conn, dbq::packs::insert("p1", "Weekend pack", "u1", false)).unwrap();
    }

    fn add(conn: &rusqlite::Connection, id: &str, name: &str, grams: f64, category: Option<&str>) {
        let category_id = category.map(|c| format!("cat-{}", c.to_lowercase()));
        sq_execute(
            conn,
            dbq::items::insert(id, name, grams, 1, "g", "u1", category_id.as_deref()),
        )
        .unwrap();
        sq_execute(conn, dbq::items::attach_to_pack("p1", id)).unwrap();
    }

    fn totals(conn: &rusqlite::Connection) -> (f64, f64) {
        conn.query_row(
            "SELECT total_weight, total_score FROM packs WHERE id = 'p1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap()
    }

    #[test]
    fn recompute_updates_the_denormalized_cache() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed(&conn);

        assert_eq!(totals(&conn), (0.0, 0.0));

        add(&conn, "i1", "tent", 2000.0, Some("essentials"));
        add(&conn, "i2", "water bladder", 500.0, Some("water"));
        add(&conn, "i3", "trail mix", 300.0, Some("food"));
        recompute_pack_totals(&conn, "p1").unwrap();

        let (weight, score) = totals(&conn);
        assert_eq!(weight, 2800.0);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn detaching_an_item_shrinks_the_totals() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed(&conn);

        add(&conn, "i1", "tent", 2000.0, Some("essentials"));
        add(&conn, "i2", "stove", 400.0, Some("food"));
        recompute_pack_totals(&conn, "p1").unwrap();
        let (before, _) = totals(&conn);

        sq_execute(&conn, dbq::items::detach_from_pack("p1", "i2")).unwrap();
        recompute_pack_totals(&conn, "p1").unwrap();
        let (after, _) = totals(&conn);

        assert_eq!(before, 2400.0);
        assert_eq!(after, 2000.0);
    }

    #[test]
    fn catalogue_scopes_private_items_to_their_owner() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed(&conn);

        sq_execute(
            &conn,
            dbq::items::insert("i1", "headlamp", 90.0, 1, "g", "u1", None),
        )
        .unwrap();
        conn.execute(
            "UPDATE items SET global = 1, owner_id = NULL WHERE id = 'i1'",
            [],
        )
        .unwrap();
        sq_execute(
            &conn,
            dbq::items::insert("i2", "spork", 15.0, 1, "g", "u1", None),
        )
        .unwrap();

        let everyone = sq_query_map(&conn, dbq::items::list_catalogue(None), item_from_row).unwrap();
        assert_eq!(everyone.len(), 1);

        let mine = sq_query_map(&conn, dbq::items::list_catalogue(Some("u1")), item_from_row)
            .unwrap();
        assert_eq!(mine.len(), 2);
    }
}
