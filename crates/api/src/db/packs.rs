//! Pack query builders.

use sea_query::{Cond, Expr, Order, Query, SqliteQueryBuilder};

use super::tables::{Favorites, PackItems, Packs};
use super::Built;

/// Column order shared by every pack SELECT.
pub const PACK_COLUMNS: [Packs; 8] = [
    Packs::Id,
    Packs::Name,
    Packs::OwnerId,
    Packs::IsPublic,
    Packs::TotalWeight,
    Packs::TotalScore,
    Packs::FavoritesCount,
    Packs::CreatedAt,
];

// ── Queries ─────────────────────────────────────────────────────────────────

pub fn insert(id: &str, name: &str, owner_id: &str, is_public: bool) -> Built {
    Query::insert()
        .into_table(Packs::Table)
        .columns([Packs::Id, Packs::Name, Packs::OwnerId, Packs::IsPublic])
        .values_panic([id.into(), name.into(), owner_id.into(), is_public.into()])
        .build(SqliteQueryBuilder)
}

pub fn get_by_id(id: &str) -> Built {
    Query::select()
        .columns(PACK_COLUMNS)
        .from(Packs::Table)
        .and_where(Expr::col(Packs::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Packs visible to `viewer`: public ones plus their own. An optional
/// owner filter narrows the listing.
pub fn list_visible(viewer_id: Option<&str>, owner_id: Option<&str>) -> Built {
    let mut q = Query::select()
        .columns(PACK_COLUMNS)
        .from(Packs::Table)
        .to_owned();

    match viewer_id {
        Some(viewer) => {
            q.cond_where(
                Cond::any()
                    .add(Expr::col(Packs::IsPublic).eq(true))
                    .add(Expr::col(Packs::OwnerId).eq(viewer)),
            );
        }
        None => {
            q.and_where(Expr::col(Packs::IsPublic).eq(true));
        }
    }

    if let Some(owner) = owner_id {
        q.and_where(Expr::col(Packs::OwnerId).eq(owner));
    }

    q.order_by(Packs::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// All packs owned by a user (for populating user records).
pub fn list_by_owner(owner_id: &str) -> Built {
    Query::select()
        .columns(PACK_COLUMNS)
        .from(Packs::Table)
        .and_where(Expr::col(Packs::OwnerId).eq(owner_id))
        .order_by(Packs::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// Packs a user has favorited, via the favorites join.
pub fn list_favorited_by(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    for col in PACK_COLUMNS {
        q.column((Packs::Table, col));
    }
    q.from(Packs::Table)
        .inner_join(
            Favorites::Table,
            Expr::col((Favorites::Table, Favorites::PackId)).equals((Packs::Table, Packs::Id)),
        )
        .and_where(Expr::col((Favorites::Table, Favorites::UserId)).eq(user_id))
        .order_by((Favorites::Table, Favorites::CreatedAt), Order::Desc)
        .build(SqliteQueryBuilder)
}

// ── Updates ─────────────────────────────────────────────────────────────────

pub fn update_name(id: &str, name: &str) -> Built {
    Query::update()
        .table(Packs::Table)
        .value(Packs::Name, name)
        .and_where(Expr::col(Packs::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_visibility(id: &str, is_public: bool) -> Built {
    Query::update()
        .table(Packs::Table)
        .value(Packs::IsPublic, is_public)
        .and_where(Expr::col(Packs::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Refresh the denormalized weight/score cache after item mutations.
pub fn update_totals(id: &str, total_weight: f64, total_score: f64) -> Built {
    Query::update()
        .table(Packs::Table)
        .value(Packs::TotalWeight, total_weight)
        .value(Packs::TotalScore, total_score)
        .and_where(Expr::col(Packs::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Bump `favorites_count` by ±1, floored at zero on the way down.
pub fn bump_favorites_count(id: &str, delta: i64) -> Built {
    let sql = if delta >= 0 {
        "UPDATE \"packs\" SET \"favorites_count\" = \"favorites_count\" + ? WHERE \"id\" = ?"
    } else {
        "UPDATE \"packs\" SET \"favorites_count\" = max(0, \"favorites_count\" + ?) WHERE \"id\" = ?"
    };
    let values = sea_query::Values(vec![delta.into(), id.into()]);
    (sql.to_string(), values)
}

// ── Deletes ─────────────────────────────────────────────────────────────────

pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Packs::Table)
        .and_where(Expr::col(Packs::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Drop every join row for a pack (used alongside delete when FK
/// cascades are not trusted, e.g. legacy databases without pragma).
pub fn delete_pack_items(pack_id: &str) -> Built {
    Query::delete()
        .from_table(PackItems::Table)
        .and_where(Expr::col(PackItems::PackId).eq(pack_id))
        .build(SqliteQueryBuilder)
}

pub fn delete_favorites_for_pack(pack_id: &str) -> Built {
    Query::delete()
        .from_table(Favorites::Table)
        .and_where(Expr::col(Favorites::PackId).eq(pack_id))
        .build(SqliteQueryBuilder)
}
