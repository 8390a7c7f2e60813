//! Item + pack_items query builders.

use sea_query::{Cond, Expr, Order, Query, SqliteQueryBuilder};

use super::tables::{ItemCategories, Items, PackItems};
use super::Built;

/// Column order for item SELECTs. The category comes through as its
/// display name via a join.
fn item_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.column((Items::Table, Items::Id))
        .column((Items::Table, Items::Name))
        .column((Items::Table, Items::Weight))
        .column((Items::Table, Items::Quantity))
        .column((Items::Table, Items::Unit))
        .column((Items::Table, Items::Global))
        .column((Items::Table, Items::OwnerId))
        .column((ItemCategories::Table, ItemCategories::Name))
}

fn with_category_join(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.left_join(
        ItemCategories::Table,
        Expr::col((ItemCategories::Table, ItemCategories::Id))
            .equals((Items::Table, Items::CategoryId)),
    )
}

// ── Queries ─────────────────────────────────────────────────────────────────

pub fn insert(
    id: &str,
    name: &str,
    weight: f64,
    quantity: u32,
    unit: &str,
    owner_id: &str,
    category_id: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(Items::Table)
        .columns([
            Items::Id,
            Items::Name,
            Items::Weight,
            Items::Quantity,
            Items::Unit,
            Items::OwnerId,
            Items::CategoryId,
        ])
        .values_panic([
            id.into(),
            name.into(),
            weight.into(),
            quantity.into(),
            unit.into(),
            owner_id.into(),
            category_id.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_by_id(id: &str) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    with_category_join(&mut q);
    q.from(Items::Table)
        .and_where(Expr::col((Items::Table, Items::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

/// Items attached to a pack, in attach order.
pub fn list_for_pack(pack_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    q.from(Items::Table).inner_join(
        PackItems::Table,
        Expr::col((PackItems::Table, PackItems::ItemId)).equals((Items::Table, Items::Id)),
    );
    with_category_join(&mut q);
    q.and_where(Expr::col((PackItems::Table, PackItems::PackId)).eq(pack_id))
        .order_by((PackItems::Table, PackItems::CreatedAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// The gear catalogue: global items plus the caller's own.
pub fn list_catalogue(owner_id: Option<&str>) -> Built {
    let mut q = Query::select().to_owned();
    item_columns(&mut q);
    with_category_join(&mut q);
    q.from(Items::Table);

    match owner_id {
        Some(owner) => {
            q.cond_where(
                Cond::any()
                    .add(Expr::col((Items::Table, Items::Global)).eq(true))
                    .add(Expr::col((Items::Table, Items::OwnerId)).eq(owner)),
            );
        }
        None => {
            q.and_where(Expr::col((Items::Table, Items::Global)).eq(true));
        }
    }

    q.order_by((Items::Table, Items::Name), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Resolve a category display name to its id.
pub fn category_id_by_name(name: &str) -> Built {
    Query::select()
        .column(ItemCategories::Id)
        .from(ItemCategories::Table)
        .and_where(Expr::col(ItemCategories::Name).eq(name))
        .build(SqliteQueryBuilder)
}

// ── Pack attachment ─────────────────────────────────────────────────────────

pub fn attach_to_pack(pack_id: &str, item_id: &str) -> Built {
    Query::insert()
        .into_table(PackItems::Table)
        .columns([PackItems::PackId, PackItems::ItemId])
        .values_panic([pack_id.into(), item_id.into()])
        .build(SqliteQueryBuilder)
}

pub fn detach_from_pack(pack_id: &str, item_id: &str) -> Built {
    Query::delete()
        .from_table(PackItems::Table)
        .and_where(Expr::col(PackItems::PackId).eq(pack_id))
        .and_where(Expr::col(PackItems::ItemId).eq(item_id))
        .build(SqliteQueryBuilder)
}

// ── Deletes ─────────────────────────────────────────────────────────────────

pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Items::Table)
        .and_where(Expr::col(Items::Id).eq(id))
        .build(SqliteQueryBuilder)
}
