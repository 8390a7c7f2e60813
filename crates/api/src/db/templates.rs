//! Template query builders.

use sea_query::{Cond, Expr, Order, Query, SqliteQueryBuilder};

use super::tables::Templates;
use super::Built;

pub const TEMPLATE_COLUMNS: [Templates; 6] = [
    Templates::Id,
    Templates::Type,
    Templates::SourceId,
    Templates::IsGlobal,
    Templates::CreatedBy,
    Templates::CreatedAt,
];

pub fn insert(
    id: &str,
    kind: &str,
    source_id: &str,
    is_global: bool,
    created_by: &str,
) -> Built {
    Query::insert()
        .into_table(Templates::Table)
        .columns([
            Templates::Id,
            Templates::Type,
            Templates::SourceId,
            Templates::IsGlobal,
            Templates::CreatedBy,
        ])
        .values_panic([
            id.into(),
            kind.into(),
            source_id.into(),
            is_global.into(),
            created_by.into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_by_id(id: &str) -> Built {
    Query::select()
        .columns(TEMPLATE_COLUMNS)
        .from(Templates::Table)
        .and_where(Expr::col(Templates::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Global templates plus the caller's own.
pub fn list_visible(user_id: Option<&str>) -> Built {
    let mut q = Query::select()
        .columns(TEMPLATE_COLUMNS)
        .from(Templates::Table)
        .to_owned();

    match user_id {
        Some(user) => {
            q.cond_where(
                Cond::any()
                    .add(Expr::col(Templates::IsGlobal).eq(true))
                    .add(Expr::col(Templates::CreatedBy).eq(user)),
            );
        }
        None => {
            q.and_where(Expr::col(Templates::IsGlobal).eq(true));
        }
    }

    q.order_by(Templates::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Templates::Table)
        .and_where(Expr::col(Templates::Id).eq(id))
        .build(SqliteQueryBuilder)
}
