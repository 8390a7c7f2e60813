//! Conversation query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::Conversations;
use super::Built;

pub const CONVERSATION_COLUMNS: [Conversations; 4] = [
    Conversations::Id,
    Conversations::UserId,
    Conversations::History,
    Conversations::CreatedAt,
];

pub fn insert(id: &str, user_id: &str, history: &str) -> Built {
    Query::insert()
        .into_table(Conversations::Table)
        .columns([
            Conversations::Id,
            Conversations::UserId,
            Conversations::History,
        ])
        .values_panic([id.into(), user_id.into(), history.into()])
        .build(SqliteQueryBuilder)
}

/// One conversation, scoped to its owner so callers cannot read others'.
pub fn get_for_user(id: &str, user_id: &str) -> Built {
    Query::select()
        .columns(CONVERSATION_COLUMNS)
        .from(Conversations::Table)
        .and_where(Expr::col(Conversations::Id).eq(id))
        .and_where(Expr::col(Conversations::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// All of a user's conversations, newest first.
pub fn list_for_user(user_id: &str) -> Built {
    Query::select()
        .columns(CONVERSATION_COLUMNS)
        .from(Conversations::Table)
        .and_where(Expr::col(Conversations::UserId).eq(user_id))
        .order_by(Conversations::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// Overwrite the JSON history after an append.
pub fn update_history(id: &str, history: &str, updated_at: &str) -> Built {
    Query::update()
        .table(Conversations::Table)
        .value(Conversations::History, history)
        .value(Conversations::UpdatedAt, updated_at)
        .and_where(Expr::col(Conversations::Id).eq(id))
        .build(SqliteQueryBuilder)
}
