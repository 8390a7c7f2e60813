//! SQLite storage: connection handling, migrations, and the bridge from
//! sea-query built statements to rusqlite.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use trailpack_api::db::{migrations, Built};
use trailpack_api::{
    ConversationMessage, ConversationResponse, ItemResponse, PackSummary, TemplateKind,
    TemplateResponse, TripSummary, UserSummary,
};

/// Shared database state.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Wrap an already-open connection (tests use `:memory:`).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Lock the connection. Guards must be dropped before any `.await`.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }
}

/// Open the database file, enable WAL + foreign keys, run migrations.
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join("trailpack.db");
    let conn = Connection::open(&db_path).context("opening SQLite database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;

    Ok(Db::from_connection(conn))
}

/// In-memory database with the full schema, for tests.
pub fn init_memory_db() -> Result<Db> {
    let conn = Connection::open_in_memory().context("opening in-memory SQLite")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    run_migrations(&conn)?;
    Ok(Db::from_connection(conn))
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in migrations::MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

// ── sea-query → rusqlite bridge ─────────────────────────────────────────────

fn to_sql_value(v: &sea_query::Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    use sea_query::Value as V;

    match v {
        V::Bool(Some(b)) => Sql::Integer(i64::from(*b)),
        V::TinyInt(Some(i)) => Sql::Integer(i64::from(*i)),
        V::SmallInt(Some(i)) => Sql::Integer(i64::from(*i)),
        V::Int(Some(i)) => Sql::Integer(i64::from(*i)),
        V::BigInt(Some(i)) => Sql::Integer(*i),
        V::TinyUnsigned(Some(i)) => Sql::Integer(i64::from(*i)),
        V::SmallUnsigned(Some(i)) => Sql::Integer(i64::from(*i)),
        V::Unsigned(Some(i)) => Sql::Integer(i64::from(*i)),
        V::BigUnsigned(Some(i)) => Sql::Integer(i64::try_from(*i).unwrap_or(i64::MAX)),
        V::Float(Some(f)) => Sql::Real(f64::from(*f)),
        V::Double(Some(f)) => Sql::Real(*f),
        V::String(Some(s)) => Sql::Text(s.as_ref().clone()),
        V::Char(Some(c)) => Sql::Text(c.to_string()),
        V::Bytes(Some(b)) => Sql::Blob(b.as_ref().clone()),
        _ => Sql::Null,
    }
}

/// Execute a built statement; returns affected row count.
pub fn sq_execute(conn: &Connection, built: Built) -> rusqlite::Result<usize> {
    let (sql, values) = built;
    let params: Vec<_> = values.iter().map(to_sql_value).collect();
    conn.execute(&sql, rusqlite::params_from_iter(params))
}

/// Run a built SELECT expected to return one row.
pub fn sq_query_row<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<T>
where
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    let params: Vec<_> = values.iter().map(to_sql_value).collect();
    conn.query_row(&sql, rusqlite::params_from_iter(params), f)
}

/// Run a built SELECT and collect all rows. Rows that fail to map are
/// dropped (matching the row-scan behavior elsewhere in the tree).
pub fn sq_query_map<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    let params: Vec<_> = values.iter().map(to_sql_value).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), f)?
        .filter_map(|r| r.ok())
        .collect();
    Ok(rows)
}

// ── Row mappers ─────────────────────────────────────────────────────────────
// Column order follows the *_COLUMNS constants in trailpack_api::db.

/// Map a `USER_COLUMNS` row (password fields at the tail are ignored).
pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        provider_uid: row.get(4)?,
        role: row.get(5)?,
        is_certified_guide: row.get(6)?,
        profile_image: row.get(7)?,
        preferred_weather: row.get(8)?,
        preferred_weight: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Stored password hash/salt from a `USER_COLUMNS` row.
pub fn credentials_from_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(Option<String>, Option<String>)> {
    Ok((row.get(11)?, row.get(12)?))
}

pub fn pack_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PackSummary> {
    Ok(PackSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        is_public: row.get(3)?,
        total_weight: row.get(4)?,
        total_score: row.get(5)?,
        favorites_count: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemResponse> {
    Ok(ItemResponse {
        id: row.get(0)?,
        name: row.get(1)?,
        weight: row.get(2)?,
        quantity: row.get(3)?,
        unit: row.get(4)?,
        global: row.get(5)?,
        owner_id: row.get(6)?,
        category: row.get(7)?,
    })
}

/// Map a `TRIP_COLUMNS` row (`geojson_id` at index 10 is read separately
/// by the detail handler).
pub fn trip_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TripSummary> {
    Ok(TripSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        duration: row.get(3)?,
        weather: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        destination: row.get(7)?,
        owner_id: row.get(8)?,
        is_public: row.get(9)?,
        created_at: row.get(11)?,
    })
}

pub fn template_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateResponse> {
    let kind: String = row.get(1)?;
    Ok(TemplateResponse {
        id: row.get(0)?,
        kind: TemplateKind::parse(&kind).unwrap_or(TemplateKind::Pack),
        source_id: row.get(2)?,
        is_global: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn conversation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationResponse> {
    let history_json: String = row.get(2)?;
    let history: Vec<ConversationMessage> =
        serde_json::from_str(&history_json).unwrap_or_default();
    Ok(ConversationResponse {
        id: row.get(0)?,
        user_id: row.get(1)?,
        history,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailpack_api::db as dbq;

    #[test]
    fn migrations_apply_once_and_seed_categories() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        // Re-running is a no-op.
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM item_categories", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn built_statements_round_trip_through_the_bridge() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        sq_execute(
            &conn,
            dbq::users::insert_with_password("u1", "mallory", "m@example.com", "hash", "salt"),
        )
        .unwrap();

        let user = sq_query_row(&conn, dbq::users::get_by_id("u1"), user_from_row).unwrap();
        assert_eq!(user.username, "mallory");
        assert_eq!(user.email, "m@example.com");
        assert_eq!(user.role, "user");
        assert!(user.provider_uid.is_none());
    }

    #[test]
    fn file_backed_db_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = init_db(dir.path()).unwrap();
            let conn = db.conn();
            sq_execute(
                &conn,
                dbq::users::insert_with_password("u1", "a", "a@example.com", "h", "s"),
            )
            .unwrap();
        }

        let db = init_db(dir.path()).unwrap();
        let conn = db.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn unique_email_rejects_duplicates() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        sq_execute(
            &conn,
            dbq::users::insert_with_password("u1", "a", "same@example.com", "h", "s"),
        )
        .unwrap();
        let err = sq_execute(
            &conn,
            dbq::users::insert_with_password("u2", "b", "same@example.com", "h", "s"),
        )
        .unwrap_err();
        match err {
            rusqlite::Error::SqliteFailure(e, _) => {
                assert_eq!(e.code, rusqlite::ErrorCode::ConstraintViolation)
            }
            other => panic!("expected constraint violation, got {other}"),
        }
    }
}
