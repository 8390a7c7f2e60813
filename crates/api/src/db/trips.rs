//! Trip query builders.

use sea_query::{Cond, Expr, Order, Query, SqliteQueryBuilder};

use super::tables::Trips;
use super::Built;

/// Column order shared by every trip SELECT.
pub const TRIP_COLUMNS: [Trips; 12] = [
    Trips::Id,
    Trips::Name,
    Trips::Description,
    Trips::Duration,
    Trips::Weather,
    Trips::StartDate,
    Trips::EndDate,
    Trips::Destination,
    Trips::OwnerId,
    Trips::IsPublic,
    Trips::GeojsonId,
    Trips::CreatedAt,
];

// ── Queries ─────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn insert(
    id: &str,
    name: &str,
    description: Option<&str>,
    duration: Option<&str>,
    weather: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    destination: Option<&str>,
    owner_id: &str,
    is_public: bool,
    geojson_id: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(Trips::Table)
        .columns([
            Trips::Id,
            Trips::Name,
            Trips::Description,
            Trips::Duration,
            Trips::Weather,
            Trips::StartDate,
            Trips::EndDate,
            Trips::Destination,
            Trips::OwnerId,
            Trips::IsPublic,
            Trips::GeojsonId,
        ])
        .values_panic([
            id.into(),
            name.into(),
            description.map(|s| s.to_string()).into(),
            duration.map(|s| s.to_string()).into(),
            weather.map(|s| s.to_string()).into(),
            start_date.map(|s| s.to_string()).into(),
            end_date.map(|s| s.to_string()).into(),
            destination.map(|s| s.to_string()).into(),
            owner_id.into(),
            is_public.into(),
            geojson_id.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_by_id(id: &str) -> Built {
    Query::select()
        .columns(TRIP_COLUMNS)
        .from(Trips::Table)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// Trips visible to `viewer`: public ones plus their own.
pub fn list_visible(viewer_id: Option<&str>) -> Built {
    let mut q = Query::select()
        .columns(TRIP_COLUMNS)
        .from(Trips::Table)
        .to_owned();

    match viewer_id {
        Some(viewer) => {
            q.cond_where(
                Cond::any()
                    .add(Expr::col(Trips::IsPublic).eq(true))
                    .add(Expr::col(Trips::OwnerId).eq(viewer)),
            );
        }
        None => {
            q.and_where(Expr::col(Trips::IsPublic).eq(true));
        }
    }

    q.order_by(Trips::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// All trips owned by a user (for populating user records).
pub fn list_by_owner(owner_id: &str) -> Built {
    Query::select()
        .columns(TRIP_COLUMNS)
        .from(Trips::Table)
        .and_where(Expr::col(Trips::OwnerId).eq(owner_id))
        .order_by(Trips::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

// ── Updates ─────────────────────────────────────────────────────────────────

pub fn update_name(id: &str, name: &str) -> Built {
    Query::update()
        .table(Trips::Table)
        .value(Trips::Name, name)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_description(id: &str, description: &str) -> Built {
    Query::update()
        .table(Trips::Table)
        .value(Trips::Description, description)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_duration(id: &str, duration: &str) -> Built {
    Query::update()
        .table(Trips::Table)
        .value(Trips::Duration, duration)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_weather(id: &str, weather: &str) -> Built {
    Query::update()
        .table(Trips::Table)
        .value(Trips::Weather, weather)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_dates(id: &str, start_date: Option<&str>, end_date: Option<&str>) -> Built {
    let mut q = Query::update().table(Trips::Table).to_owned();
    if let Some(start) = start_date {
        q.value(Trips::StartDate, start);
    }
    if let Some(end) = end_date {
        q.value(Trips::EndDate, end);
    }
    q.and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_destination(id: &str, destination: &str) -> Built {
    Query::update()
        .table(Trips::Table)
        .value(Trips::Destination, destination)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_visibility(id: &str, is_public: bool) -> Built {
    Query::update()
        .table(Trips::Table)
        .value(Trips::IsPublic, is_public)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}

// ── Deletes ─────────────────────────────────────────────────────────────────

pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Trips::Table)
        .and_where(Expr::col(Trips::Id).eq(id))
        .build(SqliteQueryBuilder)
}
