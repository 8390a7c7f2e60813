//! Shared database schema, migrations, and query builders.

pub mod conversations;
pub mod geo;
pub mod items;
pub mod migrations;
pub mod packs;
pub mod tables;
pub mod templates;
pub mod trips;
pub mod users;

// Re-export tables for convenience
pub use tables::*;

/// A built statement: SQL text plus bind values.
pub type Built = (String, sea_query::Values);
