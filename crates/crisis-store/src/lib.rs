//! PostgreSQL storage for the Crisis Drill game.
//!
//! [`pg_game_store::PgGameStore`] implements every repository trait from
//! `crisis-core` over a single connection pool. Queries are checked at
//! runtime so the crate builds without a live database.

pub mod pg_game_store;
pub mod schema;
