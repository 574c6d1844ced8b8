//! Attribute scoring bounded context.
//!
//! Turns submitted choices into durable per-player attribute totals,
//! administers the choice/attribute effect catalog, registers players and
//! answers the dashboard's aggregate queries.

pub mod application;
pub mod domain;
