//! Domain layer for the scoring context.

pub mod commands;
pub mod registration;
