//! Domain layer for the content context.

pub mod commands;
pub mod pack;
