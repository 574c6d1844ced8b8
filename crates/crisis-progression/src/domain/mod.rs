//! Domain layer for the progression context.

pub mod commands;
pub mod session;
