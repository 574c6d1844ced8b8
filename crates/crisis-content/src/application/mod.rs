//! Application layer for the content context.

pub mod command_handlers;
