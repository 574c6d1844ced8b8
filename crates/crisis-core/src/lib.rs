//! Shared domain model and abstractions for Crisis Drill.
//!
//! This crate defines the entities, error taxonomy and storage traits that
//! the progression and scoring engines depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod model;
pub mod policy;
pub mod repository;
