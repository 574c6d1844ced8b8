//! Scenario pack authoring and import.
//!
//! Scenario packs are YAML documents describing attributes, levels,
//! scenarios, choices and their attribute effects. They are parsed and
//! validated here, then written to the catalog in a single transaction.

#![warn(missing_docs)]

pub mod application;
pub mod domain;
