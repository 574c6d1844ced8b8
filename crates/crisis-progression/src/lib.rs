//! Scenario progression bounded context.
//!
//! Walks one player through the ordered scenarios of a level: shows the
//! current scenario, adjudicates a submitted choice and advances until the
//! sequence is exhausted.

pub mod application;
pub mod domain;
pub mod media;
