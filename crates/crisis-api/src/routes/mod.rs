//! Route modules organized by resource.

pub mod attributes;
pub mod choices;
pub mod content;
pub mod health;
pub mod levels;
pub mod players;
pub mod sessions;
pub mod stats;

#[cfg(test)]
mod testing;
