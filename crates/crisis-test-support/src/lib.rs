//! Shared test doubles and utilities for the crisis-drill game backend.

mod clock;
mod failing;
mod fixture;
mod memory;

pub use clock::{FixedClock, fixed_now};
pub use failing::FailingGameStore;
pub use fixture::GameFixture;
pub use memory::InMemoryGameStore;
