//! Scenario inputs: named snapshots and seeded sensitivity sweeps.

pub mod scenarios;

pub use scenarios::*;
