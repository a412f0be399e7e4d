//! Fuzzification: membership functions and the variable stores they populate.

pub mod membership;
pub mod store;

pub use membership::*;
pub use store::*;
