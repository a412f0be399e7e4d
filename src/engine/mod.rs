//! Inference engine.
//!
//! Responsibilities:
//!
//! - derive primary fuzzy degrees from crisp inputs (`fuzzify`)
//! - fire the ordered rule table, including AND rules (`rules`)
//! - aggregate contributions into an allocation and ranked reasons (`aggregate`)

pub mod aggregate;
pub mod fuzzify;
pub mod rules;

pub use aggregate::*;
pub use fuzzify::*;
pub use rules::*;
