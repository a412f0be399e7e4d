//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - variable identifiers (`CrispVar`, `FuzzyVar`) and the `Asset` tag
//! - rule outputs (`Contribution`, `Reason`)
//! - the aggregated `Allocation`

pub mod types;

pub use types::*;
