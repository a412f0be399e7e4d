//! Input/output helpers.
//!
//! - crisp input and scenario files (`inputs`)
//! - JSON result exports (`export`)

pub mod export;
pub mod inputs;

pub use export::*;
pub use inputs::*;
