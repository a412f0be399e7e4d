//! Policy tables (membership shapes, rule weights, labels).
//!
//! - table types, validation and the bundled reference calibration (`table`)
//! - TOML read/write and policy resolution (`load`)

pub mod load;
pub mod table;

pub use load::*;
pub use table::*;
