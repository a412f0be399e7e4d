//! `fuzzy-alloc` library crate.
//!
//! The binary (`alloc`) is a thin wrapper around this library so that:
//!
//! - the inference pipeline is testable without spawning processes
//! - batch callers can run many scenarios against one policy table in-process
//! - presentation (text, JSON) stays separate from the engine

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod io;
pub mod policy;
pub mod report;
