//! rf-core: Shared types and utilities for the slot machine crates
//!
//! This crate provides the error type and the time primitives used by the
//! simulation and its drivers.

mod error;
mod time;

pub use error::*;
pub use time::*;
