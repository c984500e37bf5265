//! Merit distribution engine
//!
//! Turns a balance snapshot, a set of unlock schedules and a time window
//! into per-address reward deltas for one source and one cycle. Floor
//! rounding remainders are tracked on the result, never redistributed or
//! dropped.

pub mod allocation;
pub mod engine;
pub mod errors;

pub use allocation::*;
pub use engine::*;
pub use errors::*;
