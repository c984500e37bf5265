//! Merit vesting curve
//!
//! Pure functions computing how many tokens a set of linear unlock
//! schedules has released by a point in time, and the delta released inside
//! a time window. No side effects, no external reads.

pub mod curve;
pub mod errors;

pub use curve::*;
pub use errors::*;
