//! Merit reward ledger
//!
//! Mutable accumulator for one cycle's grants and the pure cross-cycle
//! cumulative merge, plus the single post-merge dust filter and the
//! conservation verifier used on the alert path.

pub mod errors;
pub mod ledger;
pub mod verify;

pub use errors::*;
pub use ledger::*;
pub use verify::*;
