//! Merit core types
//!
//! Defines the shared data model for the rewards engine: account and token
//! identifiers with canonical ordering, fixed-point amounts, exact rational
//! scalars, unlock schedules, balance snapshots, published-root records and
//! the content-addressed claim file format.

pub mod address;
pub mod claim;
pub mod entry;
pub mod hashes;
pub mod ratio;
pub mod roots;
pub mod schedule;
pub mod snapshot;

pub use address::*;
pub use claim::*;
pub use entry::*;
pub use hashes::*;
pub use ratio::*;
pub use roots::*;
pub use schedule::*;
pub use snapshot::*;

/// Monetary amount in fixed-point token base units.
/// No floating point ever enters the committed ledger.
pub type Amount = u128;

/// Block height on the underlying chain.
pub type BlockNumber = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Reward cycle index (strictly increasing, immutable once accepted).
pub type Cycle = u64;

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
