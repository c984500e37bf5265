//! Unlock schedules
//!
//! A schedule is one linear vesting tranche for a (source, token) pair,
//! releasing `initial_locked` over `duration` seconds starting at
//! `start_time`. A source may carry several sequential tranches; the vesting
//! curve sums them order-independently. Schedules are immutable once
//! observed.

use crate::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSchedule {
    /// Total tokens released by this tranche over its full duration
    pub initial_locked: Amount,
    /// Unlock start (unix seconds)
    pub start_time: Timestamp,
    /// Unlock end (unix seconds); informational, the cap is `initial_locked`
    pub end_time: Timestamp,
    /// Unlock duration in seconds
    pub duration: u64,
}

impl UnlockSchedule {
    /// A schedule is well formed when it has a positive duration and a
    /// coherent time range.
    pub fn is_well_formed(&self) -> bool {
        self.duration > 0 && self.end_time > self.start_time
    }
}
