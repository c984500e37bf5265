//! Cumulative release math for linear unlock schedules

use crate::VestingError;
use merit_types::{mul_div_floor, Amount, Timestamp, UnlockSchedule};

/// Tokens released by `schedules` up to and including time `t`.
///
/// Each schedule contributes zero before its start time and at most
/// `initial_locked` no matter how far `t` runs past its end. The sum is
/// order-independent, so providers may return schedules in any order.
pub fn cumulative_released(
    schedules: &[UnlockSchedule],
    t: Timestamp,
) -> Result<Amount, VestingError> {
    validate(schedules)?;

    let mut total: Amount = 0;
    for schedule in schedules {
        total = total.saturating_add(released_by(schedule, t));
    }
    Ok(total)
}

/// Tokens released inside the half-open window `(t0, t1]`.
///
/// `t1 < t0` is a fatal precondition violation, never clamped: a negative
/// window would silently un-distribute value.
pub fn distributed_in_range(
    schedules: &[UnlockSchedule],
    t0: Timestamp,
    t1: Timestamp,
) -> Result<Amount, VestingError> {
    if t1 < t0 {
        return Err(VestingError::InvalidRange { t0, t1 });
    }
    let end = cumulative_released(schedules, t1)?;
    let start = cumulative_released(schedules, t0)?;
    // cumulative_released is monotone in t, so this cannot underflow
    Ok(end - start)
}

fn released_by(schedule: &UnlockSchedule, t: Timestamp) -> Amount {
    if t < schedule.start_time {
        return 0;
    }
    let elapsed = t - schedule.start_time;
    // An overflowing quotient already exceeds the cap
    match mul_div_floor(
        schedule.initial_locked,
        elapsed as u128,
        schedule.duration as u128,
    ) {
        Some(released) => released.min(schedule.initial_locked),
        None => schedule.initial_locked,
    }
}

fn validate(schedules: &[UnlockSchedule]) -> Result<(), VestingError> {
    for (index, schedule) in schedules.iter().enumerate() {
        if !schedule.is_well_formed() {
            return Err(VestingError::MalformedSchedule { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schedule(initial: Amount, start: Timestamp, duration: u64) -> UnlockSchedule {
        UnlockSchedule {
            initial_locked: initial,
            start_time: start,
            end_time: start + duration,
            duration,
        }
    }

    #[test]
    fn zero_before_start() {
        let s = [schedule(4000, 100, 1000)];
        assert_eq!(cumulative_released(&s, 0).unwrap(), 0);
        assert_eq!(cumulative_released(&s, 99).unwrap(), 0);
    }

    #[test]
    fn linear_within_window() {
        let s = [schedule(4000, 0, 1000)];
        assert_eq!(cumulative_released(&s, 500).unwrap(), 2000);
        assert_eq!(cumulative_released(&s, 250).unwrap(), 1000);
    }

    #[test]
    fn capped_after_duration() {
        let s = [schedule(4000, 0, 1000)];
        assert_eq!(cumulative_released(&s, 1000).unwrap(), 4000);
        assert_eq!(cumulative_released(&s, 10_000).unwrap(), 4000);
        assert_eq!(cumulative_released(&s, u64::MAX).unwrap(), 4000);
    }

    #[test]
    fn sums_multiple_tranches() {
        let s = [schedule(1000, 0, 100), schedule(500, 200, 100)];
        assert_eq!(cumulative_released(&s, 50).unwrap(), 500);
        assert_eq!(cumulative_released(&s, 150).unwrap(), 1000);
        assert_eq!(cumulative_released(&s, 250).unwrap(), 1250);
        assert_eq!(cumulative_released(&s, 300).unwrap(), 1500);
    }

    #[test]
    fn range_delta() {
        let s = [schedule(4000, 0, 1000)];
        assert_eq!(distributed_in_range(&s, 0, 500).unwrap(), 2000);
        assert_eq!(distributed_in_range(&s, 500, 500).unwrap(), 0);
    }

    #[test]
    fn inverted_range_is_fatal() {
        let s = [schedule(4000, 0, 1000)];
        assert_eq!(
            distributed_in_range(&s, 500, 100),
            Err(VestingError::InvalidRange { t0: 500, t1: 100 })
        );
    }

    #[test]
    fn malformed_schedule_rejected() {
        let bad = UnlockSchedule {
            initial_locked: 100,
            start_time: 0,
            end_time: 100,
            duration: 0,
        };
        assert_eq!(
            cumulative_released(&[bad], 50),
            Err(VestingError::MalformedSchedule { index: 0 })
        );
    }

    proptest! {
        // distributed_in_range(t0, t2) == distributed_in_range(t0, t1) + distributed_in_range(t1, t2)
        #[test]
        fn range_is_additive(initial in 1u128..=1_000_000_000,
                             start in 0u64..=10_000,
                             duration in 1u64..=10_000,
                             mut cuts in prop::array::uniform3(0u64..=50_000)) {
            cuts.sort_unstable();
            let [t0, t1, t2] = cuts;
            let s = [schedule(initial, start, duration)];
            let whole = distributed_in_range(&s, t0, t2).unwrap();
            let left = distributed_in_range(&s, t0, t1).unwrap();
            let right = distributed_in_range(&s, t1, t2).unwrap();
            prop_assert_eq!(whole, left + right);
        }

        #[test]
        fn never_exceeds_initial(initial in 1u128..=1_000_000_000,
                                 start in 0u64..=10_000,
                                 duration in 1u64..=10_000,
                                 t in 0u64..=100_000) {
            let s = [schedule(initial, start, duration)];
            prop_assert!(cumulative_released(&s, t).unwrap() <= initial);
        }
    }
}
