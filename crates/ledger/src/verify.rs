//! Conservation checks between consecutive cumulative ledgers
//!
//! Run by both roles before committing a merged ledger. Any violation is a
//! fatal discrepancy surfaced for human review, never auto-corrected.

use crate::{DustReport, LedgerError, RewardLedger};

/// Check that `candidate` is a valid cumulative successor of `previous`:
/// every key is monotonically non-decreasing, and the total grew by exactly
/// `distributed` (the sum of emitted per-address amounts this cycle).
pub fn verify_cumulative(
    previous: &RewardLedger,
    candidate: &RewardLedger,
    distributed: u128,
) -> Result<(), LedgerError> {
    for (address, token, amount) in previous.amounts() {
        let current = candidate.amount_of(address, token);
        if current < amount {
            return Err(LedgerError::NonMonotonic {
                address: address.clone(),
                token: token.clone(),
                previous: amount,
                current,
            });
        }
    }

    let previous_total = previous.total_value().ok_or(LedgerError::TotalOverflow)?;
    let candidate_total = candidate.total_value().ok_or(LedgerError::TotalOverflow)?;
    let expected = previous_total
        .checked_add(distributed)
        .ok_or(LedgerError::TotalOverflow)?;
    if candidate_total != expected {
        return Err(LedgerError::TotalMismatch {
            expected,
            actual: candidate_total,
        });
    }
    Ok(())
}

/// Check that a dust pass removed exactly what it reported.
pub fn verify_dust(
    merged: &RewardLedger,
    filtered: &RewardLedger,
    report: &DustReport,
) -> Result<(), LedgerError> {
    let merged_total = merged.total_value().ok_or(LedgerError::TotalOverflow)?;
    let filtered_total = filtered.total_value().ok_or(LedgerError::TotalOverflow)?;
    let expected = filtered_total
        .checked_add(report.removed_value)
        .ok_or(LedgerError::TotalOverflow)?;
    if merged_total != expected {
        return Err(LedgerError::TotalMismatch {
            expected,
            actual: merged_total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge_cumulative;
    use merit_types::{Address, TokenId};

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn token(s: &str) -> TokenId {
        TokenId::new(s)
    }

    #[test]
    fn accepts_exact_successor() {
        let mut previous = RewardLedger::new(1);
        previous.credit(addr("0xa"), token("0xt"), 100).unwrap();
        let mut cycle = RewardLedger::new(2);
        cycle.credit(addr("0xa"), token("0xt"), 40).unwrap();
        cycle.credit(addr("0xb"), token("0xt"), 60).unwrap();

        let merged = merge_cumulative(&previous, &cycle, 2).unwrap();
        assert!(verify_cumulative(&previous, &merged, 100).is_ok());
    }

    #[test]
    fn rejects_decreased_entry() {
        let mut previous = RewardLedger::new(1);
        previous.credit(addr("0xa"), token("0xt"), 100).unwrap();
        let mut candidate = RewardLedger::new(2);
        candidate.credit(addr("0xa"), token("0xt"), 99).unwrap();

        assert!(matches!(
            verify_cumulative(&previous, &candidate, 0),
            Err(LedgerError::NonMonotonic { .. })
        ));
    }

    #[test]
    fn rejects_total_drift() {
        let previous = RewardLedger::new(1);
        let mut candidate = RewardLedger::new(2);
        candidate.credit(addr("0xa"), token("0xt"), 10).unwrap();

        assert_eq!(
            verify_cumulative(&previous, &candidate, 11),
            Err(LedgerError::TotalMismatch {
                expected: 11,
                actual: 10
            })
        );
    }

    #[test]
    fn dust_report_must_balance() {
        let mut merged = RewardLedger::new(2);
        merged.credit(addr("0xa"), token("0xt"), 5).unwrap();
        merged.credit(addr("0xb"), token("0xt"), 100).unwrap();

        let (filtered, report) = merged.filter_dust(5);
        assert!(verify_dust(&merged, &filtered, &report).is_ok());

        let fake = DustReport {
            threshold: 5,
            removed_entries: 1,
            removed_value: 4,
        };
        assert!(verify_dust(&merged, &filtered, &fake).is_err());
    }
}
