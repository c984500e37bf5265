use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VestingError {
    #[error("invalid range: t1={t1} precedes t0={t0}")]
    InvalidRange { t0: u64, t1: u64 },
    #[error("malformed schedule at index {index}: zero duration or inverted time range")]
    MalformedSchedule { index: usize },
}
