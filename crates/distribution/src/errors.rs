use merit_types::RatioError;
use merit_vesting::VestingError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistributionError {
    #[error(transparent)]
    Vesting(#[from] VestingError),
    #[error(transparent)]
    Ratio(#[from] RatioError),
    #[error("weight arithmetic overflow for source {source_id}")]
    WeightOverflow { source_id: String },
    #[error("per-address amount overflow for source {source_id}")]
    AmountOverflow { source_id: String },
}
