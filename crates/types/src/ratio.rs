//! Exact rational scalars
//!
//! Weight ratios, boost multipliers and allocation splits are carried as
//! integer fractions and applied with floor semantics through big-integer
//! intermediates, so the committed ledger never sees a float.

use crate::Amount;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatioError {
    #[error("ratio denominator must be non-zero")]
    ZeroDenominator,
    #[error("ratio {numer}/{denom} exceeds one, complement undefined")]
    ComplementOfImproper { numer: u128, denom: u128 },
    #[error("amount overflow applying {numer}/{denom} to {amount}")]
    Overflow {
        amount: u128,
        numer: u128,
        denom: u128,
    },
}

/// An exact non-negative rational, `numer / denom`.
///
/// Deserialization goes through [`Ratio::new`], so a zero denominator can
/// not arrive via a config or fixture file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRatio")]
pub struct Ratio {
    numer: u128,
    denom: u128,
}

#[derive(Deserialize)]
struct RawRatio {
    numer: u128,
    denom: u128,
}

impl TryFrom<RawRatio> for Ratio {
    type Error = RatioError;

    fn try_from(raw: RawRatio) -> Result<Self, Self::Error> {
        Ratio::new(raw.numer, raw.denom)
    }
}

impl Ratio {
    /// Create a ratio; the denominator must be non-zero.
    pub fn new(numer: u128, denom: u128) -> Result<Self, RatioError> {
        if denom == 0 {
            return Err(RatioError::ZeroDenominator);
        }
        Ok(Self { numer, denom })
    }

    /// The multiplicative identity, `1/1`.
    pub fn one() -> Self {
        Self { numer: 1, denom: 1 }
    }

    pub fn numer(&self) -> u128 {
        self.numer
    }

    pub fn denom(&self) -> u128 {
        self.denom
    }

    /// `floor(amount * numer / denom)`.
    pub fn apply(&self, amount: Amount) -> Result<Amount, RatioError> {
        mul_div_floor(amount, self.numer, self.denom).ok_or(RatioError::Overflow {
            amount,
            numer: self.numer,
            denom: self.denom,
        })
    }

    /// `1 - self`, defined only for ratios at most one.
    pub fn complement(&self) -> Result<Self, RatioError> {
        if self.numer > self.denom {
            return Err(RatioError::ComplementOfImproper {
                numer: self.numer,
                denom: self.denom,
            });
        }
        Ok(Self {
            numer: self.denom - self.numer,
            denom: self.denom,
        })
    }

    /// True for `n/n` ratios (identity multipliers).
    pub fn is_one(&self) -> bool {
        self.numer == self.denom
    }
}

/// `floor(a * b / d)` without intermediate overflow.
///
/// Returns `None` when `d` is zero or the quotient does not fit in `u128`.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let product = BigUint::from(a) * BigUint::from(b);
    (product / BigUint::from(d)).to_u128()
}
