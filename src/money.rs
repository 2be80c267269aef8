//! Conversion between the decimal amounts the API speaks and the integer
//! minor units (cents) the database stores.

use thiserror::Error;

const MINOR_PER_MAJOR: f64 = 100.0;
/// Largest amount accepted from a client, in major units.
const MAX_MAJOR: f64 = 10_000_000_000_000.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount must be positive")]
    NotPositive,
    #[error("amount is smaller than one cent")]
    BelowOneCent,
    #[error("amount is too large")]
    TooLarge,
}

/// Scales a client amount by 100 and rounds it to whole cents.
pub fn to_minor_units(major: f64) -> Result<i64, AmountError> {
    if !major.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if major <= 0.0 {
        return Err(AmountError::NotPositive);
    }
    if major > MAX_MAJOR {
        return Err(AmountError::TooLarge);
    }
    let minor = (major * MINOR_PER_MAJOR).round() as i64;
    if minor < 1 {
        return Err(AmountError::BelowOneCent);
    }
    Ok(minor)
}

pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_PER_MAJOR
}
