use std::{fmt, str::FromStr};

use thiserror::Error;

/// 1 micro is the minimal unit of value
/// 1 unit = 10^6 micros
pub const MICROS_PER_UNIT: u64 = 1_000_000;
// 10 ^ AMOUNT_DECIMAL_PLACES
/// Number of decimal places used in the string representation of an amount.
pub const AMOUNT_DECIMAL_PLACES: u8 = 6;

/// Unit of value carried by a transaction.
///
/// Stored as an integer number of micros so that sums and comparisons are exact.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

/// Errors when parsing the decimal representation of an `Amount`
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("amount can not be negative: {0}")]
    Negative(String),
    #[error("invalid decimal amount: {0:?}")]
    InvalidDigit(String),
    #[error("amount {0} has more than {max} decimal places", max = AMOUNT_DECIMAL_PLACES)]
    TooManyDecimals(String),
    #[error("amount {0} is too large")]
    Overflow(String),
}

impl Amount {
    /// Create from whole units, if it fits
    #[inline]
    pub fn from_units(units: u64) -> Option<Self> {
        units.checked_mul(MICROS_PER_UNIT).map(Self)
    }

    /// Create from micros
    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Retrieve the micros value within.
    #[inline]
    pub fn micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Return integer and fractional part, useful for pretty printing
    pub fn units_and_micros(self) -> (u64, u64) {
        (self.0 / MICROS_PER_UNIT, self.0 % MICROS_PER_UNIT)
    }
}

/// Canonical decimal form: no trailing zeros in the fractional part, and no decimal point at all
/// for whole amounts.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (units, micros) = self.units_and_micros();
        if micros == 0 {
            return write!(f, "{}", units);
        }

        let width = usize::from(AMOUNT_DECIMAL_PLACES);
        let fraction = format!("{:0width$}", micros, width = width);

        write!(f, "{}.{}", units, fraction.trim_end_matches('0'))
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if s.starts_with('-') {
            return Err(AmountParseError::Negative(s.to_string()));
        }

        let invalid = || AmountParseError::InvalidDigit(s.to_string());
        let (units, fraction) = match s.split_once('.') {
            Some((_, "")) => return Err(invalid()),
            Some((units, fraction)) => (units, fraction),
            None => (s, ""),
        };
        let all_digits = |x: &str| x.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid());
        }
        if fraction.len() > usize::from(AMOUNT_DECIMAL_PLACES) {
            return Err(AmountParseError::TooManyDecimals(s.to_string()));
        }

        let overflow = || AmountParseError::Overflow(s.to_string());
        let units: u64 = units.parse().map_err(|_| overflow())?;
        let micros: u64 = if fraction.is_empty() {
            0
        } else {
            let width = usize::from(AMOUNT_DECIMAL_PLACES);
            format!("{:0<width$}", fraction, width = width)
                .parse()
                .map_err(|_| invalid())?
        };

        Amount::from_units(units)
            .and_then(|amount| amount.checked_add(Amount(micros)))
            .ok_or_else(overflow)
    }
}
