//! Fixed-point money in minor currency units.
//!
//! Quota amounts and payments are compared for "fully paid" with `>=`, so
//! they are kept as integer cents rather than `f64`. Conversion from decimal
//! major units happens once, at the edge (HTTP / CLI input), and is fallible:
//! anything that is not a finite number inside `[-MAX, MAX]` is rejected.
//!
//! There are no `+`/`-` operators; sums go through `checked_add` /
//! `checked_sum` so an overflowing total is an error, never a wrap or panic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in minor units (1.00 = `Cents(100)`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Largest single amount accepted on input (1 000 000 000.00).
    /// Summing even millions of maximal payments stays far inside `i64`.
    pub const MAX: Cents = Cents(100_000_000_000);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Cents(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Round a decimal major-unit amount to the nearest cent.
    pub fn try_from_major(amount: f64) -> Result<Self> {
        if !amount.is_finite() {
            return Err(Error::InvalidInput(format!("amount is not a number: {}", amount)));
        }

        let scaled = (amount * 100.0).round();
        if scaled.abs() > Cents::MAX.0 as f64 {
            return Err(Error::InvalidInput(format!(
                "amount {} exceeds the maximum of {}",
                amount,
                Cents::MAX
            )));
        }
        Ok(Cents(scaled as i64))
    }

    /// Test shorthand for literal amounts
    #[cfg(test)]
    pub fn from_major(amount: f64) -> Self {
        Self::try_from_major(amount).expect("literal amount in range")
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    /// Total of `amounts`, or `None` when it leaves the `i64` range
    pub fn checked_sum<I>(amounts: I) -> Option<Cents>
    where
        I: IntoIterator<Item = Cents>,
    {
        amounts
            .into_iter()
            .try_fold(Cents::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Accept a caller-supplied amount: strictly positive and at most `MAX`
    pub fn check_amount(self, what: &str) -> Result<Cents> {
        if !self.is_positive() {
            return Err(Error::InvalidInput(format!(
                "{} must be positive, got {}",
                what, self
            )));
        }
        if self > Cents::MAX {
            return Err(Error::InvalidInput(format!(
                "{} must not exceed {}, got {}",
                what,
                Cents::MAX,
                self
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_nearest_cent() {
        assert_eq!(Cents::try_from_major(1000.0).unwrap(), Cents::new(100_000));
        assert_eq!(Cents::try_from_major(0.1 + 0.2).unwrap(), Cents::new(30));
        assert_eq!(Cents::try_from_major(19.999).unwrap(), Cents::new(2000));
    }

    #[test]
    fn test_from_major_rejects_out_of_range_and_non_finite() {
        assert!(matches!(Cents::try_from_major(1e300), Err(Error::InvalidInput(_))));
        assert!(matches!(Cents::try_from_major(-1e300), Err(Error::InvalidInput(_))));
        assert!(matches!(Cents::try_from_major(f64::NAN), Err(Error::InvalidInput(_))));
        assert!(matches!(Cents::try_from_major(f64::INFINITY), Err(Error::InvalidInput(_))));

        assert_eq!(Cents::try_from_major(1_000_000_000.0).unwrap(), Cents::MAX);
        assert!(Cents::try_from_major(1_000_000_000.01).is_err());
    }

    #[test]
    fn test_checked_sum() {
        let parts = vec![Cents::from_major(333.33), Cents::from_major(333.33), Cents::from_major(333.34)];
        let total = Cents::checked_sum(parts).unwrap();
        assert_eq!(total, Cents::from_major(1000.0));
        assert!(total >= Cents::new(100_000));

        assert_eq!(Cents::checked_sum(Vec::new()), Some(Cents::ZERO));
        assert_eq!(Cents::checked_sum(vec![Cents::new(i64::MAX), Cents::new(1)]), None);
    }

    #[test]
    fn test_check_amount_bounds() {
        assert_eq!(Cents::new(1).check_amount("payment").unwrap(), Cents::new(1));
        assert_eq!(Cents::MAX.check_amount("payment").unwrap(), Cents::MAX);
        assert!(Cents::ZERO.check_amount("payment").is_err());
        assert!(Cents::new(-1).check_amount("payment").is_err());

        let err = Cents::new(Cents::MAX.raw() + 1).check_amount("payment").unwrap_err();
        assert!(err.to_string().contains("payment must not exceed"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cents::new(123_456).to_string(), "1234.56");
        assert_eq!(Cents::new(-5).to_string(), "-0.05");
        assert_eq!(Cents::ZERO.to_string(), "0.00");
    }
}
