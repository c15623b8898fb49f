//! Exact decimal money amounts in Mexican pesos.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in MXN.
///
/// Arithmetic is exact (`rust_decimal`), so `1999.99 * 2` is `3999.98` and
/// never `3999.9799999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from whole centavos, e.g. `from_centavos(199_999)` is `$1,999.99`.
    #[must_use]
    pub fn from_centavos(centavos: i64) -> Self {
        Self(Decimal::new(centavos, 2))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format in the es-MX currency style: `$1,999.99`, `-$12.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.0.round_dp(2);
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}${grouped}.{cents}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use super::*;

    fn mxn(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(mxn("1999.99").display(), "$1,999.99");
        assert_eq!(mxn("1234567.5").display(), "$1,234,567.50");
        assert_eq!(mxn("999").display(), "$999.00");
        assert_eq!(Money::ZERO.display(), "$0.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(mxn("-12.5").display(), "-$12.50");
    }

    #[test]
    fn test_multiplication_is_exact() {
        assert_eq!(mxn("1999.99") * 2, mxn("3999.98"));
    }

    #[test]
    fn test_sum() {
        let total: Money = [mxn("0.10"), mxn("0.20")].into_iter().sum();
        assert_eq!(total, mxn("0.30"));
    }

    #[test]
    fn test_from_centavos() {
        assert_eq!(Money::from_centavos(199_999), mxn("1999.99"));
    }
}
