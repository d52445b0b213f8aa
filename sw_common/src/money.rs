use std::{fmt::Display, iter::Sum, ops::Add};

use serde::{Deserialize, Serialize};
use sqlx::Type;

pub const DEFAULT_CURRENCY_CODE: &str = "VND";

//--------------------------------------        Money         ---------------------------------------------------------
/// An amount of money, stored in minor currency units (e.g. cents). Seat prices and payment totals are always summed
/// as integers so that a payment amount never drifts from the sum of its seat prices.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Money(i64);

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Money::from(12_050).to_string(), "120.50");
        assert_eq!(Money::from(7).to_string(), "0.07");
        assert_eq!(Money::from(-150).to_string(), "-1.50");
        assert_eq!(Money::from(300).to_string(), "3.00");
    }

    #[test]
    fn sums() {
        let prices = vec![Money::from(500), Money::from(750), Money::from(1_250)];
        let total: Money = prices.iter().sum();
        assert_eq!(total, Money::from(2_500));
        let owned: Money = prices.into_iter().sum();
        assert_eq!(owned, total);
        assert_eq!(Money::from(10) + Money::from(-3), Money::from(7));
        assert_eq!(Vec::<Money>::new().iter().sum::<Money>(), Money::default());
    }

    #[test]
    fn serializes_as_minor_units() {
        let json = serde_json::to_string(&Money::from(1_999)).unwrap();
        assert_eq!(json, "1999");
        let back: Money = serde_json::from_str("1999").unwrap();
        assert_eq!(back.value(), 1_999);
    }
}
