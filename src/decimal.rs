use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// Money type with cent precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    /// largest representable amount; sums saturate here
    pub const MAX: Money = Money(Decimal::MAX);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(2))
    }

    /// create from decimal, dropping any fraction of a cent
    pub fn from_decimal_floor(d: Decimal) -> Self {
        Money(d.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(2)))
    }

    /// create from integer amount (dollars, euros, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from cents
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// create from a float as delivered by ui/json layers.
    /// nan and infinities collapse to zero
    pub fn from_f64_lossy(value: f64) -> Self {
        if !value.is_finite() {
            return Money::ZERO;
        }
        Decimal::from_f64(value)
            .map(Money::from_decimal)
            .unwrap_or(Money::ZERO)
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// check if strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// check if strictly below zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// clamp negatives to zero
    pub fn non_negative(self) -> Self {
        self.max(Money::ZERO)
    }

    /// subtraction that floors at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).non_negative()
    }

    /// this amount as a percentage of `whole`, zero when `whole` is not positive.
    /// saturates at the decimal range instead of overflowing
    pub fn percent_of(&self, whole: Money) -> Decimal {
        if !whole.is_positive() {
            return Decimal::ZERO;
        }
        match self.0.checked_div(whole.0) {
            Some(ratio) => ratio.saturating_mul(Decimal::ONE_HUNDRED),
            None if self.is_negative() => Decimal::MIN,
            None => Decimal::MAX,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0).round_dp(2))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).round_dp(2))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        *self = *self - other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

/// rate type for aprs and other annual ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::ONE_HUNDRED)
    }

    /// create from a fractional percentage (e.g., 24.99 for 24.99%)
    pub fn from_percentage_decimal(p: Decimal) -> Self {
        Rate(p / Decimal::ONE_HUNDRED)
    }

    /// create from a float percentage; nan, infinities and negatives become zero
    pub fn from_percentage_f64_lossy(p: f64) -> Self {
        if !p.is_finite() || p < 0.0 {
            return Rate::ZERO;
        }
        Decimal::from_f64(p)
            .map(Rate::from_percentage_decimal)
            .unwrap_or(Rate::ZERO)
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }

    /// clamp negatives to zero
    pub fn non_negative(self) -> Self {
        Rate(self.0.max(Decimal::ZERO))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.125").unwrap();
        assert_eq!(m.to_string(), "100.12"); // banker's rounding to cents

        let floor = Money::from_decimal_floor(dec!(100.129));
        assert_eq!(floor, Money::from_cents(10012));
    }

    #[test]
    fn test_lossy_float_inputs() {
        assert_eq!(Money::from_f64_lossy(f64::NAN), Money::ZERO);
        assert_eq!(Money::from_f64_lossy(f64::INFINITY), Money::ZERO);
        assert_eq!(Money::from_f64_lossy(1250.5), Money::from_cents(125050));

        assert_eq!(Rate::from_percentage_f64_lossy(f64::NEG_INFINITY), Rate::ZERO);
        assert_eq!(Rate::from_percentage_f64_lossy(-3.0), Rate::ZERO);
        assert_eq!(Rate::from_percentage_f64_lossy(25.0), Rate::from_percentage(25));
    }

    #[test]
    fn test_percent_of() {
        let balance = Money::from_major(2_500);
        assert_eq!(balance.percent_of(Money::from_major(10_000)), dec!(25));

        // no limit means no utilization
        assert_eq!(balance.percent_of(Money::ZERO), Decimal::ZERO);
        assert_eq!(balance.percent_of(Money::from_major(-100)), Decimal::ZERO);
    }

    #[test]
    fn test_percent_of_saturates() {
        let huge = Money::from_decimal(Decimal::MAX / dec!(1000));
        assert_eq!(huge.percent_of(Money::from_cents(1)), Decimal::MAX);

        let owed = Money::from_decimal(Decimal::MIN / dec!(1000));
        assert_eq!(owed.percent_of(Money::from_cents(1)), Decimal::MIN);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let half = Money::from_decimal(Decimal::MAX / dec!(2));
        let total: Money = vec![half, half, half].into_iter().sum();
        assert_eq!(total, Money::MAX);

        let mut running = Money::MAX;
        running += Money::from_major(1);
        assert_eq!(running, Money::MAX);

        let floor = Money::from_decimal(Decimal::MIN) - Money::from_major(1);
        assert_eq!(floor, Money::from_decimal(Decimal::MIN));
    }

    #[test]
    fn test_saturating_sub_and_sum() {
        let a = Money::from_major(100);
        let b = Money::from_major(250);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_major(150));

        let total: Money = vec![a, b, Money::from_cents(5)].into_iter().sum();
        assert_eq!(total, Money::from_cents(35005));
    }

    #[test]
    fn test_rate_display() {
        let apr = Rate::from_percentage_decimal(dec!(24.99));
        assert_eq!(apr.as_decimal(), dec!(0.2499));
        assert_eq!(apr.to_string(), "24.99%");
    }
}
