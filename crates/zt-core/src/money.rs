//! Currency amounts, the hourly rate, and the earnings formula.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Seconds in one hour.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// A currency amount held as whole cents.
///
/// Serialized as a decimal number (e.g. `2.5`) so stored documents stay
/// readable; sums are exact because they happen on cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Converts a decimal amount, rounding to the nearest cent.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rates are capped at HourlyRate::MAX; out-of-range casts saturate"
    )]
    pub fn from_amount(amount: f64) -> Self {
        Self((amount * 100.0).round() as i64)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// The amount as a decimal number.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "cents stay well inside f64's exact integer range"
    )]
    pub fn amount(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Money {
    type Output = Self;

    /// Saturates at the representable range instead of overflowing.
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.amount().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Ok(Self::from_amount(amount))
    }
}

/// Currency earned per hour of tracked time. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HourlyRate(f64);

impl HourlyRate {
    /// Rate used until the user picks one.
    pub const DEFAULT: Self = Self(100.0);

    /// Highest accepted rate. Keeps earnings for any realistic duration
    /// exact in cents.
    pub const MAX: Self = Self(1_000_000.0);

    /// Creates a rate, rejecting zero, negative, NaN and infinite values,
    /// and anything above [`HourlyRate::MAX`].
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::NonPositiveRate { value });
        }
        if value > Self::MAX.0 {
            return Err(ValidationError::RateTooHigh {
                value,
                max: Self::MAX.0,
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for HourlyRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for HourlyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for HourlyRate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| ValidationError::InvalidRate {
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl TryFrom<f64> for HourlyRate {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HourlyRate> for f64 {
    fn from(rate: HourlyRate) -> Self {
        rate.0
    }
}

impl Serialize for HourlyRate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HourlyRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Earnings for `duration_seconds` of tracked time at `rate`, rounded to
/// the cent: `round(duration / 3600 * rate, 2)`.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "durations are far below 2^52 seconds"
)]
pub fn earnings(duration_seconds: u64, rate: HourlyRate) -> Money {
    let hours = duration_seconds as f64 / SECONDS_PER_HOUR;
    Money::from_amount(hours * rate.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(value: f64) -> HourlyRate {
        HourlyRate::new(value).unwrap()
    }

    #[test]
    fn earnings_for_full_hour() {
        assert_eq!(earnings(3600, rate(100.0)), Money::from_cents(10_000));
    }

    #[test]
    fn earnings_for_ninety_seconds() {
        assert_eq!(earnings(90, rate(100.0)), Money::from_cents(250));
    }

    #[test]
    fn earnings_for_zero_duration() {
        assert_eq!(earnings(0, rate(100.0)), Money::ZERO);
        assert_eq!(earnings(0, rate(100.0)).to_string(), "0.00");
    }

    #[test]
    fn earnings_rounds_to_cents() {
        // 1s at 100/h is 0.02777...
        assert_eq!(earnings(1, rate(100.0)), Money::from_cents(3));
        // 10s at 33.33/h is 0.092583...
        assert_eq!(earnings(10, rate(33.33)), Money::from_cents(9));
    }

    #[test]
    fn earnings_matches_formula_over_range() {
        for rate_value in [0.5, 1.0, 7.25, 100.0, 1234.56] {
            for seconds in (0_u32..20_000).step_by(37) {
                let expected = (f64::from(seconds) / 3600.0 * rate_value * 100.0).round();
                let actual = earnings(u64::from(seconds), rate(rate_value));
                assert_eq!(actual.cents(), expected as i64, "{seconds}s at {rate_value}");
            }
        }
    }

    #[test]
    fn hourly_rate_rejects_non_positive() {
        assert!(HourlyRate::new(0.0).is_err());
        assert!(HourlyRate::new(-5.0).is_err());
        assert!(HourlyRate::new(f64::NAN).is_err());
        assert!(HourlyRate::new(f64::INFINITY).is_err());
        assert!(HourlyRate::new(0.01).is_ok());
    }

    #[test]
    fn hourly_rate_rejects_above_max() {
        assert_eq!(HourlyRate::new(1_000_000.0).unwrap(), HourlyRate::MAX);
        assert!(matches!(
            HourlyRate::new(1_000_000.01),
            Err(ValidationError::RateTooHigh { .. })
        ));
        assert!(matches!(
            "1e300".parse::<HourlyRate>(),
            Err(ValidationError::RateTooHigh { .. })
        ));
    }

    #[test]
    fn money_addition_saturates() {
        let near_max = Money::from_cents(i64::MAX - 1);
        assert_eq!(near_max + Money::from_cents(5), Money::from_cents(i64::MAX));
        let total: Money = [near_max, near_max].into_iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
    }

    #[test]
    fn hourly_rate_from_str() {
        assert_eq!("42.5".parse::<HourlyRate>().unwrap(), rate(42.5));
        assert!(matches!(
            "abc".parse::<HourlyRate>(),
            Err(ValidationError::InvalidRate { .. })
        ));
        assert!(matches!(
            "-1".parse::<HourlyRate>(),
            Err(ValidationError::NonPositiveRate { .. })
        ));
    }

    #[test]
    fn hourly_rate_serde_rejects_zero() {
        let result: Result<HourlyRate, _> = serde_json::from_str("0");
        assert!(result.is_err());
        let parsed: HourlyRate = serde_json::from_str("80.5").unwrap();
        assert_eq!(parsed, rate(80.5));
    }

    #[test]
    fn money_display_pads_cents() {
        assert_eq!(Money::from_cents(250).to_string(), "2.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-125).to_string(), "-1.25");
    }

    #[test]
    fn money_sum_is_exact() {
        let total: Money = std::iter::repeat_n(Money::from_cents(10), 1000).sum();
        assert_eq!(total, Money::from_cents(10_000));
    }

    #[test]
    fn money_serializes_as_decimal() {
        let json = serde_json::to_string(&Money::from_cents(250)).unwrap();
        assert_eq!(json, "2.5");
        let parsed: Money = serde_json::from_str("2.5").unwrap();
        assert_eq!(parsed, Money::from_cents(250));
    }
}
