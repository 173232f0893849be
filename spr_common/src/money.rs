use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------       Money        ----------------------------------------------------------
/// A monetary amount in minor units (cents). The payment gateway expresses amounts as decimal strings
/// ("247000.00"), so the primary constructor is [`FromStr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(pub String);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Converts a whole-unit floating point amount (as JSON numbers arrive) into minor units, rounding to the
    /// nearest cent.
    pub fn from_units(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// The amount in whole currency units, for APIs that take floating point values.
    pub fn to_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The amount in whole currency units, truncated. The hosted-payment API only accepts integer amounts.
    pub fn whole_units(&self) -> i64 {
        self.0 / 100
    }

    /// Renders the amount in the decimal form the gateway expects, e.g. `2500` -> "25.00".
    pub fn to_decimal_string(&self) -> String {
        format!("{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // The sign comes from the raw string: a whole part of "-0" parses to 0 and would lose it.
        let negative = trimmed.starts_with('-');
        let mut parts = trimmed.split('.');
        let whole_units = parts
            .next()
            .ok_or_else(|| MoneyConversionError(s.to_string()))?
            .parse::<i64>()
            .map_err(|e| MoneyConversionError(format!("Invalid amount: {s}. {e}.")))?;
        let cents = match parts.next() {
            None | Some("") => 0,
            Some(frac) if frac.len() <= 2 => {
                let cents = frac.parse::<i64>().map_err(|e| MoneyConversionError(format!("Invalid amount: {s}. {e}.")))?;
                if frac.len() == 1 {
                    cents * 10
                } else {
                    cents
                }
            },
            Some(frac) => return Err(MoneyConversionError(format!("Invalid amount: {s}. Too many decimals: {frac}."))),
        };
        if parts.next().is_some() {
            return Err(MoneyConversionError(format!("Invalid amount: {s}.")));
        }
        let sign = if negative { -1 } else { 1 };
        Ok(Self(whole_units * 100 + sign * cents))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_gateway_decimal_strings() {
        assert_eq!("247000.00".parse::<Money>().unwrap(), Money::from_cents(24_700_000));
        assert_eq!("15000".parse::<Money>().unwrap(), Money::from_cents(1_500_000));
        assert_eq!("9.5".parse::<Money>().unwrap(), Money::from_cents(950));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_cents(7));
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!("-12.34".parse::<Money>().unwrap(), Money::from_cents(-1234));
        assert_eq!("-0.50".parse::<Money>().unwrap(), Money::from_cents(-50));
        assert_eq!("-15000".parse::<Money>().unwrap(), Money::from_cents(-1_500_000));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!("".parse::<Money>().is_err());
        assert!("12.345".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("ten".parse::<Money>().is_err());
    }

    #[test]
    fn converts_floating_point_unit_amounts() {
        assert_eq!(Money::from_units(247_000.0), Money::from_cents(24_700_000));
        assert_eq!(Money::from_units(19.995), Money::from_cents(2000));
        assert_eq!(Money::from_cents(24_700_000).to_units(), 247_000.0);
        assert_eq!(Money::from_cents(24_700_050).whole_units(), 247_000);
    }

    #[test]
    fn round_trips_decimal_form() {
        let m = "199.90".parse::<Money>().unwrap();
        assert_eq!(m.to_decimal_string(), "199.90");
        assert_eq!(Money::from_cents(100).to_decimal_string(), "1.00");
    }
}
