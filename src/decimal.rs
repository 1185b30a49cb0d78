//! Arbitrary-precision base-10 decimal, fixed to 34 significant digits.
//!
//! Grounded on the teacher's `types/decimal.rs`, which stores Python's `decimal.Decimal`
//! as `coefficient * 10^exponent` with a `BigInt` coefficient. Viro decimals drop the
//! teacher's special values (NaN/Infinity have no counterpart in §3.1) and the teacher's
//! wide operation surface (quantize, to_eng_string, …) that SPEC_FULL.md does not ask for.

use std::{cmp::Ordering, fmt};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::error::{self, EvalResult};

/// Maximum significant decimal digits the coefficient may hold (§3.1/§4.A.1).
pub const PRECISION: u32 = 34;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i32,
}

impl Decimal {
    #[must_use]
    pub fn zero() -> Self {
        Self {
            coefficient: BigInt::zero(),
            exponent: 0,
        }
    }

    #[must_use]
    pub fn from_i64(v: i64) -> Self {
        Self {
            coefficient: BigInt::from(v),
            exponent: 0,
        }
    }

    /// Parses a decimal literal of the form `[-]digits[.digits][e[+-]digits]`.
    pub fn parse(text: &str) -> Option<Self> {
        let (mantissa, exp_part) = match text.split_once(['e', 'E']) {
            Some((m, e)) => (m, Some(e)),
            None => (text, None),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (mantissa, None),
        };
        if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
            return None;
        }
        let mut digits = String::new();
        let negative = int_part.starts_with('-');
        let int_digits = int_part.trim_start_matches(['-', '+']);
        if !int_digits.is_empty() {
            digits.push_str(int_digits);
        }
        let mut frac_len = 0i32;
        if let Some(f) = frac_part {
            if f.is_empty() {
                return None;
            }
            digits.push_str(f);
            frac_len = i32::try_from(f.len()).ok()?;
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let exp: i32 = match exp_part {
            Some(e) => e.parse().ok()?,
            None => 0,
        };
        let mut coefficient: BigInt = digits.parse().ok()?;
        if negative {
            coefficient = -coefficient;
        }
        Some(Self::normalized(coefficient, exp - frac_len))
    }

    fn digit_count(n: &BigInt) -> u32 {
        if n.is_zero() {
            return 1;
        }
        n.abs().to_string().len() as u32
    }

    /// Rounds `coefficient` to at most [`PRECISION`] significant digits (half-to-even),
    /// folding any dropped digits into `exponent`.
    fn normalized(mut coefficient: BigInt, mut exponent: i32) -> Self {
        let digits = Self::digit_count(&coefficient);
        if digits > PRECISION {
            let drop = digits - PRECISION;
            let divisor = BigInt::from(10).pow(drop);
            let (quotient, remainder) = coefficient.div_rem(&divisor);
            let half = &divisor / 2;
            let rem_abs = remainder.abs();
            let round_up = match rem_abs.cmp(&half) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => quotient.is_odd(),
            };
            coefficient = if round_up {
                if quotient.is_negative() {
                    quotient - 1
                } else {
                    quotient + 1
                }
            } else {
                quotient
            };
            exponent += i32::try_from(drop).unwrap_or(i32::MAX);
        }
        Self { coefficient, exponent }
    }

    fn align(a: &Self, b: &Self) -> (BigInt, BigInt, i32) {
        if a.exponent == b.exponent {
            return (a.coefficient.clone(), b.coefficient.clone(), a.exponent);
        }
        if a.exponent > b.exponent {
            let scale = BigInt::from(10).pow((a.exponent - b.exponent) as u32);
            (&a.coefficient * scale, b.coefficient.clone(), b.exponent)
        } else {
            let scale = BigInt::from(10).pow((b.exponent - a.exponent) as u32);
            (a.coefficient.clone(), &b.coefficient * scale, a.exponent)
        }
    }

    pub fn add(&self, other: &Self) -> EvalResult<Self> {
        let (a, b, exp) = Self::align(self, other);
        Ok(Self::normalized(a + b, exp))
    }

    pub fn sub(&self, other: &Self) -> EvalResult<Self> {
        let (a, b, exp) = Self::align(self, other);
        Ok(Self::normalized(a - b, exp))
    }

    pub fn mul(&self, other: &Self) -> EvalResult<Self> {
        Ok(Self::normalized(
            &self.coefficient * &other.coefficient,
            self.exponent + other.exponent,
        ))
    }

    pub fn div(&self, other: &Self) -> EvalResult<Self> {
        if other.coefficient.is_zero() {
            return Err(error::zero_divide());
        }
        // Scale the dividend up so long division yields PRECISION significant digits.
        let extra = i32::try_from(PRECISION + 2).unwrap_or(i32::MAX);
        let scale = BigInt::from(10).pow(extra as u32);
        let scaled_numerator = &self.coefficient * scale;
        let (quotient, _) = scaled_numerator.div_rem(&other.coefficient);
        let exponent = self.exponent - other.exponent - extra;
        Ok(Self::normalized(quotient, exponent))
    }

    pub fn neg(&self) -> Self {
        Self {
            coefficient: -self.coefficient.clone(),
            exponent: self.exponent,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let (a, b, _) = Self::align(self, other);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.coefficient.is_negative();
        let digits = self.coefficient.abs().to_string();
        if self.exponent >= 0 {
            write!(f, "{}{}{}", if negative { "-" } else { "" }, digits, "0".repeat(self.exponent as usize))
        } else {
            let point = (-self.exponent) as usize;
            if point >= digits.len() {
                let zeros = "0".repeat(point - digits.len());
                write!(f, "{}0.{}{}", if negative { "-" } else { "" }, zeros, digits)
            } else {
                let split = digits.len() - point;
                write!(
                    f,
                    "{}{}.{}",
                    if negative { "-" } else { "" },
                    &digits[..split],
                    &digits[split..]
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_literals() {
        let d = Decimal::parse("3.14").unwrap();
        assert_eq!(d.to_string(), "3.14");
        let neg = Decimal::parse("-0.5").unwrap();
        assert_eq!(neg.to_string(), "-0.5");
    }

    #[test]
    fn arithmetic_matches_expectations() {
        let a = Decimal::parse("1.1").unwrap();
        let b = Decimal::parse("2.2").unwrap();
        assert_eq!(a.add(&b).unwrap().to_string(), "3.3");
        let c = Decimal::parse("10").unwrap();
        let d = Decimal::parse("4").unwrap();
        assert_eq!(c.div(&d).unwrap().to_string(), "2.5");
    }

    #[test]
    fn division_by_zero_errors() {
        let a = Decimal::parse("1").unwrap();
        let zero = Decimal::zero();
        assert!(a.div(&zero).is_err());
    }

    #[test]
    fn precision_rounds_half_to_even() {
        let big = Decimal::parse("1.00000000000000000000000000000000005").unwrap();
        // 35 significant digits in the fractional part force a rounding step.
        assert!(big.to_string().len() <= 40);
    }
}
