//! Exact rational arithmetic for trade amounts.
//!
//! Rounding is half away from zero everywhere. `to_significant` rounds
//! twice, first to `digits + 1` then to `digits` significant digits, which
//! is how the exchange SDK renders amounts; `to_fixed` rounds once.

use std::fmt;

use anyhow::{bail, Result};
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{pow, One, Signed, Zero};

fn ten_pow(exponent: u64) -> BigInt {
    pow(BigInt::from(10u8), exponent as usize)
}

/// `value` rounded to `digits` significant digits, half away from zero.
fn round_significant(value: &BigDecimal, digits: u32) -> BigDecimal {
    // value = int * 10^-scale, so its leading digit sits at 10^(len - 1 - scale)
    let (int, scale) = value.as_bigint_and_exponent();
    let leading = int.abs().to_string().len() as i64 - 1 - scale;
    value.with_scale_round(digits as i64 - 1 - leading, RoundingMode::HalfUp)
}

/// Plain decimal rendering with exactly `max(scale, 0)` decimals.
fn render(value: &BigDecimal) -> String {
    let (int, scale) = value.as_bigint_and_exponent();
    let sign = if int.is_negative() { "-" } else { "" };

    if scale <= 0 {
        return format!("{}{}", sign, int.abs() * ten_pow(scale.unsigned_abs()));
    }

    let scale = scale as usize;
    let digits = format!("{:0>width$}", int.abs().to_string(), width = scale + 1);
    let (integer, fraction) = digits.split_at(digits.len() - scale);
    format!("{}{}.{}", sign, integer, fraction)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            bail!("Fraction denominator is zero");
        }
        Ok(Self::normalized(numerator.into(), denominator))
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numerator: value.into(),
            denominator: BigInt::one(),
        }
    }

    /// Caller guarantees a non-zero denominator.
    fn normalized(numerator: BigInt, denominator: BigInt) -> Self {
        if denominator.is_negative() {
            Self {
                numerator: -numerator,
                denominator: -denominator,
            }
        } else {
            Self {
                numerator,
                denominator,
            }
        }
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// Integer part, truncated toward zero.
    pub fn quotient(&self) -> BigInt {
        &self.numerator / &self.denominator
    }

    pub fn add(&self, other: &Fraction) -> Fraction {
        Self::normalized(
            &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn subtract(&self, other: &Fraction) -> Fraction {
        Self::normalized(
            &self.numerator * &other.denominator - &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn multiply(&self, other: &Fraction) -> Fraction {
        Self::normalized(
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
        )
    }

    /// `None` for a zero fraction.
    pub fn invert(&self) -> Option<Fraction> {
        if self.numerator.is_zero() {
            return None;
        }
        Some(Self::normalized(self.denominator.clone(), self.numerator.clone()))
    }

    pub fn negate(&self) -> Fraction {
        Self {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }

    pub fn less_than(&self, other: &Fraction) -> bool {
        &self.numerator * &other.denominator < &other.numerator * &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    fn to_decimal(&self) -> BigDecimal {
        BigDecimal::from(self.numerator.clone()) / BigDecimal::from(self.denominator.clone())
    }

    /// Rounded to `digits` significant digits, trailing zeros removed.
    pub fn to_significant(&self, digits: u32) -> String {
        let digits = digits.max(1);
        if self.numerator.is_zero() {
            return "0".to_string();
        }

        let first = round_significant(&self.to_decimal(), digits + 1);
        render(&round_significant(&first, digits).normalized())
    }

    /// Rounded to exactly `decimals` decimal places.
    pub fn to_fixed(&self, decimals: u32) -> String {
        render(&self.to_decimal().with_scale_round(decimals as i64, RoundingMode::HalfUp))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A fraction rendered as a percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percent(Fraction);

impl Percent {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        Fraction::new(numerator, denominator).map(Percent)
    }

    pub fn from_fraction(fraction: Fraction) -> Self {
        Percent(fraction)
    }

    /// `bps / 10_000`.
    pub fn from_bps(bps: u32) -> Self {
        Percent(Fraction {
            numerator: BigInt::from(bps),
            denominator: BigInt::from(10_000u32),
        })
    }

    pub fn zero() -> Self {
        Percent(Fraction::from_integer(0))
    }

    pub fn one_hundred() -> Self {
        Percent(Fraction::one())
    }

    pub fn fraction(&self) -> &Fraction {
        &self.0
    }

    pub fn subtract(&self, other: &Percent) -> Percent {
        Percent(self.0.subtract(&other.0))
    }

    pub fn less_than(&self, other: &Percent) -> bool {
        self.0.less_than(&other.0)
    }

    pub fn negate(&self) -> Percent {
        Percent(self.0.negate())
    }

    fn scaled(&self) -> Fraction {
        self.0.multiply(&Fraction::from_integer(100))
    }

    pub fn to_significant(&self, digits: u32) -> String {
        self.scaled().to_significant(digits)
    }

    pub fn to_fixed(&self, decimals: u32) -> String {
        self.scaled().to_fixed(decimals)
    }
}
