//! Arbitrary-range decimal quantity used for every game magnitude.
//!
//! A value is a normalized mantissa (`1 <= |m| < 10`, about 28 significant
//! digits, held in a [`Decimal`]) times `10^exponent` with an `i64` exponent.
//! Magnitudes far beyond `1e300` stay finite, and integers of up to 28 digits
//! are exact, so counts earned over long sessions survive a save/load cycle
//! unchanged.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NumericParseError;

/// Significant digits kept from a parsed string.
const MAX_DIGITS: usize = 28;
/// Past this exponent gap the smaller addend is below mantissa precision.
const MAX_ALIGN: i64 = 28;
/// Largest decimal exponent a value may carry. Parsing rejects anything
/// beyond it and arithmetic saturates at it.
pub const MAX_EXPONENT: i64 = 1_000_000_000_000_000;
/// Exponents in `[PLAIN_MIN_EXP, PLAIN_MAX_EXP)` print without `e` notation.
const PLAIN_MIN_EXP: i64 = -7;
const PLAIN_MAX_EXP: i64 = 21;

#[derive(Clone, Copy, Debug)]
pub struct NumericValue {
    mantissa: Decimal,
    exponent: i64,
}

impl NumericValue {
    pub const ZERO: Self = Self {
        mantissa: Decimal::ZERO,
        exponent: 0,
    };
    pub const ONE: Self = Self {
        mantissa: Decimal::ONE,
        exponent: 0,
    };

    fn normalized(mantissa: Decimal, exponent: i64) -> Self {
        if mantissa.is_zero() {
            return Self::ZERO;
        }
        let mut m = mantissa;
        let mut e = exponent;
        while m.abs() >= Decimal::TEN {
            m /= Decimal::TEN;
            e = e.saturating_add(1);
        }
        while m.abs() < Decimal::ONE {
            m *= Decimal::TEN;
            e = e.saturating_sub(1);
        }
        Self {
            mantissa: m.normalize(),
            exponent: e.clamp(-MAX_EXPONENT, MAX_EXPONENT),
        }
    }

    /// `num * 10^-scale`, e.g. `from_scaled(105, 2)` is `1.05`.
    pub fn from_scaled(num: i64, scale: u32) -> Self {
        Decimal::try_new(num, scale).map_or(Self::ZERO, |m| Self::normalized(m, 0))
    }

    /// Lossy conversion from `f64`. Non-finite input becomes zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value == 0.0 {
            return Self::ZERO;
        }
        let exponent = value.abs().log10().floor() as i64;
        let scaled = value / 10f64.powi(exponent as i32);
        Decimal::from_f64(scaled).map_or(Self::ZERO, |m| Self::normalized(m, exponent))
    }

    /// Nearest `f64`; overflows to infinity past `f64::MAX`.
    pub fn to_f64(self) -> f64 {
        let exponent = self.exponent.clamp(-400, 400) as i32;
        self.mantissa
            .to_f64()
            .map_or(0.0, |m| m * 10f64.powi(exponent))
    }

    /// Normalized mantissa, `1 <= |m| < 10` (zero for zero).
    pub fn mantissa(self) -> Decimal {
        self.mantissa
    }

    /// Decimal exponent (zero for zero).
    pub fn exponent(self) -> i64 {
        self.exponent
    }

    pub fn is_zero(self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.mantissa.is_sign_negative() && !self.mantissa.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.mantissa.is_sign_positive() && !self.mantissa.is_zero()
    }

    pub fn abs(self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// `None` when `divisor` is zero.
    pub fn checked_div(self, divisor: Self) -> Option<Self> {
        if divisor.is_zero() {
            return None;
        }
        let m = self.mantissa.checked_div(divisor.mantissa)?;
        Some(Self::normalized(
            m,
            self.exponent.saturating_sub(divisor.exponent),
        ))
    }

    /// Integer power by repeated squaring.
    pub fn powi(self, n: u64) -> Self {
        let mut result = Self::ONE;
        let mut base = self;
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = result * base;
            }
            n >>= 1;
            if n > 0 {
                base = base * base;
            }
        }
        result
    }

    /// Square root; zero for negative input.
    pub fn sqrt(self) -> Self {
        if !self.is_positive() {
            return Self::ZERO;
        }
        let (m, e) = if self.exponent.rem_euclid(2) == 0 {
            (self.mantissa, self.exponent)
        } else {
            (self.mantissa * Decimal::TEN, self.exponent.saturating_sub(1))
        };
        m.sqrt()
            .map_or(Self::ZERO, |root| Self::normalized(root, e / 2))
    }

    /// Largest integer `<= self`.
    pub fn floor(self) -> Self {
        if self.is_zero() {
            return self;
        }
        if self.exponent < 0 {
            return if self.is_negative() { -Self::ONE } else { Self::ZERO };
        }
        // Every digit is already in the integer part.
        if self.exponent >= MAX_ALIGN {
            return self;
        }
        let shifted = self.mantissa * pow10(self.exponent as u32);
        Self::normalized(shifted.floor(), 0)
    }

    /// Relative comparison for values that went through different rounding.
    pub fn approx_eq(self, other: Self, rel: f64) -> bool {
        if self == other {
            return true;
        }
        let scale = self.abs().max(other.abs());
        let diff = (self - other).abs();
        diff.checked_div(scale)
            .is_some_and(|r| r <= Self::from_f64(rel))
    }

    fn signum(self) -> i8 {
        if self.is_zero() {
            0
        } else if self.mantissa.is_sign_negative() {
            -1
        } else {
            1
        }
    }
}

fn pow10(n: u32) -> Decimal {
    Decimal::try_from_i128_with_scale(10_i128.pow(n), 0).unwrap_or(Decimal::MAX)
}

impl Default for NumericValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for NumericValue {
    fn from(value: u64) -> Self {
        Self::normalized(Decimal::from(value), 0)
    }
}

impl From<u32> for NumericValue {
    fn from(value: u32) -> Self {
        Self::normalized(Decimal::from(value), 0)
    }
}

impl From<i64> for NumericValue {
    fn from(value: i64) -> Self {
        Self::normalized(Decimal::from(value), 0)
    }
}

impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NumericValue {}

impl PartialOrd for NumericValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumericValue {
    fn cmp(&self, other: &Self) -> Ordering {
        let (sa, sb) = (self.signum(), other.signum());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        let magnitude = self
            .exponent
            .cmp(&other.exponent)
            .then_with(|| self.mantissa.abs().cmp(&other.mantissa.abs()));
        if sa > 0 {
            magnitude
        } else {
            magnitude.reverse()
        }
    }
}

impl Add for NumericValue {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        if self.is_zero() {
            return other;
        }
        if other.is_zero() {
            return self;
        }
        let (big, small) = if self.exponent >= other.exponent {
            (self, other)
        } else {
            (other, self)
        };
        let gap = match big.exponent.checked_sub(small.exponent) {
            Some(gap) if gap <= MAX_ALIGN => gap,
            _ => return big,
        };
        let shifted = small.mantissa * Decimal::new(1, gap as u32);
        Self::normalized(big.mantissa + shifted, big.exponent)
    }
}

impl Sub for NumericValue {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl Neg for NumericValue {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Mul for NumericValue {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::ZERO;
        }
        Self::normalized(
            self.mantissa * other.mantissa,
            self.exponent.saturating_add(other.exponent),
        )
    }
}

/// Division by zero yields zero; use [`NumericValue::checked_div`] to detect it.
impl Div for NumericValue {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        self.checked_div(other).unwrap_or(Self::ZERO)
    }
}

impl AddAssign for NumericValue {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for NumericValue {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl MulAssign for NumericValue {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Sum for NumericValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Canonical form: plain notation for exponents in `[-7, 21)`, otherwise
/// `d.ddde+N` / `d.ddde-N`. Always parses back to the same value.
impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.mantissa.abs().normalize().mantissa().to_string();
        let e = self.exponent;

        if (PLAIN_MIN_EXP..PLAIN_MAX_EXP).contains(&e) {
            if e >= 0 {
                let int_len = (e + 1) as usize;
                if digits.len() <= int_len {
                    let pad = "0".repeat(int_len - digits.len());
                    write!(f, "{sign}{digits}{pad}")
                } else {
                    let (int_part, frac_part) = digits.split_at(int_len);
                    write!(f, "{sign}{int_part}.{frac_part}")
                }
            } else {
                let pad = "0".repeat((-e - 1) as usize);
                write!(f, "{sign}0.{pad}{digits}")
            }
        } else {
            let (head, tail) = digits.split_at(1);
            let exp_sign = if e < 0 { '-' } else { '+' };
            let exp = e.unsigned_abs();
            if tail.is_empty() {
                write!(f, "{sign}{head}e{exp_sign}{exp}")
            } else {
                write!(f, "{sign}{head}.{tail}e{exp_sign}{exp}")
            }
        }
    }
}

impl FromStr for NumericValue {
    type Err = NumericParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || NumericParseError::new(s);
        let text = s.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (coefficient, exp_shift) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => {
                let shift: i64 = body[at + 1..].parse().map_err(|_| err())?;
                (&body[..at], shift)
            }
            None => (body, 0),
        };
        let (int_digits, frac_digits) = coefficient.split_once('.').unwrap_or((coefficient, ""));
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(err());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_digits) || !all_digits(frac_digits) {
            return Err(err());
        }

        let digits: Vec<u8> = int_digits
            .bytes()
            .chain(frac_digits.bytes())
            .map(|b| b - b'0')
            .collect();
        let Some(first) = digits.iter().position(|&d| d != 0) else {
            return Ok(Self::ZERO);
        };
        let exponent = (int_digits.len() as i64 - 1 - first as i64)
            .checked_add(exp_shift)
            .filter(|e| e.abs() <= MAX_EXPONENT)
            .ok_or_else(err)?;

        let significant = &digits[first..];
        let last = significant.iter().rposition(|&d| d != 0).unwrap_or(0);
        let significant = &significant[..=last.min(MAX_DIGITS - 1)];

        let coefficient = significant
            .iter()
            .fold(0_i128, |acc, &d| acc * 10 + i128::from(d));
        let signed = if negative { -coefficient } else { coefficient };
        let mantissa = Decimal::try_from_i128_with_scale(signed, (significant.len() - 1) as u32)
            .map_err(|_| err())?;
        Ok(Self::normalized(mantissa, exponent))
    }
}

impl Serialize for NumericValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NumericValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericVisitor)
    }
}

struct NumericVisitor;

impl Visitor<'_> for NumericVisitor {
    type Value = NumericValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(NumericValue::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(NumericValue::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(NumericValue::from_f64(v))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // ── Strategy helpers ──────────────────────────────────

    fn arb_value() -> impl Strategy<Value = NumericValue> {
        (any::<i64>(), -60i64..60)
            .prop_map(|(m, shift)| format!("{m}e{shift}").parse().unwrap())
    }

    // ── Canonical string ──────────────────────────────────

    proptest! {
        #[test]
        fn prop_string_roundtrip(v in arb_value()) {
            let back: NumericValue = v.to_string().parse().unwrap();
            prop_assert_eq!(back, v);
        }

        #[test]
        fn prop_integer_string_exact(int in 0u64..u64::MAX) {
            let v = NumericValue::from(int);
            prop_assert_eq!(v.to_string(), int.to_string());
        }
    }

    // ── Arithmetic ────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_add_commutes(a in arb_value(), b in arb_value()) {
            prop_assert_eq!(a + b, b + a);
        }

        #[test]
        fn prop_ordering_matches_subtraction(a in arb_value(), b in arb_value()) {
            let diff = a - b;
            match a.cmp(&b) {
                Ordering::Less => prop_assert!(diff.is_negative() || diff.is_zero()),
                Ordering::Greater => prop_assert!(diff.is_positive() || diff.is_zero()),
                Ordering::Equal => prop_assert!(diff.is_zero()),
            }
        }

        #[test]
        fn prop_mul_div_inverse(a in arb_value(), b in arb_value()) {
            prop_assume!(!b.is_zero());
            prop_assert!((a * b / b).approx_eq(a, 1e-24));
        }

        #[test]
        fn prop_floor_not_above(a in arb_value()) {
            let f = a.floor();
            prop_assert!(f <= a);
            prop_assert!(a - f < NumericValue::ONE);
        }

        #[test]
        fn prop_sqrt_squares_back(a in arb_value()) {
            let a = a.abs();
            let root = a.sqrt();
            prop_assert!((root * root).approx_eq(a, 1e-20));
        }
    }
}
