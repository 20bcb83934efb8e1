//! Exact decimal numbers
//!
//! A `Decimal` is an arbitrary-precision integer mantissa scaled by a power of
//! ten. Addition, subtraction and multiplication are always exact; division is
//! exact whenever the quotient terminates and is rounded half-even to a caller
//! supplied number of significant digits otherwise.
//!
//! The representation is kept normalized (no trailing fractional zeros, zero
//! has scale 0), so structural equality is numeric equality.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RuntimeError, RuntimeResult};

/// Largest decimal exponent accepted in scientific-notation input and in
/// integral powers.
pub const MAX_EXPONENT: i64 = 100_000;

/// Upper bound on the digits of an integral power's mantissa. Larger
/// results are refused before any work is done.
pub const MAX_POWER_DIGITS: u64 = 1_000_000;

/// Significant digits used for non-terminating quotients unless configured
/// otherwise (same as IEEE 754 decimal128).
pub const DEFAULT_DIVISION_PRECISION: u32 = 34;

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-])?([0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?$")
        .expect("decimal literal pattern is valid")
});

fn pow10(n: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u32), n as usize)
}

fn digit_count(n: &BigInt) -> u64 {
    n.magnitude().to_string().len() as u64
}

/// Error returned when text is not a valid decimal literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError {
    input: String,
}

impl ParseDecimalError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid decimal literal [{}]", self.input)
    }
}

impl std::error::Error for ParseDecimalError {}

/// Arbitrary-precision decimal number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    /// Build `mantissa * 10^-scale`.
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        Self { mantissa, scale }.normalized()
    }

    pub fn zero() -> Self {
        Self {
            mantissa: BigInt::zero(),
            scale: 0,
        }
    }

    pub fn one() -> Self {
        Self {
            mantissa: BigInt::one(),
            scale: 0,
        }
    }

    /// Convert a double using its shortest round-trip text, so `0.1` becomes
    /// exactly `0.1`. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // f64's Display never uses exponent notation
        format!("{}", value).parse().ok()
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// True when the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    /// Integer part, truncated toward zero.
    pub fn trunc(&self) -> BigInt {
        &self.mantissa / pow10(self.scale)
    }

    /// Exact conversion; `None` if fractional or out of range.
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.mantissa.to_i64()
        } else {
            None
        }
    }

    /// Exact conversion; `None` if fractional or out of range.
    pub fn to_i32(&self) -> Option<i32> {
        if self.is_integer() {
            self.mantissa.to_i32()
        } else {
            None
        }
    }

    /// Truncating conversion; `None` only if the integer part is out of range.
    pub fn trunc_i32(&self) -> Option<i32> {
        self.trunc().to_i32()
    }

    pub fn abs(&self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            scale: self.scale,
        }
    }

    /// Exact product. Fails when the combined scale can't be represented.
    pub fn checked_mul(&self, rhs: &Decimal) -> RuntimeResult<Decimal> {
        let scale = self.scale.checked_add(rhs.scale).ok_or_else(|| {
            RuntimeError::arithmetic(format!(
                "product of scales {} and {} is too precise to represent",
                self.scale, rhs.scale
            ))
        })?;
        Ok(Decimal::new(&self.mantissa * &rhs.mantissa, scale))
    }

    /// Quotient; exact when it terminates, otherwise rounded half-even to
    /// `precision` significant digits. `None` when dividing by zero.
    pub fn checked_div(&self, rhs: &Decimal, precision: u32) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(Decimal::zero());
        }

        // (m1 / 10^s1) / (m2 / 10^s2) == (m1 * 10^s2) / (m2 * 10^s1)
        let num = &self.mantissa * pow10(rhs.scale);
        let den = &rhs.mantissa * pow10(self.scale);
        let g = num.gcd(&den);
        let (mut num, mut den) = (num / &g, den / &g);
        if den.is_negative() {
            num = -num;
            den = -den;
        }

        if let Some(k) = terminating_scale(&den) {
            let factor = pow10(k) / &den;
            return Some(Decimal::new(num * factor, k));
        }
        Some(round_quotient(&num, &den, precision.max(1)))
    }

    /// Remainder of truncated division; takes the sign of the dividend.
    pub fn checked_rem(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        let (a, b, scale) = self.aligned(rhs);
        Some(Decimal::new(a % b, scale))
    }

    /// Integer quotient, truncated toward zero.
    pub fn checked_int_div(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        let (a, b, _) = self.aligned(rhs);
        Some(Decimal::new(a / b, 0))
    }

    /// Integral power. Negative exponents divide, rounding like `checked_div`.
    pub fn pow(&self, exponent: i64, precision: u32) -> RuntimeResult<Decimal> {
        if exponent.unsigned_abs() > MAX_EXPONENT as u64 {
            return Err(RuntimeError::arithmetic(format!(
                "exponent {} exceeds the supported range",
                exponent
            )));
        }
        let n = exponent.unsigned_abs() as u32;
        let scale = self.scale.checked_mul(n).ok_or_else(|| {
            RuntimeError::arithmetic(format!(
                "{} ^ {} is too precise to represent",
                self, exponent
            ))
        })?;
        // digits(m^n) <= digits(m) * n
        let estimate = digit_count(&self.mantissa).saturating_mul(u64::from(n));
        if estimate > MAX_POWER_DIGITS {
            return Err(RuntimeError::arithmetic(format!(
                "power with exponent {} would exceed {} digits",
                exponent, MAX_POWER_DIGITS
            )));
        }
        let powered = Decimal::new(num_traits::pow(self.mantissa.clone(), n as usize), scale);
        if exponent >= 0 {
            Ok(powered)
        } else {
            Decimal::one()
                .checked_div(&powered, precision)
                .ok_or(RuntimeError::DivisionByZero)
        }
    }

    fn normalized(mut self) -> Self {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return self;
        }
        let ten = BigInt::from(10u32);
        while self.scale > 0 {
            let (q, r) = self.mantissa.div_rem(&ten);
            if !r.is_zero() {
                break;
            }
            self.mantissa = q;
            self.scale -= 1;
        }
        self
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        &self.mantissa * pow10(scale - self.scale)
    }

    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        (self.rescaled(scale), other.rescaled(scale), scale)
    }
}

/// If `den` (positive) divides some power of ten, the smallest such exponent.
fn terminating_scale(den: &BigInt) -> Option<u32> {
    let two = BigInt::from(2u32);
    let five = BigInt::from(5u32);
    let mut rest = den.clone();
    let (mut twos, mut fives) = (0u32, 0u32);
    while rest.is_even() {
        rest /= &two;
        twos += 1;
    }
    while (&rest % &five).is_zero() {
        rest /= &five;
        fives += 1;
    }
    if rest.is_one() {
        Some(twos.max(fives))
    } else {
        None
    }
}

/// `num / den` rounded half-even to `precision` significant digits; `den > 0`.
fn round_quotient(num: &BigInt, den: &BigInt, precision: u32) -> Decimal {
    let negative = num.is_negative();
    let num = num.abs();

    // Scale so the integer quotient carries at least precision + 1 digits.
    let shift = precision as i64 - (digit_count(&num) as i64 - digit_count(den) as i64) + 1;
    let (scaled_num, scaled_den) = if shift >= 0 {
        (num * pow10(shift as u32), den.clone())
    } else {
        (num, den * pow10(shift.unsigned_abs() as u32))
    };
    let (mut q, r) = scaled_num.div_rem(&scaled_den);
    let sticky = !r.is_zero();
    let mut scale = shift;

    let digits = digit_count(&q);
    if digits > precision as u64 {
        let excess = (digits - precision as u64) as u32;
        let divisor = pow10(excess);
        let (kept, dropped) = q.div_rem(&divisor);
        let half = &divisor / 2u32;
        q = match dropped.cmp(&half) {
            Ordering::Greater => kept + 1u32,
            Ordering::Less => kept,
            Ordering::Equal if sticky => kept + 1u32,
            Ordering::Equal if kept.is_odd() => kept + 1u32,
            Ordering::Equal => kept,
        };
        scale -= excess as i64;
    }

    let q = if negative { -q } else { q };
    if scale >= 0 {
        Decimal::new(q, scale as u32)
    } else {
        Decimal::new(q * pow10(scale.unsigned_abs() as u32), 0)
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDecimalError {
            input: s.to_string(),
        };
        let caps = DECIMAL_RE.captures(s).ok_or_else(err)?;
        let int_part = caps.get(2).map_or("", |m| m.as_str());
        let frac_part = caps.get(3).map_or("", |m| m.as_str());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        let exponent: i64 = match caps.get(4) {
            Some(m) => m.as_str().parse().map_err(|_| err())?,
            None => 0,
        };
        if exponent.unsigned_abs() > MAX_EXPONENT as u64 {
            return Err(err());
        }

        let mut mantissa: BigInt = format!("{}{}", int_part, frac_part)
            .parse()
            .map_err(|_| err())?;
        if caps.get(1).is_some_and(|m| m.as_str() == "-") {
            mantissa = -mantissa;
        }

        let scale = frac_part.len() as i64 - exponent;
        Ok(if scale >= 0 {
            Decimal::new(mantissa, scale as u32)
        } else {
            Decimal::new(mantissa * pow10(scale.unsigned_abs() as u32), 0)
        })
    }
}

/// Canonical plain form: no exponent, no trailing fractional zeros.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_string();
        let sign = if self.mantissa.is_negative() { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            write!(f, "{}{}", sign, digits)
        } else if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int, frac)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Decimal::new(BigInt::from(v), 0)
    }
}

impl From<i32> for Decimal {
    fn from(v: i32) -> Self {
        Decimal::new(BigInt::from(v), 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(v: BigInt) -> Self {
        Decimal::new(v, 0)
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(rhs);
        Decimal::new(a + b, scale)
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(rhs);
        Decimal::new(a - b, scale)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal {
            mantissa: -&self.mantissa,
            scale: self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_canonical_display() {
        assert_eq!(d("1.500").to_string(), "1.5");
        assert_eq!(d("-0.0").to_string(), "0");
        assert_eq!(d(".25").to_string(), "0.25");
        assert_eq!(d("5.").to_string(), "5");
        assert_eq!(d("1.5e3").to_string(), "1500");
        assert_eq!(d("12E-4").to_string(), "0.0012");
        assert_eq!(d("+7").to_string(), "7");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", ".", "abc", "1.2.3", "1e", "--1", " 1", "1e999999999"] {
            assert!(bad.parse::<Decimal>().is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_exact_addition() {
        assert_eq!((&d("0.1") + &d("0.2")).to_string(), "0.3");
        assert_eq!(
            (&d("9999999999999999999999") + &d("1")).to_string(),
            "10000000000000000000000"
        );
    }

    #[test]
    fn test_subtraction_and_multiplication() {
        assert_eq!((&d("1") - &d("1")).to_string(), "0");
        assert_eq!((&d("0.3") - &d("0.1")).to_string(), "0.2");
        assert_eq!(d("1.25").checked_mul(&d("-4")).unwrap().to_string(), "-5");
        assert_eq!(
            d("123456789012345678901234567890")
                .checked_mul(&d("10"))
                .unwrap()
                .to_string(),
            "1234567890123456789012345678900"
        );
    }

    #[test]
    fn test_product_scale_overflow_is_an_error() {
        let tiny = Decimal::new(BigInt::one(), u32::MAX - 1);
        let err = tiny.checked_mul(&d("0.01")).unwrap_err();
        assert!(matches!(err, RuntimeError::Arithmetic(_)));
        assert_eq!(tiny.checked_mul(&d("2")).unwrap().scale(), u32::MAX - 1);
    }

    #[test]
    fn test_terminating_division_is_exact() {
        assert_eq!(d("1").checked_div(&d("8"), 34).unwrap().to_string(), "0.125");
        assert_eq!(d("10").checked_div(&d("4"), 2).unwrap().to_string(), "2.5");
        assert_eq!(d("-3").checked_div(&d("0.5"), 34).unwrap().to_string(), "-6");
    }

    #[test]
    fn test_non_terminating_division_rounds_half_even() {
        let third = d("1").checked_div(&d("3"), 34).unwrap();
        assert_eq!(third.to_string(), format!("0.{}", "3".repeat(34)));

        let two_thirds = d("2").checked_div(&d("3"), 5).unwrap();
        assert_eq!(two_thirds.to_string(), "0.66667");

        let big = d("1e40").checked_div(&d("3"), 5).unwrap();
        assert_eq!(big.to_string(), format!("33333{}", "0".repeat(35)));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(d("1").checked_div(&d("0"), 34).is_none());
        assert!(d("1").checked_rem(&d("0.0")).is_none());
        assert!(d("1").checked_int_div(&d("0")).is_none());
    }

    #[test]
    fn test_remainder_and_int_div() {
        assert_eq!(d("7").checked_rem(&d("3")).unwrap().to_string(), "1");
        assert_eq!(d("-7").checked_rem(&d("3")).unwrap().to_string(), "-1");
        assert_eq!(d("5.5").checked_rem(&d("2")).unwrap().to_string(), "1.5");
        assert_eq!(d("7").checked_int_div(&d("2")).unwrap().to_string(), "3");
        assert_eq!(d("-7").checked_int_div(&d("2")).unwrap().to_string(), "-3");
    }

    #[test]
    fn test_pow() {
        assert_eq!(
            d("2").pow(100, 34).unwrap().to_string(),
            "1267650600228229401496703205376"
        );
        assert_eq!(d("0.1").pow(3, 34).unwrap().to_string(), "0.001");
        assert_eq!(d("2").pow(-2, 34).unwrap().to_string(), "0.25");
        assert_eq!(d("0").pow(-1, 34), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_oversized_power_fails_fast() {
        let err = d("1e100000").pow(100_000, 34).unwrap_err();
        assert!(matches!(err, RuntimeError::Arithmetic(_)));
        assert!(d("1e100000").pow(-100_000, 34).is_err());
        assert_eq!(d("10").pow(1000, 34).unwrap().to_string().len(), 1001);
    }

    #[test]
    fn test_ordering_ignores_scale() {
        assert_eq!(d("1.50"), d("1.5"));
        assert!(d("1.05") < d("1.5"));
        assert!(d("-2") < d("1"));
    }

    #[test]
    fn test_from_f64_uses_shortest_text() {
        assert_eq!(Decimal::from_f64(0.1).unwrap().to_string(), "0.1");
        assert_eq!(Decimal::from_f64(-2.5).unwrap().to_string(), "-2.5");
        assert!(Decimal::from_f64(f64::NAN).is_none());
        assert!(Decimal::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(d("42").to_i32(), Some(42));
        assert_eq!(d("42.5").to_i32(), None);
        assert_eq!(d("-42.9").trunc_i32(), Some(-42));
        assert_eq!(d("99999999999").trunc_i32(), None);
        assert_eq!(d("99999999999").to_i64(), Some(99_999_999_999));
    }
}
