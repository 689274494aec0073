//! Arbitrary-precision rational numbers.

use std::{
    fmt::{self, Display},
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};

use crate::{
    error::{DomainError, ParseError},
    math,
};

/// Decimal exponents beyond this magnitude are rejected when parsing.
const MAX_DECIMAL_EXPONENT: i64 = 4096;

/// An exact rational number. Always kept in lowest terms with a positive denominator.
///
/// # Examples
///
/// ```
/// # use intervallic::Rational;
/// let ratio = Rational::new(6, 4).unwrap();
/// assert_eq!(ratio, Rational::new(3, 2).unwrap());
/// assert_eq!(ratio.to_string(), "3/2");
/// assert_eq!(ratio.to_f64(), 1.5);
///
/// assert!(Rational::new(1, 0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational(BigRational);

impl Rational {
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Result<Self, DomainError> {
        let denom = denom.into();
        if denom.is_zero() {
            return Err(DomainError::ZeroDenominator);
        }
        Ok(Self(BigRational::new(numer.into(), denom)))
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    /// Converts a float into the rational number it represents exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Rational;
    /// assert_eq!(Rational::from_f64(0.375).unwrap(), Rational::new(3, 8).unwrap());
    /// assert_ne!(Rational::from_f64(0.1).unwrap(), Rational::new(1, 10).unwrap());
    /// assert!(Rational::from_f64(f64::NAN).is_err());
    /// ```
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        BigRational::from_float(value)
            .map(Self)
            .ok_or_else(|| DomainError::NonFinite(value.to_string()))
    }

    /// Creates a rational from a numerator and denominator already in lowest terms.
    pub(crate) fn from_reduced(numer: BigInt, denom: BigInt) -> Self {
        Self(BigRational::new_raw(numer, denom))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Returns `1/self`.
    pub fn recip(&self) -> Result<Self, DomainError> {
        if self.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(Self(self.0.recip()))
    }

    pub fn checked_div(&self, divisor: &Rational) -> Result<Self, DomainError> {
        if divisor.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(Self(&self.0 / &divisor.0))
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Raises `self` to an integer power.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Rational;
    /// let fifth = Rational::new(3, 2).unwrap();
    /// assert_eq!(fifth.pow(4).unwrap(), Rational::new(81, 16).unwrap());
    /// assert_eq!(fifth.pow(-2).unwrap(), Rational::new(4, 9).unwrap());
    /// assert!(Rational::zero().pow(-1).is_err());
    /// ```
    pub fn pow(&self, exponent: i64) -> Result<Self, DomainError> {
        let power = exponent.unsigned_abs();
        let numer = Pow::pow(self.numer(), power);
        let denom = Pow::pow(self.denom(), power);
        if exponent >= 0 {
            Ok(Self::from_reduced(numer, denom))
        } else {
            Self::new(denom, numer)
        }
    }

    /// The largest integer not greater than `self`.
    pub fn floor(&self) -> BigInt {
        self.numer().div_floor(self.denom())
    }

    /// `self` minus its floor, i.e. a value in `[0, 1)`.
    pub fn fract(&self) -> Self {
        Self::from_reduced(self.numer().mod_floor(self.denom()), self.denom().clone())
    }

    /// Rounds to the nearest integer, resolving ties towards the even neighbor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Rational;
    /// # use num_bigint::BigInt;
    /// let round = |numer, denom| Rational::new(numer, denom).unwrap().round_half_even();
    /// assert_eq!(round(5, 2), BigInt::from(2));
    /// assert_eq!(round(7, 2), BigInt::from(4));
    /// assert_eq!(round(-5, 2), BigInt::from(-2));
    /// assert_eq!(round(8, 3), BigInt::from(3));
    /// ```
    pub fn round_half_even(&self) -> BigInt {
        let floor = self.floor();
        let twice_fract = self.fract().0 * BigInt::from(2);
        if twice_fract < BigRational::one() {
            floor
        } else if twice_fract > BigRational::one() || floor.is_odd() {
            floor + 1
        } else {
            floor
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.0
            .to_f64()
            .unwrap_or_else(|| (math::log2_big(self.numer()) - math::log2_big(self.denom())).exp2())
    }

    /// Binary logarithm of a positive rational. Returns NaN for non-positive values.
    ///
    /// Values close to 1 are evaluated via `ln_1p` to retain precision for tiny commas.
    pub fn log2(&self) -> f64 {
        if !self.is_positive() {
            return f64::NAN;
        }
        let two = BigRational::from_integer(BigInt::from(2));
        if self.0 > two.recip() && self.0 < two {
            let deviation = Self(&self.0 - BigRational::one()).to_f64();
            return deviation.ln_1p() / std::f64::consts::LN_2;
        }
        math::log2_big(self.numer()) - math::log2_big(self.denom())
    }

    /// Returns the exact `k`-th root of a positive rational if there is one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Rational;
    /// let ratio = Rational::new(16, 81).unwrap();
    /// assert_eq!(ratio.nth_root(4), Some(Rational::new(2, 3).unwrap()));
    /// assert_eq!(ratio.nth_root(3), None);
    /// ```
    pub fn nth_root(&self, k: u32) -> Option<Self> {
        if !self.is_positive() || k == 0 {
            return None;
        }
        let denom = exact_root(self.denom(), k)?;
        let numer = exact_root(self.numer(), k)?;
        Some(Self::from_reduced(numer, denom))
    }

    /// Decomposes a positive rational into `root^multiplicity` with the largest possible multiplicity.
    ///
    /// The returned root is not itself a perfect power. 1 decomposes into `1^1`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Rational;
    /// let ratio = Rational::new(64, 729).unwrap();
    /// assert_eq!(ratio.perfect_power(), (Rational::new(2, 3).unwrap(), 6));
    ///
    /// let ratio = Rational::new(3, 2).unwrap();
    /// assert_eq!(ratio.perfect_power(), (ratio.clone(), 1));
    /// ```
    pub fn perfect_power(&self) -> (Self, u64) {
        let mut root = self.clone();
        let mut multiplicity = 1;
        if !self.is_positive() || self.is_one() {
            return (root, multiplicity);
        }
        'reduce: loop {
            let max_exponent = root.numer().bits().max(root.denom().bits());
            for prime in math::Primes::default().take_while(|&prime| prime <= max_exponent) {
                let Ok(k) = u32::try_from(prime) else {
                    break;
                };
                if let Some(smaller_root) = root.nth_root(k) {
                    root = smaller_root;
                    multiplicity *= prime;
                    continue 'reduce;
                }
            }
            return (root, multiplicity);
        }
    }
}

fn exact_root(number: &BigInt, k: u32) -> Option<BigInt> {
    if number.is_one() {
        return Some(BigInt::one());
    }
    let root = number.nth_root(k);
    (Pow::pow(&root, k) == *number).then_some(root)
}

/// A decimal literal like `1.25`, `-3` or `2.5e-3` read as an exact rational.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Decimal {
    pub value: Rational,
    /// Number of decimal places needed to write the value without an exponent.
    pub fraction_digits: u64,
}

impl Decimal {
    pub(crate) fn parse(literal: &str) -> Result<Self, String> {
        let (mantissa, exponent) = match literal.find(['e', 'E']) {
            Some(position) => (&literal[..position], &literal[position + 1..]),
            None => (literal, "0"),
        };
        let exponent = exponent
            .parse::<i64>()
            .map_err(|_| format!("Invalid exponent '{exponent}'"))?;
        if exponent.abs() > MAX_DECIMAL_EXPONENT {
            return Err(format!("Exponent {exponent} is out of range"));
        }

        let (sign, unsigned) = match mantissa.strip_prefix('-') {
            Some(unsigned) => (-1, unsigned),
            None => (1, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (integer_part, fraction_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if integer_part.len() + fraction_part.len() == 0 || !is_digits(integer_part) || !is_digits(fraction_part) {
            return Err("Must be a decimal number (e.g. 1.25)".to_owned());
        }

        let digits = BigInt::parse_bytes(format!("{integer_part}{fraction_part}").as_bytes(), 10)
            .ok_or_else(|| "Must be a decimal number (e.g. 1.25)".to_owned())?;
        let scale = fraction_part.len() as i64 - exponent;
        let power_of_ten = Pow::pow(BigInt::from(10), scale.unsigned_abs());
        let (numer, denom) = if scale >= 0 {
            (digits * sign, power_of_ten)
        } else {
            (digits * power_of_ten * sign, BigInt::one())
        };

        Ok(Self {
            value: Rational(BigRational::new(numer, denom)),
            fraction_digits: scale.max(0).unsigned_abs(),
        })
    }
}

/// Parses integers (`5`), fractions (`7/5`) and decimals (`1.25`).
impl FromStr for Rational {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        match literal.split_once('/') {
            Some((numer, denom)) => {
                let parse_integer = |part: &str| {
                    part.trim()
                        .parse::<BigInt>()
                        .map_err(|_| ParseError::malformed(literal, "Must be a fraction (e.g. 7/5)"))
                };
                let numer = parse_integer(numer)?;
                let denom = parse_integer(denom)?;
                Rational::new(numer, denom).map_err(|err| ParseError::invalid_value(literal, err).into())
            }
            None => Decimal::parse(literal)
                .map(|decimal| decimal.value)
                .map_err(|reason| ParseError::malformed(literal, reason).into()),
        }
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = if self.denom().is_one() {
            self.numer().to_string()
        } else {
            format!("{}/{}", self.numer(), self.denom())
        };
        f.pad_integral(true, "", &formatted)
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl Add<&Rational> for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        Rational(&self.0 + &rhs.0)
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        Rational(self.0 + rhs.0)
    }
}

impl Sub<&Rational> for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        Rational(&self.0 - &rhs.0)
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        Rational(self.0 - rhs.0)
    }
}

impl Mul<&Rational> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        Rational(&self.0 * &rhs.0)
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        Rational(self.0 * rhs.0)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn ratio(numer: i64, denom: i64) -> Rational {
        Rational::new(numer, denom).unwrap()
    }

    #[test]
    fn parse_decimals() {
        let test_cases = [
            ("1.5", ratio(3, 2), 1),
            ("1.2", ratio(6, 5), 1),
            ("-0.25", ratio(-1, 4), 2),
            ("+3", ratio(3, 1), 0),
            ("2.", ratio(2, 1), 0),
            (".5", ratio(1, 2), 1),
            ("2.5e-3", ratio(1, 400), 4),
            ("1.25E2", ratio(125, 1), 0),
        ];

        for (input, expected_value, expected_digits) in test_cases {
            let decimal = Decimal::parse(input).unwrap();
            assert_eq!(decimal.value, expected_value, "{input}");
            assert_eq!(decimal.fraction_digits, expected_digits, "{input}");
        }
    }

    #[test]
    fn parse_invalid_decimals() {
        for input in ["", ".", "abc", "1.2.3", "inf", "NaN", "1e", "1e99999", "--1", "1 5"] {
            assert!(Decimal::parse(input).is_err(), "{input}");
        }
    }

    #[test]
    fn parse_rationals() {
        assert_eq!("7/5".parse::<Rational>().unwrap(), ratio(7, 5));
        assert_eq!(" -12/8 ".parse::<Rational>().unwrap(), ratio(-3, 2));
        assert_eq!("1.125".parse::<Rational>().unwrap(), ratio(9, 8));

        let error = "3/0".parse::<Rational>().unwrap_err();
        let DomainError::Parse(parse_error) = error else {
            panic!("Unexpected error {error:?}");
        };
        assert_eq!(parse_error.cause(), Some(&DomainError::ZeroDenominator));

        assert!("3/x".parse::<Rational>().unwrap_err().is_parse_error());
    }

    #[test]
    fn floor_and_fract_of_negative_numbers() {
        let value = ratio(-7, 3);
        assert_eq!(value.floor(), BigInt::from(-3));
        assert_eq!(value.fract(), ratio(2, 3));
    }

    #[test]
    fn logarithms() {
        assert_approx_eq!(ratio(8, 1).log2(), 3.0);
        assert_approx_eq!(ratio(1, 8).log2(), -3.0);
        assert_approx_eq!(ratio(81, 80).log2() * 1200.0, 21.506290);
        assert!(Rational::zero().log2().is_nan());

        let schisma = Rational::new(
            BigInt::from(3).pow(8u32) * BigInt::from(5),
            BigInt::from(2).pow(15u32),
        )
        .unwrap();
        assert_approx_eq!(schisma.log2() * 1200.0, 1.953720);
    }

    #[test]
    fn perfect_powers() {
        assert_eq!(ratio(1, 1).perfect_power(), (ratio(1, 1), 1));
        assert_eq!(ratio(4, 1).perfect_power(), (ratio(2, 1), 2));
        assert_eq!(ratio(1, 4).perfect_power(), (ratio(1, 2), 2));
        assert_eq!(ratio(1024, 59049).perfect_power(), (ratio(2, 3), 10));
        assert_eq!(ratio(8, 27).perfect_power(), (ratio(2, 3), 3));
        assert_eq!(ratio(12, 1).perfect_power(), (ratio(12, 1), 1));
    }

    #[test]
    fn display() {
        assert_eq!(ratio(4, 2).to_string(), "2");
        assert_eq!(ratio(-3, 9).to_string(), "-1/3");
        assert_eq!(format!("{:>5}", ratio(3, 2)), "  3/2");
    }
}
