//! Prime-exponent vectors representing rational intervals.

use std::{
    collections::BTreeMap,
    fmt::{self, Display, Write},
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Pow, ToPrimitive, Zero};

use crate::{
    error::{DomainError, ParseError},
    math::{self, Primes},
    rational::Rational,
};

/// Largest prime [`Monzo::from_rational`] will factor out.
pub const MAX_FACTOR_PRIME: u64 = 65_521;

/// A rational number written as its prime exponents, e.g. `[-4 4 -1>` for 81/80.
///
/// Only nonzero exponents are stored, so equal rationals have equal [`Monzo`]s.
///
/// # Examples
///
/// ```
/// # use intervallic::{Monzo, Rational};
/// let syntonic_comma = Monzo::from_rational(&Rational::new(81, 80).unwrap()).unwrap();
/// assert_eq!(syntonic_comma, Monzo::new(&[-4, 4, -1]));
/// assert_eq!(syntonic_comma.to_string(), "[-4 4 -1>");
/// assert_eq!(format!("{syntonic_comma:#}"), "2^-4 * 3^4 * 5^-1");
/// assert_eq!(syntonic_comma.to_rational(), Rational::new(81, 80).unwrap());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Monzo {
    exponents: BTreeMap<usize, i64>,
}

impl Monzo {
    /// Creates a [`Monzo`] from exponents of consecutive primes starting at 2.
    pub fn new(exponents: &[i64]) -> Self {
        exponents.iter().copied().enumerate().collect()
    }

    pub fn unison() -> Self {
        Self::default()
    }

    /// Creates a [`Monzo`] from `(prime, exponent)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, Monzo};
    /// let monzo = Monzo::from_prime_powers([(2, -1), (7, 1)]).unwrap();
    /// assert_eq!(monzo, Monzo::new(&[-1, 0, 0, 1]));
    ///
    /// assert_eq!(Monzo::from_prime_powers([(9, 1)]), Err(DomainError::NotPrime(9)));
    /// assert!(matches!(
    ///     Monzo::from_prime_powers([(1_000_000_007, 1)]),
    ///     Err(DomainError::PrimeTooLarge { .. })
    /// ));
    /// ```
    pub fn from_prime_powers(
        prime_powers: impl IntoIterator<Item = (u64, i64)>,
    ) -> Result<Self, DomainError> {
        let mut monzo = Self::unison();
        for (prime, exponent) in prime_powers {
            if prime > MAX_FACTOR_PRIME && math::is_prime(prime) {
                return Err(DomainError::PrimeTooLarge {
                    value: prime.to_string(),
                    limit: MAX_FACTOR_PRIME,
                });
            }
            let index = math::prime_index(prime).ok_or(DomainError::NotPrime(prime))?;
            monzo.add_to_entry(index, exponent);
        }
        Ok(monzo)
    }

    /// Factors a positive rational by trial division with successive primes.
    ///
    /// Fails if a prime factor exceeds [`MAX_FACTOR_PRIME`].
    pub fn from_rational(ratio: &Rational) -> Result<Self, DomainError> {
        if !ratio.is_positive() {
            return Err(DomainError::NonPositiveRatio(ratio.to_string()));
        }

        let mut numer = ratio.numer().clone();
        let mut denom = ratio.denom().clone();
        let mut monzo = Self::unison();

        for (index, prime) in Primes::default().enumerate() {
            if numer.is_one() && denom.is_one() {
                break;
            }
            let prime_as_bigint = BigInt::from(prime);
            if &prime_as_bigint * &prime_as_bigint > numer && &prime_as_bigint * &prime_as_bigint > denom {
                // Any cofactor left is a prime
                for (cofactor, sign) in [(&numer, 1), (&denom, -1)] {
                    if !cofactor.is_one() {
                        let cofactor_index = cofactor
                            .to_u64()
                            .filter(|&cofactor| cofactor <= MAX_FACTOR_PRIME)
                            .and_then(math::prime_index)
                            .ok_or_else(|| too_large(ratio))?;
                        monzo.add_to_entry(cofactor_index, sign);
                    }
                }
                break;
            }
            if prime > MAX_FACTOR_PRIME {
                return Err(too_large(ratio));
            }
            let exponent = remove_factor(&mut numer, &prime_as_bigint)
                - remove_factor(&mut denom, &prime_as_bigint);
            monzo.add_to_entry(index, exponent);
        }

        Ok(monzo)
    }

    pub fn to_rational(&self) -> Rational {
        let mut numer = BigInt::one();
        let mut denom = BigInt::one();
        for (prime, exponent) in self.prime_exponents() {
            let power = Pow::pow(BigInt::from(prime), exponent.unsigned_abs());
            if exponent > 0 {
                numer *= power;
            } else {
                denom *= power;
            }
        }
        Rational::from_reduced(numer, denom)
    }

    /// The exponent of the prime at position `index`, i.e. index 0 refers to the prime 2.
    pub fn entry_at(&self, index: usize) -> i64 {
        self.exponents.get(&index).copied().unwrap_or(0)
    }

    /// The exponent of `prime`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, Monzo};
    /// let monzo = Monzo::new(&[-4, 4, -1]);
    /// assert_eq!(monzo.entry_at_prime(3), Ok(4));
    /// assert_eq!(monzo.entry_at_prime(101), Ok(0));
    /// assert_eq!(monzo.entry_at_prime(4), Err(DomainError::NotPrime(4)));
    /// ```
    pub fn entry_at_prime(&self, prime: u64) -> Result<i64, DomainError> {
        if !math::is_prime(prime) {
            return Err(DomainError::NotPrime(prime));
        }
        if prime > self.prime_limit() {
            return Ok(0);
        }
        Ok(self
            .prime_exponents()
            .find(|&(candidate, _)| candidate == prime)
            .map_or(0, |(_, exponent)| exponent))
    }

    /// Indexes of the primes with a nonzero exponent, in ascending order.
    pub fn support(&self) -> impl Iterator<Item = usize> + '_ {
        self.exponents.keys().copied()
    }

    /// Primes with a nonzero exponent and their exponents, in ascending order.
    pub fn prime_exponents(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        let mut primes = Primes::default();
        self.exponents
            .iter()
            .map(move |(&index, &exponent)| (primes.skip_to(index), exponent))
    }

    /// Dense exponents from the prime 2 up to the highest prime present.
    pub fn entries(&self) -> Vec<i64> {
        (0..self.dimension()).map(|index| self.entry_at(index)).collect()
    }

    /// Number of primes up to and including the highest prime present.
    pub fn dimension(&self) -> usize {
        self.exponents
            .last_key_value()
            .map_or(0, |(&index, _)| index + 1)
    }

    /// The highest prime present. 1 for the unison.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Monzo;
    /// assert_eq!(Monzo::new(&[-4, 4, -1]).prime_limit(), 5);
    /// assert_eq!(Monzo::new(&[3, 0, 0, 0]).prime_limit(), 2);
    /// assert_eq!(Monzo::unison().prime_limit(), 1);
    /// ```
    pub fn prime_limit(&self) -> u64 {
        self.exponents
            .last_key_value()
            .map_or(1, |(&index, _)| math::prime_at(index))
    }

    pub fn is_unison(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn negate(&self) -> Self {
        self.exponents
            .iter()
            .map(|(&index, &exponent)| (index, -exponent))
            .collect()
    }

    pub fn scale(&self, factor: i64) -> Self {
        self.exponents
            .iter()
            .map(|(&index, &exponent)| (index, exponent * factor))
            .collect()
    }

    /// Like [`Monzo::scale`] but returns [`None`] if an exponent overflows.
    pub fn checked_scale(&self, factor: i64) -> Option<Self> {
        self.exponents
            .iter()
            .map(|(&index, &exponent)| Some((index, exponent.checked_mul(factor)?)))
            .collect()
    }

    /// The largest `k` such that `self` is the `k`-th power of another [`Monzo`]. 0 for the unison.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Monzo;
    /// let monzo = Monzo::new(&[6, -4, 0, 2]);
    /// assert_eq!(monzo.power_multiplicity(), 2);
    /// assert_eq!(monzo.root(2), Some(Monzo::new(&[3, -2, 0, 1])));
    /// assert_eq!(monzo.root(4), None);
    /// assert_eq!(Monzo::unison().power_multiplicity(), 0);
    /// ```
    pub fn power_multiplicity(&self) -> i64 {
        self.exponents
            .values()
            .fold(0, |multiplicity, exponent| multiplicity.gcd(exponent))
    }

    /// The `k`-th root if all exponents are divisible by `k`.
    pub fn root(&self, k: i64) -> Option<Self> {
        if k == 0 {
            return None;
        }
        self.exponents
            .iter()
            .map(|(&index, &exponent)| {
                let (quotient, remainder) = exponent.div_rem(&k);
                (remainder == 0).then_some((index, quotient))
            })
            .collect()
    }

    fn add_to_entry(&mut self, index: usize, exponent: i64) {
        let entry = self.exponents.entry(index).or_insert(0);
        *entry += exponent;
        if *entry == 0 {
            self.exponents.remove(&index);
        }
    }
}

fn remove_factor(number: &mut BigInt, prime: &BigInt) -> i64 {
    let mut multiplicity = 0;
    loop {
        let (quotient, remainder) = number.div_rem(prime);
        if !remainder.is_zero() {
            return multiplicity;
        }
        *number = quotient;
        multiplicity += 1;
    }
}

fn too_large(ratio: &Rational) -> DomainError {
    log::debug!("{ratio} cannot be factored into primes up to {MAX_FACTOR_PRIME}");
    DomainError::PrimeTooLarge {
        value: ratio.to_string(),
        limit: MAX_FACTOR_PRIME,
    }
}

impl FromIterator<(usize, i64)> for Monzo {
    fn from_iter<T: IntoIterator<Item = (usize, i64)>>(iter: T) -> Self {
        let mut monzo = Self::unison();
        for (index, exponent) in iter {
            monzo.add_to_entry(index, exponent);
        }
        monzo
    }
}

/// Renders the ket notation `[-4 4 -1>`. The alternate form renders the factorization `2^-4 * 3^4 * 5^-1`.
impl Display for Monzo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatted = String::new();
        if f.alternate() {
            if self.is_unison() {
                formatted.push('1');
            }
            for (position, (prime, exponent)) in self.prime_exponents().enumerate() {
                if position > 0 {
                    formatted.push_str(" * ");
                }
                match exponent {
                    1 => write!(formatted, "{prime}")?,
                    _ => write!(formatted, "{prime}^{exponent}")?,
                }
            }
        } else {
            let entries = self.entries().iter().map(i64::to_string).collect::<Vec<_>>();
            write!(formatted, "[{}>", entries.join(" "))?;
        }
        f.pad(&formatted)
    }
}

/// Parses the ket notation, e.g. `[-4 4 -1>` or `[-4, 4, -1>`.
impl FromStr for Monzo {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        let entries = literal
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(|| ParseError::malformed(literal, "Must be a ket (e.g. [-4 4 -1>)"))?;
        let exponents = entries
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<i64>()
                    .map_err(|_| ParseError::malformed(literal, format!("Invalid exponent '{entry}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(&exponents))
    }
}

impl Add<&Monzo> for &Monzo {
    type Output = Monzo;

    fn add(self, rhs: &Monzo) -> Monzo {
        let mut sum = self.clone();
        for (&index, &exponent) in &rhs.exponents {
            sum.add_to_entry(index, exponent);
        }
        sum
    }
}

impl Add for Monzo {
    type Output = Monzo;

    fn add(self, rhs: Monzo) -> Monzo {
        &self + &rhs
    }
}

impl Sub<&Monzo> for &Monzo {
    type Output = Monzo;

    fn sub(self, rhs: &Monzo) -> Monzo {
        self + &rhs.negate()
    }
}

impl Sub for Monzo {
    type Output = Monzo;

    fn sub(self, rhs: Monzo) -> Monzo {
        &self - &rhs
    }
}

impl Neg for &Monzo {
    type Output = Monzo;

    fn neg(self) -> Monzo {
        self.negate()
    }
}

impl Neg for Monzo {
    type Output = Monzo;

    fn neg(self) -> Monzo {
        self.negate()
    }
}

impl Mul<i64> for &Monzo {
    type Output = Monzo;

    fn mul(self, rhs: i64) -> Monzo {
        self.scale(rhs)
    }
}

impl Mul<i64> for Monzo {
    type Output = Monzo;

    fn mul(self, rhs: i64) -> Monzo {
        self.scale(rhs)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn monzo_of(numer: i64, denom: i64) -> Monzo {
        Monzo::from_rational(&Rational::new(numer, denom).unwrap()).unwrap()
    }

    #[test]
    fn factor_rationals() {
        let test_cases: [(i64, i64, &[(u64, i64)]); 6] = [
            (1, 1, &[]),
            (81, 1210, &[(2, -1), (3, 4), (5, -1), (11, -2)]),
            (104060401, 1, &[(101, 4)]),
            (6, 5, &[(2, 1), (3, 1), (5, -1)]),
            (1, 541, &[(541, -1)]),
            (65521 * 2, 3, &[(2, 1), (3, -1), (65521, 1)]),
        ];

        for (numer, denom, expected) in test_cases {
            let monzo = monzo_of(numer, denom);
            assert_eq!(monzo.prime_exponents().collect::<Vec<_>>(), expected, "{numer}/{denom}");
            assert_eq!(monzo.to_rational(), Rational::new(numer, denom).unwrap());
        }
    }

    #[test]
    fn reject_unfactorable_rationals() {
        let large_prime = Rational::new(65537, 1).unwrap();
        assert_eq!(
            Monzo::from_rational(&large_prime),
            Err(DomainError::PrimeTooLarge {
                value: "65537".to_owned(),
                limit: MAX_FACTOR_PRIME
            })
        );

        let zero = Rational::zero();
        assert!(matches!(
            Monzo::from_rational(&zero),
            Err(DomainError::NonPositiveRatio(_))
        ));
    }

    #[test]
    fn vector_arithmetic() {
        let fifth = monzo_of(3, 2);
        let fourth = monzo_of(4, 3);

        assert_eq!(&fifth + &fourth, monzo_of(2, 1));
        assert_eq!(&fifth - &fourth, monzo_of(9, 8));
        assert_eq!(-fifth.clone(), monzo_of(2, 3));
        assert_eq!(fifth.scale(4), monzo_of(81, 16));
        assert_eq!(fifth.scale(0), Monzo::unison());
        assert_eq!(&fifth + &fifth.negate(), Monzo::unison());
    }

    #[test]
    fn support_and_entries() {
        let monzo = Monzo::new(&[0, -1, 0, 0, 1]);

        assert_eq!(monzo.support().collect::<Vec<_>>(), [1, 4]);
        assert_eq!(monzo.entries(), [0, -1, 0, 0, 1]);
        assert_eq!(monzo.dimension(), 5);
        assert_eq!(monzo.prime_limit(), 11);
        assert_eq!(monzo.entry_at(1), -1);
        assert_eq!(monzo.entry_at(200), 0);
    }

    #[test]
    fn entries_at_primes_beyond_support() {
        let monzo = Monzo::new(&[1]);
        assert_eq!(monzo.entry_at_prime(1_000_000_007), Ok(0));
        assert_eq!(monzo.entry_at_prime(9_999_999_967), Ok(0));
        assert_eq!(monzo.entry_at_prime(1_000_000_008), Err(DomainError::NotPrime(1_000_000_008)));

        let monzo = monzo_of(65521 * 7, 1);
        assert_eq!(monzo.entry_at_prime(65521), Ok(1));
        assert_eq!(monzo.entry_at_prime(65519), Ok(0));
        assert_eq!(monzo.prime_exponents().collect::<Vec<_>>(), [(7, 1), (65521, 1)]);
    }

    #[test]
    fn perfect_powers() {
        let monzo = monzo_of(3 * 3 * 3 * 3, 5 * 5);
        assert_eq!(monzo.power_multiplicity(), 2);
        assert_eq!(monzo.root(2).map(|root| root.to_rational()), Rational::new(9, 5).ok());
        assert_eq!(monzo.root(0), None);
        assert_eq!(monzo.checked_scale(i64::MAX), None);
        assert_eq!(monzo.checked_scale(-1), Some(monzo.negate()));
    }

    #[test]
    fn format_monzos() {
        assert_eq!(Monzo::new(&[-2, -3, 0, 1]).to_string(), "[-2 -3 0 1>");
        assert_eq!(Monzo::unison().to_string(), "[>");
        assert_eq!(format!("{:#}", monzo_of(18 * 5, 23)), "2 * 3^2 * 5 * 23^-1");
        assert_eq!(format!("{:#}", Monzo::unison()), "1");
    }

    #[test]
    fn parse_monzos() {
        assert_eq!("[-4 4 -1>".parse::<Monzo>().unwrap(), Monzo::new(&[-4, 4, -1]));
        assert_eq!(" [1, 0, 2> ".parse::<Monzo>().unwrap(), Monzo::new(&[1, 0, 2]));
        assert_eq!("[>".parse::<Monzo>().unwrap(), Monzo::unison());
        assert!("[1 x>".parse::<Monzo>().unwrap_err().is_parse_error());
        assert!("1 2".parse::<Monzo>().unwrap_err().is_parse_error());
    }
}
