//! Best rational approximations from continued fraction expansions.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use crate::{error::DomainError, interval::Interval, rational::Rational};

/// Denominator bound for the convergents of inexact values unless configured otherwise.
pub const DEFAULT_MAX_DENOMINATOR: u64 = 1_000_000_000;

/// Term bound for the convergents of inexact values unless configured otherwise.
pub const DEFAULT_MAX_TERMS: usize = 64;

/// Lazily computed convergents `p/q` of a number.
///
/// Every yielded convergent has a strictly larger denominator and a strictly smaller error than its predecessor.
/// For exact inputs the sequence ends with the input itself.
/// For inexact inputs the sequence ends as soon as a convergent reproduces the input float or a bound is reached.
///
/// # Examples
///
/// ```
/// # use intervallic::{convergent::Convergents, Rational};
/// let pi = Convergents::approximate(std::f64::consts::PI)
///     .take(3)
///     .map(|convergent| convergent.to_string())
///     .collect::<Vec<_>>();
/// assert_eq!(pi, ["3", "22/7", "333/106"]);
///
/// let limited = Convergents::approximate(std::f64::consts::PI)
///     .with_max_denominator(200)
///     .last();
/// assert_eq!(limited, Some(Rational::new(355, 113).unwrap()));
/// ```
#[derive(Clone, Debug)]
pub struct Convergents {
    remainder: Option<Rational>,
    target: Option<f64>,
    previous: (BigInt, BigInt),
    current: (BigInt, BigInt),
    pending: Option<Rational>,
    max_denominator: Option<BigInt>,
    max_terms: Option<usize>,
    num_emitted: usize,
}

impl Convergents {
    /// Convergents of an exact value. Unbounded unless configured otherwise.
    pub fn exact(value: Rational) -> Self {
        Self::from_parts(Some(value), None, None, None)
    }

    /// Convergents of a float, bounded by [`DEFAULT_MAX_DENOMINATOR`] and [`DEFAULT_MAX_TERMS`].
    ///
    /// Non-finite values yield no convergents.
    pub fn approximate(value: f64) -> Self {
        let remainder = Rational::from_f64(value)
            .map_err(|err| log::debug!("No convergents for {value}: {err}"))
            .ok();
        Self::from_parts(
            remainder,
            Some(value),
            Some(BigInt::from(DEFAULT_MAX_DENOMINATOR)),
            Some(DEFAULT_MAX_TERMS),
        )
    }

    fn from_parts(
        remainder: Option<Rational>,
        target: Option<f64>,
        max_denominator: Option<BigInt>,
        max_terms: Option<usize>,
    ) -> Self {
        Self {
            remainder,
            target,
            previous: (BigInt::zero(), BigInt::one()),
            current: (BigInt::one(), BigInt::zero()),
            pending: None,
            max_denominator,
            max_terms,
            num_emitted: 0,
        }
    }

    /// Stops before the first convergent whose denominator exceeds `max_denominator`.
    pub fn with_max_denominator(mut self, max_denominator: u64) -> Self {
        self.max_denominator = Some(BigInt::from(max_denominator));
        self
    }

    /// Stops after `max_terms` convergents.
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = Some(max_terms);
        self
    }

    /// Advances the classic recurrence `p_k = a_k p_{k-1} + p_{k-2}`, `q_k = a_k q_{k-1} + q_{k-2}`.
    fn next_raw(&mut self) -> Option<(BigInt, BigInt)> {
        let value = self.remainder.take()?;
        let partial_quotient = value.floor();
        let fraction = value.fract();

        let numer = &partial_quotient * &self.current.0 + &self.previous.0;
        let denom = &partial_quotient * &self.current.1 + &self.previous.1;
        self.previous = std::mem::replace(&mut self.current, (numer.clone(), denom.clone()));

        if !fraction.is_zero() {
            self.remainder = fraction.recip().ok();
        }
        Some((numer, denom))
    }

    fn emit(&mut self, convergent: Rational) -> Option<Rational> {
        self.num_emitted += 1;
        Some(convergent)
    }
}

impl Iterator for Convergents {
    type Item = Rational;

    fn next(&mut self) -> Option<Self::Item> {
        if self
            .max_terms
            .is_some_and(|max_terms| self.num_emitted >= max_terms)
        {
            return None;
        }

        while let Some((numer, denom)) = self.next_raw() {
            if self
                .max_denominator
                .as_ref()
                .is_some_and(|max_denominator| &denom > max_denominator)
            {
                log::trace!("Convergents truncated at denominator {denom}");
                self.remainder = None;
                break;
            }

            let convergent = Rational::from_reduced(numer, denom);
            if self.target == Some(convergent.to_f64()) {
                self.remainder = None;
            }

            // Only the leading convergent can share its denominator with the next one
            let denom_increased = self
                .pending
                .as_ref()
                .is_some_and(|previous| previous.denom() < convergent.denom());
            if let Some(previous) = self.pending.replace(convergent).filter(|_| denom_increased) {
                return self.emit(previous);
            }
        }

        let last = self.pending.take()?;
        self.emit(last)
    }
}

/// An approximation `period^(steps/division)` produced by [`EdxConvergents`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdxConvergent {
    pub steps: i64,
    pub division: i64,
}

impl EdxConvergent {
    pub fn to_interval(self, period: &Rational) -> Result<Interval, DomainError> {
        Interval::from_edx_steps(self.steps, self.division, period.clone())
    }
}

/// Convergents of the number of periods in an interval, see [`Interval::edx_convergents`].
///
/// # Examples
///
/// ```
/// # use intervallic::{convergent::EdxConvergent, Interval, Rational};
/// let fifth = Interval::from_fraction(3, 2).unwrap();
/// let edos = fifth
///     .edx_convergents(&Rational::from(2))
///     .unwrap()
///     .take(4)
///     .collect::<Vec<_>>();
/// assert_eq!(
///     edos,
///     [
///         EdxConvergent { steps: 1, division: 1 },
///         EdxConvergent { steps: 1, division: 2 },
///         EdxConvergent { steps: 3, division: 5 },
///         EdxConvergent { steps: 7, division: 12 },
///     ]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct EdxConvergents {
    convergents: Convergents,
}

impl EdxConvergents {
    pub(crate) fn new(convergents: Convergents) -> Self {
        Self { convergents }
    }

    /// See [`Convergents::with_max_denominator`].
    pub fn with_max_division(self, max_division: u64) -> Self {
        Self::new(self.convergents.with_max_denominator(max_division))
    }

    /// See [`Convergents::with_max_terms`].
    pub fn with_max_terms(self, max_terms: usize) -> Self {
        Self::new(self.convergents.with_max_terms(max_terms))
    }
}

impl Iterator for EdxConvergents {
    type Item = EdxConvergent;

    fn next(&mut self) -> Option<Self::Item> {
        let convergent = self.convergents.next()?;
        Some(EdxConvergent {
            steps: convergent.numer().to_i64()?,
            division: convergent.denom().to_i64()?,
        })
    }
}
