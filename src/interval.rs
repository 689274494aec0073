//! Musical intervals with an approximate size in cents and, where known, an exact value.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
    ops::{Add, Div, Mul, Neg, Rem, Sub},
};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;

use crate::{
    convergent::{Convergents, EdxConvergent, EdxConvergents},
    error::DomainError,
    monzo::Monzo,
    rational::Rational,
};

pub const CENTS_PER_OCTAVE: f64 = 1200.0;

/// Exact powers whose rational value would need more bits than this are kept as edX steps.
pub const MAX_EXACT_BITS: u64 = 1 << 16;

/// The exact value of an [`Interval`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exact {
    /// A frequency ratio.
    Ratio(Rational),
    /// A step of an equal division of a period.
    EdxStep(EdxStep),
}

/// `steps` out of `division` equal parts of `period`, i.e. the frequency ratio `period^(steps/division)`.
///
/// Steps and division are kept in lowest terms.
///
/// # Examples
///
/// ```
/// # use intervallic::{EdxStep, Rational};
/// let step = EdxStep::edo(6, 12).unwrap();
/// assert_eq!((step.steps(), step.division()), (1, 2));
/// assert_eq!(step.to_string(), "1\\2");
///
/// let tritave_step = EdxStep::new(1, 13, Rational::from(3)).unwrap();
/// assert_eq!(tritave_step.to_string(), "1\\13<3>");
///
/// assert!(EdxStep::edo(1, 0).is_err());
/// assert!(EdxStep::new(1, 5, Rational::from(1)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdxStep {
    steps: i64,
    division: i64,
    period: Rational,
}

impl EdxStep {
    pub fn new(steps: i64, division: i64, period: Rational) -> Result<Self, DomainError> {
        if division <= 0 {
            return Err(DomainError::NonPositiveDivision(division));
        }
        check_period(&period)?;
        let common_divisor = steps.gcd(&division);
        Ok(Self {
            steps: steps / common_divisor,
            division: division / common_divisor,
            period,
        })
    }

    /// A step of an equal division of the octave.
    pub fn edo(steps: i64, division: i64) -> Result<Self, DomainError> {
        Self::new(steps, division, Rational::from(2))
    }

    pub fn steps(&self) -> i64 {
        self.steps
    }

    pub fn division(&self) -> i64 {
        self.division
    }

    pub fn period(&self) -> &Rational {
        &self.period
    }

    pub fn exponent(&self) -> Rational {
        Rational::from_reduced(BigInt::from(self.steps), BigInt::from(self.division))
    }
}

pub(crate) fn check_period(period: &Rational) -> Result<(), DomainError> {
    if *period <= Rational::one() {
        return Err(DomainError::InvalidPeriod(period.to_string()));
    }
    Ok(())
}

/// Canonical form `base^exponent` of an exact value.
///
/// `base` is 1 for the unison (with exponent 0) and otherwise a rational greater than 1 that is no perfect power.
/// Two exact values are equal iff their canonical forms are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Power {
    base: Rational,
    exponent: Rational,
}

impl Power {
    fn unison() -> Self {
        Self {
            base: Rational::one(),
            exponent: Rational::zero(),
        }
    }

    /// `value^exponent` where `value` is positive.
    fn of(value: &Rational, exponent: Rational) -> Self {
        if value.is_one() || exponent.is_zero() {
            return Self::unison();
        }
        if let Ok(monzo) = Monzo::from_rational(value) {
            return Self::of_monzo(&monzo, exponent);
        }
        let (root, multiplicity) = value.perfect_power();
        Self::of_root(root, exponent * Rational::from_integer(multiplicity))
    }

    /// `monzo^exponent` where the multiplicity of the perfect power is read off the prime exponents.
    fn of_monzo(monzo: &Monzo, exponent: Rational) -> Self {
        let multiplicity = monzo.power_multiplicity();
        match monzo.root(multiplicity) {
            Some(root) if !exponent.is_zero() => Self::of_root(
                root.to_rational(),
                exponent * Rational::from_integer(multiplicity),
            ),
            _ => Self::unison(),
        }
    }

    fn of_root(root: Rational, exponent: Rational) -> Self {
        if root > Rational::one() {
            Self {
                base: root,
                exponent,
            }
        } else {
            Self {
                base: Rational::from_reduced(root.denom().clone(), root.numer().clone()),
                exponent: -exponent,
            }
        }
    }

    fn with_exponent(&self, exponent: Rational) -> Self {
        if exponent.is_zero() {
            return Self::unison();
        }
        Self {
            base: self.base.clone(),
            exponent,
        }
    }

    fn is_unison(&self) -> bool {
        self.exponent.is_zero()
    }

    fn cents(&self) -> f64 {
        if self.is_unison() {
            return 0.0;
        }
        CENTS_PER_OCTAVE * self.exponent.to_f64() * self.base.log2()
    }

    fn to_rational(&self) -> Option<Rational> {
        if !self.exponent.is_integer() {
            return None;
        }
        let exponent = self.exponent.numer().to_i64()?;
        let base_bits = self.base.numer().bits().max(self.base.denom().bits());
        if base_bits.saturating_mul(exponent.unsigned_abs()) > MAX_EXACT_BITS {
            log::debug!("{}^{} is too large to be evaluated", self.base, exponent);
            return None;
        }
        self.base.pow(exponent).ok()
    }

    /// The prime factorization of an integral power.
    fn monzo(&self) -> Option<Monzo> {
        if !self.exponent.is_integer() {
            return None;
        }
        let exponent = self.exponent.numer().to_i64()?;
        Monzo::from_rational(&self.base).ok()?.checked_scale(exponent)
    }

    /// The exponent `x` with `self == other^x` if it exists.
    fn exponent_over(&self, other: &Power) -> Option<Rational> {
        if self.is_unison() {
            return Some(Rational::zero());
        }
        if self.base != other.base {
            return None;
        }
        self.exponent.checked_div(&other.exponent).ok()
    }
}

#[derive(Clone, Debug)]
struct ExactCore {
    exact: Exact,
    power: Power,
}

/// The ingredients of an [`Interval`] passed to [`Interval::new`].
///
/// An exact specifier (ratio or edX step) takes precedence over cents.
/// Specifying both a ratio and an edX step is only valid if both describe the same interval.
#[derive(Clone, Debug, Default)]
pub struct IntervalSpec {
    cents: Option<f64>,
    ratio: Option<Rational>,
    edx: Option<EdxStep>,
}

impl IntervalSpec {
    pub fn with_cents(mut self, cents: f64) -> Self {
        self.cents = Some(cents);
        self
    }

    pub fn with_ratio(mut self, ratio: Rational) -> Self {
        self.ratio = Some(ratio);
        self
    }

    pub fn with_edx(mut self, edx: EdxStep) -> Self {
        self.edx = Some(edx);
        self
    }
}

/// A musical interval.
///
/// Every [`Interval`] has a size in cents. Intervals created from a ratio or an edX step additionally carry their exact value which is preserved by arithmetic wherever possible.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use intervallic::Interval;
/// let fifth = Interval::from_fraction(3, 2).unwrap();
/// let fourth = Interval::from_fraction(4, 3).unwrap();
/// assert_eq!(&fifth + &fourth, Interval::octave());
/// assert_approx_eq!(fifth.cents(), 701.955001);
///
/// let semitone = Interval::from_edo_steps(1, 12).unwrap();
/// assert_eq!(semitone * 12, Interval::octave());
/// ```
#[derive(Clone, Debug)]
pub struct Interval {
    cents: f64,
    core: Option<ExactCore>,
}

impl Interval {
    /// Creates an [`Interval`] from any combination of cents, ratio and edX step.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, EdxStep, Interval, IntervalSpec, Rational};
    /// let octave = Interval::new(
    ///     IntervalSpec::default()
    ///         .with_ratio(Rational::from(2))
    ///         .with_edx(EdxStep::edo(12, 12).unwrap()),
    /// )
    /// .unwrap();
    /// assert_eq!(octave, Interval::octave());
    ///
    /// // Cents are recomputed from the exact value
    /// let fifth = Interval::new(
    ///     IntervalSpec::default()
    ///         .with_cents(700.0)
    ///         .with_ratio(Rational::new(3, 2).unwrap()),
    /// )
    /// .unwrap();
    /// assert_eq!(fifth, Interval::from_fraction(3, 2).unwrap());
    ///
    /// let conflicting = IntervalSpec::default()
    ///     .with_ratio(Rational::new(3, 2).unwrap())
    ///     .with_edx(EdxStep::edo(7, 12).unwrap());
    /// assert!(matches!(
    ///     Interval::new(conflicting),
    ///     Err(DomainError::ConflictingSpecifiers { .. })
    /// ));
    ///
    /// assert_eq!(
    ///     Interval::new(IntervalSpec::default()),
    ///     Err(DomainError::MissingSpecifier)
    /// );
    /// ```
    pub fn new(spec: IntervalSpec) -> Result<Self, DomainError> {
        if let Some(cents) = spec.cents {
            check_finite(cents)?;
        }
        let interval = match (spec.ratio, spec.edx) {
            (Some(ratio), Some(edx)) => {
                let ratio_literal = ratio.to_string();
                let from_ratio = Self::from_ratio(ratio)?;
                let from_edx = Self::from_edx_step(edx);
                if from_ratio != from_edx {
                    return Err(DomainError::ConflictingSpecifiers {
                        ratio: ratio_literal,
                        edx: format!("{from_edx:#}"),
                    });
                }
                from_ratio
            }
            (Some(ratio), None) => Self::from_ratio(ratio)?,
            (None, Some(edx)) => Self::from_edx_step(edx),
            (None, None) => {
                return spec
                    .cents
                    .ok_or(DomainError::MissingSpecifier)
                    .and_then(Self::from_cents)
            }
        };
        if let Some(cents) = spec.cents.filter(|&cents| cents != interval.cents) {
            log::debug!(
                "Ignoring {cents} cents in favor of {interval:#} ({} cents)",
                interval.cents
            );
        }
        Ok(interval)
    }

    pub fn unison() -> Self {
        Self::from_positive_ratio(Rational::one())
    }

    pub fn octave() -> Self {
        Self::from_positive_ratio(Rational::from(2))
    }

    /// Creates an inexact [`Interval`].
    pub fn from_cents(cents: f64) -> Result<Self, DomainError> {
        check_finite(cents)?;
        Ok(Self::inexact(cents))
    }

    /// Creates an exact [`Interval`] from a positive ratio.
    pub fn from_ratio(ratio: Rational) -> Result<Self, DomainError> {
        if !ratio.is_positive() {
            return Err(DomainError::NonPositiveRatio(ratio.to_string()));
        }
        Ok(Self::from_positive_ratio(ratio))
    }

    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, Interval};
    /// assert_eq!(Interval::from_fraction(7, 5), "7/5".parse());
    /// assert_eq!(Interval::from_fraction(14, 10), Interval::from_fraction(7, 5));
    ///
    /// assert_eq!(Interval::from_fraction(1, 0), Err(DomainError::ZeroDenominator));
    /// assert!(matches!(
    ///     Interval::from_fraction(-3, 2),
    ///     Err(DomainError::NonPositiveRatio(_))
    /// ));
    /// ```
    pub fn from_fraction(numer: i64, denom: i64) -> Result<Self, DomainError> {
        Self::from_ratio(Rational::new(numer, denom)?)
    }

    /// Creates an inexact [`Interval`] from a floating-point frequency ratio.
    pub fn from_float_ratio(ratio: f64) -> Result<Self, DomainError> {
        check_finite(ratio)?;
        if ratio <= 0.0 {
            return Err(DomainError::NonPositiveRatio(ratio.to_string()));
        }
        Self::from_cents(CENTS_PER_OCTAVE * ratio.log2())
    }

    pub fn from_edx_step(edx: EdxStep) -> Self {
        let power = Power::of(edx.period(), edx.exponent());
        Self::from_core(Exact::EdxStep(edx), power)
    }

    pub fn from_edx_steps(steps: i64, division: i64, period: Rational) -> Result<Self, DomainError> {
        Ok(Self::from_edx_step(EdxStep::new(steps, division, period)?))
    }

    pub fn from_edo_steps(steps: i64, division: i64) -> Result<Self, DomainError> {
        Ok(Self::from_edx_step(EdxStep::edo(steps, division)?))
    }

    pub fn from_monzo(monzo: &Monzo) -> Self {
        Self::from_positive_ratio(monzo.to_rational())
    }

    fn from_positive_ratio(ratio: Rational) -> Self {
        let power = Power::of(&ratio, Rational::one());
        Self::from_core(Exact::Ratio(ratio), power)
    }

    fn from_core(exact: Exact, power: Power) -> Self {
        Self {
            cents: power.cents(),
            core: Some(ExactCore { exact, power }),
        }
    }

    fn inexact(cents: f64) -> Self {
        Self {
            // Normalizes -0.0
            cents: cents + 0.0,
            core: None,
        }
    }

    /// Creates an exact interval from its canonical form, preferring an edX step of one of the given periods.
    fn from_power(power: Power, periods: &[&Rational]) -> Self {
        if let Some(ratio) = power.to_rational() {
            return Self::from_core(Exact::Ratio(ratio), power);
        }

        let (period, exponent) = periods
            .iter()
            .find_map(|&period| {
                let exponent = power.exponent_over(&Power::of(period, Rational::one()))?;
                Some((period.clone(), exponent))
            })
            .unwrap_or_else(|| (power.base.clone(), power.exponent.clone()));

        let edx = exponent
            .numer()
            .to_i64()
            .zip(exponent.denom().to_i64())
            .and_then(|(steps, division)| EdxStep::new(steps, division, period).ok());

        match edx {
            Some(edx) => Self::from_core(Exact::EdxStep(edx), power),
            None => {
                log::debug!(
                    "{}^{} cannot be represented exactly, falling back to cents",
                    power.base,
                    power.exponent
                );
                Self::inexact(power.cents())
            }
        }
    }

    /// The size of the interval in cents.
    pub fn cents(&self) -> f64 {
        self.cents
    }

    pub fn exact(&self) -> Option<&Exact> {
        self.core.as_ref().map(|core| &core.exact)
    }

    pub fn is_exact(&self) -> bool {
        self.core.is_some()
    }

    pub fn is_unison(&self) -> bool {
        match &self.core {
            Some(core) => core.power.is_unison(),
            None => self.cents == 0.0,
        }
    }

    /// The exact frequency ratio if the interval is exact and rational.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{Interval, Rational};
    /// assert_eq!(
    ///     Interval::from_edo_steps(24, 12).unwrap().as_rational(),
    ///     Some(Rational::from(4))
    /// );
    /// assert_eq!(Interval::from_edo_steps(7, 12).unwrap().as_rational(), None);
    /// assert_eq!(Interval::from_cents(1200.0).unwrap().as_rational(), None);
    /// ```
    pub fn as_rational(&self) -> Option<Rational> {
        let core = self.core.as_ref()?;
        match &core.exact {
            Exact::Ratio(ratio) => Some(ratio.clone()),
            Exact::EdxStep(_) => core.power.to_rational(),
        }
    }

    /// The frequency ratio as a float.
    pub fn ratio_value(&self) -> f64 {
        match self.as_rational() {
            Some(ratio) => ratio.to_f64(),
            None => (self.cents / CENTS_PER_OCTAVE).exp2(),
        }
    }

    /// The prime factorization of an exact rational interval.
    pub fn monzo(&self) -> Option<Monzo> {
        Monzo::from_rational(&self.as_rational()?).ok()
    }

    /// The number of `division`-th parts of `period` that make up this interval.
    pub fn edx_steps(&self, division: i64, period: &Rational) -> Result<f64, DomainError> {
        Ok(match self.exact_edx_steps(division, period)? {
            Some(steps) => steps.to_f64(),
            None => self.cents / CENTS_PER_OCTAVE / period.log2() * division as f64,
        })
    }

    /// Like [`Interval::edx_steps`] but only for exact intervals that are an exact power of `period`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{Interval, Rational};
    /// let fifth = Interval::from_edo_steps(7, 12).unwrap();
    /// assert_eq!(
    ///     fifth.exact_edx_steps(24, &Rational::from(2)).unwrap(),
    ///     Some(Rational::from(14))
    /// );
    /// assert_eq!(
    ///     fifth.exact_edx_steps(24, &Rational::from(4)).unwrap(),
    ///     Some(Rational::from(7))
    /// );
    /// assert_eq!(fifth.exact_edx_steps(24, &Rational::from(3)).unwrap(), None);
    /// ```
    pub fn exact_edx_steps(
        &self,
        division: i64,
        period: &Rational,
    ) -> Result<Option<Rational>, DomainError> {
        if division <= 0 {
            return Err(DomainError::NonPositiveDivision(division));
        }
        check_period(period)?;
        Ok(self.core.as_ref().and_then(|core| {
            let exponent = core.power.exponent_over(&Power::of(period, Rational::one()))?;
            Some(exponent * Rational::from(division))
        }))
    }

    fn periods(&self) -> Vec<&Rational> {
        match self.exact() {
            Some(Exact::EdxStep(edx)) => vec![edx.period()],
            _ => Vec::new(),
        }
    }

    fn periods_with<'a>(&'a self, other: &'a Interval) -> Vec<&'a Rational> {
        let mut periods = self.periods();
        periods.extend(other.periods());
        periods
    }

    /// Combines two intervals one on top of the other, i.e. multiplies their ratios.
    ///
    /// The result is exact when both operands are exact.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Interval;
    /// let whole_tone = Interval::from_fraction(9, 8).unwrap();
    /// let major_third = whole_tone.stack(&whole_tone);
    /// assert_eq!(major_third, Interval::from_fraction(81, 64).unwrap());
    ///
    /// let step = Interval::from_edo_steps(7, 15).unwrap();
    /// assert_eq!(step.stack(&Interval::octave()), Interval::from_edo_steps(22, 15).unwrap());
    /// ```
    pub fn stack(&self, other: &Interval) -> Interval {
        let (Some(lhs), Some(rhs)) = (&self.core, &other.core) else {
            return Self::inexact(self.cents + other.cents);
        };
        match stack_powers(&lhs.power, &rhs.power) {
            Some(power) => Self::from_power(power, &self.periods_with(other)),
            None => Self::inexact(self.cents + other.cents),
        }
    }

    /// The interval that cancels `self` when stacked, i.e. the reciprocal ratio.
    pub fn inverse(&self) -> Interval {
        match &self.core {
            Some(core) => Self::from_power(
                core.power.with_exponent(-&core.power.exponent),
                &self.periods(),
            ),
            None => Self::inexact(-self.cents),
        }
    }

    /// Stacks `factor` copies of `self`. Negative factors stack the inverse.
    pub fn multiply(&self, factor: i64) -> Interval {
        match &self.core {
            Some(_) => self.multiply_by_fraction(&Rational::from(factor)),
            None => Self::inexact(self.cents * factor as f64),
        }
    }

    /// Stretches `self` by a rational factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{Interval, Rational};
    /// let step = Interval::from_edo_steps(99, 34).unwrap();
    /// let factor = Rational::new(34, 99).unwrap();
    /// assert_eq!(step.multiply_by_fraction(&factor), Interval::octave());
    ///
    /// let fifth = Interval::from_fraction(3, 2).unwrap();
    /// let half_fifth = fifth.multiply_by_fraction(&Rational::new(1, 2).unwrap());
    /// assert_eq!(half_fifth.to_string(), "1\\2<3/2> (350.98c)");
    /// ```
    pub fn multiply_by_fraction(&self, factor: &Rational) -> Interval {
        match &self.core {
            Some(core) => Self::from_power(
                core.power.with_exponent(&core.power.exponent * factor),
                &self.periods(),
            ),
            None => Self::inexact(self.cents * factor.to_f64()),
        }
    }

    /// Divides `self` into `divisor` equal parts and returns one of them.
    ///
    /// Exact intervals stay exact: a perfect power yields an exact ratio, any other exact value an edX step.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, Interval};
    /// let major_ninth = Interval::from_fraction(81, 64).unwrap();
    /// assert_eq!(
    ///     major_ninth.stretch_from(2),
    ///     Interval::from_fraction(9, 8)
    /// );
    ///
    /// let tritone = Interval::from_edo_steps(6, 12).unwrap();
    /// assert_eq!(tritone.stretch_from(3), Interval::from_edo_steps(2, 12));
    ///
    /// assert_eq!(tritone.stretch_from(0), Err(DomainError::DivisionByZero));
    /// ```
    pub fn stretch_from(&self, divisor: i64) -> Result<Interval, DomainError> {
        if divisor == 0 {
            return Err(DomainError::DivisionByZero);
        }
        Ok(self.divided_unchecked(divisor))
    }

    fn divided_unchecked(&self, divisor: i64) -> Interval {
        match &self.core {
            Some(core) => Self::from_power(
                core.power.with_exponent(
                    &core.power.exponent
                        * &Rational::from_reduced(
                            BigInt::from(divisor.signum()),
                            BigInt::from(divisor.unsigned_abs()),
                        ),
                ),
                &self.periods(),
            ),
            None => Self::inexact(self.cents / divisor as f64),
        }
    }

    /// The factor by which `self` needs to be stretched to become `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Interval;
    /// let large = Interval::from_cents(1200.0).unwrap();
    /// let small = Interval::from_cents(750.0).unwrap();
    /// assert_eq!(small.stretch_factor(&large).unwrap(), 1.6);
    /// ```
    pub fn stretch_factor(&self, other: &Interval) -> Result<f64, DomainError> {
        if self.is_unison() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(match self.exact_stretch_factor(other)? {
            Some(factor) => factor.to_f64(),
            None => other.cents / self.cents,
        })
    }

    /// Like [`Interval::stretch_factor`] but only for exact intervals that are powers of a common base.
    pub fn exact_stretch_factor(&self, other: &Interval) -> Result<Option<Rational>, DomainError> {
        if self.is_unison() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(match (&self.core, &other.core) {
            (Some(unit), Some(other)) => other.power.exponent_over(&unit.power),
            _ => None,
        })
    }

    /// Splits `self` into a whole number of `period`s and a remainder lying between the unison (inclusive) and `period` (exclusive).
    ///
    /// The quotient is rounded towards negative infinity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, Interval};
    /// let major_tenth = Interval::from_fraction(5, 2).unwrap();
    /// assert_eq!(
    ///     major_tenth.divmod_interval(&Interval::octave()),
    ///     Ok((1, Interval::from_fraction(5, 4).unwrap()))
    /// );
    ///
    /// let minor_third_down = Interval::from_fraction(5, 6).unwrap();
    /// assert_eq!(
    ///     minor_third_down.divmod_interval(&Interval::from_fraction(3, 2).unwrap()),
    ///     Ok((-1, Interval::from_fraction(5, 4).unwrap()))
    /// );
    ///
    /// assert_eq!(
    ///     major_tenth.divmod_interval(&Interval::unison()),
    ///     Err(DomainError::UnisonPeriod)
    /// );
    ///
    /// let huge = Interval::from_cents(1e30).unwrap();
    /// assert!(matches!(
    ///     huge.divmod_interval(&Interval::from_cents(1.0).unwrap()),
    ///     Err(DomainError::QuotientOutOfRange { .. })
    /// ));
    /// ```
    pub fn divmod_interval(&self, period: &Interval) -> Result<(i64, Interval), DomainError> {
        if period.is_unison() {
            return Err(DomainError::UnisonPeriod);
        }
        if period.cents < 0.0 {
            let (quotient, remainder) = self.inverse().divmod_interval(&period.inverse())?;
            return Ok((quotient, remainder.inverse()));
        }

        let out_of_range = || DomainError::QuotientOutOfRange {
            dividend: format!("{self:#}"),
            period: format!("{period:#}"),
        };

        let exact_quotient = match (&self.core, &period.core) {
            (Some(dividend), Some(divisor)) => dividend
                .power
                .exponent_over(&divisor.power)
                .map(|quotient| quotient.floor()),
            _ => None,
        };
        let mut quotient = match exact_quotient {
            Some(quotient) => quotient.to_i64(),
            None => float_to_i64((self.cents / period.cents).floor()),
        }
        .ok_or_else(out_of_range)?;

        let mut remainder = self.stack(&period.multiply(quotient).inverse());
        if remainder.cents < 0.0 {
            remainder = remainder.stack(period);
            quotient = quotient.checked_sub(1).ok_or_else(out_of_range)?;
        } else if remainder.cents >= period.cents {
            remainder = remainder.stack(&period.inverse());
            quotient = quotient.checked_add(1).ok_or_else(out_of_range)?;
        }
        Ok((quotient, remainder))
    }

    /// The number of whole `period`s in `self`, see [`Interval::divmod_interval`].
    pub fn floor_div(&self, period: &Interval) -> Result<i64, DomainError> {
        self.divmod_interval(period).map(|(quotient, _)| quotient)
    }

    /// Reduces `self` into the range spanned by `period`, see [`Interval::divmod_interval`].
    pub fn modulo(&self, period: &Interval) -> Result<Interval, DomainError> {
        self.divmod_interval(period).map(|(_, remainder)| remainder)
    }

    /// The upward version of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Interval;
    /// let minor_sixth = Interval::from_fraction(8, 5).unwrap();
    /// assert_eq!(Interval::from_fraction(5, 8).unwrap().magnitude(), minor_sixth);
    /// assert_eq!(minor_sixth.magnitude(), minor_sixth);
    /// ```
    pub fn magnitude(&self) -> Interval {
        if self.cents < 0.0 {
            self.inverse()
        } else {
            self.clone()
        }
    }

    /// Multiplies `frequency` by the ratio of `self`.
    ///
    /// Exact rational intervals are applied with exact arithmetic followed by a single rounding step.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::Interval;
    /// let step = Interval::from_edo_steps(1, 17).unwrap();
    /// assert_eq!((step * 17).apply_to_frequency(440.0), 880.0);
    ///
    /// let fifth = Interval::from_fraction(3, 2).unwrap();
    /// assert_eq!(fifth + 440.0, 660.0);
    /// ```
    pub fn apply_to_frequency(&self, frequency: f64) -> f64 {
        match (self.as_rational(), Rational::from_f64(frequency)) {
            (Some(ratio), Ok(frequency)) => (&ratio * &frequency).to_f64(),
            _ => frequency * self.ratio_value(),
        }
    }

    /// Multiplies an exact `frequency` by the ratio of `self` if `self` is exact and rational.
    pub fn apply_to_exact_frequency(&self, frequency: &Rational) -> Option<Rational> {
        Some(&self.as_rational()? * frequency)
    }

    /// The nearest step of `division`-EDO and the signed error of that step in cents.
    ///
    /// Ties are resolved towards the even step.
    ///
    /// # Examples
    ///
    /// ```
    /// # use assert_approx_eq::assert_approx_eq;
    /// # use intervallic::Interval;
    /// let fourth = Interval::from_fraction(4, 3).unwrap();
    /// let (steps, error) = fourth.approximate_in_edo(17).unwrap();
    /// assert_eq!(steps, 7);
    /// assert_approx_eq!(error, -3.927352);
    ///
    /// let quarter_tone = Interval::from_cents(50.0).unwrap();
    /// assert_eq!(quarter_tone.approximate_in_edo(12).unwrap(), (0, -50.0));
    /// ```
    pub fn approximate_in_edo(&self, division: i64) -> Result<(i64, f64), DomainError> {
        self.approximate_in_edx(division, &Rational::from(2))
    }

    /// The nearest step of an equal division of `period` and the signed error of that step in cents.
    pub fn approximate_in_edx(
        &self,
        division: i64,
        period: &Rational,
    ) -> Result<(i64, f64), DomainError> {
        let exact_steps = self
            .exact_edx_steps(division, period)?
            .and_then(|steps| steps.round_half_even().to_i64());
        let steps = match exact_steps {
            Some(steps) => steps,
            None => self.edx_steps(division, period)?.round_ties_even() as i64,
        };
        let approximation = Self::from_edx_steps(steps, division, period.clone())?;
        Ok((steps, approximation.stack(&self.inverse()).cents))
    }

    /// The interval that needs to be stacked on `reference` to obtain `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use assert_approx_eq::assert_approx_eq;
    /// # use intervallic::Interval;
    /// let tempered_fifth = Interval::from_edo_steps(7, 12).unwrap();
    /// let deviation = tempered_fifth.deviation_from(&Interval::from_fraction(3, 2).unwrap());
    /// assert_approx_eq!(deviation.cents(), -1.955001);
    /// ```
    pub fn deviation_from(&self, reference: &Interval) -> Interval {
        self.stack(&reference.inverse())
    }

    /// Continued-fraction approximations of the frequency ratio.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{Interval, Rational};
    /// let approximations = Interval::from_fraction(7, 5)
    ///     .unwrap()
    ///     .ratio_convergents()
    ///     .collect::<Vec<_>>();
    /// assert_eq!(
    ///     approximations,
    ///     [Rational::from(1), Rational::new(3, 2).unwrap(), Rational::new(7, 5).unwrap()]
    /// );
    /// ```
    pub fn ratio_convergents(&self) -> Convergents {
        match self.as_rational() {
            Some(ratio) => Convergents::exact(ratio),
            None => Convergents::approximate(self.ratio_value()),
        }
    }

    /// Continued-fraction approximations of the number of `period`s in `self`.
    pub fn edx_convergents(&self, period: &Rational) -> Result<EdxConvergents, DomainError> {
        let convergents = match self.exact_edx_steps(1, period)? {
            Some(steps) => Convergents::exact(steps),
            None => Convergents::approximate(self.edx_steps(1, period)?),
        };
        Ok(EdxConvergents::new(convergents))
    }

    /// The [`Interval::ratio_convergents`] paired with their deviations from `self`.
    ///
    /// Convergents that are no positive ratio, i.e. a leading 0, are skipped.
    pub fn ratio_approximations(&self) -> impl Iterator<Item = (Rational, Interval)> + '_ {
        self.ratio_convergents().filter_map(move |ratio| {
            let deviation = Interval::from_ratio(ratio.clone()).ok()?.deviation_from(self);
            Some((ratio, deviation))
        })
    }

    /// The [`Interval::edx_convergents`] paired with their deviations from `self`.
    pub fn edx_approximations(
        &self,
        period: &Rational,
    ) -> Result<impl Iterator<Item = (EdxConvergent, Interval)> + '_, DomainError> {
        let convergents = self.edx_convergents(period)?;
        let period = period.clone();
        Ok(convergents.filter_map(move |convergent| {
            let deviation = convergent.to_interval(&period).ok()?.deviation_from(self);
            Some((convergent, deviation))
        }))
    }
}

fn check_finite(value: f64) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::NonFinite(value.to_string()));
    }
    Ok(())
}

fn float_to_i64(value: f64) -> Option<i64> {
    (value >= i64::MIN as f64 && value < i64::MAX as f64).then_some(value as i64)
}

fn stack_powers(lhs: &Power, rhs: &Power) -> Option<Power> {
    if lhs.is_unison() {
        return Some(rhs.clone());
    }
    if rhs.is_unison() {
        return Some(lhs.clone());
    }
    if lhs.base == rhs.base {
        return Some(lhs.with_exponent(&lhs.exponent + &rhs.exponent));
    }

    // a^x * b^y = (a^(x*n) * b^(y*n))^(1/n) where n makes both inner exponents integral
    let common_denom = Rational::from_integer(lhs.exponent.denom().lcm(rhs.exponent.denom()));
    let root_exponent = common_denom.recip().ok()?;
    let lhs_part = lhs.with_exponent(&lhs.exponent * &common_denom);
    let rhs_part = rhs.with_exponent(&rhs.exponent * &common_denom);
    match (lhs_part.monzo(), rhs_part.monzo()) {
        (Some(lhs_monzo), Some(rhs_monzo)) => Some(Power::of_monzo(&(lhs_monzo + rhs_monzo), root_exponent)),
        _ => {
            let radicand = &lhs_part.to_rational()? * &rhs_part.to_rational()?;
            Some(Power::of(&radicand, root_exponent))
        }
    }
}

/// Exact intervals are compared by their exact values. All other comparisons are based on cents.
impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        match (&self.core, &other.core) {
            (Some(lhs), Some(rhs)) => lhs.power == rhs.power,
            _ => self.cents == other.cents,
        }
    }
}

impl Eq for Interval {}

/// Equal exact values always have bit-identical cents, so hashing the cents is consistent with [`PartialEq`].
impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cents.to_bits().hash(state);
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.cents.partial_cmp(&other.cents)? {
            Ordering::Equal => (self == other).then_some(Ordering::Equal),
            ordering => Some(ordering),
        }
    }
}

impl Add<&Interval> for &Interval {
    type Output = Interval;

    fn add(self, rhs: &Interval) -> Interval {
        self.stack(rhs)
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        self.stack(&rhs)
    }
}

/// Applies the interval to a frequency, see [`Interval::apply_to_frequency`].
impl Add<f64> for &Interval {
    type Output = f64;

    fn add(self, rhs: f64) -> f64 {
        self.apply_to_frequency(rhs)
    }
}

impl Add<f64> for Interval {
    type Output = f64;

    fn add(self, rhs: f64) -> f64 {
        self.apply_to_frequency(rhs)
    }
}

impl Sub<&Interval> for &Interval {
    type Output = Interval;

    fn sub(self, rhs: &Interval) -> Interval {
        self.stack(&rhs.inverse())
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        self.stack(&rhs.inverse())
    }
}

impl Neg for &Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        self.inverse()
    }
}

impl Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        self.inverse()
    }
}

impl Mul<i64> for &Interval {
    type Output = Interval;

    fn mul(self, rhs: i64) -> Interval {
        self.multiply(rhs)
    }
}

impl Mul<i64> for Interval {
    type Output = Interval;

    fn mul(self, rhs: i64) -> Interval {
        self.multiply(rhs)
    }
}

/// # Panics
///
/// Panics if `rhs` is 0.
impl Div<i64> for &Interval {
    type Output = Interval;

    fn div(self, rhs: i64) -> Interval {
        assert!(rhs != 0, "Interval cannot be divided into 0 parts");
        self.divided_unchecked(rhs)
    }
}

/// # Panics
///
/// Panics if `rhs` is 0.
impl Div<i64> for Interval {
    type Output = Interval;

    fn div(self, rhs: i64) -> Interval {
        &self / rhs
    }
}

/// # Panics
///
/// Panics if `rhs` is a unison or if the number of periods does not fit into an [`i64`].
impl Rem<&Interval> for &Interval {
    type Output = Interval;

    fn rem(self, rhs: &Interval) -> Interval {
        match self.modulo(rhs) {
            Ok(remainder) => remainder,
            Err(err) => panic!("{err}"),
        }
    }
}

/// # Panics
///
/// Panics if `rhs` is a unison or if the number of periods does not fit into an [`i64`].
impl Rem for Interval {
    type Output = Interval;

    fn rem(self, rhs: Interval) -> Interval {
        &self % &rhs
    }
}
