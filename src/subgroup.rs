//! Finitely generated subgroups of just intonation.

use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use num_integer::Integer;

use crate::{
    error::DomainError,
    interval::Interval,
    math::{self, Primes},
    monzo::Monzo,
    rational::Rational,
};

/// A JI subgroup like `2.3.7` or `2.5/3.7/5`, generated by a normal list of ratios.
///
/// A list of generators is normal if every generator is greater than 1 and contains a higher prime than its predecessor.
/// Two subgroups are considered equal if they are isomorphic, i.e. contain the same ratios.
///
/// # Examples
///
/// ```
/// # use intervallic::{JiSubgroup, Monzo, Rational};
/// let subgroup = JiSubgroup::new(vec![
///     Rational::from(2),
///     Rational::new(5, 3).unwrap(),
///     Rational::new(7, 5).unwrap(),
/// ])
/// .unwrap();
/// assert_eq!(subgroup.to_string(), "2.5/3.7/5");
/// assert_eq!(subgroup.prime_limit(), 7);
///
/// assert!(subgroup.contains_ratio(&Rational::new(7, 6).unwrap()).unwrap());
/// assert!(!subgroup.contains(&Monzo::new(&[-1, 1])));
///
/// assert_eq!(
///     JiSubgroup::p_limit(3).unwrap(),
///     JiSubgroup::new(vec![Rational::from(2), Rational::new(8, 3).unwrap()]).unwrap()
/// );
/// ```
#[derive(Clone, Debug)]
pub struct JiSubgroup {
    generators: Vec<Rational>,
    monzos: Vec<Monzo>,
}

impl JiSubgroup {
    pub fn new(generators: Vec<Rational>) -> Result<Self, DomainError> {
        if let Some(generator) = generators.iter().find(|&generator| *generator <= Rational::one()) {
            return Err(DomainError::InvalidSubgroup(format!(
                "Generator {generator} must be greater than 1"
            )));
        }

        let monzos = generators
            .iter()
            .map(Monzo::from_rational)
            .collect::<Result<Vec<_>, _>>()?;

        for (index, window) in monzos.windows(2).enumerate() {
            if window[0].dimension() >= window[1].dimension() {
                return Err(DomainError::InvalidSubgroup(format!(
                    "Generator {} must contain a higher prime than {}",
                    generators[index + 1],
                    generators[index]
                )));
            }
        }

        Ok(Self { generators, monzos })
    }

    /// The subgroup generated by all primes up to and including `prime`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{DomainError, JiSubgroup};
    /// assert_eq!(JiSubgroup::p_limit(7).unwrap().to_string(), "2.3.5.7");
    /// assert_eq!(JiSubgroup::p_limit(9), Err(DomainError::NotPrime(9)));
    /// ```
    pub fn p_limit(prime: u64) -> Result<Self, DomainError> {
        let index = math::prime_index(prime).ok_or(DomainError::NotPrime(prime))?;
        Self::new(
            Primes::default()
                .take(index + 1)
                .map(Rational::from_integer)
                .collect(),
        )
    }

    pub fn generators(&self) -> &[Rational] {
        &self.generators
    }

    /// The highest prime of the subgroup. 1 for the trivial subgroup.
    pub fn prime_limit(&self) -> u64 {
        self.monzos.last().map_or(1, Monzo::prime_limit)
    }

    /// Checks whether `monzo` can be written as a product of integer powers of the generators.
    pub fn contains(&self, monzo: &Monzo) -> bool {
        let mut remainder = monzo.clone();

        // The highest prime of each generator is eliminated by that generator alone
        for generator in self.monzos.iter().rev() {
            if remainder.is_unison() {
                return true;
            }
            let dimension = remainder.dimension();
            match dimension.cmp(&generator.dimension()) {
                Ordering::Greater => return false,
                Ordering::Less => continue,
                Ordering::Equal => {}
            }

            let leading_index = dimension - 1;
            let (quotient, rest) = remainder
                .entry_at(leading_index)
                .div_mod_floor(&generator.entry_at(leading_index));
            if rest != 0 {
                return false;
            }
            remainder = &remainder - &(generator * quotient);
        }

        remainder.is_unison()
    }

    pub fn contains_ratio(&self, ratio: &Rational) -> Result<bool, DomainError> {
        match Monzo::from_rational(ratio) {
            Ok(monzo) => Ok(self.contains(&monzo)),
            // All generators factor into smaller primes
            Err(DomainError::PrimeTooLarge { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Checks whether `interval` is an exact rational interval within the subgroup.
    pub fn contains_interval(&self, interval: &Interval) -> bool {
        interval
            .as_rational()
            .is_some_and(|ratio| matches!(self.contains_ratio(&ratio), Ok(true)))
    }

    pub fn is_subgroup_of(&self, other: &JiSubgroup) -> bool {
        self.monzos.iter().rev().all(|monzo| other.contains(monzo))
    }

    pub fn contains_subgroup(&self, other: &JiSubgroup) -> bool {
        other.is_subgroup_of(self)
    }

    pub fn is_isomorphic(&self, other: &JiSubgroup) -> bool {
        self.prime_limit() == other.prime_limit()
            && self.is_subgroup_of(other)
            && other.is_subgroup_of(self)
    }
}

impl PartialEq for JiSubgroup {
    fn eq(&self, other: &Self) -> bool {
        self.is_isomorphic(other)
    }
}

impl Eq for JiSubgroup {}

impl Display for JiSubgroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, generator) in self.generators.iter().enumerate() {
            if index > 0 {
                write!(f, ".")?;
            }
            write!(f, "{generator}")?;
        }
        Ok(())
    }
}
