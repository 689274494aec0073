//! Tunings built from intervals.

use std::fmt::{self, Display, Formatter};

use num_integer::Integer;

use crate::{error::DomainError, interval::Interval, rational::Rational};

/// An [`IntervalTuning`] maps scale degrees to the [`Interval`] above degree 0.
pub trait IntervalTuning {
    fn interval_of(&self, degree: i64) -> Interval;
}

impl<T: IntervalTuning + ?Sized> IntervalTuning for &T {
    fn interval_of(&self, degree: i64) -> Interval {
        T::interval_of(self, degree)
    }
}

/// A tuning repeating a group of intervals, e.g. a scale, by stacking its last interval, the period.
///
/// Degree 0 is the unison and degree `n` is the `n`-th interval of the group, counted from 1.
///
/// # Examples
///
/// ```
/// # use intervallic::{interval, tuning::{GroupedTuning, IntervalTuning}};
/// let tritones = GroupedTuning::new(vec![interval("600c").unwrap(), interval("2").unwrap()]).unwrap();
/// assert_eq!(tritones.interval_of(0), interval("1").unwrap());
/// assert_eq!(tritones.interval_of(1), interval("600c").unwrap());
/// assert_eq!(tritones.interval_of(5), interval("3000c").unwrap());
/// assert_eq!(tritones.interval_of(-1), interval("-600c").unwrap());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedTuning {
    intervals: Vec<Interval>,
}

impl GroupedTuning {
    /// Creates a [`GroupedTuning`] from a non-empty, non-decreasing list of intervals.
    pub fn new(intervals: Vec<Interval>) -> Result<Self, DomainError> {
        if intervals.is_empty() {
            return Err(DomainError::InvalidTuning(
                "Tuning must have at least one step".to_owned(),
            ));
        }
        if let Some(window) = intervals.windows(2).find(|window| window[0] > window[1]) {
            return Err(DomainError::InvalidTuning(format!(
                "Steps must be non-decreasing but {:#} is followed by {:#}",
                window[0], window[1]
            )));
        }
        Ok(Self { intervals })
    }

    /// Divides `period` into `num_steps` equal steps.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{interval, tuning::{GroupedTuning, IntervalTuning}};
    /// let bohlen_pierce = GroupedTuning::equal_division(13, &interval("3").unwrap()).unwrap();
    /// assert_eq!(bohlen_pierce.interval_of(1), interval("1\\13<3>").unwrap());
    /// assert_eq!(bohlen_pierce.interval_of(26), interval("9").unwrap());
    ///
    /// assert!(GroupedTuning::equal_division(0, &interval("3").unwrap()).is_err());
    /// ```
    pub fn equal_division(num_steps: i64, period: &Interval) -> Result<Self, DomainError> {
        if num_steps <= 0 {
            return Err(DomainError::InvalidTuning(format!(
                "Tuning must have at least one step but had {num_steps}"
            )));
        }
        let intervals = (1..=num_steps)
            .map(|step| Ok(period.multiply_by_fraction(&Rational::new(step, num_steps)?)))
            .collect::<Result<_, DomainError>>()?;
        Self::new(intervals)
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn num_steps(&self) -> usize {
        self.intervals.len()
    }

    pub fn period(&self) -> &Interval {
        &self.intervals[self.intervals.len() - 1]
    }
}

impl IntervalTuning for GroupedTuning {
    fn interval_of(&self, degree: i64) -> Interval {
        let (num_periods, index) = (degree - 1).div_mod_floor(&(self.intervals.len() as i64));
        self.intervals[index as usize].stack(&self.period().multiply(num_periods))
    }
}

impl Display for GroupedTuning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, interval) in self.intervals.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {interval}", index + 1)?;
        }
        Ok(())
    }
}

/// An [`IntervalTuning`] anchored at the frequency of degree 0.
///
/// # Examples
///
/// ```
/// # use intervallic::{interval, tuning::{GroupedTuning, PitchedTuning}};
/// let octaves = GroupedTuning::equal_division(1, &interval("2").unwrap()).unwrap();
/// let tuning = PitchedTuning::new(440.0, octaves).unwrap();
/// assert_eq!(tuning.pitch_of(3), 3520.0);
/// assert_eq!(tuning.pitch_of(-2), 110.0);
/// ```
#[derive(Clone, Debug)]
pub struct PitchedTuning<T> {
    base_frequency: f64,
    tuning: T,
}

impl<T: IntervalTuning> PitchedTuning<T> {
    pub fn new(base_frequency: f64, tuning: T) -> Result<Self, DomainError> {
        if !(base_frequency.is_finite() && base_frequency > 0.0) {
            return Err(DomainError::InvalidTuning(format!(
                "Base frequency must be positive but was {base_frequency}"
            )));
        }
        Ok(Self {
            base_frequency,
            tuning,
        })
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    pub fn tuning(&self) -> &T {
        &self.tuning
    }

    /// The frequency of `degree`, see [`Interval::apply_to_frequency`].
    pub fn pitch_of(&self, degree: i64) -> f64 {
        self.tuning
            .interval_of(degree)
            .apply_to_frequency(self.base_frequency)
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::literal::interval;

    fn i(literal: &str) -> Interval {
        interval(literal).unwrap()
    }

    #[test]
    fn invalid_grouped_tunings() {
        assert!(matches!(
            GroupedTuning::new(Vec::new()),
            Err(DomainError::InvalidTuning(_))
        ));
        assert_eq!(
            GroupedTuning::new(vec![i("3/2"), i("6/5"), i("2")]),
            Err(DomainError::InvalidTuning(
                "Steps must be non-decreasing but 3/2 is followed by 6/5".to_owned()
            ))
        );
        assert!(GroupedTuning::new(vec![i("5/4"), i("5/4"), i("2")]).is_ok());
    }

    #[test]
    fn grouped_tuning_repeats_at_period() {
        let tuning = GroupedTuning::new(vec![i("9/8"), i("5/4"), i("3/2")]).unwrap();

        assert_eq!(tuning.num_steps(), 3);
        assert_eq!(tuning.period(), &i("3/2"));
        assert_eq!(tuning.interval_of(0), Interval::unison());
        assert_eq!(tuning.interval_of(3), i("3/2"));
        assert_eq!(tuning.interval_of(4), i("27/16"));
        assert_eq!(tuning.interval_of(-1), i("5/6"));
        assert_eq!(tuning.interval_of(-3), i("2/3"));
        assert!(tuning.interval_of(100).is_exact());
    }

    #[test]
    fn equal_division() {
        let tuning = GroupedTuning::equal_division(34, &i("2")).unwrap();

        assert_eq!(tuning.interval_of(0), i("1"));
        assert_eq!(tuning.interval_of(34), i("2"));
        assert_eq!(tuning.interval_of(99), i("99\\34"));
        assert_eq!(tuning.interval_of(-17), i("1/2") + i("17\\34"));

        let stretched = GroupedTuning::equal_division(12, &i("1210c")).unwrap();
        assert_approx_eq!(stretched.interval_of(7).cents(), 705.833333);
        assert!(matches!(
            GroupedTuning::equal_division(-1, &i("2")),
            Err(DomainError::InvalidTuning(_))
        ));
    }

    #[test]
    fn pitched_tuning() {
        let tuning = PitchedTuning::new(440.0, GroupedTuning::equal_division(1, &i("2")).unwrap()).unwrap();
        assert_eq!(tuning.pitch_of(3), 440.0 * 2f64.powi(3));
        assert_eq!(tuning.base_frequency(), 440.0);

        let edo_12 = GroupedTuning::equal_division(12, &i("2")).unwrap();
        let tuning = PitchedTuning::new(261.6, &edo_12).unwrap();
        assert_approx_eq!(tuning.pitch_of(12), 523.2);
        assert_approx_eq!(tuning.pitch_of(7), 391.957131);

        assert!(PitchedTuning::new(0.0, &edo_12).is_err());
        assert!(PitchedTuning::new(f64::NAN, &edo_12).is_err());
    }

    #[test]
    fn display() {
        let tuning = GroupedTuning::new(vec![i("5/4"), i("2")]).unwrap();
        assert_eq!(tuning.to_string(), "1: 5/4 (386.31c)\n2: 2 (1200.00c)");
    }
}
