//! Reading and writing intervals as text.
//!
//! The accepted literals are
//!
//! - cents values like `700c`, `-3.5c` or `700¢`,
//! - fractions like `7/5`,
//! - decimal ratios like `1.25` or `2`,
//! - edX steps like `7\12` (a step of 12-EDO) or `1\13<3>` (a step of the 13th equal division of the tritave).

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use num_traits::ToPrimitive;

use crate::{
    error::{DomainError, ParseError},
    interval::{EdxStep, Exact, Interval},
    rational::{Decimal, Rational},
};

/// Bare decimal literals with more fractional digits than this are read as inexact floating-point ratios.
pub const MAX_EXACT_DECIMAL_DIGITS: u64 = 12;

const EXPECTED_FORMS: &str = "Must be a cents value (e.g. 700c), fraction (e.g. 7/5), \
                              decimal ratio (e.g. 1.25) or edX step (e.g. 7\\12)";

/// Parses an interval literal, see the [module documentation](self).
///
/// # Examples
///
/// ```
/// # use intervallic::{interval, DomainError, Interval};
/// assert_eq!(interval("7/5"), Interval::from_fraction(7, 5));
/// assert_eq!(interval("1.25"), Interval::from_fraction(5, 4));
/// assert_eq!(interval("7\\12"), Interval::from_edo_steps(7, 12));
/// assert!(!interval("700c").unwrap().is_exact());
///
/// let error = interval("0/5").unwrap_err();
/// assert!(error.is_parse_error());
/// assert_eq!(error.to_string(), "Invalid interval '0/5': Ratio must be positive but was 0");
/// ```
pub fn interval(literal: &str) -> Result<Interval, DomainError> {
    literal.parse()
}

/// The literal form an [`IntervalLiteral`] was written in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Cents,
    Fraction,
    Decimal,
    EdxStep,
}

/// Target type for successfully parsed and validated interval literals.
///
/// # Examples
///
/// ```
/// # use intervallic::literal::{IntervalLiteral, LiteralKind};
/// # use intervallic::Interval;
/// let literal = "3.5\\6".parse::<IntervalLiteral>().unwrap();
/// assert_eq!(literal.kind(), LiteralKind::EdxStep);
/// assert_eq!(literal.interval(), Interval::from_edo_steps(7, 12).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct IntervalLiteral {
    interval: Interval,
    kind: LiteralKind,
}

impl IntervalLiteral {
    pub fn interval(self) -> Interval {
        self.interval
    }

    pub fn kind(&self) -> LiteralKind {
        self.kind
    }
}

/// The only way to construct an [`IntervalLiteral`] is via the [`FromStr`] trait.
impl FromStr for IntervalLiteral {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        let (interval, kind) = if let Some((steps, rest)) = literal.split_once('\\') {
            (parse_edx_step(literal, steps, rest)?, LiteralKind::EdxStep)
        } else if literal.contains('/') {
            (parse_fraction(literal)?, LiteralKind::Fraction)
        } else if let Some(cents) = literal.strip_suffix(['c', '¢']) {
            (parse_cents(literal, cents.trim_end())?, LiteralKind::Cents)
        } else {
            (parse_decimal(literal)?, LiteralKind::Decimal)
        };
        Ok(Self { interval, kind })
    }
}

/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use intervallic::{Interval, Rational};
/// assert_eq!("3/2".parse::<Interval>().unwrap().as_rational(), Some(Rational::new(3, 2).unwrap()));
/// assert_approx_eq!("702c".parse::<Interval>().unwrap().cents(), 702.0);
/// assert_approx_eq!("1\\13<3>".parse::<Interval>().unwrap().cents(), 146.304231);
/// assert_eq!(
///     "foo".parse::<Interval>().unwrap_err().to_string(),
///     "Invalid interval 'foo': Must be a cents value (e.g. 700c), fraction (e.g. 7/5), \
///      decimal ratio (e.g. 1.25) or edX step (e.g. 7\\12)"
/// );
/// ```
impl FromStr for Interval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IntervalLiteral>().map(IntervalLiteral::interval)
    }
}

fn parse_edx_step(literal: &str, steps: &str, rest: &str) -> Result<Interval, DomainError> {
    let (division, period) = match rest.strip_suffix('>') {
        Some(rest) => {
            let (division, period) = rest
                .split_once('<')
                .ok_or_else(|| ParseError::malformed(literal, "Period must be enclosed in <>"))?;
            let period = period.trim().parse::<Rational>().map_err(|_| {
                ParseError::malformed(literal, "Period must be a fraction (e.g. 3/2) or decimal (e.g. 1.5)")
            })?;
            (division, period)
        }
        None => (rest, Rational::from(2)),
    };

    let steps = Decimal::parse(steps.trim())
        .map_err(|reason| ParseError::malformed(literal, format!("Invalid step count: {reason}")))?
        .value;
    let division = division
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseError::malformed(literal, "Division must be an integer (e.g. 12)"))?;
    if division <= 0 {
        return Err(ParseError::invalid_value(literal, DomainError::NonPositiveDivision(division)).into());
    }

    // Fractional step counts are folded into the division: 3.5\6 = 7\12
    let (steps, division) = steps
        .numer()
        .to_i64()
        .zip((steps.denom() * division).to_i64())
        .ok_or_else(|| ParseError::malformed(literal, "Step count or division is out of range"))?;

    Interval::from_edx_steps(steps, division, period)
        .map_err(|err| ParseError::invalid_value(literal, err).into())
}

fn parse_fraction(literal: &str) -> Result<Interval, DomainError> {
    let ratio = literal.parse::<Rational>()?;
    Interval::from_ratio(ratio).map_err(|err| ParseError::invalid_value(literal, err).into())
}

fn parse_cents(literal: &str, cents: &str) -> Result<Interval, DomainError> {
    // Rejects float spellings like "inf" or "NaN" which Decimal does not accept
    Decimal::parse(cents).map_err(|_| ParseError::malformed(literal, EXPECTED_FORMS))?;
    let cents = cents
        .parse::<f64>()
        .map_err(|_| ParseError::malformed(literal, EXPECTED_FORMS))?;
    Interval::from_cents(cents).map_err(|err| ParseError::invalid_value(literal, err).into())
}

fn parse_decimal(literal: &str) -> Result<Interval, DomainError> {
    let decimal = Decimal::parse(literal).map_err(|_| ParseError::malformed(literal, EXPECTED_FORMS))?;
    let interval = if decimal.fraction_digits <= MAX_EXACT_DECIMAL_DIGITS {
        Interval::from_ratio(decimal.value)
    } else {
        log::debug!("Reading {literal} as an inexact ratio");
        literal
            .parse::<f64>()
            .map_err(|_| ParseError::malformed(literal, EXPECTED_FORMS))
            .map_err(DomainError::from)
            .and_then(Interval::from_float_ratio)
    };
    interval.map_err(|err| match err {
        DomainError::Parse(_) => err,
        err => ParseError::invalid_value(literal, err).into(),
    })
}

/// Formats an [`Interval`].
///
/// The default form shows the exact value, if any, together with the size in cents.
/// Exact values are shown as a ratio whenever they are rational.
/// The precision applies to the cents and defaults to 2.
///
/// The alternate form `{:#}` is the shortest literal that parses back into an equal [`Interval`].
///
/// # Examples
///
/// ```
/// # use intervallic::Interval;
/// let septimal_tritone = Interval::from_fraction(7, 5).unwrap();
/// assert_eq!(format!("{septimal_tritone}"), "7/5 (582.51c)");
/// assert_eq!(format!("{septimal_tritone:.0}"), "7/5 (583c)");
/// assert_eq!(format!("{septimal_tritone:#}"), "7/5");
///
/// let fifth = Interval::from_edo_steps(7, 12).unwrap();
/// assert_eq!(format!("{fifth}"), "7\\12 (700.00c)");
/// assert_eq!(format!("{fifth:#}"), "7\\12");
///
/// let octave = Interval::from_edo_steps(12, 12).unwrap();
/// assert_eq!(format!("{octave:#}"), "2");
///
/// let quarter_tone = Interval::from_cents(50.0).unwrap();
/// assert_eq!(format!("{quarter_tone}"), "50.00c (~1.02930)");
/// assert_eq!(format!("{quarter_tone:#}"), "50c");
/// ```
impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let formatted = if f.alternate() {
            match (self.as_rational(), self.exact()) {
                (Some(ratio), _) => ratio.to_string(),
                (None, Some(exact)) => exact.to_string(),
                (None, None) => format!("{}c", self.cents()),
            }
        } else {
            let precision = f.precision().unwrap_or(2);
            match (self.as_rational(), self.exact()) {
                (Some(ratio), _) => format!("{ratio} ({:.precision$}c)", self.cents()),
                (None, Some(exact)) => format!("{exact} ({:.precision$}c)", self.cents()),
                (None, None) => format!("{:.precision$}c (~{:.5})", self.cents(), self.ratio_value()),
            }
        };
        f.pad_integral(true, "", &formatted)
    }
}

impl Display for Exact {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Exact::Ratio(ratio) => Display::fmt(ratio, f),
            Exact::EdxStep(edx) => Display::fmt(edx, f),
        }
    }
}

impl Display for EdxStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let formatted = if *self.period() == Rational::from(2) {
            format!("{}\\{}", self.steps(), self.division())
        } else {
            format!("{}\\{}<{}>", self.steps(), self.division(), self.period())
        };
        f.pad_integral(true, "", &formatted)
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn kind_of(literal: &str) -> LiteralKind {
        literal.parse::<IntervalLiteral>().unwrap().kind()
    }

    fn cause_of(literal: &str) -> Option<DomainError> {
        match literal.parse::<Interval>() {
            Err(DomainError::Parse(err)) => err.cause().cloned(),
            other => panic!("Expected parse error for {literal} but got {other:?}"),
        }
    }

    #[test]
    fn literal_kinds() {
        let test_cases = [
            ("700c", LiteralKind::Cents),
            ("700 c", LiteralKind::Cents),
            ("-3.5¢", LiteralKind::Cents),
            ("7/5", LiteralKind::Fraction),
            (" 7 / 5 ", LiteralKind::Fraction),
            ("1.25", LiteralKind::Decimal),
            ("2", LiteralKind::Decimal),
            ("1e-3", LiteralKind::Decimal),
            ("7\\12", LiteralKind::EdxStep),
            ("1\\13<3>", LiteralKind::EdxStep),
            ("-2.5\\7<3/2>", LiteralKind::EdxStep),
        ];

        for (literal, expected) in test_cases {
            assert_eq!(kind_of(literal), expected, "{literal}");
        }
    }

    #[test]
    fn parsed_values() {
        assert_eq!(interval("1.5"), Interval::from_fraction(3, 2));
        assert_eq!(interval("1.2"), Interval::from_fraction(6, 5));
        assert_eq!(interval("3.5\\6"), Interval::from_edo_steps(7, 12));
        assert_eq!(interval("1\\2<9/4>"), Interval::from_fraction(3, 2));
        assert_eq!(interval("0c"), Ok(Interval::unison()));
        assert_approx_eq!(interval("-3.5¢").unwrap().cents(), -3.5);

        let long_decimal = interval("1.0000000000001").unwrap();
        assert!(!long_decimal.is_exact());
        assert_approx_eq!(long_decimal.ratio_value(), 1.0000000000001);

        let edo_step = interval("7\\12").unwrap();
        assert_eq!(
            edo_step.exact(),
            Some(&Exact::EdxStep(EdxStep::edo(7, 12).unwrap()))
        );
    }

    #[test]
    fn malformed_literals() {
        for literal in ["abc", "", "c", "1.2.3", "7/", "/5", "7\\", "\\12", "7\\12<3", "inf", "NaNc", "1/2/3", "7\\1.5"] {
            let error = interval(literal).unwrap_err();
            assert!(error.is_parse_error(), "{literal}");
            assert_eq!(cause_of(literal), None, "{literal}");
        }
    }

    #[test]
    fn invalid_values() {
        assert_eq!(cause_of("0/5"), Some(DomainError::NonPositiveRatio("0".to_owned())));
        assert_eq!(cause_of("-3/2"), Some(DomainError::NonPositiveRatio("-3/2".to_owned())));
        assert_eq!(cause_of("0"), Some(DomainError::NonPositiveRatio("0".to_owned())));
        assert_eq!(cause_of("1/0"), Some(DomainError::ZeroDenominator));
        assert_eq!(cause_of("7\\0"), Some(DomainError::NonPositiveDivision(0)));
        assert_eq!(cause_of("7\\-12"), Some(DomainError::NonPositiveDivision(-12)));
        assert_eq!(cause_of("1\\5<1>"), Some(DomainError::InvalidPeriod("1".to_owned())));
        assert_eq!(cause_of("1e400c"), Some(DomainError::NonFinite("inf".to_owned())));
    }

    #[test]
    fn verbose_format() {
        let test_cases = [
            ("7/5", "7/5 (582.51c)"),
            ("1", "1 (0.00c)"),
            ("-8\\7", "-8\\7 (-1371.43c)"),
            ("1\\13<3>", "1\\13<3> (146.30c)"),
            ("24\\12", "4 (2400.00c)"),
            ("1200c", "1200.00c (~2.00000)"),
        ];

        for (literal, expected) in test_cases {
            assert_eq!(interval(literal).unwrap().to_string(), expected);
        }
        assert_eq!(format!("{:.1}", interval("3/2").unwrap()), "3/2 (702.0c)");
        assert_eq!(format!("{:>12}", interval("3/2").unwrap().exact().unwrap()), "         3/2");
    }

    #[test]
    fn parsable_format_round_trips() {
        let test_cases = [
            ("7/5", "7/5"),
            ("1.25", "5/4"),
            ("14\\24", "7\\12"),
            ("1\\13<3>", "1\\13<3>"),
            ("2\\4<9>", "3"),
            ("1\\2<3/2>", "1\\2<3/2>"),
            ("700c", "700c"),
            ("-0.1c", "-0.1c"),
        ];

        for (literal, expected) in test_cases {
            let parsed = interval(literal).unwrap();
            let formatted = format!("{parsed:#}");
            assert_eq!(formatted, expected);
            assert_eq!(interval(&formatted).unwrap(), parsed, "{literal}");
        }

        let long_decimal = interval("1.0000000000001").unwrap();
        assert_eq!(interval(&format!("{long_decimal:#}")).unwrap(), long_decimal);
    }
}
