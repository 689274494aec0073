//! Errors raised for inputs outside the domain of musical intervals.

use thiserror::Error;

/// Invalid mathematical input, e.g. a non-positive ratio or a zero denominator.
///
/// Failures while reading an interval literal are reported as [`DomainError::Parse`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Denominator must not be zero")]
    ZeroDenominator,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Ratio must be positive but was {0}")]
    NonPositiveRatio(String),

    #[error("Value must be finite but was {0}")]
    NonFinite(String),

    #[error("Number of divisions must be positive but was {0}")]
    NonPositiveDivision(i64),

    #[error("Period must be greater than 1 but was {0}")]
    InvalidPeriod(String),

    #[error("Ratio {ratio} and edX step {edx} describe different intervals")]
    ConflictingSpecifiers { ratio: String, edx: String },

    #[error("One of cents, ratio or edX step must be given")]
    MissingSpecifier,

    #[error("{0} is not a prime number")]
    NotPrime(u64),

    #[error("{value} contains a prime factor larger than {limit}")]
    PrimeTooLarge { value: String, limit: u64 },

    #[error("Period must not be a unison")]
    UnisonPeriod,

    #[error("Number of periods {period} in {dividend} is out of range")]
    QuotientOutOfRange { dividend: String, period: String },

    #[error("Invalid subgroup: {0}")]
    InvalidSubgroup(String),

    #[error("Tolerance radius must be at least 0.1 cents but was {0}")]
    InvalidTolerance(String),

    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DomainError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, DomainError::Parse(_))
    }
}

/// A literal that could not be read as an interval.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid interval '{literal}': {reason}")]
pub struct ParseError {
    literal: String,
    reason: String,
    #[source]
    cause: Option<Box<DomainError>>,
}

impl ParseError {
    pub(crate) fn malformed(literal: &str, reason: impl Into<String>) -> Self {
        Self {
            literal: literal.to_owned(),
            reason: reason.into(),
            cause: None,
        }
    }

    pub(crate) fn invalid_value(literal: &str, cause: DomainError) -> Self {
        Self {
            literal: literal.to_owned(),
            reason: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The literal that failed to parse.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The domain violation when the literal was well-formed but denotes no valid interval.
    pub fn cause(&self) -> Option<&DomainError> {
        self.cause.as_deref()
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use super::*;

    #[test]
    fn parse_error_keeps_domain_cause() {
        let error =
            DomainError::from(ParseError::invalid_value("0/5", DomainError::NonPositiveRatio("0".to_owned())));

        assert!(error.is_parse_error());
        assert_eq!(error.to_string(), "Invalid interval '0/5': Ratio must be positive but was 0");

        let DomainError::Parse(parse_error) = &error else {
            unreachable!()
        };
        assert_eq!(parse_error.literal(), "0/5");
        assert_eq!(
            parse_error.cause(),
            Some(&DomainError::NonPositiveRatio("0".to_owned()))
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn malformed_literal_has_no_cause() {
        let error = ParseError::malformed("abc", "Must be a number");

        assert_eq!(error.to_string(), "Invalid interval 'abc': Must be a number");
        assert_eq!(error.cause(), None);
        assert!(error.source().is_none());
    }
}
