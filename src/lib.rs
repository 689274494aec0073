//! Exact and approximate musical intervals.
//!
//! ```
//! # use intervallic::interval;
//! let fifth = interval("3/2").unwrap();
//! let tempered_fifth = interval("7\\12").unwrap();
//! let comma = &(&fifth * 12) - &(&tempered_fifth * 12);
//! assert_eq!(format!("{comma:#}"), "531441/524288");
//! assert_eq!(format!("{:#}", comma.monzo().unwrap()), "2^-19 * 3^12");
//! ```

pub mod convergent;
pub mod error;
pub mod interval;
pub mod literal;
pub mod math;
pub mod monzo;
pub mod name;
pub mod rational;
pub mod subgroup;
pub mod tuning;

#[cfg(feature = "serde")]
mod serialization;

pub use error::{DomainError, ParseError};
pub use interval::{EdxStep, Exact, Interval, IntervalSpec};
pub use literal::interval;
pub use monzo::Monzo;
pub use rational::Rational;
pub use subgroup::JiSubgroup;
