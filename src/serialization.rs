//! Serde support, enabled by the `serde` feature.
//!
//! All types are (de)serialized as their literal string forms, e.g. `7/5`, `1\13<3>`, `700c` or `[-4 4 -1>`.
//! Plain numbers are accepted wherever a literal is expected.

use std::{fmt, marker::PhantomData, str::FromStr};

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{error::DomainError, interval::Interval, monzo::Monzo, rational::Rational};

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{self:#}"))
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LiteralVisitor::new("interval literal (e.g. 7/5, 1.25, 7\\12 or 700c)"))
    }
}

impl Serialize for Monzo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Monzo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(LiteralVisitor::new("monzo in ket notation (e.g. [-4 4 -1>)"))
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LiteralVisitor::new("fraction (e.g. 7/5) or decimal (e.g. 1.25)"))
    }
}

// Numbers are routed through their shortest decimal representation, i.e. 1.2 becomes 6/5
struct LiteralVisitor<T> {
    expecting: &'static str,
    phantom: PhantomData<T>,
}

impl<T> LiteralVisitor<T> {
    fn new(expecting: &'static str) -> Self {
        Self {
            expecting,
            phantom: PhantomData,
        }
    }
}

impl<'de, T: FromStr<Err = DomainError>> Visitor<'de> for LiteralVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.expecting)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }
}

#[cfg(test)]
mod test {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    struct Temperament {
        period: Interval,
        generator: Interval,
        steps: Vec<Interval>,
        comma: Monzo,
        base_frequency: Rational,
    }

    #[test]
    fn deserialize_literals() {
        let yml = r"
period: 2
generator: 1.5
steps: [7\12, 1\13<3>, 700c, 5/4]
comma: '[-4 4 -1>'
base_frequency: 880/3
";
        let temperament = serde_yaml::from_str::<Temperament>(yml).unwrap();

        assert_eq!(
            temperament,
            Temperament {
                period: Interval::octave(),
                generator: Interval::from_fraction(3, 2).unwrap(),
                steps: vec![
                    Interval::from_edo_steps(7, 12).unwrap(),
                    Interval::from_edx_steps(1, 13, Rational::from(3)).unwrap(),
                    Interval::from_cents(700.0).unwrap(),
                    Interval::from_fraction(5, 4).unwrap(),
                ],
                comma: Monzo::new(&[-4, 4, -1]),
                base_frequency: Rational::new(880, 3).unwrap(),
            }
        );
    }

    #[test]
    fn serialized_form_round_trips() {
        let temperament = Temperament {
            period: Interval::from_edx_steps(2, 1, Rational::new(3, 2).unwrap()).unwrap(),
            generator: Interval::from_fraction(3, 2).unwrap().multiply_by_fraction(&Rational::new(1, 2).unwrap()),
            steps: vec![Interval::from_cents(-123.25).unwrap(), Interval::unison()],
            comma: Monzo::new(&[0, -4, 0, 0, 1]),
            base_frequency: Rational::from(440),
        };

        let yml = serde_yaml::to_string(&temperament).unwrap();
        assert!(yml.contains("-123.25c"), "{yml}");
        assert!(yml.contains("9/4"), "{yml}");

        assert_eq!(serde_yaml::from_str::<Temperament>(&yml).unwrap(), temperament);
    }

    #[test]
    fn invalid_literals_are_reported() {
        let error = serde_yaml::from_str::<Interval>("0/5").unwrap_err();
        assert!(
            error.to_string().contains("Invalid interval '0/5': Ratio must be positive but was 0"),
            "{error}"
        );

        assert!(serde_yaml::from_str::<Monzo>("'[1 2'").is_err());
        assert!(serde_yaml::from_str::<Rational>("1/0").is_err());
    }
}
