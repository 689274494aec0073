//! Names of just intervals in color notation and in the Functional Just System (FJS).

use std::fmt::{self, Display};

use num_integer::Integer;

use crate::{
    error::DomainError,
    interval::{Interval, CENTS_PER_OCTAVE},
    math::{self, Primes},
    monzo::Monzo,
};

/// Smallest tolerance radius accepted by [`Fjs::with_tolerance`], in cents.
pub const MIN_TOLERANCE_CENTS: f64 = 0.1;

/// Heptatonic degree of each 50-cent slice of the octave.
const DEGREES_24EDO: [i64; 24] = [
    0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7,
];

/// Names a just interval in color notation, e.g. `zg4` for 7/5 or `LLw-2` for the Pythagorean comma.
///
/// # Examples
///
/// ```
/// # use intervallic::{name, Monzo};
/// assert_eq!(name::color_name(&Monzo::new(&[0, 0, -1, 1])), "zg4");
/// assert_eq!(name::color_name(&Monzo::new(&[-19, 12])), "LLw-2");
/// assert_eq!(name::color_name(&Monzo::new(&[-9, 0, 4])), "Ly⁴2");
/// assert_eq!(name::color_name(&Monzo::unison()), "w1");
/// ```
pub fn color_name(monzo: &Monzo) -> String {
    let stepspan = monzo
        .prime_exponents()
        .map(|(prime, exponent)| exponent * color_val(prime))
        .sum::<i64>();
    let (mut octaves, mut reduced_stepspan) = stepspan.abs().div_mod_floor(&7);
    if matches!(stepspan.abs(), 7..=9 | 15) {
        octaves -= 1;
        reduced_stepspan += 7;
    }

    let odd_exponents = monzo
        .prime_exponents()
        .filter(|&(prime, _)| prime != 2)
        .map(|(_, exponent)| exponent)
        .sum::<i64>();
    let (magnitude, remainder) = odd_exponents.div_mod_floor(&7);
    let magnitude = if remainder >= 4 { magnitude + 1 } else { magnitude };

    let mut name = String::new();
    write_repeated(&mut name, if magnitude > 0 { "L" } else { "s" }, magnitude);
    write_repeated(&mut name, "c", octaves);

    let colors = monzo
        .prime_exponents()
        .filter(|&(prime, _)| prime > 3)
        .collect::<Vec<_>>();
    if colors.is_empty() {
        name.push('w');
    }
    for &(prime, exponent) in colors.iter().rev() {
        let color = match (prime, exponent > 0) {
            (5, true) => "y".to_owned(),
            (5, false) => "g".to_owned(),
            (7, true) => "z".to_owned(),
            (7, false) => "r".to_owned(),
            (11, true) => "1o".to_owned(),
            (11, false) => "1u".to_owned(),
            (13, true) => "3o".to_owned(),
            (13, false) => "3u".to_owned(),
            (_, true) => format!("{prime}o"),
            (_, false) => format!("{prime}u"),
        };
        write_repeated(&mut name, &color, exponent);
    }

    if stepspan < 0 {
        name.push('-');
    }
    name.push_str(&(reduced_stepspan + 1).to_string());
    name
}

/// The number of heptatonic steps spanned by `prime` in color notation.
///
/// # Examples
///
/// ```
/// # use intervallic::name;
/// assert_eq!(name::color_val(2), 7);
/// assert_eq!(name::color_val(3), 11);
/// assert_eq!(name::color_val(5), 16);
/// assert_eq!(name::color_val(7), 20);
/// ```
pub fn color_val(prime: u64) -> i64 {
    let octaves = (prime as f64).log2();
    let whole_octaves = octaves.floor();
    let slice = ((octaves - whole_octaves) * CENTS_PER_OCTAVE / 50.0).floor() as usize;
    DEGREES_24EDO[slice.min(DEGREES_24EDO.len() - 1)] + whole_octaves as i64 * 7
}

/// Writes `segment` `count.abs()` times in the abbreviated form used by color notation.
fn write_repeated(target: &mut String, segment: &str, count: i64) {
    match count.unsigned_abs() {
        0 => {}
        1 => target.push_str(segment),
        2 => {
            target.push_str(segment);
            target.extend(segment.chars().last());
        }
        count => {
            target.push_str(segment);
            target.extend(count.to_string().chars().map(superscript));
        }
    }
}

fn superscript(digit: char) -> char {
    match digit {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        other => other,
    }
}

/// Names just intervals in the Functional Just System.
///
/// Every prime `p > 3` is assigned a formal comma `p * 3^-k * 2^n`, the first one within the tolerance radius while trying `k = 0, 1, -1, 2, -2, ...`.
/// Removing all formal commas from an interval leaves a Pythagorean interval which provides the degree and the quality of the name.
///
/// # Examples
///
/// ```
/// # use intervallic::{name::Fjs, Monzo};
/// let fjs = Fjs::default();
/// assert_eq!(fjs.name(&Monzo::new(&[-2, 0, 1])).to_string(), "M3^5");
/// assert_eq!(fjs.name(&Monzo::new(&[-2, 0, 0, 1])).to_string(), "m7^7");
/// assert_eq!(fjs.name(&Monzo::new(&[-1])).to_string(), "P-8");
/// ```
#[derive(Clone, Debug)]
pub struct Fjs {
    radius_cents: f64,
}

impl Default for Fjs {
    /// The standard tolerance radius of 65/63.
    fn default() -> Self {
        Self {
            radius_cents: CENTS_PER_OCTAVE * (65.0f64 / 63.0).log2(),
        }
    }
}

impl Fjs {
    /// Creates an [`Fjs`] namer with a custom tolerance radius of at least [`MIN_TOLERANCE_CENTS`]. Only useful for experiments.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{name::Fjs, DomainError, Interval, Monzo};
    /// let wide = Fjs::with_tolerance(&Interval::from_fraction(9, 8).unwrap()).unwrap();
    /// assert_eq!(wide.formal_comma(5), Ok(Monzo::new(&[-4, 1, 1])));
    /// assert_eq!(wide.formal_comma(7), Ok(Monzo::new(&[-6, 2, 0, 1])));
    ///
    /// assert!(matches!(
    ///     Fjs::with_tolerance(&Interval::from_fraction(8, 9).unwrap()),
    ///     Err(DomainError::InvalidTolerance(_))
    /// ));
    /// ```
    pub fn with_tolerance(radius: &Interval) -> Result<Self, DomainError> {
        if radius.cents() < MIN_TOLERANCE_CENTS {
            return Err(DomainError::InvalidTolerance(format!("{radius:#}")));
        }
        Ok(Self {
            radius_cents: radius.cents(),
        })
    }

    /// The formal comma of `prime`. The primes 2 and 3 have no comma and yield the unison.
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::{name::Fjs, DomainError, Monzo};
    /// let fjs = Fjs::default();
    /// assert_eq!(fjs.formal_comma(5), Ok(Monzo::new(&[4, -4, 1])));
    /// assert_eq!(fjs.formal_comma(3), Ok(Monzo::unison()));
    /// assert_eq!(fjs.formal_comma(9), Err(DomainError::NotPrime(9)));
    /// ```
    pub fn formal_comma(&self, prime: u64) -> Result<Monzo, DomainError> {
        let index = math::prime_index(prime).ok_or(DomainError::NotPrime(prime))?;
        Ok(self.formal_comma_at(index, prime))
    }

    fn formal_comma_at(&self, index: usize, prime: u64) -> Monzo {
        if prime <= 3 {
            return Monzo::unison();
        }
        let prime_octaves = (prime as f64).log2();
        let fifth_octaves = 3f64.log2();

        // Tries 3^0, 3^-1, 3^1, 3^-2, 3^2, ...
        let mut shift = 0i64;
        loop {
            let threes = if shift.is_odd() { (shift + 1) / 2 } else { -shift / 2 };
            let octaves = prime_octaves - threes as f64 * fifth_octaves;
            let twos = -(octaves + 0.5).floor();
            if ((octaves + twos) * CENTS_PER_OCTAVE).abs() < self.radius_cents {
                return [(0, twos as i64), (1, -threes), (index, 1)]
                    .into_iter()
                    .collect();
            }
            shift += 1;
        }
    }

    /// Names the just interval given by `monzo`.
    pub fn name(&self, monzo: &Monzo) -> FjsName {
        let mut pythagorean = monzo.clone();
        let mut otonal_commas = Vec::new();
        let mut utonal_commas = Vec::new();
        let mut primes = Primes::default();
        for index in monzo.support().filter(|&index| index >= 2) {
            let prime = primes.skip_to(index);
            let exponent = monzo.entry_at(index);
            pythagorean = &pythagorean - &(self.formal_comma_at(index, prime) * exponent);
            let commas = if exponent > 0 {
                &mut otonal_commas
            } else {
                &mut utonal_commas
            };
            commas.extend((0..exponent.unsigned_abs()).map(|_| prime));
        }

        let twos = pythagorean.entry_at(0);
        let threes = pythagorean.entry_at(1);
        let (variant, degree, sign) = match pythagorean_degree(twos, threes) {
            Some((variant, degree)) => (variant, degree, 1),
            None => {
                // One of both orientations always spans a non-negative number of octaves
                let (variant, degree) = pythagorean_degree(-twos, -threes).unwrap_or((0, 0));
                (variant, degree, -1)
            }
        };

        FjsName {
            variant,
            degree: degree * sign,
            otonal_commas,
            utonal_commas,
        }
    }
}

/// Variant and 0-based degree of `2^twos * 3^threes` if it does not lie below the unison.
fn pythagorean_degree(twos: i64, threes: i64) -> Option<(i64, i64)> {
    let (cycles, fifths) = threes.div_mod_floor(&7);
    let octave_shift = [0, 0, 1, 1, 2, 2, 3][fifths as usize] + 4 * cycles;
    let octaves = twos + threes + octave_shift;
    if octaves < 0 {
        return None;
    }

    let variant = match threes.abs() {
        0..=1 => 0,
        2..=5 => 1,
        abs_threes => (abs_threes + 8) / 7,
    };
    let variant = if threes >= 0 { variant } else { -variant };
    let degree = [0, 4, 1, 5, 2, 6, 3][fifths as usize];
    Some((variant, degree + octaves * 7))
}

/// Markup used by [`FjsName::render`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FjsFormat {
    /// `m7^7_5`
    Ascii,
    /// `m7<sup>7</sup><sub>5</sub>`
    Html,
    /// `m7^{7}{}_{5}`
    Tex,
}

/// The FJS name of an interval, e.g. `M3^5` for 5/4.
///
/// `variant` encodes the quality: `P` is 0, `m` and `M` are -1 and 1, `d` and `A` are -2 and 2, `dd` and `AA` are -3 and 3 and so forth.
/// `degree` is 0 for the unison and negative for descending intervals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FjsName {
    variant: i64,
    degree: i64,
    otonal_commas: Vec<u64>,
    utonal_commas: Vec<u64>,
}

impl FjsName {
    pub fn variant(&self) -> i64 {
        self.variant
    }

    pub fn degree(&self) -> i64 {
        self.degree
    }

    /// Primes written as superscripts, one entry per occurrence.
    pub fn otonal_commas(&self) -> &[u64] {
        &self.otonal_commas
    }

    /// Primes written as subscripts, one entry per occurrence.
    pub fn utonal_commas(&self) -> &[u64] {
        &self.utonal_commas
    }

    /// # Examples
    ///
    /// ```
    /// # use intervallic::{name::{Fjs, FjsFormat}, Monzo};
    /// let name = Fjs::default().name(&Monzo::new(&[0, 0, -2, 2]));
    /// assert_eq!(name.render(FjsFormat::Ascii), "d9^7,7_5,5");
    /// assert_eq!(name.render(FjsFormat::Html), "d9<sup>7,7</sup><sub>5,5</sub>");
    /// assert_eq!(name.render(FjsFormat::Tex), "d9^{7{,}7}{}_{5{,}5}");
    /// ```
    pub fn render(&self, format: FjsFormat) -> String {
        let (otonal_open, otonal_close, utonal_open, utonal_close, separator) = match format {
            FjsFormat::Ascii => ("^", "", "_", "", ","),
            FjsFormat::Html => ("<sup>", "</sup>", "<sub>", "</sub>", ","),
            FjsFormat::Tex => ("^{", "}{}", "_{", "}", "{,}"),
        };

        let mut rendered = match self.variant {
            -1 => "m".to_owned(),
            0 => "P".to_owned(),
            1 => "M".to_owned(),
            variant if variant < 0 => "d".repeat(variant.unsigned_abs() as usize - 1),
            variant => "A".repeat(variant.unsigned_abs() as usize - 1),
        };
        if self.degree < 0 {
            rendered.push('-');
        }
        rendered.push_str(&(self.degree.unsigned_abs() + 1).to_string());

        for (commas, open, close) in [
            (&self.otonal_commas, otonal_open, otonal_close),
            (&self.utonal_commas, utonal_open, utonal_close),
        ] {
            if !commas.is_empty() {
                let joined = commas
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(separator);
                rendered.push_str(open);
                rendered.push_str(&joined);
                rendered.push_str(close);
            }
        }
        rendered
    }
}

impl Display for FjsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.render(FjsFormat::Ascii))
    }
}

impl Interval {
    /// The color name of an exact rational interval, see [`color_name`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use intervallic::interval;
    /// assert_eq!(interval("7/6").unwrap().color_name().as_deref(), Some("z3"));
    /// assert_eq!(interval("700c").unwrap().color_name(), None);
    /// ```
    pub fn color_name(&self) -> Option<String> {
        Some(color_name(&self.monzo()?))
    }

    /// The FJS name of an exact rational interval, see [`Fjs`].
    pub fn fjs_name(&self, fjs: &Fjs) -> Option<FjsName> {
        Some(fjs.name(&self.monzo()?))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn monzo_of(ratio: &str) -> Monzo {
        Monzo::from_rational(&ratio.parse().unwrap()).unwrap()
    }

    #[test]
    fn color_names() {
        let test_cases = [
            ("531441/524288", "LLw-2"),
            ("27/14", "r7"),
            ("31/16", "31o7"),
            ("49/25", "zzgg9"),
            ("19/10", "19og8"),
            ("225/128", "Lyy6"),
            ("19/11", "19o1u7"),
            ("38/23", "23u19o6"),
            ("128/81", "sw6"),
            ("49/36", "zz5"),
            ("4/3", "w4"),
            ("77/60", "1ozg4"),
            ("76/61", "61u19o4"),
            ("71/57", "71o19u3"),
            ("625/512", "Ly⁴2"),
            ("39/32", "3o3"),
            ("25/21", "ryy2"),
            ("7/6", "z3"),
            ("97/84", "97or2"),
            ("9/8", "w2"),
            ("55/49", "1orry1"),
            ("243/224", "Lr1"),
            ("648/625", "g⁴2"),
            ("50/49", "rryy-2"),
            ("3125/3072", "Ly⁵-2"),
            ("100/99", "1uyy1"),
            ("13/2", "cc3o6"),
            ("7/3", "z10"),
            ("9/1", "c³w2"),
        ];

        for (ratio, expected) in test_cases {
            assert_eq!(color_name(&monzo_of(ratio)), expected, "{ratio}");
        }
    }

    #[test]
    fn formal_commas() {
        let expected = [
            "80/81",
            "63/64",
            "33/32",
            "1053/1024",
            "4131/4096",
            "513/512",
            "736/729",
            "261/256",
            "248/243",
        ];

        let fjs = Fjs::default();
        let actual = Primes::default()
            .skip(2)
            .take(expected.len())
            .map(|prime| fjs.formal_comma(prime).unwrap().to_rational().to_string())
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);

        let tight = Fjs::with_tolerance(&Interval::from_cents(0.5).unwrap()).unwrap();
        let comma = tight.formal_comma(5).unwrap();
        assert_eq!(comma.entry_at_prime(5), Ok(1));
        assert!(Interval::from_monzo(&comma).cents().abs() < 0.5);
        assert!(matches!(
            Fjs::with_tolerance(&Interval::from_cents(0.01).unwrap()),
            Err(DomainError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn fjs_names() {
        let test_cases = [
            ("66/65", "P1^11_5,13"),
            ("99/98", "m-2^11_7,7"),
            ("98/99", "m2^7,7_11"),
            ("648/625", "d2_5,5,5,5"),
            ("11/10", "m2^11_5"),
            ("6272/5625", "ddd4^7,7_5,5,5,5"),
            ("9/8", "M2"),
            ("64/55", "m3_5,11"),
            ("161/128", "M3^7,23"),
            ("25/18", "A4^5,5"),
            ("16384/10935", "d6_5"),
            ("19/11", "m7^19_11"),
            ("959/540", "dd8^7,137_5"),
            ("19/10", "d8^19_5"),
            ("49/25", "d9^7,7_5,5"),
            ("16/5", "m13_5"),
            ("4/1", "P15"),
            ("5/1", "M17^5"),
            ("6/1", "P19"),
            ("7/1", "m21^7"),
            ("182/9", "d32^7,13"),
            ("1333341/34816", "AAA36^31,59_17"),
            ("1/1", "P1"),
            ("2048/2187", "d1"),
            ("2187/2048", "A1"),
            ("2/1", "P8"),
            ("1/2", "P-8"),
            ("4096/2187", "d8"),
            ("2187/1024", "A8"),
            ("1024/2187", "A-8"),
            ("2187/4096", "d-8"),
            ("4194304/4782969", "dd1"),
            ("4782969/4194304", "AA1"),
            ("1073741824/1162261467", "dd2"),
            ("43046721/33554432", "AA2"),
            ("1162261467/1073741824", "dd-2"),
            ("33554432/43046721", "AA-2"),
            ("128/2187", "A-29"),
            ("2187/128", "A29"),
            ("81/16", "M17"),
            ("16/81", "M-17"),
            ("243/32", "M21"),
            ("32/243", "M-21"),
            ("2/3", "P-5"),
            ("128/27", "m17"),
            ("27/128", "m-17"),
            ("64/9", "m21"),
            ("9/64", "m-21"),
            ("531441/262144", "A7"),
            ("531441/524288", "d-2"),
        ];

        let fjs = Fjs::default();
        for (ratio, expected) in test_cases {
            assert_eq!(fjs.name(&monzo_of(ratio)).to_string(), expected, "{ratio}");
        }
    }

    #[test]
    fn fjs_name_parts() {
        let name = Fjs::default().name(&monzo_of("6272/5625"));
        assert_eq!(name.variant(), -4);
        assert_eq!(name.degree(), 3);
        assert_eq!(name.otonal_commas(), [7, 7]);
        assert_eq!(name.utonal_commas(), [5, 5, 5, 5]);
        assert_eq!(format!("{name:>20}"), "    ddd4^7,7_5,5,5,5");
    }

    #[test]
    fn names_of_intervals() {
        let fjs = Fjs::default();
        let fifth = Interval::from_fraction(3, 2).unwrap();
        assert_eq!(fifth.color_name().as_deref(), Some("w5"));
        assert_eq!(fifth.fjs_name(&fjs).map(|name| name.to_string()).as_deref(), Some("P5"));

        let tempered_fifth = Interval::from_edo_steps(7, 12).unwrap();
        assert_eq!(tempered_fifth.color_name(), None);
        assert_eq!(tempered_fifth.fjs_name(&fjs), None);
    }
}
