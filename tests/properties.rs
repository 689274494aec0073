use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use assert_approx_eq::assert_approx_eq;
use intervallic::{
    convergent::EdxConvergent, interval, DomainError, Interval, IntervalSpec, JiSubgroup, Monzo,
    Rational,
};
use pretty_assertions::assert_eq;

const LITERALS: [&str; 16] = [
    "1", "2", "4/2", "1200c", "3/2", "6/4", "7\\12", "14\\24", "700c", "7/5", "1.4", "1\\13<3>",
    "2\\26<3>", "0.5", "-1200c", "1\\2<4>",
];

fn i(literal: &str) -> Interval {
    interval(literal).unwrap()
}

fn hash_of(interval: &Interval) -> u64 {
    let mut hasher = DefaultHasher::new();
    interval.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn equality_is_an_equivalence_relation() {
    let intervals = LITERALS.map(i);

    for a in &intervals {
        assert_eq!(a, a);
        for b in &intervals {
            assert_eq!(a == b, b == a, "{a} vs. {b}");
            for c in &intervals {
                if a == b && b == c {
                    assert_eq!(a, c);
                }
            }
        }
    }

    assert_eq!(i("4/2"), i("2/1"));
    assert_eq!(i("1.4"), i("7/5"));
    assert_eq!(i("1\\2<4>"), i("2"));
    assert_ne!(i("700c"), i("7/5"));
}

#[test]
fn equal_intervals_have_equal_hashes() {
    let intervals = LITERALS.map(i);

    for a in &intervals {
        for b in &intervals {
            if a == b {
                assert_eq!(hash_of(a), hash_of(b), "{a} vs. {b}");
            }
        }
    }
}

#[test]
fn parsable_format_round_trips() {
    for literal in LITERALS {
        let interval = i(literal);
        let formatted = format!("{interval:#}");
        assert_eq!(i(&formatted), interval, "{literal} -> {formatted}");
    }
    assert_eq!(format!("{:#}", i("7/5")), "7/5");
}

#[test]
fn exact_scaling() {
    assert_eq!(i("1\\17") * 17 + 440.0, 880.0);
    assert_eq!(i("1\\13<3>") * 26 + 440.0, 3960.0);
    assert_eq!(i("7/5") * 2 + 250.0, 490.0);
}

#[test]
fn stacking_with_inverse_yields_unison() {
    for literal in LITERALS {
        let interval = i(literal);
        let unison = interval.stack(&interval.inverse());
        assert_eq!(unison, Interval::unison(), "{literal}");
        assert_eq!(unison.cents(), 0.0, "{literal}");
    }
}

#[test]
fn ratio_convergents_improve_monotonically() {
    let target = Rational::new(7, 5).unwrap();
    let convergents = i("7/5").ratio_convergents().collect::<Vec<_>>();

    for window in convergents.windows(2) {
        assert!(window[0].denom() < window[1].denom());
        assert!((&window[0] - &target).abs() > (&window[1] - &target).abs());
    }
    assert_eq!(convergents.last(), Some(&target));
}

#[test]
fn edx_convergents_of_fifth() {
    let convergents = i("3/2")
        .edx_convergents(&Rational::from(2))
        .unwrap()
        .with_max_division(53)
        .collect::<Vec<_>>();

    assert_eq!(
        convergents.last(),
        Some(&EdxConvergent {
            steps: 31,
            division: 53
        })
    );

    let approximation = convergents[3].to_interval(&Rational::from(2)).unwrap();
    assert_eq!(approximation, i("7\\12"));
    assert_approx_eq!(approximation.cents() - i("3/2").cents(), -1.955001);
}

#[test]
fn domain_rejection() {
    assert!(matches!(
        Interval::from_ratio(Rational::new(-1, 2).unwrap()),
        Err(DomainError::NonPositiveRatio(_))
    ));
    assert!(matches!(
        Interval::new(IntervalSpec::default().with_ratio(Rational::new(-1, 2).unwrap())),
        Err(DomainError::NonPositiveRatio(_))
    ));

    let zero_ratio = interval("0/5").unwrap_err();
    assert!(zero_ratio.is_parse_error());

    let DomainError::Parse(malformed) = interval("abc").unwrap_err() else {
        panic!("Expected a parse error");
    };
    assert_eq!(malformed.literal(), "abc");
    assert_eq!(malformed.cause(), None);
}

#[test]
fn monzo_round_trip() {
    for numer in 1..=60 {
        for denom in 1..=60 {
            let ratio = Rational::new(numer, denom).unwrap();
            assert_eq!(Monzo::from_rational(&ratio).unwrap().to_rational(), ratio);
        }
    }

    let monzo = Monzo::from_rational(&Rational::new(81, 1210).unwrap()).unwrap();
    assert_eq!(monzo, Monzo::new(&[-1, 4, -1, 0, -2]));
    assert_eq!(monzo.entry_at_prime(11), Ok(-2));
    assert_eq!(monzo.support().collect::<Vec<_>>(), [0, 1, 2, 4]);
}

#[test]
fn subgroups_use_monzo_supports() {
    let subgroup = JiSubgroup::new(vec![Rational::from(2), Rational::from(3), Rational::from(7)]).unwrap();

    assert!(subgroup.contains_interval(&i("7/6")));
    assert!(!subgroup.contains_interval(&i("5/4")));
    assert!(subgroup.is_subgroup_of(&JiSubgroup::p_limit(7).unwrap()));
    assert!(!subgroup.is_isomorphic(&JiSubgroup::p_limit(7).unwrap()));
}
