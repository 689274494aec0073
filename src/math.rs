//! Prime numbers and logarithms of big integers.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// The first 100 prime numbers.
pub const SMALL_PRIMES: [u64; 100] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541,
];

/// Checks whether `number` is prime using trial division.
///
/// # Examples
///
/// ```
/// # use intervallic::math;
/// assert!(!math::is_prime(0));
/// assert!(!math::is_prime(1));
/// assert!(math::is_prime(2));
/// assert!(math::is_prime(541));
/// assert!(!math::is_prime(543));
/// assert!(math::is_prime(104729));
/// ```
pub fn is_prime(number: u64) -> bool {
    if number < 4 {
        return number >= 2;
    }
    if number % 2 == 0 {
        return false;
    }
    let mut divisor = 3;
    while divisor <= number / divisor {
        if number % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Returns the prime at position `index` where index 0 refers to the prime 2.
///
/// # Examples
///
/// ```
/// # use intervallic::math;
/// assert_eq!(math::prime_at(0), 2);
/// assert_eq!(math::prime_at(3), 7);
/// assert_eq!(math::prime_at(99), 541);
/// assert_eq!(math::prime_at(100), 547);
/// assert_eq!(math::prime_at(9999), 104729);
/// ```
pub fn prime_at(index: usize) -> u64 {
    Primes::default().skip_to(index)
}

/// Returns the position of `prime` in the sequence of primes or [`None`] if `prime` is not a prime number.
///
/// # Examples
///
/// ```
/// # use intervallic::math;
/// assert_eq!(math::prime_index(2), Some(0));
/// assert_eq!(math::prime_index(7), Some(3));
/// assert_eq!(math::prime_index(547), Some(100));
/// assert_eq!(math::prime_index(1), None);
/// assert_eq!(math::prime_index(9), None);
/// ```
pub fn prime_index(prime: u64) -> Option<usize> {
    if !is_prime(prime) {
        return None;
    }
    if let Ok(index) = SMALL_PRIMES.binary_search(&prime) {
        return Some(index);
    }
    Primes::default().position(|candidate| candidate == prime)
}

/// Infinite ascending sequence of primes.
///
/// Each iterator owns its state, so the sequence can be restarted by creating a new [`Primes`] value.
#[derive(Clone, Debug, Default)]
pub struct Primes {
    index: usize,
    last: u64,
}

impl Primes {
    /// Returns the prime at position `index`, or the next prime if the sequence has already passed `index`.
    ///
    /// Visiting ascending positions with the same [`Primes`] value never revisits a prime.
    pub fn skip_to(&mut self, index: usize) -> u64 {
        if self.index < index && index <= SMALL_PRIMES.len() {
            self.index = index;
            self.last = SMALL_PRIMES[index - 1];
        }
        while self.index < index {
            self.next_prime();
        }
        self.next_prime()
    }

    fn next_prime(&mut self) -> u64 {
        let prime = match SMALL_PRIMES.get(self.index) {
            Some(&prime) => prime,
            None => {
                let mut candidate = self.last + 2;
                while !is_prime(candidate) {
                    candidate += 2;
                }
                candidate
            }
        };
        self.index += 1;
        self.last = prime;
        prime
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_prime())
    }
}

/// Binary logarithm of a positive big integer.
///
/// Returns NaN for non-positive numbers.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use intervallic::math;
/// # use num_bigint::BigInt;
/// assert_approx_eq!(math::log2_big(&BigInt::from(1024)), 10.0);
/// assert_approx_eq!(math::log2_big(&(BigInt::from(3) << 2000u32)), 2001.5849625);
/// assert!(math::log2_big(&BigInt::from(0)).is_nan());
/// ```
pub fn log2_big(number: &BigInt) -> f64 {
    if number.sign() != num_bigint::Sign::Plus {
        return f64::NAN;
    }
    let bits = number.bits();
    if bits <= 1000 {
        return number.to_f64().map_or(f64::NAN, f64::log2);
    }
    let shift = bits - 64;
    (number >> shift).to_f64().map_or(f64::NAN, f64::log2) + shift as f64
}
