//! Deterministic value hashing for dict keys.
//!
//! The runtime guarantees that if `a == b` then `hash(a) == hash(b)`. Since
//! `0 == 0.0 == False` and `1 == 1.0 == True`, the int, float, and bool hash
//! paths must agree on equivalent inputs. Numeric values hash modulo the
//! Mersenne prime `2^61 - 1`, the same reduction CPython uses, so integers of
//! any width and integral floats land on the same lane. Strings use the
//! standard library's SipHash-1-3 with its fixed default key, which is
//! deterministic across runs.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

/// Mersenne prime used for numeric hashing: `2^61 - 1`.
const MODULUS: i64 = (1 << 61) - 1;

/// Hash lane reserved for `None`.
///
/// Any fixed value works; it only has to be stable and unlikely to collide
/// with common small integers.
pub(crate) const NONE_HASH: u64 = 0xFCA8_6420_EDA1_2D0B;

/// Hashes UTF-8 string content deterministically.
pub(crate) fn str_hash(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hashes a signed 64-bit integer with the Mersenne-prime modular algorithm.
///
/// The result is sign-preserving `n % (2^61 - 1)`, reinterpreted as `u64`.
pub(crate) fn int_hash(value: i64) -> u64 {
    u64::from_ne_bytes(int_hash_signed(value).to_ne_bytes())
}

fn int_hash_signed(value: i64) -> i64 {
    if value == 0 {
        return 0;
    }
    let sign: i64 = if value < 0 { -1 } else { 1 };
    // i64::MIN's absolute value overflows i64, so widen before taking it.
    let abs_val = i128::from(value).unsigned_abs() as u64;
    sign * (abs_val % (MODULUS as u64)) as i64
}

/// Hashes an arbitrary-precision integer consistently with [`int_hash`].
pub(crate) fn long_hash(value: &BigInt) -> u64 {
    if let Some(small) = value.to_i64() {
        return int_hash(small);
    }
    let rem = value % BigInt::from(MODULUS);
    let rem_small = rem.to_i64().expect("remainder below 2^61 fits in i64");
    u64::from_ne_bytes(rem_small.to_ne_bytes())
}

/// Hashes an `f64` consistently with the integer hash paths.
///
/// Integral floats (including ones outside the `i64` range) hash through the
/// integer algorithm so `hash(2.0) == hash(2)`. Non-integral floats hash by
/// bit pattern, with negative zero folded onto zero and all NaNs collapsed
/// onto one lane.
pub(crate) fn float_hash(value: f64) -> u64 {
    if value == 0.0 {
        return int_hash(0);
    }
    if value.is_nan() {
        return u64::from_ne_bytes(f64::NAN.to_bits().to_ne_bytes());
    }
    if value.is_finite() && value == value.trunc() {
        if value >= i64::MIN as f64 && value <= i64::MAX as f64 {
            return int_hash(value as i64);
        }
        let as_big = BigInt::from_f64(value).expect("finite integral float converts");
        return long_hash(&as_big);
    }
    value.to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_int_float_lanes_agree() {
        assert_eq!(int_hash(0), float_hash(0.0));
        assert_eq!(int_hash(1), float_hash(1.0));
        assert_eq!(int_hash(-4), float_hash(-4.0));
        assert_eq!(int_hash(1), int_hash(1));
        // -0.0 == 0.0 must share a lane
        assert_eq!(float_hash(-0.0), float_hash(0.0));
    }

    #[test]
    fn long_hash_agrees_with_int_hash_when_small() {
        assert_eq!(long_hash(&BigInt::from(1234_i64)), int_hash(1234));
        assert_eq!(long_hash(&BigInt::from(-77_i64)), int_hash(-77));
    }

    #[test]
    fn huge_integral_float_matches_big_int() {
        let f = 2f64.powi(80);
        let bi = BigInt::from(2_u8).pow(80);
        assert_eq!(float_hash(f), long_hash(&bi));
    }

    #[test]
    fn str_hash_is_deterministic() {
        assert_eq!(str_hash("key"), str_hash("key"));
        assert_ne!(str_hash("key"), str_hash("other"));
    }
}
