//! The alternation function `alt`: generalizes the binary cuckoo filter's XOR
//! displacement to a base-`d` digitwise modular addition for `d > 2`.
//!
//! Applying `alt` with a fixed fingerprint exactly `d` times returns the starting
//! index, for any starting index -- a digit incremented by the same amount `d`
//! times mod `d` lands back where it started. Callers that build a candidate set
//! must debug-assert this cycles correctly; see `CuckooFilter::candidate_set`.

use fasthash::FastHasher;
use std::hash::Hasher;

/// Length of the base-`d` digit vector. 15 digits comfortably covers any 64-bit
/// index even at `d = 3`, the smallest base used for the digitwise path.
const DIGIT_LEN: usize = 15;

fn to_digits(mut n: u64, d: u64) -> [u64; DIGIT_LEN] {
    let mut digits = [0u64; DIGIT_LEN];
    let mut i = 0;
    while n > 0 && i < DIGIT_LEN {
        digits[i] = n % d;
        n /= d;
        i += 1;
    }
    digits
}

fn from_digits(digits: &[u64; DIGIT_LEN], d: u64) -> u64 {
    let mut result: u64 = 0;
    let mut place: u64 = 1;
    for &digit in digits {
        result = result.wrapping_add(digit.wrapping_mul(place));
        place = place.wrapping_mul(d);
    }
    result
}

/// `addₐ(a, b)`: component-wise addition of the base-`d` digit vectors of `a` and
/// `b`, each digit reduced mod `d`, reassembled back into an integer.
fn add_base_d(a: u64, b: u64, d: u64) -> u64 {
    let da = to_digits(a, d);
    let db = to_digits(b, d);
    let mut sum = [0u64; DIGIT_LEN];
    for k in 0..DIGIT_LEN {
        sum[k] = (da[k] + db[k]) % d;
    }
    from_digits(&sum, d)
}

/// Bob Jenkins's `lookup3`, applied to the fingerprint's little-endian bytes and
/// reduced into the table's index space. This is the displacement step `D(t)`;
/// its quality governs false-positive behavior for `d >= 3`.
fn displacement_hash(tag: u32, index_space: usize) -> usize {
    let bytes = tag.to_le_bytes();
    let mut hasher = fasthash::lookup3::Hasher32::new();
    hasher.write(&bytes);
    (hasher.finish() as usize) % index_space.max(1)
}

/// `alt(i, t)`: the next candidate index after `i` for an element with
/// fingerprint `t`. `index_space` is the modulus the hash layer reduces indices
/// into (the packed-with-mark table uses a larger index space than its bucket
/// count; every other table uses its bucket count directly).
pub fn alt(i: usize, tag: u32, d: usize, index_space: usize) -> usize {
    let step = displacement_hash(tag, index_space);
    if d == 2 {
        i ^ step
    } else {
        add_base_d(step as u64, i as u64, d as u64) as usize
    }
}
