//! Prime capacities, each roughly double the previous one.

use crate::error::TableError;

/// Table capacities. Every entry is prime and about twice its predecessor.
pub const PRIMES: [u32; 26] = [
    53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613, 393241, 786433,
    1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611, 402653189,
    805306457, 1610612741,
];

/// Index of the smallest ladder capacity that is `>= required`.
///
/// Probes the midpoint of the remaining range and halves the range each
/// step, then settles on the first entry not below `required`.
pub fn find_prime_index(required: usize) -> Result<usize, TableError> {
    let mut base = 0usize;
    let mut size = PRIMES.len();
    while size > 1 {
        let half = size / 2;
        let mid = base + half;
        if (PRIMES[mid] as usize) < required {
            base = mid;
        }
        size -= half;
    }
    if (PRIMES[base] as usize) < required {
        base += 1;
    }
    if base == PRIMES.len() {
        return Err(TableError::CapacityExhausted { required });
    }
    Ok(base)
}

/// Capacity stored at `index`, or `CapacityExhausted` past the end.
pub fn capacity_at(index: usize) -> Result<usize, TableError> {
    match PRIMES.get(index) {
        Some(&p) => Ok(p as usize),
        None => Err(TableError::CapacityExhausted {
            required: PRIMES[PRIMES.len() - 1] as usize + 1,
        }),
    }
}
