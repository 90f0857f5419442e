//! djb2-style hashing over a key's own byte representation.

/// Stored hash that marks an unused slot.
pub const EMPTY_HASH: u32 = 0;

/// `hash = hash * 33 + byte` seeded with 5381, wrapping in 32 bits.
///
/// Never returns [`EMPTY_HASH`]; a result of 0 is remapped to 1.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    let hash = bytes
        .iter()
        .fold(5381u32, |h, &b| h.wrapping_mul(33).wrapping_add(b as u32));
    if hash == EMPTY_HASH {
        1
    } else {
        hash
    }
}

/// Hash of a POD key over exactly `size_of::<K>()` bytes.
#[inline]
pub fn hash_key<K: bytemuck::Pod>(key: &K) -> u32 {
    djb2(bytemuck::bytes_of(key))
}
