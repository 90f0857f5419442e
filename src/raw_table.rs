//! RawTable: open addressing over a prime-sized array with linear probing.
//!
//! Layout is a struct of arrays owned by the table: `hashes[N]`, `keys[N]`
//! and `values[N * value_size]`, where `N` is a [`PRIMES`] entry. A stored
//! hash of [`EMPTY_HASH`] marks an unused slot; [`djb2`](crate::hash::djb2)
//! never produces it.
//!
//! Invariants:
//! - `len / capacity <= 0.8` after every insert; growth happens before the
//!   insert that would cross it.
//! - Every occupied slot holds `hashes[i] == hash_key(&keys[i]) != 0`.
//! - Every live key is reached by probing forward (wrapping) from
//!   `hash % capacity` before any unused slot is met.
//!
//! Deletion uses no tombstones. After clearing a slot, each entry in the run
//! of occupied slots that follows it is lifted out and placed again from
//! its home slot, which keeps the last invariant intact.
//!
//! Values are opaque `value_size`-byte blobs. Borrows returned by [`get`]
//! and [`get_mut`] end before the next mutating call; growth moves storage.
//!
//! [`PRIMES`]: crate::prime_ladder::PRIMES
//! [`get`]: RawTable::get
//! [`get_mut`]: RawTable::get_mut

use crate::error::TableError;
use crate::hash::{hash_key, EMPTY_HASH};
use crate::prime_ladder::{capacity_at, find_prime_index};
use bytemuck::Pod;

/// Numerator of the maximum load factor (4/5).
pub const MAX_LOAD_NUM: usize = 4;
/// Denominator of the maximum load factor (4/5).
pub const MAX_LOAD_DEN: usize = 5;

/// Backing arrays for one capacity.
struct Slots<K> {
    hashes: Vec<u32>,
    keys: Vec<K>,
    values: Vec<u8>,
}

impl<K: Pod> Slots<K> {
    fn alloc(capacity: usize, value_size: usize) -> Result<Self, TableError> {
        let value_bytes = capacity
            .checked_mul(value_size)
            .ok_or(TableError::AllocationFailure { bytes: usize::MAX })?;

        let mut hashes = Vec::new();
        hashes
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::alloc::<u32>(capacity))?;
        let mut keys = Vec::new();
        keys.try_reserve_exact(capacity)
            .map_err(|_| TableError::alloc::<K>(capacity))?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(value_bytes)
            .map_err(|_| TableError::AllocationFailure { bytes: value_bytes })?;

        hashes.resize(capacity, EMPTY_HASH);
        keys.resize(capacity, K::zeroed());
        values.resize(value_bytes, 0);
        Ok(Self {
            hashes,
            keys,
            values,
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.hashes.len()
    }
}

pub struct RawTable<K> {
    slots: Slots<K>,
    value_size: usize,
    prime_index: usize,
    len: usize,
}

impl<K: Pod> RawTable<K> {
    /// Create an empty table with `PRIMES[prime_index]` slots.
    pub fn new(value_size: usize, prime_index: usize) -> Result<Self, TableError> {
        let capacity = capacity_at(prime_index)?;
        Ok(Self {
            slots: Slots::alloc(capacity, value_size)?,
            value_size,
            prime_index,
            len: 0,
        })
    }

    /// Create an empty table whose capacity is the smallest prime `>= hint`.
    pub fn with_capacity(value_size: usize, hint: usize) -> Result<Self, TableError> {
        Self::new(value_size, find_prime_index(hint)?)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots; always a [`PRIMES`](crate::prime_ladder::PRIMES) entry.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Position of [`capacity`](Self::capacity) in the prime ladder.
    pub fn prime_index(&self) -> usize {
        self.prime_index
    }

    /// Byte width of every stored value.
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    #[inline]
    fn value_range(&self, slot: usize) -> core::ops::Range<usize> {
        let start = slot * self.value_size;
        start..start + self.value_size
    }

    /// Slot holding `key`, if present.
    pub(crate) fn find_slot(&self, key: &K) -> Option<usize> {
        let hash = hash_key(key);
        let key_bytes = bytemuck::bytes_of(key);
        let capacity = self.capacity();
        let mut slot = hash as usize % capacity;
        // The load factor guarantees an unused slot, so this terminates.
        loop {
            let stored = self.slots.hashes[slot];
            if stored == EMPTY_HASH {
                return None;
            }
            if stored == hash && bytemuck::bytes_of(&self.slots.keys[slot]) == key_bytes {
                return Some(slot);
            }
            slot = (slot + 1) % capacity;
        }
    }

    pub(crate) fn value_at(&self, slot: usize) -> &[u8] {
        &self.slots.values[self.value_range(slot)]
    }

    pub(crate) fn value_at_mut(&mut self, slot: usize) -> &mut [u8] {
        let range = self.value_range(slot);
        &mut self.slots.values[range]
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    /// Borrow the value bytes stored for `key`.
    pub fn get(&self, key: &K) -> Option<&[u8]> {
        self.find_slot(key).map(|slot| self.value_at(slot))
    }

    /// Mutably borrow the value bytes stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut [u8]> {
        let slot = self.find_slot(key)?;
        Some(self.value_at_mut(slot))
    }

    /// Store `value` under `key`.
    ///
    /// Returns `true` when the key was new and `false` when an existing
    /// value was overwritten. Overwrites never grow the table. On error
    /// the table is unchanged.
    pub fn insert(&mut self, key: K, value: &[u8]) -> Result<bool, TableError> {
        if value.len() != self.value_size {
            return Err(TableError::ValueSizeMismatch {
                expected: self.value_size,
                actual: value.len(),
            });
        }
        if let Some(slot) = self.find_slot(&key) {
            self.value_at_mut(slot).copy_from_slice(value);
            return Ok(false);
        }
        self.insert_new(key, value)?;
        Ok(true)
    }

    /// Insert a key known to be absent. Returns the slot it landed in.
    pub(crate) fn insert_new(&mut self, key: K, value: &[u8]) -> Result<usize, TableError> {
        debug_assert_eq!(value.len(), self.value_size);
        if (self.len + 1) * MAX_LOAD_DEN > self.capacity() * MAX_LOAD_NUM {
            self.resize()?;
        }
        let hash = hash_key(&key);
        let slot = Self::place(&mut self.slots, self.value_size, hash, key, value);
        self.len += 1;
        Ok(slot)
    }

    /// Write an entry whose hash is already known into the first unused
    /// slot at or after its home slot.
    fn place(slots: &mut Slots<K>, value_size: usize, hash: u32, key: K, value: &[u8]) -> usize {
        let capacity = slots.capacity();
        let mut slot = hash as usize % capacity;
        while slots.hashes[slot] != EMPTY_HASH {
            slot = (slot + 1) % capacity;
        }
        slots.hashes[slot] = hash;
        slots.keys[slot] = key;
        let start = slot * value_size;
        slots.values[start..start + value_size].copy_from_slice(value);
        slot
    }

    /// Remove `key`. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.find_slot(key) {
            Some(slot) => {
                self.remove_slot(slot);
                true
            }
            None => false,
        }
    }

    /// Clear an occupied slot and re-place the run of entries after it.
    pub(crate) fn remove_slot(&mut self, slot: usize) {
        debug_assert_ne!(self.slots.hashes[slot], EMPTY_HASH);
        let capacity = self.capacity();
        let value_size = self.value_size;
        self.slots.hashes[slot] = EMPTY_HASH;
        self.slots.keys[slot] = K::zeroed();

        // Scratch copy of one value while its slot is cleared.
        let mut value = vec![0u8; value_size];
        let mut next = (slot + 1) % capacity;
        while self.slots.hashes[next] != EMPTY_HASH {
            let hash = self.slots.hashes[next];
            let key = self.slots.keys[next];
            let start = next * value_size;
            value.copy_from_slice(&self.slots.values[start..start + value_size]);
            self.slots.hashes[next] = EMPTY_HASH;

            Self::place(&mut self.slots, value_size, hash, key, &value);
            next = (next + 1) % capacity;
        }
        self.len -= 1;
    }

    /// Move every entry into the next ladder capacity.
    ///
    /// Fails with `CapacityExhausted` at the end of the ladder and with
    /// `AllocationFailure` if the new arrays cannot be reserved; either way
    /// the table is left as it was.
    pub fn resize(&mut self) -> Result<(), TableError> {
        self.grow_to(self.prime_index + 1)
    }

    /// Rebuild the table at ladder rung `next_index`.
    fn grow_to(&mut self, next_index: usize) -> Result<(), TableError> {
        let new_capacity = match capacity_at(next_index) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    capacity = self.capacity(),
                    entries = self.len,
                    "prime table: ladder exhausted"
                );
                return Err(e);
            }
        };
        let mut fresh = Slots::alloc(new_capacity, self.value_size)?;

        tracing::debug!(
            old_capacity = self.capacity(),
            new_capacity,
            entries = self.len,
            "prime table: growing"
        );

        let value_size = self.value_size;
        for slot in 0..self.capacity() {
            let hash = self.slots.hashes[slot];
            if hash != EMPTY_HASH {
                Self::place(
                    &mut fresh,
                    value_size,
                    hash,
                    self.slots.keys[slot],
                    &self.slots.values[slot * value_size..(slot + 1) * value_size],
                );
            }
        }
        self.slots = fresh;
        self.prime_index = next_index;
        Ok(())
    }

    /// Iterate over `(key, value bytes)` for occupied slots, in slot order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            table: self,
            slot: 0,
        }
    }

    /// Check every structural invariant; panics with a description on the
    /// first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.capacity();
        let occupied = self
            .slots
            .hashes
            .iter()
            .filter(|&&h| h != EMPTY_HASH)
            .count();
        assert_eq!(occupied, self.len, "len does not match occupied slots");
        assert!(
            self.len * MAX_LOAD_DEN <= capacity * MAX_LOAD_NUM,
            "load factor above 0.8: {}/{}",
            self.len,
            capacity
        );
        assert_eq!(self.slots.values.len(), capacity * self.value_size);
        for slot in 0..capacity {
            let stored = self.slots.hashes[slot];
            if stored == EMPTY_HASH {
                continue;
            }
            assert_eq!(stored, hash_key(&self.slots.keys[slot]), "stale hash at {slot}");
            let mut probe = stored as usize % capacity;
            while probe != slot {
                assert_ne!(
                    self.slots.hashes[probe],
                    EMPTY_HASH,
                    "slot {slot} unreachable from its home"
                );
                probe = (probe + 1) % capacity;
            }
        }
    }
}

impl<K: Pod> core::fmt::Debug for RawTable<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("prime_index", &self.prime_index)
            .field("value_size", &self.value_size)
            .finish()
    }
}

/// Iterator over occupied slots of a `RawTable`.
pub struct Iter<'a, K> {
    table: &'a RawTable<K>,
    slot: usize,
}

impl<'a, K: Pod> Iterator for Iter<'a, K> {
    type Item = (&'a K, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        while self.slot < table.capacity() {
            let slot = self.slot;
            self.slot += 1;
            if table.slots.hashes[slot] != EMPTY_HASH {
                return Some((&table.slots.keys[slot], table.value_at(slot)));
            }
        }
        None
    }
}
