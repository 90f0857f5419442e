//! PrimeTable: typed POD keys and values over `RawTable`.

use crate::error::TableError;
use crate::raw_table::{self, RawTable};
use bytemuck::Pod;
use core::marker::PhantomData;

/// A `K -> V` table with prime capacities and backward-shift deletion.
///
/// Keys compare by their bytes. Values are returned as copies; nothing
/// handed out borrows the table past the call that produced it.
pub struct PrimeTable<K, V> {
    raw: RawTable<K>,
    _pd: PhantomData<V>,
}

impl<K: Pod, V: Pod> PrimeTable<K, V> {
    /// Create an empty table with `PRIMES[prime_index]` slots.
    pub fn new(prime_index: usize) -> Result<Self, TableError> {
        Ok(Self {
            raw: RawTable::new(core::mem::size_of::<V>(), prime_index)?,
            _pd: PhantomData,
        })
    }

    /// Create an empty table with at least `hint` slots.
    pub fn with_capacity(hint: usize) -> Result<Self, TableError> {
        Ok(Self {
            raw: RawTable::with_capacity(core::mem::size_of::<V>(), hint)?,
            _pd: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn prime_index(&self) -> usize {
        self.raw.prime_index()
    }

    /// The untyped table underneath.
    pub fn as_raw(&self) -> &RawTable<K> {
        &self.raw
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.raw.get(key).map(bytemuck::pod_read_unaligned)
    }

    /// Insert or overwrite. Returns the previous value for `key`.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let bytes = bytemuck::bytes_of(&value);
        match self.raw.find_slot(&key) {
            Some(slot) => {
                let old = bytemuck::pod_read_unaligned(self.raw.value_at(slot));
                self.raw.value_at_mut(slot).copy_from_slice(bytes);
                Ok(Some(old))
            }
            None => {
                self.raw.insert_new(key, bytes)?;
                Ok(None)
            }
        }
    }

    /// Return the value for `key`, inserting `default()` first if absent.
    ///
    /// `default` runs only when the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> Result<V, TableError>
    where
        F: FnOnce() -> V,
    {
        if let Some(slot) = self.raw.find_slot(&key) {
            return Ok(bytemuck::pod_read_unaligned(self.raw.value_at(slot)));
        }
        let value = default();
        self.raw.insert_new(key, bytemuck::bytes_of(&value))?;
        Ok(value)
    }

    /// Apply `f` to the stored value in place. Returns `false` if absent.
    pub fn update<F>(&mut self, key: &K, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        let Some(slot) = self.raw.find_slot(key) else {
            return false;
        };
        let mut value: V = bytemuck::pod_read_unaligned(self.raw.value_at(slot));
        f(&mut value);
        self.raw
            .value_at_mut(slot)
            .copy_from_slice(bytemuck::bytes_of(&value));
        true
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.raw.find_slot(key)?;
        let value = bytemuck::pod_read_unaligned(self.raw.value_at(slot));
        self.raw.remove_slot(slot);
        Some(value)
    }

    /// Grow to the next ladder capacity now rather than on demand.
    pub fn resize(&mut self) -> Result<(), TableError> {
        self.raw.resize()
    }

    /// Iterate over copies of every `(key, value)` pair, in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.raw.iter(),
            _pd: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.raw.assert_invariants();
    }
}

impl<K: Pod, V: Pod> core::fmt::Debug for PrimeTable<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrimeTable")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Iterator over copies of the entries in a `PrimeTable`.
pub struct Iter<'a, K, V> {
    it: raw_table::Iter<'a, K>,
    _pd: PhantomData<V>,
}

impl<'a, K: Pod, V: Pod> Iterator for Iter<'a, K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(k, v)| (*k, bytemuck::pod_read_unaligned(v)))
    }
}
