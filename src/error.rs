//! Error types for the table and the staging buffer.

/// Failures reported by [`RawTable`](crate::raw_table::RawTable),
/// [`PrimeTable`](crate::prime_table::PrimeTable) and
/// [`GrowableBuffer`](crate::growable_buffer::GrowableBuffer).
///
/// A missing key is never an error; lookups and removals report absence
/// with `None` or `false`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TableError {
    /// The allocator refused a reservation.
    ///
    /// The structure that attempted the allocation is left exactly as it
    /// was before the call.
    #[error("failed to allocate {bytes} bytes of backing storage")]
    AllocationFailure { bytes: usize },

    /// The requested capacity is beyond the last entry of the prime ladder,
    /// or a mesh has more unique vertices than a `u32` index can name.
    #[error("no ladder capacity can hold {required} slots")]
    CapacityExhausted { required: usize },

    /// A raw value slice did not match the table's value size.
    #[error("value is {actual} bytes but the table stores {expected}-byte values")]
    ValueSizeMismatch { expected: usize, actual: usize },

    /// A buffer element did not match the buffer's element size.
    #[error("element is {actual} bytes but the buffer stores {expected}-byte elements")]
    ElementSizeMismatch { expected: usize, actual: usize },
}

impl TableError {
    pub(crate) fn alloc<T>(count: usize) -> Self {
        TableError::AllocationFailure {
            bytes: count.saturating_mul(core::mem::size_of::<T>()),
        }
    }
}
