//! GrowableBuffer: append-only, type-erased staging storage.
//!
//! Elements are fixed-size byte records appended one at a time. The buffer
//! tracks `allocated_bytes` and `used_bytes` itself and doubles the
//! allocation whenever the next append would not fit, starting from room
//! for [`INITIAL_BUFFER_ELEMENTS`] elements.
//!
//! Growth may move the storage. Any borrow obtained from [`as_bytes`]
//! (or anything derived from it) ends before the next `push_back`; the
//! borrow checker rejects code that tries to hold one across an append.
//! Typed reads return owned copies for the same reason.
//!
//! [`as_bytes`]: GrowableBuffer::as_bytes

use crate::error::TableError;
use bytemuck::Pod;

/// Number of elements the first allocation has room for.
pub const INITIAL_BUFFER_ELEMENTS: usize = 6;

#[derive(Debug)]
pub struct GrowableBuffer {
    element_size: usize,
    allocated_bytes: usize,
    // `data.len()` is the used byte count.
    data: Vec<u8>,
}

impl GrowableBuffer {
    /// Create an empty buffer with room for six `element_size`-byte elements.
    pub fn new(element_size: usize) -> Result<Self, TableError> {
        let allocated_bytes = element_size
            .checked_mul(INITIAL_BUFFER_ELEMENTS)
            .ok_or(TableError::AllocationFailure { bytes: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(allocated_bytes)
            .map_err(|_| TableError::AllocationFailure {
                bytes: allocated_bytes,
            })?;
        Ok(Self {
            element_size,
            allocated_bytes,
            data,
        })
    }

    /// Create an empty buffer sized for elements of type `T`.
    pub fn for_type<T: Pod>() -> Result<Self, TableError> {
        Self::new(core::mem::size_of::<T>())
    }

    /// Append one element's bytes, doubling the allocation when full.
    ///
    /// On error the buffer is unchanged.
    pub fn push_back(&mut self, element: &[u8]) -> Result<(), TableError> {
        if element.len() != self.element_size {
            return Err(TableError::ElementSizeMismatch {
                expected: self.element_size,
                actual: element.len(),
            });
        }
        let used = self.data.len();
        if self.allocated_bytes < used + self.element_size {
            let grown = self
                .allocated_bytes
                .checked_mul(2)
                .ok_or(TableError::AllocationFailure { bytes: usize::MAX })?;
            self.data
                .try_reserve_exact(grown - used)
                .map_err(|_| TableError::AllocationFailure { bytes: grown })?;
            tracing::trace!(
                old_bytes = self.allocated_bytes,
                new_bytes = grown,
                "growable buffer: doubling"
            );
            self.allocated_bytes = grown;
        }
        self.data.extend_from_slice(element);
        Ok(())
    }

    /// Append a typed element. `T` must be exactly `element_size` bytes.
    pub fn push<T: Pod>(&mut self, value: &T) -> Result<(), TableError> {
        self.push_back(bytemuck::bytes_of(value))
    }

    /// Copy of the element at `index`, or `None` when out of range or when
    /// `T` is not `element_size` bytes.
    pub fn get<T: Pod>(&self, index: usize) -> Option<T> {
        if core::mem::size_of::<T>() != self.element_size || index >= self.len() {
            return None;
        }
        let start = index * self.element_size;
        Some(bytemuck::pod_read_unaligned(
            &self.data[start..start + self.element_size],
        ))
    }

    /// Iterate over copies of every element, in append order.
    pub fn iter<T: Pod>(&self) -> Result<impl Iterator<Item = T> + '_, TableError> {
        let size = core::mem::size_of::<T>();
        if size != self.element_size {
            return Err(TableError::ElementSizeMismatch {
                expected: self.element_size,
                actual: size,
            });
        }
        Ok((0..self.len()).map(move |i| {
            bytemuck::pod_read_unaligned(&self.data[i * size..(i + 1) * size])
        }))
    }

    /// Number of elements appended so far.
    pub fn len(&self) -> usize {
        if self.element_size == 0 {
            0
        } else {
            self.data.len() / self.element_size
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    pub fn used_bytes(&self) -> usize {
        self.data.len()
    }

    /// The used bytes. The borrow must end before the next append.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// `data` capacity must cover `allocated_bytes` in the clone too.
impl Clone for GrowableBuffer {
    fn clone(&self) -> Self {
        let mut data = Vec::with_capacity(self.allocated_bytes);
        data.extend_from_slice(&self.data);
        Self {
            element_size: self.element_size,
            allocated_bytes: self.allocated_bytes,
            data,
        }
    }
}
