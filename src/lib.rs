//! prime-table: an in-memory key→value table using open addressing with
//! linear probing over prime capacities, plus an append-only staging
//! buffer used to collect records before the table is filled.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable table for fixed-size POD keys whose layout
//!   and probe sequence can be reasoned about slot by slot.
//! - Layers:
//!   - `prime_ladder`: the fixed capacity sequence (53, 97, 193, ...) and
//!     the "smallest prime >= n" lookup.
//!   - `RawTable<K>`: the structural layer. Keys are `K: Pod`, values are
//!     opaque byte blobs of a size fixed at construction.
//!   - `PrimeTable<K, V>`: typed wrapper that copies `V: Pod` in and out.
//!   - `GrowableBuffer`: type-erased, doubling, append-only storage.
//!   - `obj_load` (feature `obj`): an OBJ model reader that stages its
//!     records in buffers and deduplicates vertices through the table.
//!
//! Constraints
//! - Single-threaded; no internal locking. Share behind an external lock.
//! - Keys are hashed and compared by exactly `size_of::<K>()` bytes.
//! - Stored hash 0 means "unused slot"; the hash remaps 0 to 1.
//! - Load factor stays at or below 0.8; growth moves to the next prime.
//! - No tombstones: removal re-places the run of entries after the hole.
//!
//! Borrowing and growth
//! - Inserting may grow the table and appending may grow a buffer; both
//!   move their storage. Every borrow handed out (`RawTable::get`,
//!   `GrowableBuffer::as_bytes`) is tied to `&self`, so it cannot outlive
//!   the next mutating call. Typed accessors return copies.
//!
//! Failure
//! - Allocation uses `try_reserve_exact`; failure is reported as
//!   `TableError::AllocationFailure` with the structure left unchanged.
//! - Growth past the last ladder prime is `TableError::CapacityExhausted`.
//! - Missing keys are `None`/`false`, not errors.
//!
//! Notes and non-goals
//! - No persistence, no concurrent access, no non-POD keys.
//! - Growth events are emitted as `tracing` events; the crate installs no
//!   subscriber.

pub mod error;
pub mod growable_buffer;
pub mod hash;
#[cfg(feature = "obj")]
pub mod obj_load;
pub mod prime_ladder;
pub mod prime_table;
mod prime_table_proptest;
pub mod raw_table;

// Public surface
pub use error::TableError;
pub use growable_buffer::GrowableBuffer;
pub use prime_ladder::{find_prime_index, PRIMES};
pub use prime_table::PrimeTable;
pub use raw_table::RawTable;
