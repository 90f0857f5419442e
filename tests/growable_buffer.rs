// GrowableBuffer integration tests.
//
// Invariants exercised:
// - used_bytes <= allocated_bytes after every append.
// - The first allocation holds six elements; growth doubles it.
// - Appended content is preserved across growth, in order.
use prime_table::{GrowableBuffer, TableError};

// Test: staging records of a fixed-size struct-like type.
// Verifies: size, growth sequence, and content after many appends.
#[test]
fn stage_records_across_growth() {
    let mut b = GrowableBuffer::for_type::<[f32; 3]>().unwrap();
    assert_eq!(b.element_size(), 12);
    assert_eq!(b.allocated_bytes(), 72);

    for i in 0..1000 {
        let f = i as f32;
        b.push(&[f, f + 0.5, -f]).unwrap();
        assert!(b.used_bytes() <= b.allocated_bytes());
    }
    assert_eq!(b.len(), 1000);
    assert_eq!(b.used_bytes(), 12_000);
    // 72 doubled until it holds 12_000 bytes.
    assert_eq!(b.allocated_bytes(), 72 * 256);

    let all: Vec<[f32; 3]> = b.iter().unwrap().collect();
    assert_eq!(all[0], [0.0, 0.5, -0.0]);
    assert_eq!(all[999], [999.0, 999.5, -999.0]);
}

// Test: the untyped push path.
// Verifies: raw bytes land contiguously and size mismatches are errors.
#[test]
fn raw_bytes_push_back() {
    let mut b = GrowableBuffer::new(2).unwrap();
    b.push_back(&[1, 2]).unwrap();
    b.push_back(&[3, 4]).unwrap();
    assert_eq!(b.as_bytes(), &[1, 2, 3, 4]);
    assert_eq!(
        b.push_back(&[5]),
        Err(TableError::ElementSizeMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(b.len(), 2);
    assert_eq!(b.get::<[u8; 2]>(1), Some([3, 4]));
}
