#![cfg(feature = "obj")]

// OBJ loader tests through the public API: staging via buffers and vertex
// deduplication via the table.
use prime_table::obj_load::{dedup_vertices, load_obj, load_obj_file, ObjError, Vertex};
use std::io::Write;

// A unit cube with one shared uv per corner: 8 positions, 12 triangles.
fn cube_obj() -> String {
    let mut s = String::new();
    for x in [0, 1] {
        for y in [0, 1] {
            for z in [0, 1] {
                s.push_str(&format!("v {x} {y} {z}\n"));
            }
        }
    }
    s.push_str("vt 0 0\n");
    for quad in [
        [1, 2, 4, 3],
        [5, 7, 8, 6],
        [1, 5, 6, 2],
        [3, 4, 8, 7],
        [1, 3, 7, 5],
        [2, 6, 8, 4],
    ] {
        s.push('f');
        for v in quad {
            s.push_str(&format!(" {v}/1"));
        }
        s.push('\n');
    }
    s
}

// Test: a closed mesh where every corner is reused.
// Verifies: 36 indices referencing exactly 8 unique vertices.
#[test]
fn cube_dedups_to_eight_vertices() {
    let mesh = load_obj(cube_obj().as_bytes()).unwrap();
    assert_eq!(mesh.indices.len(), 36);
    assert_eq!(mesh.vertices.len(), 8);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < 8));
}

// Test: reading from a file on disk.
// Verifies: the file path entry point matches the reader entry point, and
// a missing file surfaces as an io error.
#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!("prime-table-cube-{}.obj", std::process::id()));
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(cube_obj().as_bytes()).unwrap();
    }
    let from_file = load_obj_file(&path).unwrap();
    let from_str = load_obj(cube_obj().as_bytes()).unwrap();
    assert_eq!(from_file, from_str);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(load_obj_file(&path), Err(ObjError::Io(_))));
}

// Test: many vertices, most repeated, beyond the first growth step.
// Verifies: indices resolve back to the original sequence.
#[test]
fn dedup_round_trips_the_sequence() {
    let palette: Vec<Vertex> = (0..300)
        .map(|i| Vertex {
            pos: [i as f32, 0.0, 0.0],
            ..Vertex::default()
        })
        .collect();
    let sequence: Vec<Vertex> = (0..3000).map(|i| palette[(i * 7) % 300]).collect();
    let mesh = dedup_vertices(sequence.iter().copied()).unwrap();
    assert_eq!(mesh.vertices.len(), 300);
    let rebuilt: Vec<Vertex> = mesh
        .indices
        .iter()
        .map(|&i| mesh.vertices[i as usize])
        .collect();
    assert_eq!(rebuilt, sequence);
}
