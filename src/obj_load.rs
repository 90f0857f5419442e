//! Wavefront OBJ reader that builds an indexed, deduplicated vertex list.
//!
//! Positions (`v`), texture coordinates (`vt`) and face corners (`f`) are
//! staged in [`GrowableBuffer`]s while the file is read. Every corner is
//! then resolved to a [`Vertex`] and fed through a [`PrimeTable`] keyed by
//! the vertex bytes, so identical vertices share one index.

use crate::error::TableError;
use crate::growable_buffer::GrowableBuffer;
use crate::prime_table::PrimeTable;
use bytemuck::{Pod, Zeroable};
use std::io::BufRead;
use std::path::Path;

/// One renderable vertex. Compared and hashed by its bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

/// Deduplicated vertices plus one index per face corner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Which attribute list a face index pointed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Position,
    TexCoord,
}

impl core::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            IndexKind::Position => "position",
            IndexKind::TexCoord => "texture coordinate",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ObjError {
    #[error("failed to read model")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: {kind} index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        line: usize,
        kind: IndexKind,
        index: i64,
        len: usize,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Face corner as zero-based indices into the staged attribute lists.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Corner {
    pos: u32,
    uv: u32,
}

struct Staging {
    positions: GrowableBuffer,
    uvs: GrowableBuffer,
    corners: GrowableBuffer,
}

fn parse_err(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_floats<const N: usize>(
    line: usize,
    directive: &str,
    fields: &mut core::str::SplitWhitespace<'_>,
) -> Result<[f32; N], ObjError> {
    let mut out = [0f32; N];
    for slot in out.iter_mut() {
        let field = fields
            .next()
            .ok_or_else(|| parse_err(line, format!("`{}` needs {} numbers", directive, N)))?;
        *slot = field
            .parse()
            .map_err(|_| parse_err(line, format!("`{field}` is not a number")))?;
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, end-relative) OBJ index.
fn resolve(line: usize, kind: IndexKind, field: &str, len: usize) -> Result<u32, ObjError> {
    let index: i64 = field
        .parse()
        .map_err(|_| parse_err(line, format!("`{field}` is not an index")))?;
    let out_of_range = ObjError::IndexOutOfRange {
        line,
        kind,
        index,
        len,
    };
    let zero_based = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len as i64 + i,
        _ => return Err(out_of_range),
    };
    if zero_based < 0 || zero_based >= len as i64 {
        return Err(out_of_range);
    }
    u32::try_from(zero_based).map_err(|_| out_of_range)
}

fn parse_corner(line: usize, token: &str, staging: &Staging) -> Result<Corner, ObjError> {
    let mut parts = token.split('/');
    let pos = parts.next().unwrap_or_default();
    let uv = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| parse_err(line, format!("corner `{token}` has no texture index")))?;
    Ok(Corner {
        pos: resolve(line, IndexKind::Position, pos, staging.positions.len())?,
        uv: resolve(line, IndexKind::TexCoord, uv, staging.uvs.len())?,
    })
}

fn parse_face(
    line: usize,
    fields: core::str::SplitWhitespace<'_>,
    staging: &mut Staging,
) -> Result<(), ObjError> {
    let mut polygon = Vec::with_capacity(4);
    for token in fields {
        polygon.push(parse_corner(line, token, staging)?);
    }
    if polygon.len() < 3 {
        return Err(parse_err(line, "a face needs at least three corners"));
    }
    // Fan triangulation around the first corner.
    for i in 1..polygon.len() - 1 {
        for corner in [&polygon[0], &polygon[i], &polygon[i + 1]] {
            staging.corners.push(corner)?;
        }
    }
    Ok(())
}

/// Read an OBJ model and deduplicate its vertices.
pub fn load_obj<R: BufRead>(reader: R) -> Result<MeshData, ObjError> {
    let mut staging = Staging {
        positions: GrowableBuffer::for_type::<[f32; 3]>()?,
        uvs: GrowableBuffer::for_type::<[f32; 2]>()?,
        corners: GrowableBuffer::for_type::<Corner>()?,
    };

    for (n, text) in reader.lines().enumerate() {
        let text = text?;
        let line = n + 1;
        let mut fields = text.split_whitespace();
        match fields.next() {
            Some("v") => {
                let pos: [f32; 3] = parse_floats(line, "v", &mut fields)?;
                staging.positions.push(&pos)?;
            }
            Some("vt") => {
                let [u, v]: [f32; 2] = parse_floats(line, "vt", &mut fields)?;
                // Flip to a top-left texture origin.
                staging.uvs.push(&[u, 1.0 - v])?;
            }
            Some("f") => parse_face(line, fields, &mut staging)?,
            _ => {}
        }
    }

    let Staging {
        positions,
        uvs,
        corners,
    } = staging;
    let vertices = corners.iter::<Corner>()?.map(|c| Vertex {
        // Indices were range-checked while parsing.
        pos: positions.get(c.pos as usize).unwrap_or_default(),
        color: [0.0; 3],
        uv: uvs.get(c.uv as usize).unwrap_or_default(),
    });
    let mesh = dedup_with_capacity(vertices, corners.len())?;

    tracing::debug!(
        positions = positions.len(),
        tex_coords = uvs.len(),
        corners = corners.len(),
        unique_vertices = mesh.vertices.len(),
        "obj: model loaded"
    );
    Ok(mesh)
}

/// Open and read an OBJ model from `path`.
pub fn load_obj_file<P: AsRef<Path>>(path: P) -> Result<MeshData, ObjError> {
    let file = std::fs::File::open(path)?;
    load_obj(std::io::BufReader::new(file))
}

/// Assign each distinct vertex an index in first-seen order.
pub fn dedup_vertices<I>(vertices: I) -> Result<MeshData, TableError>
where
    I: IntoIterator<Item = Vertex>,
{
    let it = vertices.into_iter();
    let hint = it.size_hint().0;
    dedup_with_capacity(it, hint)
}

/// Index the next unique vertex will get, if it still fits in a `u32`.
fn next_vertex_index(unique: usize) -> Result<u32, TableError> {
    u32::try_from(unique).map_err(|_| TableError::CapacityExhausted {
        required: unique.saturating_add(1),
    })
}

fn dedup_with_capacity<I>(vertices: I, hint: usize) -> Result<MeshData, TableError>
where
    I: Iterator<Item = Vertex>,
{
    let mut table: PrimeTable<Vertex, u32> = PrimeTable::with_capacity(hint)?;
    let mut mesh = MeshData {
        vertices: Vec::new(),
        indices: Vec::with_capacity(hint),
    };
    for vertex in vertices {
        let next = next_vertex_index(mesh.vertices.len())?;
        let index = table.get_or_insert_with(vertex, || next)?;
        if index == next {
            mesh.vertices.push(vertex);
        }
        mesh.indices.push(index);
    }
    Ok(mesh)
}
