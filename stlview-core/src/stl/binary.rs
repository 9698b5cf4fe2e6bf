/// Binary STL decoder with exact-match vertex deduplication
use std::collections::HashMap;
use std::io::{self, Read};

use nom::number::complete::{le_f32, le_u16};
use nom::sequence::tuple;
use nom::IResult;
use tracing::debug;

use super::sniff::{PREAMBLE_LEN, RECORD_LEN};
use crate::error::{read_full, Result, StlError};
use crate::geometry::{push_face, Mesh, FACE_STRIDE};

/// Upper bound on up-front buffer reservation; a bogus count must not
/// allocate before the body proves it exists.
const MAX_RESERVED_TRIANGLES: usize = 1 << 16;

/// Dedup key: the bit patterns of x, y and z.
///
/// Two vertices share an index only when all three coordinates are
/// bit-for-bit identical, so `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 3]);

impl VertexKey {
    fn new(xyz: [f32; 3]) -> Self {
        Self(xyz.map(f32::to_bits))
    }
}

/// One 50-byte triangle record, normal and attribute count already dropped.
struct TriangleRecord {
    vertices: [[f32; 3]; 3],
}

/// Decode `triangle_count` binary records from a stream positioned at byte 0.
///
/// The 84-byte preamble is skipped, not re-validated.
pub fn decode_binary<R: Read>(mut reader: R, triangle_count: u32) -> Result<Mesh> {
    skip_preamble(&mut reader)?;

    let reserve = (triangle_count as usize).min(MAX_RESERVED_TRIANGLES);
    let mut positions: Vec<f32> = Vec::with_capacity(reserve * 3);
    let mut faces: Vec<u32> = Vec::with_capacity(reserve * FACE_STRIDE);
    let mut seen: HashMap<VertexKey, u32> = HashMap::with_capacity(reserve);

    let mut buf = [0u8; RECORD_LEN];
    for triangle in 0..triangle_count {
        if read_full(&mut reader, &mut buf)? < RECORD_LEN {
            return Err(StlError::TruncatedBody {
                triangle,
                expected: triangle_count,
            });
        }
        let (_, record) = parse_record(&buf).map_err(|_| StlError::TruncatedBody {
            triangle,
            expected: triangle_count,
        })?;

        let indices = record.vertices.map(|xyz| {
            *seen.entry(VertexKey::new(xyz)).or_insert_with(|| {
                let index = (positions.len() / 3) as u32;
                positions.extend_from_slice(&xyz);
                index
            })
        });
        push_face(&mut faces, indices);
    }

    debug!(
        triangles = triangle_count,
        unique_vertices = positions.len() / 3,
        "decoded binary STL"
    );
    Ok(Mesh::assemble(positions, faces))
}

fn skip_preamble<R: Read>(reader: &mut R) -> Result<()> {
    let skipped = io::copy(&mut reader.take(PREAMBLE_LEN as u64), &mut io::sink())?;
    match skipped as usize {
        n if n < PREAMBLE_LEN - 4 => Err(StlError::MalformedHeader { found: n }),
        n if n < PREAMBLE_LEN => Err(StlError::TruncatedCount),
        _ => Ok(()),
    }
}

fn parse_vec3(input: &[u8]) -> IResult<&[u8], [f32; 3]> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, [x, y, z]))
}

fn parse_record(input: &[u8]) -> IResult<&[u8], TriangleRecord> {
    let (input, _normal) = parse_vec3(input)?;
    let (input, v0) = parse_vec3(input)?;
    let (input, v1) = parse_vec3(input)?;
    let (input, v2) = parse_vec3(input)?;
    let (input, _attribute_count) = le_u16(input)?;
    Ok((
        input,
        TriangleRecord {
            vertices: [v0, v1, v2],
        },
    ))
}
