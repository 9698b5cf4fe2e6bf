/// Line-oriented ASCII STL decoder
use std::io::{self, BufRead};

use nom::combinator::all_consuming;
use nom::number::complete::float;
use tracing::debug;

use super::sniff::trim_control;
use crate::error::{Result, StlError};
use crate::geometry::{push_face, Mesh};

/// Decode ASCII STL text.
///
/// Only `vertex` and `endfacet` lines matter; everything else is skipped.
/// Every `vertex` line becomes a new vertex (no deduplication). An `endfacet`
/// emits a triangle only when exactly three vertices are pending; otherwise it
/// is ignored and the pending list is left as is.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`.
pub fn decode_ascii<R: BufRead>(mut reader: R) -> Result<Mesh> {
    let mut positions: Vec<f32> = Vec::new();
    let mut faces: Vec<u32> = Vec::new();
    let mut pending: Vec<u32> = Vec::with_capacity(3);

    let mut raw = Vec::new();
    let mut line_no = 0;
    while read_line(&mut reader, &mut raw)? {
        line_no += 1;

        let line = trim_control(&String::from_utf8_lossy(&raw)).to_lowercase();
        if line.starts_with("vertex") {
            let xyz = parse_vertex(&line, line_no)?;
            pending.push((positions.len() / 3) as u32);
            positions.extend_from_slice(&xyz);
        } else if line.starts_with("endfacet") {
            if let [a, b, c] = pending[..] {
                push_face(&mut faces, [a, b, c]);
                pending.clear();
            } else {
                debug!(line = line_no, pending = pending.len(), "skipping incomplete facet");
            }
        }
    }

    debug!(
        lines = line_no,
        vertices = positions.len() / 3,
        "decoded ASCII STL"
    );
    Ok(Mesh::assemble(positions, faces))
}

/// Read one line into `line` without its terminator.
///
/// Returns `false` once the reader is exhausted.
fn read_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<bool> {
    line.clear();
    let mut read_any = false;
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(read_any);
        }
        read_any = true;

        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                let carriage_return = available[end] == b'\r';
                line.extend_from_slice(&available[..end]);
                reader.consume(end + 1);
                if carriage_return && reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(true);
            }
            None => {
                let len = available.len();
                line.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}

/// Parse the three coordinates following the `vertex` keyword.
///
/// Tokens past the third coordinate are ignored.
fn parse_vertex(line: &str, line_no: usize) -> Result<[f32; 3]> {
    let mut tokens = line.split_whitespace().skip(1);
    let mut xyz = [0.0f32; 3];
    for c in &mut xyz {
        let token = tokens.next().ok_or_else(|| StlError::MalformedVertex {
            line: line_no,
            token: String::new(),
        })?;
        *c = parse_coordinate(token).ok_or_else(|| StlError::MalformedVertex {
            line: line_no,
            token: token.to_string(),
        })?;
    }
    Ok(xyz)
}

/// Decimal coordinates only: `nan`, `inf` and `infinity` are rejected.
fn parse_coordinate(token: &str) -> Option<f32> {
    let unsigned = token.trim_start_matches(&['+', '-'][..]);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    all_consuming(float::<&str, nom::error::Error<&str>>)(token)
        .ok()
        .map(|(_, value)| value)
}
