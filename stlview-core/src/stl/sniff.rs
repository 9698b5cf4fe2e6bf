/// ASCII vs binary detection from the 84-byte preamble
use std::fmt;
use std::io::Read;

use nom::number::complete::le_u32;
use nom::IResult;
use tracing::debug;

use crate::error::{read_full, Result, StlError};

pub const HEADER_LEN: usize = 80;
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
pub const RECORD_LEN: usize = 50;

/// STL encoding of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

impl fmt::Display for StlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StlFormat::Ascii => f.write_str("ascii"),
            StlFormat::Binary => f.write_str("binary"),
        }
    }
}

/// Outcome of sniffing the preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub format: StlFormat,
    /// Triangle count as declared by bytes 80..84, meaningful for binary only.
    pub triangle_count: u32,
}

/// Size a binary STL with `triangle_count` records must have.
pub fn expected_binary_len(triangle_count: u32) -> u64 {
    PREAMBLE_LEN as u64 + RECORD_LEN as u64 * u64::from(triangle_count)
}

/// Classify a stream by its header and declared triangle count.
///
/// Consumes the first 84 bytes of `reader`. `total_len` is the length of the
/// whole source. The result is binary only when the length matches the
/// declared count exactly and the header does not open with `solid`.
pub fn sniff<R: Read>(reader: &mut R, total_len: u64) -> Result<Sniffed> {
    let mut header = [0u8; HEADER_LEN];
    let found = read_full(reader, &mut header)?;
    if found < HEADER_LEN {
        return Err(StlError::MalformedHeader { found });
    }

    let mut count = [0u8; 4];
    if read_full(reader, &mut count)? < count.len() {
        return Err(StlError::TruncatedCount);
    }
    let (_, triangle_count) = parse_count(&count).map_err(|_| StlError::TruncatedCount)?;

    let expected = expected_binary_len(triangle_count);
    let solid = header_starts_with_solid(&header);
    let format = if total_len == expected && !solid {
        StlFormat::Binary
    } else {
        StlFormat::Ascii
    };
    debug!(total_len, expected, triangle_count, solid, %format, "sniffed STL preamble");

    Ok(Sniffed {
        format,
        triangle_count,
    })
}

fn parse_count(input: &[u8]) -> IResult<&[u8], u32> {
    le_u32(input)
}

/// Strip control and space characters (code points up to U+0020, NUL
/// included) from both ends.
pub(crate) fn trim_control(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

/// Lossy text view of the header, trimmed and lower-cased.
fn header_starts_with_solid(header: &[u8]) -> bool {
    trim_control(&String::from_utf8_lossy(header))
        .to_lowercase()
        .starts_with("solid")
}
