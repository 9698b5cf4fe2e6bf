/// Errors raised while decoding an STL stream
use std::io;

/// Errors during STL loading.
#[derive(Debug, thiserror::Error)]
pub enum StlError {
    #[error("STL header too short: expected 80 bytes, found {found}")]
    MalformedHeader { found: usize },

    #[error("could not read triangle count")]
    TruncatedCount,

    #[error("binary STL ended inside triangle {triangle} of {expected}")]
    TruncatedBody { triangle: u32, expected: u32 },

    #[error("malformed vertex on line {line}: {token:?}")]
    MalformedVertex { line: usize, token: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StlError>;

/// Fill `buf` completely, returning how many bytes were read before EOF.
///
/// `Ok(n)` with `n < buf.len()` means the stream ended early; any other
/// read failure is propagated as-is.
pub(crate) fn read_full<R: io::Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
