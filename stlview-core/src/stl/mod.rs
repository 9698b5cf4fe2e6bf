/// STL file loading for binary and ASCII formats
///
/// The preamble is sniffed first, then the stream is rewound and handed to
/// the matching decoder. Both decoders produce the same indexed [`Mesh`].
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::geometry::Mesh;

mod ascii;
mod binary;
mod sniff;

pub use ascii::decode_ascii;
pub use binary::decode_binary;
pub use sniff::{expected_binary_len, sniff, Sniffed, StlFormat, HEADER_LEN, RECORD_LEN};

/// Detect the format of a seekable source and decode it.
///
/// The source may be positioned anywhere; it is measured and rewound to
/// byte 0 before sniffing and again before decoding.
pub fn read_mesh<R: Read + Seek>(reader: &mut R) -> Result<(StlFormat, Mesh)> {
    let total_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    let sniffed = sniff(reader, total_len)?;

    reader.seek(SeekFrom::Start(0))?;
    let mesh = match sniffed.format {
        StlFormat::Binary => decode_binary(&mut *reader, sniffed.triangle_count)?,
        StlFormat::Ascii => decode_ascii(BufReader::new(&mut *reader))?,
    };
    Ok((sniffed.format, mesh))
}

/// Detect and parse an in-memory STL file.
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    read_mesh(&mut Cursor::new(data)).map(|(_, mesh)| mesh)
}

/// A successfully loaded STL file.
#[derive(Debug, Clone)]
pub struct StlFile {
    pub name: String,
    pub format: StlFormat,
    pub mesh: Mesh,
}

impl StlFile {
    /// Open and decode the file at `path`. The handle is closed before return.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let (format, mesh) = read_mesh(&mut reader)?;

        let name = display_name(path);
        info!(
            file = %path.display(),
            %format,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "loaded STL"
        );
        Ok(Self { name, format, mesh })
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

impl fmt::Display for StlFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loaded: {} | Vertices: {} | Faces: {}",
            self.name,
            self.vertex_count(),
            self.triangle_count()
        )
    }
}

/// Name shown for a loaded file: its final path component, or the whole
/// path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load an STL file, never failing.
///
/// Any I/O or decode error is logged and an empty mesh is returned; use
/// [`StlFile::open`] to see the error instead.
pub fn load_mesh(path: impl AsRef<Path>) -> Mesh {
    let path = path.as_ref();
    match StlFile::open(path) {
        Ok(file) => file.mesh,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to load STL, using empty mesh");
            Mesh::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StlError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ASCII_TRIANGLE: &str = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid s\n";

    fn binary_triangle() -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&1u32.to_le_bytes());
        let floats: [f32; 12] = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        for f in floats {
            data.extend_from_slice(&f.to_le_bytes());
        }
        data.extend_from_slice(&7u16.to_le_bytes());
        data
    }

    fn write_temp(data: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_binary_dispatch() {
        let (format, mesh) = read_mesh(&mut Cursor::new(binary_triangle())).unwrap();
        assert_eq!(format, StlFormat::Binary);
        assert_eq!(mesh.positions(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.triangle(0), Some([0, 1, 2]));
    }

    #[test]
    fn test_ascii_dispatch() {
        let (format, mesh) = read_mesh(&mut Cursor::new(ASCII_TRIANGLE.as_bytes())).unwrap();
        assert_eq!(format, StlFormat::Ascii);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle(0), Some([0, 1, 2]));
    }

    #[test]
    fn test_read_mesh_rewinds_a_positioned_source() {
        let mut cursor = Cursor::new(binary_triangle());
        cursor.set_position(40);
        let (format, mesh) = read_mesh(&mut cursor).unwrap();
        assert_eq!(format, StlFormat::Binary);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_binary_with_solid_header_falls_back_to_ascii() {
        let mut data = binary_triangle();
        data[..5].copy_from_slice(b"solid");
        let (format, mesh) = read_mesh(&mut Cursor::new(data)).unwrap();
        assert_eq!(format, StlFormat::Ascii);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_short_ascii_file_is_rejected_by_header_check() {
        assert!(matches!(
            parse_stl(b"solid tiny\nendsolid tiny\n"),
            Err(StlError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_open_binary_file() {
        let file = write_temp(&binary_triangle());
        let stl = StlFile::open(file.path()).unwrap();
        assert_eq!(stl.format, StlFormat::Binary);
        assert_eq!(stl.vertex_count(), 3);
        assert_eq!(stl.triangle_count(), 1);
        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(stl.to_string(), format!("Loaded: {name} | Vertices: 3 | Faces: 1"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/models/part.stl")), "part.stl");
        assert_eq!(display_name(Path::new("part.stl")), "part.stl");
        assert_eq!(display_name(Path::new("/")), "/");
    }

    #[test]
    fn test_load_ascii_file() {
        let file = write_temp(ASCII_TRIANGLE.as_bytes());
        let mesh = load_mesh(file.path());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_truncated_file_yields_empty_mesh() {
        let file = write_temp(&[0u8; 50]);
        assert!(matches!(
            StlFile::open(file.path()),
            Err(StlError::MalformedHeader { found: 50 })
        ));
        assert!(load_mesh(file.path()).is_empty());
    }

    #[test]
    fn test_malformed_vertex_yields_empty_mesh() {
        let mut text = ASCII_TRIANGLE.to_string();
        text.push_str("vertex 1 2 three\n");
        let file = write_temp(text.as_bytes());
        let mesh = load_mesh(file.path());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_missing_file_yields_empty_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.stl");
        assert!(matches!(StlFile::open(&path), Err(StlError::Io(_))));
        assert!(load_mesh(&path).is_empty());
    }
}
