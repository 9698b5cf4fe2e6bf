/// STLView Core Library - STL decoding into indexed meshes
///
/// This library provides the stateless core: format sniffing, binary and
/// ASCII STL decoding, and the indexed mesh both decoders produce.

pub mod error;
pub mod geometry;
pub mod stl;

// Re-export commonly used types
pub use error::{Result, StlError};
pub use geometry::Mesh;
pub use stl::{display_name, load_mesh, parse_stl, read_mesh, StlFile, StlFormat};
