/// Indexed triangle mesh shared by both STL decoders
use nalgebra::Point3;

/// Number of face slots each triangle occupies: three (vertex, tex coord) pairs.
pub const FACE_STRIDE: usize = 6;

/// The single texture coordinate every face slot points at.
const PLACEHOLDER_TEX_COORD: [f32; 2] = [0.0, 0.0];

/// An indexed mesh: flattened vertex positions plus flattened face indices.
///
/// `faces` holds `(vertex_index, tex_coord_index)` pairs, six entries per
/// triangle. The texture coordinate index is always 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    positions: Vec<f32>,
    tex_coords: Vec<f32>,
    faces: Vec<u32>,
}

impl Mesh {
    /// The empty mesh handed out when a load fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap decoder output into a mesh and attach the placeholder tex coord.
    ///
    /// No validation is done here: degenerate triangles and dangling indices
    /// pass through untouched.
    pub fn assemble(positions: Vec<f32>, faces: Vec<u32>) -> Self {
        Self {
            positions,
            tex_coords: PLACEHOLDER_TEX_COORD.to_vec(),
            faces,
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len() / FACE_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.faces.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<Point3<f32>> {
        let start = index.checked_mul(3)?;
        let xyz = self.positions.get(start..start.checked_add(3)?)?;
        Some(Point3::new(xyz[0], xyz[1], xyz[2]))
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
    }

    /// Vertex indices of one triangle, dropping the tex coord slots.
    pub fn triangle(&self, index: usize) -> Option<[u32; 3]> {
        let start = index.checked_mul(FACE_STRIDE)?;
        let slots = self.faces.get(start..start.checked_add(FACE_STRIDE)?)?;
        Some([slots[0], slots[2], slots[4]])
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces
            .chunks_exact(FACE_STRIDE)
            .map(|slots| [slots[0], slots[2], slots[4]])
    }
}

/// Append one triangle's face slots, pairing each vertex with tex coord 0.
pub(crate) fn push_face(faces: &mut Vec<u32>, indices: [u32; 3]) {
    for index in indices {
        faces.push(index);
        faces.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        let mut faces = Vec::new();
        push_face(&mut faces, [0, 1, 2]);
        Mesh::assemble(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], faces)
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.tex_coords().is_empty());
    }

    #[test]
    fn test_assemble_attaches_placeholder_tex_coord() {
        let mesh = unit_triangle();
        assert_eq!(mesh.tex_coords(), &[0.0, 0.0]);
        assert_eq!(mesh.faces(), &[0, 0, 1, 0, 2, 0]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_accessors() {
        let mesh = unit_triangle();
        assert_eq!(mesh.vertex(1), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(mesh.vertex(3), None);
        assert_eq!(mesh.triangle(0), Some([0, 1, 2]));
        assert_eq!(mesh.triangle(1), None);
        assert_eq!(mesh.vertices().count(), 3);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_out_of_range_indices_return_none() {
        let mesh = unit_triangle();
        assert_eq!(mesh.vertex(usize::MAX), None);
        assert_eq!(mesh.vertex(usize::MAX / 3), None);
        assert_eq!(mesh.triangle(usize::MAX), None);
        assert_eq!(mesh.triangle(usize::MAX / FACE_STRIDE), None);
    }

    #[test]
    fn test_assemble_does_not_validate() {
        let mut faces = Vec::new();
        push_face(&mut faces, [7, 7, 9]);
        let mesh = Mesh::assemble(vec![1.0, 2.0, 3.0], faces);
        assert_eq!(mesh.triangle(0), Some([7, 7, 9]));
        assert_eq!(mesh.vertex_count(), 1);
    }
}
