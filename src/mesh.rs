//! One-dimensional segment meshes with element adjacency and cut-cell attributes.
//!
//! A [`SegmentMesh`] is a collection of line segments on the real axis.
//! Connectivity is derived from the element-to-vertex incidence matrix:
//! two elements are adjacent if they share a vertex,
//! and every vertex touched by at least one element is a [`Face`].
//!
//! Any element can additionally be marked as a _cut cell_,
//! meaning it only represents the first `scale` units of its physical length.
//! See [`cut_cell`][crate::cut_cell] for how integrators consume this.

use nalgebra_sparse as nas;

use crate::element::Geometry;
use crate::error::{GdError, Result};

/// Read access to element-to-element connectivity.
///
/// This is all the patch search in [`gd::patch`][crate::gd::patch] needs from a mesh,
/// so it is expressed as a trait to allow searching other graphs too.
pub trait ElementAdjacency {
    /// Number of elements in the mesh.
    fn element_count(&self) -> usize;
    /// Ids of the elements sharing a face with `element`, in ascending order.
    fn adjacent_elements(&self, element: usize) -> &[usize];
}

/// A mesh of line segments.
#[derive(Clone, Debug)]
pub struct SegmentMesh {
    vertices: Vec<f64>,
    /// two vertex indices per element stored in a flat Vec,
    /// ordered so that the first vertex has the smaller coordinate
    indices: Vec<usize>,
    /// element-to-vertex incidence, one row per element
    incidence: nas::CsrMatrix<f64>,
    /// adjacency rows in CSR-style storage
    adjacency_offsets: Vec<usize>,
    adjacency: Vec<usize>,
    faces: Vec<Face>,
    /// physical length represented by each element if it's a cut cell
    cut_scales: Vec<Option<f64>>,
}

/// A point where one or two segments meet.
///
/// The normal of a face is taken to point in the positive x direction,
/// i.e. from the `minus` element to the `plus` element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    /// Index of the vertex the face is located at.
    pub vertex: usize,
    /// Physical coordinate of the face.
    pub position: f64,
    /// Element to the left of the face, which sees it at reference coordinate 1.
    pub minus: Option<usize>,
    /// Element to the right of the face, which sees it at reference coordinate 0.
    pub plus: Option<usize>,
}

impl Face {
    /// Whether the face lies on the boundary of the mesh.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.minus.is_none() || self.plus.is_none()
    }
}

impl SegmentMesh {
    /// Construct a mesh from raw vertex coordinates and indices.
    ///
    /// The indices are given as a flat array,
    /// where every 2 indices correspond to one segment.
    /// Segments may be given in either orientation.
    pub fn new(vertices: Vec<f64>, mut indices: Vec<usize>) -> Result<Self> {
        if indices.is_empty() || indices.len() % 2 != 0 {
            return Err(GdError::InvalidParameter(format!(
                "segment index count must be a positive even number, got {}",
                indices.len()
            )));
        }
        if let Some((vert_idx, x)) = vertices.iter().enumerate().find(|(_, x)| !x.is_finite()) {
            return Err(GdError::InvalidParameter(format!(
                "vertex {vert_idx} has non-finite coordinate {x}"
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= vertices.len()) {
            return Err(GdError::InvalidParameter(format!(
                "vertex index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        // orient every segment left to right
        // so that reference coordinate 0 is always the smaller end
        for (elem_idx, seg) in indices.chunks_exact_mut(2).enumerate() {
            if vertices[seg[0]] == vertices[seg[1]] {
                return Err(GdError::InvalidParameter(format!(
                    "segment {elem_idx} has zero length"
                )));
            }
            if vertices[seg[0]] > vertices[seg[1]] {
                seg.swap(0, 1);
            }
        }

        let element_count = indices.len() / 2;

        let mut incidence_coo = nas::CooMatrix::new(element_count, vertices.len());
        for (elem_idx, seg) in indices.chunks_exact(2).enumerate() {
            incidence_coo.push(elem_idx, seg[0], 1.);
            incidence_coo.push(elem_idx, seg[1], 1.);
        }
        let incidence = nas::CsrMatrix::from(&incidence_coo);
        let vertex_to_element = incidence.transpose();

        // elements sharing a vertex show up as nonzeros of B Bᵀ.
        // column indices of a CSR product come out sorted,
        // which gives us the ascending adjacency rows for free
        let shared_vertices = &incidence * &vertex_to_element;
        let mut adjacency_offsets = Vec::with_capacity(element_count + 1);
        let mut adjacency = Vec::new();
        adjacency_offsets.push(0);
        for (elem_idx, row) in shared_vertices.row_iter().enumerate() {
            adjacency.extend(row.col_indices().iter().filter(|&&c| c != elem_idx));
            adjacency_offsets.push(adjacency.len());
        }

        let mut faces = Vec::new();
        for (vert_idx, row) in vertex_to_element.row_iter().enumerate() {
            if row.nnz() == 0 {
                continue;
            }
            if row.nnz() > 2 {
                return Err(GdError::InvalidParameter(format!(
                    "vertex {vert_idx} is shared by {} segments",
                    row.nnz()
                )));
            }
            let mut face = Face {
                vertex: vert_idx,
                position: vertices[vert_idx],
                minus: None,
                plus: None,
            };
            for &elem_idx in row.col_indices() {
                if indices[2 * elem_idx + 1] == vert_idx {
                    face.minus = Some(elem_idx);
                } else {
                    face.plus = Some(elem_idx);
                }
            }
            if row.nnz() == 2 && face.is_boundary() {
                // both segments end (or both start) at this vertex,
                // so they overlap
                return Err(GdError::InvalidParameter(format!(
                    "segments meeting at vertex {vert_idx} overlap"
                )));
            }
            faces.push(face);
        }

        Ok(Self {
            vertices,
            indices,
            incidence,
            adjacency_offsets,
            adjacency,
            faces,
            cut_scales: vec![None; element_count],
        })
    }

    /// Construct a chain of `element_count` equally sized segments covering `[0, length]`.
    ///
    /// ```
    /// # use gdspace::SegmentMesh;
    /// let mesh = SegmentMesh::uniform(4, 1.0).unwrap();
    /// assert_eq!(mesh.element_count(), 4);
    /// assert_eq!(mesh.adjacent_elements(1), &[0, 2]);
    /// ```
    pub fn uniform(element_count: usize, length: f64) -> Result<Self> {
        if element_count == 0 || length.is_nan() || length <= 0. {
            return Err(GdError::InvalidParameter(format!(
                "uniform mesh needs at least one element and a positive length, got {element_count} and {length}"
            )));
        }
        let h = length / element_count as f64;
        let vertices = (0..=element_count).map(|i| i as f64 * h).collect();
        let indices = (0..element_count).flat_map(|i| [i, i + 1]).collect();
        Self::new(vertices, indices)
    }

    /// Spatial dimension of the mesh (always 1).
    #[inline]
    pub fn dimension(&self) -> usize {
        1
    }

    /// Number of segments in the mesh.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex coordinates.
    #[inline]
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    /// Geometry type of an element.
    #[inline]
    pub fn geometry(&self, _element: usize) -> Geometry {
        Geometry::Segment
    }

    /// Coordinates of the left and right end of an element.
    #[inline]
    pub fn element_vertices(&self, element: usize) -> [f64; 2] {
        [
            self.vertices[self.indices[2 * element]],
            self.vertices[self.indices[2 * element + 1]],
        ]
    }

    /// Element-to-vertex incidence matrix (one row per element).
    #[inline]
    pub fn incidence(&self) -> &nas::CsrMatrix<f64> {
        &self.incidence
    }

    /// Jacobian weight of the reference-to-physical map, i.e. the element's length.
    #[inline]
    pub fn jacobian(&self, element: usize) -> f64 {
        let [start, end] = self.element_vertices(element);
        end - start
    }

    /// Map a reference coordinate in `[0, 1]` to physical space.
    #[inline]
    pub fn transform(&self, element: usize, reference: f64) -> f64 {
        let [start, end] = self.element_vertices(element);
        start + (end - start) * reference
    }

    /// Physical coordinate of the element's geometric center.
    #[inline]
    pub fn centroid(&self, element: usize) -> f64 {
        self.transform(element, self.geometry(element).center())
    }

    /// All faces of the mesh, ordered by vertex index.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Mark an element as a cut cell representing a physical length `scale`.
    ///
    /// The scale must be in `(0, J]` where `J` is the element's length.
    pub fn set_cut(&mut self, element: usize, scale: f64) -> Result<()> {
        if element >= self.element_count() {
            return Err(GdError::InvalidParameter(format!(
                "cannot cut element {element}, mesh only has {} elements",
                self.element_count()
            )));
        }
        let length = self.jacobian(element);
        // allow rounding noise when the scale is computed as a fraction of the mesh size
        if !(scale > 0. && scale <= length * (1. + 1e-12)) {
            return Err(GdError::InvalidCutScale {
                element,
                scale,
                length,
            });
        }
        self.cut_scales[element] = Some(scale);
        Ok(())
    }

    /// Remove the cut-cell attribute from an element.
    pub fn clear_cut(&mut self, element: usize) {
        if let Some(s) = self.cut_scales.get_mut(element) {
            *s = None;
        }
    }

    /// Physical length represented by the element if it's a cut cell.
    #[inline]
    pub fn cut_scale(&self, element: usize) -> Option<f64> {
        self.cut_scales.get(element).copied().flatten()
    }

    /// Iterate over `(element, scale)` for every cut cell.
    pub fn cut_elements(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.cut_scales
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
    }

    /// Physical length an element represents, taking cut cells into account.
    #[inline]
    pub fn measure(&self, element: usize) -> f64 {
        self.cut_scale(element)
            .unwrap_or_else(|| self.jacobian(element))
    }
}

impl ElementAdjacency for SegmentMesh {
    #[inline]
    fn element_count(&self) -> usize {
        SegmentMesh::element_count(self)
    }

    #[inline]
    fn adjacent_elements(&self, element: usize) -> &[usize] {
        &self.adjacency[self.adjacency_offsets[element]..self.adjacency_offsets[element + 1]]
    }
}

impl SegmentMesh {
    /// Ids of the elements sharing a face with `element`, in ascending order.
    ///
    /// Inherent shortcut for [`ElementAdjacency::adjacent_elements`].
    #[inline]
    pub fn adjacent_elements(&self, element: usize) -> &[usize] {
        ElementAdjacency::adjacent_elements(self, element)
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use approx::abs_diff_eq;

    #[test]
    fn uniform_chain_is_connected_in_order() {
        let mesh = SegmentMesh::uniform(5, 1.0).unwrap();
        assert_eq!(mesh.element_count(), 5);
        assert_eq!(mesh.vertex_count(), 6);

        assert_eq!(mesh.adjacent_elements(0), &[1]);
        assert_eq!(mesh.adjacent_elements(2), &[1, 3]);
        assert_eq!(mesh.adjacent_elements(4), &[3]);

        for elem in 0..5 {
            assert!(abs_diff_eq!(mesh.jacobian(elem), 0.2, epsilon = 1e-12));
            assert!(abs_diff_eq!(mesh.centroid(elem), 0.2 * elem as f64 + 0.1, epsilon = 1e-12));
        }
    }

    #[test]
    fn faces_have_correct_sides() {
        let mesh = SegmentMesh::uniform(3, 3.0).unwrap();
        let faces = mesh.faces();
        assert_eq!(faces.len(), 4);

        assert_eq!((faces[0].minus, faces[0].plus), (None, Some(0)));
        assert_eq!((faces[1].minus, faces[1].plus), (Some(0), Some(1)));
        assert_eq!((faces[2].minus, faces[2].plus), (Some(1), Some(2)));
        assert_eq!((faces[3].minus, faces[3].plus), (Some(2), None));
        assert!(faces[0].is_boundary() && faces[3].is_boundary());
        assert!(!faces[1].is_boundary());
        assert_eq!(faces[2].position, 2.0);
    }

    #[test]
    fn reversed_segments_are_reoriented() {
        // vertices out of order and one segment given right to left
        let vertices = vec![1.0, 0.0, 2.0];
        let indices = vec![0, 1, 0, 2];
        let mesh = SegmentMesh::new(vertices, indices).unwrap();

        assert_eq!(mesh.element_vertices(0), [0.0, 1.0]);
        assert_eq!(mesh.element_vertices(1), [1.0, 2.0]);
        assert!(abs_diff_eq!(mesh.transform(0, 0.25), 0.25, epsilon = 1e-12));
        assert_eq!(mesh.adjacent_elements(0), &[1]);

        let shared = mesh.faces().iter().find(|f| f.vertex == 0).unwrap();
        assert_eq!((shared.minus, shared.plus), (Some(0), Some(1)));
    }

    #[test]
    fn disconnected_components_have_no_adjacency_between_them() {
        let vertices = vec![0.0, 1.0, 2.0, 5.0, 6.0];
        let indices = vec![0, 1, 1, 2, 3, 4];
        let mesh = SegmentMesh::new(vertices, indices).unwrap();
        assert_eq!(mesh.adjacent_elements(1), &[0]);
        assert!(mesh.adjacent_elements(2).is_empty());
        assert_eq!(mesh.faces().len(), 5);
    }

    #[test]
    fn invalid_meshes_are_rejected() {
        assert!(SegmentMesh::new(vec![0., 1.], vec![0]).is_err());
        assert!(SegmentMesh::new(vec![0., 1.], vec![0, 2]).is_err());
        assert!(SegmentMesh::new(vec![0., 0.], vec![0, 1]).is_err());
        // three segments meeting at one vertex
        assert!(SegmentMesh::new(vec![0., 1., 2., 3.], vec![0, 1, 1, 2, 1, 3]).is_err());
        assert!(SegmentMesh::uniform(0, 1.0).is_err());
        // non-finite coordinates
        assert!(matches!(
            SegmentMesh::new(vec![0., 1., f64::NAN, 3., 4.], vec![0, 1, 1, 2, 2, 3, 3, 4]),
            Err(GdError::InvalidParameter(_))
        ));
        assert!(SegmentMesh::new(vec![0., f64::INFINITY], vec![0, 1]).is_err());
        assert!(SegmentMesh::uniform(2, f64::INFINITY).is_err());
    }

    #[test]
    fn cut_cells_are_validated() {
        let mut mesh = SegmentMesh::uniform(4, 1.0).unwrap();
        assert!(mesh.cut_elements().next().is_none());

        mesh.set_cut(3, 0.1).unwrap();
        assert_eq!(mesh.cut_scale(3), Some(0.1));
        assert_eq!(mesh.cut_scale(2), None);
        assert_eq!(mesh.cut_elements().collect::<Vec<_>>(), vec![(3, 0.1)]);
        assert!(abs_diff_eq!(mesh.measure(3), 0.1, epsilon = 1e-12));
        assert!(abs_diff_eq!(mesh.measure(2), 0.25, epsilon = 1e-12));

        assert!(matches!(
            mesh.set_cut(1, 0.5),
            Err(GdError::InvalidCutScale { element: 1, .. })
        ));
        assert!(mesh.set_cut(1, 0.0).is_err());
        assert!(mesh.set_cut(7, 0.1).is_err());
        // a cut equal to the full length is allowed
        mesh.set_cut(0, 0.25).unwrap();

        mesh.clear_cut(3);
        assert_eq!(mesh.cut_scale(3), None);
    }
}
