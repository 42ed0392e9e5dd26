//! Dense discontinuous finite element spaces.

use crate::cut_cell::CutCellMapper;
use crate::element::FiniteElement;
use crate::error::{GdError, Result};
use crate::mesh::SegmentMesh;

/// A discontinuous finite element space with `vdim` components per node.
///
/// Degrees of freedom are ordered by vector dimension:
/// the value of component `v` at local node `k` of element `e`
/// lives at index `(e * ndof + k) * vdim + v`.
#[derive(Clone, Debug)]
pub struct DgSpace {
    mesh: SegmentMesh,
    fe: FiniteElement,
    vdim: usize,
}

impl DgSpace {
    /// Create a space with the same reference element on every mesh element.
    pub fn new(mesh: SegmentMesh, fe: FiniteElement, vdim: usize) -> Result<Self> {
        if vdim == 0 {
            return Err(GdError::InvalidParameter(
                "vector dimension must be at least 1".into(),
            ));
        }
        Ok(Self { mesh, fe, vdim })
    }

    /// The underlying mesh.
    #[inline]
    pub fn mesh(&self) -> &SegmentMesh {
        &self.mesh
    }

    /// The reference element used on every mesh element.
    #[inline]
    pub fn fe(&self) -> &FiniteElement {
        &self.fe
    }

    /// Number of components per node.
    #[inline]
    pub fn vdim(&self) -> usize {
        self.vdim
    }

    /// Number of scalar nodes (degrees of freedom per component).
    #[inline]
    pub fn ndofs(&self) -> usize {
        self.mesh.element_count() * self.fe.dof_count()
    }

    /// Total length of a vector of values in this space.
    #[inline]
    pub fn vsize(&self) -> usize {
        self.ndofs() * self.vdim
    }

    /// Indices of component `component` of all nodes of an element.
    pub fn element_dofs(&self, element: usize, component: usize) -> Vec<usize> {
        let ndof = self.fe.dof_count();
        (0..ndof)
            .map(|k| (element * ndof + k) * self.vdim + component)
            .collect()
    }

    /// Indices of all values of an element, grouped by component
    /// (`vdim` consecutive groups of `ndof` indices).
    pub fn element_vdofs(&self, element: usize) -> Vec<usize> {
        (0..self.vdim)
            .flat_map(|v| self.element_dofs(element, v))
            .collect()
    }

    /// Cut-cell mapper for quadrature on this space's mesh.
    #[inline]
    pub fn mapper(&self) -> CutCellMapper<'_> {
        CutCellMapper::new(&self.mesh)
    }
}

//
// tests
//
