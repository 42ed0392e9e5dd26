//! Remapping of quadrature points on cut cells.
//!
//! A cut cell is an element that only represents the first `s` units
//! of its physical length `J` (see [`SegmentMesh::set_cut`][crate::SegmentMesh::set_cut]).
//! Instead of building a separate reference element for it,
//! reference coordinates are compressed into `[0, s/J]`:
//!
//! - cut: `x' = s·x / J`, physical weight `w·s`
//! - regular: `x' = x`, physical weight `w·J`
//!
//! The element's geometric map is unchanged,
//! so derivatives are always scaled by `1/J`.
//!
//! Every integrator touching an element must go through [`CutCellMapper`]
//! so that stiffness, load, face flux and error computations
//! agree on what the cut element represents.

use crate::mesh::SegmentMesh;
use crate::quadrature::{IntegrationPoint, IntegrationRule};

/// A quadrature point after cut-cell remapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappedPoint {
    /// Reference coordinate to evaluate shape functions at.
    pub reference: f64,
    /// Quadrature weight including the physical measure.
    pub weight: f64,
    /// Factor converting reference derivatives to physical ones.
    pub inv_jacobian: f64,
}

/// Remap a single reference point given the element's Jacobian weight
/// and its cut scale, if any.
///
/// ```
/// # use gdspace::{cut_cell::remap_point, quadrature::IntegrationPoint};
/// let ip = IntegrationPoint { x: 0.5, weight: 1.0 };
/// let cut = remap_point(ip, 0.1, Some(0.025));
/// assert!((cut.reference - 0.125).abs() < 1e-15);
/// assert!((cut.weight - 0.025).abs() < 1e-15);
///
/// let regular = remap_point(ip, 0.1, None);
/// assert_eq!(regular.reference, 0.5);
/// assert_eq!(regular.weight, 0.1);
/// ```
#[inline]
pub fn remap_point(point: IntegrationPoint, jacobian: f64, cut: Option<f64>) -> MappedPoint {
    match cut {
        Some(scale) => MappedPoint {
            reference: scale * point.x / jacobian,
            weight: point.weight * scale,
            inv_jacobian: 1. / jacobian,
        },
        None => MappedPoint {
            reference: point.x,
            weight: point.weight * jacobian,
            inv_jacobian: 1. / jacobian,
        },
    }
}

/// Applies [`remap_point`] with the cut-cell state stored on a mesh.
#[derive(Clone, Copy, Debug)]
pub struct CutCellMapper<'a> {
    mesh: &'a SegmentMesh,
}

impl<'a> CutCellMapper<'a> {
    /// Create a mapper reading cut-cell attributes from the mesh.
    #[inline]
    pub fn new(mesh: &'a SegmentMesh) -> Self {
        Self { mesh }
    }

    /// Whether the element is a cut cell.
    #[inline]
    pub fn is_cut(&self, element: usize) -> bool {
        self.mesh.cut_scale(element).is_some()
    }

    /// Remap one quadrature point of an element.
    #[inline]
    pub fn map_point(&self, element: usize, point: IntegrationPoint) -> MappedPoint {
        remap_point(
            point,
            self.mesh.jacobian(element),
            self.mesh.cut_scale(element),
        )
    }

    /// Remap every point of a rule for an element.
    pub fn map_rule(&self, element: usize, rule: &IntegrationRule) -> Vec<MappedPoint> {
        let jacobian = self.mesh.jacobian(element);
        let cut = self.mesh.cut_scale(element);
        rule.iter()
            .map(|&p| remap_point(p, jacobian, cut))
            .collect()
    }

    /// Remap a reference coordinate on the element's boundary,
    /// e.g. where a face sits as seen from the element.
    ///
    /// Face quadrature has no weight to scale, only the location moves.
    #[inline]
    pub fn map_face_coordinate(&self, element: usize, x: f64) -> f64 {
        self.map_point(element, IntegrationPoint { x, weight: 1. })
            .reference
    }

    /// Physical coordinate of a remapped point.
    #[inline]
    pub fn physical(&self, element: usize, point: &MappedPoint) -> f64 {
        self.mesh.transform(element, point.reference)
    }
}

//
// tests
//
