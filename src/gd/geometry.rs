//! Physical coordinates of patch centroids and sample points.

use nalgebra as na;

use crate::element::FiniteElement;
use crate::mesh::SegmentMesh;

/// Coordinates a patch reconstruction is fit through and evaluated at.
///
/// Both matrices have one row per spatial dimension.
#[derive(Clone, Debug)]
pub struct PatchGeometry {
    /// Centroid of each patch element, one column per element.
    pub centers: na::DMatrix<f64>,
    /// Reference nodes of every patch element mapped to physical space,
    /// concatenated in patch order (`ndof` columns per element).
    pub samples: na::DMatrix<f64>,
    ndof: usize,
}

impl PatchGeometry {
    /// Gather the coordinates of a patch.
    ///
    /// Sample points use the element's geometric transform only;
    /// cut cells are not remapped here
    /// since the reconstruction is a property of the uncut space.
    pub fn extract(mesh: &SegmentMesh, fe: &FiniteElement, patch: &[usize]) -> Self {
        let dim = mesh.dimension();
        let ndof = fe.dof_count();

        let centers = na::DMatrix::from_iterator(
            dim,
            patch.len(),
            patch.iter().map(|&elem| mesh.centroid(elem)),
        );
        let samples = na::DMatrix::from_iterator(
            dim,
            patch.len() * ndof,
            patch
                .iter()
                .flat_map(|&elem| fe.nodes().iter().map(move |&x| mesh.transform(elem, x))),
        );

        Self {
            centers,
            samples,
            ndof,
        }
    }

    /// Number of patch elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.centers.ncols()
    }

    /// Whether the patch has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centers.ncols() == 0
    }

    /// Sample points of the seed element (the first `ndof` columns).
    pub fn seed_samples(&self) -> na::DMatrix<f64> {
        self.samples.columns(0, self.ndof.min(self.samples.ncols())).into_owned()
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
    fn coordinates_follow_patch_order() {
        let mesh = SegmentMesh::uniform(4, 4.0).unwrap();
        let fe = FiniteElement::new(1);
        let geom = PatchGeometry::extract(&mesh, &fe, &[2, 1, 3]);

        assert_eq!(geom.len(), 3);
        assert_eq!(geom.centers.shape(), (1, 3));
        assert_eq!(geom.samples.shape(), (1, 6));
        let expected_centers = [2.5, 1.5, 3.5];
        for (c, e) in geom.centers.iter().zip(expected_centers) {
            assert!(abs_diff_eq!(*c, e, epsilon = 1e-14));
        }

        // seed samples lie inside the seed element, symmetric about its centroid
        let seed = geom.seed_samples();
        assert_eq!(seed.ncols(), 2);
        assert!(seed.iter().all(|&x| x > 2. && x < 3.));
        assert!(abs_diff_eq!(seed[0] + seed[1], 5., epsilon = 1e-14));
        // and the samples of the second element follow
        assert!(geom.samples[2] > 1. && geom.samples[2] < 2.);
    }

    #[test]
    fn cut_cells_do_not_move_samples() {
        let mut mesh = SegmentMesh::uniform(4, 1.0).unwrap();
        let fe = FiniteElement::new(2);
        let before = PatchGeometry::extract(&mesh, &fe, &[3, 2, 1]);
        mesh.set_cut(3, 0.05).unwrap();
        let after = PatchGeometry::extract(&mesh, &fe, &[3, 2, 1]);
        assert_eq!(before.samples, after.samples);
        assert_eq!(before.centers, after.centers);
    }
}
