//! Galerkin-Difference spaces.
//!
//! A Galerkin-Difference (GD) space keeps a single value per element
//! (per vector component), located at the element centroid.
//! The dense coefficients of a discontinuous [`DgSpace`] are recovered from these
//! by fitting a polynomial through the center values of a small patch
//! of neighboring elements and evaluating it at the element's nodes.
//! The linear map doing this is the [`Prolongation`] operator `P`,
//! which lets forms assembled on the dense space be reduced
//! to the compact unknowns as `Pᵀ A P`.
//!
//! Construction runs in three steps for every element:
//! [`patch::build_patch`] finds the neighbors,
//! [`geometry::PatchGeometry`] gathers their coordinates,
//! and [`reconstruct::least_squares_interpolation`] computes the local weights.
//! These are then scattered into the global operator with a [`ProlongationBuilder`].

pub mod assemble;
pub mod geometry;
pub mod patch;
pub mod reconstruct;

pub use assemble::ProlongationBuilder;

use nalgebra as na;
use rayon::prelude::*;

use crate::error::{GdError, Result};
use crate::field::{CenterField, GridFunction};
use crate::operator::{Operator, Prolongation};
use crate::space::DgSpace;

use geometry::PatchGeometry;

/// Parameters for building a [`GalerkinDifference`] space.
#[derive(Clone, Copy, Debug)]
pub struct GdParams {
    /// Compute the per-element reconstructions on the rayon thread pool.
    /// The result is identical either way.
    /// Default: true
    pub parallel: bool,
}

impl Default for GdParams {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// A Galerkin-Difference space on top of a dense discontinuous space.
#[derive(Clone, Debug)]
pub struct GalerkinDifference {
    space: DgSpace,
    degree: usize,
    prolongation: Prolongation,
}

impl GalerkinDifference {
    /// Build a space reconstructing polynomials of degree `degree`
    /// with default parameters.
    pub fn new(space: DgSpace, degree: usize) -> Result<Self> {
        Self::build(space, degree, &GdParams::default())
    }

    /// Build a space reconstructing polynomials of degree `degree`.
    ///
    /// Fails if any element's patch can't be completed
    /// or its least-squares fit is singular.
    /// In that case no operator is produced at all.
    pub fn build(space: DgSpace, degree: usize, params: &GdParams) -> Result<Self> {
        let element_count = space.mesh().element_count();
        let vdim = space.vdim();
        let required = patch::required_patch_size(degree);
        log::info!(
            "building GD space: {element_count} elements, degree {degree}, \
            patch size {required}, {} dense and {} center values",
            space.vsize(),
            element_count * vdim,
        );

        let local_fits: Vec<Result<(Vec<usize>, na::DMatrix<f64>)>> = if params.parallel {
            (0..element_count)
                .into_par_iter()
                .map(|elem| reconstruct_element(&space, degree, required, elem))
                .collect()
        } else {
            (0..element_count)
                .map(|elem| reconstruct_element(&space, degree, required, elem))
                .collect()
        };

        // scatter in element order so the operator doesn't depend on scheduling
        let mut builder = ProlongationBuilder::new(space.vsize(), element_count * vdim);
        for (elem, fit) in local_fits.into_iter().enumerate() {
            let (patch, local) = fit?;
            builder.insert(&patch, &local, &space.element_vdofs(elem), vdim)?;
        }
        let prolongation = builder.finish();
        log::info!(
            "prolongation operator finalized with {} nonzeros",
            prolongation.matrix().nnz()
        );

        Ok(Self {
            space,
            degree,
            prolongation,
        })
    }

    /// The dense space the operator maps into.
    #[inline]
    pub fn space(&self) -> &DgSpace {
        &self.space
    }

    /// Degree of the reconstructed polynomials.
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The finalized prolongation operator.
    #[inline]
    pub fn prolongation(&self) -> &Prolongation {
        &self.prolongation
    }

    /// Number of compact unknowns (center values).
    #[inline]
    pub fn true_vsize(&self) -> usize {
        self.prolongation.ncols()
    }

    /// A center field of zeros matching this space.
    pub fn new_center_field(&self) -> CenterField {
        CenterField::zeros(&self.space)
    }

    /// Compute the dense field `P c`, checking the center field's length first.
    pub fn prolongate(&self, centers: &CenterField) -> Result<GridFunction> {
        if centers.values.len() != self.true_vsize() {
            return Err(GdError::DimensionMismatch {
                what: "center field length",
                expected: self.true_vsize(),
                actual: centers.values.len(),
            });
        }
        Ok(self.prolongation.apply(centers))
    }
}

/// Patch and local reconstruction matrix of one element.
fn reconstruct_element(
    space: &DgSpace,
    degree: usize,
    required: usize,
    elem: usize,
) -> Result<(Vec<usize>, na::DMatrix<f64>)> {
    let patch = patch::build_patch(space.mesh(), elem, required)?;
    log::debug!("element {elem}: patch {patch:?}");
    let geometry = PatchGeometry::extract(space.mesh(), space.fe(), &patch);
    let local = reconstruct::least_squares_interpolation(
        degree,
        &geometry.centers,
        &geometry.seed_samples(),
    )?;
    log::trace!("element {elem}: local reconstruction {local}");
    Ok((patch, local))
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FiniteElement, SegmentMesh};
    use approx::{abs_diff_eq, relative_eq};

    fn dg_space(element_count: usize, order: usize, vdim: usize) -> DgSpace {
        let mesh = SegmentMesh::uniform(element_count, 1.0).unwrap();
        DgSpace::new(mesh, FiniteElement::new(order), vdim).unwrap()
    }

    #[test]
    fn operator_shape_and_row_structure() {
        let gd = GalerkinDifference::new(dg_space(10, 2, 2), 1).unwrap();
        let p = gd.prolongation();
        assert_eq!(p.nrows(), 10 * 3 * 2);
        assert_eq!(p.ncols(), 10 * 2);
        assert_eq!(gd.true_vsize(), 20);
        assert_eq!(gd.new_center_field().values.len(), 20);
        // each dense value depends on exactly the 3 patch centers of its own component
        for (row_idx, row) in p.matrix().row_iter().enumerate() {
            assert_eq!(row.nnz(), 3);
            assert!(row.col_indices().iter().all(|c| c % 2 == row_idx % 2));
        }
    }

    #[test]
    fn parallel_and_sequential_builds_agree() {
        for degree in 0..=4 {
            let parallel = GalerkinDifference::build(
                dg_space(15, 2, 2),
                degree,
                &GdParams { parallel: true },
            )
            .unwrap();
            let sequential = GalerkinDifference::build(
                dg_space(15, 2, 2),
                degree,
                &GdParams { parallel: false },
            )
            .unwrap();
            assert_eq!(parallel.prolongation(), sequential.prolongation());
        }
    }

    /// Center values sampled from a polynomial of degree at most the reconstruction degree
    /// are prolongated to that polynomial's exact nodal values.
    #[test]
    fn prolongation_reproduces_polynomials() {
        for degree in 0..=4 {
            let gd = GalerkinDifference::new(dg_space(12, 3, 1), degree).unwrap();
            let space = gd.space();
            for k in 0..=degree {
                let mut centers = gd.new_center_field();
                centers.project_scalar(space, |x| x.powi(k as i32)).unwrap();
                let dense = gd.prolongate(&centers).unwrap();
                for elem in 0..space.mesh().element_count() {
                    for (node, dof) in space.element_dofs(elem, 0).into_iter().enumerate() {
                        let x = space.mesh().transform(elem, space.fe().nodes()[node]);
                        assert!(
                            abs_diff_eq!(dense.values[dof], x.powi(k as i32), epsilon = 1e-10),
                            "degree {degree}, x^{k} on element {elem}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn constants_are_reproduced_for_every_component() {
        let gd = GalerkinDifference::new(dg_space(8, 1, 3), 2).unwrap();
        let mut centers = gd.new_center_field();
        centers
            .project(gd.space(), |_| na::DVector::from_vec(vec![1., -2., 0.5]))
            .unwrap();
        let dense = gd.prolongation() * &centers;
        for elem in 0..8 {
            for (v, expected) in [1., -2., 0.5].into_iter().enumerate() {
                for dof in gd.space().element_dofs(elem, v) {
                    assert!(abs_diff_eq!(dense.values[dof], expected, epsilon = 1e-12));
                }
            }
        }

        assert!(gd.prolongate(&CenterField::zeros(&dg_space(3, 1, 1))).is_err());
    }

    #[test]
    fn too_small_meshes_fail_to_build() {
        assert!(matches!(
            GalerkinDifference::new(dg_space(3, 1, 1), 3),
            Err(GdError::PatchUnsatisfiable { required: 5, .. })
        ));
        // the same mesh is fine for a lower degree
        assert!(GalerkinDifference::new(dg_space(3, 1, 1), 2).is_ok());
    }

    /// Projecting e^x to centers and prolongating with a linear reconstruction
    /// converges at second order, with or without a cut last element.
    #[test]
    fn projection_converges_at_second_order() {
        let error_for = |element_count: usize, cut_size: f64| {
            let mut mesh = SegmentMesh::uniform(element_count, 1.0).unwrap();
            let scale = 1. / element_count as f64 / cut_size;
            mesh.set_cut(element_count - 1, scale).unwrap();
            let space = DgSpace::new(mesh, FiniteElement::new(1), 1).unwrap();
            let gd = GalerkinDifference::new(space, 1).unwrap();

            let mut centers = gd.new_center_field();
            centers.project_scalar(gd.space(), f64::exp).unwrap();
            let dense = gd.prolongate(&centers).unwrap();
            dense.l2_error(gd.space(), f64::exp).unwrap()
        };

        for cut_size in [1., 4.] {
            let coarse = error_for(20, cut_size);
            let fine = error_for(40, cut_size);
            let ratio = coarse / fine;
            assert!(coarse < 5e-3, "coarse error {coarse}");
            assert!(ratio > 3. && ratio < 5., "error ratio {ratio}");
        }

        // a full-length cut is the same as no cut at all
        let uncut = SegmentMesh::uniform(20, 1.0).unwrap();
        let space = DgSpace::new(uncut, FiniteElement::new(1), 1).unwrap();
        let gd = GalerkinDifference::new(space, 1).unwrap();
        let mut centers = gd.new_center_field();
        centers.project_scalar(gd.space(), f64::exp).unwrap();
        let uncut_error = gd
            .prolongate(&centers)
            .unwrap()
            .l2_error(gd.space(), f64::exp)
            .unwrap();
        assert!(relative_eq!(uncut_error, error_for(20, 1.), max_relative = 1e-12));
    }
}
