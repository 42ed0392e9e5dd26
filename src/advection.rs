//! Steady linear advection `a u' = f` solved in a Galerkin-Difference space.
//!
//! The domain is `[0, length]` split into `elements` equal segments,
//! with the last segment cut to `h / cut_size`,
//! so the problem is actually posed on `[0, length - h + h / cut_size]`.
//! The dense form uses upwind DG in strong form
//! with the inflow value taken from the exact solution,
//! and is reduced to center unknowns as `Pᵀ A P y = Pᵀ b`.

use nalgebra as na;
use nalgebra_sparse as nas;

use crate::assembly::{
    AdvectionIntegrator, BilinearForm, BoundaryInflowIntegrator, DomainLoadIntegrator,
    LinearForm, UpwindFaceIntegrator,
};
use crate::element::FiniteElement;
use crate::error::{GdError, Result};
use crate::field::{CenterField, GridFunction};
use crate::gd::{GalerkinDifference, GdParams};
use crate::linsolve;
use crate::mesh::SegmentMesh;
use crate::space::DgSpace;

/// Parameters of the advection problem.
#[derive(Clone, Copy, Debug)]
pub struct AdvectionParams {
    /// Polynomial order of the dense DG element.
    /// Default: 1
    pub order: usize,
    /// Degree of the GD reconstruction.
    /// Default: 1
    pub degree: usize,
    /// Number of mesh elements.
    /// Default: 20
    pub elements: usize,
    /// Length of the uncut mesh.
    /// Default: 1.0
    pub length: f64,
    /// The last element represents `1 / cut_size` of its length.
    /// Default: 1.0 (no actual cut)
    pub cut_size: f64,
    /// Advection velocity. Its sign decides which end of the domain is the inflow.
    /// Default: -1.0
    pub velocity: f64,
    /// Build the GD operator in parallel.
    /// Default: true
    pub parallel: bool,
}

impl Default for AdvectionParams {
    fn default() -> Self {
        Self {
            order: 1,
            degree: 1,
            elements: 20,
            length: 1.0,
            cut_size: 1.0,
            velocity: -1.0,
            parallel: true,
        }
    }
}

impl AdvectionParams {
    /// Check that the parameters describe a solvable problem.
    pub fn validate(&self) -> Result<()> {
        if self.elements == 0 {
            return Err(GdError::InvalidParameter(
                "number of elements must be positive".into(),
            ));
        }
        if !(self.length > 0. && self.length.is_finite()) {
            return Err(GdError::InvalidParameter(format!(
                "domain length must be positive, got {}",
                self.length
            )));
        }
        if !(self.cut_size >= 1. && self.cut_size.is_finite()) {
            return Err(GdError::InvalidParameter(format!(
                "cut size must be at least 1, got {}",
                self.cut_size
            )));
        }
        if self.velocity == 0. || !self.velocity.is_finite() {
            return Err(GdError::InvalidParameter(format!(
                "velocity must be nonzero, got {}",
                self.velocity
            )));
        }
        Ok(())
    }

    /// Physical length represented by the cut element.
    #[inline]
    pub fn cut_scale(&self) -> f64 {
        self.length / self.elements as f64 / self.cut_size
    }
}

/// Everything produced by [`solve_advection`].
#[derive(Clone, Debug)]
pub struct AdvectionSolution {
    /// The GD space the problem was solved in.
    pub gd: GalerkinDifference,
    /// The solved center values.
    pub centers: CenterField,
    /// The solution prolongated to the dense space.
    pub dense: GridFunction,
    /// The reduced system matrix `Pᵀ A P`.
    pub stiffness: nas::CsrMatrix<f64>,
    /// The reduced right-hand side `Pᵀ b`.
    pub rhs: na::DVector<f64>,
    /// Weighted L2 error of `dense` against the exact solution.
    pub l2_error: f64,
}

/// Solve `a u' = source` with inflow values and error measured against `exact`.
pub fn solve_advection(
    params: &AdvectionParams,
    exact: impl Fn(f64) -> f64,
    source: impl Fn(f64) -> f64,
) -> Result<AdvectionSolution> {
    params.validate()?;

    let mut mesh = SegmentMesh::uniform(params.elements, params.length)?;
    let cut_element = params.elements - 1;
    mesh.set_cut(cut_element, params.cut_scale())?;
    log::info!(
        "element {cut_element} cut to length {:e}",
        params.cut_scale()
    );

    let space = DgSpace::new(mesh, FiniteElement::new(params.order), 1)?;
    let gd = GalerkinDifference::build(
        space,
        params.degree,
        &GdParams {
            parallel: params.parallel,
        },
    )?;
    let velocity = params.velocity;

    // the forms borrow `gd` and must be dropped before it moves into the result
    let (stiffness, rhs, centers, dense, l2_error) = {
        let space = gd.space();

        let mut bilinear = BilinearForm::new(space);
        bilinear
            .add_domain_integrator(AdvectionIntegrator { velocity })
            .add_interior_face_integrator(UpwindFaceIntegrator { velocity })
            .add_boundary_face_integrator(UpwindFaceIntegrator { velocity });
        let dense_stiffness = bilinear.assemble()?;

        let mut linear = LinearForm::new(space);
        linear
            .add_domain_integrator(DomainLoadIntegrator { source: &source })
            .add_boundary_integrator(BoundaryInflowIntegrator {
                velocity,
                inflow: &exact,
            });
        let dense_rhs = linear.assemble()?;

        let prolongation = gd.prolongation();
        let stiffness = prolongation.galerkin_product(&dense_stiffness)?;
        let rhs = prolongation.apply_transpose(&dense_rhs)?;
        log::info!(
            "reduced system: {} unknowns, {} nonzeros",
            stiffness.nrows(),
            stiffness.nnz()
        );

        let mut centers = gd.new_center_field();
        centers.assign(linsolve::solve(&stiffness, &rhs)?)?;
        log::debug!("solution at centers: {:?}", centers.values.as_slice());

        let dense = gd.prolongate(&centers)?;
        let l2_error = dense.l2_error(space, &exact)?;
        log::info!("L2 error {l2_error:e}");

        (stiffness, rhs, centers, dense, l2_error)
    };

    Ok(AdvectionSolution {
        gd,
        centers,
        dense,
        stiffness,
        rhs,
        l2_error,
    })
}

//
// tests
//
