//! Assembly of bilinear and linear forms on a [`DgSpace`].
//!
//! Integrators compute scalar element or face contributions;
//! the forms replicate them for every vector component
//! and scatter them into a global CSR matrix or dense vector.
//! All quadrature goes through the space's [`CutCellMapper`][crate::cut_cell::CutCellMapper],
//! so cut cells contribute only over the length they represent.

use itertools::iproduct;
use nalgebra as na;
use nalgebra_sparse as nas;

use crate::error::{GdError, Result};
use crate::mesh::Face;
use crate::quadrature::IntegrationRule;
use crate::space::DgSpace;

/// Computes a bilinear form's contribution on one element.
pub trait DomainIntegrator {
    /// The `ndof × ndof` element matrix
    /// with rows indexed by test functions and columns by trial functions.
    fn element_matrix(&self, space: &DgSpace, element: usize) -> na::DMatrix<f64>;
}

/// Computes a bilinear form's contribution on one face.
pub trait FaceIntegrator {
    /// The contribution coupling the elements adjacent to the face,
    /// or `None` if there is nothing to add (e.g. an outflow face).
    fn face_matrix(&self, space: &DgSpace, face: &Face) -> Option<FaceBlock>;
}

/// Computes a linear form's contribution on one element.
pub trait DomainLfIntegrator {
    /// The element vector of length `ndof`.
    fn element_vector(&self, space: &DgSpace, element: usize) -> na::DVector<f64>;
}

/// Computes a linear form's contribution on one boundary face.
pub trait BoundaryLfIntegrator {
    /// The element the contribution belongs to and the element vector,
    /// or `None` if there is nothing to add.
    fn face_vector(&self, space: &DgSpace, face: &Face) -> Option<(usize, na::DVector<f64>)>;
}

/// A dense matrix coupling the degrees of freedom of the elements at a face.
///
/// Rows and columns are ordered by element (in the order of `elements`)
/// and then by local node.
#[derive(Clone, Debug)]
pub struct FaceBlock {
    /// Elements whose dofs the block couples.
    pub elements: Vec<usize>,
    /// The block of size `elements.len() * ndof` squared.
    pub matrix: na::DMatrix<f64>,
}

/// A bilinear form built up from integrators.
pub struct BilinearForm<'a> {
    space: &'a DgSpace,
    domain: Vec<Box<dyn DomainIntegrator + 'a>>,
    interior_faces: Vec<Box<dyn FaceIntegrator + 'a>>,
    boundary_faces: Vec<Box<dyn FaceIntegrator + 'a>>,
}

impl<'a> BilinearForm<'a> {
    /// Create a form with no integrators.
    pub fn new(space: &'a DgSpace) -> Self {
        Self {
            space,
            domain: Vec::new(),
            interior_faces: Vec::new(),
            boundary_faces: Vec::new(),
        }
    }

    /// Add an integrator evaluated on every element.
    pub fn add_domain_integrator(&mut self, integ: impl DomainIntegrator + 'a) -> &mut Self {
        self.domain.push(Box::new(integ));
        self
    }

    /// Add an integrator evaluated on every face between two elements.
    pub fn add_interior_face_integrator(&mut self, integ: impl FaceIntegrator + 'a) -> &mut Self {
        self.interior_faces.push(Box::new(integ));
        self
    }

    /// Add an integrator evaluated on every boundary face.
    pub fn add_boundary_face_integrator(&mut self, integ: impl FaceIntegrator + 'a) -> &mut Self {
        self.boundary_faces.push(Box::new(integ));
        self
    }

    /// Assemble the form into a square CSR matrix of the space's size.
    pub fn assemble(&self) -> Result<nas::CsrMatrix<f64>> {
        let space = self.space;
        let ndof = space.fe().dof_count();
        let size = space.vsize();
        let mut coo = nas::CooMatrix::new(size, size);

        for element in 0..space.mesh().element_count() {
            for integ in &self.domain {
                let mat = integ.element_matrix(space, element);
                check_block(&mat, ndof)?;
                scatter_block(&mut coo, space, &[element], &mat);
            }
        }

        for face in space.mesh().faces() {
            let integs = if face.is_boundary() {
                &self.boundary_faces
            } else {
                &self.interior_faces
            };
            for integ in integs {
                if let Some(block) = integ.face_matrix(space, face) {
                    check_block(&block.matrix, block.elements.len() * ndof)?;
                    scatter_block(&mut coo, space, &block.elements, &block.matrix);
                }
            }
        }

        let mat = nas::CsrMatrix::from(&coo);
        log::debug!("assembled bilinear form with {} nonzeros", mat.nnz());
        Ok(mat)
    }
}

/// A linear form built up from integrators.
pub struct LinearForm<'a> {
    space: &'a DgSpace,
    domain: Vec<Box<dyn DomainLfIntegrator + 'a>>,
    boundary_faces: Vec<Box<dyn BoundaryLfIntegrator + 'a>>,
}

impl<'a> LinearForm<'a> {
    /// Create a form with no integrators.
    pub fn new(space: &'a DgSpace) -> Self {
        Self {
            space,
            domain: Vec::new(),
            boundary_faces: Vec::new(),
        }
    }

    /// Add an integrator evaluated on every element.
    pub fn add_domain_integrator(&mut self, integ: impl DomainLfIntegrator + 'a) -> &mut Self {
        self.domain.push(Box::new(integ));
        self
    }

    /// Add an integrator evaluated on every boundary face.
    pub fn add_boundary_integrator(&mut self, integ: impl BoundaryLfIntegrator + 'a) -> &mut Self {
        self.boundary_faces.push(Box::new(integ));
        self
    }

    /// Assemble the form into a vector of the space's size.
    pub fn assemble(&self) -> Result<na::DVector<f64>> {
        let space = self.space;
        let ndof = space.fe().dof_count();
        let mut out: na::DVector<f64> = na::DVector::zeros(space.vsize());

        let mut scatter = |element: usize, vals: &na::DVector<f64>| -> Result<()> {
            if vals.len() != ndof {
                return Err(GdError::DimensionMismatch {
                    what: "element vector length",
                    expected: ndof,
                    actual: vals.len(),
                });
            }
            for v in 0..space.vdim() {
                for (&dof, val) in space.element_dofs(element, v).iter().zip(vals.iter()) {
                    out[dof] += val;
                }
            }
            Ok(())
        };

        for element in 0..space.mesh().element_count() {
            for integ in &self.domain {
                scatter(element, &integ.element_vector(space, element))?;
            }
        }
        for face in space.mesh().faces().iter().filter(|f| f.is_boundary()) {
            for integ in &self.boundary_faces {
                if let Some((element, vals)) = integ.face_vector(space, face) {
                    scatter(element, &vals)?;
                }
            }
        }

        Ok(out)
    }
}

fn check_block(mat: &na::DMatrix<f64>, expected: usize) -> Result<()> {
    if mat.nrows() != expected || mat.ncols() != expected {
        return Err(GdError::DimensionMismatch {
            what: "local matrix size",
            expected,
            actual: if mat.nrows() != expected {
                mat.nrows()
            } else {
                mat.ncols()
            },
        });
    }
    Ok(())
}

/// Add a scalar block once for every vector component.
fn scatter_block(
    coo: &mut nas::CooMatrix<f64>,
    space: &DgSpace,
    elements: &[usize],
    mat: &na::DMatrix<f64>,
) {
    for v in 0..space.vdim() {
        let dofs: Vec<usize> = elements
            .iter()
            .flat_map(|&e| space.element_dofs(e, v))
            .collect();
        for ((i, &row), (j, &col)) in iproduct!(dofs.iter().enumerate(), dofs.iter().enumerate()) {
            let val = mat[(i, j)];
            if val != 0. {
                coo.push(row, col, val);
            }
        }
    }
}

fn domain_rule(space: &DgSpace, extra_order: usize) -> IntegrationRule {
    IntegrationRule::for_order(2 * space.fe().order() + extra_order)
}

/// Reference coordinate of a face as seen from one of its elements,
/// after cut-cell remapping.
fn face_coordinate(space: &DgSpace, face: &Face, element: usize) -> f64 {
    let local = if face.minus == Some(element) { 1. } else { 0. };
    space.mapper().map_face_coordinate(element, local)
}

//
// bilinear form integrators
//

/// `(u, v)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MassIntegrator;

impl DomainIntegrator for MassIntegrator {
    fn element_matrix(&self, space: &DgSpace, element: usize) -> na::DMatrix<f64> {
        let fe = space.fe();
        let mut mat = na::DMatrix::zeros(fe.dof_count(), fe.dof_count());
        for p in space.mapper().map_rule(element, &domain_rule(space, 0)) {
            let shape = fe.shape(p.reference);
            mat += p.weight * &shape * shape.transpose();
        }
        mat
    }
}

/// `(a u', v)` for a constant velocity `a`.
#[derive(Clone, Copy, Debug)]
pub struct AdvectionIntegrator {
    /// Advection velocity.
    pub velocity: f64,
}

impl DomainIntegrator for AdvectionIntegrator {
    fn element_matrix(&self, space: &DgSpace, element: usize) -> na::DMatrix<f64> {
        let fe = space.fe();
        let mut mat = na::DMatrix::zeros(fe.dof_count(), fe.dof_count());
        for p in space.mapper().map_rule(element, &domain_rule(space, 0)) {
            let shape = fe.shape(p.reference);
            let dshape = fe.dshape(p.reference) * p.inv_jacobian;
            mat += (p.weight * self.velocity) * &shape * dshape.transpose();
        }
        mat
    }
}

/// Upwind flux of the strong-form advection operator.
///
/// On an interior face this adds `|a·n| (u_down - u_up) v_down`,
/// where the downwind element is the one the flow enters.
/// On a boundary face where the flow enters the domain it adds `|a·n| u v`,
/// the inflow value itself going to the right-hand side
/// (see [`BoundaryInflowIntegrator`]).
#[derive(Clone, Copy, Debug)]
pub struct UpwindFaceIntegrator {
    /// Advection velocity.
    pub velocity: f64,
}

impl UpwindFaceIntegrator {
    /// Downwind and upwind elements of a face.
    /// Either may be missing on the boundary.
    fn sides(&self, face: &Face) -> Option<(Option<usize>, Option<usize>)> {
        if self.velocity > 0. {
            Some((face.plus, face.minus))
        } else if self.velocity < 0. {
            Some((face.minus, face.plus))
        } else {
            None
        }
    }
}

impl FaceIntegrator for UpwindFaceIntegrator {
    fn face_matrix(&self, space: &DgSpace, face: &Face) -> Option<FaceBlock> {
        let (down, up) = self.sides(face)?;
        let down = down?;
        let fe = space.fe();
        let ndof = fe.dof_count();
        let flux = self.velocity.abs();

        let down_shape = fe.shape(face_coordinate(space, face, down));
        match up {
            Some(up) => {
                let up_shape = fe.shape(face_coordinate(space, face, up));
                let mut matrix = na::DMatrix::zeros(2 * ndof, 2 * ndof);
                matrix
                    .view_mut((0, 0), (ndof, ndof))
                    .copy_from(&(flux * &down_shape * down_shape.transpose()));
                matrix
                    .view_mut((0, ndof), (ndof, ndof))
                    .copy_from(&(-flux * &down_shape * up_shape.transpose()));
                Some(FaceBlock {
                    elements: vec![down, up],
                    matrix,
                })
            }
            // inflow boundary
            None => Some(FaceBlock {
                elements: vec![down],
                matrix: flux * &down_shape * down_shape.transpose(),
            }),
        }
    }
}

//
// linear form integrators
//

/// `(f, v)` for a source function `f`.
pub struct DomainLoadIntegrator<F> {
    /// The source function.
    pub source: F,
}

impl<F: Fn(f64) -> f64> DomainLfIntegrator for DomainLoadIntegrator<F> {
    fn element_vector(&self, space: &DgSpace, element: usize) -> na::DVector<f64> {
        let fe = space.fe();
        let mapper = space.mapper();
        let mut vals = na::DVector::zeros(fe.dof_count());
        // the source is generally not a polynomial, integrate it a bit more accurately
        for p in mapper.map_rule(element, &domain_rule(space, 2)) {
            let f = (self.source)(mapper.physical(element, &p));
            vals += (p.weight * f) * fe.shape(p.reference);
        }
        vals
    }
}

/// `|a·n| g v` on boundary faces where the flow enters the domain,
/// for an inflow value `g`.
pub struct BoundaryInflowIntegrator<G> {
    /// Advection velocity.
    pub velocity: f64,
    /// Inflow value as a function of the face's physical position.
    pub inflow: G,
}

impl<G: Fn(f64) -> f64> BoundaryLfIntegrator for BoundaryInflowIntegrator<G> {
    fn face_vector(&self, space: &DgSpace, face: &Face) -> Option<(usize, na::DVector<f64>)> {
        // the flow enters through the side that has no upwind element
        let element = if self.velocity > 0. && face.minus.is_none() {
            face.plus?
        } else if self.velocity < 0. && face.plus.is_none() {
            face.minus?
        } else {
            return None;
        };
        let x = face_coordinate(space, face, element);
        let g = (self.inflow)(space.mesh().transform(element, x));
        Some((element, (self.velocity.abs() * g) * space.fe().shape(x)))
    }
}

//
// tests
//
