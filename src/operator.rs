//! Sparse operators acting on fields,
//! most importantly the Galerkin-Difference [`Prolongation`].

use nalgebra as na;
use nalgebra_sparse as nas;

use crate::error::{GdError, Result};
use crate::field::{CenterField, GridFunction};

/// A linear map between two kinds of field, backed by a sparse matrix.
pub trait Operator {
    /// The type of field this operator takes as an input.
    type Input: OperatorInput;
    /// The type of field this operator produces as an output.
    type Output: OperatorInput;

    /// Method to apply this operator to an input field.
    fn apply(&self, input: &Self::Input) -> Self::Output;
    /// Method to convert this operator into a CSR matrix.
    fn into_csr(self) -> nas::CsrMatrix<f64>;
}

/// Trait implemented by fields to enable operators
/// to construct and deconstruct them in a generic way.
pub trait OperatorInput {
    /// Get the underlying vector of values in the field.
    fn values(&self) -> &na::DVector<f64>;
    /// Construct a field from a vector of values.
    fn from_values(values: na::DVector<f64>) -> Self;
}

/// The finalized Galerkin-Difference prolongation operator `P`,
/// mapping compact center values to dense nodal values.
///
/// Rows correspond to the values of a [`DgSpace`][crate::DgSpace]
/// and columns to the values of a [`CenterField`].
/// Instances are only produced by
/// [`ProlongationBuilder::finish`][crate::gd::ProlongationBuilder::finish]
/// and are immutable afterwards.
/// The transpose is computed once at construction
/// since restriction is needed as often as prolongation.
#[derive(Clone, Debug)]
pub struct Prolongation {
    mat: nas::CsrMatrix<f64>,
    transposed: nas::CsrMatrix<f64>,
}

impl Prolongation {
    /// Constructor exposed to crate only, used by the prolongation builder.
    pub(crate) fn new(mat: nas::CsrMatrix<f64>) -> Self {
        let transposed = mat.transpose();
        Self { mat, transposed }
    }

    /// The operator as a CSR matrix.
    #[inline]
    pub fn matrix(&self) -> &nas::CsrMatrix<f64> {
        &self.mat
    }

    /// Number of dense values (rows).
    #[inline]
    pub fn nrows(&self) -> usize {
        self.mat.nrows()
    }

    /// Number of center values (columns).
    #[inline]
    pub fn ncols(&self) -> usize {
        self.mat.ncols()
    }

    /// Compute `Pᵀ d` for a vector of dense values,
    /// e.g. to restrict an assembled load vector to the center unknowns.
    pub fn apply_transpose(&self, dense: &na::DVector<f64>) -> Result<na::DVector<f64>> {
        if dense.len() != self.mat.nrows() {
            return Err(GdError::DimensionMismatch {
                what: "restricted vector length",
                expected: self.mat.nrows(),
                actual: dense.len(),
            });
        }
        Ok(&self.transposed * dense)
    }

    /// Restrict a dense field to center values, `Pᵀ d`.
    pub fn restrict(&self, dense: &GridFunction) -> Result<CenterField> {
        Ok(CenterField::from_values(self.apply_transpose(&dense.values)?))
    }

    /// Form the reduced operator `Pᵀ A P` of a matrix assembled on the dense space.
    pub fn galerkin_product(&self, a: &nas::CsrMatrix<f64>) -> Result<nas::CsrMatrix<f64>> {
        if a.nrows() != self.mat.nrows() || a.ncols() != self.mat.nrows() {
            return Err(GdError::DimensionMismatch {
                what: "dense operator size",
                expected: self.mat.nrows(),
                actual: if a.nrows() != self.mat.nrows() {
                    a.nrows()
                } else {
                    a.ncols()
                },
            });
        }
        let ap = a * &self.mat;
        Ok(&self.transposed * &ap)
    }
}

impl Operator for Prolongation {
    type Input = CenterField;
    type Output = GridFunction;

    /// Compute `P c`.
    ///
    /// # Panics
    /// If the center field's length doesn't match the operator's column count.
    fn apply(&self, input: &Self::Input) -> Self::Output {
        Self::Output::from_values(&self.mat * input.values())
    }

    fn into_csr(self) -> nas::CsrMatrix<f64> {
        self.mat
    }
}

impl PartialEq for Prolongation {
    fn eq(&self, other: &Self) -> bool {
        self.mat == other.mat
    }
}

// application to fields with multiplication syntax

impl std::ops::Mul<&CenterField> for &Prolongation {
    type Output = GridFunction;

    fn mul(self, rhs: &CenterField) -> Self::Output {
        self.apply(rhs)
    }
}

//
// tests
//
