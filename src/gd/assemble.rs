//! Incremental assembly of the global prolongation operator.

use nalgebra as na;
use nalgebra_sparse as nas;

use crate::error::{GdError, Result};
use crate::operator::Prolongation;

/// Collects local reconstruction matrices in coordinate format
/// before compressing them into an immutable [`Prolongation`].
#[derive(Clone, Debug)]
pub struct ProlongationBuilder {
    coo: nas::CooMatrix<f64>,
}

impl ProlongationBuilder {
    /// Start an empty operator with `rows` dense and `cols` center values.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            coo: nas::CooMatrix::new(rows, cols),
        }
    }

    /// Write the reconstruction of one element into the operator.
    ///
    /// `row_dofs` are the element's dense indices grouped by component
    /// (`vdim` groups of `ndof`, see [`DgSpace::element_vdofs`][crate::DgSpace::element_vdofs]),
    /// and `local` is the `ndof × patch.len()` reconstruction matrix.
    /// The same matrix is used for every component,
    /// reading center values `vdim * patch[i] + v` for component `v`.
    pub fn insert(
        &mut self,
        patch: &[usize],
        local: &na::DMatrix<f64>,
        row_dofs: &[usize],
        vdim: usize,
    ) -> Result<()> {
        let ndof = local.nrows();
        if local.ncols() != patch.len() {
            return Err(GdError::DimensionMismatch {
                what: "local reconstruction columns",
                expected: patch.len(),
                actual: local.ncols(),
            });
        }
        if row_dofs.len() != ndof * vdim {
            return Err(GdError::DimensionMismatch {
                what: "element dof count",
                expected: ndof * vdim,
                actual: row_dofs.len(),
            });
        }
        if let Some(&bad) = row_dofs.iter().find(|&&r| r >= self.coo.nrows()) {
            return Err(GdError::DimensionMismatch {
                what: "prolongation row index",
                expected: self.coo.nrows(),
                actual: bad,
            });
        }
        if let Some(&bad) = patch.iter().find(|&&e| vdim * e + vdim > self.coo.ncols()) {
            return Err(GdError::DimensionMismatch {
                what: "prolongation column index",
                expected: self.coo.ncols(),
                actual: vdim * bad + vdim - 1,
            });
        }

        for (v, rows) in row_dofs.chunks_exact(ndof.max(1)).enumerate() {
            for (j, &row) in rows.iter().enumerate() {
                for (i, &elem) in patch.iter().enumerate() {
                    self.coo.push(row, vdim * elem + v, local[(j, i)]);
                }
            }
        }
        Ok(())
    }

    /// Compress the collected entries into the finished operator.
    ///
    /// Entries inserted more than once for the same position are summed.
    pub fn finish(self) -> Prolongation {
        Prolongation::new(nas::CsrMatrix::from(&self.coo))
    }
}

//
// tests
//
