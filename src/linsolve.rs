//! Direct solution of the reduced linear system.
//!
//! Reduced GD systems have one unknown per element and component,
//! so a dense LU factorization is plenty for the problem sizes of interest.

use nalgebra as na;
use nalgebra_sparse as nas;

use crate::error::{GdError, Result};

/// Solve `A x = b` for a square sparse `A`.
pub fn solve(a: &nas::CsrMatrix<f64>, b: &na::DVector<f64>) -> Result<na::DVector<f64>> {
    if a.nrows() != a.ncols() {
        return Err(GdError::DimensionMismatch {
            what: "system matrix columns",
            expected: a.nrows(),
            actual: a.ncols(),
        });
    }
    if b.len() != a.nrows() {
        return Err(GdError::DimensionMismatch {
            what: "right-hand side length",
            expected: a.nrows(),
            actual: b.len(),
        });
    }

    let dense = na::DMatrix::from(a);
    log::debug!("factorizing dense {0}x{0} system", dense.nrows());
    let x = dense
        .lu()
        .solve(b)
        .ok_or_else(|| GdError::SolverFailure("system matrix is singular".into()))?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(GdError::SolverFailure(
            "solution contains non-finite values".into(),
        ));
    }
    Ok(x)
}

//
// tests
//
