//! Least-squares polynomial reconstruction on a patch.
//!
//! Given the centroids `x_c` of a patch (seed first) and sample points `x_q`,
//! we look for the matrix `R` such that for any center values `c`,
//! `R c` is the degree-`d` least-squares polynomial through `(x_c, c)`
//! evaluated at `x_q`.
//! With the Vandermonde matrix `V[i, p] = (x_c[i] - x_c[0])^p`
//! the coefficients are `C c` where `C` solves `V C = I` in the least-squares sense,
//! and `R[j, i] = Σ_p (x_q[j] - x_c[0])^p C[p, i]`.
//!
//! When the patch has exactly `d + 1` elements this is interpolation,
//! otherwise a genuine overdetermined fit. Polynomials of degree `d` or less
//! are reproduced exactly in both cases.

use nalgebra as na;

use crate::error::{GdError, Result};

/// Relative singular value below which the Vandermonde matrix is considered singular.
const RANK_TOLERANCE: f64 = 1e-12;

/// Compute the local reconstruction matrix
/// of shape `samples.ncols() × centers.ncols()`.
///
/// Both coordinate matrices must have exactly one row.
///
/// ```
/// # use gdspace::{na, gd::reconstruct::least_squares_interpolation};
/// // linear interpolation between two centers at 0 and 1
/// let centers = na::DMatrix::from_row_slice(1, 2, &[0., 1.]);
/// let samples = na::DMatrix::from_row_slice(1, 1, &[0.25]);
/// let r = least_squares_interpolation(1, &centers, &samples).unwrap();
/// assert!((r[(0, 0)] - 0.75).abs() < 1e-14);
/// assert!((r[(0, 1)] - 0.25).abs() < 1e-14);
/// ```
pub fn least_squares_interpolation(
    degree: usize,
    centers: &na::DMatrix<f64>,
    samples: &na::DMatrix<f64>,
) -> Result<na::DMatrix<f64>> {
    if centers.nrows() != 1 || centers.ncols() == 0 {
        return Err(GdError::DimensionMismatch {
            what: "center coordinate matrix rows",
            expected: 1,
            actual: centers.nrows(),
        });
    }
    if samples.nrows() != 1 || samples.ncols() == 0 {
        return Err(GdError::DimensionMismatch {
            what: "sample coordinate matrix rows",
            expected: 1,
            actual: samples.nrows(),
        });
    }

    if centers.iter().chain(samples.iter()).any(|x| !x.is_finite()) {
        return Err(GdError::SolverFailure(
            "non-finite center or sample coordinate".into(),
        ));
    }

    let m = centers.ncols();
    let basis_size = degree + 1;
    if m < basis_size {
        return Err(GdError::SolverFailure(format!(
            "{m} centers cannot determine a polynomial of degree {degree}"
        )));
    }

    // fit in a variable scaled to [-1, 1] over the patch.
    // this doesn't change the resulting weights
    // but keeps the Vandermonde matrix far from singular for small elements
    let origin = centers[0];
    let radius = centers
        .iter()
        .map(|&x| (x - origin).abs())
        .fold(0., f64::max);
    let radius = if radius > 0. { radius } else { 1. };
    let to_local = |x: f64| (x - origin) / radius;

    let vandermonde = na::DMatrix::from_fn(m, basis_size, |i, p| {
        to_local(centers[i]).powi(p as i32)
    });

    let svd = na::linalg::SVD::try_new(vandermonde, true, true, f64::EPSILON, 0)
        .ok_or_else(|| GdError::SolverFailure("SVD did not converge".into()))?;
    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();
    if !(smallest > RANK_TOLERANCE * largest) {
        return Err(GdError::SolverFailure(format!(
            "Vandermonde matrix is rank deficient for degree {degree} \
            (singular values {smallest:e} / {largest:e})"
        )));
    }
    let coefs = svd
        .solve(&na::DMatrix::<f64>::identity(m, m), RANK_TOLERANCE * largest)
        .map_err(|e| GdError::SolverFailure(e.to_string()))?;

    let sample_powers = na::DMatrix::from_fn(samples.ncols(), basis_size, |j, p| {
        to_local(samples[j]).powi(p as i32)
    });

    Ok(sample_powers * coefs)
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use approx::abs_diff_eq;

    fn row(values: &[f64]) -> na::DMatrix<f64> {
        na::DMatrix::from_row_slice(1, values.len(), values)
    }

    /// Monomials up to the fit degree are reproduced at arbitrary samples,
    /// both for exact interpolation and for overdetermined fits.
    #[test]
    fn polynomials_are_reproduced_exactly() {
        let samples = row(&[0.31, 0.35, 0.5, 0.15, 0.62]);
        let cases = [
            // (degree, centers)
            (0, vec![0.3]),
            (1, vec![0.3, 0.2, 0.4]),
            (2, vec![0.3, 0.2, 0.4]),
            (3, vec![0.3, 0.2, 0.4, 0.1, 0.5]),
            (4, vec![0.3, 0.2, 0.4, 0.1, 0.5]),
            // nonuniform spacing and an unsymmetric overdetermined patch
            (2, vec![0.05, 0.13, 0.2, 0.41, 0.6]),
        ];
        for (degree, centers) in cases {
            let centers = row(&centers);
            let interp = least_squares_interpolation(degree, &centers, &samples).unwrap();
            assert_eq!(interp.shape(), (samples.ncols(), centers.ncols()));
            for k in 0..=degree {
                let values = centers.transpose().map(|x| x.powi(k as i32));
                let reconstructed = &interp * values;
                for (j, &x) in samples.iter().enumerate() {
                    assert!(
                        abs_diff_eq!(reconstructed[j], x.powi(k as i32), epsilon = 1e-10),
                        "degree {degree}, x^{k} at {x}: {}",
                        reconstructed[j]
                    );
                }
            }
        }
    }

    #[test]
    fn rows_sum_to_one() {
        let centers = row(&[10.5, 9.5, 11.5, 8.5, 12.5]);
        let samples = row(&[10.1, 10.9]);
        let interp = least_squares_interpolation(3, &centers, &samples).unwrap();
        for r in interp.row_iter() {
            assert!(abs_diff_eq!(r.sum(), 1., epsilon = 1e-12));
        }
    }

    #[test]
    fn tiny_elements_stay_well_conditioned() {
        // a patch of elements 1e-6 wide
        let h = 1e-6;
        let centers = row(&[0.5 * h, 1.5 * h, 2.5 * h]);
        let samples = row(&[0.2 * h, 0.8 * h]);
        let interp = least_squares_interpolation(2, &centers, &samples).unwrap();
        let values = centers.transpose().map(|x| (x / h).powi(2));
        let reconstructed = interp * values;
        assert!(abs_diff_eq!(reconstructed[0], 0.04, epsilon = 1e-9));
        assert!(abs_diff_eq!(reconstructed[1], 0.64, epsilon = 1e-9));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let samples = row(&[0.5]);
        // too few centers
        assert!(matches!(
            least_squares_interpolation(2, &row(&[0.1, 0.2]), &samples),
            Err(GdError::SolverFailure(_))
        ));
        // coincident centers
        assert!(matches!(
            least_squares_interpolation(1, &row(&[0.1, 0.1, 0.1]), &samples),
            Err(GdError::SolverFailure(_))
        ));
        // wrong shapes
        assert!(matches!(
            least_squares_interpolation(0, &na::DMatrix::zeros(2, 3), &samples),
            Err(GdError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            least_squares_interpolation(0, &row(&[0.1]), &na::DMatrix::zeros(1, 0)),
            Err(GdError::DimensionMismatch { .. })
        ));
        // non-finite coordinates
        assert!(matches!(
            least_squares_interpolation(1, &row(&[0.1, f64::NAN, 0.3]), &samples),
            Err(GdError::SolverFailure(_))
        ));
        assert!(matches!(
            least_squares_interpolation(1, &row(&[0.1, 0.2, 0.3]), &row(&[f64::INFINITY])),
            Err(GdError::SolverFailure(_))
        ));
    }
}
