//! Gauss-Legendre quadrature on the reference segment `[0, 1]`.
//!
//! An `n`-point rule is exact for polynomials of degree `2n-1` or less.
//! Weights are normalized to the reference segment, so they sum to 1
//! and must be multiplied by the element's Jacobian weight
//! (or, for cut cells, by the cut scale; see [`cut_cell`][crate::cut_cell])
//! to integrate over physical space.
//!
//! # Examples
//!
//! ```
//! # use gdspace::quadrature::IntegrationRule;
//! // a 3-point rule integrates x^5 exactly
//! let rule = IntegrationRule::gauss_legendre(3);
//! let integral: f64 = rule.iter().map(|p| p.weight * p.x.powi(5)).sum();
//! assert!((integral - 1. / 6.).abs() < 1e-14);
//! ```

use std::f64::consts::PI;

/// A point in reference coordinates with its quadrature weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationPoint {
    /// Reference coordinate in `[0, 1]`.
    pub x: f64,
    /// Weight relative to the reference segment.
    pub weight: f64,
}

/// A set of quadrature points on the reference segment.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationRule {
    points: Vec<IntegrationPoint>,
}

impl IntegrationRule {
    /// Gauss-Legendre rule with `point_count` points (at least one).
    ///
    /// Nodes are found by Newton iteration on the Legendre polynomial
    /// starting from the usual cosine approximation of its roots,
    /// and returned in ascending order.
    pub fn gauss_legendre(point_count: usize) -> Self {
        let n = point_count.max(1);
        let mut points = Vec::with_capacity(n);

        for i in 0..n {
            let mut x = f64::cos(PI * (i as f64 + 0.75) / (n as f64 + 0.5));
            for _ in 0..100 {
                let (p, dp) = legendre_and_derivative(n, x);
                let update = p / dp;
                x -= update;
                if update.abs() < 1e-15 {
                    break;
                }
            }
            // roots are strictly inside (-1, 1) so the derivative formula is safe here
            let (_, dp) = legendre_and_derivative(n, x);
            let weight = 2. / ((1. - x * x) * dp * dp);
            // map from [-1, 1] to [0, 1]. roots come out in descending order,
            // so flipping the sign gives ascending reference coordinates
            points.push(IntegrationPoint {
                x: 0.5 * (1. - x),
                weight: 0.5 * weight,
            });
        }

        Self { points }
    }

    /// Gauss-Legendre rule exact for polynomials of degree `order`.
    #[inline]
    pub fn for_order(order: usize) -> Self {
        Self::gauss_legendre(order / 2 + 1)
    }

    /// The points of the rule.
    #[inline]
    pub fn points(&self) -> &[IntegrationPoint] {
        &self.points
    }

    /// Number of points in the rule.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the rule has no points (never true for rules built by this module).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points of the rule.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, IntegrationPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a IntegrationRule {
    type Item = &'a IntegrationPoint;
    type IntoIter = std::slice::Iter<'a, IntegrationPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Legendre polynomial `P_n(x)` and its derivative on `[-1, 1]`
/// via the three-term recurrence.
fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.;
    let mut p = x;
    for k in 2..=n {
        let k = k as f64;
        let p_next = ((2. * k - 1.) * x * p - (k - 1.) * p_prev) / k;
        p_prev = p;
        p = p_next;
    }
    let n = n as f64;
    let deriv = n * (x * p - p_prev) / (x * x - 1.);
    (p, deriv)
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use approx::abs_diff_eq;

    #[test]
    fn weights_sum_to_one_and_nodes_ascend() {
        for n in 1..=12 {
            let rule = IntegrationRule::gauss_legendre(n);
            assert_eq!(rule.len(), n);
            let total: f64 = rule.iter().map(|p| p.weight).sum();
            assert!(abs_diff_eq!(total, 1., epsilon = 1e-13), "n = {n}: {total}");
            for pair in rule.points().windows(2) {
                assert!(pair[0].x < pair[1].x);
            }
            assert!(rule.iter().all(|p| p.x > 0. && p.x < 1.));
        }
    }

    /// An n-point rule integrates every monomial up to degree 2n-1 exactly.
    #[test]
    fn monomials_are_integrated_exactly() {
        for n in 1..=8 {
            let rule = IntegrationRule::gauss_legendre(n);
            for k in 0..2 * n {
                let integral: f64 = rule.iter().map(|p| p.weight * p.x.powi(k as i32)).sum();
                let exact = 1. / (k as f64 + 1.);
                assert!(
                    abs_diff_eq!(integral, exact, epsilon = 1e-13),
                    "{n}-point rule failed on x^{k}: {integral} vs {exact}"
                );
            }
        }
    }

    #[test]
    fn three_point_rule_matches_table() {
        // tabulated values on [-1, 1], mapped to [0, 1]
        let abscissa = 0.7745966692414834;
        let expected = [
            (0.5 * (1. - abscissa), 0.5555555555555556 / 2.),
            (0.5, 0.8888888888888888 / 2.),
            (0.5 * (1. + abscissa), 0.5555555555555556 / 2.),
        ];
        let rule = IntegrationRule::gauss_legendre(3);
        for (p, (x, w)) in rule.iter().zip(expected) {
            assert!(abs_diff_eq!(p.x, x, epsilon = 1e-14));
            assert!(abs_diff_eq!(p.weight, w, epsilon = 1e-14));
        }
    }

    #[test]
    fn rule_for_order_is_exact_for_that_order() {
        for order in 0..10 {
            let rule = IntegrationRule::for_order(order);
            assert!(2 * rule.len() - 1 >= order);
        }
        assert_eq!(IntegrationRule::gauss_legendre(0).len(), 1);
    }
}
