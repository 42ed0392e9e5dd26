//! Nodal Lagrange reference elements on the segment `[0, 1]`.

use nalgebra as na;

use crate::quadrature::IntegrationRule;

/// Reference geometry of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// The unit segment `[0, 1]`.
    Segment,
}

impl Geometry {
    /// Reference coordinate of the geometric center.
    #[inline]
    pub fn center(self) -> f64 {
        match self {
            Geometry::Segment => 0.5,
        }
    }

    /// Topological dimension.
    #[inline]
    pub fn dimension(self) -> usize {
        match self {
            Geometry::Segment => 1,
        }
    }
}

/// How degrees of freedom relate to values of the represented function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapType {
    /// Degrees of freedom are point values.
    Value,
    /// Degrees of freedom are integrals, i.e. values scaled by the Jacobian weight.
    Integral,
}

/// A discontinuous Lagrange element of arbitrary order
/// with nodes at the Gauss-Legendre points of the reference segment.
#[derive(Clone, Debug)]
pub struct FiniteElement {
    order: usize,
    nodes: Vec<f64>,
    map_type: MapType,
}

impl FiniteElement {
    /// Create an element of the given polynomial order with [`MapType::Value`].
    pub fn new(order: usize) -> Self {
        let nodes = IntegrationRule::gauss_legendre(order + 1)
            .iter()
            .map(|p| p.x)
            .collect();
        Self {
            order,
            nodes,
            map_type: MapType::Value,
        }
    }

    /// Replace the element's value mapping convention.
    pub fn with_map_type(mut self, map_type: MapType) -> Self {
        self.map_type = map_type;
        self
    }

    /// Polynomial order of the basis.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of basis functions (and nodes).
    #[inline]
    pub fn dof_count(&self) -> usize {
        self.nodes.len()
    }

    /// Reference coordinates of the nodes.
    #[inline]
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Value mapping convention.
    #[inline]
    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    /// Reference geometry.
    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry::Segment
    }

    /// Evaluate every basis function at a reference coordinate.
    ///
    /// The coordinate is not restricted to `[0, 1]`;
    /// cut cells and patch reconstructions evaluate outside of it.
    pub fn shape(&self, x: f64) -> na::DVector<f64> {
        let n = self.nodes.len();
        na::DVector::from_fn(n, |k, _| {
            let x_k = self.nodes[k];
            self.nodes
                .iter()
                .enumerate()
                .filter(|(m, _)| *m != k)
                .map(|(_, &x_m)| (x - x_m) / (x_k - x_m))
                .product()
        })
    }

    /// Evaluate the reference derivative of every basis function.
    pub fn dshape(&self, x: f64) -> na::DVector<f64> {
        let n = self.nodes.len();
        na::DVector::from_fn(n, |k, _| {
            let x_k = self.nodes[k];
            // product rule: drop one factor at a time
            (0..n)
                .filter(|&j| j != k)
                .map(|j| {
                    let rest: f64 = (0..n)
                        .filter(|&m| m != k && m != j)
                        .map(|m| (x - self.nodes[m]) / (x_k - self.nodes[m]))
                        .product();
                    rest / (x_k - self.nodes[j])
                })
                .sum()
        })
    }
}

//
// tests
//
