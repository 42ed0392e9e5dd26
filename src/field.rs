//! Values attached to a mesh:
//! dense per-node fields ([`GridFunction`])
//! and compact per-element center values ([`CenterField`]).

use nalgebra as na;

use crate::cut_cell::MappedPoint;
use crate::element::MapType;
use crate::error::{GdError, Result};
use crate::quadrature::IntegrationRule;
use crate::space::DgSpace;

/// Values of a field at the nodes of a [`DgSpace`].
#[derive(Clone)]
pub struct GridFunction {
    /// The underlying vector of real values, exposed for convenience.
    ///
    /// Changing the length of this vector
    /// will cause dimension mismatches with operators and spaces.
    pub values: na::DVector<f64>,
}

/// Compact degrees of freedom of a Galerkin-Difference space:
/// `vdim` values per element, stored at `vdim * element + component`.
///
/// These are mapped to a [`GridFunction`] by a
/// [`Prolongation`][crate::operator::Prolongation].
#[derive(Clone)]
pub struct CenterField {
    /// The underlying vector of real values, exposed for convenience.
    pub values: na::DVector<f64>,
}

impl GridFunction {
    #[inline]
    pub(crate) fn from_values(values: na::DVector<f64>) -> Self {
        Self { values }
    }

    /// A field of zeros on the given space.
    pub fn zeros(space: &DgSpace) -> Self {
        Self::from_values(na::DVector::zeros(space.vsize()))
    }

    /// Evaluate the first component of the field at remapped points of an element.
    pub fn values_at(&self, space: &DgSpace, element: usize, points: &[MappedPoint]) -> Vec<f64> {
        let local: na::DVector<f64> = na::DVector::from_iterator(
            space.fe().dof_count(),
            space.element_dofs(element, 0).iter().map(|&i| self.values[i]),
        );
        points
            .iter()
            .map(|p| space.fe().shape(p.reference).dot(&local))
            .collect()
    }

    /// Weighted L2 norm of the difference between the first component
    /// and an exact solution.
    ///
    /// Cut cells are integrated only over the length they represent.
    /// Only [`MapType::Value`] elements are supported,
    /// since the nodal values are compared to point values directly.
    pub fn l2_error(&self, space: &DgSpace, exact: impl Fn(f64) -> f64) -> Result<f64> {
        if space.fe().map_type() != MapType::Value {
            return Err(GdError::InvalidMapType(space.fe().map_type()));
        }
        if self.values.len() != space.vsize() {
            return Err(GdError::DimensionMismatch {
                what: "grid function length",
                expected: space.vsize(),
                actual: self.values.len(),
            });
        }

        let rule = IntegrationRule::for_order(2 * space.fe().order() + 1);
        let mapper = space.mapper();
        let mut error = 0.;
        for element in 0..space.mesh().element_count() {
            let points = mapper.map_rule(element, &rule);
            let approx = self.values_at(space, element, &points);
            for (p, u_h) in points.iter().zip(approx) {
                let diff = u_h - exact(mapper.physical(element, p));
                error += p.weight * diff * diff;
            }
        }
        Ok(error.sqrt())
    }
}

impl CenterField {
    #[inline]
    pub(crate) fn from_values(values: na::DVector<f64>) -> Self {
        Self { values }
    }

    /// A field of zeros with `vdim` values for each element of the space's mesh.
    pub fn zeros(space: &DgSpace) -> Self {
        Self::from_values(na::DVector::zeros(
            space.mesh().element_count() * space.vdim(),
        ))
    }

    /// Set every value to `value`.
    pub fn fill(&mut self, value: f64) {
        self.values.fill(value);
    }

    /// Replace the values with a vector of the same length.
    pub fn assign(&mut self, values: na::DVector<f64>) -> Result<()> {
        if values.len() != self.values.len() {
            return Err(GdError::DimensionMismatch {
                what: "center field length",
                expected: self.values.len(),
                actual: values.len(),
            });
        }
        self.values = values;
        Ok(())
    }

    /// Values of all components of one element.
    pub fn element_values(&self, element: usize, vdim: usize) -> &[f64] {
        &self.values.as_slice()[element * vdim..(element + 1) * vdim]
    }

    /// Set the values by evaluating a vector-valued function at element centroids.
    ///
    /// If the space's element uses [`MapType::Integral`],
    /// values are scaled by the element's Jacobian weight.
    pub fn project(
        &mut self,
        space: &DgSpace,
        f: impl Fn(f64) -> na::DVector<f64>,
    ) -> Result<()> {
        let vdim = space.vdim();
        let mesh = space.mesh();
        let expected_len = mesh.element_count() * vdim;
        if self.values.len() != expected_len {
            return Err(GdError::DimensionMismatch {
                what: "center field length",
                expected: expected_len,
                actual: self.values.len(),
            });
        }

        for element in 0..mesh.element_count() {
            let mut vals = f(mesh.centroid(element));
            if vals.len() != vdim {
                return Err(GdError::DimensionMismatch {
                    what: "projected function components",
                    expected: vdim,
                    actual: vals.len(),
                });
            }
            match space.fe().map_type() {
                MapType::Value => {}
                MapType::Integral => vals *= mesh.jacobian(element),
            }
            self.values
                .rows_mut(element * vdim, vdim)
                .copy_from(&vals);
        }
        Ok(())
    }

    /// Set every component to a scalar function evaluated at element centroids.
    ///
    /// ```
    /// # use gdspace::{CenterField, DgSpace, FiniteElement, SegmentMesh};
    /// let mesh = SegmentMesh::uniform(4, 1.0).unwrap();
    /// let space = DgSpace::new(mesh, FiniteElement::new(1), 1).unwrap();
    /// let mut centers = CenterField::zeros(&space);
    /// centers.project_scalar(&space, |x| 2. * x).unwrap();
    /// assert_eq!(centers.values[0], 0.25);
    /// ```
    pub fn project_scalar(&mut self, space: &DgSpace, f: impl Fn(f64) -> f64) -> Result<()> {
        let vdim = space.vdim();
        self.project(space, |x| na::DVector::from_element(vdim, f(x)))
    }
}

impl crate::operator::OperatorInput for GridFunction {
    fn values(&self) -> &na::DVector<f64> {
        &self.values
    }

    fn from_values(values: na::DVector<f64>) -> Self {
        GridFunction::from_values(values)
    }
}

impl crate::operator::OperatorInput for CenterField {
    fn values(&self) -> &na::DVector<f64> {
        &self.values
    }

    fn from_values(values: na::DVector<f64>) -> Self {
        CenterField::from_values(values)
    }
}

//
// std trait impls for math ops and such
//

// both field types are thin wrappers around a vector
// and get the same set of impls
macro_rules! impl_field_ops {
    ($field:ident) => {
        impl std::fmt::Debug for $field {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}, values {:?}", stringify!($field), self.values.as_slice())
            }
        }

        impl PartialEq for $field {
            fn eq(&self, other: &Self) -> bool {
                self.values == other.values
            }
        }

        impl std::ops::Add for $field {
            type Output = Self;

            fn add(self, rhs: Self) -> Self::Output {
                $field::from_values(self.values + rhs.values)
            }
        }

        impl std::ops::AddAssign for $field {
            fn add_assign(&mut self, rhs: Self) {
                self.values += rhs.values;
            }
        }

        impl std::ops::Sub for &$field {
            type Output = $field;

            fn sub(self, rhs: Self) -> Self::Output {
                $field::from_values(&self.values - &rhs.values)
            }
        }

        impl std::ops::Mul<$field> for f64 {
            type Output = $field;

            fn mul(self, rhs: $field) -> Self::Output {
                $field::from_values(self * rhs.values)
            }
        }

        impl std::ops::Mul<&$field> for f64 {
            type Output = $field;

            fn mul(self, rhs: &$field) -> Self::Output {
                $field::from_values(self * &rhs.values)
            }
        }
    };
}

impl_field_ops!(GridFunction);
impl_field_ops!(CenterField);

//
// tests
//
