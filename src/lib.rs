//! Galerkin-Difference finite element spaces in one dimension,
//! with support for cut cells.
//!
//! A [`GalerkinDifference`] space stores one value per element
//! and maps it to the coefficients of a discontinuous [`DgSpace`]
//! through a sparse [`Prolongation`] operator
//! built from least-squares polynomial fits over neighbor patches.
//! Forms are assembled on the dense space with the integrators in [`assembly`]
//! and reduced to the compact unknowns as `Pᵀ A P`.
//!
//! Elements marked as cut cells on the [`SegmentMesh`]
//! only represent part of their length;
//! every integral over them goes through [`cut_cell::CutCellMapper`].
//!
//! See [`advection`] for a complete example solving `a u' = f`.

#![warn(missing_docs)]

pub mod error;
#[doc(inline)]
pub use error::{GdError, Result};

pub mod mesh;
#[doc(inline)]
pub use mesh::{ElementAdjacency, Face, SegmentMesh};

pub mod gmsh;

pub mod quadrature;

pub mod element;
#[doc(inline)]
pub use element::{FiniteElement, Geometry, MapType};

pub mod cut_cell;

pub mod space;
#[doc(inline)]
pub use space::DgSpace;

pub mod field;
#[doc(inline)]
pub use field::{CenterField, GridFunction};

pub mod operator;
#[doc(inline)]
pub use operator::{Operator, OperatorInput, Prolongation};

pub mod gd;
#[doc(inline)]
pub use gd::{GalerkinDifference, GdParams};

pub mod assembly;

pub mod linsolve;

pub mod io;

pub mod advection;

// re-exports of the linear algebra crates for convenience

pub use nalgebra as na;
pub use nalgebra_sparse as nas;
