//! Error type shared by space construction, assembly and output.

/// Result type alias using [`GdError`].
pub type Result<T> = std::result::Result<T, GdError>;

/// Errors that can occur while building or using a Galerkin-Difference space.
///
/// Every variant aborts the operation that produced it.
/// In particular, a failed space construction never leaves
/// a partially assembled prolongation operator behind.
#[derive(thiserror::Error, Debug)]
pub enum GdError {
    /// The breadth-first patch search ran out of elements
    /// before reaching the required patch size
    /// (the mesh component containing the seed is too small).
    #[error("patch for element {seed} needs {required} elements but only {reached} are reachable")]
    PatchUnsatisfiable {
        /// Element the search started from.
        seed: usize,
        /// Minimum patch size requested.
        required: usize,
        /// Number of elements collected before the search stalled.
        reached: usize,
    },
    /// A least-squares fit or linear solve did not produce a solution.
    #[error("solver failure: {0}")]
    SolverFailure(String),
    /// Shapes of matrices, vectors or index sets are inconsistent.
    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },
    /// The element's value mapping convention is not supported by the operation.
    #[error("unsupported element map type {0:?}")]
    InvalidMapType(crate::element::MapType),
    /// A cut-cell scale outside `(0, J]` for the element's length `J`.
    #[error("invalid cut scale {scale} for element {element} of length {length}")]
    InvalidCutScale {
        /// Element being marked as cut.
        element: usize,
        /// Requested physical length.
        scale: f64,
        /// Physical length of the uncut element.
        length: f64,
    },
    /// A user-supplied parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Error writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
