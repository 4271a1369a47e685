//! Error types shared across basis construction, fitting, and evaluation

/// Error types for grid basis construction, fitting, and evaluation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed dimension specification at basis construction
    #[error("invalid dimension spec: {0}")]
    InvalidDimension(String),

    /// Point dimensionality or sample-vector length disagrees with the basis
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Basis matrix is rank-deficient beyond the fitter tolerance
    #[error(
        "basis matrix is singular: numerical rank {rank} < basis size {basis_size} (rtol={rtol:.1e})"
    )]
    SingularBasis {
        /// Numerical rank of the node basis matrix
        rank: usize,
        /// Number of basis functions
        basis_size: usize,
        /// Relative tolerance used for rank determination
        rtol: f64,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
