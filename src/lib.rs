//! # gridfit: tensor-product function approximation
//!
//! Builds structured interpolation grids, fits coefficient vectors against
//! sampled function values by a stable SVD least-squares solve, and
//! evaluates the approximation (including partial derivatives) at arbitrary
//! query points.
//!
//! The flow is: [`GridBasis`] produces nodes → the caller samples the target
//! function at those nodes → [`Fitter`] solves for coefficients →
//! [`Approximant`] wraps (basis, coefficients) for repeated evaluation.
//! Several approximants can share one read-only basis, and one fit call can
//! handle several target functions at once (one coefficient column each).

pub mod approx;
pub mod error;
pub mod fitter;
pub mod grid;
pub mod univariate; // Pluggable 1-D basis families

// Re-export commonly used types
pub use approx::Approximant;
pub use error::{Error, Result};
pub use fitter::{Fitter, DEFAULT_RTOL};
pub use grid::{DimensionSpec, GridBasis};
pub use univariate::{BasisFamily, Chebyshev, Legendre, Monomial, Univariate};
