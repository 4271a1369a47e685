//! Least-squares coefficient fitting
//!
//! Solves min ||B · coeffs - values||² where B is the basis matrix evaluated
//! at the grid nodes. The solve goes through a truncation-checked SVD
//! pseudoinverse: exact when the square node matrix is well-conditioned,
//! least-squares otherwise. Naive inversion is never used.

use crate::approx::Approximant;
use crate::error::{Error, Result};
use crate::grid::GridBasis;
use nalgebra::{DMatrix, Dyn, SVD};
use std::sync::Arc;

/// Default relative tolerance for rank determination
pub const DEFAULT_RTOL: f64 = 1e-12;

/// Condition number above which an advisory diagnostic is emitted
const COND_WARN_THRESHOLD: f64 = 1e8;

/// Fits coefficient vectors (or matrices) against sampled values at the
/// grid nodes.
///
/// # Example
/// ```
/// use gridfit::{BasisFamily, DimensionSpec, Fitter, GridBasis};
/// use std::sync::Arc;
///
/// let basis = Arc::new(
///     GridBasis::build(
///         vec![DimensionSpec::uniform(0.0, 4.0, 5).unwrap()],
///         BasisFamily::Chebyshev,
///     )
///     .unwrap(),
/// );
/// let values: Vec<f64> = basis.nodes().iter().map(|p| p[0]).collect();
/// let approximant = Fitter::new().fit(&basis, &values).unwrap();
/// let y = approximant.evaluate_scalar(&[vec![2.5]]).unwrap();
/// assert!((y[0] - 2.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Fitter {
    rtol: f64,
}

impl Default for Fitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fitter {
    /// Create a fitter with the default singularity tolerance
    /// ([`DEFAULT_RTOL`]).
    pub fn new() -> Self {
        Self { rtol: DEFAULT_RTOL }
    }

    /// Create a fitter with a custom relative singularity tolerance.
    ///
    /// Singular values below `rtol * s_max` are treated as zero; if any
    /// fall below that threshold the basis matrix is considered
    /// rank-deficient and fitting fails with `SingularBasis`.
    pub fn with_tolerance(rtol: f64) -> Self {
        Self { rtol }
    }

    /// Relative singularity tolerance in use
    pub fn rtol(&self) -> f64 {
        self.rtol
    }

    /// Fit one target function from samples aligned with `basis.nodes()`.
    ///
    /// # Errors
    /// `DimensionMismatch` if `values.len() != basis.num_nodes()`;
    /// `SingularBasis` if the node basis matrix is rank-deficient beyond
    /// the tolerance.
    pub fn fit(&self, basis: &Arc<GridBasis>, values: &[f64]) -> Result<Approximant> {
        let values = DMatrix::from_column_slice(values.len(), 1, values);
        self.fit_multi(basis, &values)
    }

    /// Fit several target functions at once, one column per function.
    ///
    /// All columns share the node basis matrix and its SVD, so fitting k
    /// functions costs one decomposition plus k back-substitutions.
    ///
    /// # Errors
    /// Same as [`fit`](Self::fit), with the row count checked against the
    /// node count.
    pub fn fit_multi(&self, basis: &Arc<GridBasis>, values: &DMatrix<f64>) -> Result<Approximant> {
        let solver = NodeSolver::new(basis, self.rtol)?;
        let coefficients = solver.solve(values)?;
        Ok(Approximant::with_solver(
            Arc::clone(basis),
            coefficients,
            solver,
            self.rtol,
        ))
    }
}

/// SVD of the node basis matrix, retained for repeated solves
/// (coefficient refreshes against the same basis).
pub(crate) struct NodeSolver {
    svd: SVD<f64, Dyn, Dyn>,
    s_max: f64,
    rtol: f64,
    n_nodes: usize,
}

impl NodeSolver {
    /// Decompose the node basis matrix and check its numerical rank.
    ///
    /// # Errors
    /// `SingularBasis` if the numerical rank (singular values at or above
    /// `rtol * s_max`) is below the basis size.
    pub(crate) fn new(basis: &GridBasis, rtol: f64) -> Result<Self> {
        let matrix = basis.basis_matrix(basis.nodes())?;
        let n_nodes = matrix.nrows();
        let basis_size = matrix.ncols();

        let svd = matrix.svd(true, true);
        let s = &svd.singular_values;
        let s_max = s.iter().cloned().fold(0.0, f64::max);

        let rank = if s_max > 0.0 {
            s.iter().filter(|&&v| v >= rtol * s_max).count()
        } else {
            0
        };
        if rank < basis_size {
            return Err(Error::SingularBasis {
                rank,
                basis_size,
                rtol,
            });
        }

        let s_min = s.iter().cloned().fold(f64::INFINITY, f64::min);
        let condition = s_max / s_min;
        if condition > COND_WARN_THRESHOLD {
            tracing::warn!(condition, "node basis matrix is poorly conditioned");
        }

        Ok(Self {
            svd,
            s_max,
            rtol,
            n_nodes,
        })
    }

    /// Number of sample rows the solver expects
    pub(crate) fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Solve for coefficients: V · S⁻¹ · Uᵀ · values, one column per
    /// target function.
    ///
    /// # Errors
    /// `DimensionMismatch` if the row count differs from the node count.
    pub(crate) fn solve(&self, values: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if values.nrows() != self.n_nodes {
            return Err(Error::DimensionMismatch(format!(
                "sample matrix has {} rows, basis has {} nodes",
                values.nrows(),
                self.n_nodes
            )));
        }
        let coeffs = self
            .svd
            .solve(values, self.rtol * self.s_max)
            .expect("SVD factors missing");
        Ok(coeffs)
    }
}

#[cfg(test)]
#[path = "fitter_tests.rs"]
mod tests;
