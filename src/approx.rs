//! Fitted approximants
//!
//! An [`Approximant`] pairs a shared, read-only [`GridBasis`] with a
//! coefficient matrix (one column per target function) and evaluates the
//! approximation, or its partial derivatives, at arbitrary query points.
//! Several approximants may share one basis through `Arc`.

use crate::error::{Error, Result};
use crate::fitter::NodeSolver;
use crate::grid::GridBasis;
use nalgebra::DMatrix;
use std::cell::RefCell;
use std::sync::Arc;

/// A fitted function approximation: shared basis plus owned coefficients.
///
/// Evaluation computes `basis_matrix(points, orders) · coefficients`.
/// Coefficients may be replaced in place via
/// [`update_coefficients`](Self::update_coefficients) without rebuilding
/// the basis; the node-matrix SVD needed for that refresh is computed
/// lazily on first use and cached.
pub struct Approximant {
    basis: Arc<GridBasis>,
    coefficients: DMatrix<f64>,
    solver: RefCell<Option<NodeSolver>>,
    rtol: f64,
}

impl Approximant {
    /// Wrap a basis and a pre-computed coefficient matrix. O(1); nothing is
    /// recomputed.
    ///
    /// Each column of `coefficients` is one target function.
    ///
    /// # Errors
    /// `DimensionMismatch` if the coefficient row count differs from the
    /// basis size.
    pub fn new(basis: Arc<GridBasis>, coefficients: DMatrix<f64>) -> Result<Self> {
        if coefficients.nrows() != basis.basis_size() {
            return Err(Error::DimensionMismatch(format!(
                "coefficient matrix has {} rows, basis has {} functions",
                coefficients.nrows(),
                basis.basis_size()
            )));
        }
        Ok(Self {
            basis,
            coefficients,
            solver: RefCell::new(None),
            rtol: crate::fitter::DEFAULT_RTOL,
        })
    }

    /// Internal constructor used by the fitter, carrying the already
    /// computed node-matrix SVD so coefficient refreshes reuse it.
    pub(crate) fn with_solver(
        basis: Arc<GridBasis>,
        coefficients: DMatrix<f64>,
        solver: NodeSolver,
        rtol: f64,
    ) -> Self {
        Self {
            basis,
            coefficients,
            solver: RefCell::new(Some(solver)),
            rtol,
        }
    }

    /// The shared grid basis
    pub fn basis(&self) -> &Arc<GridBasis> {
        &self.basis
    }

    /// The fitted coefficients, shape (basis size × n_functions)
    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    /// Number of target functions represented by the coefficient columns
    pub fn n_functions(&self) -> usize {
        self.coefficients.ncols()
    }

    /// Evaluate the approximation at each query point.
    ///
    /// Returns a matrix of shape (n_points × n_functions). Batch evaluation
    /// agrees element-wise with repeated single-point evaluation.
    ///
    /// # Errors
    /// `DimensionMismatch` if any point's dimensionality differs from the
    /// basis's dimension count.
    pub fn evaluate(&self, points: &[Vec<f64>]) -> Result<DMatrix<f64>> {
        let orders = vec![0; self.basis.ndim()];
        self.evaluate_deriv(points, &orders)
    }

    /// Evaluate the requested partial derivative of the approximation at
    /// each query point.
    ///
    /// `orders[d]` is the derivative order applied along dimension `d`.
    pub fn evaluate_deriv(&self, points: &[Vec<f64>], orders: &[usize]) -> Result<DMatrix<f64>> {
        let matrix = self.basis.basis_matrix_deriv(points, orders)?;
        Ok(matrix * &self.coefficients)
    }

    /// Evaluate at a single point, returning one value per target function.
    pub fn evaluate_one(&self, point: &[f64]) -> Result<Vec<f64>> {
        let orders = vec![0; self.basis.ndim()];
        self.evaluate_one_deriv(point, &orders)
    }

    /// Evaluate a partial derivative at a single point, returning one value
    /// per target function.
    pub fn evaluate_one_deriv(&self, point: &[f64], orders: &[usize]) -> Result<Vec<f64>> {
        let values = self.evaluate_deriv(&[point.to_vec()], orders)?;
        Ok(values.row(0).iter().cloned().collect())
    }

    /// Evaluate a single-function approximant at each query point.
    ///
    /// Convenience for the common one-column case.
    ///
    /// # Errors
    /// `DimensionMismatch` if this approximant holds more than one
    /// coefficient column.
    pub fn evaluate_scalar(&self, points: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.n_functions() != 1 {
            return Err(Error::DimensionMismatch(format!(
                "evaluate_scalar requires 1 coefficient column, approximant has {}",
                self.n_functions()
            )));
        }
        let values = self.evaluate(points)?;
        Ok(values.column(0).iter().cloned().collect())
    }

    /// Re-fit the coefficients against new samples at the existing nodes.
    ///
    /// The basis, node set, and basis-matrix structure are unchanged; only
    /// the stored coefficients are replaced, and only after the solve
    /// succeeds (no partial update on failure).
    ///
    /// # Errors
    /// `DimensionMismatch` if `values.len()` differs from the node count;
    /// `SingularBasis` if the lazily computed node-matrix SVD is
    /// rank-deficient.
    pub fn update_coefficients(&mut self, values: &[f64]) -> Result<()> {
        let values = DMatrix::from_column_slice(values.len(), 1, values);
        self.update_coefficients_multi(&values)
    }

    /// Multi-function variant of
    /// [`update_coefficients`](Self::update_coefficients); one column per
    /// target function. The number of columns may differ from the current
    /// coefficient matrix as long as the row count matches the node count.
    pub fn update_coefficients_multi(&mut self, values: &DMatrix<f64>) -> Result<()> {
        if values.nrows() != self.basis.num_nodes() {
            return Err(Error::DimensionMismatch(format!(
                "sample matrix has {} rows, basis has {} nodes",
                values.nrows(),
                self.basis.num_nodes()
            )));
        }

        if self.solver.borrow().is_none() {
            let solver = NodeSolver::new(&self.basis, self.rtol)?;
            *self.solver.borrow_mut() = Some(solver);
        }

        let coefficients = {
            let solver = self.solver.borrow();
            let solver = solver.as_ref().expect("solver cached above");
            debug_assert_eq!(solver.n_nodes(), self.basis.num_nodes());
            solver.solve(values)?
        };
        self.coefficients = coefficients;
        Ok(())
    }
}

#[cfg(test)]
#[path = "approx_tests.rs"]
mod tests;
