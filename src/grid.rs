//! Tensor-product grid bases
//!
//! This module provides `DimensionSpec` for describing one input dimension
//! and `GridBasis` for the full tensor-product construction: node generation
//! in a fixed deterministic order and basis-matrix evaluation (with optional
//! per-dimension derivative orders) at arbitrary query points.

use crate::error::{Error, Result};
use crate::univariate::{BasisFamily, Univariate};
use nalgebra::DMatrix;
use rayon::prelude::*;

/// One input dimension: bounds plus a breakpoint sequence.
///
/// Immutable once constructed; both constructors validate so that no
/// malformed spec (and therefore no partial `GridBasis`) can exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSpec {
    lo: f64,
    hi: f64,
    breakpoints: Vec<f64>,
}

impl DimensionSpec {
    /// Create a dimension with `n` equally spaced breakpoints on [lo, hi],
    /// including both endpoints.
    ///
    /// # Errors
    /// `InvalidDimension` if `n < 2`, if the bounds are not finite, or if
    /// `lo >= hi`.
    pub fn uniform(lo: f64, hi: f64, n: usize) -> Result<Self> {
        check_bounds(lo, hi)?;
        if n < 2 {
            return Err(Error::InvalidDimension(format!(
                "need at least 2 nodes, got {}",
                n
            )));
        }
        let step = (hi - lo) / (n - 1) as f64;
        let breakpoints = (0..n).map(|i| lo + step * i as f64).collect();
        Ok(Self { lo, hi, breakpoints })
    }

    /// Create a dimension from explicit breakpoints on [lo, hi].
    ///
    /// # Errors
    /// `InvalidDimension` if fewer than 2 breakpoints are given, if the
    /// bounds are degenerate, or if the breakpoints are not strictly
    /// increasing within [lo, hi].
    pub fn with_breakpoints(lo: f64, hi: f64, breakpoints: Vec<f64>) -> Result<Self> {
        check_bounds(lo, hi)?;
        if breakpoints.len() < 2 {
            return Err(Error::InvalidDimension(format!(
                "need at least 2 nodes, got {}",
                breakpoints.len()
            )));
        }
        for pair in breakpoints.windows(2) {
            if !(pair[0] < pair[1]) {
                return Err(Error::InvalidDimension(format!(
                    "breakpoints must be strictly increasing, got {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        let first = breakpoints[0];
        let last = breakpoints[breakpoints.len() - 1];
        if first < lo || last > hi {
            return Err(Error::InvalidDimension(format!(
                "breakpoints [{}, {}] exceed bounds [{}, {}]",
                first, last, lo, hi
            )));
        }
        Ok(Self { lo, hi, breakpoints })
    }

    /// Lower bound of the dimension's domain
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Upper bound of the dimension's domain
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Breakpoint sequence (strictly increasing)
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Number of nodes this dimension contributes to the grid
    pub fn node_count(&self) -> usize {
        self.breakpoints.len()
    }
}

fn check_bounds(lo: f64, hi: f64) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(Error::InvalidDimension(format!(
            "bounds must be finite, got [{}, {}]",
            lo, hi
        )));
    }
    if lo >= hi {
        return Err(Error::InvalidDimension(format!(
            "lower bound {} must be below upper bound {}",
            lo, hi
        )));
    }
    Ok(())
}

/// Tensor-product grid basis
///
/// Owns an ordered sequence of [`DimensionSpec`]s and one univariate basis
/// per dimension (basis size per dimension equals that dimension's node
/// count, so the node basis matrix is square). The full node set is derived
/// eagerly at construction in row-major order with the **last dimension
/// varying fastest** and is never mutated afterwards, so `nodes()` is
/// reproducible across calls and the basis can be shared read-only across
/// threads.
pub struct GridBasis {
    specs: Vec<DimensionSpec>,
    family: BasisFamily,
    bases: Vec<Box<dyn Univariate>>,
    nodes: Vec<Vec<f64>>,
}

impl GridBasis {
    /// Build a tensor-product basis over the given dimensions.
    ///
    /// The same 1-D `family` is used for every dimension; each dimension
    /// gets as many basis functions as it has nodes.
    ///
    /// # Errors
    /// `InvalidDimension` if `specs` is empty. Per-dimension validation
    /// happens in the [`DimensionSpec`] constructors.
    pub fn build(specs: Vec<DimensionSpec>, family: BasisFamily) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::InvalidDimension(
                "at least one dimension is required".to_string(),
            ));
        }

        let bases: Vec<Box<dyn Univariate>> = specs
            .iter()
            .map(|s| family.make(s.node_count(), s.lo(), s.hi()))
            .collect();
        let nodes = tensor_nodes(&specs);

        Ok(Self {
            specs,
            family,
            bases,
            nodes,
        })
    }

    /// Number of input dimensions
    pub fn ndim(&self) -> usize {
        self.specs.len()
    }

    /// Dimension specifications, in order
    pub fn specs(&self) -> &[DimensionSpec] {
        &self.specs
    }

    /// 1-D basis family selected at construction
    pub fn family(&self) -> BasisFamily {
        self.family
    }

    /// Number of grid nodes (= product of per-dimension node counts)
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of basis functions (equals `num_nodes` for tensor grids)
    pub fn basis_size(&self) -> usize {
        self.nodes.len()
    }

    /// The tensor-product node set, row-major with the last dimension
    /// varying fastest. Stable across calls.
    pub fn nodes(&self) -> &[Vec<f64>] {
        &self.nodes
    }

    /// Evaluate every basis function at every query point.
    ///
    /// Returns a matrix of shape (n_points × basis size); entry (i, j) is
    /// basis function j at point i. Basis-function multi-indices are
    /// enumerated in the same row-major order as the nodes.
    ///
    /// # Errors
    /// `DimensionMismatch` if any point's dimensionality differs from
    /// `ndim()`.
    pub fn basis_matrix(&self, points: &[Vec<f64>]) -> Result<DMatrix<f64>> {
        let orders = vec![0; self.ndim()];
        self.basis_matrix_deriv(points, &orders)
    }

    /// Evaluate the requested partial derivative of every basis function at
    /// every query point.
    ///
    /// `orders[d]` is the derivative order applied along dimension `d`; the
    /// all-zero vector reproduces [`basis_matrix`](Self::basis_matrix).
    /// Rows are evaluated in parallel; the result is deterministic.
    ///
    /// # Errors
    /// `DimensionMismatch` if `orders.len() != ndim()` or if any point's
    /// dimensionality differs from `ndim()`.
    pub fn basis_matrix_deriv(
        &self,
        points: &[Vec<f64>],
        orders: &[usize],
    ) -> Result<DMatrix<f64>> {
        let ndim = self.ndim();
        if orders.len() != ndim {
            return Err(Error::DimensionMismatch(format!(
                "derivative orders have length {}, basis has {} dimensions",
                orders.len(),
                ndim
            )));
        }
        for (i, p) in points.iter().enumerate() {
            if p.len() != ndim {
                return Err(Error::DimensionMismatch(format!(
                    "point {} has {} coordinates, basis has {} dimensions",
                    i,
                    p.len(),
                    ndim
                )));
            }
        }

        let basis_size = self.basis_size();
        let rows: Vec<Vec<f64>> = points
            .par_iter()
            .map(|p| self.basis_row(p, orders))
            .collect();

        Ok(DMatrix::from_row_iterator(
            points.len(),
            basis_size,
            rows.into_iter().flatten(),
        ))
    }

    /// One row of the basis matrix: the tensor product of the per-dimension
    /// univariate evaluations, last dimension varying fastest.
    fn basis_row(&self, point: &[f64], orders: &[usize]) -> Vec<f64> {
        let mut row = vec![1.0];
        for (d, basis) in self.bases.iter().enumerate() {
            let vals = basis.eval_deriv(point[d], orders[d]);
            let mut next = Vec::with_capacity(row.len() * vals.len());
            for &r in &row {
                for &v in &vals {
                    next.push(r * v);
                }
            }
            row = next;
        }
        row
    }
}

/// Enumerate the tensor-product nodes in row-major order
/// (last dimension varies fastest).
fn tensor_nodes(specs: &[DimensionSpec]) -> Vec<Vec<f64>> {
    let total: usize = specs.iter().map(|s| s.node_count()).product();
    let ndim = specs.len();

    let mut nodes = Vec::with_capacity(total);
    let mut counters = vec![0usize; ndim];
    for _ in 0..total {
        let coord: Vec<f64> = counters
            .iter()
            .enumerate()
            .map(|(d, &i)| specs[d].breakpoints()[i])
            .collect();
        nodes.push(coord);

        for d in (0..ndim).rev() {
            counters[d] += 1;
            if counters[d] < specs[d].node_count() {
                break;
            }
            counters[d] = 0;
        }
    }
    nodes
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
