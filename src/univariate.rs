//! Pluggable 1-D basis families
//!
//! A multivariate tensor-product basis factors into independent univariate
//! bases, one per dimension. This module provides the univariate side: a
//! common trait plus the polynomial families selectable at grid construction.
//!
//! Every family is defined on a reference interval t ∈ [-1, 1] and mapped
//! affinely onto the dimension's domain [a, b]. Derivatives pick up the
//! chain-rule factor (2 / (b - a))^order from that map.

/// A univariate basis on a fixed domain [lo, hi].
///
/// Implementations evaluate all basis functions (or a requested derivative
/// order of them) at a single coordinate. Object-safe so that a `GridBasis`
/// can hold one boxed basis per dimension.
pub trait Univariate: Send + Sync {
    /// Number of basis functions
    fn size(&self) -> usize;

    /// Evaluate the `order`-th derivative of every basis function at `x`
    ///
    /// `order = 0` is plain evaluation. The returned vector has length
    /// `self.size()`.
    fn eval_deriv(&self, x: f64, order: usize) -> Vec<f64>;
}

/// Selects the 1-D basis family used for every dimension of a grid basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisFamily {
    /// Chebyshev polynomials of the first kind
    Chebyshev,
    /// Legendre polynomials
    Legendre,
    /// Scaled power basis t^j (Vandermonde fitting; ill-conditioned for
    /// large sizes, kept for small grids and as a reference family)
    Monomial,
}

impl BasisFamily {
    /// Construct a univariate basis of this family with `size` functions
    /// on the domain [lo, hi].
    pub(crate) fn make(&self, size: usize, lo: f64, hi: f64) -> Box<dyn Univariate> {
        match self {
            BasisFamily::Chebyshev => Box::new(Chebyshev { size, lo, hi }),
            BasisFamily::Legendre => Box::new(Legendre { size, lo, hi }),
            BasisFamily::Monomial => Box::new(Monomial { size, lo, hi }),
        }
    }
}

/// Map x ∈ [lo, hi] to the reference interval t ∈ [-1, 1].
///
/// Returns the mapped coordinate and the chain-rule scale dt/dx.
fn to_reference(x: f64, lo: f64, hi: f64) -> (f64, f64) {
    let scale = 2.0 / (hi - lo);
    ((2.0 * x - lo - hi) / (hi - lo), scale)
}

/// Chebyshev polynomials of the first kind T_0 .. T_{n-1}
///
/// Values and derivatives follow from differentiating the three-term
/// recurrence T_{j+1} = 2 t T_j - T_{j-1} term by term:
///
///   T_{j+1}^(k) = 2 (t T_j^(k) + k T_j^(k-1)) - T_{j-1}^(k)
#[derive(Debug, Clone)]
pub struct Chebyshev {
    size: usize,
    lo: f64,
    hi: f64,
}

impl Chebyshev {
    /// Create a Chebyshev basis with `size` functions on [lo, hi]
    pub fn new(size: usize, lo: f64, hi: f64) -> Self {
        Self { size, lo, hi }
    }
}

impl Univariate for Chebyshev {
    fn size(&self) -> usize {
        self.size
    }

    fn eval_deriv(&self, x: f64, order: usize) -> Vec<f64> {
        let (t, scale) = to_reference(x, self.lo, self.hi);
        let n = self.size;

        // vals[k][j] = d^k/dt^k T_j(t)
        let mut vals = vec![vec![0.0; n]; order + 1];
        vals[0][0] = 1.0;
        if n > 1 {
            vals[0][1] = t;
            if order >= 1 {
                vals[1][1] = 1.0;
            }
        }
        for j in 2..n {
            for k in 0..=order {
                let lower = if k > 0 { k as f64 * vals[k - 1][j - 1] } else { 0.0 };
                vals[k][j] = 2.0 * (t * vals[k][j - 1] + lower) - vals[k][j - 2];
            }
        }

        let factor = scale.powi(order as i32);
        vals[order].iter().map(|&v| v * factor).collect()
    }
}

/// Legendre polynomials P_0 .. P_{n-1}
///
/// Same scheme as [`Chebyshev`], applied to Bonnet's recurrence
/// (j+1) P_{j+1} = (2j+1) t P_j - j P_{j-1}.
#[derive(Debug, Clone)]
pub struct Legendre {
    size: usize,
    lo: f64,
    hi: f64,
}

impl Legendre {
    /// Create a Legendre basis with `size` functions on [lo, hi]
    pub fn new(size: usize, lo: f64, hi: f64) -> Self {
        Self { size, lo, hi }
    }
}

impl Univariate for Legendre {
    fn size(&self) -> usize {
        self.size
    }

    fn eval_deriv(&self, x: f64, order: usize) -> Vec<f64> {
        let (t, scale) = to_reference(x, self.lo, self.hi);
        let n = self.size;

        let mut vals = vec![vec![0.0; n]; order + 1];
        vals[0][0] = 1.0;
        if n > 1 {
            vals[0][1] = t;
            if order >= 1 {
                vals[1][1] = 1.0;
            }
        }
        for j in 2..n {
            let jf = j as f64;
            for k in 0..=order {
                let lower = if k > 0 { k as f64 * vals[k - 1][j - 1] } else { 0.0 };
                vals[k][j] =
                    ((2.0 * jf - 1.0) * (t * vals[k][j - 1] + lower) - (jf - 1.0) * vals[k][j - 2])
                        / jf;
            }
        }

        let factor = scale.powi(order as i32);
        vals[order].iter().map(|&v| v * factor).collect()
    }
}

/// Scaled power basis t^0 .. t^{n-1} on the mapped reference interval
#[derive(Debug, Clone)]
pub struct Monomial {
    size: usize,
    lo: f64,
    hi: f64,
}

impl Monomial {
    /// Create a monomial basis with `size` functions on [lo, hi]
    pub fn new(size: usize, lo: f64, hi: f64) -> Self {
        Self { size, lo, hi }
    }
}

impl Univariate for Monomial {
    fn size(&self) -> usize {
        self.size
    }

    fn eval_deriv(&self, x: f64, order: usize) -> Vec<f64> {
        let (t, scale) = to_reference(x, self.lo, self.hi);
        let factor = scale.powi(order as i32);

        (0..self.size)
            .map(|j| {
                if j < order {
                    return 0.0;
                }
                // j! / (j - order)!
                let falling: f64 = (j - order + 1..=j).map(|m| m as f64).product();
                falling * t.powi((j - order) as i32) * factor
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn chebyshev_matches_closed_form() {
        let basis = Chebyshev::new(5, -1.0, 1.0);
        for &t in &[-0.9, -0.3, 0.0, 0.5, 1.0] {
            let v = basis.eval_deriv(t, 0);
            assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-14);
            assert_abs_diff_eq!(v[1], t, epsilon = 1e-14);
            assert_abs_diff_eq!(v[2], 2.0 * t * t - 1.0, epsilon = 1e-14);
            assert_abs_diff_eq!(v[3], 4.0 * t * t * t - 3.0 * t, epsilon = 1e-13);
            assert_abs_diff_eq!(v[4], 8.0 * t.powi(4) - 8.0 * t * t + 1.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn chebyshev_first_derivative() {
        let basis = Chebyshev::new(4, -1.0, 1.0);
        for &t in &[-0.7, 0.1, 0.6] {
            let d = basis.eval_deriv(t, 1);
            assert_abs_diff_eq!(d[0], 0.0, epsilon = 1e-14);
            assert_abs_diff_eq!(d[1], 1.0, epsilon = 1e-14);
            assert_abs_diff_eq!(d[2], 4.0 * t, epsilon = 1e-13);
            assert_abs_diff_eq!(d[3], 12.0 * t * t - 3.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn chebyshev_domain_map_scales_derivatives() {
        // On [0, 4], T_1(x) = (x - 2) / 2, so dT_1/dx = 0.5 everywhere
        let basis = Chebyshev::new(2, 0.0, 4.0);
        let v = basis.eval_deriv(3.0, 0);
        assert_abs_diff_eq!(v[1], 0.5, epsilon = 1e-14);
        let d = basis.eval_deriv(3.0, 1);
        assert_abs_diff_eq!(d[1], 0.5, epsilon = 1e-14);
    }

    #[test]
    fn legendre_matches_closed_form() {
        let basis = Legendre::new(4, -1.0, 1.0);
        for &t in &[-0.8, 0.0, 0.25, 1.0] {
            let v = basis.eval_deriv(t, 0);
            assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-14);
            assert_abs_diff_eq!(v[1], t, epsilon = 1e-14);
            assert_abs_diff_eq!(v[2], 0.5 * (3.0 * t * t - 1.0), epsilon = 1e-14);
            assert_abs_diff_eq!(v[3], 0.5 * (5.0 * t * t * t - 3.0 * t), epsilon = 1e-13);
        }
    }

    #[test]
    fn legendre_second_derivative() {
        // P_3''(t) = 15 t
        let basis = Legendre::new(4, -1.0, 1.0);
        let d2 = basis.eval_deriv(0.4, 2);
        assert_abs_diff_eq!(d2[3], 15.0 * 0.4, epsilon = 1e-12);
    }

    #[test]
    fn monomial_derivatives() {
        let basis = Monomial::new(4, -1.0, 1.0);
        let t = 0.3;
        let d1 = basis.eval_deriv(t, 1);
        assert_abs_diff_eq!(d1[0], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d1[1], 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d1[2], 2.0 * t, epsilon = 1e-14);
        assert_abs_diff_eq!(d1[3], 3.0 * t * t, epsilon = 1e-14);

        let d2 = basis.eval_deriv(t, 2);
        assert_abs_diff_eq!(d2[2], 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d2[3], 6.0 * t, epsilon = 1e-13);
    }

    #[test]
    fn high_order_derivative_of_low_degree_is_zero() {
        for family in [BasisFamily::Chebyshev, BasisFamily::Legendre, BasisFamily::Monomial] {
            let basis = family.make(3, -1.0, 1.0);
            let d = basis.eval_deriv(0.5, 5);
            for &v in &d {
                assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12);
            }
        }
    }
}
