use crate::approx::Approximant;
use crate::error::Error;
use crate::fitter::Fitter;
use crate::grid::{DimensionSpec, GridBasis};
use crate::univariate::BasisFamily;
use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;
use std::sync::Arc;

fn basis_1d(lo: f64, hi: f64, n: usize) -> Arc<GridBasis> {
    Arc::new(
        GridBasis::build(
            vec![DimensionSpec::uniform(lo, hi, n).unwrap()],
            BasisFamily::Chebyshev,
        )
        .unwrap(),
    )
}

fn sample<F: Fn(&[f64]) -> f64>(basis: &GridBasis, f: F) -> Vec<f64> {
    basis.nodes().iter().map(|p| f(p)).collect()
}

#[test]
fn test_construct_validates_coefficient_rows() {
    let basis = basis_1d(0.0, 1.0, 4);
    let wrong = DMatrix::from_element(3, 1, 0.0);
    assert!(matches!(
        Approximant::new(Arc::clone(&basis), wrong),
        Err(Error::DimensionMismatch(_))
    ));
    let right = DMatrix::from_element(4, 1, 0.0);
    assert!(Approximant::new(basis, right).is_ok());
}

#[test]
fn test_batch_matches_single_point_evaluation() {
    let basis = basis_1d(0.0, 3.0, 6);
    let values = sample(&basis, |p| p[0].exp());
    let approximant = Fitter::new().fit(&basis, &values).unwrap();

    let points = vec![vec![0.2], vec![1.7], vec![2.9]];
    let batch = approximant.evaluate(&points).unwrap();
    for (i, p) in points.iter().enumerate() {
        let single = approximant.evaluate_one(p).unwrap();
        assert_abs_diff_eq!(batch[(i, 0)], single[0], epsilon = 1e-14);
    }
}

#[test]
fn test_first_derivative_1d() {
    // f(x) = x^2 is exactly representable on 5 nodes, so f'(x) = 2x
    let basis = basis_1d(0.0, 2.0, 5);
    let values = sample(&basis, |p| p[0] * p[0]);
    let approximant = Fitter::new().fit(&basis, &values).unwrap();

    for &x in &[0.1, 0.7, 1.5, 2.0] {
        let d = approximant.evaluate_one_deriv(&[x], &[1]).unwrap();
        assert_abs_diff_eq!(d[0], 2.0 * x, epsilon = 1e-8);
    }
}

#[test]
fn test_mixed_partial_2d() {
    // f(x, y) = x * y, so d2f/dxdy = 1 everywhere
    let basis = Arc::new(
        GridBasis::build(
            vec![
                DimensionSpec::uniform(0.0, 2.0, 3).unwrap(),
                DimensionSpec::uniform(0.0, 2.0, 3).unwrap(),
            ],
            BasisFamily::Legendre,
        )
        .unwrap(),
    );
    let values = sample(&basis, |p| p[0] * p[1]);
    let approximant = Fitter::new().fit(&basis, &values).unwrap();

    let d = approximant.evaluate_one_deriv(&[0.8, 1.3], &[1, 1]).unwrap();
    assert_abs_diff_eq!(d[0], 1.0, epsilon = 1e-8);
}

#[test]
fn test_update_coefficients_replaces_fit() {
    let basis = basis_1d(0.0, 4.0, 5);
    let values = sample(&basis, |p| p[0]);
    let mut approximant = Fitter::new().fit(&basis, &values).unwrap();

    let nodes_before: Vec<Vec<f64>> = basis.nodes().to_vec();

    // Refresh against samples of x^2; representable on 5 nodes
    let new_values = sample(&basis, |p| p[0] * p[0]);
    approximant.update_coefficients(&new_values).unwrap();

    let y = approximant.evaluate_scalar(&[vec![2.5]]).unwrap();
    assert_abs_diff_eq!(y[0], 6.25, epsilon = 1e-8);

    // The basis and its node set are untouched
    assert_eq!(basis.nodes(), nodes_before.as_slice());
}

#[test]
fn test_update_rejects_wrong_length_and_keeps_old_coefficients() {
    let basis = basis_1d(0.0, 4.0, 5);
    let values = sample(&basis, |p| p[0]);
    let mut approximant = Fitter::new().fit(&basis, &values).unwrap();
    let coeffs_before = approximant.coefficients().clone();

    let result = approximant.update_coefficients(&[1.0, 2.0]);
    assert!(matches!(result, Err(Error::DimensionMismatch(_))));
    assert_eq!(approximant.coefficients(), &coeffs_before);
}

#[test]
fn test_update_after_plain_construction() {
    // Approximant::new does no solve; the node-matrix SVD is computed
    // lazily on the first refresh
    let basis = basis_1d(0.0, 1.0, 4);
    let zeros = DMatrix::from_element(4, 1, 0.0);
    let mut approximant = Approximant::new(Arc::clone(&basis), zeros).unwrap();

    let values = sample(&basis, |p| 2.0 * p[0] + 1.0);
    approximant.update_coefficients(&values).unwrap();
    let y = approximant.evaluate_scalar(&[vec![0.5]]).unwrap();
    assert_abs_diff_eq!(y[0], 2.0, epsilon = 1e-10);
}

#[test]
fn test_multiple_approximants_share_one_basis() {
    let basis = basis_1d(0.0, 1.0, 5);
    let f_values = sample(&basis, |p| p[0]);
    let g_values = sample(&basis, |p| 1.0 - p[0]);

    let fitter = Fitter::new();
    let f = fitter.fit(&basis, &f_values).unwrap();
    let g = fitter.fit(&basis, &g_values).unwrap();

    assert!(Arc::ptr_eq(f.basis(), g.basis()));
    let yf = f.evaluate_scalar(&[vec![0.3]]).unwrap();
    let yg = g.evaluate_scalar(&[vec![0.3]]).unwrap();
    assert_abs_diff_eq!(yf[0] + yg[0], 1.0, epsilon = 1e-10);
}

#[test]
fn test_evaluate_scalar_requires_single_column() {
    let basis = basis_1d(0.0, 1.0, 3);
    let values = DMatrix::from_element(3, 2, 1.0);
    let approximant = Fitter::new().fit_multi(&basis, &values).unwrap();
    assert!(matches!(
        approximant.evaluate_scalar(&[vec![0.5]]),
        Err(Error::DimensionMismatch(_))
    ));
}

#[test]
fn test_update_can_change_function_count() {
    let basis = basis_1d(0.0, 1.0, 4);
    let values = sample(&basis, |p| p[0]);
    let mut approximant = Fitter::new().fit(&basis, &values).unwrap();
    assert_eq!(approximant.n_functions(), 1);

    let two = DMatrix::from_fn(4, 2, |i, j| {
        let x = basis.nodes()[i][0];
        if j == 0 { x } else { -x }
    });
    approximant.update_coefficients_multi(&two).unwrap();
    assert_eq!(approximant.n_functions(), 2);

    let out = approximant.evaluate(&[vec![0.25]]).unwrap();
    assert_abs_diff_eq!(out[(0, 0)], 0.25, epsilon = 1e-10);
    assert_abs_diff_eq!(out[(0, 1)], -0.25, epsilon = 1e-10);
}
