//! ndarray ↔ nalgebra bridge
//!
//! Data and results live in ndarray; factorizations (SVD, Cholesky, LU) run
//! in nalgebra. Everything here takes and returns ndarray types.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray Array2 to a nalgebra DMatrix
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Convert an ndarray Array1 to a nalgebra DVector
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra DMatrix to an ndarray Array2
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    let (nrows, ncols) = m.shape();
    Array2::from_shape_fn((nrows, ncols), |(i, j)| m[(i, j)])
}

/// Convert a nalgebra DVector to an ndarray Array1
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    Array1::from_vec(v.as_slice().to_vec())
}

/// Numerical rank of a matrix from its singular values
#[derive(Debug, Clone)]
pub struct RankInfo {
    /// Number of singular values above the tolerance
    pub rank: usize,
    /// Ratio of the largest to the smallest singular value
    pub condition: f64,
    /// Tolerance used for the rank decision
    pub tolerance: f64,
}

/// Numerical rank with the default tolerance `s_max · max(n, p) · ε`
pub fn rank(x: &Array2<f64>) -> RankInfo {
    rank_with_tolerance(x, None)
}

/// Numerical rank with an explicit relative tolerance.
///
/// The relative tolerance multiplies the largest singular value.
pub fn rank_with_tolerance(x: &Array2<f64>, relative: Option<f64>) -> RankInfo {
    let (n, p) = x.dim();
    if n == 0 || p == 0 {
        return RankInfo {
            rank: 0,
            condition: f64::NAN,
            tolerance: 0.0,
        };
    }

    let svd = to_dmatrix(x).svd(false, false);
    let values = svd.singular_values;
    let s_max = values.iter().copied().fold(0.0_f64, f64::max);
    let s_min = values.iter().copied().fold(f64::INFINITY, f64::min);

    let tolerance = match relative {
        Some(rel) => s_max * rel,
        None => s_max * n.max(p) as f64 * f64::EPSILON,
    };
    let rank = values.iter().filter(|s| **s > tolerance).count();
    let condition = if s_min > 0.0 { s_max / s_min } else { f64::INFINITY };

    RankInfo {
        rank,
        condition,
        tolerance,
    }
}

/// Least-squares solution of `x β ≈ y` through the SVD
pub fn lstsq(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let svd = to_dmatrix(x).svd(true, true);
    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let eps = s_max * x.nrows().max(x.ncols()) as f64 * f64::EPSILON;

    svd.solve(&to_dvector(y), eps).ok().map(|b| to_array1(&b))
}

/// `(XᵀX)⁻¹`, trying Cholesky first and falling back to LU
pub fn xtx_inverse(x: &Array2<f64>) -> Option<Array2<f64>> {
    let xm = to_dmatrix(x);
    let xtx = xm.transpose() * &xm;

    if let Some(chol) = xtx.clone().cholesky() {
        return Some(to_array2(&chol.inverse()));
    }

    xtx.lu().try_inverse().map(|inv| to_array2(&inv))
}

/// Residuals of `v` after projecting out the columns of `x`
pub fn residualize(x: &Array2<f64>, v: &Array1<f64>) -> Option<Array1<f64>> {
    if x.ncols() == 0 {
        return Some(v.clone());
    }
    let beta = lstsq(x, v)?;
    Some(v - &x.dot(&beta))
}
