//! Dense linear solvers for the ridge fit

use ndarray::{Array1, Array2};

/// Solve the symmetric positive-definite system `a x = b` using Cholesky
/// decomposition. Returns `None` if the matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve the ridge normal equations `(X^T X + alpha * D) w = X^T y`, where
/// `D` is the identity with a zero in the intercept position so the bias
/// term is unpenalized.
///
/// Near-singular systems get an extra diagonal jitter and one retry.
pub fn ridge_solve(
    x: &Array2<f64>,
    y: &Array1<f64>,
    alpha: f64,
    intercept_col: usize,
) -> Option<Array1<f64>> {
    let p = x.ncols();
    let mut xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    for j in 0..p {
        if j != intercept_col {
            xtx[[j, j]] += alpha;
        }
    }

    if let Some(w) = cholesky_solve(&xtx, &xty) {
        return Some(w);
    }

    // Not positive definite: add jitter scaled to the diagonal and retry once
    let jitter = 1e-8 * xtx.diag().iter().map(|v| v.abs()).sum::<f64>().max(1.0) / p as f64;
    for j in 0..p {
        xtx[[j, j]] += jitter;
    }
    cholesky_solve(&xtx, &xty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ridge_solve_recovers_line() {
        // y = 2 + 3x, exactly determined
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![2.0, 5.0, 8.0, 11.0];
        let w = ridge_solve(&x, &y, 1e-9, 0).unwrap();
        assert!((w[0] - 2.0).abs() < 1e-4);
        assert!((w[1] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_ridge_solve_underdetermined() {
        // More columns than rows: regularization makes the system solvable
        let x = array![[1.0, 1.0, 0.5], [1.0, 2.0, 1.5]];
        let y = array![1.0, 2.0];
        let w = ridge_solve(&x, &y, 0.1, 0).unwrap();
        assert_eq!(w.len(), 3);
        assert!(w.iter().all(|v| v.is_finite()));
    }
}
