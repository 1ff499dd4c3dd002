//! Matrix utility functions.

use faer::{Col, Mat, MatRef};

/// Detect columns that are constant (zero variance).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; n_cols];
    }

    let mut constant = vec![false; n_cols];

    for j in 0..n_cols {
        let first = x[(0, j)];
        let all_same = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
        constant[j] = all_same;
    }

    constant
}

/// Index of the first column whose entries are all exactly 1.0.
pub fn ones_column_index(x: &Mat<f64>) -> Option<usize> {
    if x.nrows() == 0 {
        return None;
    }
    (0..x.ncols()).find(|&j| (0..x.nrows()).all(|i| x[(i, j)] == 1.0))
}

/// Build `[1 | X]`.
pub fn prepend_ones(x: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            x[(i, j - 1)]
        }
    })
}

/// Build `[A | B]` from two matrices with the same row count.
pub fn hstack(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let k_a = a.ncols();
    Mat::from_fn(a.nrows(), k_a + b.ncols(), |i, j| {
        if j < k_a {
            a[(i, j)]
        } else {
            b[(i, j - k_a)]
        }
    })
}

/// Copy the given columns, in the given order.
pub fn select_columns(x: &Mat<f64>, columns: &[usize]) -> Mat<f64> {
    Mat::from_fn(x.nrows(), columns.len(), |i, j| x[(i, columns[j])])
}

/// Copy a single column into a vector.
pub fn column(x: &Mat<f64>, j: usize) -> Col<f64> {
    Col::from_fn(x.nrows(), |i| x[(i, j)])
}

/// Scan columns left to right and keep those not spanned by earlier kept columns.
///
/// A column is dependent when the norm of its residual after projection onto the
/// kept columns is at most `tolerance` times its own norm. All-zero columns are
/// always dependent. Returns the indices of the independent columns.
pub fn independent_columns(x: &Mat<f64>, tolerance: f64) -> Vec<usize> {
    let n = x.nrows();
    let mut basis: Vec<Vec<f64>> = Vec::new();
    let mut independent = Vec::new();

    for j in 0..x.ncols() {
        let mut v: Vec<f64> = (0..n).map(|i| x[(i, j)]).collect();
        let original_norm = norm(&v);
        if original_norm == 0.0 || !original_norm.is_finite() {
            continue;
        }

        // Two passes of modified Gram-Schmidt keep the residual accurate.
        for _ in 0..2 {
            for q in &basis {
                let d = dot(q, &v);
                for (vi, qi) in v.iter_mut().zip(q.iter()) {
                    *vi -= d * qi;
                }
            }
        }

        let residual_norm = norm(&v);
        if residual_norm > tolerance * original_norm {
            for vi in v.iter_mut() {
                *vi /= residual_norm;
            }
            basis.push(v);
            independent.push(j);
        }
    }

    independent
}

/// Invert the leading `size × size` block of an upper triangular matrix.
///
/// Returns `None` if a diagonal element is zero.
pub fn invert_upper_triangular(r: MatRef<'_, f64>, size: usize) -> Option<Mat<f64>> {
    if (0..size).any(|i| r[(i, i)] == 0.0 || !r[(i, i)].is_finite()) {
        return None;
    }

    let mut inv = Mat::zeros(size, size);
    for col in 0..size {
        for i in (0..=col).rev() {
            let mut sum = if i == col { 1.0 } else { 0.0 };
            for j in (i + 1)..=col {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Some(inv)
}

/// Invert a square matrix using QR decomposition.
///
/// Returns `None` when the matrix is singular to working precision.
pub fn invert(a: &Mat<f64>) -> Option<Mat<f64>> {
    let size = a.nrows();
    if size == 0 || a.ncols() != size {
        return None;
    }

    let qr = a.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    let scale = (0..size).map(|i| r[(i, i)].abs()).fold(0.0_f64, f64::max);
    if (0..size).any(|i| r[(i, i)].abs() <= 1e-14 * scale.max(1e-300)) {
        return None;
    }

    // Solve R * X = Q' column by column
    let mut inv = Mat::zeros(size, size);
    let qt = q.transpose();

    for col in 0..size {
        for i in (0..size).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..size {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Some(inv)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}
