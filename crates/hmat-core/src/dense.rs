//! Dense kernel adapter.
//!
//! Wraps `faer::Mat<f64>` and exposes exactly the five operations spec'd as
//! the engine's BLAS/LAPACK collaborator: GEMM, GETRF (partial-pivoted LU),
//! TRTRS (triangular solve), QR, and thin SVD. Nothing above this module
//! touches `faer` directly.
//!
//! Pivots are 0-based row indices everywhere, matching `faer` and Rust slice
//! indexing. The `P₂₂ + m₁` composition in the LU recursion (§4.6) uses this
//! convention directly.

use crate::error::{HMatError, Result};
use faer::linalg::triangular_solve as tri;
use faer::{Mat, Par};

/// A dense, column-major, double-precision matrix block.
#[derive(Debug, Clone)]
pub struct DMat {
    inner: Mat<f64>,
}

impl DMat {
    /// An `m x n` zero matrix.
    pub fn zeros(m: usize, n: usize) -> Self {
        Self {
            inner: Mat::zeros(m, n),
        }
    }

    /// Wraps an existing `faer` matrix.
    pub fn from_faer(inner: Mat<f64>) -> Self {
        Self { inner }
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self {
            inner: Mat::identity(n, n),
        }
    }

    /// Builds a matrix by evaluating `f(i, j)` at every entry.
    pub fn from_fn(m: usize, n: usize, f: impl FnMut(usize, usize) -> f64) -> Self {
        Self {
            inner: Mat::from_fn(m, n, f),
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    /// `(nrows, ncols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }

    /// Entry `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.inner[(i, j)]
    }

    /// Sets entry `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.inner[(i, j)] = v;
    }

    /// Read-only view of the underlying `faer` matrix.
    pub fn as_faer(&self) -> faer::MatRef<'_, f64> {
        self.inner.as_ref()
    }

    /// Mutable view of the underlying `faer` matrix.
    pub fn as_faer_mut(&mut self) -> faer::MatMut<'_, f64> {
        self.inner.as_mut()
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.inner.norm_l2()
    }

    /// Extracts the `nrows x ncols` sub-block starting at `(row, col)`.
    pub fn submatrix(&self, row: usize, col: usize, nrows: usize, ncols: usize) -> DMat {
        DMat::from_fn(nrows, ncols, |i, j| self.inner[(row + i, col + j)])
    }

    /// Transpose, materialized into a fresh matrix.
    pub fn transposed(&self) -> DMat {
        DMat::from_fn(self.ncols(), self.nrows(), |i, j| self.inner[(j, i)])
    }

    /// `self[p, :]`: selects rows of `self` in the order given by `p`.
    pub fn permuted_rows(&self, p: &[usize]) -> DMat {
        DMat::from_fn(self.nrows(), self.ncols(), |i, j| self.inner[(p[i], j)])
    }

    /// `self + scalar * other`, element-wise. Shapes must match.
    pub fn add_scaled(&self, other: &DMat, scalar: f64) -> DMat {
        DMat::from_fn(self.nrows(), self.ncols(), |i, j| {
            self.inner[(i, j)] + scalar * other.inner[(i, j)]
        })
    }

    /// Horizontally concatenates `[self | other]`.
    pub fn hstack(&self, other: &DMat) -> DMat {
        let (m, n1, n2) = (self.nrows(), self.ncols(), other.ncols());
        DMat::from_fn(m, n1 + n2, |i, j| {
            if j < n1 {
                self.inner[(i, j)]
            } else {
                other.inner[(i, j - n1)]
            }
        })
    }

    /// Scales every entry by `s`.
    pub fn scaled(&self, s: f64) -> DMat {
        DMat::from_fn(self.nrows(), self.ncols(), |i, j| s * self.inner[(i, j)])
    }
}

/// `c <- alpha * a * b + beta * c`, column-major, `f64`.
pub fn gemm(alpha: f64, a: &DMat, b: &DMat, beta: f64, c: &mut DMat) {
    let product = a.as_faer() * b.as_faer();
    for i in 0..c.nrows() {
        for j in 0..c.ncols() {
            let updated = beta * c.get(i, j) + alpha * product[(i, j)];
            c.set(i, j, updated);
        }
    }
}

/// Partial-pivoted LU. Overwrites `c` with the packed `L` (strictly below
/// the diagonal) / `U` (on and above the diagonal) factors and returns the
/// 0-based row permutation `P` such that `P . c_original = L . U`.
pub fn getrf(c: &mut DMat) -> Result<Vec<usize>> {
    let lu = c.as_faer().partial_piv_lu();
    let l = lu.L();
    let u = lu.U();

    let k = c.nrows().min(c.ncols());
    for i in 0..k {
        let pivot = u[(i, i)];
        if pivot.abs() < f64::EPSILON {
            return Err(HMatError::NumericalDegeneracy(format!(
                "zero pivot at row {i}"
            )));
        }
    }

    let packed = DMat::from_fn(c.nrows(), c.ncols(), |i, j| {
        if i > j {
            l[(i, j)]
        } else {
            u[(i, j)]
        }
    });
    *c = packed;

    let perm = lu.row_permutation();
    let (fwd, _inv) = perm.arrays();
    Ok(fwd.to_vec())
}

/// Solves the triangular system indicated by `(lower, unit_diag)`,
/// overwriting `b` with the solution of `a . X = b`.
pub fn trtrs(lower: bool, unit_diag: bool, a: &DMat, b: &mut DMat) {
    let par = Par::Seq;
    match (lower, unit_diag) {
        (true, true) => tri::solve_unit_lower_triangular_in_place(a.as_faer(), b.as_faer_mut(), par),
        (true, false) => tri::solve_lower_triangular_in_place(a.as_faer(), b.as_faer_mut(), par),
        (false, true) => tri::solve_unit_upper_triangular_in_place(a.as_faer(), b.as_faer_mut(), par),
        (false, false) => tri::solve_upper_triangular_in_place(a.as_faer(), b.as_faer_mut(), par),
    }
}

/// Thin QR factorization `A = Q R`.
pub fn qr(a: &DMat) -> (DMat, DMat) {
    let decomp = a.as_faer().qr();
    let q = DMat::from_faer(decomp.compute_thin_Q());
    let r = DMat::from_faer(decomp.compute_thin_R());
    (q, r)
}

/// Thin SVD `A = U diag(sigma) V^T`, singular values in non-increasing
/// order.
pub fn svd(a: &DMat) -> (DMat, Vec<f64>, DMat) {
    let decomp = a.as_faer().thin_svd();
    let u = DMat::from_faer(decomp.U().to_owned());
    let v = DMat::from_faer(decomp.V().to_owned());
    let s = decomp.S();
    let sigma: Vec<f64> = (0..s.nrows().min(s.ncols())).map(|i| s[(i, i)]).collect();
    (u, sigma, v)
}
