//! Rank-truncation core: SVD-based compression and rounded low-rank
//! addition (§4.1).

use crate::config::{RankCap, Tolerance};
use crate::dense::{self, DMat};

/// Compresses a dense block `C` into low-rank factors `A, B` with
/// `A . B^T ≈ C`, truncating at tolerance `ε` (optionally capped at rank
/// `cap`).
pub fn compress(c: &DMat, tol: Tolerance, cap: RankCap) -> (DMat, DMat) {
    if c.norm() == 0.0 {
        return (DMat::zeros(c.nrows(), 1), DMat::zeros(c.ncols(), 1));
    }

    let (u, sigma, v) = dense::svd(c);
    let k = truncation_rank(&sigma, tol, cap);

    let a = u.submatrix(0, 0, u.nrows(), k);
    let b_unscaled = v.submatrix(0, 0, v.nrows(), k);
    let b = DMat::from_fn(b_unscaled.nrows(), k, |i, j| b_unscaled.get(i, j) * sigma[j]);
    (a, b)
}

/// Picks the largest `k` with `sigma[k-1] / sigma[0] > ε`, capped per
/// `cap`. Returns `0` if no singular value clears the tolerance.
pub fn truncation_rank(sigma: &[f64], tol: Tolerance, cap: RankCap) -> usize {
    if sigma.is_empty() || sigma[0] == 0.0 {
        return 0;
    }
    let sigma1 = sigma[0];
    let mut k = 0;
    for &s in sigma {
        if s / sigma1 > tol.value() {
            k += 1;
        } else {
            break;
        }
    }
    cap.apply(k)
}

/// Rounded addition of two low-rank matrices: `A1 B1^T + s . A2 B2^T`,
/// truncated back down to a compact rank at tolerance `ε` (§4.1).
///
/// Concatenates factors, QR-factors each side, SVDs the product of the `R`
/// factors, and reconstructs truncated `A, B` from that. Bounds rank growth
/// after a sum to at most `rank(A1,B1) + rank(A2,B2)`.
pub fn rounded_add(
    a1: &DMat,
    b1: &DMat,
    a2: &DMat,
    b2: &DMat,
    scalar: f64,
    tol: Tolerance,
) -> (DMat, DMat) {
    let k1 = a1.ncols();
    let k2 = a2.ncols();
    if k1 == 0 && k2 == 0 {
        return (DMat::zeros(a1.nrows(), 1), DMat::zeros(b1.nrows(), 1));
    }
    if k1 == 0 {
        return (a2.clone(), b2.scaled(scalar));
    }
    if k2 == 0 {
        return (a1.clone(), b1.clone());
    }

    let a_wide = a1.hstack(&a2.scaled(1.0));
    let b_wide = b1.hstack(&b2.scaled(scalar));

    let (qa, ra) = dense::qr(&a_wide);
    let (qb, rb) = dense::qr(&b_wide);

    let mut middle = DMat::zeros(ra.nrows(), rb.nrows());
    dense::gemm(1.0, &ra, &rb.transposed(), 0.0, &mut middle);

    let (u, sigma, v) = dense::svd(&middle);
    let k = truncation_rank(&sigma, tol, RankCap::NONE);

    let u_k = u.submatrix(0, 0, u.nrows(), k);
    let v_k = v.submatrix(0, 0, v.nrows(), k);
    let scaled_v_k = DMat::from_fn(v_k.nrows(), k, |i, j| v_k.get(i, j) * sigma[j]);

    let mut a_out = DMat::zeros(qa.nrows(), k.max(1));
    if k > 0 {
        dense::gemm(1.0, &qa, &u_k, 0.0, &mut a_out);
    }
    let mut b_out = DMat::zeros(qb.nrows(), k.max(1));
    if k > 0 {
        dense::gemm(1.0, &qb, &scaled_v_k, 0.0, &mut b_out);
    }
    (a_out, b_out)
}
