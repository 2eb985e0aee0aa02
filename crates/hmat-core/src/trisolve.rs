//! Triangular solve: `a . X = b`, solved in place into `b`, where `a` is
//! triangular (lower or upper, optionally unit-diagonal) and `b` is an
//! H-matrix. `a` is never low-rank (§4.5).

use log::debug;

use crate::add::add;
use crate::config::Tolerance;
use crate::convert::collapse_to_dense;
use crate::dense::{self, DMat};
use crate::error::{HMatError, Result};
use crate::mul::mul;
use crate::node::{Block, HMatrix};

/// Solves `a . X = b` in place into `b`.
///
/// Direct upper-triangular solve is used rather than transpose-solve-
/// transpose: the two are equivalent on unit/non-unit diagonal, and the
/// direct form avoids the extra mutation and materialization.
pub fn trisolve(a: &HMatrix, b: &mut HMatrix, lower: bool, unit_diag: bool, tol: Tolerance) -> Result<()> {
    if matches!(a.block(), Block::LowRank { .. }) {
        return Err(HMatError::VariantPrecondition(
            "triangular solve requires a non-low-rank `a`".into(),
        ));
    }
    debug!("trisolve: lower={lower} unit_diag={unit_diag}");
    if lower {
        trisolve_lower(a, b, unit_diag, tol)
    } else {
        trisolve_upper(a, b, unit_diag, tol)
    }
}

fn trisolve_lower(a: &HMatrix, b: &mut HMatrix, unit_diag: bool, tol: Tolerance) -> Result<()> {
    match (a.block(), b.block_mut()) {
        (Block::Dense { c: ac, .. }, Block::Dense { c: bc, .. }) => {
            dense::trtrs(true, unit_diag, ac, bc);
            Ok(())
        }
        (Block::Dense { c: ac, .. }, Block::LowRank { a: ba, .. }) => {
            if ba.ncols() > 0 {
                dense::trtrs(true, unit_diag, ac, ba);
            }
            Ok(())
        }
        (Block::Hierarchical { children: ac }, Block::Hierarchical { children: bc }) => {
            trisolve_lower(&ac[0][0], &mut bc[0][0], unit_diag, tol)?;
            trisolve_lower(&ac[0][0], &mut bc[0][1], unit_diag, tol)?;

            let update10 = mul(&ac[1][0], &bc[0][0], tol)?;
            add(&mut bc[1][0], &update10, -1.0, tol)?;
            let update11 = mul(&ac[1][0], &bc[0][1], tol)?;
            add(&mut bc[1][1], &update11, -1.0, tol)?;

            trisolve_lower(&ac[1][1], &mut bc[1][0], unit_diag, tol)?;
            trisolve_lower(&ac[1][1], &mut bc[1][1], unit_diag, tol)?;
            Ok(())
        }
        (Block::Hierarchical { .. }, Block::Dense { .. } | Block::LowRank { .. }) => {
            let mut a_dense = a.clone();
            collapse_to_dense(&mut a_dense);
            trisolve_lower(&a_dense, b, unit_diag, tol)
        }
        (Block::LowRank { .. }, _) => unreachable!("caller rejects low-rank a"),
    }
}

fn trisolve_upper(a: &HMatrix, b: &mut HMatrix, unit_diag: bool, tol: Tolerance) -> Result<()> {
    match (a.block(), b.block_mut()) {
        (Block::Dense { c: ac, .. }, Block::Dense { c: bc, .. }) => {
            dense::trtrs(false, unit_diag, ac, bc);
            Ok(())
        }
        (Block::Dense { c: ac, .. }, Block::LowRank { a: ba, .. }) => {
            if ba.ncols() > 0 {
                dense::trtrs(false, unit_diag, ac, ba);
            }
            Ok(())
        }
        (Block::Hierarchical { children: ac }, Block::Hierarchical { children: bc }) => {
            trisolve_upper(&ac[1][1], &mut bc[1][0], unit_diag, tol)?;
            trisolve_upper(&ac[1][1], &mut bc[1][1], unit_diag, tol)?;

            let update00 = mul(&ac[0][1], &bc[1][0], tol)?;
            add(&mut bc[0][0], &update00, -1.0, tol)?;
            let update01 = mul(&ac[0][1], &bc[1][1], tol)?;
            add(&mut bc[0][1], &update01, -1.0, tol)?;

            trisolve_upper(&ac[0][0], &mut bc[0][0], unit_diag, tol)?;
            trisolve_upper(&ac[0][0], &mut bc[0][1], unit_diag, tol)?;
            Ok(())
        }
        (Block::Hierarchical { .. }, Block::Dense { .. } | Block::LowRank { .. }) => {
            let mut a_dense = a.clone();
            collapse_to_dense(&mut a_dense);
            trisolve_upper(&a_dense, b, unit_diag, tol)
        }
        (Block::LowRank { .. }, _) => unreachable!("caller rejects low-rank a"),
    }
}

/// Solves `X . a = b` in place into `b`, where `a` is triangular — the
/// mirror of [`trisolve`]'s left solve, needed when the unknown multiplies
/// `a` on the right (e.g. `L21` in block LU, where `L21 . U11 = H21`).
/// `trisolve_upper`/`trisolve_lower` above are direct left solves and are
/// not equivalent to this unless `a` is symmetric, so this reduces to a
/// left solve via the transpose identity `a^T . X^T = b^T` instead.
pub fn trisolve_right(a: &HMatrix, b: &mut HMatrix, lower: bool, unit_diag: bool, tol: Tolerance) -> Result<()> {
    let at = transpose(a);
    let mut bt = transpose(b);
    trisolve(&at, &mut bt, !lower, unit_diag, tol)?;
    *b = transpose(&bt);
    Ok(())
}

/// Transposes `h`, materializing a fresh H-matrix: `m` and `n` swap, `A`
/// and `B` swap for low-rank leaves, `C` transposes for dense leaves, and
/// children transpose recursively while swapping the anti-diagonal pair.
pub fn transpose(h: &HMatrix) -> HMatrix {
    let mut out = match h.block() {
        Block::Dense { c } => HMatrix::from_dense(c.transposed(), h.col_cluster().clone(), h.row_cluster().clone()),
        Block::LowRank { a, b } => {
            HMatrix::from_low_rank(b.clone(), a.clone(), h.col_cluster().clone(), h.row_cluster().clone())
                .expect("transposed low-rank factors keep matching rank")
        }
        Block::Hierarchical { children } => {
            let t00 = transpose(&children[0][0]);
            let t01 = transpose(&children[1][0]);
            let t10 = transpose(&children[0][1]);
            let t11 = transpose(&children[1][1]);
            let new_children = [[Box::new(t00), Box::new(t01)], [Box::new(t10), Box::new(t11)]];
            HMatrix::from_children(new_children, h.col_cluster().clone(), h.row_cluster().clone())
                .expect("transposing preserves child-split consistency")
        }
    };
    if let Some(p) = h.permutation() {
        out.set_permutation(p.to_vec());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::convert::to_dense;
    use crate::dense::DMat;

    #[test]
    fn lower_dense_solve_matches_identity() {
        let row = Cluster::leaf(0..2);
        let col = Cluster::leaf(0..2);
        let a = HMatrix::from_dense(DMat::identity(2), row.clone(), col.clone());
        let mut b = HMatrix::from_dense(DMat::identity(2), row, col);
        trisolve(&a, &mut b, true, true, Tolerance::default()).unwrap();
        let out = to_dense(&b);
        assert_eq!(out.get(0, 0), 1.0);
        assert_eq!(out.get(1, 1), 1.0);
    }

    /// A 4x4 hierarchical node, upper triangular overall (`a10` is zero).
    fn hierarchical_upper(row: std::rc::Rc<crate::cluster::Cluster>) -> HMatrix {
        let row0 = Cluster::leaf(0..2);
        let row1 = Cluster::leaf(2..4);
        let a00 = HMatrix::from_dense(
            DMat::from_fn(2, 2, |i, j| if i <= j { (i + j + 2) as f64 } else { 0.0 }),
            row0.clone(),
            row0.clone(),
        );
        let a01 = HMatrix::from_dense(DMat::from_fn(2, 2, |i, j| (i + 1) as f64 * (j + 1) as f64), row0.clone(), row1.clone());
        let a10 = HMatrix::from_dense(DMat::zeros(2, 2), row1.clone(), row0.clone());
        let a11 = HMatrix::from_dense(
            DMat::from_fn(2, 2, |i, j| if i <= j { (i + j + 5) as f64 } else { 0.0 }),
            row1.clone(),
            row1.clone(),
        );
        HMatrix::from_children(
            [[Box::new(a00), Box::new(a01)], [Box::new(a10), Box::new(a11)]],
            row.clone(),
            row,
        )
        .unwrap()
    }

    #[test]
    fn hierarchical_upper_trisolve_matches_dense_trtrs() {
        let root = Cluster::new_balanced(0, 4, 2);
        let a = hierarchical_upper(root.clone());
        let b_dense = DMat::from_fn(4, 4, |i, j| (i * 4 + j) as f64 + 1.0);
        let mut b = HMatrix::from_dense(b_dense.clone(), root.clone(), root);

        let a_dense = to_dense(&a);
        let mut expected = b_dense.clone();
        dense::trtrs(false, false, &a_dense, &mut expected);

        trisolve(&a, &mut b, false, false, Tolerance::default()).unwrap();
        let out = to_dense(&b);
        for i in 0..4 {
            for j in 0..4 {
                assert!((out.get(i, j) - expected.get(i, j)).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn hierarchical_upper_trisolve_right_solves_x_times_a_equals_b() {
        let root = Cluster::new_balanced(0, 4, 2);
        let a = hierarchical_upper(root.clone());
        let b_dense = DMat::from_fn(4, 4, |i, j| (i * 4 + j) as f64 + 1.0);
        let mut b = HMatrix::from_dense(b_dense.clone(), root.clone(), root);

        trisolve_right(&a, &mut b, false, false, Tolerance::default()).unwrap();
        let x = to_dense(&b);

        // Check X . A == B directly, independent of how X was computed.
        let a_dense = to_dense(&a);
        let mut recovered = DMat::zeros(4, 4);
        dense::gemm(1.0, &x, &a_dense, 0.0, &mut recovered);
        for i in 0..4 {
            for j in 0..4 {
                assert!((recovered.get(i, j) - b_dense.get(i, j)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn transpose_of_dense_matches_dense_transpose() {
        let row = Cluster::leaf(0..2);
        let col = Cluster::leaf(0..3);
        let c = DMat::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        let h = HMatrix::from_dense(c.clone(), row, col);
        let t = transpose(&h);
        let out = to_dense(&t);
        assert_eq!(out.shape(), (3, 2));
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(out.get(j, i), c.get(i, j));
            }
        }
    }
}
