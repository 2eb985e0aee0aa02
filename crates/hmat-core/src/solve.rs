//! Solve against a factorized H-matrix: `solve(h, y)` returns `x` such that
//! `H . x = y`, given `h` has already been factorized in place by
//! [`crate::lu::lu`] (§4.7).

use crate::dense::DMat;
use crate::error::{HMatError, Result};
use crate::node::{Block, HMatrix};

/// Solves `H . x = y` given a factorized `h`, returning a fresh `x`.
///
/// Applies `h`'s row permutation to `y`, forward-substitutes against the
/// unit-lower factor, then back-substitutes against the upper factor.
pub fn solve(h: &HMatrix, y: &[f64]) -> Result<Vec<f64>> {
    let p = h.permutation().ok_or_else(|| {
        HMatError::VariantPrecondition("solve requires an LU-factorized h".into())
    })?;
    if y.len() != p.len() {
        return Err(HMatError::ShapeMismatch(format!(
            "solve: h is {}x{}, y has length {}",
            h.shape().0,
            h.shape().1,
            y.len()
        )));
    }

    let mut z: Vec<f64> = p.iter().map(|&pi| y[pi]).collect();
    forward_subst(h, &mut z)?;
    backward_subst(h, &mut z)?;
    Ok(z)
}

/// Solves `L . x = z` in place, `L` the unit lower-triangular factor implied
/// by `h`'s packed dense leaves and the off-diagonal blocks left behind by
/// [`crate::lu::lu`].
fn forward_subst(h: &HMatrix, z: &mut [f64]) -> Result<()> {
    match h.block() {
        Block::Dense { c } => {
            solve_vec(c, z, true, true);
            Ok(())
        }
        Block::LowRank { .. } => Err(HMatError::VariantPrecondition(
            "forward substitution requires a non-low-rank diagonal block".into(),
        )),
        Block::Hierarchical { children } => {
            let m1 = children[0][0].shape().0;
            let (z1, z2) = z.split_at_mut(m1);
            forward_subst(&children[0][0], z1)?;
            children[1][0].matvec_into(z2, z1, -1.0);
            forward_subst(&children[1][1], z2)
        }
    }
}

/// Solves `U . x = z` in place, `U` the upper-triangular factor.
fn backward_subst(h: &HMatrix, z: &mut [f64]) -> Result<()> {
    match h.block() {
        Block::Dense { c } => {
            solve_vec(c, z, false, false);
            Ok(())
        }
        Block::LowRank { .. } => Err(HMatError::VariantPrecondition(
            "back substitution requires a non-low-rank diagonal block".into(),
        )),
        Block::Hierarchical { children } => {
            let m1 = children[0][0].shape().0;
            let (z1, z2) = z.split_at_mut(m1);
            backward_subst(&children[1][1], z2)?;
            children[0][1].matvec_into(z1, z2, -1.0);
            backward_subst(&children[0][0], z1)
        }
    }
}

/// Triangular-solves a single column vector by lifting it into a `DMat` and
/// calling back into the dense kernel adapter.
fn solve_vec(c: &DMat, z: &mut [f64], lower: bool, unit_diag: bool) {
    let mut rhs = DMat::from_fn(z.len(), 1, |i, _| z[i]);
    crate::dense::trtrs(lower, unit_diag, c, &mut rhs);
    for (i, slot) in z.iter_mut().enumerate() {
        *slot = rhs.get(i, 0);
    }
}

impl HMatrix {
    /// Solves `H . x = y` against this LU-factorized matrix. See [`solve`].
    pub fn solve(&self, y: &[f64]) -> Result<Vec<f64>> {
        solve(self, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::config::Tolerance;
    use crate::lu::lu;

    #[test]
    fn dense_identity_solve_is_identity() {
        let row = Cluster::leaf(0..3);
        let col = Cluster::leaf(0..3);
        let mut h = HMatrix::from_dense(DMat::identity(3), row, col);
        lu(&mut h, Tolerance::default()).unwrap();
        let y = vec![1.0, 2.0, 3.0];
        let x = solve(&h, &y).unwrap();
        for i in 0..3 {
            assert!((x[i] - y[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn two_level_identity_solve_is_identity() {
        let row = Cluster::new_balanced(0, 4, 2);
        let col = Cluster::new_balanced(0, 4, 2);
        let row00 = Cluster::leaf(0..2);
        let row11 = Cluster::leaf(2..4);
        let col00 = Cluster::leaf(0..2);
        let col11 = Cluster::leaf(2..4);

        let d00 = HMatrix::from_dense(DMat::identity(2), row00.clone(), col00.clone());
        let d01 =
            HMatrix::from_low_rank(DMat::zeros(2, 1), DMat::zeros(2, 1), row00, col11.clone())
                .unwrap();
        let d10 =
            HMatrix::from_low_rank(DMat::zeros(2, 1), DMat::zeros(2, 1), row11.clone(), col00)
                .unwrap();
        let d11 = HMatrix::from_dense(DMat::identity(2), row11, col11);

        let mut h = HMatrix::from_children(
            [[Box::new(d00), Box::new(d01)], [Box::new(d10), Box::new(d11)]],
            row,
            col,
        )
        .unwrap();

        lu(&mut h, Tolerance::default()).unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let x = solve(&h, &y).unwrap();
        for i in 0..4 {
            assert!((x[i] - y[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn solve_before_lu_is_rejected() {
        let row = Cluster::leaf(0..2);
        let col = Cluster::leaf(0..2);
        let h = HMatrix::from_dense(DMat::identity(2), row, col);
        assert!(solve(&h, &[1.0, 2.0]).is_err());
    }
}
