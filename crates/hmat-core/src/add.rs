//! Addition engine: `a <- a + s . b`, preserving the format of `a` (§4.2).

use log::debug;

use crate::config::{RankCap, Tolerance};
use crate::convert::to_dense;
use crate::dense::DMat;
use crate::error::{HMatError, Result};
use crate::node::{Block, HMatrix};
use crate::truncate;

/// `a <- a + s . b`, format of `a` preserved. Dispatches on the variant
/// pair `(a, b)` per the 3x3 table in §4.2.
pub fn add(a: &mut HMatrix, b: &HMatrix, scalar: f64, tol: Tolerance) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(HMatError::ShapeMismatch(format!(
            "add: a is {:?}, b is {:?}",
            a.shape(),
            b.shape()
        )));
    }

    debug!(
        "add: a={:?} b={:?} scale={scalar}",
        variant_name(a),
        variant_name(b)
    );

    match (a.block_mut(), b.block()) {
        (Block::Dense { c, .. }, Block::Dense { c: bc, .. }) => {
            *c = c.add_scaled(bc, scalar);
            Ok(())
        }
        (Block::Dense { c, .. }, Block::LowRank { a: ba, b: bb }) => {
            if ba.ncols() > 0 {
                let mut contrib = DMat::zeros(c.nrows(), c.ncols());
                crate::dense::gemm(scalar, ba, &bb.transposed(), 0.0, &mut contrib);
                *c = c.add_scaled(&contrib, 1.0);
            }
            Ok(())
        }
        (Block::Dense { .. }, Block::Hierarchical { .. }) => {
            let b_dense = HMatrix::from_dense(to_dense(b), b.row_cluster().clone(), b.col_cluster().clone());
            add(a, &b_dense, scalar, tol)
        }

        (Block::LowRank { a: aa, b: ab }, Block::Dense { c: bc, .. }) => {
            let self_dense = {
                if aa.ncols() == 0 {
                    DMat::zeros(aa.nrows(), ab.nrows())
                } else {
                    let mut out = DMat::zeros(aa.nrows(), ab.nrows());
                    crate::dense::gemm(1.0, aa, &ab.transposed(), 0.0, &mut out);
                    out
                }
            };
            let summed = self_dense.add_scaled(bc, scalar);
            let (na, nb) = truncate::compress(&summed, tol, RankCap::NONE);
            *aa = na;
            *ab = nb;
            Ok(())
        }
        (Block::LowRank { a: aa, b: ab }, Block::LowRank { a: ba, b: bb }) => {
            let (na, nb) = truncate::rounded_add(aa, ab, ba, bb, scalar, tol);
            *aa = na;
            *ab = nb;
            Ok(())
        }
        (Block::LowRank { .. }, Block::Hierarchical { .. }) => {
            let b_dense = HMatrix::from_dense(to_dense(b), b.row_cluster().clone(), b.col_cluster().clone());
            add(a, &b_dense, scalar, tol)
        }

        (Block::Hierarchical { children }, Block::Dense { c: bc, .. }) => {
            let m1 = children[0][0].shape().0;
            let n1 = children[0][0].shape().1;
            let m = bc.nrows();
            let n = bc.ncols();
            let m2 = m - m1;
            let n2 = n - n1;

            let b00 = HMatrix::from_dense(bc.submatrix(0, 0, m1, n1), children[0][0].row_cluster().clone(), children[0][0].col_cluster().clone());
            let b01 = HMatrix::from_dense(bc.submatrix(0, n1, m1, n2), children[0][1].row_cluster().clone(), children[0][1].col_cluster().clone());
            let b10 = HMatrix::from_dense(bc.submatrix(m1, 0, m2, n1), children[1][0].row_cluster().clone(), children[1][0].col_cluster().clone());
            let b11 = HMatrix::from_dense(bc.submatrix(m1, n1, m2, n2), children[1][1].row_cluster().clone(), children[1][1].col_cluster().clone());

            add(&mut children[0][0], &b00, scalar, tol)?;
            add(&mut children[0][1], &b01, scalar, tol)?;
            add(&mut children[1][0], &b10, scalar, tol)?;
            add(&mut children[1][1], &b11, scalar, tol)
        }
        (Block::Hierarchical { children }, Block::LowRank { a: ba, b: bb }) => {
            let m1 = children[0][0].shape().0;
            let n1 = children[0][0].shape().1;
            let m = ba.nrows();
            let n = bb.nrows();
            let m2 = m - m1;
            let n2 = n - n1;

            if ba.ncols() == 0 {
                return Ok(());
            }

            let a0 = ba.submatrix(0, 0, m1, ba.ncols());
            let a1 = ba.submatrix(m1, 0, m2, ba.ncols());
            let b0 = bb.submatrix(0, 0, n1, bb.ncols());
            let b1 = bb.submatrix(n1, 0, n2, bb.ncols());

            let b00 = HMatrix::from_low_rank(a0.clone(), b0.clone(), children[0][0].row_cluster().clone(), children[0][0].col_cluster().clone())?;
            let b01 = HMatrix::from_low_rank(a0, b1.clone(), children[0][1].row_cluster().clone(), children[0][1].col_cluster().clone())?;
            let b10 = HMatrix::from_low_rank(a1.clone(), b0, children[1][0].row_cluster().clone(), children[1][0].col_cluster().clone())?;
            let b11 = HMatrix::from_low_rank(a1, b1, children[1][1].row_cluster().clone(), children[1][1].col_cluster().clone())?;

            add(&mut children[0][0], &b00, scalar, tol)?;
            add(&mut children[0][1], &b01, scalar, tol)?;
            add(&mut children[1][0], &b10, scalar, tol)?;
            add(&mut children[1][1], &b11, scalar, tol)
        }
        (Block::Hierarchical { children }, Block::Hierarchical { children: bchildren }) => {
            add(&mut children[0][0], &bchildren[0][0], scalar, tol)?;
            add(&mut children[0][1], &bchildren[0][1], scalar, tol)?;
            add(&mut children[1][0], &bchildren[1][0], scalar, tol)?;
            add(&mut children[1][1], &bchildren[1][1], scalar, tol)
        }
    }
}

fn variant_name(h: &HMatrix) -> &'static str {
    match h.block() {
        Block::Dense { .. } => "dense",
        Block::LowRank { .. } => "low-rank",
        Block::Hierarchical { .. } => "hierarchical",
    }
}

impl HMatrix {
    /// Copying convenience over in-place [`add`]: returns `self + s . b`
    /// without mutating `self`.
    pub fn added(&self, b: &HMatrix, scalar: f64, tol: Tolerance) -> Result<HMatrix> {
        let mut out = self.clone();
        add(&mut out, b, scalar, tol)?;
        Ok(out)
    }
}
