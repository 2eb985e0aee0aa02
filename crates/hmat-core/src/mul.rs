//! Multiplication engine: `mul(a, b)` returns a fresh H-matrix representing
//! `a . b`, requiring `a.n == b.m` (§4.3).

use log::debug;

use crate::add::add;
use crate::config::Tolerance;
use crate::convert::to_dense;
use crate::dense::{self, DMat};
use crate::error::{HMatError, Result};
use crate::node::{Block, HMatrix};

/// `a . b`, a fresh H-matrix whose variant is chosen per the dispatch table
/// in §4.3.
pub fn mul(a: &HMatrix, b: &HMatrix, tol: Tolerance) -> Result<HMatrix> {
    let (am, an) = a.shape();
    let (bm, bn) = b.shape();
    if an != bm {
        return Err(HMatError::ShapeMismatch(format!(
            "mul: a is {am}x{an}, b is {bm}x{bn}"
        )));
    }

    debug!("mul: a={:?} b={:?}", variant_name(a), variant_name(b));

    match (a.block(), b.block()) {
        (Block::Dense { c: ac, .. }, Block::Dense { c: bc, .. }) => {
            let mut out = DMat::zeros(am, bn);
            dense::gemm(1.0, ac, bc, 0.0, &mut out);
            Ok(HMatrix::from_dense(out, a.row_cluster().clone(), b.col_cluster().clone()))
        }
        (Block::Dense { c: ac, .. }, Block::LowRank { a: ba, b: bb }) => {
            let mut a_out = DMat::zeros(am, ba.ncols().max(1));
            if ba.ncols() > 0 {
                dense::gemm(1.0, ac, ba, 0.0, &mut a_out);
            }
            HMatrix::from_low_rank(a_out, bb.clone(), a.row_cluster().clone(), b.col_cluster().clone())
        }
        (Block::Dense { c: ac, .. }, Block::Hierarchical { .. }) => {
            let out = mul_dense_hier(ac, b, tol)?;
            Ok(HMatrix::from_dense(out, a.row_cluster().clone(), b.col_cluster().clone()))
        }

        (Block::LowRank { a: aa, b: ab }, Block::Dense { c: bc, .. }) => {
            let mut b_out = DMat::zeros(bn, aa.ncols().max(1));
            if aa.ncols() > 0 {
                dense::gemm(1.0, &bc.transposed(), ab, 0.0, &mut b_out);
            }
            HMatrix::from_low_rank(aa.clone(), b_out, a.row_cluster().clone(), b.col_cluster().clone())
        }
        (Block::LowRank { a: aa, b: ab }, Block::LowRank { a: ba, b: bb }) => {
            if aa.ncols() == 0 || ba.ncols() == 0 {
                let zero_a = DMat::zeros(am, 1);
                let zero_b = DMat::zeros(bn, 1);
                return HMatrix::from_low_rank(zero_a, zero_b, a.row_cluster().clone(), b.col_cluster().clone());
            }
            let mut middle = DMat::zeros(ba.ncols(), aa.ncols());
            dense::gemm(1.0, &ba.transposed(), ab, 0.0, &mut middle);
            let mut b_out = DMat::zeros(bb.nrows(), aa.ncols());
            dense::gemm(1.0, bb, &middle, 0.0, &mut b_out);
            HMatrix::from_low_rank(aa.clone(), b_out, a.row_cluster().clone(), b.col_cluster().clone())
        }
        (Block::LowRank { a: aa, b: ab }, Block::Hierarchical { .. }) => {
            let b_dense = to_dense(b);
            let mut b_out = DMat::zeros(bn, aa.ncols().max(1));
            if aa.ncols() > 0 {
                dense::gemm(1.0, &b_dense.transposed(), ab, 0.0, &mut b_out);
            }
            HMatrix::from_low_rank(aa.clone(), b_out, a.row_cluster().clone(), b.col_cluster().clone())
        }

        (Block::Hierarchical { .. }, Block::Dense { c: bc, .. }) => {
            let out = mul_hier_dense(a, bc, tol)?;
            Ok(HMatrix::from_dense(out, a.row_cluster().clone(), b.col_cluster().clone()))
        }
        (Block::Hierarchical { .. }, Block::LowRank { a: ba, b: bb }) => {
            let a_dense = to_dense(a);
            let mut a_out = DMat::zeros(am, ba.ncols().max(1));
            if ba.ncols() > 0 {
                dense::gemm(1.0, &a_dense, ba, 0.0, &mut a_out);
            }
            HMatrix::from_low_rank(a_out, bb.clone(), a.row_cluster().clone(), b.col_cluster().clone())
        }
        (Block::Hierarchical { children: achildren }, Block::Hierarchical { children: bchildren }) => {
            let mut out: [[Option<Box<HMatrix>>; 2]; 2] = [[None, None], [None, None]];
            for i in 0..2 {
                for j in 0..2 {
                    let term0 = mul(&achildren[i][0], &bchildren[0][j], tol)?;
                    let term1 = mul(&achildren[i][1], &bchildren[1][j], tol)?;
                    let mut sum = term0;
                    add(&mut sum, &term1, 1.0, tol)?;
                    out[i][j] = Some(Box::new(sum));
                }
            }
            let children = [
                [out[0][0].take().unwrap(), out[0][1].take().unwrap()],
                [out[1][0].take().unwrap(), out[1][1].take().unwrap()],
            ];
            HMatrix::from_children(children, a.row_cluster().clone(), b.col_cluster().clone())
        }
    }
}

/// `a . b` where `a` is dense and `b` is hierarchical: `a` is sliced into
/// column slabs matching `b`'s row-cluster split; the product's own row
/// structure stays whole (`a`'s split is trivial), so the recursion
/// terminates into a single dense block (§4.3).
fn mul_dense_hier(a: &DMat, b: &HMatrix, tol: Tolerance) -> Result<DMat> {
    let Block::Hierarchical { children } = b.block() else {
        unreachable!("mul_dense_hier requires a hierarchical b")
    };
    let k1 = children[0][0].shape().0;
    let k2 = children[1][0].shape().0;

    let a_left = a.submatrix(0, 0, a.nrows(), k1);
    let a_right = a.submatrix(0, k1, a.nrows(), k2);
    let left_col = children[0][0].row_cluster().clone();
    let right_col = children[1][0].row_cluster().clone();

    let mut blocks = Vec::with_capacity(2);
    for j in 0..2 {
        let a_left_h = HMatrix::from_dense(a_left.clone(), dummy_row_cluster(a), left_col.clone());
        let a_right_h = HMatrix::from_dense(a_right.clone(), dummy_row_cluster(a), right_col.clone());
        let term0 = mul(&a_left_h, &children[0][j], tol)?;
        let term1 = mul(&a_right_h, &children[1][j], tol)?;
        let mut sum = term0;
        add(&mut sum, &term1, 1.0, tol)?;
        blocks.push(to_dense(&sum));
    }
    Ok(blocks[0].hstack(&blocks[1]))
}

/// `a . b` where `a` is hierarchical and `b` is dense: symmetric to
/// [`mul_dense_hier`], splitting `b` by `a`'s column-cluster split and
/// vstacking `a`'s row blocks into a single dense result.
fn mul_hier_dense(a: &HMatrix, b: &DMat, tol: Tolerance) -> Result<DMat> {
    let Block::Hierarchical { children } = a.block() else {
        unreachable!("mul_hier_dense requires a hierarchical a")
    };
    let n1 = children[0][0].shape().1;
    let n2 = children[0][1].shape().1;

    let b_top = b.submatrix(0, 0, n1, b.ncols());
    let b_bottom = b.submatrix(n1, 0, n2, b.ncols());
    let top_row = children[0][0].col_cluster().clone();
    let bottom_row = children[0][1].col_cluster().clone();

    let mut blocks = Vec::with_capacity(2);
    for i in 0..2 {
        let b_top_h = HMatrix::from_dense(b_top.clone(), top_row.clone(), dummy_col_cluster(b));
        let b_bottom_h = HMatrix::from_dense(b_bottom.clone(), bottom_row.clone(), dummy_col_cluster(b));
        let term0 = mul(&children[i][0], &b_top_h, tol)?;
        let term1 = mul(&children[i][1], &b_bottom_h, tol)?;
        let mut sum = term0;
        add(&mut sum, &term1, 1.0, tol)?;
        blocks.push(to_dense(&sum));
    }
    Ok(stack_rows(&blocks[0], &blocks[1]))
}

fn stack_rows(top: &DMat, bottom: &DMat) -> DMat {
    let (m1, n) = (top.nrows(), top.ncols());
    let m2 = bottom.nrows();
    DMat::from_fn(m1 + m2, n, |i, j| {
        if i < m1 {
            top.get(i, j)
        } else {
            bottom.get(i - m1, j)
        }
    })
}

fn dummy_row_cluster(a: &DMat) -> std::rc::Rc<crate::cluster::Cluster> {
    crate::cluster::Cluster::leaf(0..a.nrows())
}

fn dummy_col_cluster(b: &DMat) -> std::rc::Rc<crate::cluster::Cluster> {
    crate::cluster::Cluster::leaf(0..b.ncols())
}

fn variant_name(h: &HMatrix) -> &'static str {
    match h.block() {
        Block::Dense { .. } => "dense",
        Block::LowRank { .. } => "low-rank",
        Block::Hierarchical { .. } => "hierarchical",
    }
}
