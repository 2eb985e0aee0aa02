//! Format conversion: materializing an H-matrix into a dense matrix, and
//! collapsing a node's variant in place (§3.3, §6.3).

use crate::dense::{self, DMat};
use crate::node::{Block, HMatrix};

/// Materializes `h` into a dense matrix without mutating `h`.
pub fn to_dense(h: &HMatrix) -> DMat {
    match h.block() {
        // `c` already holds whatever this leaf currently carries — plain
        // entries, or, once factored, packed L (strictly below the
        // diagonal) / U (on and above). The permutation is tracked
        // separately via `h.permutation()` and is not undone here.
        Block::Dense { c } => c.clone(),
        Block::LowRank { a, b } => {
            if a.ncols() == 0 {
                DMat::zeros(a.nrows(), b.nrows())
            } else {
                let mut out = DMat::zeros(a.nrows(), b.nrows());
                dense::gemm(1.0, a, &b.transposed(), 0.0, &mut out);
                out
            }
        }
        Block::Hierarchical { children } => {
            let (m, n) = h.shape();
            let top = dense_hstack(&to_dense(&children[0][0]), &to_dense(&children[0][1]));
            let bottom = dense_hstack(&to_dense(&children[1][0]), &to_dense(&children[1][1]));
            let mut out = DMat::zeros(m, n);
            copy_block(&mut out, &top, 0, 0);
            copy_block(&mut out, &bottom, top.nrows(), 0);
            out
        }
    }
}

/// Collapses `h` in place into a dense leaf, discarding its previous
/// variant (§3.3's `to_dense!`).
pub fn collapse_to_dense(h: &mut HMatrix) {
    let dense = to_dense(h);
    h.set_block(Block::Dense { c: dense });
    h.clear_permutation();
}

impl HMatrix {
    /// Materializes this H-matrix into a dense matrix. See [`to_dense`].
    pub fn to_dense(&self) -> DMat {
        to_dense(self)
    }
}

fn dense_hstack(left: &DMat, right: &DMat) -> DMat {
    left.hstack(right)
}

fn copy_block(dst: &mut DMat, src: &DMat, row0: usize, col0: usize) {
    for i in 0..src.nrows() {
        for j in 0..src.ncols() {
            dst.set(row0 + i, col0 + j, src.get(i, j));
        }
    }
}
