//! The H-matrix data type: a node that is exactly one of {dense, low-rank,
//! hierarchical} (§3.1).

use std::rc::Rc;

use crate::cluster::Cluster;
use crate::dense::DMat;
use crate::error::{HMatError, Result};

/// The variant-specific payload of an H-matrix node. Exactly one variant is
/// ever live for a given node — modeled as a sum type rather than a
/// bag of optional fields with boolean flags.
#[derive(Debug, Clone)]
pub enum Block {
    /// An exact dense block. Once the owning node has been LU-factored in
    /// place by [`crate::lu::lu`], `c` holds the packed `L`/`U` factors
    /// rather than the original entries, and the node's `perm` is `Some`.
    Dense { c: DMat },
    /// The outer product `A . B^T`, rank at most `A.ncols() == B.ncols()`.
    /// Rank 0 is legal and denotes the zero matrix.
    LowRank { a: DMat, b: DMat },
    /// A 2x2 block partition. `children[i][j]` is the `(i, j)` sub-block.
    Hierarchical {
        children: [[Box<HMatrix>; 2]; 2],
    },
}

/// A node of the hierarchical-matrix tree.
///
/// The row permutation `perm` is a property of the node, not of a
/// particular variant: both a dense leaf and a hierarchical node can be
/// LU-factored (§3.2), and the composed permutation of a hierarchical node
/// is `[P11 ; P22 + m1]`.
#[derive(Debug, Clone)]
pub struct HMatrix {
    m: usize,
    n: usize,
    row_cluster: Rc<Cluster>,
    col_cluster: Rc<Cluster>,
    block: Block,
    perm: Option<Vec<usize>>,
}

impl HMatrix {
    /// Wraps a dense block over the given row/column clusters.
    pub fn from_dense(c: DMat, row_cluster: Rc<Cluster>, col_cluster: Rc<Cluster>) -> Self {
        let (m, n) = (c.nrows(), c.ncols());
        Self {
            m,
            n,
            row_cluster,
            col_cluster,
            block: Block::Dense { c },
            perm: None,
        }
    }

    /// Wraps a low-rank block `A . B^T` over the given clusters. `A` and `B`
    /// must carry the same number of columns (the rank).
    pub fn from_low_rank(
        a: DMat,
        b: DMat,
        row_cluster: Rc<Cluster>,
        col_cluster: Rc<Cluster>,
    ) -> Result<Self> {
        if a.ncols() != b.ncols() {
            return Err(HMatError::ShapeMismatch(format!(
                "low-rank factors have mismatched rank: A has {} cols, B has {}",
                a.ncols(),
                b.ncols()
            )));
        }
        let (m, n) = (a.nrows(), b.nrows());
        Ok(Self {
            m,
            n,
            row_cluster,
            col_cluster,
            block: Block::LowRank { a, b },
            perm: None,
        })
    }

    /// Builds a hierarchical node from its four children, checking that row
    /// and column splits are consistent (§3.2).
    pub fn from_children(
        children: [[Box<HMatrix>; 2]; 2],
        row_cluster: Rc<Cluster>,
        col_cluster: Rc<Cluster>,
    ) -> Result<Self> {
        let m1 = children[0][0].m;
        let m2 = children[1][0].m;
        let n1 = children[0][0].n;
        let n2 = children[0][1].n;

        if children[0][1].m != m1 || children[1][1].m != m2 {
            return Err(HMatError::InvariantViolation(
                "row splits of hierarchical children don't match across columns".into(),
            ));
        }
        if children[1][0].n != n1 || children[1][1].n != n2 {
            return Err(HMatError::InvariantViolation(
                "column splits of hierarchical children don't match across rows".into(),
            ));
        }

        Ok(Self {
            m: m1 + m2,
            n: n1 + n2,
            row_cluster,
            col_cluster,
            block: Block::Hierarchical { children },
            perm: None,
        })
    }

    /// `(m, n)` shape of the block this node represents.
    pub fn shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    /// Row cluster identifying this node's row index range.
    pub fn row_cluster(&self) -> &Rc<Cluster> {
        &self.row_cluster
    }

    /// Column cluster identifying this node's column index range.
    pub fn col_cluster(&self) -> &Rc<Cluster> {
        &self.col_cluster
    }

    /// Read-only access to the variant payload.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Mutable access to the variant payload, for in-place algorithms.
    pub fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }

    /// Replaces the variant payload wholesale (used by conversions and by
    /// algorithms that reshape a node in place, e.g. rank truncation after
    /// addition).
    pub fn set_block(&mut self, block: Block) {
        self.block = block;
    }

    /// True if this node has been LU-factored (dense leaf or hierarchical).
    pub fn is_factorized(&self) -> bool {
        self.perm.is_some()
    }

    /// The row permutation of an LU-factored node, if any: `P` itself for a
    /// dense leaf, or the composition `[P11 ; P22 + m1]` for a hierarchical
    /// node (§3.2).
    pub fn permutation(&self) -> Option<&[usize]> {
        self.perm.as_deref()
    }

    /// Records the row permutation produced by [`crate::lu::lu`].
    pub fn set_permutation(&mut self, p: Vec<usize>) {
        self.perm = Some(p);
    }

    /// Clears any recorded permutation, e.g. when a node's variant is
    /// replaced wholesale by [`crate::convert::collapse_to_dense`].
    pub fn clear_permutation(&mut self) {
        self.perm = None;
    }

    /// Summary statistics over the block tree: `(dense_count, lowrank_count,
    /// depth, compression_ratio)` (§6.3 `info`).
    pub fn info(&self) -> HMatInfo {
        let mut dense_count = 0usize;
        let mut lowrank_count = 0usize;
        let mut stored = 0usize;
        let depth = self.info_recurse(&mut dense_count, &mut lowrank_count, &mut stored);
        let total = (self.m * self.n).max(1);
        HMatInfo {
            dense_count,
            lowrank_count,
            depth,
            compression_ratio: stored as f64 / total as f64,
        }
    }

    fn info_recurse(&self, dense: &mut usize, lowrank: &mut usize, stored: &mut usize) -> usize {
        match &self.block {
            Block::Dense { c, .. } => {
                *dense += 1;
                *stored += c.nrows() * c.ncols();
                1
            }
            Block::LowRank { a, b } => {
                *lowrank += 1;
                *stored += a.ncols() * (a.nrows() + b.nrows());
                1
            }
            Block::Hierarchical { children } => {
                let mut max_child_depth = 0;
                for row in children {
                    for child in row {
                        max_child_depth =
                            max_child_depth.max(child.info_recurse(dense, lowrank, stored));
                    }
                }
                1 + max_child_depth
            }
        }
    }
}

/// Summary statistics returned by [`HMatrix::info`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HMatInfo {
    /// Number of dense leaves in the block tree.
    pub dense_count: usize,
    /// Number of low-rank leaves in the block tree.
    pub lowrank_count: usize,
    /// Depth of the block tree (a single leaf has depth 1).
    pub depth: usize,
    /// Ratio of stored entries to `m * n` dense entries.
    pub compression_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;

    #[test]
    fn dense_leaf_info() {
        let row = Cluster::leaf(0..4);
        let col = Cluster::leaf(0..4);
        let h = HMatrix::from_dense(DMat::identity(4), row, col);
        let info = h.info();
        assert_eq!(info.dense_count, 1);
        assert_eq!(info.lowrank_count, 0);
        assert_eq!(info.depth, 1);
        assert!((info.compression_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_low_rank_factors_rejected() {
        let row = Cluster::leaf(0..4);
        let col = Cluster::leaf(0..4);
        let a = DMat::zeros(4, 2);
        let b = DMat::zeros(4, 3);
        assert!(HMatrix::from_low_rank(a, b, row, col).is_err());
    }
}
