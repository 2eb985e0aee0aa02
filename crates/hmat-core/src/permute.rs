//! Permutation propagation: applying a leaf row pivot to all row-aligned
//! descendants of a block (§4.8).

use crate::error::{HMatError, Result};
use crate::node::{Block, HMatrix};

/// Applies row permutation `p` (length `h.shape().0`) to every descendant
/// of `h` that stores row-indexed data.
///
/// The permutation must not cross a hierarchical node's row boundary: this
/// is an invariant of the LU algorithm (partial pivoting within a leaf never
/// selects a row outside that leaf) and is asserted here rather than
/// silently tolerated.
pub fn permute(h: &mut HMatrix, p: &[usize]) -> Result<()> {
    let m = h.shape().0;
    if p.len() != m {
        return Err(HMatError::ShapeMismatch(format!(
            "permutation has length {}, expected {m}",
            p.len()
        )));
    }

    match h.block_mut() {
        Block::Dense { c, .. } => {
            *c = c.permuted_rows(p);
        }
        Block::LowRank { a, .. } => {
            *a = a.permuted_rows(p);
        }
        Block::Hierarchical { children } => {
            let m1 = children[0][0].shape().0;
            let m2 = children[1][0].shape().0;

            let (p1, p2_raw) = p.split_at(m1);
            if p2_raw.iter().any(|&x| x < m1) {
                return Err(HMatError::InvariantViolation(
                    "permutation crosses hierarchical block boundary".into(),
                ));
            }
            let p2: Vec<usize> = p2_raw.iter().map(|&x| x - m1).collect();
            if m2 > 0 && p2.iter().copied().max().unwrap_or(0) != m2 - 1 {
                return Err(HMatError::InvariantViolation(
                    "permutation crosses hierarchical block boundary".into(),
                ));
            }

            permute(&mut children[0][0], p1)?;
            permute(&mut children[0][1], p1)?;
            permute(&mut children[1][0], &p2)?;
            permute(&mut children[1][1], &p2)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::dense::DMat;

    #[test]
    fn dense_leaf_permutes_rows() {
        let row = Cluster::leaf(0..3);
        let col = Cluster::leaf(0..3);
        let c = DMat::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
        let mut h = HMatrix::from_dense(c, row, col);
        permute(&mut h, &[2, 0, 1]).unwrap();
        if let Block::Dense { c, .. } = h.block() {
            assert_eq!(c.get(0, 0), 6.0);
            assert_eq!(c.get(1, 0), 0.0);
            assert_eq!(c.get(2, 0), 3.0);
        } else {
            panic!("expected dense block");
        }
    }
}
