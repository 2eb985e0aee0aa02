//! Matrix-vector product: `r <- r + s . a . v`, recursive (§4.4).

use crate::node::{Block, HMatrix};

/// Accumulates `r <- r + s . a . v` in place. `r` must already have length
/// `a.shape().0` and `v` length `a.shape().1`.
pub fn matvec_into(r: &mut [f64], a: &HMatrix, v: &[f64], scalar: f64) {
    match a.block() {
        Block::Dense { c, .. } => {
            for i in 0..c.nrows() {
                let mut acc = 0.0;
                for j in 0..c.ncols() {
                    acc += c.get(i, j) * v[j];
                }
                r[i] += scalar * acc;
            }
        }
        Block::LowRank { a: af, b: bf } => {
            if af.ncols() == 0 {
                return;
            }
            let k = af.ncols();
            // t = s . B^T . v
            let mut t = vec![0.0; k];
            for col in 0..k {
                let mut acc = 0.0;
                for row in 0..bf.nrows() {
                    acc += bf.get(row, col) * v[row];
                }
                t[col] = scalar * acc;
            }
            // r += A . t
            for i in 0..af.nrows() {
                let mut acc = 0.0;
                for col in 0..k {
                    acc += af.get(i, col) * t[col];
                }
                r[i] += acc;
            }
        }
        Block::Hierarchical { children } => {
            let m1 = children[0][0].shape().0;
            let n1 = children[0][0].shape().1;
            let (r1, r2) = r.split_at_mut(m1);
            let (v1, v2) = v.split_at(n1);

            matvec_into(r1, &children[0][0], v1, scalar);
            matvec_into(r1, &children[0][1], v2, scalar);
            matvec_into(r2, &children[1][0], v1, scalar);
            matvec_into(r2, &children[1][1], v2, scalar);
        }
    }
}

impl HMatrix {
    /// `r <- r + s . H . v`, in place.
    pub fn matvec_into(&self, r: &mut [f64], v: &[f64], scalar: f64) {
        matvec_into(r, self, v, scalar);
    }

    /// `s . H . v`, allocating a fresh result vector.
    pub fn matvec(&self, v: &[f64], scalar: f64) -> Vec<f64> {
        let mut r = vec![0.0; self.shape().0];
        self.matvec_into(&mut r, v, scalar);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::dense::DMat;

    #[test]
    fn identity_matvec_is_identity() {
        let row = Cluster::leaf(0..4);
        let col = Cluster::leaf(0..4);
        let h = HMatrix::from_dense(DMat::identity(4), row, col);
        let v = vec![1.0, 2.0, 3.0, 4.0];
        let r = h.matvec(&v, 1.0);
        assert_eq!(r, v);
    }

    #[test]
    fn rank_one_matvec() {
        let row = Cluster::leaf(0..4);
        let col = Cluster::leaf(0..4);
        let a = DMat::from_fn(4, 1, |_, _| 1.0);
        let b = DMat::from_fn(4, 1, |i, _| (i + 1) as f64);
        let h = HMatrix::from_low_rank(a, b, row, col).unwrap();
        let v = vec![1.0, 0.0, 0.0, 0.0];
        let r = h.matvec(&v, 1.0);
        assert_eq!(r, vec![1.0, 1.0, 1.0, 1.0]);
    }
}
